// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use dividend_life_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_file_format() {
        let err = CoreError::InvalidFileFormat("bad header".into());
        assert_eq!(err.to_string(), "Invalid file format: bad header");
    }

    #[test]
    fn unsupported_version() {
        let err = CoreError::UnsupportedVersion(99);
        assert_eq!(err.to_string(), "Unsupported file version: 99");
    }

    #[test]
    fn encryption() {
        let err = CoreError::Encryption("AES key size invalid".into());
        assert_eq!(err.to_string(), "Encryption failed: AES key size invalid");
    }

    #[test]
    fn decryption() {
        let err = CoreError::Decryption;
        assert_eq!(
            err.to_string(),
            "Decryption failed — wrong password or corrupted file"
        );
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("buffer overflow".into());
        assert_eq!(err.to_string(), "Serialization error: buffer overflow");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("unexpected EOF".into());
        assert_eq!(err.to_string(), "Deserialization error: unexpected EOF");
    }

    #[test]
    fn file_io() {
        let err = CoreError::FileIO("permission denied".into());
        assert_eq!(err.to_string(), "File I/O error: permission denied");
    }

    #[test]
    fn api_error() {
        let err = CoreError::Api {
            endpoint: "get_dividend".into(),
            message: "HTTP 502".into(),
        };
        assert_eq!(
            err.to_string(),
            "Dividend API error (get_dividend): HTTP 502"
        );
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn validation() {
        let err = CoreError::ValidationError("quantity must be positive".into());
        assert_eq!(
            err.to_string(),
            "Transaction validation failed: quantity must be positive"
        );
    }

    #[test]
    fn transaction_not_found() {
        let err = CoreError::TransactionNotFound("tx-42".into());
        assert_eq!(err.to_string(), "Transaction not found: tx-42");
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn io_error_becomes_file_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIO(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn serde_json_error_becomes_deserialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn bincode_error_becomes_serialization() {
        let bincode_err: bincode::Error = Box::new(bincode::ErrorKind::SizeLimit);
        let err: CoreError = bincode_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn aes_gcm_error_becomes_decryption() {
        let err: CoreError = aes_gcm::Error.into();
        assert!(matches!(err, CoreError::Decryption));
    }
}

// ── Error trait integration ─────────────────────────────────────────

mod traits {
    use super::*;

    #[test]
    fn implements_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&CoreError::Decryption);
    }

    #[test]
    fn debug_formatting_names_the_variant() {
        let err = CoreError::UnsupportedVersion(2);
        assert!(format!("{err:?}").contains("UnsupportedVersion"));
    }
}
