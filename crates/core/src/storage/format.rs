use super::encryption::KdfParams;
use crate::errors::CoreError;

/// Magic bytes identifying a DVLF (Dividend Life) workspace file.
pub const MAGIC: &[u8; 4] = b"DVLF";

/// Current container format version.
pub const CURRENT_VERSION: u16 = 1;

/// Fixed header size in bytes:
/// magic(4) + version(2) + salt(16) + nonce(12) + kdf_params(12) = 46.
/// Everything after the header is ciphertext (tag included).
pub const HEADER_SIZE: usize = 46;

/// Parsed container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: u16,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
    pub kdf_params: KdfParams,
}

/// Assemble a complete container.
///
/// Layout:
/// ```text
/// [DVLF: 4B] [version: 2B LE] [salt: 16B] [nonce: 12B]
/// [memory_cost: 4B LE] [time_cost: 4B LE] [parallelism: 4B LE]
/// [ciphertext: remainder, AES-GCM tag included]
/// ```
pub fn encode_container(
    version: u16,
    salt: &[u8; 16],
    nonce: &[u8; 12],
    kdf_params: &KdfParams,
    ciphertext: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&version.to_le_bytes());
    buf.extend_from_slice(salt);
    buf.extend_from_slice(nonce);
    buf.extend_from_slice(&kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(ciphertext);
    buf
}

/// Split raw bytes into a validated header and the ciphertext slice.
pub fn decode_container(data: &[u8]) -> Result<(ContainerHeader, &[u8]), CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a valid DVLF container".into(),
        ));
    }
    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes — not a DVLF file".into(),
        ));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let mut salt = [0u8; 16];
    salt.copy_from_slice(&data[6..22]);

    let mut nonce = [0u8; 12];
    nonce.copy_from_slice(&data[22..34]);

    let memory_cost = u32::from_le_bytes(
        data[34..38]
            .try_into()
            .map_err(|_| CoreError::InvalidFileFormat("Failed to read KDF memory_cost".into()))?,
    );
    let time_cost = u32::from_le_bytes(
        data[38..42]
            .try_into()
            .map_err(|_| CoreError::InvalidFileFormat("Failed to read KDF time_cost".into()))?,
    );
    let parallelism = u32::from_le_bytes(
        data[42..46]
            .try_into()
            .map_err(|_| CoreError::InvalidFileFormat("Failed to read KDF parallelism".into()))?,
    );

    // Reject absurd KDF costs so a crafted file can't pin the CPU or
    // allocate gigabytes during key derivation.
    if !(8..=1_048_576).contains(&memory_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF memory_cost out of safe range: {memory_cost} KiB (expected 8..1048576)"
        )));
    }
    if !(1..=20).contains(&time_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF time_cost out of safe range: {time_cost} (expected 1..20)"
        )));
    }
    if !(1..=16).contains(&parallelism) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF parallelism out of safe range: {parallelism} (expected 1..16)"
        )));
    }

    let header = ContainerHeader {
        version,
        salt,
        nonce,
        kdf_params: KdfParams {
            memory_cost,
            time_cost,
            parallelism,
        },
    };

    Ok((header, &data[HEADER_SIZE..]))
}
