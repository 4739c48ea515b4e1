// ═══════════════════════════════════════════════════════════════════
// Storage Tests — container format, encryption round-trips, corruption
// handling, file I/O
// ═══════════════════════════════════════════════════════════════════

use dividend_life_core::errors::CoreError;
use dividend_life_core::models::goal::{GoalConfig, GoalDefinition};
use dividend_life_core::models::transaction::TransactionRecord;
use dividend_life_core::models::workspace::Workspace;
use dividend_life_core::storage::encryption::KdfParams;
use dividend_life_core::storage::format;
use dividend_life_core::storage::manager::WorkspaceStore;

const PASSWORD: &str = "correct horse battery staple";

fn sample_workspace() -> Workspace {
    let mut workspace = Workspace::default();
    workspace.transactions.push(TransactionRecord {
        id: Some("tx-1".into()),
        stock_id: "0050".into(),
        stock_name: Some("Yuanta Taiwan 50".into()),
        date: Some("2024-01-10".into()),
        quantity: 1000.0,
        price: Some(130.5),
        kind: Some("buy".into()),
        ..TransactionRecord::default()
    });
    workspace.settings.goals = GoalConfig {
        cashflow_goals: vec![GoalDefinition {
            id: Some("g1".into()),
            goal_type: Some("annual".into()),
            target: 36000.0,
            currency: Some("TWD".into()),
            name: Some("FIRE".into()),
        }],
        ..GoalConfig::default()
    };
    workspace
}

// ── Byte round-trips ────────────────────────────────────────────────

#[test]
fn save_load_roundtrip_restores_the_workspace() {
    let workspace = sample_workspace();
    let bytes = WorkspaceStore::save_to_bytes(&workspace, PASSWORD).unwrap();
    let restored = WorkspaceStore::load_from_bytes(&bytes, PASSWORD).unwrap();
    assert_eq!(workspace, restored);
}

#[test]
fn empty_workspace_roundtrips() {
    let bytes = WorkspaceStore::save_to_bytes(&Workspace::default(), PASSWORD).unwrap();
    let restored = WorkspaceStore::load_from_bytes(&bytes, PASSWORD).unwrap();
    assert_eq!(restored, Workspace::default());
}

#[test]
fn wrong_password_fails_decryption() {
    let bytes = WorkspaceStore::save_to_bytes(&sample_workspace(), PASSWORD).unwrap();
    let result = WorkspaceStore::load_from_bytes(&bytes, "wrong password");
    assert!(matches!(result, Err(CoreError::Decryption)));
}

#[test]
fn each_save_uses_fresh_salt_and_nonce() {
    let workspace = sample_workspace();
    let first = WorkspaceStore::save_to_bytes(&workspace, PASSWORD).unwrap();
    let second = WorkspaceStore::save_to_bytes(&workspace, PASSWORD).unwrap();
    assert_ne!(first, second);
}

// ── Corruption handling ─────────────────────────────────────────────

#[test]
fn flipped_ciphertext_byte_fails_authentication() {
    let mut bytes = WorkspaceStore::save_to_bytes(&sample_workspace(), PASSWORD).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    assert!(matches!(
        WorkspaceStore::load_from_bytes(&bytes, PASSWORD),
        Err(CoreError::Decryption)
    ));
}

#[test]
fn bad_magic_is_rejected() {
    let mut bytes = WorkspaceStore::save_to_bytes(&sample_workspace(), PASSWORD).unwrap();
    bytes[0..4].copy_from_slice(b"NOPE");
    assert!(matches!(
        WorkspaceStore::load_from_bytes(&bytes, PASSWORD),
        Err(CoreError::InvalidFileFormat(_))
    ));
}

#[test]
fn truncated_bytes_are_rejected() {
    let bytes = WorkspaceStore::save_to_bytes(&sample_workspace(), PASSWORD).unwrap();
    assert!(matches!(
        WorkspaceStore::load_from_bytes(&bytes[..10], PASSWORD),
        Err(CoreError::InvalidFileFormat(_))
    ));
}

#[test]
fn future_version_is_rejected() {
    let mut bytes = WorkspaceStore::save_to_bytes(&sample_workspace(), PASSWORD).unwrap();
    bytes[4..6].copy_from_slice(&99u16.to_le_bytes());
    assert!(matches!(
        WorkspaceStore::load_from_bytes(&bytes, PASSWORD),
        Err(CoreError::UnsupportedVersion(99))
    ));
}

#[test]
fn absurd_kdf_params_are_rejected() {
    let mut bytes = WorkspaceStore::save_to_bytes(&sample_workspace(), PASSWORD).unwrap();
    // memory_cost lives at offset 34..38 — crank it past the 1 GiB cap.
    bytes[34..38].copy_from_slice(&u32::MAX.to_le_bytes());
    assert!(matches!(
        WorkspaceStore::load_from_bytes(&bytes, PASSWORD),
        Err(CoreError::InvalidFileFormat(_))
    ));
}

// ── Container format ────────────────────────────────────────────────

#[test]
fn header_roundtrip_preserves_fields() {
    let salt = [7u8; 16];
    let nonce = [9u8; 12];
    let kdf = KdfParams::default();
    let ciphertext = vec![1, 2, 3, 4];
    let bytes = format::encode_container(format::CURRENT_VERSION, &salt, &nonce, &kdf, &ciphertext);

    let (header, body) = format::decode_container(&bytes).unwrap();
    assert_eq!(header.version, format::CURRENT_VERSION);
    assert_eq!(header.salt, salt);
    assert_eq!(header.nonce, nonce);
    assert_eq!(header.kdf_params, kdf);
    assert_eq!(body, &ciphertext[..]);
}

#[test]
fn header_size_matches_layout() {
    let bytes = format::encode_container(
        format::CURRENT_VERSION,
        &[0u8; 16],
        &[0u8; 12],
        &KdfParams::default(),
        &[],
    );
    assert_eq!(bytes.len(), format::HEADER_SIZE);
}

// ── load_or_default ─────────────────────────────────────────────────

#[test]
fn load_or_default_without_bytes_starts_fresh() {
    let workspace = WorkspaceStore::load_or_default(None, PASSWORD).unwrap();
    assert_eq!(workspace, Workspace::default());
}

#[test]
fn load_or_default_swallows_garbage_bytes() {
    let workspace = WorkspaceStore::load_or_default(Some(b"not a container"), PASSWORD).unwrap();
    assert_eq!(workspace, Workspace::default());
}

#[test]
fn load_or_default_still_surfaces_wrong_password() {
    let bytes = WorkspaceStore::save_to_bytes(&sample_workspace(), PASSWORD).unwrap();
    let result = WorkspaceStore::load_or_default(Some(&bytes), "typo");
    assert!(matches!(result, Err(CoreError::Decryption)));
}

// ── File I/O (native) ───────────────────────────────────────────────

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workspace.dvlf");
    let path_str = path.to_str().unwrap();

    let workspace = sample_workspace();
    WorkspaceStore::save_to_file(&workspace, path_str, PASSWORD).unwrap();
    let restored = WorkspaceStore::load_from_file(path_str, PASSWORD).unwrap();
    assert_eq!(workspace, restored);
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn loading_a_missing_file_is_an_io_error() {
    let result = WorkspaceStore::load_from_file("/nonexistent/workspace.dvlf", PASSWORD);
    assert!(matches!(result, Err(CoreError::FileIO(_))));
}
