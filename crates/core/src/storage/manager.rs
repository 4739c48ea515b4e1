use log::{debug, warn};

use crate::errors::CoreError;
use crate::models::workspace::Workspace;

use super::encryption::{self, KdfParams};
use super::format;

/// High-level storage operations: save/load the workspace to/from
/// encrypted bytes or files.
pub struct WorkspaceStore;

impl WorkspaceStore {
    /// Serialize and encrypt a workspace to portable bytes.
    ///
    /// Flow: Workspace → bincode → AES-256-GCM(Argon2id(password)) → DVLF bytes
    pub fn save_to_bytes(workspace: &Workspace, password: &str) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(workspace)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize workspace: {e}")))?;

        let salt = encryption::generate_salt()?;
        let nonce = encryption::generate_nonce()?;
        let kdf_params = KdfParams::default();
        let key = encryption::derive_key(password, &salt, &kdf_params)?;
        let ciphertext = encryption::seal(&plaintext, &key, &nonce)?;

        debug!(
            "Saved workspace: {} transactions, {} ciphertext bytes",
            workspace.transactions.len(),
            ciphertext.len()
        );

        Ok(format::encode_container(
            format::CURRENT_VERSION,
            &salt,
            &nonce,
            &kdf_params,
            &ciphertext,
        ))
    }

    /// Decrypt and deserialize a workspace from raw bytes.
    ///
    /// Flow: DVLF bytes → parse header → Argon2id(password, salt) →
    /// AES-256-GCM decrypt → bincode → Workspace
    pub fn load_from_bytes(data: &[u8], password: &str) -> Result<Workspace, CoreError> {
        let (header, ciphertext) = format::decode_container(data)?;
        let key = encryption::derive_key(password, &header.salt, &header.kdf_params)?;
        let plaintext = encryption::open(ciphertext, &key, &header.nonce)?;

        bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize workspace: {e}")))
    }

    /// Load a workspace, falling back to an empty one when the bytes are
    /// missing or unreadable. Wrong-password failures still surface as
    /// errors — silently discarding a user's data behind a typo would be
    /// worse than the prompt.
    pub fn load_or_default(data: Option<&[u8]>, password: &str) -> Result<Workspace, CoreError> {
        let Some(data) = data else {
            return Ok(Workspace::default());
        };
        match Self::load_from_bytes(data, password) {
            Ok(workspace) => Ok(workspace),
            Err(CoreError::Decryption) => Err(CoreError::Decryption),
            Err(e) => {
                warn!("Unreadable workspace container, starting fresh: {e}");
                Ok(Workspace::default())
            }
        }
    }

    /// Save the workspace to an encrypted file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(
        workspace: &Workspace,
        path: &str,
        password: &str,
    ) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(workspace, password)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load the workspace from an encrypted file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str, password: &str) -> Result<Workspace, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes, password)
    }
}
