//! Persistence for OAuth credentials
//!
//! [`FileTokenStore`] keeps one encrypted file per integration. The file holds
//! a random 12-byte nonce followed by the AES-256-GCM ciphertext of the
//! credential JSON. Token values are never logged.

use crate::auth::Credential;
use crate::error::{BridgeError, Result};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const NONCE_LEN: usize = 12;

/// Persisted-storage collaborator of the token provider
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the credential for an integration, `None` if nothing is stored
    async fn load(&self, integration: &str) -> Result<Option<Credential>>;

    /// Store the credential for an integration, replacing any previous one
    async fn save(&self, integration: &str, credential: &Credential) -> Result<()>;
}

/// Encrypted file per integration under a directory
pub struct FileTokenStore {
    dir: PathBuf,
    key: [u8; 32],
}

impl FileTokenStore {
    /// Create a store in `dir`, deriving the AES key from `passphrase`
    pub fn new(dir: impl Into<PathBuf>, passphrase: &str) -> Self {
        let key: [u8; 32] = Sha256::digest(passphrase.as_bytes()).into();
        Self { dir: dir.into(), key }
    }

    /// Get the directory credentials are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, integration: &str) -> PathBuf {
        self.dir.join(integration)
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key).map_err(|e| BridgeError::Storage(format!("cipher init failed: {}", e)))
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .cipher()?
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| BridgeError::Storage(format!("encrypt credential: {}", e)))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&ciphertext);
        Ok(payload)
    }

    fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() <= NONCE_LEN {
            return Err(BridgeError::Storage("stored credential too short".to_string()));
        }
        let (nonce, ciphertext) = payload.split_at(NONCE_LEN);
        self.cipher()?
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| BridgeError::Storage(format!("decrypt credential: {}", e)))
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self, integration: &str) -> Result<Option<Credential>> {
        let path = self.path_for(integration);
        tracing::debug!("Loading credential from {}", path.display());

        let payload = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let plaintext = self.decrypt(&payload)?;
        let credential = serde_json::from_slice(&plaintext)
            .map_err(|e| BridgeError::Storage(format!("corrupt credential for {}: {}", integration, e)))?;
        Ok(Some(credential))
    }

    async fn save(&self, integration: &str, credential: &Credential) -> Result<()> {
        let json = serde_json::to_vec(credential)?;
        let payload = self.encrypt(&json)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(integration);
        tokio::fs::write(&path, payload).await?;

        tracing::info!("Saved credential for {} to {}", integration, path.display());
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryTokenStore {
    credentials: parking_lot::Mutex<HashMap<String, Credential>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self, integration: &str) -> Result<Option<Credential>> {
        Ok(self.credentials.lock().get(integration).cloned())
    }

    async fn save(&self, integration: &str, credential: &Credential) -> Result<()> {
        self.credentials
            .lock()
            .insert(integration.to_string(), credential.clone());
        Ok(())
    }
}
