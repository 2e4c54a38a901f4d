//! Symmetric encryption of short secrets (session identifiers).
//!
//! Tokens are AES-256-GCM with a fresh 96-bit nonce per call, encoded as
//! URL-safe base64 of `nonce || ciphertext`. The key is the SHA-256 digest of
//! the configured secret, so any `APP_SECRET` string is usable.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("APP_SECRET is not set")]
    MissingSecret,
    #[error("invalid token")]
    InvalidToken,
    #[error("encryption failed")]
    Encrypt,
}

#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    pub fn new(secret: &str) -> Self {
        let key: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        Self {
            cipher: Aes256Gcm::new(&key.into()),
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| CipherError::Encrypt)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(URL_SAFE_NO_PAD.encode(out))
    }

    pub fn decrypt(&self, token: &str) -> Result<String, CipherError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| CipherError::InvalidToken)?;
        if raw.len() < NONCE_LEN {
            return Err(CipherError::InvalidToken);
        }

        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CipherError::InvalidToken)?;
        String::from_utf8(plain).map_err(|_| CipherError::InvalidToken)
    }
}

/// Reads `APP_SECRET` at call time.
pub fn secret_from_env() -> Result<String, CipherError> {
    std::env::var("APP_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or(CipherError::MissingSecret)
}

fn cipher_for(key: Option<&str>) -> Result<SecretCipher, CipherError> {
    match key {
        Some(k) => Ok(SecretCipher::new(k)),
        None => Ok(SecretCipher::new(&secret_from_env()?)),
    }
}

/// Encrypts `plaintext` under `key`, or under `APP_SECRET` when no key is given.
pub fn encrypt_str(plaintext: &str, key: Option<&str>) -> Result<String, CipherError> {
    cipher_for(key)?.encrypt(plaintext)
}

/// Inverse of [`encrypt_str`] under the same key.
pub fn decrypt_str(token: &str, key: Option<&str>) -> Result<String, CipherError> {
    cipher_for(key)?.decrypt(token)
}
