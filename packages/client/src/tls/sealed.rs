//! Passphrase sealed containers for keystores and private keys
//!
//! Layout: `EPPKS1` magic, u32 BE PBKDF2 iteration count, 32-byte salt,
//! 12-byte nonce, AES-256-GCM ciphertext with its 16-byte tag.

use std::num::NonZeroU32;

use ring::{aead, pbkdf2, rand};
use zeroize::Zeroizing;

use super::errors::TlsError;

const MAGIC: &[u8; 6] = b"EPPKS1";
const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = MAGIC.len() + 4 + SALT_LEN + NONCE_LEN;

// PBKDF2 iteration count (OWASP 2024 minimum)
pub const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(600_000) {
    Some(n) => n,
    None => unreachable!(),
};

/// Whether `data` starts like a sealed container.
#[must_use]
pub fn is_sealed(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}

fn derive_key(passphrase: &str, salt: &[u8], iterations: NonZeroU32) -> Result<aead::LessSafeKey, TlsError> {
    let mut key_bytes = Zeroizing::new([0u8; 32]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        passphrase.as_bytes(),
        &mut key_bytes[..],
    );

    let key = aead::UnboundKey::new(&aead::AES_256_GCM, &key_bytes[..])
        .map_err(|_| TlsError::KeyProtection("failed to create sealing key".to_string()))?;
    Ok(aead::LessSafeKey::new(key))
}

/// Seal `plaintext` under `passphrase`.
///
/// # Errors
///
/// Returns `TlsError::KeyProtection` if the passphrase is empty or random
/// salt/nonce generation or encryption fails.
pub fn seal(plaintext: &[u8], passphrase: &str, iterations: NonZeroU32) -> Result<Vec<u8>, TlsError> {
    if passphrase.is_empty() {
        return Err(TlsError::KeyProtection("empty passphrase".to_string()));
    }

    let rng = rand::SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rand::SecureRandom::fill(&rng, &mut salt)
        .map_err(|_| TlsError::KeyProtection("failed to generate random salt".to_string()))?;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::SecureRandom::fill(&rng, &mut nonce_bytes)
        .map_err(|_| TlsError::KeyProtection("failed to generate random nonce".to_string()))?;

    let key = derive_key(passphrase, &salt, iterations)?;
    let mut sealed = plaintext.to_vec();
    key.seal_in_place_append_tag(
        aead::Nonce::assume_unique_for_key(nonce_bytes),
        aead::Aad::from(MAGIC),
        &mut sealed,
    )
    .map_err(|_| TlsError::KeyProtection("encryption failed".to_string()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + sealed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&iterations.get().to_be_bytes());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Open a container produced by [`seal`].
///
/// # Errors
///
/// Returns `TlsError::KeyProtection` for a malformed container or when the
/// passphrase does not authenticate it.
pub fn open(data: &[u8], passphrase: &str) -> Result<Zeroizing<Vec<u8>>, TlsError> {
    if !is_sealed(data) || data.len() < HEADER_LEN + TAG_LEN {
        return Err(TlsError::KeyProtection("invalid sealed container".to_string()));
    }

    let mut offset = MAGIC.len();
    let mut count = [0u8; 4];
    count.copy_from_slice(&data[offset..offset + 4]);
    offset += 4;
    let iterations = NonZeroU32::new(u32::from_be_bytes(count))
        .ok_or_else(|| TlsError::KeyProtection("invalid iteration count".to_string()))?;
    let salt = &data[offset..offset + SALT_LEN];
    offset += SALT_LEN;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&data[offset..offset + NONCE_LEN]);
    offset += NONCE_LEN;

    let key = derive_key(passphrase, salt, iterations)?;

    // Constant error message regardless of which check failed
    let mut buffer = Zeroizing::new(data[offset..].to_vec());
    let plaintext_len = key
        .open_in_place(
            aead::Nonce::assume_unique_for_key(nonce_bytes),
            aead::Aad::from(MAGIC),
            buffer.as_mut_slice(),
        )
        .map_err(|_| TlsError::KeyProtection("authentication failed".to_string()))?
        .len();
    buffer.truncate(plaintext_len);
    Ok(buffer)
}
