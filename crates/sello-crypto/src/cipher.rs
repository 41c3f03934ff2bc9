//! AES-128-CBC session cipher
//!
//! Every payload gets its own key and IV, drawn from the OS CSPRNG and
//! never reused. Integrity is not provided here: the ciphertext is covered
//! by the issuer and authority signatures instead.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::{CryptoError, Result};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// 128-bit key (16 bytes)
pub const KEY_SIZE: usize = 16;
/// One AES block (16 bytes)
pub const IV_SIZE: usize = 16;

/// Generate a cryptographically secure random session key
pub fn generate_key() -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    SystemRandom::new()
        .fill(key.as_mut())
        .map_err(|_| CryptoError::Random)?;
    Ok(key)
}

/// Generate a cryptographically secure random IV
pub fn generate_iv() -> Result<[u8; IV_SIZE]> {
    let mut iv = [0u8; IV_SIZE];
    SystemRandom::new()
        .fill(&mut iv)
        .map_err(|_| CryptoError::Random)?;
    Ok(iv)
}

fn check_sizes(key: &[u8], iv: &[u8]) -> Result<()> {
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: key.len(),
        });
    }
    if iv.len() != IV_SIZE {
        return Err(CryptoError::InvalidIvSize {
            expected: IV_SIZE,
            actual: iv.len(),
        });
    }
    Ok(())
}

/// Encrypt plaintext with AES-128-CBC and PKCS#7 padding.
///
/// The output is always a non-empty multiple of the block size, even for an
/// empty plaintext.
pub fn encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    check_sizes(key, iv)?;

    let cipher = Aes128CbcEnc::new_from_slices(key, iv)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt ciphertext produced by [`encrypt`], removing the padding.
pub fn decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    check_sizes(key, iv)?;

    if ciphertext.is_empty() || ciphertext.len() % IV_SIZE != 0 {
        return Err(CryptoError::Decryption);
    }

    let cipher = Aes128CbcDec::new_from_slices(key, iv).map_err(|_| CryptoError::Decryption)?;

    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Decryption)?;

    Ok(Zeroizing::new(plaintext))
}
