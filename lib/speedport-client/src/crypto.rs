//! AES-CCM sealing and opening for the device status payload.
//!
//! The firmware encrypts `Status.json` with AES-CCM using a 16-byte
//! authentication tag and an 8-byte nonce taken from the leading bytes of
//! the key itself. Deriving the nonce from the key is a quirk of the device
//! protocol, reproduced here for compatibility only.

use aes::cipher::{BlockCipher, BlockEncrypt, BlockSizeUser};
use aes::{Aes128, Aes192, Aes256};
use ccm::aead::generic_array::GenericArray;
use ccm::aead::{Aead, KeyInit};
use ccm::consts::{U16, U8};
use ccm::Ccm;
use snafu::ResultExt as _;

use crate::error::{AuthenticationFailed, ClientError, InvalidKey, UnsupportedKeyLength};

/// Authentication tag length, in bytes. The tag trails the ciphertext.
pub const TAG_LEN: usize = 16;

/// Nonce length, in bytes. The nonce is the leading `NONCE_LEN` bytes of the key.
pub const NONCE_LEN: usize = 8;

/// Decodes a hex-encoded key into its raw bytes.
///
/// # Errors
///
/// Returns an error if the key is not valid hex, or decodes to a length
/// other than 16, 24 or 32 bytes (AES-128/192/256).
pub fn decode_key(key_hex: &str) -> Result<Vec<u8>, ClientError> {
    let key = hex::decode(key_hex).context(InvalidKey)?;
    match key.len() {
        16 | 24 | 32 => Ok(key),
        length => UnsupportedKeyLength { length }.fail(),
    }
}

/// Decrypts `payload` (ciphertext with the authentication tag appended) using `key`.
///
/// The key length selects the AES variant; the nonce is derived from the key
/// per the device protocol.
///
/// # Errors
///
/// Returns an error if the key length is unsupported, or if tag verification
/// fails -- a failed tag is never silently accepted.
pub fn decrypt(payload: &[u8], key: &[u8]) -> Result<Vec<u8>, ClientError> {
    if payload.len() < TAG_LEN {
        return AuthenticationFailed.fail();
    }

    let opened = match key.len() {
        16 => open_with::<Aes128>(key, payload),
        24 => open_with::<Aes192>(key, payload),
        32 => open_with::<Aes256>(key, payload),
        length => return UnsupportedKeyLength { length }.fail(),
    };

    match opened {
        Ok(plaintext) => Ok(plaintext),
        Err(_) => AuthenticationFailed.fail(),
    }
}

/// Encrypts `plaintext` with `key`, appending the authentication tag.
///
/// Exact inverse of [`decrypt`], using the same key/nonce derivation. Mock
/// devices and tests use this to produce payloads the device would serve.
///
/// # Errors
///
/// Returns an error if the key length is unsupported.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, ClientError> {
    let sealed = match key.len() {
        16 => seal_with::<Aes128>(key, plaintext),
        24 => seal_with::<Aes192>(key, plaintext),
        32 => seal_with::<Aes256>(key, plaintext),
        length => return UnsupportedKeyLength { length }.fail(),
    };

    match sealed {
        Ok(ciphertext) => Ok(ciphertext),
        Err(_) => AuthenticationFailed.fail(),
    }
}

fn open_with<C>(key: &[u8], payload: &[u8]) -> Result<Vec<u8>, ccm::aead::Error>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + KeyInit,
{
    let cipher = Ccm::<C, U16, U8>::new_from_slice(key).map_err(|_| ccm::aead::Error)?;
    let nonce = GenericArray::from_slice(&key[..NONCE_LEN]);
    cipher.decrypt(nonce, payload)
}

fn seal_with<C>(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, ccm::aead::Error>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + KeyInit,
{
    let cipher = Ccm::<C, U16, U8>::new_from_slice(key).map_err(|_| ccm::aead::Error)?;
    let nonce = GenericArray::from_slice(&key[..NONCE_LEN]);
    cipher.encrypt(nonce, plaintext)
}
