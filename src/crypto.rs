//! Online-mode encryption handshake primitives: RSA public key parsing, the
//! shared secret, PKCS#1 v1.5 encryption of the handshake payloads, and the
//! "Minecraft SHA-1" used to derive the session server hash.

use rand::RngCore;
use rsa::{BigUint, Pkcs1v15Encrypt, RsaPublicKey};
use sha1::{Digest, Sha1};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("failed to parse server RSA public key: {0}")]
    InvalidPublicKey(String),
    #[error("rsa operation failed: {0}")]
    Rsa(String),
}

/// A freshly generated 16-byte AES-128 shared secret. Used as both the key
/// and the IV for the CFB8 cipher, per the Minecraft protocol.
pub fn generate_shared_secret() -> [u8; 16] {
    let mut secret = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

/// Parses the server's DER-encoded RSA public key (the raw `publicKey`
/// bytes from `EncryptionRequest`, not wrapped in PEM).
pub fn parse_public_key(der: &[u8]) -> Result<RsaPublicKey, EncryptionError> {
    let (n, e) =
        rsa_der::public_key_from_der(der).map_err(|e| EncryptionError::InvalidPublicKey(e.to_string()))?;
    RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
        .map_err(|e| EncryptionError::InvalidPublicKey(e.to_string()))
}

/// Encrypts `data` under `key` with PKCS#1 v1.5 padding, as required for
/// both the shared secret and the verify token in `EncryptionResponse`.
pub fn pkcs1_encrypt(key: &RsaPublicKey, data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    rsa::RsaPublicKey::encrypt(key, &mut rand::thread_rng(), Pkcs1v15Encrypt, data)
        .map_err(|e| EncryptionError::Rsa(e.to_string()))
}

/// The "Minecraft SHA-1": SHA-1 over the concatenation of the session
/// inputs, interpreted as a signed two's-complement big-endian integer and
/// formatted as hex (leading `-` for negatives, no sign for non-negatives,
/// no padding beyond the magnitude's natural hex length).
pub fn mc_sha1(server_id: &str, shared_secret: &[u8], public_key_der: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(server_id.as_bytes());
    hasher.update(shared_secret);
    hasher.update(public_key_der);
    signed_hex_digest(hasher.finalize().into())
}

/// Formats a 20-byte SHA-1 digest as Mojang's session-hash hex: interpret
/// the digest as a two's-complement big-endian integer, negate it (and
/// strip leading zero nibbles) if the sign bit is set, and prefix with `-`.
pub fn signed_hex_digest(mut digest: [u8; 20]) -> String {
    let negative = digest[0] & 0x80 != 0;
    if negative {
        twos_complement_negate(&mut digest);
    }
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    let hex = hex.trim_start_matches('0');
    let hex = if hex.is_empty() { "0" } else { hex };
    if negative {
        format!("-{hex}")
    } else {
        hex.to_string()
    }
}

fn twos_complement_negate(bytes: &mut [u8; 20]) {
    let mut carry = true;
    for b in bytes.iter_mut().rev() {
        *b = !*b;
        if carry {
            let (sum, overflow) = b.overflowing_add(1);
            *b = sum;
            carry = overflow;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha1_of(s: &str) -> [u8; 20] {
        let mut hasher = Sha1::new();
        hasher.update(s.as_bytes());
        hasher.finalize().into()
    }

    #[test]
    fn known_mojang_hash_vectors() {
        assert_eq!(
            signed_hex_digest(sha1_of("Notch")),
            "4ed1f46bbe04bc756bcb17c0c7ce3e4632f06a48"
        );
        assert_eq!(
            signed_hex_digest(sha1_of("jeb_")),
            "-7c9d5b0044c130109a5d7b5fb5c317c02b4e28c1"
        );
        assert_eq!(
            signed_hex_digest(sha1_of("simon")),
            "88e16a1019277b15d58faf0541e11910eb756f6"
        );
    }

    #[test]
    fn shared_secret_is_sixteen_bytes() {
        let secret = generate_shared_secret();
        assert_eq!(secret.len(), 16);
    }
}
