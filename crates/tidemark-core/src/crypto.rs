//! Cryptographic primitives: Ed25519 signing and SHA-256 hashing.
//!
//! Signatures are deterministic (RFC 8032). The store relies on this:
//! conflict resolution tie-breaks on signature text, so every peer must
//! derive the identical signature for the same (key, input).

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::codec;
use crate::error::IdentityError;

/// Length in bytes of public keys and key seeds.
pub const KEY_LENGTH: usize = 32;

/// Length in bytes of signatures.
pub const SIGNATURE_LENGTH: usize = 64;

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; KEY_LENGTH]);

impl PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Convert to tagged base32 text.
    pub fn to_base32(&self) -> String {
        codec::encode(&self.0)
    }

    /// Parse from tagged base32 text.
    pub fn from_base32(text: &str) -> Result<Self, IdentityError> {
        let bytes = codec::decode(text)?;
        let arr: [u8; KEY_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| IdentityError::KeyLength {
                    expected: KEY_LENGTH,
                    got: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    /// Verify a signature over a message.
    ///
    /// All failure modes (point decompression, bad signature) collapse to
    /// `false`; authenticity is a boolean, not an exception.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let sig = DalekSignature::from_bytes(&signature.0);
        verifying_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_base32()[..13])
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; KEY_LENGTH]> for PublicKey {
    fn from(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Convert to tagged base32 text.
    pub fn to_base32(&self) -> String {
        codec::encode(&self.0)
    }

    /// Parse from tagged base32 text.
    pub fn from_base32(text: &str) -> Result<Self, IdentityError> {
        let bytes = codec::decode(text)?;
        let arr: [u8; SIGNATURE_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| IdentityError::SignatureLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_base32()[..13])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A signing keypair.
///
/// Wraps ed25519-dalek's `SigningKey`.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; KEY_LENGTH]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig = self.signing_key.sign(message);
        Signature(sig.to_bytes())
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; KEY_LENGTH] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

/// SHA-256 digest of the input, as tagged base32 text.
///
/// Hashing a `&str` and its UTF-8 byte buffer yields the same digest.
pub fn sha256_base32(input: impl AsRef<[u8]>) -> String {
    let digest = Sha256::digest(input.as_ref());
    codec::encode(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let keypair = Keypair::generate();
        let message = b"hello world";
        let signature = keypair.sign(message);

        assert!(keypair.public_key().verify(message, &signature));

        // Tampered message must fail.
        assert!(!keypair.public_key().verify(b"hello worlD", &signature));

        // Tampered signature must fail.
        let mut bad = signature.0;
        bad[0] ^= 0x01;
        assert!(!keypair
            .public_key()
            .verify(message, &Signature::from_bytes(bad)));
    }

    #[test]
    fn test_deterministic_from_seed() {
        let seed = [0x42u8; KEY_LENGTH];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let keypair = Keypair::from_seed(&[0x42; KEY_LENGTH]);
        assert_eq!(keypair.sign(b"aaa"), keypair.sign(b"aaa"));
        assert_ne!(keypair.sign(b"aaa"), keypair.sign(b"xxx"));
    }

    #[test]
    fn test_sha256_known_digests() {
        assert_eq!(
            sha256_base32(""),
            "b4oymiquy7qobjgx36tejs35zeqt24qpemsnzgtfeswmrw6csxbkq"
        );
        assert_eq!(
            sha256_base32("abc"),
            "bxj4bnp4pahh6uqkbidpf3lrceoyagyndsylxvhfucd7wd4qacwwq"
        );
    }

    #[test]
    fn test_sha256_text_and_bytes_agree() {
        // U+2603 SNOWMAN is three bytes of UTF-8.
        let snowman = "\u{2603}";
        assert_eq!(snowman.len(), 3);
        assert_eq!(
            sha256_base32(snowman),
            sha256_base32([0xe2u8, 0x98, 0x83].as_slice())
        );
        assert_eq!(sha256_base32(""), sha256_base32(b"".as_slice()));
    }

    #[test]
    fn test_public_key_base32_roundtrip() {
        let keypair = Keypair::generate();
        let pk = keypair.public_key();
        let text = pk.to_base32();
        assert!(text.starts_with('b'));
        assert_eq!(PublicKey::from_base32(&text).unwrap(), pk);
    }

    #[test]
    fn test_signature_base32_roundtrip() {
        let keypair = Keypair::from_seed(&[0x07; KEY_LENGTH]);
        let sig = keypair.sign(b"payload");
        let text = sig.to_base32();
        assert_eq!(Signature::from_base32(&text).unwrap(), sig);
    }

    #[test]
    fn test_key_length_rejected() {
        // 3 bytes decode fine but are not a key.
        let short = codec::encode(&[1, 2, 3]);
        assert!(matches!(
            PublicKey::from_base32(&short),
            Err(IdentityError::KeyLength { expected: 32, got: 3 })
        ));
    }
}
