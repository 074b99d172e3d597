//! Author identities: a shortname plus an Ed25519 public key, written as
//! the textual address `@<shortname>.<base32 public key>`.
//!
//! The shortname is exactly four lowercase ascii letters. The secret key
//! travels separately as tagged base32 and never appears in the address.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec;
use crate::crypto::{Keypair, PublicKey, Signature, KEY_LENGTH};
use crate::error::IdentityError;

/// Length of an author shortname.
pub const SHORTNAME_LENGTH: usize = 4;

/// A validated author address: `@<shortname>.<base32 public key>`.
///
/// Ordered lexicographically on the address text, which is the order
/// query results present authors in.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorAddress(String);

impl AuthorAddress {
    /// Compose an address from a shortname and public key.
    pub fn from_parts(shortname: &str, public_key: &PublicKey) -> Result<Self, IdentityError> {
        check_shortname(shortname)?;
        Ok(Self(format!("@{}.{}", shortname, public_key.to_base32())))
    }

    /// Parse and validate an address string.
    pub fn parse(address: &str) -> Result<Self, IdentityError> {
        let (shortname, key) = split_address(address)?;
        check_shortname(shortname)?;
        PublicKey::from_base32(key)?;
        Ok(Self(address.to_string()))
    }

    /// The four-letter shortname.
    pub fn shortname(&self) -> &str {
        &self.0[1..1 + SHORTNAME_LENGTH]
    }

    /// The public key encoded in the address.
    pub fn public_key(&self) -> Result<PublicKey, IdentityError> {
        let (_, key) = split_address(&self.0)?;
        PublicKey::from_base32(key)
    }

    /// The address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AuthorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorAddress({})", self.0)
    }
}

fn split_address(address: &str) -> Result<(&str, &str), IdentityError> {
    let rest = address
        .strip_prefix('@')
        .ok_or(IdentityError::MissingAddressSigil)?;
    let (shortname, key) = rest
        .split_once('.')
        .ok_or_else(|| IdentityError::MalformedAddress(address.to_string()))?;
    if key.is_empty() {
        return Err(IdentityError::MalformedAddress(address.to_string()));
    }
    Ok((shortname, key))
}

fn check_shortname(shortname: &str) -> Result<(), IdentityError> {
    let len = shortname.chars().count();
    if len != SHORTNAME_LENGTH {
        return Err(IdentityError::ShortnameLength(len));
    }
    for ch in shortname.chars() {
        if ch.is_ascii_uppercase() {
            return Err(IdentityError::ShortnameNotLowercase(shortname.to_string()));
        }
        if !ch.is_ascii_lowercase() {
            return Err(IdentityError::ShortnameInvalidCharacter(ch));
        }
    }
    Ok(())
}

/// An author identity: public address plus encoded secret key.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthorKeypair {
    /// Public identity: `@<shortname>.<base32 public key>`.
    pub address: AuthorAddress,
    /// Base32-encoded private key seed. Never part of the address.
    pub secret: String,
}

impl AuthorKeypair {
    /// Check that the secret decodes to a private key deriving exactly
    /// the public key named in the address.
    pub fn check(&self) -> Result<(), IdentityError> {
        let expected = AuthorAddress::parse(self.address.as_str())?.public_key()?;
        let keypair = self.signing_keypair()?;
        if keypair.public_key() != expected {
            return Err(IdentityError::KeyMismatch);
        }
        Ok(())
    }

    /// Sign input with this identity's private key.
    ///
    /// Deterministic: identical (keypair, input) always yields the same
    /// signature text. Text and its UTF-8 bytes sign identically. The
    /// keypair is validated first; a corrupt keypair never signs.
    pub fn sign(&self, input: impl AsRef<[u8]>) -> Result<String, IdentityError> {
        self.check()?;
        let keypair = self.signing_keypair()?;
        Ok(keypair.sign(input.as_ref()).to_base32())
    }

    /// Rebuild the signing keypair from the encoded secret.
    fn signing_keypair(&self) -> Result<Keypair, IdentityError> {
        if self.secret.is_empty() {
            return Err(IdentityError::EmptySecret);
        }
        let bytes = codec::decode(&self.secret)?;
        let seed: [u8; KEY_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| IdentityError::KeyLength {
                    expected: KEY_LENGTH,
                    got: bytes.len(),
                })?;
        Ok(Keypair::from_seed(&seed))
    }
}

impl fmt::Debug for AuthorKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret.
        write!(f, "AuthorKeypair({})", self.address)
    }
}

/// Generate a fresh author keypair for the given shortname.
pub fn generate_author_keypair(shortname: &str) -> Result<AuthorKeypair, IdentityError> {
    author_keypair_from(shortname, &Keypair::generate())
}

/// Build the author keypair record for an existing signing keypair.
pub fn author_keypair_from(
    shortname: &str,
    keypair: &Keypair,
) -> Result<AuthorKeypair, IdentityError> {
    Ok(AuthorKeypair {
        address: AuthorAddress::from_parts(shortname, &keypair.public_key())?,
        secret: codec::encode(&keypair.seed()),
    })
}

/// Verify that `signature` was made by `address`'s private key over
/// exactly `input`.
///
/// Never errors: a malformed address, a corrupt signature encoding, and a
/// genuine mismatch all resolve to `false`.
pub fn verify(address: &str, signature: &str, input: impl AsRef<[u8]>) -> bool {
    let Ok(parsed) = AuthorAddress::parse(address) else {
        return false;
    };
    let Ok(public_key) = parsed.public_key() else {
        return false;
    };
    let Ok(sig) = Signature::from_base32(signature) else {
        return false;
    };
    public_key.verify(input.as_ref(), &sig)
}
