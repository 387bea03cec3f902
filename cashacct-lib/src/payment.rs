//! Payment entry codec.
//!
//! Each payment destination in a marker record is one type-tagged field:
//! an identifier byte followed by the raw hash. The identifier byte
//! carries the entry type in its low seven bits and the address
//! namespace in the high bit, so `0x01` is a primary key-hash entry and
//! `0x81` is the token-namespace twin of the same type.

use crate::address;
use crate::{CashAcctError, Result};

/// High bit of the identifier byte selects the token namespace.
const NAMESPACE_BIT: u8 = 0x80;

/// Payment destination type carried by a marker record entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PaymentType {
    /// Pay to public key hash (20-byte hash).
    #[serde(rename = "Key Hash")]
    KeyHash,
    /// Pay to script hash (20-byte hash).
    #[serde(rename = "Script Hash")]
    ScriptHash,
    /// Reusable payment code (80-byte code, rendered in Base58Check).
    #[serde(rename = "Payment Code")]
    PaymentCode,
    /// Stealth keys. Decodes as a known type but has no textual address
    /// representation.
    #[serde(rename = "Stealth Keys")]
    StealthKeys,
}

impl PaymentType {
    /// Map a type code (identifier byte with the namespace bit cleared)
    /// to its entry type.
    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::KeyHash),
            0x02 => Some(Self::ScriptHash),
            0x03 => Some(Self::PaymentCode),
            0x04 => Some(Self::StealthKeys),
            _ => None,
        }
    }

    /// The type code carried in the low seven bits of the identifier byte.
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::KeyHash => 0x01,
            Self::ScriptHash => 0x02,
            Self::PaymentCode => 0x03,
            Self::StealthKeys => 0x04,
        }
    }

    /// Required hash body length in bytes, or `None` when the type fixes
    /// no length (stealth keys never had one standardized).
    pub fn expected_hash_len(self) -> Option<usize> {
        match self {
            Self::KeyHash | Self::ScriptHash => Some(20),
            Self::PaymentCode => Some(80),
            Self::StealthKeys => None,
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::KeyHash => "Key Hash",
            Self::ScriptHash => "Script Hash",
            Self::PaymentCode => "Payment Code",
            Self::StealthKeys => "Stealth Keys",
        };
        write!(f, "{}", name)
    }
}

/// Address namespace an entry's hash is rendered into.
///
/// Both namespaces share the identical hash payload; only the address
/// prefix (and therefore its checksum) differs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressNamespace {
    /// Main-ledger addresses (`bitcoincash:`).
    Primary,
    /// Token-layer addresses (`simpleledger:`).
    Token,
}

impl AddressNamespace {
    /// The address prefix used when rendering into this namespace.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Primary => address::LEDGER_PREFIX,
            Self::Token => address::TOKEN_PREFIX,
        }
    }
}

/// A single decoded payment destination from a marker record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentEntry {
    /// The destination type.
    pub payment_type: PaymentType,
    /// Which namespace the hash is rendered into.
    pub namespace: AddressNamespace,
    /// Raw hash body (20 bytes for key/script hash, 80 for payment code).
    pub hash: Vec<u8>,
}

impl PaymentEntry {
    /// Create an entry, enforcing the hash length rule for its type.
    ///
    /// # Errors
    ///
    /// Returns `CashAcctError::InvalidHashLength` when the hash body does
    /// not match the type's required length, or `MalformedPayload` for an
    /// empty stealth-keys body.
    pub fn new(
        payment_type: PaymentType,
        namespace: AddressNamespace,
        hash: Vec<u8>,
    ) -> Result<Self> {
        match payment_type.expected_hash_len() {
            Some(expected) if hash.len() != expected => Err(CashAcctError::InvalidHashLength {
                payment_type,
                expected,
                actual: hash.len(),
            }),
            None if hash.is_empty() => Err(CashAcctError::malformed(
                "stealth keys entry carries no key data",
            )),
            _ => Ok(Self {
                payment_type,
                namespace,
                hash,
            }),
        }
    }

    /// Build an entry from an address string, forcing the given namespace.
    ///
    /// The entry's position in a registration decides its namespace, so a
    /// caller may hand in either rendering of the address; the hash is
    /// what ends up on the wire.
    ///
    /// # Errors
    ///
    /// Returns `CashAcctError::AddressDetectionFailed` when the address
    /// matches no supported encoding.
    pub fn from_address(addr: &str, namespace: AddressNamespace) -> Result<Self> {
        let decoded = address::decode_address(addr)?;
        Self::new(decoded.payment_type, namespace, decoded.hash)
    }

    /// Decode an entry from its wire form (identifier byte + hash).
    ///
    /// # Errors
    ///
    /// Returns `CashAcctError::UnknownPaymentType` for an unmapped
    /// identifier byte and `InvalidHashLength`/`MalformedPayload` for a
    /// bad hash body.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (&identifier, hash) = bytes
            .split_first()
            .ok_or_else(|| CashAcctError::malformed("empty payment entry"))?;
        let namespace = if identifier & NAMESPACE_BIT != 0 {
            AddressNamespace::Token
        } else {
            AddressNamespace::Primary
        };
        let payment_type = PaymentType::from_code(identifier & !NAMESPACE_BIT)
            .ok_or(CashAcctError::UnknownPaymentType { identifier })?;
        Self::new(payment_type, namespace, hash.to_vec())
    }

    /// The identifier byte for this entry (type code plus namespace bit).
    pub fn identifier_byte(&self) -> u8 {
        match self.namespace {
            AddressNamespace::Primary => self.payment_type.code(),
            AddressNamespace::Token => self.payment_type.code() | NAMESPACE_BIT,
        }
    }

    /// Encode the entry into its wire form.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.hash.len());
        out.push(self.identifier_byte());
        out.extend_from_slice(&self.hash);
        out
    }

    /// Render the entry's address in its namespace.
    ///
    /// # Errors
    ///
    /// Returns `CashAcctError::NoAddressEncoding` for stealth-keys
    /// entries; the legacy ecosystem never defined a rendering for them
    /// and guessing one would misdirect funds.
    pub fn address(&self) -> Result<String> {
        address::encode_address(self.payment_type, self.namespace, &self.hash)
    }
}
