//! Address encoding and detection.
//!
//! Registrations carry raw hashes on the wire; addresses are a rendering
//! concern. Three encodings are supported:
//!
//! - the checksummed Base32 format with a self-describing prefix
//!   (`bitcoincash:` for the main ledger, `simpleledger:` for the token
//!   layer), used for key-hash and script-hash destinations;
//! - legacy Base58Check (version `0x00` key hash, `0x05` script hash);
//! - Base58Check payment codes (version `0x47`, 80-byte body).
//!
//! Both Base32 namespaces share the identical hash payload; converting
//! between them re-encodes the payload under the other prefix, which
//! recomputes the checksum. A prefix is never swapped textually.

use sha2::{Digest, Sha256};

use crate::payment::{AddressNamespace, PaymentType};
use crate::{CashAcctError, Result};

/// Main-ledger address prefix.
pub const LEDGER_PREFIX: &str = "bitcoincash";

/// Token-layer address prefix.
pub const TOKEN_PREFIX: &str = "simpleledger";

/// Base32 charset of the checksummed address format.
const CASHADDR_CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Base58 alphabet (no `0`, `O`, `I`, `l`).
const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Version bytes of the legacy Base58Check encodings.
const LEGACY_KEY_HASH_VERSION: u8 = 0x00;
const LEGACY_SCRIPT_HASH_VERSION: u8 = 0x05;
const PAYMENT_CODE_VERSION: u8 = 0x47;

/// Type bits in the Base32 payload version byte.
const KEY_HASH_KIND: u8 = 0;
const SCRIPT_HASH_KIND: u8 = 1;

/// Hash body sizes in bytes, indexed by the version byte's size bits.
const HASH_SIZES: [usize; 8] = [20, 24, 28, 32, 40, 48, 56, 64];

/// Outcome of address detection: which encoding matched and the raw hash
/// it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedAddress {
    /// The destination type the encoding implies.
    pub payment_type: PaymentType,
    /// The namespace the address was rendered in. Legacy Base58Check
    /// addresses carry no prefix and report `Primary`.
    pub namespace: AddressNamespace,
    /// Raw hash body.
    pub hash: Vec<u8>,
}

/// Detect an address encoding and extract its raw hash.
///
/// Detection order: the prefixed Base32 format first (a bare payload
/// without its prefix is tried against both known prefixes), then legacy
/// Base58Check, then Base58Check payment codes. Anything else is a hard
/// failure, never a guess.
///
/// # Errors
///
/// Returns `CashAcctError::AddressDetectionFailed` when no supported
/// encoding matches.
///
/// # Examples
///
/// ```
/// use cashacct_lib::address::decode_address;
/// use cashacct_lib::PaymentType;
///
/// let decoded =
///     decode_address("bitcoincash:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2").unwrap();
/// assert_eq!(decoded.payment_type, PaymentType::KeyHash);
/// assert_eq!(decoded.hash.len(), 20);
/// ```
pub fn decode_address(address: &str) -> Result<DecodedAddress> {
    let address = address.trim();

    if let Some((payment_type, namespace, hash)) = cashaddr_decode(address) {
        return Ok(DecodedAddress {
            payment_type,
            namespace,
            hash,
        });
    }

    if let Some((version, payload)) = base58check_decode(address) {
        let payment_type = match (version, payload.len()) {
            (LEGACY_KEY_HASH_VERSION, 20) => Some(PaymentType::KeyHash),
            (LEGACY_SCRIPT_HASH_VERSION, 20) => Some(PaymentType::ScriptHash),
            (PAYMENT_CODE_VERSION, 80) => Some(PaymentType::PaymentCode),
            _ => None,
        };
        if let Some(payment_type) = payment_type {
            return Ok(DecodedAddress {
                payment_type,
                namespace: AddressNamespace::Primary,
                hash: payload,
            });
        }
    }

    Err(CashAcctError::AddressDetectionFailed {
        address: address.to_string(),
    })
}

/// Render a raw hash as an address in the given namespace.
///
/// Key-hash and script-hash destinations render in the Base32 format
/// under the namespace's prefix. Payment codes render in Base58Check,
/// which carries no prefix and therefore reads the same in both
/// namespaces.
///
/// # Errors
///
/// Returns `CashAcctError::InvalidHashLength` when the hash body does
/// not match the type's required length, and
/// `CashAcctError::NoAddressEncoding` for stealth keys.
pub fn encode_address(
    payment_type: PaymentType,
    namespace: AddressNamespace,
    hash: &[u8],
) -> Result<String> {
    if let Some(expected) = payment_type.expected_hash_len() {
        if hash.len() != expected {
            return Err(CashAcctError::InvalidHashLength {
                payment_type,
                expected,
                actual: hash.len(),
            });
        }
    }
    match payment_type {
        PaymentType::KeyHash => Ok(cashaddr_encode(namespace.prefix(), KEY_HASH_KIND, hash)),
        PaymentType::ScriptHash => Ok(cashaddr_encode(namespace.prefix(), SCRIPT_HASH_KIND, hash)),
        PaymentType::PaymentCode => Ok(base58check_encode(PAYMENT_CODE_VERSION, hash)),
        PaymentType::StealthKeys => Err(CashAcctError::NoAddressEncoding { payment_type }),
    }
}

/// Re-render any supported address in the token namespace.
///
/// # Errors
///
/// Propagates detection failures; the input must already be a valid
/// address.
pub fn to_token_address(address: &str) -> Result<String> {
    convert_namespace(address, AddressNamespace::Token)
}

/// Re-render any supported address in the main-ledger namespace.
///
/// # Errors
///
/// Propagates detection failures; the input must already be a valid
/// address.
pub fn to_ledger_address(address: &str) -> Result<String> {
    convert_namespace(address, AddressNamespace::Primary)
}

fn convert_namespace(address: &str, namespace: AddressNamespace) -> Result<String> {
    let decoded = decode_address(address)?;
    encode_address(decoded.payment_type, namespace, &decoded.hash)
}

// ============================================================================
// Checksummed Base32 format
// ============================================================================

fn cashaddr_encode(prefix: &str, kind: u8, hash: &[u8]) -> String {
    let mut payload = Vec::with_capacity(hash.len() + 1);
    // Version byte: type bits 3-6, size bits 0-2 (20-byte bodies encode as 0).
    payload.push(kind << 3);
    payload.extend_from_slice(hash);
    let groups = to_five_bit_groups(&payload);

    let mut checksum_input = prefix_expand(prefix);
    checksum_input.extend_from_slice(&groups);
    checksum_input.extend_from_slice(&[0u8; 8]);
    let poly = polymod(&checksum_input);

    let mut out = String::with_capacity(prefix.len() + 1 + groups.len() + 8);
    out.push_str(prefix);
    out.push(':');
    for &group in &groups {
        out.push(CASHADDR_CHARSET[group as usize] as char);
    }
    for i in (0..8).rev() {
        let group = ((poly >> (5 * i)) & 0x1f) as u8;
        out.push(CASHADDR_CHARSET[group as usize] as char);
    }
    out
}

fn cashaddr_decode(address: &str) -> Option<(PaymentType, AddressNamespace, Vec<u8>)> {
    // Uniformly cased input is accepted either way; mixed case is not an
    // address, it is a transcription error.
    let has_upper = address.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = address.bytes().any(|b| b.is_ascii_lowercase());
    if has_upper && has_lower {
        return None;
    }
    let lowered = address.to_ascii_lowercase();

    match lowered.split_once(':') {
        Some((prefix, body)) => {
            let namespace = namespace_for_prefix(prefix)?;
            cashaddr_decode_body(prefix, namespace, body)
        }
        None => [
            (LEDGER_PREFIX, AddressNamespace::Primary),
            (TOKEN_PREFIX, AddressNamespace::Token),
        ]
        .into_iter()
        .find_map(|(prefix, namespace)| cashaddr_decode_body(prefix, namespace, &lowered)),
    }
}

fn namespace_for_prefix(prefix: &str) -> Option<AddressNamespace> {
    match prefix {
        LEDGER_PREFIX => Some(AddressNamespace::Primary),
        TOKEN_PREFIX => Some(AddressNamespace::Token),
        _ => None,
    }
}

fn cashaddr_decode_body(
    prefix: &str,
    namespace: AddressNamespace,
    body: &str,
) -> Option<(PaymentType, AddressNamespace, Vec<u8>)> {
    // At minimum a version byte's worth of payload plus the 8 checksum
    // symbols.
    if body.len() < 10 {
        return None;
    }
    let mut groups = Vec::with_capacity(body.len());
    for byte in body.bytes() {
        let index = CASHADDR_CHARSET.iter().position(|&c| c == byte)?;
        groups.push(index as u8);
    }

    let mut checksum_input = prefix_expand(prefix);
    checksum_input.extend_from_slice(&groups);
    if polymod(&checksum_input) != 0 {
        return None;
    }

    let payload = from_five_bit_groups(&groups[..groups.len() - 8])?;
    let (&version, hash) = payload.split_first()?;
    if version & 0x80 != 0 {
        return None;
    }
    let payment_type = match (version >> 3) & 0x0f {
        KEY_HASH_KIND => PaymentType::KeyHash,
        SCRIPT_HASH_KIND => PaymentType::ScriptHash,
        _ => return None,
    };
    if hash.len() != HASH_SIZES[(version & 0x07) as usize] {
        return None;
    }
    Some((payment_type, namespace, hash.to_vec()))
}

/// 40-bit BCH checksum over 5-bit symbols.
fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(d);
        if c0 & 0x01 != 0 {
            c ^= 0x98_f2bc_8e61;
        }
        if c0 & 0x02 != 0 {
            c ^= 0x79_b76d_99e2;
        }
        if c0 & 0x04 != 0 {
            c ^= 0xf3_3e5f_b3c4;
        }
        if c0 & 0x08 != 0 {
            c ^= 0xae_2eab_e2a8;
        }
        if c0 & 0x10 != 0 {
            c ^= 0x1e_4f43_e470;
        }
    }
    c ^ 1
}

/// Lower 5 bits of each prefix character, followed by a zero separator.
fn prefix_expand(prefix: &str) -> Vec<u8> {
    let mut out: Vec<u8> = prefix.bytes().map(|b| b & 0x1f).collect();
    out.push(0);
    out
}

/// Regroup bytes into 5-bit symbols, zero-padding the tail.
fn to_five_bit_groups(data: &[u8]) -> Vec<u8> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * 8 / 5 + 1);
    for &byte in data {
        acc = (acc << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(((acc >> bits) & 0x1f) as u8);
        }
    }
    if bits > 0 {
        out.push(((acc << (5 - bits)) & 0x1f) as u8);
    }
    out
}

/// Regroup 5-bit symbols back into bytes; fails on non-zero padding or a
/// dangling symbol.
fn from_five_bit_groups(data: &[u8]) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * 5 / 8);
    for &value in data {
        acc = (acc << 5) | u32::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((acc >> bits) & 0xff) as u8);
        }
    }
    if bits >= 5 {
        return None;
    }
    if bits > 0 && (acc << (8 - bits)) & 0xff != 0 {
        return None;
    }
    Some(out)
}

// ============================================================================
// Base58Check
// ============================================================================

fn base58check_encode(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 5);
    data.push(version);
    data.extend_from_slice(payload);
    let checksum = Sha256::digest(Sha256::digest(&data));
    data.extend_from_slice(&checksum[..4]);

    // Base conversion, least significant digit first.
    let mut digits: Vec<u8> = Vec::new();
    for &byte in &data {
        let mut carry = u32::from(byte);
        for digit in digits.iter_mut() {
            carry += u32::from(*digit) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(data.len() * 2);
    for _ in data.iter().take_while(|&&b| b == 0) {
        out.push('1');
    }
    for &digit in digits.iter().rev() {
        out.push(BASE58_ALPHABET[digit as usize] as char);
    }
    out
}

fn base58check_decode(text: &str) -> Option<(u8, Vec<u8>)> {
    if text.is_empty() {
        return None;
    }
    // Little-endian byte accumulator for the base conversion.
    let mut bytes: Vec<u8> = Vec::new();
    for ch in text.bytes() {
        let index = BASE58_ALPHABET.iter().position(|&c| c == ch)? as u32;
        let mut carry = index;
        for byte in bytes.iter_mut() {
            carry += u32::from(*byte) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    for _ in text.bytes().take_while(|&b| b == b'1') {
        bytes.push(0);
    }
    bytes.reverse();

    if bytes.len() < 5 {
        return None;
    }
    let (body, checksum) = bytes.split_at(bytes.len() - 4);
    let digest = Sha256::digest(Sha256::digest(body));
    if digest[..4] != *checksum {
        return None;
    }
    let (&version, payload) = body.split_first()?;
    Some((version, payload.to_vec()))
}
