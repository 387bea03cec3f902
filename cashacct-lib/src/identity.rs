//! Deterministic identity derivations.
//!
//! Account numbers, emoji fingerprints, and collision hashes are all
//! derived, never stored. Every implementation of the protocol must
//! compute them bit-for-bit identically, so the byte layouts here are
//! pinned by cross-checked test vectors: the fingerprint digest hashes
//! raw block-hash and transaction-id bytes, never their hex text.

use sha2::{Digest, Sha256};

use crate::{CashAcctError, Result};

/// Block-height anchor for account numbering. The protocol activated at
/// block 563720 with account numbers starting at 100.
pub const GENESIS_BLOCK: u64 = 563_720 - 100;

/// The 100 fingerprint symbols, indexed by the fingerprint digest
/// reduced modulo 100.
pub const EMOJI_TABLE: [char; 100] = [
    '👻', '🐒', '🐕', '🐈', '🐎', '🐄', '🐖', '🐐', '🐪', '🐘',
    '🐀', '🐇', '🐿', '🦇', '🐓', '🐧', '🦆', '🦉', '🐢', '🐍',
    '🐟', '🐙', '🐌', '🦋', '🐝', '🐞', '🕷', '🌻', '🌲', '🌴',
    '🌵', '🍁', '🍀', '🍇', '🍉', '🍋', '🍌', '🍎', '🍒', '🍓',
    '🥝', '🥥', '🥕', '🌽', '🌶', '🍄', '🧀', '🥚', '🦀', '🍪',
    '🎂', '🍭', '🏠', '🚗', '🚲', '⛵', '✈', '🚁', '🚀', '⌚',
    '☀', '⭐', '🌈', '☂', '🎈', '🎀', '⚽', '♠', '♥', '♦',
    '♣', '👓', '👑', '🎩', '🔔', '🎵', '🎤', '🎧', '🎸', '🎺',
    '🥁', '🔍', '🕯', '💡', '📖', '✉', '📦', '✏', '💼', '📋',
    '✂', '🔑', '🔒', '🔨', '🔧', '⚖', '☯', '🚩', '👣', '🍞',
];

/// Account number for a record confirmed at the given block height.
///
/// # Errors
///
/// Returns `CashAcctError::NegativeAccountNumber` for heights before the
/// protocol anchor.
pub fn account_number(block_height: u64) -> Result<u64> {
    block_height
        .checked_sub(GENESIS_BLOCK)
        .ok_or(CashAcctError::NegativeAccountNumber { block_height })
}

/// Block height at which records with the given account number confirmed.
/// Inverse of [`account_number`].
pub fn block_height_for_number(number: u64) -> u64 {
    GENESIS_BLOCK.saturating_add(number)
}

/// Emoji fingerprint of a confirmed registration.
///
/// The digest's last four bytes (the last 8 hex characters of its text
/// form), read as a big-endian integer and reduced modulo 100, index the
/// fixed symbol table.
pub fn emoji(block_hash: &[u8], txid: &[u8]) -> char {
    let digest = fingerprint_digest(block_hash, txid);
    let mut tail = [0u8; 4];
    tail.copy_from_slice(&digest[28..]);
    let index = u32::from_be_bytes(tail) % 100;
    EMOJI_TABLE[index as usize]
}

/// Collision hash of a confirmed registration: always 10 ASCII digits.
///
/// The digest's first four bytes (the first 8 hex characters), read as a
/// big-endian integer, are written in decimal, the digit string is
/// reversed, then right-padded with zeros to 10 characters. A reversed
/// string of 10 or more digits passes through unpadded and untruncated.
pub fn collision_hash(block_hash: &[u8], txid: &[u8]) -> String {
    let digest = fingerprint_digest(block_hash, txid);
    let mut head = [0u8; 4];
    head.copy_from_slice(&digest[..4]);
    let reversed: String = u32::from_be_bytes(head)
        .to_string()
        .chars()
        .rev()
        .collect();
    format!("{reversed:0<10}")
}

/// SHA-256 over `block_hash || txid`, both as raw bytes.
fn fingerprint_digest(block_hash: &[u8], txid: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(block_hash);
    hasher.update(txid);
    hasher.finalize().into()
}
