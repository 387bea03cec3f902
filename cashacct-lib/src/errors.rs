//! Error types for Cash Account operations.
//!
//! Every failure is terminal for the operation that raised it: the library
//! never retries internally and never substitutes a guessed value for a
//! field it could not decode.

use crate::payment::PaymentType;

/// Comprehensive error type for Cash Account operations.
#[derive(thiserror::Error, Debug)]
pub enum CashAcctError {
    /// The address string matches none of the supported encodings.
    #[error("unrecognized address: {address}")]
    AddressDetectionFailed {
        /// The address as supplied by the caller.
        address: String,
    },

    /// A payment entry carries an identifier byte outside the protocol table.
    #[error("unknown payment type identifier: 0x{identifier:02x}")]
    UnknownPaymentType {
        /// The offending identifier byte.
        identifier: u8,
    },

    /// The marker payload violates the wire grammar.
    #[error("malformed registration payload: {reason}")]
    MalformedPayload {
        /// What the grammar check tripped on.
        reason: String,
    },

    /// Prefix and username decoded, but no payment entry followed.
    #[error("registration payload carries no payment entry")]
    IncompletePayload,

    /// The handle text fails the `name#number[.collision]` grammar.
    #[error("invalid handle '{handle}': {reason}")]
    InvalidHandle {
        /// The handle as supplied by the caller.
        handle: String,
        /// What the grammar check tripped on.
        reason: String,
    },

    /// The block height precedes the protocol activation offset.
    #[error("block height {block_height} precedes the account numbering offset")]
    NegativeAccountNumber {
        /// The offending block height.
        block_height: u64,
    },

    /// A payment entry hash body has the wrong size for its type.
    #[error("{payment_type} hash must be {expected} bytes, got {actual}")]
    InvalidHashLength {
        /// The entry type whose length rule was violated.
        payment_type: PaymentType,
        /// Required hash length in bytes.
        expected: usize,
        /// Length actually seen.
        actual: usize,
    },

    /// The entry type has no textual address representation.
    #[error("no address encoding exists for {payment_type} entries")]
    NoAddressEncoding {
        /// The entry type that cannot be rendered.
        payment_type: PaymentType,
    },

    /// Record metadata (block hash, txid) could not be decoded.
    #[error("invalid record {field}: {reason}")]
    InvalidRecordData {
        /// Which record field was undecodable.
        field: String,
        /// Why decoding failed.
        reason: String,
    },

    /// Collaborator-side failure surfaced through the lookup boundary.
    #[error("transport error: {0}")]
    Transport(String),
}

impl CashAcctError {
    /// Create a malformed payload error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    /// Create an invalid record data error.
    pub fn invalid_record(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecordData {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a transport error from any error type.
    pub fn transport<E: std::error::Error>(err: E) -> Self {
        Self::Transport(err.to_string())
    }
}
