//! Collaborator traits at the I/O boundary.
//!
//! The core never performs network I/O. Locating candidate records and
//! broadcasting new registrations are supplied by implementations of
//! these traits (a hosted lookup service, an indexer, a node RPC); the
//! core consumes whatever they produce as plain data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::resolver::RawRecord;
use crate::script::RegistrationPayload;
use crate::Result;

/// Receipt returned by a registration sink after broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    /// Transaction id of the broadcast registration.
    pub txid: String,
    /// Raw transaction hex, when the sink exposes it.
    pub raw_tx_hex: Option<String>,
}

/// Read access to confirmed registration records.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait RecordSource {
    /// Locate the confirmed record behind `username#number`, using the
    /// collision digits to disambiguate when several candidates share
    /// the pair.
    ///
    /// Implementations order and filter candidates before returning
    /// (first confirmed wins); `None` means no confirmed record exists.
    async fn find_record(
        &self,
        username: &str,
        number: u64,
        collision: Option<&str>,
    ) -> Result<Option<RawRecord>>;

    /// Fetch the record created by a specific registration transaction.
    async fn record_by_txid(&self, txid: &str) -> Result<Option<RawRecord>>;
}

/// Write access for broadcasting new registrations.
///
/// Transaction assembly, fee selection, signing, and broadcast are all
/// the sink's concern; it receives only the marker payload to embed.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait RegistrationSink {
    /// Embed the payload in a null-data output, broadcast, and return
    /// the receipt.
    async fn submit_registration(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<RegistrationReceipt>;
}
