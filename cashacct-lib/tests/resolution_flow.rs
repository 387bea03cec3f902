//! End-to-end flows through the collaborator traits.
//!
//! An in-memory record source and sink stand in for a lookup service and
//! a broadcaster, so the full resolve and register paths run without
//! network access.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use cashacct_lib::{
    register_account, resolve_by_txid, resolve_handle, CashAcctError, Handle, RawRecord,
    RecordSource, RegistrationPayload, RegistrationReceipt, RegistrationSink, Result,
};

const BLOCK_HASH: &str = "000000000000000002abbeff5f6fb22a0b3b5c2685c6ef4ed2d2257ed54e9dcb";
const TXID: &str = "590d1fdf7e04af0ee08f9194bb9e8d1971bdcbf55d29303d5bf32d4eae5e7136";
const LEDGER_ADDRESS: &str = "bitcoincash:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2";
const TOKEN_ADDRESS: &str = "simpleledger:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eynz2uvkk5";

/// Record source backed by maps, keyed the way a lookup service keys its
/// indexes.
#[derive(Default)]
struct MemorySource {
    by_handle: HashMap<String, RawRecord>,
    by_txid: HashMap<String, RawRecord>,
    required_collision: Option<String>,
}

impl MemorySource {
    fn with_record(username: &str, number: u64, record: RawRecord) -> Self {
        let mut source = Self::default();
        source
            .by_txid
            .insert(record.txid.clone(), record.clone());
        source.by_handle.insert(format!("{username}#{number}"), record);
        source
    }

    fn requiring_collision(mut self, collision: &str) -> Self {
        self.required_collision = Some(collision.to_string());
        self
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn find_record(
        &self,
        username: &str,
        number: u64,
        collision: Option<&str>,
    ) -> Result<Option<RawRecord>> {
        if let Some(required) = &self.required_collision {
            if collision != Some(required.as_str()) {
                return Ok(None);
            }
        }
        Ok(self.by_handle.get(&format!("{username}#{number}")).cloned())
    }

    async fn record_by_txid(&self, txid: &str) -> Result<Option<RawRecord>> {
        Ok(self.by_txid.get(txid).cloned())
    }
}

/// Sink that captures submitted payloads instead of broadcasting them.
#[derive(Default)]
struct MemorySink {
    submitted: Mutex<Vec<RegistrationPayload>>,
}

#[async_trait]
impl RegistrationSink for MemorySink {
    async fn submit_registration(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<RegistrationReceipt> {
        self.submitted.lock().unwrap().push(payload.clone());
        Ok(RegistrationReceipt {
            txid: TXID.to_string(),
            raw_tx_hex: None,
        })
    }
}

/// Source whose every call fails at the transport layer.
struct BrokenSource;

#[async_trait]
impl RecordSource for BrokenSource {
    async fn find_record(&self, _: &str, _: u64, _: Option<&str>) -> Result<Option<RawRecord>> {
        Err(CashAcctError::Transport("connection refused".to_string()))
    }

    async fn record_by_txid(&self, _: &str) -> Result<Option<RawRecord>> {
        Err(CashAcctError::Transport("connection refused".to_string()))
    }
}

fn seeded_record() -> RawRecord {
    let payload = cashacct_lib::build_registration(
        "jonathan",
        LEDGER_ADDRESS,
        Some(TOKEN_ADDRESS),
    )
    .unwrap();
    RawRecord::new(payload.to_script().unwrap(), BLOCK_HASH, 563_720, TXID, "jonathan")
}

#[tokio::test]
async fn resolves_a_seeded_handle() {
    let source = MemorySource::with_record("jonathan", 100, seeded_record());
    let handle = Handle::parse("jonathan#100").unwrap();

    let identity = resolve_handle(&source, &handle).await.unwrap().unwrap();
    assert_eq!(identity.username, "jonathan");
    assert_eq!(identity.number, 100);
    assert_eq!(identity.emoji, '☯');
    assert_eq!(identity.collision_hash, "5876958390");
    assert_eq!(identity.payments[0].address, LEDGER_ADDRESS);
    assert_eq!(identity.payments[1].address, TOKEN_ADDRESS);
    assert_eq!(identity.handle().unwrap(), handle);
}

#[tokio::test]
async fn missing_handles_resolve_to_none() {
    let source = MemorySource::with_record("jonathan", 100, seeded_record());
    let handle = Handle::parse("someone_else#515").unwrap();
    assert!(resolve_handle(&source, &handle).await.unwrap().is_none());
}

#[tokio::test]
async fn collision_digits_reach_the_source() {
    let source = MemorySource::with_record("jonathan", 100, seeded_record())
        .requiring_collision("5876958390");

    let bare = Handle::parse("jonathan#100").unwrap();
    assert!(resolve_handle(&source, &bare).await.unwrap().is_none());

    let qualified = Handle::parse("jonathan#100.5876958390").unwrap();
    assert!(resolve_handle(&source, &qualified).await.unwrap().is_some());
}

#[tokio::test]
async fn resolves_by_transaction_id() {
    let source = MemorySource::with_record("jonathan", 100, seeded_record());

    let identity = resolve_by_txid(&source, TXID).await.unwrap().unwrap();
    assert_eq!(identity.number, 100);
    assert!(resolve_by_txid(&source, &"00".repeat(32))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn registration_submits_the_encoded_payload() {
    let sink = MemorySink::default();

    let receipt = register_account(&sink, "jonathan", LEDGER_ADDRESS, Some(TOKEN_ADDRESS))
        .await
        .unwrap();
    assert_eq!(receipt.txid, TXID);

    let submitted = sink.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].username, "jonathan");
    assert_eq!(submitted[0].entries.len(), 2);

    // What was submitted resolves back to the input addresses.
    let record = RawRecord::new(
        submitted[0].to_script().unwrap(),
        BLOCK_HASH,
        563_720,
        TXID,
        "jonathan",
    );
    let identity = cashacct_lib::resolve(&record).unwrap();
    assert_eq!(identity.payments[0].address, LEDGER_ADDRESS);
    assert_eq!(identity.payments[1].address, TOKEN_ADDRESS);
}

#[tokio::test]
async fn bad_addresses_never_reach_the_sink() {
    let sink = MemorySink::default();

    let err = register_account(&sink, "jonathan", "not an address", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CashAcctError::AddressDetectionFailed { .. }));
    assert!(sink.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn transport_failures_name_the_operation() {
    let handle = Handle::parse("jonathan#100").unwrap();
    let err = resolve_handle(&BrokenSource, &handle).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "transport error: resolve_handle: connection refused"
    );

    let err = resolve_by_txid(&BrokenSource, TXID).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "transport error: resolve_by_txid: connection refused"
    );
}
