//! Turning located records into resolved identities, and registration
//! requests into marker payloads.
//!
//! Locating a record on the ledger is the lookup collaborator's job; by
//! the time data reaches [`resolve`] it is plain bytes and metadata.
//! Everything here is pure and synchronous.

use serde::{Deserialize, Serialize};

use crate::handle::Handle;
use crate::identity;
use crate::payment::{AddressNamespace, PaymentEntry, PaymentType};
use crate::script::RegistrationPayload;
use crate::{CashAcctError, Result};

/// A candidate record as supplied by a lookup collaborator: the raw
/// marker payload (script bytes or indexer text) plus the confirmation
/// metadata the derivations need.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Marker payload in either wire view.
    pub payload: Vec<u8>,
    /// Hex block hash of the confirming block.
    pub block_hash: String,
    /// Height of the confirming block.
    pub block_height: u64,
    /// Hex id of the registration transaction.
    pub txid: String,
    /// Username the collaborator matched on. Advisory: [`resolve`] takes
    /// the username from the decoded payload, not from here.
    pub username: String,
}

impl RawRecord {
    pub fn new(
        payload: Vec<u8>,
        block_hash: impl Into<String>,
        block_height: u64,
        txid: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            payload,
            block_hash: block_hash.into(),
            block_height,
            txid: txid.into(),
            username: username.into(),
        }
    }
}

/// One resolved payment destination, rendered in its namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub address: String,
}

/// The fully resolved identity behind a handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub username: String,
    pub number: u64,
    pub emoji: char,
    pub collision_hash: String,
    pub payments: Vec<Payment>,
}

impl Identifier {
    /// The bare handle for this identity. Disambiguation against
    /// same-name, same-number registrations uses [`collision_hash`]
    /// digits, which callers append as needed.
    ///
    /// [`collision_hash`]: Identifier::collision_hash
    ///
    /// # Errors
    ///
    /// Returns `CashAcctError::InvalidHandle` for the degenerate account
    /// number zero, which no well-formed handle can carry.
    pub fn handle(&self) -> Result<Handle> {
        Handle::new(self.username.clone(), self.number, None)
    }
}

/// Resolve a located record into its identity.
///
/// Decodes the marker payload, derives the account number from the
/// confirmation height and the fingerprint pair from the block hash and
/// transaction id, and renders every payment entry as an address.
///
/// # Errors
///
/// Propagates payload decode failures (`MalformedPayload`,
/// `IncompletePayload`, `UnknownPaymentType`), rejects pre-activation
/// heights with `NegativeAccountNumber`, malformed metadata with
/// `InvalidRecordData`, and stealth-keys entries with
/// `NoAddressEncoding` rather than returning a partial identity.
pub fn resolve(record: &RawRecord) -> Result<Identifier> {
    let payload = RegistrationPayload::decode(&record.payload)?;
    let number = identity::account_number(record.block_height)?;
    let block_hash = decode_hash_field("block hash", &record.block_hash)?;
    let txid = decode_hash_field("transaction id", &record.txid)?;

    let payments = payload
        .entries
        .iter()
        .map(|entry| {
            Ok(Payment {
                payment_type: entry.payment_type,
                address: entry.address()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Identifier {
        username: payload.username,
        number,
        emoji: identity::emoji(&block_hash, &txid),
        collision_hash: identity::collision_hash(&block_hash, &txid),
        payments,
    })
}

/// Assemble the marker payload for a new registration.
///
/// The ledger address becomes the primary entry; the token address, when
/// given, becomes the token-namespace entry. Either address may arrive
/// in any supported rendering, the entry's position decides its
/// namespace.
///
/// # Errors
///
/// Returns `CashAcctError::AddressDetectionFailed` for an address that
/// matches no supported encoding, plus the payload invariant failures of
/// [`RegistrationPayload::new`].
pub fn build_registration(
    username: &str,
    ledger_address: &str,
    token_address: Option<&str>,
) -> Result<RegistrationPayload> {
    let mut entries = vec![PaymentEntry::from_address(
        ledger_address,
        AddressNamespace::Primary,
    )?];
    if let Some(address) = token_address {
        entries.push(PaymentEntry::from_address(address, AddressNamespace::Token)?);
    }
    RegistrationPayload::new(username, entries)
}

/// Hex-decode a 32-byte metadata field (block hash or transaction id).
fn decode_hash_field(field: &'static str, hex_text: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(hex_text)
        .map_err(|_| CashAcctError::invalid_record(field, "not valid hex"))?;
    if bytes.len() != 32 {
        return Err(CashAcctError::invalid_record(
            field,
            format!("expected 32 bytes, got {}", bytes.len()),
        ));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HASH: &str = "f5bf48b397dae70be82b3cca4793f8eb2b6cdac9";
    const BLOCK_HASH: &str = "000000000000000002abbeff5f6fb22a0b3b5c2685c6ef4ed2d2257ed54e9dcb";
    const TXID: &str = "590d1fdf7e04af0ee08f9194bb9e8d1971bdcbf55d29303d5bf32d4eae5e7136";

    fn primary_entry() -> PaymentEntry {
        PaymentEntry::new(
            PaymentType::KeyHash,
            AddressNamespace::Primary,
            hex::decode(KEY_HASH).unwrap(),
        )
        .unwrap()
    }

    fn token_entry() -> PaymentEntry {
        PaymentEntry::new(
            PaymentType::KeyHash,
            AddressNamespace::Token,
            hex::decode(KEY_HASH).unwrap(),
        )
        .unwrap()
    }

    fn record_with(entries: Vec<PaymentEntry>) -> RawRecord {
        let payload = RegistrationPayload::new("jonathan", entries).unwrap();
        RawRecord::new(
            payload.to_script().unwrap(),
            BLOCK_HASH,
            563_720,
            TXID,
            "jonathan",
        )
    }

    #[test]
    fn resolves_a_single_entry_record() {
        let identifier = resolve(&record_with(vec![primary_entry()])).unwrap();
        assert_eq!(identifier.username, "jonathan");
        assert_eq!(identifier.number, 100);
        assert_eq!(identifier.emoji, '☯');
        assert_eq!(identifier.collision_hash, "5876958390");
        assert_eq!(identifier.payments.len(), 1);
        assert_eq!(identifier.payments[0].payment_type, PaymentType::KeyHash);
        assert_eq!(
            identifier.payments[0].address,
            "bitcoincash:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2"
        );
        assert_eq!(identifier.handle().unwrap().to_string(), "jonathan#100");
    }

    #[test]
    fn token_entries_resolve_to_token_addresses() {
        let identifier = resolve(&record_with(vec![primary_entry(), token_entry()])).unwrap();
        assert_eq!(identifier.payments.len(), 2);
        assert_eq!(
            identifier.payments[1].address,
            "simpleledger:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eynz2uvkk5"
        );
    }

    #[test]
    fn text_view_records_resolve_identically() {
        let script_record = record_with(vec![primary_entry()]);
        let payload = RegistrationPayload::new("jonathan", vec![primary_entry()]).unwrap();
        let text_record = RawRecord::new(
            payload.to_marker_text().into_bytes(),
            BLOCK_HASH,
            563_720,
            TXID,
            "jonathan",
        );
        assert_eq!(resolve(&text_record).unwrap(), resolve(&script_record).unwrap());
    }

    #[test]
    fn payload_username_is_the_source_of_truth() {
        let mut record = record_with(vec![primary_entry()]);
        record.username = "imposter".to_string();
        assert_eq!(resolve(&record).unwrap().username, "jonathan");
    }

    #[test]
    fn pre_activation_records_are_rejected() {
        let mut record = record_with(vec![primary_entry()]);
        record.block_height = identity::GENESIS_BLOCK - 1;
        assert!(matches!(
            resolve(&record).unwrap_err(),
            CashAcctError::NegativeAccountNumber { .. }
        ));
    }

    #[test]
    fn metadata_fields_must_be_32_byte_hex() {
        let mut record = record_with(vec![primary_entry()]);
        record.block_hash = "zz".repeat(32);
        assert!(matches!(
            resolve(&record).unwrap_err(),
            CashAcctError::InvalidRecordData { ref field, .. } if field == "block hash"
        ));

        let mut record = record_with(vec![primary_entry()]);
        record.txid = "ab".repeat(31);
        assert!(matches!(
            resolve(&record).unwrap_err(),
            CashAcctError::InvalidRecordData { ref field, .. } if field == "transaction id"
        ));
    }

    #[test]
    fn stealth_entries_fail_resolution_loudly() {
        let stealth = PaymentEntry::new(
            PaymentType::StealthKeys,
            AddressNamespace::Primary,
            vec![0x02; 33],
        )
        .unwrap();
        let err = resolve(&record_with(vec![stealth])).unwrap_err();
        assert!(matches!(err, CashAcctError::NoAddressEncoding { .. }));
    }

    #[test]
    fn builds_registrations_from_addresses() {
        let payload = build_registration(
            "jonathan",
            "bitcoincash:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2",
            Some("simpleledger:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eynz2uvkk5"),
        )
        .unwrap();
        assert_eq!(payload.username, "jonathan");
        assert_eq!(payload.entries.len(), 2);
        assert_eq!(payload.entries[0].namespace, AddressNamespace::Primary);
        assert_eq!(payload.entries[1].namespace, AddressNamespace::Token);
        assert_eq!(hex::encode(&payload.entries[0].hash), KEY_HASH);
        assert_eq!(hex::encode(&payload.entries[1].hash), KEY_HASH);
    }

    #[test]
    fn entry_position_decides_the_namespace() {
        // A token destination handed in as its ledger rendering still
        // lands in the token namespace.
        let payload = build_registration(
            "jonathan",
            "bitcoincash:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2",
            Some("bitcoincash:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2"),
        )
        .unwrap();
        assert_eq!(payload.entries[1].namespace, AddressNamespace::Token);
        assert_eq!(
            payload.entries[1].address().unwrap(),
            "simpleledger:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eynz2uvkk5"
        );
    }

    #[test]
    fn unrecognized_addresses_fail_the_build() {
        let err = build_registration("jonathan", "not an address", None).unwrap_err();
        assert!(matches!(err, CashAcctError::AddressDetectionFailed { .. }));
    }

    #[test]
    fn identifier_serializes_with_protocol_type_names() {
        let identifier = resolve(&record_with(vec![primary_entry(), token_entry()])).unwrap();
        let value = serde_json::to_value(&identifier).unwrap();
        assert_eq!(value["payments"][0]["type"], "Key Hash");
        assert_eq!(value["emoji"], "☯");
        assert_eq!(value["number"], 100);
        // Consumers get rendered addresses; the raw entry bytes stay
        // behind the payload codec.
        assert_eq!(
            value["payments"][1]["address"],
            "simpleledger:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eynz2uvkk5"
        );
    }
}
