//! Cash Account naming protocol.
//!
//! A Cash Account ties a human-readable handle such as `jonathan#100` to
//! payment destinations through a marker record embedded in a Bitcoin
//! Cash transaction. This crate implements the protocol codec and keeps
//! it pure: encoding registrations into marker payloads, decoding
//! located records back into structured identities, and the
//! hash-derived identifiers (account number, emoji fingerprint,
//! collision hash) that every implementation must compute bit-for-bit
//! identically. Network access is delegated to callers through
//! trait-based dependency injection.
//!
//! # Features
//!
//! - **Handle grammar**: parse and render `name#number[.collision]`
//! - **Marker codec**: both wire views of a registration record, the raw
//!   null-data script and the space-separated indexer text
//! - **Address codec**: checksummed Base32, legacy Base58Check, and
//!   payment-code encodings, convertible between the ledger and token
//!   namespaces
//! - **Deterministic identity**: account number, emoji fingerprint, and
//!   collision hash derivations with pinned cross-implementation vectors
//! - **Collaborator traits**: record lookup and registration submission
//!   stay behind [`RecordSource`] and [`RegistrationSink`]
//!
//! # Example
//!
//! ```
//! use cashacct_lib::build_registration;
//!
//! # fn main() -> cashacct_lib::Result<()> {
//! let payload = build_registration(
//!     "jonathan",
//!     "bitcoincash:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2",
//!     None,
//! )?;
//! assert_eq!(
//!     payload.to_marker_text(),
//!     "OP_RETURN 01010101 6a6f6e617468616e 01f5bf48b397dae70be82b3cca4793f8eb2b6cdac9",
//! );
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod errors;
pub mod handle;
pub mod identity;
pub mod lookup;
pub mod payment;
pub mod resolver;
pub mod script;

pub use errors::CashAcctError;
pub use handle::Handle;
pub use lookup::{RecordSource, RegistrationReceipt, RegistrationSink};
pub use payment::{AddressNamespace, PaymentEntry, PaymentType};
pub use resolver::{build_registration, resolve, Identifier, Payment, RawRecord};
pub use script::{RegistrationPayload, PROTOCOL_PREFIX};

/// Common result alias for Cash Account operations.
pub type Result<T> = std::result::Result<T, CashAcctError>;

/// Resolves a handle to its registered identity through the injected
/// record source.
///
/// # Semantics
/// - Returns `Ok(None)` when no confirmed record exists for the handle.
/// - Propagates record decode failures and transport errors; a record
///   that cannot be decoded is never silently skipped.
///
/// # Examples
/// ```
/// # use cashacct_lib::{resolve_handle, Handle, RecordSource};
/// # async fn demo(source: &impl RecordSource) -> cashacct_lib::Result<()> {
/// let handle = Handle::parse("jonathan#100")?;
/// match resolve_handle(source, &handle).await? {
///     Some(identity) => println!("{} {}", identity.emoji, identity.payments[0].address),
///     None => println!("no such account"),
/// }
/// # Ok(())
/// # }
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(skip(source), fields(handle = %handle)))]
pub async fn resolve_handle<S>(source: &S, handle: &Handle) -> Result<Option<Identifier>>
where
    S: RecordSource,
{
    let record = source
        .find_record(&handle.username, handle.number, handle.collision.as_deref())
        .await
        .map_err(|err| map_transport_error("resolve_handle", err))?;
    record.as_ref().map(resolver::resolve).transpose()
}

/// Resolves the identity registered by a specific transaction.
///
/// # Semantics
/// - Returns `Ok(None)` when the transaction is unknown to the source or
///   carries no confirmed registration.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(source)))]
pub async fn resolve_by_txid<S>(source: &S, txid: &str) -> Result<Option<Identifier>>
where
    S: RecordSource,
{
    let record = source
        .record_by_txid(txid)
        .await
        .map_err(|err| map_transport_error("resolve_by_txid", err))?;
    record.as_ref().map(resolver::resolve).transpose()
}

/// Builds the marker payload for a new registration and submits it
/// through the injected sink.
///
/// The sink owns transaction assembly, fees, signing, and broadcast;
/// this function owns payload correctness. Either address may arrive in
/// any supported rendering.
///
/// # Examples
/// ```
/// # use cashacct_lib::{register_account, RegistrationSink};
/// # async fn demo(sink: &impl RegistrationSink) -> cashacct_lib::Result<()> {
/// let receipt = register_account(
///     sink,
///     "jonathan",
///     "bitcoincash:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2",
///     None,
/// )
/// .await?;
/// println!("registered in {}", receipt.txid);
/// # Ok(())
/// # }
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(skip(sink), fields(username = %username)))]
pub async fn register_account<S>(
    sink: &S,
    username: &str,
    ledger_address: &str,
    token_address: Option<&str>,
) -> Result<RegistrationReceipt>
where
    S: RegistrationSink,
{
    let payload = resolver::build_registration(username, ledger_address, token_address)?;
    sink.submit_registration(&payload)
        .await
        .map_err(|err| map_transport_error("register_account", err))
}

fn map_transport_error(label: &'static str, err: CashAcctError) -> CashAcctError {
    match err {
        CashAcctError::Transport(msg) => CashAcctError::Transport(format!("{label}: {msg}")),
        _ => err,
    }
}
