//! HTTP client for hosted Cash Account lookup and registration services.
//!
//! Pairs with `cashacct-lib`: the library owns the protocol codec and
//! derivations, this crate talks to servers exposing the
//! api.cashaccount.info REST surface.
//!
//! # Example
//!
//! ```rust,ignore
//! use cashacct_client::LookupClient;
//! use cashacct_lib::Handle;
//!
//! let client = LookupClient::cashaccount_info()?;
//! let handle: Handle = "jonathan#100".parse()?;
//! if let Some(info) = client.account_info(&handle).await? {
//!     println!("{} pays to {}", info.identifier, info.information.payment[0].address);
//! }
//! ```

mod client;
mod config;

pub use client::{AccountInfo, AccountInformation, CollisionInfo, LookupClient, PaymentInfo};
pub use config::LookupConfig;
