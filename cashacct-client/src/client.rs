//! HTTP client for hosted lookup and registration services.
//!
//! Talks to servers exposing the api.cashaccount.info REST surface:
//! `GET /account/{number}/{name}[/{collision}]` for lookups and
//! `POST /register` for new registrations. The client implements
//! [`RegistrationSink`], so registrations built here flow through the
//! same payload validation as locally assembled ones.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cashacct_lib::{
    CashAcctError, Handle, PaymentType, RegistrationPayload, RegistrationReceipt,
    RegistrationSink, Result,
};

use crate::config::LookupConfig;

/// Client for a hosted Cash Account lookup service.
///
/// Lookups return the service's own account rendering ([`AccountInfo`]);
/// registrations are validated locally before anything is sent.
pub struct LookupClient {
    config: LookupConfig,
    client: reqwest::Client,
}

impl LookupClient {
    /// Create a client with the given configuration.
    pub fn new(config: LookupConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CashAcctError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create a client for the reference lookup service.
    pub fn cashaccount_info() -> Result<Self> {
        Self::new(LookupConfig::cashaccount_info())
    }

    /// Get the configuration.
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Build the full URL for an API endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// Look up an account by handle.
    ///
    /// Returns `Ok(None)` when the service knows no matching account.
    /// The collision digits, when present, are passed through as a third
    /// path segment so the service can disambiguate same-block accounts.
    pub async fn account_info(&self, handle: &Handle) -> Result<Option<AccountInfo>> {
        let mut path = format!("account/{}/{}", handle.number, handle.username);
        if let Some(collision) = &handle.collision {
            path.push('/');
            path.push_str(collision);
        }

        let response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| CashAcctError::Transport(format!("lookup request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CashAcctError::Transport(format!(
                "lookup request failed ({}): {}",
                status, body
            )));
        }

        let info = response.json::<AccountInfo>().await.map_err(|e| {
            CashAcctError::Transport(format!("failed to parse lookup response: {}", e))
        })?;

        Ok(Some(info))
    }

    /// Register a username against one or two receiving addresses.
    ///
    /// The addresses are normalized locally (any supported encoding is
    /// accepted) and the assembled payload is validated before the
    /// service sees it, so a bad username or address never produces an
    /// HTTP request.
    pub async fn register(
        &self,
        username: &str,
        ledger_address: &str,
        token_address: Option<&str>,
    ) -> Result<RegistrationReceipt> {
        cashacct_lib::register_account(self, username, ledger_address, token_address).await
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl RegistrationSink for LookupClient {
    async fn submit_registration(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<RegistrationReceipt> {
        // The service takes rendered addresses, not raw entries. Entry
        // order fixes the namespace each one is rendered into.
        let primary = payload
            .entries
            .first()
            .ok_or(CashAcctError::IncompletePayload)?
            .address()?;
        let mut payments = vec![primary];
        if let Some(token) = payload.entries.get(1) {
            payments.push(token.address()?);
        }

        let request = RegisterRequest {
            name: payload.username.clone(),
            payments,
        };

        let response = self
            .client
            .post(self.url("register"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                CashAcctError::Transport(format!("registration request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CashAcctError::Transport(format!(
                "registration request failed ({}): {}",
                status, body
            )));
        }

        let receipt = response.json::<RegisterResponse>().await.map_err(|e| {
            CashAcctError::Transport(format!("failed to parse registration response: {}", e))
        })?;

        Ok(RegistrationReceipt {
            txid: receipt.txid,
            raw_tx_hex: receipt.hex,
        })
    }
}

/// Account rendering returned by the lookup service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Full display identifier, e.g. `jonathan#100`.
    pub identifier: String,
    /// Account details.
    pub information: AccountInformation,
}

/// Body of a lookup response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountInformation {
    /// Account emoji as rendered by the service.
    pub emoji: String,
    /// Registered username.
    pub name: String,
    /// Account number.
    pub number: u64,
    /// Collision details, present when same-block registrations exist.
    #[serde(default)]
    pub collision: Option<CollisionInfo>,
    /// Registered payment destinations.
    pub payment: Vec<PaymentInfo>,
}

/// Collision details for an account with same-block neighbors.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CollisionInfo {
    /// Full ten-digit collision hash.
    #[serde(default)]
    pub hash: String,
    /// Number of accounts sharing this block and name.
    #[serde(default)]
    pub count: u64,
    /// Shortest collision prefix that disambiguates the account.
    #[serde(default)]
    pub length: u64,
}

/// One payment destination as rendered by the service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// Destination type, e.g. `Key Hash`.
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    /// Rendered address.
    pub address: String,
}

#[derive(Serialize)]
struct RegisterRequest {
    name: String,
    payments: Vec<String>,
}

#[derive(Deserialize)]
struct RegisterResponse {
    txid: String,
    #[serde(default)]
    hex: Option<String>,
}
