//! Cash Account handle parsing.
//!
//! A handle is the user-facing text form of a registration:
//! `name#number` or `name#number.collision`, e.g. `jonathan#100` or
//! `jonathan#100.4105238452`. The collision digits disambiguate multiple
//! registrations that share a name and number; they are carried verbatim
//! and never re-derived from the handle itself.

use crate::{CashAcctError, Result};

/// A parsed `name#number[.collision]` handle.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Handle {
    /// Account username (`[A-Za-z0-9_]+`).
    pub username: String,
    /// Account number (strictly positive).
    pub number: u64,
    /// Optional collision digits following the `.` separator.
    pub collision: Option<String>,
}

impl Handle {
    /// Create a handle from pre-validated parts.
    ///
    /// # Errors
    ///
    /// Returns `CashAcctError::InvalidHandle` if the username charset, the
    /// number, or the collision digits violate the handle grammar.
    pub fn new(
        username: impl Into<String>,
        number: u64,
        collision: Option<String>,
    ) -> Result<Self> {
        let handle = Self {
            username: username.into(),
            number,
            collision,
        };
        handle.validate()?;
        Ok(handle)
    }

    /// Parse a handle from its text form.
    ///
    /// # Errors
    ///
    /// Returns `CashAcctError::InvalidHandle` when the text does not match
    /// `name#number[.collision]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cashacct_lib::Handle;
    ///
    /// let handle = Handle::parse("jonathan#100").unwrap();
    /// assert_eq!(handle.username, "jonathan");
    /// assert_eq!(handle.number, 100);
    /// assert!(handle.collision.is_none());
    ///
    /// let handle = Handle::parse("jonathan#100.4105238452").unwrap();
    /// assert_eq!(handle.collision.as_deref(), Some("4105238452"));
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: &str| CashAcctError::InvalidHandle {
            handle: text.to_string(),
            reason: reason.to_string(),
        };

        let (username, rest) = text
            .split_once('#')
            .ok_or_else(|| invalid("missing '#' separator"))?;

        let (number_text, collision) = match rest.split_once('.') {
            Some((number, collision)) => (number, Some(collision.to_string())),
            None => (rest, None),
        };

        // u64::from_str tolerates a leading '+'; the grammar is digits only.
        if !number_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("account number is not a positive integer"));
        }
        let number: u64 = number_text
            .parse()
            .map_err(|_| invalid("account number is not a positive integer"))?;

        let handle = Self {
            username: username.to_string(),
            number,
            collision,
        };
        handle.validate().map_err(|err| match err {
            CashAcctError::InvalidHandle { reason, .. } => invalid(&reason),
            other => other,
        })?;
        Ok(handle)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: String| CashAcctError::InvalidHandle {
            handle: self.to_string(),
            reason,
        };
        if let Some(reason) = username_violation(&self.username) {
            return Err(invalid(reason));
        }
        if self.number == 0 {
            return Err(invalid("account number must be at least 1".into()));
        }
        if let Some(collision) = &self.collision {
            if collision.is_empty() {
                return Err(invalid("collision digits are empty".into()));
            }
            if !collision.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("collision part contains non-digits".into()));
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Handle {
    type Err = CashAcctError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.collision {
            Some(collision) => write!(f, "{}#{}.{}", self.username, self.number, collision),
            None => write!(f, "{}#{}", self.username, self.number),
        }
    }
}

/// Check a username against the registration charset.
///
/// Returns `None` when the name is acceptable, otherwise the reason it is
/// not. Shared by handle parsing and payload decoding.
pub(crate) fn username_violation(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("username is empty".to_string());
    }
    name.chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
        .map(|c| format!("username contains invalid character '{c}'"))
}
