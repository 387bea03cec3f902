//! Marker-record payload codec.
//!
//! A registration lives in an unspendable null-data output whose script
//! is `OP_RETURN` followed by four pushes: the protocol prefix, the
//! username bytes, a primary payment entry, and optionally a token-layer
//! entry. Indexers often hand the same record back as space-separated
//! text (`OP_RETURN 01010101 <hex> <hex> [<hex>]`) with every field
//! hex-encoded; both views decode to the identical payload.

use crate::handle::username_violation;
use crate::payment::{AddressNamespace, PaymentEntry};
use crate::{CashAcctError, Result};

/// Fixed four-byte protocol prefix carried by every marker record.
pub const PROTOCOL_PREFIX: [u8; 4] = [0x01, 0x01, 0x01, 0x01];

const OP_RETURN: u8 = 0x6a;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;

/// Textual field that precedes the hex fields in the indexer text view.
const MARKER_TEXT_TAG: &str = "OP_RETURN";

/// A decoded registration: the username and its ordered payment entries.
///
/// Invariants, enforced on construction and on decode: one or two
/// entries, the first in the primary namespace, the second (when
/// present) in the token namespace. Not a serde type: its wire forms
/// are [`RegistrationPayload::to_script`] and
/// [`RegistrationPayload::to_marker_text`], and every construction path
/// runs the invariant checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationPayload {
    pub username: String,
    pub entries: Vec<PaymentEntry>,
}

impl RegistrationPayload {
    /// Assemble a payload from parts, enforcing the payload invariants.
    ///
    /// # Errors
    ///
    /// Returns `CashAcctError::IncompletePayload` when no entry is given
    /// and `MalformedPayload` for a bad username or entry arrangement.
    pub fn new(username: impl Into<String>, entries: Vec<PaymentEntry>) -> Result<Self> {
        let payload = Self {
            username: username.into(),
            entries,
        };
        payload.validate()?;
        Ok(payload)
    }

    /// Decode a marker record from either of its wire views.
    ///
    /// A payload starting with the `OP_RETURN` opcode byte is parsed as a
    /// raw output script; anything else is expected to be the
    /// space-separated text view.
    ///
    /// # Errors
    ///
    /// Returns `CashAcctError::MalformedPayload` when the prefix, field
    /// layout, or username is wrong; `IncompletePayload` when the primary
    /// entry is missing; `UnknownPaymentType` or `InvalidHashLength` when
    /// an entry body does not decode.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        match payload.first() {
            None => Err(CashAcctError::malformed("empty payload")),
            Some(&OP_RETURN) => Self::from_script(&payload[1..]),
            Some(_) => match std::str::from_utf8(payload) {
                Ok(text) => Self::from_marker_text(text),
                Err(_) => Err(CashAcctError::malformed(
                    "payload is neither a marker script nor marker text",
                )),
            },
        }
    }

    /// Decode the space-separated text view of a marker record.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RegistrationPayload::decode`].
    pub fn from_marker_text(text: &str) -> Result<Self> {
        let mut fields = text.trim().split(' ');
        match fields.next() {
            Some(MARKER_TEXT_TAG) => {}
            _ => {
                return Err(CashAcctError::malformed(
                    "marker text does not begin with OP_RETURN",
                ))
            }
        }
        let prefix = fields
            .next()
            .ok_or_else(|| CashAcctError::malformed("missing protocol prefix"))?;
        if hex::decode(prefix).ok().as_deref() != Some(PROTOCOL_PREFIX.as_slice()) {
            return Err(CashAcctError::malformed("protocol prefix mismatch"));
        }
        let username = fields
            .next()
            .ok_or_else(|| CashAcctError::malformed("missing username field"))?;
        let username = hex::decode(username)
            .map_err(|_| CashAcctError::malformed("username field is not valid hex"))?;
        let entries = fields
            .map(|field| {
                hex::decode(field).map_err(|_| {
                    CashAcctError::malformed("payment entry field is not valid hex")
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_parts(username, entries)
    }

    /// Encode the payload as a null-data output script.
    ///
    /// # Errors
    ///
    /// Returns `CashAcctError::MalformedPayload` if a field exceeds the
    /// supported push sizes.
    pub fn to_script(&self) -> Result<Vec<u8>> {
        let mut script = vec![OP_RETURN];
        push_data(&mut script, &PROTOCOL_PREFIX)?;
        push_data(&mut script, self.username.as_bytes())?;
        for entry in &self.entries {
            push_data(&mut script, &entry.encode())?;
        }
        Ok(script)
    }

    /// Render the payload in the indexer text view.
    pub fn to_marker_text(&self) -> String {
        let mut text = format!("{MARKER_TEXT_TAG} {}", hex::encode(PROTOCOL_PREFIX));
        text.push(' ');
        text.push_str(&hex::encode(self.username.as_bytes()));
        for entry in &self.entries {
            text.push(' ');
            text.push_str(&hex::encode(entry.encode()));
        }
        text
    }

    fn from_script(script: &[u8]) -> Result<Self> {
        let mut fields = parse_pushes(script)?.into_iter();
        let prefix = fields
            .next()
            .ok_or_else(|| CashAcctError::malformed("missing protocol prefix"))?;
        if prefix != PROTOCOL_PREFIX {
            return Err(CashAcctError::malformed("protocol prefix mismatch"));
        }
        let username = fields
            .next()
            .ok_or_else(|| CashAcctError::malformed("missing username field"))?;
        Self::from_parts(username, fields.collect())
    }

    fn from_parts(username: Vec<u8>, entry_fields: Vec<Vec<u8>>) -> Result<Self> {
        let username = String::from_utf8(username)
            .map_err(|_| CashAcctError::malformed("username is not valid UTF-8"))?;
        let entries = entry_fields
            .iter()
            .map(|field| PaymentEntry::decode(field))
            .collect::<Result<Vec<_>>>()?;
        Self::new(username, entries)
    }

    fn validate(&self) -> Result<()> {
        if let Some(reason) = username_violation(&self.username) {
            return Err(CashAcctError::malformed(reason));
        }
        match self.entries.as_slice() {
            [] => Err(CashAcctError::IncompletePayload),
            [first, rest @ ..] => {
                if first.namespace != AddressNamespace::Primary {
                    return Err(CashAcctError::malformed(
                        "first payment entry must use the primary namespace",
                    ));
                }
                match rest {
                    [] => Ok(()),
                    [second] if second.namespace == AddressNamespace::Token => Ok(()),
                    [_] => Err(CashAcctError::malformed(
                        "second payment entry must use the token namespace",
                    )),
                    _ => Err(CashAcctError::malformed(
                        "a registration carries at most two payment entries",
                    )),
                }
            }
        }
    }
}

/// Append one minimal-length push of `data` to a script.
fn push_data(script: &mut Vec<u8>, data: &[u8]) -> Result<()> {
    match data.len() {
        n if n <= 75 => script.push(n as u8),
        n if n <= usize::from(u8::MAX) => {
            script.push(OP_PUSHDATA1);
            script.push(n as u8);
        }
        n if n <= usize::from(u16::MAX) => {
            script.push(OP_PUSHDATA2);
            script.extend_from_slice(&(n as u16).to_le_bytes());
        }
        n => {
            return Err(CashAcctError::malformed(format!(
                "field of {n} bytes exceeds the supported push sizes"
            )))
        }
    }
    script.extend_from_slice(data);
    Ok(())
}

/// Split a script body (after `OP_RETURN`) into its pushed fields.
fn parse_pushes(mut script: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut fields = Vec::new();
    while let Some((&opcode, rest)) = script.split_first() {
        let (len, rest) = match opcode {
            1..=75 => (usize::from(opcode), rest),
            OP_PUSHDATA1 => {
                let (&len, rest) = rest
                    .split_first()
                    .ok_or_else(|| CashAcctError::malformed("truncated push length"))?;
                (usize::from(len), rest)
            }
            OP_PUSHDATA2 => {
                if rest.len() < 2 {
                    return Err(CashAcctError::malformed("truncated push length"));
                }
                (usize::from(u16::from_le_bytes([rest[0], rest[1]])), &rest[2..])
            }
            other => {
                return Err(CashAcctError::malformed(format!(
                    "unsupported script opcode 0x{other:02x}"
                )))
            }
        };
        if rest.len() < len {
            return Err(CashAcctError::malformed("truncated push data"));
        }
        let (data, tail) = rest.split_at(len);
        fields.push(data.to_vec());
        script = tail;
    }
    Ok(fields)
}
