//! Response normalization and the outcome value type.
//!
//! The API echoes mixed-case keys nested arbitrarily deep (inside receiver
//! lists, error lists, and so on), so every mapping key is rewritten to
//! snake case at every depth before anything else looks at the reply.

use convert_case::{Case, Casing};
use error_stack::ResultExt;
use serde_json::Value;

use crate::{
    consts,
    errors::{CustomResult, GatewayError},
    types::Mode,
};

/// A reply with every key canonicalized to snake case, at all nesting
/// depths. Scalar values and sequence order are preserved unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedResponse(Value);

impl NormalizedResponse {
    /// Parses raw reply bytes and canonicalizes every key.
    pub fn parse(raw: &[u8]) -> CustomResult<Self, GatewayError> {
        let value: Value =
            serde_json::from_slice(raw).change_context(GatewayError::MalformedResponse)?;
        Ok(Self(canonicalize(value)))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Descends through nested mappings along canonical keys.
    pub fn path(&self, segments: &[&str]) -> Option<&Value> {
        segments
            .iter()
            .try_fold(&self.0, |value, segment| value.get(segment))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_case(Case::Snake), canonicalize(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        scalar => scalar,
    }
}

/// The uniform result of a dispatched call. Built exactly once per call and
/// immutable afterwards; remote failures land here with `success == false`
/// rather than as errors.
#[derive(Clone, Debug)]
pub struct Outcome {
    success: bool,
    message: String,
    raw: NormalizedResponse,
    authorization: Option<String>,
    mode: Mode,
}

impl Outcome {
    pub(crate) fn new(
        success: bool,
        message: String,
        raw: NormalizedResponse,
        authorization: Option<String>,
        mode: Mode,
    ) -> Self {
        Self {
            success,
            message,
            raw,
            authorization,
            mode,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// The acknowledgement code on success; the first remote error message
    /// on failure; the raw unparseable body when the reply was not JSON.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn raw(&self) -> &NormalizedResponse {
        &self.raw
    }

    /// The pay key when present, otherwise the provider-assigned
    /// transaction or authorization identifier. The pay key wins because it
    /// is reusable across the multi-step payment flow.
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn test(&self) -> bool {
        self.mode.is_test()
    }

    /// The payment execution status, read from the normalized payload.
    pub fn status(&self) -> Option<&str> {
        self.raw.get_str("payment_exec_status")
    }
}

/// Success iff the envelope-level acknowledgement code is in the allow-list
/// and the reply carries no explicit error list.
pub(crate) fn is_successful(response: &NormalizedResponse) -> bool {
    let ack_allowed = response
        .path(&["response_envelope", "ack"])
        .and_then(Value::as_str)
        .map(|ack| consts::SUCCESS_CODES.contains(&ack))
        .unwrap_or(false);
    ack_allowed && response.get("error").is_none()
}

pub(crate) fn message_from(response: &NormalizedResponse) -> String {
    if let Some(message) = first_error_message(response) {
        return message;
    }
    response
        .path(&["response_envelope", "ack"])
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn first_error_message(response: &NormalizedResponse) -> Option<String> {
    response
        .get("error")?
        .as_array()?
        .first()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

pub(crate) fn authorization_from(response: &NormalizedResponse) -> Option<String> {
    response
        .get_str("pay_key")
        .or_else(|| response.get_str("transaction_id"))
        .or_else(|| response.get_str("authorization_id"))
        .map(str::to_string)
}
