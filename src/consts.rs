//! Endpoint bases, redirect bases and wire-level constants.
//!
//! All of these are contracts of the Adaptive Payments API or policy
//! decisions of this client; none are configurable at runtime beyond the
//! test/live split resolved at gateway construction.

/// Sandbox API endpoint base. Operation names are appended verbatim.
pub const TEST_ENDPOINT: &str = "https://svcs.sandbox.paypal.com/AdaptivePayments/";
/// Production API endpoint base.
pub const LIVE_ENDPOINT: &str = "https://svcs.paypal.com/AdaptivePayments/";

pub const TEST_REDIRECT_URL: &str = "https://www.sandbox.paypal.com/webscr?cmd=_ap-payment&paykey=";
pub const LIVE_REDIRECT_URL: &str = "https://www.paypal.com/webscr?cmd=_ap-payment&paykey=";

pub const TEST_PREAPPROVAL_REDIRECT_URL: &str =
    "https://www.sandbox.paypal.com/webscr?cmd=_ap-preapproval&preapprovalkey=";
pub const LIVE_PREAPPROVAL_REDIRECT_URL: &str =
    "https://www.paypal.com/webscr?cmd=_ap-preapproval&preapprovalkey=";

pub const TEST_EMBEDDED_FLOW_URL: &str =
    "https://www.sandbox.paypal.com/webapps/adaptivepayment/flow/pay";
pub const LIVE_EMBEDDED_FLOW_URL: &str = "https://www.paypal.com/webapps/adaptivepayment/flow/pay";

/// Acknowledgement codes the API documents as successful outcomes.
pub const SUCCESS_CODES: [&str; 2] = ["Success", "SuccessWithWarning"];

/// Every outbound document requests the full response detail level.
pub const DETAIL_LEVEL: &str = "ReturnAll";

pub const DEFAULT_ERROR_LANGUAGE: &str = "en_US";
pub const DEFAULT_CURRENCY_CODE: &str = "USD";
pub const DEFAULT_ACTION_TYPE: &str = "PAY";
pub const DEFAULT_FEES_PAYER: &str = "EACHRECEIVER";
/// Serialized as a string on the wire, matching the API's boolean encoding.
pub const DEFAULT_REVERSE_ON_ERROR: &str = "false";

/// Refunds always carry this fixed action type.
pub const REFUND_ACTION_TYPE: &str = "REFUND";

pub mod headers {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const X_PAYPAL_APPLICATION_ID: &str = "X-PAYPAL-APPLICATION-ID";
    pub const X_PAYPAL_REQUEST_DATA_FORMAT: &str = "X-PAYPAL-REQUEST-DATA-FORMAT";
    pub const X_PAYPAL_RESPONSE_DATA_FORMAT: &str = "X-PAYPAL-RESPONSE-DATA-FORMAT";
    pub const X_PAYPAL_SECURITY_USERID: &str = "X-PAYPAL-SECURITY-USERID";
    pub const X_PAYPAL_SECURITY_PASSWORD: &str = "X-PAYPAL-SECURITY-PASSWORD";
    pub const X_PAYPAL_SECURITY_SIGNATURE: &str = "X-PAYPAL-SECURITY-SIGNATURE";
}

pub const CONTENT_TYPE_XML: &str = "text/xml";
pub const REQUEST_DATA_FORMAT: &str = "XML";
pub const RESPONSE_DATA_FORMAT: &str = "JSON";
