//! Client for the PayPal Adaptive Payments API.
//!
//! Builds XML request documents for the eleven Adaptive Payments
//! operations, posts them over HTTPS with the PayPal security headers, and
//! normalizes the JSON replies into a uniform [`Outcome`] value: success
//! flag, human-readable message, canonicalized payload, and the
//! authorization token for the follow-up browser redirect.
//!
//! ```no_run
//! use adaptive_payments::{
//!     AdaptivePaymentGateway, Credentials, MinorUnit, Mode, PayOptions, ReceiverEntry,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = AdaptivePaymentGateway::new(
//!     Credentials {
//!         app_id: "APP-80W284485P519543T".to_string(),
//!         login: "seller_api1.example.com".to_string(),
//!         password: "password".into(),
//!         signature: "signature".into(),
//!     },
//!     Mode::Test,
//! );
//!
//! let mut options = PayOptions {
//!     cancel_url: Some("https://example.com/cancel".to_string()),
//!     return_url: Some("https://example.com/return".to_string()),
//!     receiver_list: vec![ReceiverEntry::new("seller@example.com", MinorUnit::new(10000))],
//!     ..Default::default()
//! };
//! let outcome = gateway.setup_purchase(&mut options)?;
//! if outcome.success() {
//!     let redirect = gateway.redirect_url_for(outcome.authorization().unwrap_or_default());
//!     println!("send the buyer to {redirect}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod consts;
pub mod errors;
pub mod gateway;
pub mod response;
pub mod transformers;
pub mod transport;
pub mod types;

pub use errors::{CustomResult, GatewayError};
pub use gateway::{AdaptivePaymentGateway, Credentials, HeaderOverrides};
pub use response::{NormalizedResponse, Outcome};
pub use transformers::{
    AdaptiveRequest, CancelPreapprovalOptions, ConvertCurrencyOptions, CurrencyEntry,
    DisplayOptionsBag, ExecutePaymentOptions, InvoiceDataBag, InvoiceItemEntry, Operation,
    PayKeyOptions, PayOptions, PaymentDetailsOptions, PhoneEntry, PreapprovalDetailsOptions,
    PreapprovalOptions, ReceiverEntry, ReceiverIdentityBag, ReceiverOptionsEntry, RefundOptions,
    SenderOptionsBag, SetPaymentOptionsOptions,
};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};
pub use types::{MinorUnit, Mode, StringMajorUnit};
