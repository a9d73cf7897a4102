//! Error taxonomy for the gateway.
//!
//! Remote failures (a response with a non-success acknowledgement code or
//! an error list) are not errors at this level; they resolve into an
//! [`Outcome`](crate::response::Outcome) with `success == false` so callers
//! can branch uniformly. Only caller-contract violations and transport
//! failures without a readable body surface as `GatewayError`.

/// Alias for `Result` carrying an `error_stack::Report` on the error side.
pub type CustomResult<T, E> = error_stack::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A mandatory option was absent. Raised before any request is built
    /// or any transport call is made.
    #[error("Missing required field: {field_name}")]
    MissingRequiredField { field_name: &'static str },
    /// A monetary value could not be rendered as minor currency units.
    #[error("Monetary amounts must be a non-negative integer count of minor units")]
    InvalidAmount,
    #[error("Date formatting failed")]
    DateFormattingFailed,
    #[error("Failed to encode request document")]
    RequestEncodingFailed,
    #[error("Error while obtaining URL for the integration")]
    FailedToObtainIntegrationUrl,
    /// The response body was not well-formed JSON. The dispatcher degrades
    /// this into an opaque failure message; it never escapes the facade.
    #[error("Failed to deserialize gateway response")]
    MalformedResponse,
    /// Transport-layer failure with no readable response body at all.
    #[error("Transport failure with no readable response")]
    TransportFailure,
}
