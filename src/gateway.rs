//! Gateway facade and request dispatcher.
//!
//! One facade method per wire operation. Each validates the options it was
//! handed, builds the request document, and hands it to the dispatcher,
//! which runs a single POST and packages whatever comes back into an
//! [`Outcome`]. Remote rejections are outcomes, not errors; only contract
//! violations and bodyless transport failures surface as `GatewayError`.

use error_stack::ResultExt;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{
    consts::{self, headers},
    errors::{CustomResult, GatewayError},
    response::{self, NormalizedResponse, Outcome},
    transformers::{
        AdaptiveRequest, CancelPreapprovalOptions, CancelPreapprovalRequest,
        ConvertCurrencyOptions, ConvertCurrencyRequest, ExecutePaymentOptions,
        ExecutePaymentRequest, GetPaymentOptionsRequest, GetShippingAddressesRequest, Operation,
        PayKeyOptions, PayOptions, PayRequest, PaymentDetailsOptions, PaymentDetailsRequest,
        PreapprovalDetailsOptions, PreapprovalDetailsRequest, PreapprovalOptions,
        PreapprovalRequest, RefundOptions, RefundRequest, SetPaymentOptionsOptions,
        SetPaymentOptionsRequest,
    },
    transport::{ReqwestTransport, Transport},
    types::Mode,
};

/// API credentials. Password and signature stay wrapped until the moment
/// headers are assembled.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub app_id: String,
    pub login: String,
    pub password: SecretString,
    pub signature: SecretString,
}

/// Per-call credential overrides, applied on top of the gateway's own
/// credentials when assembling headers.
#[derive(Debug, Default)]
pub struct HeaderOverrides {
    pub app_id: Option<String>,
    pub login: Option<String>,
    pub password: Option<SecretString>,
    pub signature: Option<SecretString>,
}

/// What came back from the wire, before packaging.
enum Reply {
    Parsed(NormalizedResponse),
    /// Body that was not JSON; carried verbatim as the failure message.
    Opaque(String),
}

pub struct AdaptivePaymentGateway<T: Transport = ReqwestTransport> {
    credentials: Credentials,
    mode: Mode,
    endpoint: String,
    redirect_base: String,
    preapproval_redirect_base: String,
    embedded_flow_base: String,
    transport: T,
}

impl AdaptivePaymentGateway<ReqwestTransport> {
    pub fn new(credentials: Credentials, mode: Mode) -> Self {
        Self::with_transport(credentials, mode, ReqwestTransport::new())
    }
}

impl<T: Transport> AdaptivePaymentGateway<T> {
    /// Builds a gateway over a caller-supplied transport. All URL bases are
    /// resolved here, once, from the mode.
    pub fn with_transport(credentials: Credentials, mode: Mode, transport: T) -> Self {
        let (endpoint, redirect_base, preapproval_redirect_base, embedded_flow_base) =
            match mode {
                Mode::Test => (
                    consts::TEST_ENDPOINT,
                    consts::TEST_REDIRECT_URL,
                    consts::TEST_PREAPPROVAL_REDIRECT_URL,
                    consts::TEST_EMBEDDED_FLOW_URL,
                ),
                Mode::Live => (
                    consts::LIVE_ENDPOINT,
                    consts::LIVE_REDIRECT_URL,
                    consts::LIVE_PREAPPROVAL_REDIRECT_URL,
                    consts::LIVE_EMBEDDED_FLOW_URL,
                ),
            };
        Self {
            credentials,
            mode,
            endpoint: endpoint.to_string(),
            redirect_base: redirect_base.to_string(),
            preapproval_redirect_base: preapproval_redirect_base.to_string(),
            embedded_flow_base: embedded_flow_base.to_string(),
            transport,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn test(&self) -> bool {
        self.mode.is_test()
    }

    // -- operations ---------------------------------------------------------

    /// Initiates a payment. Requires cancel and return URLs and at least
    /// one receiver.
    pub fn setup_purchase(
        &self,
        options: &mut PayOptions,
    ) -> CustomResult<Outcome, GatewayError> {
        require_present(options.cancel_url.is_some(), "cancel_url")?;
        require_present(options.return_url.is_some(), "return_url")?;
        require_present(!options.receiver_list.is_empty(), "receiver_list")?;
        self.commit(AdaptiveRequest::Pay(PayRequest::try_from(options)?))
    }

    /// Looks up a payment by pay key or transaction id. Deliberately
    /// permissive: with neither identifier set the query still goes out.
    pub fn details_for_payment(
        &self,
        options: &mut PaymentDetailsOptions,
    ) -> CustomResult<Outcome, GatewayError> {
        self.commit(AdaptiveRequest::PaymentDetails(
            PaymentDetailsRequest::try_from(options)?,
        ))
    }

    pub fn get_shipping_addresses(
        &self,
        options: &mut PayKeyOptions,
    ) -> CustomResult<Outcome, GatewayError> {
        require_present(options.pay_key.is_some(), "pay_key")?;
        self.commit(AdaptiveRequest::GetShippingAddresses(
            GetShippingAddressesRequest::try_from(options)?,
        ))
    }

    pub fn get_payment_options(
        &self,
        options: &mut PayKeyOptions,
    ) -> CustomResult<Outcome, GatewayError> {
        require_present(options.pay_key.is_some(), "pay_key")?;
        self.commit(AdaptiveRequest::GetPaymentOptions(
            GetPaymentOptionsRequest::try_from(options)?,
        ))
    }

    pub fn set_payment_options(
        &self,
        options: &mut SetPaymentOptionsOptions,
    ) -> CustomResult<Outcome, GatewayError> {
        require_present(options.pay_key.is_some(), "pay_key")?;
        self.commit(AdaptiveRequest::SetPaymentOptions(
            SetPaymentOptionsRequest::try_from(options)?,
        ))
    }

    /// Refunds previously paid receivers. The receiver amounts are the
    /// refund amounts.
    pub fn refund(&self, options: &mut RefundOptions) -> CustomResult<Outcome, GatewayError> {
        require_present(!options.receiver_list.is_empty(), "receiver_list")?;
        self.commit(AdaptiveRequest::Refund(RefundRequest::try_from(options)?))
    }

    /// Completes a payment created with a deferred action type.
    pub fn execute_payment(
        &self,
        options: &mut ExecutePaymentOptions,
    ) -> CustomResult<Outcome, GatewayError> {
        self.commit(AdaptiveRequest::ExecutePayment(
            ExecutePaymentRequest::try_from(options)?,
        ))
    }

    pub fn preapprove_payment(
        &self,
        options: &mut PreapprovalOptions,
    ) -> CustomResult<Outcome, GatewayError> {
        require_present(options.cancel_url.is_some(), "cancel_url")?;
        require_present(options.return_url.is_some(), "return_url")?;
        require_present(options.end_date.is_some(), "end_date")?;
        require_present(options.max_amount.is_some(), "max_amount")?;
        self.commit(AdaptiveRequest::Preapproval(PreapprovalRequest::try_from(
            options,
        )?))
    }

    pub fn cancel_preapproval(
        &self,
        options: &mut CancelPreapprovalOptions,
    ) -> CustomResult<Outcome, GatewayError> {
        require_present(options.preapproval_key.is_some(), "preapproval_key")?;
        self.commit(AdaptiveRequest::CancelPreapproval(
            CancelPreapprovalRequest::try_from(options)?,
        ))
    }

    pub fn preapproval_details_for(
        &self,
        options: &mut PreapprovalDetailsOptions,
    ) -> CustomResult<Outcome, GatewayError> {
        require_present(options.preapproval_key.is_some(), "preapproval_key")?;
        self.commit(AdaptiveRequest::PreapprovalDetails(
            PreapprovalDetailsRequest::try_from(options)?,
        ))
    }

    pub fn convert_currency(
        &self,
        options: &mut ConvertCurrencyOptions,
    ) -> CustomResult<Outcome, GatewayError> {
        require_present(!options.currency_list.is_empty(), "currency_list")?;
        require_present(!options.to_currencies.is_empty(), "to_currencies")?;
        self.commit(AdaptiveRequest::ConvertCurrency(
            ConvertCurrencyRequest::try_from(options)?,
        ))
    }

    // -- browser URL helpers ------------------------------------------------

    /// Base of the checkout redirect URL; the pay key is appended verbatim.
    pub fn redirect_url(&self) -> &str {
        &self.redirect_base
    }

    pub fn redirect_url_for(&self, pay_key: &str) -> String {
        format!("{}{pay_key}", self.redirect_base)
    }

    pub fn redirect_pre_approval_url(&self) -> &str {
        &self.preapproval_redirect_base
    }

    pub fn redirect_pre_approval_url_for(&self, preapproval_key: &str) -> String {
        format!("{}{preapproval_key}", self.preapproval_redirect_base)
    }

    pub fn embedded_flow_url(&self) -> &str {
        &self.embedded_flow_base
    }

    pub fn embedded_flow_url_for(&self, pay_key: &str) -> String {
        format!("{}?paykey={pay_key}", self.embedded_flow_base)
    }

    // -- dispatch -----------------------------------------------------------

    fn commit(&self, request: AdaptiveRequest) -> CustomResult<Outcome, GatewayError> {
        self.commit_with_headers(request, &HeaderOverrides::default())
    }

    /// Dispatches one request with per-call credential overrides. The
    /// remainder of the flow is identical to [`commit`](Self::commit).
    pub fn commit_with_headers(
        &self,
        request: AdaptiveRequest,
        overrides: &HeaderOverrides,
    ) -> CustomResult<Outcome, GatewayError> {
        let operation = request.operation();
        let body = request.to_xml()?;
        let url = self.operation_url(&operation.to_string())?;
        let headers = self.headers(overrides);

        tracing::debug!(%operation, %url, "dispatching request");
        let reply = match self.transport.post(url.as_str(), body.as_bytes(), &headers) {
            Ok(response) => self.parse_reply(&response.response),
            Err(err) => match err.body {
                // Structured failure payloads ride on non-2xx statuses.
                Some(body) => {
                    tracing::debug!(
                        status = ?err.status_code,
                        "http error reply carried a body"
                    );
                    self.parse_reply(&body)
                }
                None => {
                    return Err(err).change_context(GatewayError::TransportFailure);
                }
            },
        };

        Ok(self.package(operation, reply))
    }

    fn operation_url(&self, operation_name: &str) -> CustomResult<Url, GatewayError> {
        Url::parse(&self.endpoint)
            .change_context(GatewayError::FailedToObtainIntegrationUrl)?
            .join(operation_name)
            .change_context(GatewayError::FailedToObtainIntegrationUrl)
    }

    fn headers(&self, overrides: &HeaderOverrides) -> Vec<(String, String)> {
        let app_id = overrides
            .app_id
            .as_deref()
            .unwrap_or(&self.credentials.app_id);
        let login = overrides
            .login
            .as_deref()
            .unwrap_or(&self.credentials.login);
        let password = overrides
            .password
            .as_ref()
            .unwrap_or(&self.credentials.password);
        let signature = overrides
            .signature
            .as_ref()
            .unwrap_or(&self.credentials.signature);

        vec![
            (
                headers::CONTENT_TYPE.to_string(),
                consts::CONTENT_TYPE_XML.to_string(),
            ),
            (
                headers::X_PAYPAL_APPLICATION_ID.to_string(),
                app_id.to_string(),
            ),
            (
                headers::X_PAYPAL_REQUEST_DATA_FORMAT.to_string(),
                consts::REQUEST_DATA_FORMAT.to_string(),
            ),
            (
                headers::X_PAYPAL_RESPONSE_DATA_FORMAT.to_string(),
                consts::RESPONSE_DATA_FORMAT.to_string(),
            ),
            (
                headers::X_PAYPAL_SECURITY_USERID.to_string(),
                login.to_string(),
            ),
            (
                headers::X_PAYPAL_SECURITY_PASSWORD.to_string(),
                password.expose_secret().to_string(),
            ),
            (
                headers::X_PAYPAL_SECURITY_SIGNATURE.to_string(),
                signature.expose_secret().to_string(),
            ),
        ]
    }

    fn parse_reply(&self, body: &[u8]) -> Reply {
        match NormalizedResponse::parse(body) {
            Ok(parsed) => Reply::Parsed(parsed),
            Err(_) => Reply::Opaque(String::from_utf8_lossy(body).into_owned()),
        }
    }

    fn package(&self, operation: Operation, reply: Reply) -> Outcome {
        match reply {
            Reply::Parsed(parsed) => {
                let success = response::is_successful(&parsed);
                let message = response::message_from(&parsed);
                let authorization = response::authorization_from(&parsed);
                tracing::info!(%operation, success, "call completed");
                Outcome::new(success, message, parsed, authorization, self.mode)
            }
            Reply::Opaque(body) => {
                tracing::info!(%operation, success = false, "call returned a non-json body");
                Outcome::new(false, body, NormalizedResponse::default(), None, self.mode)
            }
        }
    }
}

fn require_present(present: bool, field_name: &'static str) -> CustomResult<(), GatewayError> {
    if present {
        Ok(())
    } else {
        Err(error_stack::report!(GatewayError::MissingRequiredField {
            field_name
        }))
    }
}
