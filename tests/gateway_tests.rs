//! Facade and dispatcher tests against a recording spy transport.

use std::sync::{Arc, Mutex};

use adaptive_payments::{
    AdaptivePaymentGateway, Credentials, ConvertCurrencyOptions, GatewayError, MinorUnit, Mode,
    PayKeyOptions, PayOptions, PaymentDetailsOptions, PreapprovalOptions, ReceiverEntry,
    RefundOptions, Transport, TransportError, TransportResponse,
};
use bytes::Bytes;
use serde_json::json;

#[derive(Clone, Debug)]
struct RecordedCall {
    url: String,
    body: String,
    headers: Vec<(String, String)>,
}

/// Records every POST and replays a canned reply.
#[derive(Clone)]
struct SpyTransport {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    reply: Arc<dyn Fn() -> Result<TransportResponse, TransportError> + Send + Sync>,
}

impl SpyTransport {
    fn replying(reply: Result<TransportResponse, TransportError>) -> Self {
        let reply = Arc::new(move || match &reply {
            Ok(response) => Ok(response.clone()),
            Err(err) => Err(TransportError {
                status_code: err.status_code,
                body: err.body.clone(),
                reason: err.reason.clone(),
            }),
        });
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply,
        }
    }

    fn ok(body: serde_json::Value) -> Self {
        Self::replying(Ok(TransportResponse {
            status_code: 200,
            response: Bytes::from(body.to_string()),
        }))
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn single_call(&self) -> RecordedCall {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one transport call");
        calls.into_iter().next().unwrap()
    }
}

impl Transport for SpyTransport {
    fn post(
        &self,
        url: &str,
        body: &[u8],
        headers: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
            headers: headers.to_vec(),
        });
        (self.reply)()
    }
}

fn credentials() -> Credentials {
    Credentials {
        app_id: "APP-TEST".to_string(),
        login: "seller_api1.example.com".to_string(),
        password: "secret-password".into(),
        signature: "secret-signature".into(),
    }
}

fn gateway(spy: SpyTransport) -> AdaptivePaymentGateway<SpyTransport> {
    AdaptivePaymentGateway::with_transport(credentials(), Mode::Test, spy)
}

fn pay_options() -> PayOptions {
    PayOptions {
        cancel_url: Some("https://example.com/cancel".to_string()),
        return_url: Some("https://example.com/return".to_string()),
        receiver_list: vec![ReceiverEntry::new("seller@example.com", MinorUnit::new(10000))],
        ..Default::default()
    }
}

#[test]
fn successful_pay_yields_a_successful_outcome_with_the_pay_key() {
    let spy = SpyTransport::ok(json!({
        "responseEnvelope": { "ack": "Success" },
        "payKey": "AP-123"
    }));
    let outcome = gateway(spy.clone()).setup_purchase(&mut pay_options()).unwrap();

    assert!(outcome.success());
    assert_eq!(outcome.message(), "Success");
    assert_eq!(outcome.authorization(), Some("AP-123"));
    assert!(outcome.test());

    let call = spy.single_call();
    assert_eq!(
        call.url,
        "https://svcs.sandbox.paypal.com/AdaptivePayments/Pay"
    );
    assert!(call.body.starts_with("<PayRequest>"));
}

#[test]
fn all_credential_headers_are_sent() {
    let spy = SpyTransport::ok(json!({ "responseEnvelope": { "ack": "Success" } }));
    gateway(spy.clone()).setup_purchase(&mut pay_options()).unwrap();

    let call = spy.single_call();
    let header = |name: &str| {
        call.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };
    assert_eq!(header("Content-Type"), Some("text/xml"));
    assert_eq!(header("X-PAYPAL-APPLICATION-ID"), Some("APP-TEST"));
    assert_eq!(header("X-PAYPAL-REQUEST-DATA-FORMAT"), Some("XML"));
    assert_eq!(header("X-PAYPAL-RESPONSE-DATA-FORMAT"), Some("JSON"));
    assert_eq!(
        header("X-PAYPAL-SECURITY-USERID"),
        Some("seller_api1.example.com")
    );
    assert_eq!(header("X-PAYPAL-SECURITY-PASSWORD"), Some("secret-password"));
    assert_eq!(
        header("X-PAYPAL-SECURITY-SIGNATURE"),
        Some("secret-signature")
    );
}

#[test]
fn remote_error_list_fails_the_outcome_with_the_first_message() {
    let spy = SpyTransport::ok(json!({
        "responseEnvelope": { "ack": "Failure" },
        "error": [
            { "message": "Invalid token" },
            { "message": "Something else" }
        ]
    }));
    let outcome = gateway(spy).setup_purchase(&mut pay_options()).unwrap();

    assert!(!outcome.success());
    assert_eq!(outcome.message(), "Invalid token");
    assert_eq!(outcome.authorization(), None);
}

#[test]
fn success_with_warning_counts_as_success() {
    let spy = SpyTransport::ok(json!({
        "responseEnvelope": { "ack": "SuccessWithWarning" },
        "payKey": "AP-9"
    }));
    let outcome = gateway(spy).setup_purchase(&mut pay_options()).unwrap();
    assert!(outcome.success());
    assert_eq!(outcome.message(), "SuccessWithWarning");
}

#[test]
fn missing_mandatory_option_fails_before_any_transport_call() {
    let spy = SpyTransport::ok(json!({}));
    let mut options = pay_options();
    options.receiver_list.clear();

    let err = gateway(spy.clone()).setup_purchase(&mut options).unwrap_err();
    assert!(matches!(
        err.current_context(),
        GatewayError::MissingRequiredField {
            field_name: "receiver_list"
        }
    ));
    assert!(spy.calls().is_empty());
}

#[test]
fn http_error_with_a_json_body_still_classifies_the_reply() {
    let body = json!({
        "responseEnvelope": { "ack": "Failure" },
        "error": [{ "message": "Authentication failed" }]
    });
    let spy = SpyTransport::replying(Err(TransportError {
        status_code: Some(500),
        body: Some(Bytes::from(body.to_string())),
        reason: "http status 500".to_string(),
    }));

    let outcome = gateway(spy).setup_purchase(&mut pay_options()).unwrap();
    assert!(!outcome.success());
    assert_eq!(outcome.message(), "Authentication failed");
}

#[test]
fn unparseable_body_degrades_to_an_opaque_failure() {
    let spy = SpyTransport::replying(Ok(TransportResponse {
        status_code: 200,
        response: Bytes::from_static(b"<html>Bad Gateway</html>"),
    }));

    let outcome = gateway(spy).setup_purchase(&mut pay_options()).unwrap();
    assert!(!outcome.success());
    assert_eq!(outcome.message(), "<html>Bad Gateway</html>");
    assert_eq!(outcome.authorization(), None);
}

#[test]
fn bodyless_transport_failure_surfaces_as_an_error() {
    let spy = SpyTransport::replying(Err(TransportError::network("connection refused")));
    let err = gateway(spy).setup_purchase(&mut pay_options()).unwrap_err();
    assert!(matches!(
        err.current_context(),
        GatewayError::TransportFailure
    ));
}

#[test]
fn each_operation_posts_to_its_own_url() {
    let reply = json!({ "responseEnvelope": { "ack": "Success" } });

    let spy = SpyTransport::ok(reply.clone());
    gateway(spy.clone())
        .details_for_payment(&mut PaymentDetailsOptions::default())
        .unwrap();
    assert!(spy.single_call().url.ends_with("/PaymentDetails"));

    let spy = SpyTransport::ok(reply.clone());
    gateway(spy.clone())
        .get_shipping_addresses(&mut PayKeyOptions {
            pay_key: Some("AP-1".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert!(spy.single_call().url.ends_with("/GetShippingAddresses"));

    let spy = SpyTransport::ok(reply);
    gateway(spy.clone())
        .refund(&mut RefundOptions {
            pay_key: Some("AP-1".to_string()),
            receiver_list: vec![ReceiverEntry::new("seller@example.com", MinorUnit::new(500))],
            ..Default::default()
        })
        .unwrap();
    assert!(spy.single_call().url.ends_with("/Refund"));
}

#[test]
fn payment_details_reads_the_execution_status() {
    let spy = SpyTransport::ok(json!({
        "responseEnvelope": { "ack": "Success" },
        "payKey": "AP-55",
        "paymentExecStatus": "COMPLETED"
    }));
    let outcome = gateway(spy)
        .details_for_payment(&mut PaymentDetailsOptions {
            pay_key: Some("AP-55".to_string()),
            ..Default::default()
        })
        .unwrap();

    assert!(outcome.success());
    assert_eq!(outcome.status(), Some("COMPLETED"));
    assert_eq!(outcome.authorization(), Some("AP-55"));
}

#[test]
fn preapproval_requires_its_mandatory_options_up_front() {
    let spy = SpyTransport::ok(json!({}));
    let mut options = PreapprovalOptions {
        cancel_url: Some("https://example.com/cancel".to_string()),
        return_url: Some("https://example.com/return".to_string()),
        end_date: Some(time::macros::datetime!(2026-12-31 00:00:00 UTC)),
        ..Default::default()
    };

    let err = gateway(spy.clone()).preapprove_payment(&mut options).unwrap_err();
    assert!(matches!(
        err.current_context(),
        GatewayError::MissingRequiredField {
            field_name: "max_amount"
        }
    ));
    assert!(spy.calls().is_empty());
}

#[test]
fn convert_currency_requires_both_lists() {
    let spy = SpyTransport::ok(json!({}));
    let err = gateway(spy)
        .convert_currency(&mut ConvertCurrencyOptions::default())
        .unwrap_err();
    assert!(matches!(
        err.current_context(),
        GatewayError::MissingRequiredField {
            field_name: "currency_list"
        }
    ));
}

#[test]
fn redirect_helpers_append_the_token_to_the_mode_specific_base() {
    let gw = gateway(SpyTransport::ok(json!({})));
    assert_eq!(
        gw.redirect_url_for("AP-123"),
        "https://www.sandbox.paypal.com/webscr?cmd=_ap-payment&paykey=AP-123"
    );
    assert_eq!(
        gw.redirect_pre_approval_url_for("PA-5"),
        "https://www.sandbox.paypal.com/webscr?cmd=_ap-preapproval&preapprovalkey=PA-5"
    );
    assert_eq!(
        gw.embedded_flow_url_for("AP-123"),
        "https://www.sandbox.paypal.com/webapps/adaptivepayment/flow/pay?paykey=AP-123"
    );

    let live = AdaptivePaymentGateway::with_transport(
        credentials(),
        Mode::Live,
        SpyTransport::ok(json!({})),
    );
    assert_eq!(
        live.redirect_url_for("AP-123"),
        "https://www.paypal.com/webscr?cmd=_ap-payment&paykey=AP-123"
    );
    assert!(!live.test());
}

#[test]
fn defaults_are_written_back_into_the_callers_options() {
    let spy = SpyTransport::ok(json!({ "responseEnvelope": { "ack": "Success" } }));
    let mut options = pay_options();
    gateway(spy).setup_purchase(&mut options).unwrap();

    assert_eq!(options.error_language.as_deref(), Some("en_US"));
    assert_eq!(options.action_type.as_deref(), Some("PAY"));
    assert_eq!(options.currency_code.as_deref(), Some("USD"));
}
