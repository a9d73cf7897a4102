//! Options bags and outbound wire documents.
//!
//! Each operation has an options bag (what callers fill in) and a wire
//! document type (what gets serialized). Builders are `TryFrom<&mut Bag>`
//! implementations: they take the bag mutably because envelope and
//! currency defaults are written back into it, a caller-visible effect
//! kept from the original gateway contract.
//!
//! Field declaration order below is load-bearing: the wire format requires
//! the request envelope before operation fields and list elements in
//! caller-supplied order.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    consts,
    errors::{CustomResult, GatewayError},
    types::{format_wire_datetime, MinorUnit, StringMajorUnit},
};

/// The eleven wire actions, named exactly as they appear in the endpoint
/// URL path.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
pub enum Operation {
    Pay,
    ExecutePayment,
    PaymentDetails,
    GetShippingAddresses,
    GetPaymentOptions,
    SetPaymentOptions,
    Refund,
    Preapproval,
    PreapprovalDetails,
    CancelPreapproval,
    ConvertCurrency,
}

/// A built request document, ready for serialization and dispatch.
#[derive(Debug)]
pub enum AdaptiveRequest {
    Pay(PayRequest),
    ExecutePayment(ExecutePaymentRequest),
    PaymentDetails(PaymentDetailsRequest),
    GetShippingAddresses(GetShippingAddressesRequest),
    GetPaymentOptions(GetPaymentOptionsRequest),
    SetPaymentOptions(SetPaymentOptionsRequest),
    Refund(RefundRequest),
    Preapproval(PreapprovalRequest),
    PreapprovalDetails(PreapprovalDetailsRequest),
    CancelPreapproval(CancelPreapprovalRequest),
    ConvertCurrency(ConvertCurrencyRequest),
}

impl AdaptiveRequest {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Pay(_) => Operation::Pay,
            Self::ExecutePayment(_) => Operation::ExecutePayment,
            Self::PaymentDetails(_) => Operation::PaymentDetails,
            Self::GetShippingAddresses(_) => Operation::GetShippingAddresses,
            Self::GetPaymentOptions(_) => Operation::GetPaymentOptions,
            Self::SetPaymentOptions(_) => Operation::SetPaymentOptions,
            Self::Refund(_) => Operation::Refund,
            Self::Preapproval(_) => Operation::Preapproval,
            Self::PreapprovalDetails(_) => Operation::PreapprovalDetails,
            Self::CancelPreapproval(_) => Operation::CancelPreapproval,
            Self::ConvertCurrency(_) => Operation::ConvertCurrency,
        }
    }

    /// Serializes the document. The root element name comes from the
    /// document type's serde rename, which for two operations deliberately
    /// differs from the operation name (see the request type docs).
    pub fn to_xml(&self) -> CustomResult<String, GatewayError> {
        let encoded = match self {
            Self::Pay(req) => quick_xml::se::to_string(req),
            Self::ExecutePayment(req) => quick_xml::se::to_string(req),
            Self::PaymentDetails(req) => quick_xml::se::to_string(req),
            Self::GetShippingAddresses(req) => quick_xml::se::to_string(req),
            Self::GetPaymentOptions(req) => quick_xml::se::to_string(req),
            Self::SetPaymentOptions(req) => quick_xml::se::to_string(req),
            Self::Refund(req) => quick_xml::se::to_string(req),
            Self::Preapproval(req) => quick_xml::se::to_string(req),
            Self::PreapprovalDetails(req) => quick_xml::se::to_string(req),
            Self::CancelPreapproval(req) => quick_xml::se::to_string(req),
            Self::ConvertCurrency(req) => quick_xml::se::to_string(req),
        };
        encoded.map_err(|err| {
            error_stack::report!(GatewayError::RequestEncodingFailed).attach_printable(err)
        })
    }
}

/// Mandatory header sub-document emitted first in every request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    detail_level: String,
    error_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_email: Option<String>,
}

impl RequestEnvelope {
    /// Builds the envelope, writing the error-language default back into
    /// the caller's options when absent.
    fn build(error_language: &mut Option<String>) -> Self {
        let language = error_language
            .get_or_insert_with(|| consts::DEFAULT_ERROR_LANGUAGE.to_string())
            .clone();
        Self {
            detail_level: consts::DETAIL_LEVEL.to_string(),
            error_language: language,
            sender_email: None,
        }
    }
}

/// Emits the value only when present and non-blank.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

fn required(
    value: &Option<String>,
    field_name: &'static str,
) -> CustomResult<String, GatewayError> {
    value
        .clone()
        .ok_or_else(|| error_stack::report!(GatewayError::MissingRequiredField { field_name }))
}

// ---------------------------------------------------------------------------
// Pay
// ---------------------------------------------------------------------------

/// An element of the receiver list. Email and amount are always present;
/// that is a build-time contract, enforced by the type.
#[derive(Clone, Debug)]
pub struct ReceiverEntry {
    pub email: String,
    /// Amount in minor currency units.
    pub amount: MinorUnit,
    pub primary: Option<String>,
    pub payment_type: Option<String>,
    pub invoice_id: Option<String>,
}

impl ReceiverEntry {
    pub fn new(email: impl Into<String>, amount: MinorUnit) -> Self {
        Self {
            email: email.into(),
            amount,
            primary: None,
            payment_type: None,
            invoice_id: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct PayOptions {
    pub action_type: Option<String>,
    pub cancel_url: Option<String>,
    pub currency_code: Option<String>,
    pub custom: Option<String>,
    pub error_language: Option<String>,
    pub fees_payer: Option<String>,
    pub notify_url: Option<String>,
    pub memo: Option<String>,
    pub pin: Option<SecretString>,
    pub preapproval_key: Option<String>,
    pub receiver_list: Vec<ReceiverEntry>,
    pub return_url: Option<String>,
    pub reverse_on_error: Option<String>,
    pub sender_email: Option<String>,
    pub tracking_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayReceiver {
    email: String,
    amount: StringMajorUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct PayReceiverList {
    receiver: Vec<PayReceiver>,
}

#[derive(Debug, Serialize)]
#[serde(rename = "PayRequest", rename_all = "camelCase")]
pub struct PayRequest {
    request_envelope: RequestEnvelope,
    action_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    preapproval_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_email: Option<String>,
    cancel_url: String,
    return_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ipn_notification_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fees_payer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pin: Option<String>,
    currency_code: String,
    receiver_list: PayReceiverList,
    reverse_all_parallel_payments_on_error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_id: Option<String>,
}

impl TryFrom<&mut PayOptions> for PayRequest {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(options: &mut PayOptions) -> Result<Self, Self::Error> {
        let request_envelope = RequestEnvelope::build(&mut options.error_language);
        let action_type = options
            .action_type
            .get_or_insert_with(|| consts::DEFAULT_ACTION_TYPE.to_string())
            .clone();
        let currency_code = options
            .currency_code
            .get_or_insert_with(|| consts::DEFAULT_CURRENCY_CODE.to_string())
            .clone();

        let receiver = options
            .receiver_list
            .iter()
            .map(|entry| {
                Ok(PayReceiver {
                    email: entry.email.clone(),
                    amount: entry.amount.to_major_unit_as_string()?,
                    primary: entry.primary.clone(),
                    payment_type: entry.payment_type.clone(),
                    invoice_id: entry.invoice_id.clone(),
                })
            })
            .collect::<CustomResult<Vec<_>, GatewayError>>()?;

        Ok(Self {
            request_envelope,
            action_type,
            preapproval_key: options.preapproval_key.clone(),
            sender_email: options.sender_email.clone(),
            cancel_url: required(&options.cancel_url, "cancel_url")?,
            return_url: required(&options.return_url, "return_url")?,
            ipn_notification_url: non_blank(&options.notify_url),
            memo: options.memo.clone(),
            custom: options.custom.clone(),
            fees_payer: non_blank(&options.fees_payer),
            pin: options
                .pin
                .as_ref()
                .map(|pin| pin.expose_secret().to_string())
                .filter(|pin| !pin.trim().is_empty()),
            currency_code,
            receiver_list: PayReceiverList { receiver },
            reverse_all_parallel_payments_on_error: options
                .reverse_on_error
                .clone()
                .unwrap_or_else(|| consts::DEFAULT_REVERSE_ON_ERROR.to_string()),
            tracking_id: non_blank(&options.tracking_id),
        })
    }
}

// ---------------------------------------------------------------------------
// ExecutePayment
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct ExecutePaymentOptions {
    pub error_language: Option<String>,
    pub funding_plan_id: Option<String>,
    pub pay_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename = "ExecutePaymentRequest", rename_all = "camelCase")]
pub struct ExecutePaymentRequest {
    request_envelope: RequestEnvelope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pay_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    funding_plan_id: Option<String>,
}

impl TryFrom<&mut ExecutePaymentOptions> for ExecutePaymentRequest {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(options: &mut ExecutePaymentOptions) -> Result<Self, Self::Error> {
        Ok(Self {
            request_envelope: RequestEnvelope::build(&mut options.error_language),
            pay_key: options.pay_key.clone(),
            funding_plan_id: non_blank(&options.funding_plan_id),
        })
    }
}

// ---------------------------------------------------------------------------
// PaymentDetails
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct PaymentDetailsOptions {
    pub error_language: Option<String>,
    pub pay_key: Option<String>,
    pub transaction_id: Option<String>,
}

/// The details document. Its root element is `PayRequest`, not
/// `PaymentDetailsRequest`; the remote endpoint keys the operation off the
/// URL, and this root name is the established wire behavior.
///
/// `pay_key` and `transaction_id` both map to the `payKey` element, with
/// `pay_key` winning. When neither is supplied the element is omitted
/// entirely rather than failing — a known permissiveness gap kept for wire
/// compatibility.
#[derive(Debug, Serialize)]
#[serde(rename = "PayRequest", rename_all = "camelCase")]
pub struct PaymentDetailsRequest {
    request_envelope: RequestEnvelope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pay_key: Option<String>,
}

impl TryFrom<&mut PaymentDetailsOptions> for PaymentDetailsRequest {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(options: &mut PaymentDetailsOptions) -> Result<Self, Self::Error> {
        Ok(Self {
            request_envelope: RequestEnvelope::build(&mut options.error_language),
            pay_key: non_blank(&options.pay_key).or_else(|| non_blank(&options.transaction_id)),
        })
    }
}

// ---------------------------------------------------------------------------
// GetShippingAddresses / GetPaymentOptions
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct PayKeyOptions {
    pub error_language: Option<String>,
    pub pay_key: Option<String>,
}

/// Carries the pay key under element `key`, the one operation that does
/// not use `payKey`.
#[derive(Debug, Serialize)]
#[serde(rename = "GetShippingAddressesRequest", rename_all = "camelCase")]
pub struct GetShippingAddressesRequest {
    request_envelope: RequestEnvelope,
    key: String,
}

impl TryFrom<&mut PayKeyOptions> for GetShippingAddressesRequest {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(options: &mut PayKeyOptions) -> Result<Self, Self::Error> {
        Ok(Self {
            request_envelope: RequestEnvelope::build(&mut options.error_language),
            key: required(&options.pay_key, "pay_key")?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "GetPaymentOptionsRequest", rename_all = "camelCase")]
pub struct GetPaymentOptionsRequest {
    request_envelope: RequestEnvelope,
    pay_key: String,
}

impl TryFrom<&mut PayKeyOptions> for GetPaymentOptionsRequest {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(options: &mut PayKeyOptions) -> Result<Self, Self::Error> {
        Ok(Self {
            request_envelope: RequestEnvelope::build(&mut options.error_language),
            pay_key: required(&options.pay_key, "pay_key")?,
        })
    }
}

// ---------------------------------------------------------------------------
// SetPaymentOptions
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct SenderOptionsBag {
    pub share_address: Option<String>,
    pub share_phone_number: Option<String>,
    pub require_shipping_address_selection: Option<String>,
    pub referrer_code: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct DisplayOptionsBag {
    pub email_header_image_url: Option<String>,
    pub email_marketing_image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub business_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PhoneEntry {
    pub country_code: String,
    pub phone_number: String,
    pub extension: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ReceiverIdentityBag {
    pub email: Option<String>,
    pub phone: Option<PhoneEntry>,
}

#[derive(Clone, Debug, Default)]
pub struct InvoiceItemEntry {
    pub name: Option<String>,
    pub identifier: Option<String>,
    /// Total line price in minor currency units.
    pub price: Option<MinorUnit>,
    /// Per-item price in minor currency units.
    pub item_price: Option<MinorUnit>,
    pub item_count: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct InvoiceDataBag {
    pub item: Vec<InvoiceItemEntry>,
    /// Passed through as given; not a monetary minor-unit field.
    pub total_tax: Option<String>,
    pub total_shipping: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ReceiverOptionsEntry {
    pub description: Option<String>,
    pub custom_id: Option<String>,
    pub invoice_data: Option<InvoiceDataBag>,
    pub receiver: ReceiverIdentityBag,
    pub referrer_code: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SetPaymentOptionsOptions {
    pub display_options: Option<DisplayOptionsBag>,
    pub error_language: Option<String>,
    pub pay_key: Option<String>,
    pub receiver_options: Vec<ReceiverOptionsEntry>,
    pub sender: Option<SenderOptionsBag>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SenderOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    share_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    share_phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    require_shipping_address_selection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    referrer_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DisplayOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    email_header_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_marketing_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<StringMajorUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item_price: Option<StringMajorUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item_count: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceData {
    item: Vec<InvoiceItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_tax: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_shipping: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Phone {
    country_code: String,
    phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    extension: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReceiverIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<Phone>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReceiverOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_data: Option<InvoiceData>,
    receiver: ReceiverIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    referrer_code: Option<String>,
}

/// The sender options sub-document is always emitted, even when empty, and
/// each receiver-options entry is its own repeated `receiverOptions`
/// element (there is no wrapping list element).
#[derive(Debug, Serialize)]
#[serde(rename = "SetPaymentOptionsRequest", rename_all = "camelCase")]
pub struct SetPaymentOptionsRequest {
    request_envelope: RequestEnvelope,
    sender_options: SenderOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_options: Option<DisplayOptions>,
    #[serde(rename = "receiverOptions", skip_serializing_if = "Vec::is_empty")]
    receiver_options: Vec<ReceiverOptions>,
    pay_key: String,
}

impl TryFrom<&mut SetPaymentOptionsOptions> for SetPaymentOptionsRequest {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(options: &mut SetPaymentOptionsOptions) -> Result<Self, Self::Error> {
        let request_envelope = RequestEnvelope::build(&mut options.error_language);

        let sender = options.sender.clone().unwrap_or_default();
        let sender_options = SenderOptions {
            share_address: non_blank(&sender.share_address),
            share_phone_number: non_blank(&sender.share_phone_number),
            require_shipping_address_selection: non_blank(
                &sender.require_shipping_address_selection,
            ),
            referrer_code: non_blank(&sender.referrer_code),
        };

        let display_options = options.display_options.as_ref().map(|display| DisplayOptions {
            email_header_image_url: non_blank(&display.email_header_image_url),
            email_marketing_image_url: non_blank(&display.email_marketing_image_url),
            header_image_url: non_blank(&display.header_image_url),
            business_name: non_blank(&display.business_name),
        });

        let receiver_options = options
            .receiver_options
            .iter()
            .map(|entry| {
                let invoice_data = entry
                    .invoice_data
                    .as_ref()
                    .map(|invoice| {
                        let item = invoice
                            .item
                            .iter()
                            .map(|item| {
                                Ok(InvoiceItem {
                                    name: non_blank(&item.name),
                                    identifier: non_blank(&item.identifier),
                                    price: item
                                        .price
                                        .map(|price| price.to_major_unit_as_string())
                                        .transpose()?,
                                    item_price: item
                                        .item_price
                                        .map(|price| price.to_major_unit_as_string())
                                        .transpose()?,
                                    item_count: non_blank(&item.item_count),
                                })
                            })
                            .collect::<CustomResult<Vec<_>, GatewayError>>()?;
                        Ok::<_, error_stack::Report<GatewayError>>(InvoiceData {
                            item,
                            total_tax: non_blank(&invoice.total_tax),
                            total_shipping: non_blank(&invoice.total_shipping),
                        })
                    })
                    .transpose()?;

                Ok(ReceiverOptions {
                    description: non_blank(&entry.description),
                    custom_id: non_blank(&entry.custom_id),
                    invoice_data,
                    receiver: ReceiverIdentity {
                        email: non_blank(&entry.receiver.email),
                        phone: entry.receiver.phone.as_ref().map(|phone| Phone {
                            country_code: phone.country_code.clone(),
                            phone_number: phone.phone_number.clone(),
                            extension: non_blank(&phone.extension),
                        }),
                    },
                    referrer_code: non_blank(&entry.referrer_code),
                })
            })
            .collect::<CustomResult<Vec<_>, GatewayError>>()?;

        Ok(Self {
            request_envelope,
            sender_options,
            display_options,
            receiver_options,
            pay_key: required(&options.pay_key, "pay_key")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Refund
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct RefundOptions {
    pub currency_code: Option<String>,
    pub error_language: Option<String>,
    pub fees_payer: Option<String>,
    pub pay_key: Option<String>,
    pub receiver_list: Vec<ReceiverEntry>,
    pub tracking_id: Option<String>,
    pub transaction_id: Option<String>,
}

// Refund receivers put the amount before the email on the wire; payment
// type and invoice id are documented as unused for refunds and not emitted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefundReceiver {
    amount: StringMajorUnit,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefundReceiverList {
    receiver: Vec<RefundReceiver>,
}

#[derive(Debug, Serialize)]
#[serde(rename = "RefundRequest", rename_all = "camelCase")]
pub struct RefundRequest {
    request_envelope: RequestEnvelope,
    action_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pay_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_id: Option<String>,
    currency_code: String,
    receiver_list: RefundReceiverList,
    fees_payer: String,
}

impl TryFrom<&mut RefundOptions> for RefundRequest {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(options: &mut RefundOptions) -> Result<Self, Self::Error> {
        let request_envelope = RequestEnvelope::build(&mut options.error_language);
        let currency_code = options
            .currency_code
            .get_or_insert_with(|| consts::DEFAULT_CURRENCY_CODE.to_string())
            .clone();
        let fees_payer = options
            .fees_payer
            .get_or_insert_with(|| consts::DEFAULT_FEES_PAYER.to_string())
            .clone();

        let receiver = options
            .receiver_list
            .iter()
            .map(|entry| {
                Ok(RefundReceiver {
                    amount: entry.amount.to_major_unit_as_string()?,
                    email: entry.email.clone(),
                    primary: entry.primary.clone(),
                })
            })
            .collect::<CustomResult<Vec<_>, GatewayError>>()?;

        Ok(Self {
            request_envelope,
            action_type: consts::REFUND_ACTION_TYPE.to_string(),
            pay_key: non_blank(&options.pay_key).or_else(|| non_blank(&options.transaction_id)),
            tracking_id: non_blank(&options.tracking_id),
            currency_code,
            receiver_list: RefundReceiverList { receiver },
            fees_payer,
        })
    }
}

// ---------------------------------------------------------------------------
// Preapproval family
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct PreapprovalOptions {
    pub cancel_url: Option<String>,
    pub currency_code: Option<String>,
    /// Cap shown to the sender, in minor currency units.
    pub display_max_total_amount: Option<MinorUnit>,
    pub end_date: Option<OffsetDateTime>,
    pub error_language: Option<String>,
    /// Overall cap, in minor currency units.
    pub max_amount: Option<MinorUnit>,
    pub max_amount_per_payment: Option<MinorUnit>,
    /// Passed through as given; not a monetary field.
    pub max_number_of_payments: Option<String>,
    pub memo: Option<String>,
    pub notify_url: Option<String>,
    pub return_url: Option<String>,
    pub sender_email: Option<String>,
    pub start_date: Option<OffsetDateTime>,
}

/// The preapproval document keeps two oddities of the established wire
/// behavior: the optional sender email lives inside the request envelope,
/// and three optional elements use literal snake_case tag names.
#[derive(Debug, Serialize)]
#[serde(rename = "PreapprovalRequest", rename_all = "camelCase")]
pub struct PreapprovalRequest {
    request_envelope: RequestEnvelope,
    ending_date: String,
    starting_date: String,
    max_total_amount_of_all_payments: StringMajorUnit,
    #[serde(rename = "max_amount_per_payment", skip_serializing_if = "Option::is_none")]
    max_amount_per_payment: Option<StringMajorUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memo: Option<String>,
    #[serde(rename = "max_number_of_payments", skip_serializing_if = "Option::is_none")]
    max_number_of_payments: Option<String>,
    currency_code: String,
    cancel_url: String,
    return_url: String,
    #[serde(rename = "display_max_total_amount", skip_serializing_if = "Option::is_none")]
    display_max_total_amount: Option<StringMajorUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ipn_notification_url: Option<String>,
}

impl TryFrom<&mut PreapprovalOptions> for PreapprovalRequest {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(options: &mut PreapprovalOptions) -> Result<Self, Self::Error> {
        let mut request_envelope = RequestEnvelope::build(&mut options.error_language);
        request_envelope.sender_email = options.sender_email.clone();

        let end_date = options
            .end_date
            .ok_or_else(|| error_stack::report!(GatewayError::MissingRequiredField {
                field_name: "end_date",
            }))?;
        // Start defaults to "now"; the default is not written back into the
        // caller's options, unlike the envelope language.
        let start_date = options.start_date.unwrap_or_else(OffsetDateTime::now_utc);

        let max_amount = options
            .max_amount
            .ok_or_else(|| error_stack::report!(GatewayError::MissingRequiredField {
                field_name: "max_amount",
            }))?;

        Ok(Self {
            request_envelope,
            ending_date: format_wire_datetime(end_date)?,
            starting_date: format_wire_datetime(start_date)?,
            max_total_amount_of_all_payments: max_amount.to_major_unit_as_string()?,
            max_amount_per_payment: options
                .max_amount_per_payment
                .map(|amount| amount.to_major_unit_as_string())
                .transpose()?,
            memo: options.memo.clone(),
            max_number_of_payments: options.max_number_of_payments.clone(),
            currency_code: options
                .currency_code
                .clone()
                .unwrap_or_else(|| consts::DEFAULT_CURRENCY_CODE.to_string()),
            cancel_url: required(&options.cancel_url, "cancel_url")?,
            return_url: required(&options.return_url, "return_url")?,
            display_max_total_amount: options
                .display_max_total_amount
                .map(|amount| amount.to_major_unit_as_string())
                .transpose()?,
            ipn_notification_url: options.notify_url.clone(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct PreapprovalDetailsOptions {
    pub error_language: Option<String>,
    pub get_billing_address: Option<String>,
    pub preapproval_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename = "PreapprovalDetailsRequest", rename_all = "camelCase")]
pub struct PreapprovalDetailsRequest {
    request_envelope: RequestEnvelope,
    preapproval_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    get_billing_address: Option<String>,
}

impl TryFrom<&mut PreapprovalDetailsOptions> for PreapprovalDetailsRequest {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(options: &mut PreapprovalDetailsOptions) -> Result<Self, Self::Error> {
        Ok(Self {
            request_envelope: RequestEnvelope::build(&mut options.error_language),
            preapproval_key: required(&options.preapproval_key, "preapproval_key")?,
            get_billing_address: non_blank(&options.get_billing_address),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct CancelPreapprovalOptions {
    pub error_language: Option<String>,
    pub preapproval_key: Option<String>,
}

/// Cancellation serializes under the `PreapprovalDetailsRequest` root; the
/// endpoint URL carries the actual operation. Established wire behavior.
#[derive(Debug, Serialize)]
#[serde(rename = "PreapprovalDetailsRequest", rename_all = "camelCase")]
pub struct CancelPreapprovalRequest {
    request_envelope: RequestEnvelope,
    preapproval_key: String,
}

impl TryFrom<&mut CancelPreapprovalOptions> for CancelPreapprovalRequest {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(options: &mut CancelPreapprovalOptions) -> Result<Self, Self::Error> {
        Ok(Self {
            request_envelope: RequestEnvelope::build(&mut options.error_language),
            preapproval_key: required(&options.preapproval_key, "preapproval_key")?,
        })
    }
}

// ---------------------------------------------------------------------------
// ConvertCurrency
// ---------------------------------------------------------------------------

/// A source amount to convert: minor units plus a three-letter code.
#[derive(Clone, Debug)]
pub struct CurrencyEntry {
    pub amount: MinorUnit,
    pub code: String,
}

#[derive(Clone, Debug, Default)]
pub struct ConvertCurrencyOptions {
    pub currency_list: Vec<CurrencyEntry>,
    pub error_language: Option<String>,
    /// Target currency codes, in the order they should be quoted.
    pub to_currencies: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BaseAmount {
    amount: StringMajorUnit,
    code: String,
}

#[derive(Debug, Serialize)]
struct BaseAmountList {
    currency: Vec<BaseAmount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertToCurrencyList {
    currency_code: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename = "ConvertCurrencyRequest", rename_all = "camelCase")]
pub struct ConvertCurrencyRequest {
    request_envelope: RequestEnvelope,
    base_amount_list: BaseAmountList,
    convert_to_currency_list: ConvertToCurrencyList,
}

impl TryFrom<&mut ConvertCurrencyOptions> for ConvertCurrencyRequest {
    type Error = error_stack::Report<GatewayError>;

    fn try_from(options: &mut ConvertCurrencyOptions) -> Result<Self, Self::Error> {
        let currency = options
            .currency_list
            .iter()
            .map(|entry| {
                Ok(BaseAmount {
                    amount: entry.amount.to_major_unit_as_string()?,
                    code: entry.code.clone(),
                })
            })
            .collect::<CustomResult<Vec<_>, GatewayError>>()?;

        Ok(Self {
            request_envelope: RequestEnvelope::build(&mut options.error_language),
            base_amount_list: BaseAmountList { currency },
            convert_to_currency_list: ConvertToCurrencyList {
                currency_code: options.to_currencies.clone(),
            },
        })
    }
}
