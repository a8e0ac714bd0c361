use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::time::Instant;

// ============================================================================
// Access tokens
// ============================================================================

/// Bearer token minted from a service account key
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub token_type: String,
    pub expires_at: Option<Instant>,
}

impl AccessToken {
    /// An `expires_in` too large to represent is treated as no expiry.
    pub fn new(
        value: impl Into<String>,
        token_type: impl Into<String>,
        expires_in: Option<Duration>,
    ) -> Self {
        Self {
            value: value.into(),
            token_type: token_type.into(),
            expires_at: expires_in.and_then(|d| Instant::now().checked_add(d)),
        }
    }

    /// True if the token expires within `skew` from now. Tokens without an
    /// expiry never expire.
    pub fn is_expired(&self, skew: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now()
                .checked_add(skew)
                .map_or(true, |limit| expires_at <= limit),
            None => false,
        }
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        let token_type = if self.token_type.is_empty()
            || self.token_type.eq_ignore_ascii_case("bearer")
        {
            "Bearer"
        } else {
            self.token_type.as_str()
        };
        format!("{} {}", token_type, self.value)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

fn parse_millis(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.parse().ok())
}

// ============================================================================
// One-time products
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseState {
    Purchased,
    Canceled,
    Pending,
}

impl PurchaseState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Purchased),
            1 => Some(Self::Canceled),
            2 => Some(Self::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionState {
    YetToBeConsumed,
    Consumed,
}

impl ConsumptionState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::YetToBeConsumed),
            1 => Some(Self::Consumed),
            _ => None,
        }
    }
}

/// Acknowledgement state shared by product and v1 subscription purchases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcknowledgementState {
    YetToBeAcknowledged,
    Acknowledged,
}

impl AcknowledgementState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::YetToBeAcknowledged),
            1 => Some(Self::Acknowledged),
            _ => None,
        }
    }
}

/// Purchase and consumption status of an in-app product
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPurchase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_time_millis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_state: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption_state: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgement_state: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfuscated_external_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfuscated_external_profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refundable_quantity: Option<i32>,
    /// Fields not modelled above, kept as returned by the server
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductPurchase {
    pub fn state(&self) -> Option<PurchaseState> {
        self.purchase_state.and_then(PurchaseState::from_code)
    }

    pub fn consumption(&self) -> Option<ConsumptionState> {
        self.consumption_state.and_then(ConsumptionState::from_code)
    }

    pub fn acknowledgement(&self) -> Option<AcknowledgementState> {
        self.acknowledgement_state
            .and_then(AcknowledgementState::from_code)
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledgement() == Some(AcknowledgementState::Acknowledged)
    }

    pub fn purchase_time_millis(&self) -> Option<i64> {
        parse_millis(&self.purchase_time_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPurchasesAcknowledgeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_payload: Option<String>,
}

impl ProductPurchasesAcknowledgeRequest {
    pub fn new(developer_payload: Option<String>) -> Self {
        Self { developer_payload }
    }
}

// ============================================================================
// Subscriptions (v1)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    Pending,
    Received,
    FreeTrial,
    PendingDeferred,
}

impl PaymentState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Received),
            2 => Some(Self::FreeTrial),
            3 => Some(Self::PendingDeferred),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    UserCanceled,
    SystemCanceled,
    Replaced,
    DeveloperCanceled,
}

impl CancelReason {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::UserCanceled),
            1 => Some(Self::SystemCanceled),
            2 => Some(Self::Replaced),
            3 => Some(Self::DeveloperCanceled),
            _ => None,
        }
    }
}

/// Status of a subscription purchase as returned by `purchases.subscriptions.get`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPurchase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time_millis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_time_millis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_resume_time_millis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_renewing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_amount_micros: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_state: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_cancellation_time_millis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_purchase_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgement_state: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfuscated_external_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfuscated_external_profile_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubscriptionPurchase {
    pub fn start_time_millis(&self) -> Option<i64> {
        parse_millis(&self.start_time_millis)
    }

    pub fn expiry_time_millis(&self) -> Option<i64> {
        parse_millis(&self.expiry_time_millis)
    }

    pub fn payment(&self) -> Option<PaymentState> {
        self.payment_state.and_then(PaymentState::from_code)
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        self.cancel_reason.and_then(CancelReason::from_code)
    }

    pub fn acknowledgement(&self) -> Option<AcknowledgementState> {
        self.acknowledgement_state
            .and_then(AcknowledgementState::from_code)
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledgement() == Some(AcknowledgementState::Acknowledged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPurchasesAcknowledgeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_payload: Option<String>,
}

impl SubscriptionPurchasesAcknowledgeRequest {
    pub fn new(developer_payload: Option<String>) -> Self {
        Self { developer_payload }
    }
}

// ============================================================================
// Subscriptions (v2)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionState {
    SubscriptionStateUnspecified,
    SubscriptionStatePending,
    SubscriptionStateActive,
    SubscriptionStatePaused,
    SubscriptionStateInGracePeriod,
    SubscriptionStateOnHold,
    SubscriptionStateCanceled,
    SubscriptionStateExpired,
    SubscriptionStatePendingPurchaseCanceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcknowledgementStateV2 {
    AcknowledgementStateUnspecified,
    AcknowledgementStatePending,
    AcknowledgementStateAcknowledged,
    #[serde(other)]
    Unknown,
}

/// One purchased product within a v2 subscription
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPurchaseLineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// RFC 3339 timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_renewing_plan: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepaid_plan: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_details: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPurchaseV2 {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<SubscriptionPurchaseLineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_state: Option<SubscriptionState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_purchase_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgement_state: Option<AcknowledgementStateV2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_state_context: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canceled_state_context: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_purchase: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_account_identifiers: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubscriptionPurchaseV2 {
    /// Active or in grace period, i.e. the user is entitled to the content
    pub fn is_active(&self) -> bool {
        matches!(
            self.subscription_state,
            Some(SubscriptionState::SubscriptionStateActive)
                | Some(SubscriptionState::SubscriptionStateInGracePeriod)
        )
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledgement_state == Some(AcknowledgementStateV2::AcknowledgementStateAcknowledged)
    }

    pub fn is_test_purchase(&self) -> bool {
        self.test_purchase.is_some()
    }
}

// ============================================================================
// Voided purchases
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidedPurchase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_time_millis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voided_time_millis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// 0 user, 1 developer, 2 Google
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voided_source: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voided_reason: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voided_quantity: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VoidedPurchase {
    pub fn voided_time_millis(&self) -> Option<i64> {
        parse_millis(&self.voided_time_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_results: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidedPurchasesListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_pagination: Option<TokenPagination>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub voided_purchases: Vec<VoidedPurchase>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VoidedPurchasesListResponse {
    pub fn next_page_token(&self) -> Option<&str> {
        self.token_pagination
            .as_ref()
            .and_then(|p| p.next_page_token.as_deref())
    }
}

/// Which purchases `voidedpurchases.list` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoidedPurchaseType {
    /// Only voided in-app product purchases
    #[default]
    Products,
    /// In-app products and subscriptions
    All,
}

impl VoidedPurchaseType {
    pub fn as_param(self) -> &'static str {
        match self {
            VoidedPurchaseType::Products => "0",
            VoidedPurchaseType::All => "1",
        }
    }
}

/// Optional filters for `voidedpurchases.list`. Unset fields are not sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoidedPurchasesQuery {
    /// Milliseconds since the epoch
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub max_results: Option<u32>,
    /// `nextPageToken` from a previous page
    pub page_token: Option<String>,
    pub purchase_type: Option<VoidedPurchaseType>,
    pub include_quantity_based_partial_refund: Option<bool>,
}

impl VoidedPurchasesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_time(mut self, millis: i64) -> Self {
        self.start_time = Some(millis);
        self
    }

    pub fn end_time(mut self, millis: i64) -> Self {
        self.end_time = Some(millis);
        self
    }

    pub fn max_results(mut self, max: u32) -> Self {
        self.max_results = Some(max);
        self
    }

    pub fn page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    pub fn purchase_type(mut self, purchase_type: VoidedPurchaseType) -> Self {
        self.purchase_type = Some(purchase_type);
        self
    }

    pub fn include_quantity_based_partial_refund(mut self, include: bool) -> Self {
        self.include_quantity_based_partial_refund = Some(include);
        self
    }

    /// Query string pairs in wire names
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start_time {
            pairs.push(("startTime", start.to_string()));
        }
        if let Some(end) = self.end_time {
            pairs.push(("endTime", end.to_string()));
        }
        if let Some(max) = self.max_results {
            pairs.push(("maxResults", max.to_string()));
        }
        if let Some(ref token) = self.page_token {
            pairs.push(("token", token.clone()));
        }
        if let Some(purchase_type) = self.purchase_type {
            pairs.push(("type", purchase_type.as_param().to_string()));
        }
        if let Some(include) = self.include_quantity_based_partial_refund {
            pairs.push(("includeQuantityBasedPartialRefund", include.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Some(PurchaseState::Purchased))]
    #[case(1, Some(PurchaseState::Canceled))]
    #[case(2, Some(PurchaseState::Pending))]
    #[case(7, None)]
    fn test_purchase_state_codes(#[case] code: i32, #[case] expected: Option<PurchaseState>) {
        assert_eq!(PurchaseState::from_code(code), expected);
    }

    #[rstest]
    #[case(0, Some(PaymentState::Pending))]
    #[case(1, Some(PaymentState::Received))]
    #[case(2, Some(PaymentState::FreeTrial))]
    #[case(3, Some(PaymentState::PendingDeferred))]
    #[case(-1, None)]
    fn test_payment_state_codes(#[case] code: i32, #[case] expected: Option<PaymentState>) {
        assert_eq!(PaymentState::from_code(code), expected);
    }

    #[test]
    fn test_product_purchase_from_api() {
        let body = r#"{
            "kind": "androidpublisher#productPurchase",
            "purchaseTimeMillis": "1700000000000",
            "purchaseState": 0,
            "consumptionState": 0,
            "developerPayload": "",
            "orderId": "GPA.1234-5678-9012-34567",
            "acknowledgementState": 1,
            "regionCode": "US",
            "someFutureField": {"nested": true}
        }"#;
        let purchase: ProductPurchase = serde_json::from_str(body).unwrap();

        assert_eq!(purchase.state(), Some(PurchaseState::Purchased));
        assert_eq!(purchase.consumption(), Some(ConsumptionState::YetToBeConsumed));
        assert!(purchase.is_acknowledged());
        assert_eq!(purchase.purchase_time_millis(), Some(1_700_000_000_000));
        assert_eq!(purchase.developer_payload.as_deref(), Some(""));
        assert_eq!(
            purchase.extra.get("someFutureField"),
            Some(&serde_json::json!({"nested": true}))
        );
    }

    #[test]
    fn test_product_purchase_reserializes_without_loss() {
        let body = r#"{"orderId":"GPA.1","quantity":2,"someFutureField":"x"}"#;
        let purchase: ProductPurchase = serde_json::from_str(body).unwrap();

        insta::assert_json_snapshot!(purchase, @r###"
        {
          "orderId": "GPA.1",
          "quantity": 2,
          "someFutureField": "x"
        }
        "###);
    }

    #[test]
    fn test_subscription_purchase_from_api() {
        let body = r#"{
            "kind": "androidpublisher#subscriptionPurchase",
            "startTimeMillis": "1700000000000",
            "expiryTimeMillis": "1702592000000",
            "autoRenewing": false,
            "priceCurrencyCode": "EUR",
            "priceAmountMicros": "4990000",
            "countryCode": "DE",
            "paymentState": 1,
            "cancelReason": 0,
            "orderId": "GPA.3333-4444-5555-66666..0",
            "acknowledgementState": 0
        }"#;
        let sub: SubscriptionPurchase = serde_json::from_str(body).unwrap();

        assert_eq!(sub.expiry_time_millis(), Some(1_702_592_000_000));
        assert_eq!(sub.start_time_millis(), Some(1_700_000_000_000));
        assert_eq!(sub.payment(), Some(PaymentState::Received));
        assert_eq!(sub.cancel_reason(), Some(CancelReason::UserCanceled));
        assert!(!sub.is_acknowledged());
        assert_eq!(sub.auto_renewing, Some(false));
    }

    #[test]
    fn test_subscription_v2_from_api() {
        let body = r#"{
            "kind": "androidpublisher#subscriptionPurchaseV2",
            "regionCode": "US",
            "lineItems": [{
                "productId": "premium_monthly",
                "expiryTime": "2024-01-15T10:00:00.000Z",
                "autoRenewingPlan": {"autoRenewEnabled": true}
            }],
            "startTime": "2023-12-15T10:00:00.000Z",
            "subscriptionState": "SUBSCRIPTION_STATE_ACTIVE",
            "latestOrderId": "GPA.1111-2222-3333-44444",
            "acknowledgementState": "ACKNOWLEDGEMENT_STATE_ACKNOWLEDGED",
            "testPurchase": {}
        }"#;
        let sub: SubscriptionPurchaseV2 = serde_json::from_str(body).unwrap();

        assert!(sub.is_active());
        assert!(sub.is_acknowledged());
        assert!(sub.is_test_purchase());
        assert_eq!(sub.line_items.len(), 1);
        assert_eq!(
            sub.line_items[0].product_id.as_deref(),
            Some("premium_monthly")
        );
    }

    #[rstest]
    #[case("SUBSCRIPTION_STATE_ACTIVE", true)]
    #[case("SUBSCRIPTION_STATE_IN_GRACE_PERIOD", true)]
    #[case("SUBSCRIPTION_STATE_ON_HOLD", false)]
    #[case("SUBSCRIPTION_STATE_EXPIRED", false)]
    #[case("SUBSCRIPTION_STATE_SOMETHING_NEW", false)]
    fn test_subscription_v2_active_states(#[case] state: &str, #[case] active: bool) {
        let body = format!(r#"{{"subscriptionState": "{}"}}"#, state);
        let sub: SubscriptionPurchaseV2 = serde_json::from_str(&body).unwrap();
        assert_eq!(sub.is_active(), active);
    }

    #[test]
    fn test_unknown_subscription_state() {
        let body = r#"{"subscriptionState": "SUBSCRIPTION_STATE_SOMETHING_NEW"}"#;
        let sub: SubscriptionPurchaseV2 = serde_json::from_str(body).unwrap();
        assert_eq!(sub.subscription_state, Some(SubscriptionState::Unknown));
    }

    #[test]
    fn test_voided_purchases_list_response() {
        let body = r#"{
            "pageInfo": {"totalResults": 2, "resultPerPage": 1000, "startIndex": 0},
            "tokenPagination": {"nextPageToken": "next-page"},
            "voidedPurchases": [
                {
                    "kind": "androidpublisher#voidedPurchase",
                    "purchaseToken": "token-a",
                    "purchaseTimeMillis": "1700000000000",
                    "voidedTimeMillis": "1700100000000",
                    "orderId": "GPA.1",
                    "voidedSource": 0,
                    "voidedReason": 1
                },
                {"purchaseToken": "token-b", "voidedQuantity": 1}
            ]
        }"#;
        let list: VoidedPurchasesListResponse = serde_json::from_str(body).unwrap();

        assert_eq!(list.voided_purchases.len(), 2);
        assert_eq!(list.next_page_token(), Some("next-page"));
        assert_eq!(
            list.voided_purchases[0].voided_time_millis(),
            Some(1_700_100_000_000)
        );
        assert_eq!(list.page_info.unwrap().total_results, Some(2));
    }

    #[test]
    fn test_voided_purchases_list_keeps_unknown_fields() {
        let body = r#"{
            "kind": "androidpublisher#voidedPurchasesListResponse",
            "pageInfo": {"totalResults": 1, "pageHint": "p"},
            "tokenPagination": {"nextPageToken": "n", "cursor": 3}
        }"#;
        let list: VoidedPurchasesListResponse = serde_json::from_str(body).unwrap();

        insta::assert_json_snapshot!(list, @r###"
        {
          "pageInfo": {
            "totalResults": 1,
            "pageHint": "p"
          },
          "tokenPagination": {
            "nextPageToken": "n",
            "cursor": 3
          },
          "kind": "androidpublisher#voidedPurchasesListResponse"
        }
        "###);
    }

    #[test]
    fn test_empty_voided_purchases_list() {
        let list: VoidedPurchasesListResponse = serde_json::from_str("{}").unwrap();
        assert!(list.voided_purchases.is_empty());
        assert_eq!(list.next_page_token(), None);
    }

    #[test]
    fn test_voided_query_pairs() {
        let query = VoidedPurchasesQuery::new()
            .start_time(1_700_000_000_000)
            .end_time(1_700_100_000_000)
            .max_results(500)
            .page_token("next-page")
            .purchase_type(VoidedPurchaseType::All)
            .include_quantity_based_partial_refund(true);

        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("startTime", "1700000000000".to_string()),
                ("endTime", "1700100000000".to_string()),
                ("maxResults", "500".to_string()),
                ("token", "next-page".to_string()),
                ("type", "1".to_string()),
                ("includeQuantityBasedPartialRefund", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_voided_query_sends_nothing() {
        assert!(VoidedPurchasesQuery::new().to_query_pairs().is_empty());
    }

    #[test]
    fn test_acknowledge_request_serialization() {
        let with_payload = ProductPurchasesAcknowledgeRequest::new(Some("order-42".to_string()));
        assert_eq!(
            serde_json::to_string(&with_payload).unwrap(),
            r#"{"developerPayload":"order-42"}"#
        );

        let without_payload = SubscriptionPurchasesAcknowledgeRequest::new(None);
        assert_eq!(serde_json::to_string(&without_payload).unwrap(), "{}");
    }

    #[test]
    fn test_access_token_expiry() {
        let token = AccessToken::new("ya29.token", "Bearer", Some(Duration::from_secs(3600)));
        assert!(!token.is_expired(Duration::from_secs(10)));
        assert!(token.is_expired(Duration::from_secs(3601)));

        let forever = AccessToken::new("ya29.token", "Bearer", None);
        assert!(!forever.is_expired(Duration::from_secs(10)));
    }

    #[test]
    fn test_access_token_oversized_expiry_never_expires() {
        let token = AccessToken::new("ya29.token", "Bearer", Some(Duration::MAX));
        assert_eq!(token.expires_at, None);
        assert!(!token.is_expired(Duration::from_secs(10)));
    }

    #[test]
    fn test_access_token_oversized_skew_counts_as_expired() {
        let token = AccessToken::new("ya29.token", "Bearer", Some(Duration::from_secs(3600)));
        assert!(token.is_expired(Duration::MAX));
    }

    #[rstest]
    #[case("Bearer", "Bearer ya29.abc")]
    #[case("bearer", "Bearer ya29.abc")]
    #[case("", "Bearer ya29.abc")]
    #[case("MAC", "MAC ya29.abc")]
    fn test_authorization_header(#[case] token_type: &str, #[case] expected: &str) {
        let token = AccessToken::new("ya29.abc", token_type, None);
        assert_eq!(token.authorization_header(), expected);
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("ya29.secret", "Bearer", None);
        let debug = format!("{:?}", token);
        assert!(!debug.contains("ya29.secret"));
    }
}
