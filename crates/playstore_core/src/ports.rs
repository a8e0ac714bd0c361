use async_trait::async_trait;

use crate::context::CallContext;
use crate::entities::{
    AccessToken, ProductPurchase, ProductPurchasesAcknowledgeRequest, SubscriptionPurchase,
    SubscriptionPurchaseV2, SubscriptionPurchasesAcknowledgeRequest, VoidedPurchasesListResponse,
    VoidedPurchasesQuery,
};
use crate::error::Error;

// ============================================================================
// Authentication Ports
// ============================================================================

/// Source of bearer tokens for the Android Publisher API
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a token that is valid for at least a few more seconds,
    /// fetching a new one if needed
    async fn token(&self) -> Result<AccessToken, Error>;
}

// ============================================================================
// Billing Ports
// ============================================================================

/// `purchases.products`: one-time in-app products
#[async_trait]
pub trait ProductPurchases: Send + Sync {
    async fn get(
        &self,
        ctx: &CallContext,
        package_name: &str,
        product_id: &str,
        token: &str,
    ) -> Result<ProductPurchase, Error>;

    async fn acknowledge(
        &self,
        ctx: &CallContext,
        package_name: &str,
        product_id: &str,
        token: &str,
        request: &ProductPurchasesAcknowledgeRequest,
    ) -> Result<(), Error>;

    async fn consume(
        &self,
        ctx: &CallContext,
        package_name: &str,
        product_id: &str,
        token: &str,
    ) -> Result<(), Error>;
}

/// `purchases.subscriptions`: v1 subscription purchases
#[async_trait]
pub trait SubscriptionPurchases: Send + Sync {
    async fn get(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<SubscriptionPurchase, Error>;

    async fn acknowledge(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
        request: &SubscriptionPurchasesAcknowledgeRequest,
    ) -> Result<(), Error>;

    /// Stop renewal; the user keeps access until the current period ends
    async fn cancel(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<(), Error>;

    /// Refund the current payment; the subscription keeps renewing
    async fn refund(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<(), Error>;

    /// Refund and terminate access immediately
    async fn revoke(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<(), Error>;
}

/// `purchases.subscriptionsv2`
#[async_trait]
pub trait SubscriptionPurchasesV2: Send + Sync {
    async fn get(
        &self,
        ctx: &CallContext,
        package_name: &str,
        token: &str,
    ) -> Result<SubscriptionPurchaseV2, Error>;
}

/// `purchases.voidedpurchases`
#[async_trait]
pub trait VoidedPurchases: Send + Sync {
    async fn list(
        &self,
        ctx: &CallContext,
        package_name: &str,
        query: &VoidedPurchasesQuery,
    ) -> Result<VoidedPurchasesListResponse, Error>;
}
