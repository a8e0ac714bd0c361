use std::path::Path;
use std::sync::Arc;

use playstore_core::config::DEFAULT_API_BASE_URL;
use playstore_core::entities::{
    ProductPurchase, ProductPurchasesAcknowledgeRequest, SubscriptionPurchase,
    SubscriptionPurchaseV2, SubscriptionPurchasesAcknowledgeRequest, VoidedPurchasesListResponse,
    VoidedPurchasesQuery,
};
use playstore_core::ports::{
    ProductPurchases, SubscriptionPurchases, SubscriptionPurchasesV2, TokenSource,
    VoidedPurchases,
};
use playstore_core::{CallContext, Error, ServiceAccountKey};
use reqwest::Client;
use tracing::{info, instrument};

use crate::android_publisher::{
    ApiTransport, HttpProductPurchases, HttpSubscriptionPurchases, HttpSubscriptionPurchasesV2,
    HttpVoidedPurchases,
};
use crate::network::build_default_client;
use crate::oauth::{ServiceAccountTokenSource, ANDROID_PUBLISHER_SCOPE};

/// Construction options for [`PlayStoreClient`]
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    http_client: Option<Client>,
    base_url: Option<String>,
    scopes: Option<Vec<String>>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `client` for the token exchange and every API call
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Override the API endpoint (defaults to the production host)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the OAuth2 scopes (defaults to the androidpublisher scope)
    pub fn with_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }
}

/// Google Play billing client authenticated with a service account.
///
/// Cheap to clone; clones share the HTTP client and cached token.
#[derive(Debug, Clone)]
pub struct PlayStoreClient {
    products: HttpProductPurchases,
    subscriptions: HttpSubscriptionPurchases,
    subscriptions_v2: HttpSubscriptionPurchasesV2,
    voided_purchases: HttpVoidedPurchases,
}

impl PlayStoreClient {
    /// Build a client from a JSON service account key.
    ///
    /// Fetches one access token before returning so that a key the token
    /// endpoint rejects never yields a usable client.
    #[instrument(skip(json_key, options))]
    pub async fn new(json_key: &[u8], options: ClientOptions) -> Result<Self, Error> {
        let key = ServiceAccountKey::from_slice(json_key)?;

        let client = match options.http_client {
            Some(client) => client,
            None => build_default_client()?,
        };
        let scopes = options
            .scopes
            .unwrap_or_else(|| vec![ANDROID_PUBLISHER_SCOPE.to_string()]);

        let token_source = ServiceAccountTokenSource::new(&key, &scopes, client.clone())?;
        token_source.token().await?;

        let base_url = options.base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        let transport = Arc::new(ApiTransport::new(client, Arc::new(token_source), base_url)?);

        info!(
            client_email = %key.client_email,
            base_url = %transport.base_url(),
            "play store client ready"
        );

        Ok(Self {
            products: HttpProductPurchases::new(transport.clone()),
            subscriptions: HttpSubscriptionPurchases::new(transport.clone()),
            subscriptions_v2: HttpSubscriptionPurchasesV2::new(transport.clone()),
            voided_purchases: HttpVoidedPurchases::new(transport),
        })
    }

    /// Read a JSON key from `path` and build a client from it.
    pub async fn from_json_file(
        path: impl AsRef<Path>,
        options: ClientOptions,
    ) -> Result<Self, Error> {
        let data = tokio::fs::read(path.as_ref()).await?;
        Self::new(&data, options).await
    }

    pub fn products(&self) -> &HttpProductPurchases {
        &self.products
    }

    pub fn subscriptions(&self) -> &HttpSubscriptionPurchases {
        &self.subscriptions
    }

    pub fn subscriptions_v2(&self) -> &HttpSubscriptionPurchasesV2 {
        &self.subscriptions_v2
    }

    pub fn voided_purchases(&self) -> &HttpVoidedPurchases {
        &self.voided_purchases
    }

    pub async fn verify_product(
        &self,
        ctx: &CallContext,
        package_name: &str,
        product_id: &str,
        token: &str,
    ) -> Result<ProductPurchase, Error> {
        self.products
            .get(ctx, package_name, product_id, token)
            .await
    }

    pub async fn acknowledge_product(
        &self,
        ctx: &CallContext,
        package_name: &str,
        product_id: &str,
        token: &str,
        developer_payload: Option<&str>,
    ) -> Result<(), Error> {
        let request =
            ProductPurchasesAcknowledgeRequest::new(developer_payload.map(str::to_string));
        self.products
            .acknowledge(ctx, package_name, product_id, token, &request)
            .await
    }

    pub async fn consume_product(
        &self,
        ctx: &CallContext,
        package_name: &str,
        product_id: &str,
        token: &str,
    ) -> Result<(), Error> {
        self.products
            .consume(ctx, package_name, product_id, token)
            .await
    }

    pub async fn verify_subscription(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<SubscriptionPurchase, Error> {
        self.subscriptions
            .get(ctx, package_name, subscription_id, token)
            .await
    }

    pub async fn verify_subscription_v2(
        &self,
        ctx: &CallContext,
        package_name: &str,
        token: &str,
    ) -> Result<SubscriptionPurchaseV2, Error> {
        self.subscriptions_v2.get(ctx, package_name, token).await
    }

    pub async fn acknowledge_subscription(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
        developer_payload: Option<&str>,
    ) -> Result<(), Error> {
        let request =
            SubscriptionPurchasesAcknowledgeRequest::new(developer_payload.map(str::to_string));
        self.subscriptions
            .acknowledge(ctx, package_name, subscription_id, token, &request)
            .await
    }

    pub async fn cancel_subscription(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<(), Error> {
        self.subscriptions
            .cancel(ctx, package_name, subscription_id, token)
            .await
    }

    pub async fn refund_subscription(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<(), Error> {
        self.subscriptions
            .refund(ctx, package_name, subscription_id, token)
            .await
    }

    pub async fn revoke_subscription(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<(), Error> {
        self.subscriptions
            .revoke(ctx, package_name, subscription_id, token)
            .await
    }

    pub async fn list_voided_purchases(
        &self,
        ctx: &CallContext,
        package_name: &str,
        query: &VoidedPurchasesQuery,
    ) -> Result<VoidedPurchasesListResponse, Error> {
        self.voided_purchases.list(ctx, package_name, query).await
    }
}
