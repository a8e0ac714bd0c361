//! HTTP implementations of the billing ports against the Android Publisher v3 API.
//!
//! All four services share one [`ApiTransport`], which attaches the bearer
//! token and turns non-2xx responses into [`Error::Api`]. Identifiers are
//! placed into path segments as given; only the URL layer percent-encodes them.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use playstore_core::entities::{
    ProductPurchase, ProductPurchasesAcknowledgeRequest, SubscriptionPurchase,
    SubscriptionPurchaseV2, SubscriptionPurchasesAcknowledgeRequest, VoidedPurchasesListResponse,
    VoidedPurchasesQuery,
};
use playstore_core::ports::{
    ProductPurchases, SubscriptionPurchases, SubscriptionPurchasesV2, TokenSource,
    VoidedPurchases,
};
use playstore_core::{ApiError, CallContext, Error};
use reqwest::{header, Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

const API_PATH: [&str; 3] = ["androidpublisher", "v3", "applications"];

/// Authenticated HTTP access to the Android Publisher API
pub struct ApiTransport {
    client: Client,
    token_source: Arc<dyn TokenSource>,
    base_url: Url,
}

impl fmt::Debug for ApiTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiTransport")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl ApiTransport {
    pub fn new(
        client: Client,
        token_source: Arc<dyn TokenSource>,
        base_url: &str,
    ) -> Result<Self, Error> {
        let parsed = Url::parse(base_url).map_err(|e| {
            Error::Configuration(format!("invalid API base URL '{}': {}", base_url, e))
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "API base URL '{}' cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            client,
            token_source,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/androidpublisher/v3/applications/{package}/purchases/{segments...}`
    fn purchases_url(&self, package_name: &str, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Configuration("API base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(API_PATH)
            .extend([package_name, "purchases"])
            .extend(segments);
        Ok(url)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<String, Error> {
        let token = self.token_source.token().await?;

        let response = request
            .header(header::AUTHORIZATION, token.authorization_header())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::Network(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &body);
            warn!(status = err.code, reason = ?err.reason(), "API call failed");
            return Err(Error::Api(err));
        }

        debug!(status = status.as_u16(), "API call succeeded");
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let body = self.execute(self.client.get(url).query(query)).await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::InvalidServerResponse(format!("failed to decode response: {}", e)))
    }

    async fn post(&self, url: Url) -> Result<(), Error> {
        self.execute(self.client.post(url).body("")).await.map(|_| ())
    }

    async fn post_json<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<(), Error> {
        self.execute(self.client.post(url).json(body))
            .await
            .map(|_| ())
    }
}

/// Custom method suffix, e.g. `{token}:acknowledge`
fn with_verb(token: &str, verb: &str) -> String {
    format!("{}:{}", token, verb)
}

// ============================================================================
// purchases.products
// ============================================================================

#[derive(Debug, Clone)]
pub struct HttpProductPurchases {
    transport: Arc<ApiTransport>,
}

impl HttpProductPurchases {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ProductPurchases for HttpProductPurchases {
    #[instrument(skip(self, ctx, token))]
    async fn get(
        &self,
        ctx: &CallContext,
        package_name: &str,
        product_id: &str,
        token: &str,
    ) -> Result<ProductPurchase, Error> {
        ctx.run(async {
            let url = self
                .transport
                .purchases_url(package_name, &["products", product_id, "tokens", token])?;
            self.transport.get_json(url, &[]).await
        })
        .await
    }

    #[instrument(skip(self, ctx, token, request))]
    async fn acknowledge(
        &self,
        ctx: &CallContext,
        package_name: &str,
        product_id: &str,
        token: &str,
        request: &ProductPurchasesAcknowledgeRequest,
    ) -> Result<(), Error> {
        ctx.run(async {
            let url = self.transport.purchases_url(
                package_name,
                &["products", product_id, "tokens", &with_verb(token, "acknowledge")],
            )?;
            self.transport.post_json(url, request).await
        })
        .await
    }

    #[instrument(skip(self, ctx, token))]
    async fn consume(
        &self,
        ctx: &CallContext,
        package_name: &str,
        product_id: &str,
        token: &str,
    ) -> Result<(), Error> {
        ctx.run(async {
            let url = self.transport.purchases_url(
                package_name,
                &["products", product_id, "tokens", &with_verb(token, "consume")],
            )?;
            self.transport.post(url).await
        })
        .await
    }
}

// ============================================================================
// purchases.subscriptions
// ============================================================================

#[derive(Debug, Clone)]
pub struct HttpSubscriptionPurchases {
    transport: Arc<ApiTransport>,
}

impl HttpSubscriptionPurchases {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    async fn post_verb(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
        verb: &str,
    ) -> Result<(), Error> {
        ctx.run(async {
            let url = self.transport.purchases_url(
                package_name,
                &["subscriptions", subscription_id, "tokens", &with_verb(token, verb)],
            )?;
            self.transport.post(url).await
        })
        .await
    }
}

#[async_trait]
impl SubscriptionPurchases for HttpSubscriptionPurchases {
    #[instrument(skip(self, ctx, token))]
    async fn get(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<SubscriptionPurchase, Error> {
        ctx.run(async {
            let url = self.transport.purchases_url(
                package_name,
                &["subscriptions", subscription_id, "tokens", token],
            )?;
            self.transport.get_json(url, &[]).await
        })
        .await
    }

    #[instrument(skip(self, ctx, token, request))]
    async fn acknowledge(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
        request: &SubscriptionPurchasesAcknowledgeRequest,
    ) -> Result<(), Error> {
        ctx.run(async {
            let url = self.transport.purchases_url(
                package_name,
                &["subscriptions", subscription_id, "tokens", &with_verb(token, "acknowledge")],
            )?;
            self.transport.post_json(url, request).await
        })
        .await
    }

    #[instrument(skip(self, ctx, token))]
    async fn cancel(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<(), Error> {
        self.post_verb(ctx, package_name, subscription_id, token, "cancel")
            .await
    }

    #[instrument(skip(self, ctx, token))]
    async fn refund(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<(), Error> {
        self.post_verb(ctx, package_name, subscription_id, token, "refund")
            .await
    }

    #[instrument(skip(self, ctx, token))]
    async fn revoke(
        &self,
        ctx: &CallContext,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<(), Error> {
        self.post_verb(ctx, package_name, subscription_id, token, "revoke")
            .await
    }
}

// ============================================================================
// purchases.subscriptionsv2
// ============================================================================

#[derive(Debug, Clone)]
pub struct HttpSubscriptionPurchasesV2 {
    transport: Arc<ApiTransport>,
}

impl HttpSubscriptionPurchasesV2 {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl SubscriptionPurchasesV2 for HttpSubscriptionPurchasesV2 {
    #[instrument(skip(self, ctx, token))]
    async fn get(
        &self,
        ctx: &CallContext,
        package_name: &str,
        token: &str,
    ) -> Result<SubscriptionPurchaseV2, Error> {
        ctx.run(async {
            let url = self
                .transport
                .purchases_url(package_name, &["subscriptionsv2", "tokens", token])?;
            self.transport.get_json(url, &[]).await
        })
        .await
    }
}

// ============================================================================
// purchases.voidedpurchases
// ============================================================================

#[derive(Debug, Clone)]
pub struct HttpVoidedPurchases {
    transport: Arc<ApiTransport>,
}

impl HttpVoidedPurchases {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl VoidedPurchases for HttpVoidedPurchases {
    #[instrument(skip(self, ctx))]
    async fn list(
        &self,
        ctx: &CallContext,
        package_name: &str,
        query: &VoidedPurchasesQuery,
    ) -> Result<VoidedPurchasesListResponse, Error> {
        ctx.run(async {
            let url = self
                .transport
                .purchases_url(package_name, &["voidedpurchases"])?;
            self.transport.get_json(url, &query.to_query_pairs()).await
        })
        .await
    }
}
