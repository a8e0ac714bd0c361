pub mod android_publisher;
pub mod client;
pub mod configuration;
pub mod network;
pub mod oauth;
pub mod telemetry;

// Re-exports for convenience
pub use android_publisher::{
    ApiTransport, HttpProductPurchases, HttpSubscriptionPurchases, HttpSubscriptionPurchasesV2,
    HttpVoidedPurchases,
};
pub use client::{ClientOptions, PlayStoreClient};
pub use oauth::{ServiceAccountTokenSource, ANDROID_PUBLISHER_SCOPE};
