pub mod config;
pub mod context;
pub mod credentials;
pub mod entities;
pub mod error;
pub mod ports;

pub use context::CallContext;
pub use credentials::ServiceAccountKey;
pub use error::{ApiError, Error, TokenError};
