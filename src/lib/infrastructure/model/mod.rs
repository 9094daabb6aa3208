//! Model infrastructure module
//!
//! Text generation providers behind a factory.
//!
//! # Structure
//! - `types` - Request and error types
//! - `traits` - `TextClient` trait
//! - `adapter` - Message format adapters
//! - `retry` - Rate-limit backoff shared with image clients
//! - `factory` - Creates clients from a provider entry
//! - `clients` - Individual client implementations

pub mod adapter;
pub mod clients;
pub mod factory;
pub mod retry;
pub mod traits;
pub mod types;

pub use factory::TextClientFactory;
pub use retry::RetryPolicy;
pub use traits::TextClient;
pub use types::{FailureKind, ModelError, TextRequest};
