pub mod client;
pub mod error;

pub use client::ExaClient;
pub use error::ProviderError;
