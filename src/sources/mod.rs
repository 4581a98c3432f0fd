//! Data-source adapters for the backend proxy
//!
//! One module per source, each a single HTTP call with query parameters.
//! [`BackendApi`] bundles them behind [`crate::api::DashboardApi`].

pub mod backend;
pub mod crypto;
pub mod exchange_rate;
pub mod news;
pub mod stocks;
pub mod weather;

pub use backend::BackendApi;
