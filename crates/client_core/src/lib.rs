//! Client-side query and state layer for the hotel pricing dashboard.
//!
//! Controllers own view state and issue fetches through a [`PricingApi`];
//! only the response to the most recently issued request is ever applied.

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod multi_currency;
pub mod products;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

pub use api::{HttpPricingApi, PricingApi};
pub use error::{ApiError, ApiResult};
pub use filters::{translate, FilterSelection};
pub use multi_currency::{MultiCurrencyQueryController, MultiCurrencyViewState};
pub use products::{ProductQueryController, ProductViewState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}
