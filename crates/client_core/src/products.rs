//! Products-grouped-by-building view: role, advertised filters, applied filters.

use std::sync::Arc;

use futures::future::try_join;
use shared::domain::{BuildingGroup, Role};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    api::PricingApi,
    error::ApiResult,
    filters::{translate, FilterSelection},
    Phase,
};

pub const LOAD_FAILED_MESSAGE: &str =
    "Failed to load data. Make sure the pricing service is reachable.";
pub const FILTER_FAILED_MESSAGE: &str = "Failed to apply filters";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductViewState {
    pub role: Role,
    pub available_filters: Vec<String>,
    pub products: Vec<BuildingGroup>,
    /// Selection behind the currently displayed products, `None` when unfiltered.
    pub applied_filters: Option<FilterSelection>,
    pub phase: Phase,
    pub error_message: Option<String>,
    request_seq: u64,
}

impl ProductViewState {
    pub fn total_products(&self) -> usize {
        self.products.iter().map(BuildingGroup::room_count).sum()
    }
}

pub struct ProductQueryController {
    api: Arc<dyn PricingApi>,
    state: watch::Sender<ProductViewState>,
}

impl ProductQueryController {
    /// Starts idle; nothing is fetched until [`Self::set_role`] or [`Self::load`].
    pub fn new(api: Arc<dyn PricingApi>, role: Role) -> Self {
        let (state, _) = watch::channel(ProductViewState {
            role,
            ..ProductViewState::default()
        });
        Self { api, state }
    }

    pub fn snapshot(&self) -> ProductViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProductViewState> {
        self.state.subscribe()
    }

    pub fn total_products(&self) -> usize {
        self.state.borrow().total_products()
    }

    /// Switches role and returns to the unfiltered view.
    pub async fn set_role(&self, role: Role) {
        let (seq, _) = self.issue(|state| {
            state.role = role;
            state.applied_filters = None;
        });
        info!(%role, seq, "loading filters and products for role");
        self.fetch_unfiltered(seq, role).await;
    }

    /// Reloads advertised filters and the unfiltered product list for the current role.
    pub async fn load(&self) {
        let (seq, role) = self.issue(|state| state.applied_filters = None);
        self.fetch_unfiltered(seq, role).await;
    }

    pub async fn apply_filters(&self, selection: FilterSelection) {
        if selection.is_empty() {
            self.load().await;
            return;
        }

        let request = match translate(&selection) {
            Ok(request) => request,
            Err(err) => {
                warn!(attribute = err.attribute(), error = %err, "rejected filter selection");
                self.state.send_modify(|state| {
                    state.request_seq += 1;
                    state.phase = Phase::Failed;
                    state.error_message = Some(format!("{FILTER_FAILED_MESSAGE}: {err}"));
                });
                return;
            }
        };

        let (seq, _) = self.issue(|_| {});
        debug!(seq, ?request, "applying filters");
        match self.api.filtered_grouped_by_building(&request).await {
            Ok(products) => {
                self.complete(seq, |state| {
                    state.products = products;
                    state.applied_filters = Some(selection);
                    state.phase = Phase::Ready;
                });
            }
            Err(err) => {
                warn!(seq, error = %err, "filtered product fetch failed");
                self.complete(seq, |state| {
                    state.phase = Phase::Failed;
                    state.error_message = Some(FILTER_FAILED_MESSAGE.to_string());
                });
            }
        }
    }

    /// Replays the last successful configuration: role filters plus any applied selection.
    pub async fn refresh(&self) {
        let applied = self.state.borrow().applied_filters.clone();
        let Some(selection) = applied else {
            self.load().await;
            return;
        };

        let request = match translate(&selection) {
            Ok(request) => request,
            Err(err) => {
                warn!(attribute = err.attribute(), error = %err, "stored filter selection no longer translates");
                self.state.send_modify(|state| {
                    state.request_seq += 1;
                    state.phase = Phase::Failed;
                    state.error_message = Some(format!("{FILTER_FAILED_MESSAGE}: {err}"));
                });
                return;
            }
        };

        let (seq, role) = self.issue(|_| {});
        debug!(seq, %role, "refreshing filtered products");
        let result = try_join(
            self.api.filters_for_role(role),
            self.api.filtered_grouped_by_building(&request),
        )
        .await;
        self.complete_load(seq, result, FILTER_FAILED_MESSAGE);
    }

    async fn fetch_unfiltered(&self, seq: u64, role: Role) {
        let result = try_join(
            self.api.filters_for_role(role),
            self.api.grouped_by_building(),
        )
        .await;
        self.complete_load(seq, result, LOAD_FAILED_MESSAGE);
    }

    fn complete_load(
        &self,
        seq: u64,
        result: ApiResult<(Vec<String>, Vec<BuildingGroup>)>,
        failure_message: &str,
    ) {
        match result {
            Ok((filters, products)) => {
                self.complete(seq, |state| {
                    state.available_filters = filters;
                    state.products = products;
                    state.phase = Phase::Ready;
                });
            }
            Err(err) => {
                warn!(seq, error = %err, retriable = err.is_retriable(), "product load failed");
                self.complete(seq, |state| {
                    state.phase = Phase::Failed;
                    state.error_message = Some(failure_message.to_string());
                });
            }
        }
    }

    /// Applies `update`, enters `Loading` and returns the new request sequence
    /// number with the role the request is issued for.
    fn issue(&self, update: impl FnOnce(&mut ProductViewState)) -> (u64, Role) {
        let mut issued = (0, Role::default());
        self.state.send_modify(|state| {
            update(state);
            state.request_seq += 1;
            state.phase = Phase::Loading;
            state.error_message = None;
            issued = (state.request_seq, state.role);
        });
        issued
    }

    /// Applies a response only if no newer request was issued since `seq`.
    fn complete(&self, seq: u64, apply: impl FnOnce(&mut ProductViewState)) -> bool {
        self.state.send_if_modified(|state| {
            if state.request_seq != seq {
                debug!(seq, current = state.request_seq, "discarding superseded product response");
                return false;
            }
            apply(state);
            true
        })
    }
}

#[cfg(test)]
#[path = "tests/products_tests.rs"]
mod tests;
