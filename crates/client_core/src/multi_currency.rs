//! Paginated, sorted multi-currency price list.

use std::{collections::BTreeSet, sync::Arc};

use shared::{
    domain::MultiCurrencyProduct,
    protocol::{MultiCurrencyQuery, PageCursor, SortSpec},
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{api::PricingApi, Phase};

pub const MULTI_CURRENCY_FAILED_MESSAGE: &str =
    "Failed to load multi-currency data. Make sure the pricing service is reachable.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiCurrencyViewState {
    pub products: Vec<MultiCurrencyProduct>,
    pub query: MultiCurrencyQuery,
    pub phase: Phase,
    pub error_message: Option<String>,
    request_seq: u64,
}

impl MultiCurrencyViewState {
    /// Distinct currency codes priced anywhere on the loaded page, ascending.
    pub fn all_currencies(&self) -> Vec<String> {
        self.products
            .iter()
            .flat_map(|product| product.prices.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// A short page is taken to be the last one. Only a page that loaded for the
    /// current query counts, so a failed or in-flight fetch disables next.
    pub fn has_next_page(&self) -> bool {
        self.phase == Phase::Ready && self.products.len() >= self.query.cursor.size as usize
    }

    pub fn has_previous_page(&self) -> bool {
        self.query.cursor.index > 0
    }

    /// One-based page label.
    pub fn page_number(&self) -> u32 {
        self.query.cursor.index.saturating_add(1)
    }
}

pub struct MultiCurrencyQueryController {
    api: Arc<dyn PricingApi>,
    state: watch::Sender<MultiCurrencyViewState>,
}

impl MultiCurrencyQueryController {
    pub fn new(api: Arc<dyn PricingApi>, page_size: u32) -> Self {
        Self::with_query(
            api,
            MultiCurrencyQuery {
                sort: SortSpec::default(),
                cursor: PageCursor::new(page_size),
            },
        )
    }

    /// Starts idle at `query`; the first [`Self::load`] fetches exactly that page.
    pub fn with_query(api: Arc<dyn PricingApi>, query: MultiCurrencyQuery) -> Self {
        let (state, _) = watch::channel(MultiCurrencyViewState {
            query,
            ..MultiCurrencyViewState::default()
        });
        Self { api, state }
    }

    pub fn snapshot(&self) -> MultiCurrencyViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MultiCurrencyViewState> {
        self.state.subscribe()
    }

    pub fn all_currencies(&self) -> Vec<String> {
        self.state.borrow().all_currencies()
    }

    pub fn has_next_page(&self) -> bool {
        self.state.borrow().has_next_page()
    }

    /// Fetches the page for the current `(sort, cursor)`; also the retry path.
    pub async fn load(&self) {
        let mut issued = None;
        self.state.send_modify(|state| {
            let query = state.query.clone();
            issued = Some(Self::issue(state, query));
        });
        if let Some((seq, query)) = issued {
            self.fetch(seq, query).await;
        }
    }

    /// Same column flips direction, a new column sorts ascending. The page is kept.
    pub async fn set_sort(&self, column: &str) {
        self.transition(|query| MultiCurrencyQuery {
            sort: query.sort.toggled(column),
            cursor: query.cursor,
        })
        .await;
    }

    pub async fn next_page(&self) {
        self.transition(|query| MultiCurrencyQuery {
            sort: query.sort.clone(),
            cursor: query.cursor.next(),
        })
        .await;
    }

    pub async fn previous_page(&self) {
        self.transition(|query| MultiCurrencyQuery {
            sort: query.sort.clone(),
            cursor: query.cursor.previous(),
        })
        .await;
    }

    /// Derives the next query from the latest state and fetches only if it changed.
    async fn transition(&self, next: impl FnOnce(&MultiCurrencyQuery) -> MultiCurrencyQuery) {
        let mut issued = None;
        self.state.send_if_modified(|state| {
            let query = next(&state.query);
            if query == state.query {
                return false;
            }
            issued = Some(Self::issue(state, query));
            true
        });

        match issued {
            Some((seq, query)) => self.fetch(seq, query).await,
            None => debug!("multi-currency query unchanged; no fetch issued"),
        }
    }

    fn issue(
        state: &mut MultiCurrencyViewState,
        query: MultiCurrencyQuery,
    ) -> (u64, MultiCurrencyQuery) {
        state.query = query.clone();
        state.request_seq += 1;
        state.phase = Phase::Loading;
        state.error_message = None;
        (state.request_seq, query)
    }

    async fn fetch(&self, seq: u64, query: MultiCurrencyQuery) {
        debug!(
            seq,
            sort_by = %query.sort.column,
            direction = query.sort.direction.as_str(),
            page = query.cursor.index,
            size = query.cursor.size,
            "fetching multi-currency page"
        );
        let result = self.api.multi_currency_products(&query).await;

        self.state.send_if_modified(|state| {
            if state.request_seq != seq {
                debug!(seq, current = state.request_seq, "discarding superseded multi-currency response");
                return false;
            }
            match result {
                Ok(products) => {
                    state.products = products;
                    state.phase = Phase::Ready;
                }
                Err(err) => {
                    warn!(seq, error = %err, "multi-currency fetch failed");
                    state.phase = Phase::Failed;
                    state.error_message = Some(MULTI_CURRENCY_FAILED_MESSAGE.to_string());
                }
            }
            true
        });
    }
}

#[cfg(test)]
#[path = "tests/multi_currency_tests.rs"]
mod tests;
