//! In-memory pricing service used by controller tests.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use shared::{
    domain::{BuildingGroup, MultiCurrencyProduct, Product, Role, RoleOption},
    protocol::{FilterRequest, MultiCurrencyQuery},
};
use tokio::sync::oneshot;

use crate::{
    api::PricingApi,
    error::{ApiError, ApiResult},
};

#[derive(Default)]
pub struct FakeApi {
    pub role_filters: HashMap<Role, Vec<String>>,
    pub groups: Vec<BuildingGroup>,
    pub filtered_groups: Vec<BuildingGroup>,
    pub page_len: usize,
    pub fail_filters: Mutex<bool>,
    pub fail_products: Mutex<bool>,
    pub fail_multi_currency: Mutex<bool>,
    /// Fails only `POST /grouped-by-building`.
    pub fail_filtered: Mutex<bool>,
    /// Page indexes whose multi-currency fetch fails.
    pub failing_pages: Mutex<Vec<u32>>,
    pub role_requests: Mutex<Vec<Role>>,
    pub unfiltered_calls: Mutex<usize>,
    pub filter_requests: Mutex<Vec<FilterRequest>>,
    pub multi_currency_queries: Mutex<Vec<MultiCurrencyQuery>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl FakeApi {
    pub fn dashboard() -> Self {
        let mut role_filters = HashMap::new();
        role_filters.insert(
            Role::PricingManager,
            vec!["building".to_string(), "beds".to_string()],
        );
        role_filters.insert(
            Role::RegionalManager,
            vec!["building".to_string(), "room_type".to_string()],
        );

        Self {
            role_filters,
            groups: vec![
                group("Tower A", &[("a-1", 2), ("a-2", 3)]),
                group("Tower B", &[("b-1", 1)]),
            ],
            filtered_groups: vec![group("Tower A", &[("a-2", 3)])],
            page_len: 20,
            ..Self::default()
        }
    }

    /// Holds each filtered or multi-currency response until its sender fires, in call order.
    pub fn with_gates(mut self, count: usize) -> (Self, Vec<oneshot::Sender<()>>) {
        let mut senders = Vec::with_capacity(count);
        let gates = self.gates.get_mut().expect("gates lock");
        for _ in 0..count {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            gates.push_back(rx);
        }
        (self, senders)
    }

    pub fn set_fail_filters(&self, fail: bool) {
        *self.fail_filters.lock().expect("lock") = fail;
    }

    pub fn set_fail_products(&self, fail: bool) {
        *self.fail_products.lock().expect("lock") = fail;
    }

    pub fn set_fail_multi_currency(&self, fail: bool) {
        *self.fail_multi_currency.lock().expect("lock") = fail;
    }

    pub fn set_fail_filtered(&self, fail: bool) {
        *self.fail_filtered.lock().expect("lock") = fail;
    }

    pub fn fail_page(&self, index: u32) {
        self.failing_pages.lock().expect("lock").push(index);
    }

    async fn wait_gate(&self) {
        let gate = self.gates.lock().expect("gates lock").pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

fn unavailable(path: &str) -> ApiError {
    ApiError::Status {
        path: path.to_string(),
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[async_trait]
impl PricingApi for FakeApi {
    async fn grouped_by_building(&self) -> ApiResult<Vec<BuildingGroup>> {
        *self.unfiltered_calls.lock().expect("lock") += 1;
        if *self.fail_products.lock().expect("lock") {
            return Err(unavailable("/grouped-by-building"));
        }
        Ok(self.groups.clone())
    }

    async fn filtered_grouped_by_building(
        &self,
        request: &FilterRequest,
    ) -> ApiResult<Vec<BuildingGroup>> {
        self.filter_requests
            .lock()
            .expect("lock")
            .push(request.clone());
        self.wait_gate().await;
        if *self.fail_products.lock().expect("lock") || *self.fail_filtered.lock().expect("lock")
        {
            return Err(unavailable("/grouped-by-building"));
        }
        Ok(self.filtered_groups.clone())
    }

    async fn filters_for_role(&self, role: Role) -> ApiResult<Vec<String>> {
        self.role_requests.lock().expect("lock").push(role);
        if *self.fail_filters.lock().expect("lock") {
            return Err(unavailable("/filters"));
        }
        Ok(self.role_filters.get(&role).cloned().unwrap_or_default())
    }

    async fn available_roles(&self) -> ApiResult<Vec<RoleOption>> {
        Ok(Role::ALL
            .iter()
            .map(|role| RoleOption {
                role: role.as_str().to_string(),
                display_name: role.display_name().to_string(),
            })
            .collect())
    }

    async fn multi_currency_products(
        &self,
        query: &MultiCurrencyQuery,
    ) -> ApiResult<Vec<MultiCurrencyProduct>> {
        self.multi_currency_queries
            .lock()
            .expect("lock")
            .push(query.clone());
        self.wait_gate().await;
        let page_fails = self
            .failing_pages
            .lock()
            .expect("lock")
            .contains(&query.cursor.index);
        if page_fails || *self.fail_multi_currency.lock().expect("lock") {
            return Err(unavailable("/multi-currency"));
        }
        Ok(page(query.cursor.index, self.page_len))
    }
}

pub fn product(id: &str, building: &str, beds: u32) -> Product {
    Product {
        product_id: id.to_string(),
        room_name: format!("Room {id}"),
        room_type: "double".to_string(),
        beds,
        private_pool: None,
        current_price: 100.0,
        recommended_price: 110.0,
        currency: "EUR".to_string(),
        building_name: building.to_string(),
    }
}

pub fn group(building: &str, products: &[(&str, u32)]) -> BuildingGroup {
    BuildingGroup {
        building_name: building.to_string(),
        products: products
            .iter()
            .map(|(id, beds)| product(id, building, *beds))
            .collect(),
    }
}

/// Products are tagged `page-{index}-item-{n}` so tests can tell pages apart.
pub fn page(index: u32, len: usize) -> Vec<MultiCurrencyProduct> {
    (0..len)
        .map(|n| MultiCurrencyProduct {
            product_id: format!("page-{index}-item-{n}"),
            room_name: format!("Room {n}"),
            building_name: "Tower A".to_string(),
            prices: BTreeMap::from([("USD".to_string(), 100.0 + n as f64)]),
        })
        .collect()
}
