//! Pricing service client. Every call is a single request; retries are left to callers.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{BuildingGroup, MultiCurrencyProduct, Role, RoleOption},
    protocol::{FilterRequest, MultiCurrencyQuery},
};
use tracing::debug;

use crate::{
    config::{normalize_base_url, Settings},
    error::{ApiError, ApiResult},
};

const GROUPED_BY_BUILDING_PATH: &str = "/grouped-by-building";
const FILTERS_PATH: &str = "/filters";
const AVAILABLE_ROLES_PATH: &str = "/filters/available-roles";
const MULTI_CURRENCY_PATH: &str = "/multi-currency";

#[async_trait]
pub trait PricingApi: Send + Sync {
    async fn grouped_by_building(&self) -> ApiResult<Vec<BuildingGroup>>;
    async fn filtered_grouped_by_building(
        &self,
        request: &FilterRequest,
    ) -> ApiResult<Vec<BuildingGroup>>;
    async fn filters_for_role(&self, role: Role) -> ApiResult<Vec<String>>;
    async fn available_roles(&self) -> ApiResult<Vec<RoleOption>>;
    async fn multi_currency_products(
        &self,
        query: &MultiCurrencyQuery,
    ) -> ApiResult<Vec<MultiCurrencyProduct>>;
}

pub struct HttpPricingApi {
    http: Client,
    base_url: String,
}

impl HttpPricingApi {
    pub fn new(settings: &Settings) -> ApiResult<Self> {
        let base_url = normalize_base_url(&settings.api_base_url)?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|source| ApiError::Transport {
                path: base_url.clone(),
                source,
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn read_json<T: DeserializeOwned>(path: &str, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode {
            path: path.to_string(),
            message: err.to_string(),
        })
    }
}

#[async_trait]
impl PricingApi for HttpPricingApi {
    async fn grouped_by_building(&self) -> ApiResult<Vec<BuildingGroup>> {
        let request = self.http.get(self.url(GROUPED_BY_BUILDING_PATH));
        let groups = Self::read_json(GROUPED_BY_BUILDING_PATH, request).await?;
        normalize_groups(groups)
    }

    async fn filtered_grouped_by_building(
        &self,
        request: &FilterRequest,
    ) -> ApiResult<Vec<BuildingGroup>> {
        debug!(?request, "sending filter request");
        let request = self.http.post(self.url(GROUPED_BY_BUILDING_PATH)).json(request);
        let groups = Self::read_json(GROUPED_BY_BUILDING_PATH, request).await?;
        normalize_groups(groups)
    }

    async fn filters_for_role(&self, role: Role) -> ApiResult<Vec<String>> {
        let request = self
            .http
            .get(self.url(FILTERS_PATH))
            .query(&[("userRole", role.as_str())]);
        Self::read_json(FILTERS_PATH, request).await
    }

    async fn available_roles(&self) -> ApiResult<Vec<RoleOption>> {
        let request = self.http.get(self.url(AVAILABLE_ROLES_PATH));
        Self::read_json(AVAILABLE_ROLES_PATH, request).await
    }

    async fn multi_currency_products(
        &self,
        query: &MultiCurrencyQuery,
    ) -> ApiResult<Vec<MultiCurrencyProduct>> {
        let request = self
            .http
            .get(self.url(MULTI_CURRENCY_PATH))
            .query(&query.params());
        Self::read_json(MULTI_CURRENCY_PATH, request).await
    }
}

/// Products without a building inherit the group key; a conflicting one rejects the payload.
pub fn normalize_groups(mut groups: Vec<BuildingGroup>) -> ApiResult<Vec<BuildingGroup>> {
    for group in &mut groups {
        for product in &mut group.products {
            if product.building_name.is_empty() {
                product.building_name = group.building_name.clone();
            } else if product.building_name != group.building_name {
                return Err(ApiError::InconsistentPayload {
                    product_id: product.product_id.clone(),
                    expected: group.building_name.clone(),
                    found: product.building_name.clone(),
                });
            }
        }
    }
    Ok(groups)
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
