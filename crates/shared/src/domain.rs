use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    PricingManager,
    RegionalManager,
    ReportingUser,
}

impl Role {
    pub const ALL: [Role; 3] = [
        Role::PricingManager,
        Role::RegionalManager,
        Role::ReportingUser,
    ];

    /// Wire name, as used in `?userRole=`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PricingManager => "pricing_manager",
            Role::RegionalManager => "regional_manager",
            Role::ReportingUser => "reporting_user",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::PricingManager => "Pricing Manager",
            Role::RegionalManager => "Regional Manager",
            Role::ReportingUser => "Reporting User",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::PricingManager => {
                "Manage room pricing recommendations with comprehensive filtering"
            }
            Role::RegionalManager => "Monitor regional performance and building metrics",
            Role::ReportingUser => "Access data for analysis and reporting",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s.trim())
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Entry of `GET /filters/available-roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleOption {
    pub role: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub room_name: String,
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub beds: u32,
    #[serde(default)]
    pub private_pool: Option<String>,
    pub current_price: f64,
    pub recommended_price: f64,
    pub currency: String,
    /// Grouped responses may omit this; it is filled from the enclosing group.
    #[serde(default)]
    pub building_name: String,
}

impl Product {
    /// Percentage change from current to recommended price.
    pub fn price_change_percent(&self) -> Option<f64> {
        if self.current_price == 0.0 {
            return None;
        }
        Some((self.recommended_price - self.current_price) / self.current_price * 100.0)
    }

    pub fn has_private_pool(&self) -> bool {
        self.private_pool.as_deref() == Some("Yes")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingGroup {
    pub building_name: String,
    pub products: Vec<Product>,
}

impl BuildingGroup {
    pub fn room_count(&self) -> usize {
        self.products.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiCurrencyProduct {
    pub product_id: String,
    pub room_name: String,
    pub building_name: String,
    /// Sparse: only the currencies this product is priced in.
    #[serde(default)]
    pub prices: BTreeMap<String, f64>,
}
