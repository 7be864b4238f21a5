use serde::{Deserialize, Serialize};

/// Body of `POST /grouped-by-building`. Unset fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buildings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beds: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grades: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_pool: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Vec<String>>,
}

pub const DEFAULT_SORT_COLUMN: &str = "current_price";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// A sortable field name or a currency code.
    pub column: String,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            column: DEFAULT_SORT_COLUMN.to_string(),
            direction: SortDirection::Asc,
        }
    }
}

impl SortSpec {
    /// Same column flips direction; a new column starts ascending.
    pub fn toggled(&self, column: &str) -> Self {
        if self.column == column {
            Self {
                column: self.column.clone(),
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                column: column.to_string(),
                direction: SortDirection::Asc,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub index: u32,
    pub size: u32,
}

impl PageCursor {
    pub fn new(size: u32) -> Self {
        Self {
            index: 0,
            size: size.max(1),
        }
    }

    pub fn next(self) -> Self {
        Self {
            index: self.index.saturating_add(1),
            ..self
        }
    }

    pub fn previous(self) -> Self {
        Self {
            index: self.index.saturating_sub(1),
            ..self
        }
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// The `(sort, cursor)` pair a multi-currency page is fetched with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiCurrencyQuery {
    pub sort: SortSpec,
    pub cursor: PageCursor,
}

impl MultiCurrencyQuery {
    pub fn params(&self) -> MultiCurrencyParams<'_> {
        MultiCurrencyParams {
            sort_by: &self.sort.column,
            sort_direction: self.sort.direction,
            page: self.cursor.index,
            size: self.cursor.size,
        }
    }
}

/// Query string of `GET /multi-currency`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiCurrencyParams<'a> {
    pub sort_by: &'a str,
    pub sort_direction: SortDirection,
    pub page: u32,
    pub size: u32,
}
