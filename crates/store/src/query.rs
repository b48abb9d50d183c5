//! Query specifications handed to a [`RecordStore`](crate::RecordStore).
//!
//! Listing ads runs in exactly one of two modes: equality filtering or
//! multi-key sorting. [`FilterSpec`] makes that a tagged union so a store
//! can never be asked for both at once.

use serde::{Deserialize, Serialize};

use crate::models::{RepairStatus, UserId};

/// Columns of the `ads` table a store can sort by.
pub const AD_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "category_id",
    "price",
    "status",
    "fly_time",
    "airplane_model",
    "repair_check",
    "expert_check",
    "plane_age",
    "subject",
    "description",
    "image",
    "created_at",
];

pub fn is_ad_column(name: &str) -> bool {
    AD_COLUMNS.contains(&name)
}

/// Equality filters combined with AND. `None` means "do not filter on this
/// column"; all `None` lists every ad.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualityFilters {
    pub plane_age: Option<i32>,
    pub category_id: Option<i64>,
    pub price: Option<i64>,
}

impl EqualityFilters {
    pub fn is_empty(&self) -> bool {
        self.plane_age.is_none() && self.category_id.is_none() && self.price.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One `ORDER BY` term. `column` is whatever the caller asked for; the store
/// decides whether it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self { column: column.into(), direction }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "terms", rename_all = "snake_case")]
pub enum FilterSpec {
    Equality(EqualityFilters),
    /// Ordered sort keys; the first key is the primary ordering.
    Sorted(Vec<SortKey>),
}

impl FilterSpec {
    /// The "list everything" spec.
    pub fn all() -> Self {
        Self::Equality(EqualityFilters::default())
    }
}

/// Narrowing applied when listing repair requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairRequestFilter {
    pub status: Option<RepairStatus>,
    /// Only requests created by this user.
    pub requester_id: Option<UserId>,
    /// Only requests on ads owned by this user.
    pub ad_owner_id: Option<UserId>,
}
