//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models — they carry no domain behaviour. Each one
//! converts into its `store` counterpart, failing with [`DbError::Decode`] if
//! a stored enum value is unknown.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use store::{Ad, Category, RepairRequest, Role, User};

use crate::DbError;

/// Column list shared by every query returning an [`AdRow`].
pub const AD_SELECT: &str = "id, user_id, category_id, price, status, fly_time, airplane_model, \
     repair_check, expert_check, plane_age, subject, description, image, created_at";

/// Column list shared by every query returning a [`RepairRequestRow`].
pub const REPAIR_REQUEST_SELECT: &str = "id, ad_id, user_id, status, created_at";

// ---------------------------------------------------------------------------
// users / categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub role: i16,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;
    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User { id: row.id, role: Role::try_from(row.role).map_err(DbError::Decode)? })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category { id: row.id, name: row.name }
    }
}

// ---------------------------------------------------------------------------
// ads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct AdRow {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub price: i64,
    pub status: String,
    pub fly_time: i32,
    pub airplane_model: String,
    pub repair_check: bool,
    pub expert_check: bool,
    pub plane_age: i32,
    pub subject: String,
    pub description: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AdRow> for Ad {
    type Error = DbError;
    fn try_from(row: AdRow) -> Result<Self, Self::Error> {
        Ok(Ad {
            id: row.id,
            user_id: row.user_id,
            category_id: row.category_id,
            price: row.price,
            status: row.status.parse().map_err(DbError::Decode)?,
            fly_time: row.fly_time,
            airplane_model: row.airplane_model,
            repair_check: row.repair_check,
            expert_check: row.expert_check,
            plane_age: row.plane_age,
            subject: row.subject,
            description: row.description,
            image: row.image,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// repair_requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct RepairRequestRow {
    pub id: i64,
    pub ad_id: i64,
    pub user_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RepairRequestRow> for RepairRequest {
    type Error = DbError;
    fn try_from(row: RepairRequestRow) -> Result<Self, Self::Error> {
        Ok(RepairRequest {
            id: row.id,
            ad_id: row.ad_id,
            user_id: row.user_id,
            status: row.status.parse().map_err(DbError::Decode)?,
            created_at: row.created_at,
        })
    }
}
