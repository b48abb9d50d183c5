//! Marketplace records shared by the engine and every store backend.
//!
//! These are plain data: the rules about who may create or mutate them live
//! in the `engine` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type AdId = i64;
pub type UserId = i64;
pub type CategoryId = i64;
pub type RepairRequestId = i64;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A user's role. Stored as a small integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The Matin repair authority; the only role that may advance repair
    /// requests or edit ads after creation.
    Admin,
    Expert,
    Buyer,
    /// Airlines publish ads and request repair checks for them.
    Airline,
}

impl Role {
    /// The integer code persisted in the `users.role` column.
    pub fn code(self) -> i16 {
        match self {
            Self::Admin => 1,
            Self::Expert => 2,
            Self::Buyer => 3,
            Self::Airline => 4,
        }
    }
}

impl TryFrom<i16> for Role {
    type Error = String;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Admin),
            2 => Ok(Self::Expert),
            3 => Ok(Self::Buyer),
            4 => Ok(Self::Airline),
            other => Err(format!("unknown role code: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// User / Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Ad
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdStatus {
    Active,
    Inactive,
}

impl std::fmt::Display for AdStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for AdStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active"   => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other      => Err(format!("unknown ad status: {other}")),
        }
    }
}

/// An airplane listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,
    pub user_id: UserId,
    pub category_id: CategoryId,
    /// Price in the smallest currency unit.
    pub price: i64,
    pub status: AdStatus,
    pub fly_time: i32,
    pub airplane_model: String,
    /// Set once the repair authority has checked the airplane.
    pub repair_check: bool,
    pub expert_check: bool,
    pub plane_age: i32,
    pub subject: String,
    pub description: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

/// Column values for a new ad; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAd {
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub price: i64,
    pub status: AdStatus,
    pub fly_time: i32,
    pub airplane_model: String,
    pub repair_check: bool,
    pub expert_check: bool,
    pub plane_age: i32,
    pub subject: String,
    pub description: String,
    pub image: String,
}

/// Partial update applied by the admin ad-edit path. `None` leaves a column
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdPatch {
    pub price: Option<i64>,
    pub status: Option<AdStatus>,
    pub repair_check: Option<bool>,
    pub expert_check: Option<bool>,
    pub plane_age: Option<i32>,
}

impl AdPatch {
    pub fn is_empty(&self) -> bool {
        self.price.is_none()
            && self.status.is_none()
            && self.repair_check.is_none()
            && self.expert_check.is_none()
            && self.plane_age.is_none()
    }

    pub fn apply(&self, ad: &mut Ad) {
        if let Some(price) = self.price {
            ad.price = price;
        }
        if let Some(status) = self.status {
            ad.status = status;
        }
        if let Some(flag) = self.repair_check {
            ad.repair_check = flag;
        }
        if let Some(flag) = self.expert_check {
            ad.expert_check = flag;
        }
        if let Some(age) = self.plane_age {
            ad.plane_age = age;
        }
    }
}

// ---------------------------------------------------------------------------
// RepairRequest
// ---------------------------------------------------------------------------

/// Lifecycle of a repair request.
///
/// `WaitForPayment` is the initial state and can never be re-entered once
/// left. The ad being repaired is recorded on the ad itself (`repair_check`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    WaitForPayment,
    MatinPending,
    Repairing,
    Repaired,
}

impl std::fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitForPayment => write!(f, "wait_for_payment"),
            Self::MatinPending   => write!(f, "matin_pending"),
            Self::Repairing      => write!(f, "repairing"),
            Self::Repaired       => write!(f, "repaired"),
        }
    }
}

impl std::str::FromStr for RepairStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wait_for_payment" => Ok(Self::WaitForPayment),
            "matin_pending"    => Ok(Self::MatinPending),
            "repairing"        => Ok(Self::Repairing),
            "repaired"         => Ok(Self::Repaired),
            other              => Err(format!("unknown repair status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRequest {
    pub id: RepairRequestId,
    pub ad_id: AdId,
    pub user_id: UserId,
    pub status: RepairStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepairRequest {
    pub ad_id: AdId,
    pub user_id: UserId,
    pub status: RepairStatus,
}

/// Result of the atomic "insert unless one already exists for (user, ad)"
/// operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(RepairRequest),
    /// A request for the pair already existed; nothing was written.
    Existing(RepairRequest),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_codes_round_trip() {
        for role in [Role::Admin, Role::Expert, Role::Buyer, Role::Airline] {
            assert_eq!(Role::try_from(role.code()), Ok(role));
        }
        assert_eq!(Role::Admin.code(), 1);
        assert_eq!(Role::Airline.code(), 4);
    }

    #[test]
    fn unknown_role_code_is_rejected() {
        assert!(Role::try_from(0).is_err());
        assert!(Role::try_from(9).is_err());
    }

    #[test]
    fn repair_status_parses_its_display_form() {
        let status: RepairStatus = RepairStatus::MatinPending.to_string().parse().unwrap();
        assert_eq!(status, RepairStatus::MatinPending);
        assert!("matin".parse::<RepairStatus>().is_err());
    }

    #[test]
    fn repair_status_serializes_snake_case() {
        let json = serde_json::to_string(&RepairStatus::WaitForPayment).unwrap();
        assert_eq!(json, "\"wait_for_payment\"");
    }

    #[test]
    fn empty_patch_leaves_ad_untouched() {
        let patch = AdPatch::default();
        assert!(patch.is_empty());

        let patch = AdPatch { repair_check: Some(true), ..AdPatch::default() };
        assert!(!patch.is_empty());
    }
}
