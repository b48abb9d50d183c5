//! Ad lookup, listing, creation and the admin edit path.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::{info, instrument};

use store::{Ad, AdId, AdPatch, AdStatus, FilterSpec, NewAd, RecordStore, Role, StoreError, User};

use crate::filter::build_filter;
use crate::EngineError;

/// Year of the first powered flight; no listed airplane can be older.
pub const FIRST_FLIGHT_YEAR: i32 = 1903;

/// Largest plane age accepted in `current_year`.
pub fn max_plane_age(current_year: i32) -> i32 {
    current_year - FIRST_FLIGHT_YEAR
}

/// Check `age` against the 1903 rule for `current_year`.
pub fn validate_plane_age(age: i32, current_year: i32) -> Result<(), EngineError> {
    if age < 0 {
        return Err(EngineError::Validation("plane age must not be negative".into()));
    }
    if age > max_plane_age(current_year) {
        return Err(EngineError::Validation(format!(
            "the year of the invention of the airplane was {FIRST_FLIGHT_YEAR}"
        )));
    }
    Ok(())
}

/// An airline's new listing, as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct AdDraft {
    /// Category name, resolved against the categories table.
    pub category: String,
    pub price: i64,
    pub fly_time: i32,
    #[serde(alias = "model")]
    pub airplane_model: String,
    #[serde(default)]
    pub repair_check: bool,
    #[serde(default)]
    pub expert_check: bool,
    #[serde(alias = "age")]
    pub plane_age: i32,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl AdDraft {
    /// Field-level checks that need no storage access.
    pub fn validate(&self, current_year: i32) -> Result<(), EngineError> {
        if self.price < 0 {
            return Err(EngineError::Validation("price must not be negative".into()));
        }
        if self.fly_time < 0 {
            return Err(EngineError::Validation("fly_time must not be negative".into()));
        }
        if self.airplane_model.trim().is_empty() {
            return Err(EngineError::Validation("airplane model must not be empty".into()));
        }
        validate_plane_age(self.plane_age, current_year)
    }
}

#[derive(Clone)]
pub struct AdService {
    store: Arc<dyn RecordStore>,
}

impl AdService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: AdId) -> Result<Ad, EngineError> {
        Ok(self.store.find_ad(id).await?)
    }

    /// List ads for the given query-string pairs.
    ///
    /// # Errors
    /// [`EngineError::Validation`] for malformed parameters or a sort column
    /// the store does not know.
    #[instrument(skip(self, params))]
    pub async fn list(&self, params: &[(String, String)]) -> Result<Vec<Ad>, EngineError> {
        let ads = match build_filter(params)? {
            FilterSpec::Equality(filters) => self.store.find_ads_filtered(&filters).await?,
            FilterSpec::Sorted(keys) => self.store.find_ads_sorted(&keys).await?,
        };
        Ok(ads)
    }

    /// Publish a new ad owned by `actor`.
    ///
    /// # Errors
    /// - [`EngineError::Authorization`] unless `actor` is an airline.
    /// - [`EngineError::Validation`] for bad fields or an unknown category.
    #[instrument(skip(self, actor, draft), fields(actor_id = actor.id))]
    pub async fn create(&self, actor: &User, draft: AdDraft) -> Result<Ad, EngineError> {
        match actor.role {
            Role::Airline => {}
            Role::Admin | Role::Expert | Role::Buyer => {
                return Err(EngineError::Authorization("only airlines can add an ad".into()))
            }
        }

        draft.validate(Utc::now().year())?;

        let category = match self.store.find_category_by_name(&draft.category).await {
            Ok(category) => category,
            Err(StoreError::NotFound(_)) => {
                return Err(EngineError::Validation(format!(
                    "invalid category name '{}'",
                    draft.category
                )))
            }
            Err(err) => return Err(err.into()),
        };

        let ad = self
            .store
            .create_ad(NewAd {
                user_id: actor.id,
                category_id: category.id,
                price: draft.price,
                status: AdStatus::Active,
                fly_time: draft.fly_time,
                airplane_model: draft.airplane_model,
                repair_check: draft.repair_check,
                expert_check: draft.expert_check,
                plane_age: draft.plane_age,
                subject: draft.subject,
                description: draft.description,
                image: draft.image,
            })
            .await?;

        info!(ad_id = ad.id, "ad created");
        Ok(ad)
    }

    /// Admin edit of an existing ad. This is also how the repair authority
    /// marks an ad as repaired (`repair_check = true`).
    #[instrument(skip(self, actor, patch), fields(actor_id = actor.id))]
    pub async fn update(&self, actor: &User, id: AdId, patch: AdPatch) -> Result<Ad, EngineError> {
        match actor.role {
            Role::Admin => {}
            Role::Airline | Role::Expert | Role::Buyer => {
                return Err(EngineError::Authorization("only admins can edit an ad".into()))
            }
        }

        if patch.is_empty() {
            return Err(EngineError::Validation("nothing to update".into()));
        }
        if patch.price.is_some_and(|p| p < 0) {
            return Err(EngineError::Validation("price must not be negative".into()));
        }
        if let Some(age) = patch.plane_age {
            validate_plane_age(age, Utc::now().year())?;
        }

        let ad = self.store.update_ad(id, &patch).await?;
        info!(ad_id = ad.id, "ad updated");
        Ok(ad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> AdDraft {
        AdDraft {
            category: "small-passenger".into(),
            price: 500_000,
            fly_time: 1000,
            airplane_model: "XYZ123".into(),
            repair_check: false,
            expert_check: false,
            plane_age: 7,
            subject: "Example Ad 1".into(),
            description: "This is example ad 1.".into(),
            image: "example1.jpg".into(),
        }
    }

    #[test]
    fn plane_age_bound_follows_the_calendar() {
        assert_eq!(max_plane_age(2024), 121);
        assert!(validate_plane_age(121, 2024).is_ok());
        assert!(validate_plane_age(122, 2024).is_err());
        assert!(validate_plane_age(0, 2024).is_ok());
        assert!(validate_plane_age(-1, 2024).is_err());
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate(2024).is_ok());
    }

    #[test]
    fn draft_older_than_first_flight_is_rejected() {
        let err = AdDraft { plane_age: 500, ..draft() }.validate(2024).unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("the year of the invention of the airplane was 1903".into())
        );
    }

    #[test]
    fn free_listing_is_allowed_but_negative_price_is_not() {
        assert!(AdDraft { price: 0, ..draft() }.validate(2024).is_ok());

        let err = AdDraft { price: -1, ..draft() }.validate(2024).unwrap_err();
        assert_eq!(err, EngineError::Validation("price must not be negative".into()));
    }

    #[test]
    fn draft_without_model_is_rejected() {
        let err = AdDraft { airplane_model: "  ".into(), ..draft() }.validate(2024).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn draft_accepts_short_field_names() {
        let draft: AdDraft = serde_json::from_value(serde_json::json!({
            "category": "small-passenger",
            "price": 500000,
            "fly_time": 1000,
            "model": "XYZ123",
            "age": 7,
            "repair_check": true
        }))
        .unwrap();
        assert_eq!(draft.airplane_model, "XYZ123");
        assert_eq!(draft.plane_age, 7);
        assert!(draft.repair_check);
        assert!(!draft.expert_check);
    }
}
