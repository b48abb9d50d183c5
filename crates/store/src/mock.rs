//! `InMemoryStore` — a test double for `RecordStore`.
//!
//! Useful in unit and integration tests where a real database is either
//! unavailable or irrelevant. Every operation holds a single lock for its
//! whole duration, which gives the same atomicity the Postgres store gets
//! from its unique index.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    Ad, AdId, AdPatch, Category, CategoryId, InsertOutcome, NewAd, NewRepairRequest,
    RepairRequest, RepairRequestId, RepairStatus, User, UserId,
};
use crate::query::{is_ad_column, EqualityFilters, RepairRequestFilter, SortDirection, SortKey};
use crate::{RecordStore, StoreError};

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, User>,
    categories: BTreeMap<CategoryId, Category>,
    ads: BTreeMap<AdId, Ad>,
    repair_requests: BTreeMap<RepairRequestId, RepairRequest>,
    next_ad_id: AdId,
    next_request_id: RepairRequestId,
    /// When set, every call fails with `StoreError::Backend`.
    unavailable: bool,
    /// Number of successful writes (create / update / delete).
    mutations: usize,
}

/// A store that keeps everything in ordered maps behind one mutex.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn available(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        let state = self.state();
        if state.unavailable {
            return Err(StoreError::Backend("store unavailable".into()));
        }
        Ok(state)
    }

    // ------ seeding helpers ------

    pub fn add_user(&self, user: User) {
        self.state().users.insert(user.id, user);
    }

    pub fn add_category(&self, category: Category) {
        self.state().categories.insert(category.id, category);
    }

    /// Insert an ad with a caller-chosen id.
    pub fn add_ad(&self, ad: Ad) {
        let mut state = self.state();
        state.next_ad_id = state.next_ad_id.max(ad.id);
        state.ads.insert(ad.id, ad);
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    // ------ inspection helpers ------

    pub fn repair_requests(&self) -> Vec<RepairRequest> {
        self.state().repair_requests.values().cloned().collect()
    }

    pub fn ad(&self, id: AdId) -> Option<Ad> {
        self.state().ads.get(&id).cloned()
    }

    /// Number of writes that have gone through.
    pub fn mutation_count(&self) -> usize {
        self.state().mutations
    }
}

/// Typed view of one ad column, used for in-memory ordering.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum ColumnValue<'a> {
    Int(i64),
    Bool(bool),
    Text(&'a str),
    Time(DateTime<Utc>),
}

/// `None` for names outside the ads table.
fn column_value<'a>(ad: &'a Ad, column: &str) -> Option<ColumnValue<'a>> {
    let value = match column {
        "id" => ColumnValue::Int(ad.id),
        "user_id" => ColumnValue::Int(ad.user_id),
        "category_id" => ColumnValue::Int(ad.category_id),
        "price" => ColumnValue::Int(ad.price),
        "fly_time" => ColumnValue::Int(i64::from(ad.fly_time)),
        "plane_age" => ColumnValue::Int(i64::from(ad.plane_age)),
        "repair_check" => ColumnValue::Bool(ad.repair_check),
        "expert_check" => ColumnValue::Bool(ad.expert_check),
        "status" => ColumnValue::Text(match ad.status {
            crate::AdStatus::Active => "active",
            crate::AdStatus::Inactive => "inactive",
        }),
        "airplane_model" => ColumnValue::Text(&ad.airplane_model),
        "subject" => ColumnValue::Text(&ad.subject),
        "description" => ColumnValue::Text(&ad.description),
        "image" => ColumnValue::Text(&ad.image),
        "created_at" => ColumnValue::Time(ad.created_at),
        _ => return None,
    };
    Some(value)
}

fn matches_filters(ad: &Ad, filters: &EqualityFilters) -> bool {
    filters.plane_age.map_or(true, |v| ad.plane_age == v)
        && filters.category_id.map_or(true, |v| ad.category_id == v)
        && filters.price.map_or(true, |v| ad.price == v)
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn find_user(&self, id: UserId) -> Result<User, StoreError> {
        self.available()?
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Category, StoreError> {
        self.available()?
            .categories
            .values()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("category '{name}'")))
    }

    async fn find_ad(&self, id: AdId) -> Result<Ad, StoreError> {
        self.available()?
            .ads
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("ad {id}")))
    }

    async fn create_ad(&self, new: NewAd) -> Result<Ad, StoreError> {
        let mut state = self.available()?;
        state.next_ad_id += 1;
        let ad = Ad {
            id: state.next_ad_id,
            user_id: new.user_id,
            category_id: new.category_id,
            price: new.price,
            status: new.status,
            fly_time: new.fly_time,
            airplane_model: new.airplane_model,
            repair_check: new.repair_check,
            expert_check: new.expert_check,
            plane_age: new.plane_age,
            subject: new.subject,
            description: new.description,
            image: new.image,
            created_at: Utc::now(),
        };
        state.ads.insert(ad.id, ad.clone());
        state.mutations += 1;
        Ok(ad)
    }

    async fn update_ad(&self, id: AdId, patch: &AdPatch) -> Result<Ad, StoreError> {
        let mut state = self.available()?;
        let ad = state
            .ads
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("ad {id}")))?;
        patch.apply(ad);
        let updated = ad.clone();
        state.mutations += 1;
        Ok(updated)
    }

    async fn find_ads_filtered(&self, filters: &EqualityFilters) -> Result<Vec<Ad>, StoreError> {
        Ok(self
            .available()?
            .ads
            .values()
            .filter(|ad| matches_filters(ad, filters))
            .cloned()
            .collect())
    }

    async fn find_ads_sorted(&self, keys: &[SortKey]) -> Result<Vec<Ad>, StoreError> {
        if let Some(bad) = keys.iter().find(|k| !is_ad_column(&k.column)) {
            return Err(StoreError::UnknownColumn(bad.column.clone()));
        }

        let mut ads: Vec<Ad> = self.available()?.ads.values().cloned().collect();
        ads.sort_by(|a, b| {
            keys.iter()
                .map(|key| {
                    let ord = column_value(a, &key.column).cmp(&column_value(b, &key.column));
                    match key.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Ok(ads)
    }

    async fn find_repair_request(
        &self,
        user_id: UserId,
        ad_id: AdId,
    ) -> Result<RepairRequest, StoreError> {
        self.available()?
            .repair_requests
            .values()
            .find(|r| r.user_id == user_id && r.ad_id == ad_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("repair request for ad {ad_id}")))
    }

    async fn find_repair_request_by_id(
        &self,
        id: RepairRequestId,
    ) -> Result<RepairRequest, StoreError> {
        self.available()?
            .repair_requests
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("repair request {id}")))
    }

    async fn find_repair_request_by_ad(
        &self,
        ad_id: AdId,
        owner: Option<UserId>,
    ) -> Result<RepairRequest, StoreError> {
        let state = self.available()?;
        let owned = |ad_id: AdId| match owner {
            None => true,
            Some(owner) => state.ads.get(&ad_id).is_some_and(|ad| ad.user_id == owner),
        };
        state
            .repair_requests
            .values()
            .find(|r| r.ad_id == ad_id && owned(r.ad_id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("repair request for ad {ad_id}")))
    }

    async fn insert_repair_request_if_absent(
        &self,
        new: NewRepairRequest,
    ) -> Result<InsertOutcome, StoreError> {
        let mut state = self.available()?;
        if let Some(existing) = state
            .repair_requests
            .values()
            .find(|r| r.user_id == new.user_id && r.ad_id == new.ad_id)
        {
            return Ok(InsertOutcome::Existing(existing.clone()));
        }

        state.next_request_id += 1;
        let request = RepairRequest {
            id: state.next_request_id,
            ad_id: new.ad_id,
            user_id: new.user_id,
            status: new.status,
            created_at: Utc::now(),
        };
        state.repair_requests.insert(request.id, request.clone());
        state.mutations += 1;
        Ok(InsertOutcome::Created(request))
    }

    async fn update_repair_request_status(
        &self,
        id: RepairRequestId,
        status: RepairStatus,
    ) -> Result<RepairRequest, StoreError> {
        let mut state = self.available()?;
        let request = state
            .repair_requests
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("repair request {id}")))?;
        request.status = status;
        let updated = request.clone();
        state.mutations += 1;
        Ok(updated)
    }

    async fn delete_repair_request(
        &self,
        user_id: UserId,
        ad_id: AdId,
        status: RepairStatus,
    ) -> Result<u64, StoreError> {
        let mut state = self.available()?;
        let before = state.repair_requests.len();
        state
            .repair_requests
            .retain(|_, r| !(r.user_id == user_id && r.ad_id == ad_id && r.status == status));
        let removed = (before - state.repair_requests.len()) as u64;
        if removed > 0 {
            state.mutations += 1;
        }
        Ok(removed)
    }

    async fn list_repair_requests(
        &self,
        filter: &RepairRequestFilter,
    ) -> Result<Vec<RepairRequest>, StoreError> {
        let state = self.available()?;
        Ok(state
            .repair_requests
            .values()
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| filter.requester_id.map_or(true, |u| r.user_id == u))
            .filter(|r| {
                filter.ad_owner_id.map_or(true, |owner| {
                    state.ads.get(&r.ad_id).is_some_and(|ad| ad.user_id == owner)
                })
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdStatus, Role};

    fn ad(id: AdId, owner: UserId, price: i64, category_id: CategoryId) -> Ad {
        Ad {
            id,
            user_id: owner,
            category_id,
            price,
            status: AdStatus::Active,
            fly_time: 1000,
            airplane_model: "A320".into(),
            repair_check: false,
            expert_check: false,
            plane_age: 7,
            subject: format!("ad {id}"),
            description: String::new(),
            image: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn conditional_insert_only_creates_once() {
        let store = InMemoryStore::new();
        let new = NewRepairRequest { ad_id: 1, user_id: 2, status: RepairStatus::WaitForPayment };

        let first = store.insert_repair_request_if_absent(new.clone()).await.unwrap();
        let second = store.insert_repair_request_if_absent(new).await.unwrap();

        assert!(matches!(first, InsertOutcome::Created(_)));
        assert!(matches!(second, InsertOutcome::Existing(_)));
        assert_eq!(store.repair_requests().len(), 1);
        assert_eq!(store.mutation_count(), 1);
    }

    #[tokio::test]
    async fn sorted_listing_orders_by_every_key() {
        let store = InMemoryStore::new();
        store.add_ad(ad(1, 10, 500, 2));
        store.add_ad(ad(2, 10, 900, 1));
        store.add_ad(ad(3, 10, 500, 1));

        let keys = [
            SortKey::new("price", SortDirection::Asc),
            SortKey::new("category_id", SortDirection::Desc),
        ];
        let ids: Vec<AdId> = store
            .find_ads_sorted(&keys)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn sorted_listing_orders_by_creation_time() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        for (id, age_minutes) in [(1, 5), (2, 30), (3, 10)] {
            store.add_ad(Ad {
                created_at: now - chrono::Duration::minutes(age_minutes),
                ..ad(id, 10, 500, 1)
            });
        }

        let keys = [SortKey::new("created_at", SortDirection::Desc)];
        let ids: Vec<AdId> = store
            .find_ads_sorted(&keys)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn every_whitelisted_column_has_a_value() {
        let sample = ad(1, 10, 500, 1);
        for column in crate::query::AD_COLUMNS {
            assert!(column_value(&sample, column).is_some(), "{column} has no value");
        }
        assert!(column_value(&sample, "favourite_colour").is_none());
    }

    #[tokio::test]
    async fn sorting_by_unknown_column_fails() {
        let store = InMemoryStore::new();
        let keys = [SortKey::new("favourite_colour", SortDirection::Desc)];
        assert_eq!(
            store.find_ads_sorted(&keys).await,
            Err(StoreError::UnknownColumn("favourite_colour".into()))
        );
    }

    #[tokio::test]
    async fn owner_restricted_lookup_hides_foreign_ads() {
        let store = InMemoryStore::new();
        store.add_user(User { id: 10, role: Role::Airline });
        store.add_ad(ad(1, 10, 500, 1));
        let new = NewRepairRequest { ad_id: 1, user_id: 3, status: RepairStatus::WaitForPayment };
        store.insert_repair_request_if_absent(new).await.unwrap();

        assert!(store.find_repair_request_by_ad(1, Some(10)).await.is_ok());
        assert!(matches!(
            store.find_repair_request_by_ad(1, Some(11)).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.find_ad(1).await, Err(StoreError::Backend(_))));
    }
}
