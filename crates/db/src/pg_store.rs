//! [`RecordStore`] backed by Postgres.

use async_trait::async_trait;
use tracing::debug;

use store::{
    Ad, AdId, AdPatch, Category, EqualityFilters, InsertOutcome, NewAd, NewRepairRequest,
    RecordStore, RepairRequest, RepairRequestFilter, RepairRequestId, RepairStatus, SortKey,
    StoreError, User, UserId,
};

use crate::repository::{ads, repair_requests, users};
use crate::{DbError, DbPool};

/// Thin adapter from the repository functions to the `RecordStore` contract.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = DbError>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl RecordStore for PgStore {
    async fn find_user(&self, id: UserId) -> Result<User, StoreError> {
        Ok(User::try_from(users::get_user(&self.pool, id).await?)?)
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Category, StoreError> {
        Ok(users::get_category_by_name(&self.pool, name).await?.into())
    }

    async fn find_ad(&self, id: AdId) -> Result<Ad, StoreError> {
        Ok(Ad::try_from(ads::get_ad(&self.pool, id).await?)?)
    }

    async fn create_ad(&self, ad: NewAd) -> Result<Ad, StoreError> {
        Ok(Ad::try_from(ads::create_ad(&self.pool, &ad).await?)?)
    }

    async fn update_ad(&self, id: AdId, patch: &AdPatch) -> Result<Ad, StoreError> {
        Ok(Ad::try_from(ads::update_ad(&self.pool, id, patch).await?)?)
    }

    async fn find_ads_filtered(&self, filters: &EqualityFilters) -> Result<Vec<Ad>, StoreError> {
        decode_all(ads::list_ads_filtered(&self.pool, filters).await?)
    }

    async fn find_ads_sorted(&self, keys: &[SortKey]) -> Result<Vec<Ad>, StoreError> {
        decode_all(ads::list_ads_sorted(&self.pool, keys).await?)
    }

    async fn find_repair_request(
        &self,
        user_id: UserId,
        ad_id: AdId,
    ) -> Result<RepairRequest, StoreError> {
        let row = repair_requests::get_for_user_and_ad(&self.pool, user_id, ad_id).await?;
        Ok(RepairRequest::try_from(row)?)
    }

    async fn find_repair_request_by_id(
        &self,
        id: RepairRequestId,
    ) -> Result<RepairRequest, StoreError> {
        Ok(RepairRequest::try_from(repair_requests::get_repair_request(&self.pool, id).await?)?)
    }

    async fn find_repair_request_by_ad(
        &self,
        ad_id: AdId,
        owner: Option<UserId>,
    ) -> Result<RepairRequest, StoreError> {
        Ok(RepairRequest::try_from(repair_requests::get_by_ad(&self.pool, ad_id, owner).await?)?)
    }

    async fn insert_repair_request_if_absent(
        &self,
        new: NewRepairRequest,
    ) -> Result<InsertOutcome, StoreError> {
        let inserted =
            repair_requests::insert_if_absent(&self.pool, new.ad_id, new.user_id, new.status)
                .await?;

        if let Some(row) = inserted {
            return Ok(InsertOutcome::Created(RepairRequest::try_from(row)?));
        }

        debug!(ad_id = new.ad_id, user_id = new.user_id, "repair request already present");
        match repair_requests::get_for_user_and_ad(&self.pool, new.user_id, new.ad_id).await {
            Ok(row) => Ok(InsertOutcome::Existing(RepairRequest::try_from(row)?)),
            // The conflicting row was deleted between the insert and the read.
            Err(DbError::NotFound(_)) => Err(StoreError::Conflict(format!(
                "repair request for ad {} changed concurrently",
                new.ad_id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_repair_request_status(
        &self,
        id: RepairRequestId,
        status: RepairStatus,
    ) -> Result<RepairRequest, StoreError> {
        Ok(RepairRequest::try_from(repair_requests::update_status(&self.pool, id, status).await?)?)
    }

    async fn delete_repair_request(
        &self,
        user_id: UserId,
        ad_id: AdId,
        status: RepairStatus,
    ) -> Result<u64, StoreError> {
        Ok(repair_requests::delete_in_status(&self.pool, user_id, ad_id, status).await?)
    }

    async fn list_repair_requests(
        &self,
        filter: &RepairRequestFilter,
    ) -> Result<Vec<RepairRequest>, StoreError> {
        decode_all(repair_requests::list_repair_requests(&self.pool, filter).await?)
    }
}
