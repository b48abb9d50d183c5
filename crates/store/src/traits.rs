//! The `RecordStore` trait — the contract every storage backend must fulfil.

use async_trait::async_trait;

use crate::models::{
    Ad, AdId, AdPatch, Category, InsertOutcome, NewAd, NewRepairRequest, RepairRequest,
    RepairRequestId, RepairStatus, User, UserId,
};
use crate::query::{EqualityFilters, RepairRequestFilter, SortKey};
use crate::StoreError;

/// Persistence operations the engine relies on.
///
/// Every mutating method is a single atomic operation on the backend: when it
/// returns an error, nothing was written.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ------ users / categories ------

    async fn find_user(&self, id: UserId) -> Result<User, StoreError>;

    async fn find_category_by_name(&self, name: &str) -> Result<Category, StoreError>;

    // ------ ads ------

    async fn find_ad(&self, id: AdId) -> Result<Ad, StoreError>;

    async fn create_ad(&self, ad: NewAd) -> Result<Ad, StoreError>;

    async fn update_ad(&self, id: AdId, patch: &AdPatch) -> Result<Ad, StoreError>;

    /// Ads matching every set field of `filters`.
    async fn find_ads_filtered(&self, filters: &EqualityFilters) -> Result<Vec<Ad>, StoreError>;

    /// All ads ordered by `keys`.
    ///
    /// # Errors
    /// [`StoreError::UnknownColumn`] if a key names a column the ads table
    /// does not have.
    async fn find_ads_sorted(&self, keys: &[SortKey]) -> Result<Vec<Ad>, StoreError>;

    // ------ repair requests ------

    async fn find_repair_request(
        &self,
        user_id: UserId,
        ad_id: AdId,
    ) -> Result<RepairRequest, StoreError>;

    async fn find_repair_request_by_id(
        &self,
        id: RepairRequestId,
    ) -> Result<RepairRequest, StoreError>;

    /// First request on `ad_id`; when `owner` is set, only if the ad belongs
    /// to that user.
    async fn find_repair_request_by_ad(
        &self,
        ad_id: AdId,
        owner: Option<UserId>,
    ) -> Result<RepairRequest, StoreError>;

    /// Insert `request` unless one already exists for its (user, ad) pair.
    ///
    /// The existence check and the insert are one atomic step, so concurrent
    /// callers for the same pair can never both create a row.
    async fn insert_repair_request_if_absent(
        &self,
        request: NewRepairRequest,
    ) -> Result<InsertOutcome, StoreError>;

    async fn update_repair_request_status(
        &self,
        id: RepairRequestId,
        status: RepairStatus,
    ) -> Result<RepairRequest, StoreError>;

    /// Delete the request for (user, ad) if it is currently in `status`.
    /// Returns the number of rows removed.
    async fn delete_repair_request(
        &self,
        user_id: UserId,
        ad_id: AdId,
        status: RepairStatus,
    ) -> Result<u64, StoreError>;

    async fn list_repair_requests(
        &self,
        filter: &RepairRequestFilter,
    ) -> Result<Vec<RepairRequest>, StoreError>;
}
