//! Repair-request workflow.
//!
//! An ad moves through:
//!
//! ```text
//! (no request) ──request_repair──▶ WaitForPayment ──advance_status──▶ MatinPending ─▶ …
//!                                   │
//!                                   └──cancel_request──▶ (deleted)
//! ```
//!
//! "Repaired" is recorded on the ad (`repair_check`) by the admin ad-update
//! path, never by this workflow. Every operation performs at most one write
//! through the [`RecordStore`].

use std::sync::Arc;

use tracing::{info, instrument, warn};

use store::{
    AdId, InsertOutcome, NewRepairRequest, RecordStore, RepairRequest, RepairRequestFilter,
    RepairRequestId, RepairStatus, Role, StoreError, User, UserId,
};

use crate::EngineError;

/// What a successful [`RepairWorkflow::request_repair`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// A new request was stored in `WaitForPayment`.
    Created(RepairRequest),
    /// The pair already had a request awaiting the repair authority; nothing
    /// was written.
    AlreadyPending(RepairRequest),
}

impl RepairOutcome {
    pub fn request(&self) -> &RepairRequest {
        match self {
            Self::Created(r) | Self::AlreadyPending(r) => r,
        }
    }
}

/// Gatekeeper for every repair-request lifecycle operation.
#[derive(Clone)]
pub struct RepairWorkflow {
    store: Arc<dyn RecordStore>,
}

impl RepairWorkflow {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Ask the repair authority to check `ad_id` on behalf of `user_id`.
    ///
    /// # Errors
    /// - [`EngineError::NotFound`] if the user or ad does not exist.
    /// - [`EngineError::Conflict`] if the ad is already repaired, or the user
    ///   already has a request for it that is not awaiting the authority.
    #[instrument(skip(self))]
    pub async fn request_repair(
        &self,
        ad_id: AdId,
        user_id: UserId,
    ) -> Result<RepairOutcome, EngineError> {
        let user = self.store.find_user(user_id).await?;
        let ad = self.store.find_ad(ad_id).await?;

        if ad.repair_check {
            warn!(ad_id, "repair requested for an ad that is already repaired");
            return Err(EngineError::Conflict(format!(
                "ad {ad_id} has already been repaired by Matin"
            )));
        }

        let new = NewRepairRequest {
            ad_id: ad.id,
            user_id: user.id,
            status: RepairStatus::WaitForPayment,
        };

        match self.store.insert_repair_request_if_absent(new).await {
            Ok(InsertOutcome::Created(request)) => {
                info!(request_id = request.id, "repair request created");
                Ok(RepairOutcome::Created(request))
            }
            Ok(InsertOutcome::Existing(request)) if request.status == RepairStatus::MatinPending => {
                info!(request_id = request.id, "repair request already pending, nothing to do");
                Ok(RepairOutcome::AlreadyPending(request))
            }
            Ok(InsertOutcome::Existing(request)) => {
                warn!(request_id = request.id, status = %request.status, "duplicate repair request");
                Err(already_requested(ad_id))
            }
            // A concurrent insert for the same pair lost the race at the
            // unique index.
            Err(StoreError::Conflict(_)) => Err(already_requested(ad_id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Move a request to `new_status`. Only the repair authority may do this
    /// and no request can go back to `WaitForPayment`.
    ///
    /// # Errors
    /// - [`EngineError::Validation`] when `new_status` is `WaitForPayment`,
    ///   whoever the caller is.
    /// - [`EngineError::Authorization`] when `actor` is not an admin.
    /// - [`EngineError::NotFound`] if the request does not exist.
    #[instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn advance_status(
        &self,
        request_id: RepairRequestId,
        actor: &User,
        new_status: RepairStatus,
    ) -> Result<RepairRequest, EngineError> {
        if new_status == RepairStatus::WaitForPayment {
            warn!("rejected regression to wait_for_payment");
            return Err(EngineError::Validation(
                "a repair request cannot return to wait_for_payment".into(),
            ));
        }

        match actor.role {
            Role::Admin => {}
            Role::Expert | Role::Buyer | Role::Airline => {
                warn!(role = ?actor.role, "non-admin tried to advance a repair request");
                return Err(EngineError::Authorization(
                    "only the repair authority may change a repair request".into(),
                ));
            }
        }

        let current = self.store.find_repair_request_by_id(request_id).await?;
        let updated = self.store.update_repair_request_status(request_id, new_status).await?;
        info!(from = %current.status, to = %updated.status, "repair request advanced");
        Ok(updated)
    }

    /// Withdraw the actor's own request for `ad_id` while it still awaits
    /// payment.
    ///
    /// # Errors
    /// - [`EngineError::Validation`] if the request has already moved past
    ///   `WaitForPayment`.
    /// - [`EngineError::NotFound`] if the actor has no request for the ad.
    #[instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn cancel_request(&self, ad_id: AdId, actor: &User) -> Result<(), EngineError> {
        let removed = self
            .store
            .delete_repair_request(actor.id, ad_id, RepairStatus::WaitForPayment)
            .await?;

        if removed > 0 {
            info!("repair request cancelled");
            return Ok(());
        }

        // Nothing matched the delete; tell the caller why.
        match self.store.find_repair_request(actor.id, ad_id).await {
            Ok(existing) => {
                warn!(status = %existing.status, "cannot cancel a request past wait_for_payment");
                Err(EngineError::Validation(format!(
                    "repair request is {} and can no longer be cancelled",
                    existing.status
                )))
            }
            Err(StoreError::NotFound(_)) => {
                Err(EngineError::NotFound(format!("repair request for ad {ad_id}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The repair request on `ad_id`. Airlines can only see requests on ads
    /// they own.
    #[instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn lookup_by_ad(
        &self,
        ad_id: AdId,
        actor: &User,
    ) -> Result<RepairRequest, EngineError> {
        let owner = match actor.role {
            Role::Airline => Some(actor.id),
            Role::Admin | Role::Expert | Role::Buyer => None,
        };
        Ok(self.store.find_repair_request_by_ad(ad_id, owner).await?)
    }

    /// Repair requests visible to `actor`, optionally narrowed to one status.
    ///
    /// Admins see everything, airlines see requests on their own ads, anyone
    /// else sees the requests they created.
    #[instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn list_requests(
        &self,
        actor: &User,
        status: Option<RepairStatus>,
    ) -> Result<Vec<RepairRequest>, EngineError> {
        let mut filter = RepairRequestFilter { status, ..RepairRequestFilter::default() };
        match actor.role {
            Role::Admin => {}
            Role::Airline => filter.ad_owner_id = Some(actor.id),
            Role::Expert | Role::Buyer => filter.requester_id = Some(actor.id),
        }
        Ok(self.store.list_repair_requests(&filter).await?)
    }
}

fn already_requested(ad_id: AdId) -> EngineError {
    EngineError::Conflict(format!("a repair request for ad {ad_id} already exists"))
}
