//! Repair request repository functions.
//!
//! The `repair_requests_user_ad_key` unique constraint guarantees at most one
//! row per (user, ad); [`insert_if_absent`] leans on it instead of a separate
//! existence check.

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use store::{RepairRequestFilter, RepairStatus};

use crate::{
    DbError,
    models::{RepairRequestRow, REPAIR_REQUEST_SELECT},
};

/// Insert a request unless one already exists for (user, ad).
///
/// Returns `Ok(None)` when the pair already had a row; nothing is written in
/// that case.
pub async fn insert_if_absent(
    pool: &PgPool,
    ad_id: i64,
    user_id: i64,
    status: RepairStatus,
) -> Result<Option<RepairRequestRow>, DbError> {
    let sql = format!(
        r#"
        INSERT INTO repair_requests (ad_id, user_id, status, created_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT ON CONSTRAINT repair_requests_user_ad_key DO NOTHING
        RETURNING {REPAIR_REQUEST_SELECT}
        "#
    );

    let row = sqlx::query_as::<_, RepairRequestRow>(&sql)
        .bind(ad_id)
        .bind(user_id)
        .bind(status.to_string())
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Fetch the request a user made for an ad.
pub async fn get_for_user_and_ad(
    pool: &PgPool,
    user_id: i64,
    ad_id: i64,
) -> Result<RepairRequestRow, DbError> {
    let sql = format!(
        "SELECT {REPAIR_REQUEST_SELECT} FROM repair_requests WHERE user_id = $1 AND ad_id = $2"
    );
    sqlx::query_as::<_, RepairRequestRow>(&sql)
        .bind(user_id)
        .bind(ad_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("repair request for ad {ad_id}")))
}

/// Fetch a request by its primary key.
pub async fn get_repair_request(pool: &PgPool, id: i64) -> Result<RepairRequestRow, DbError> {
    let sql = format!("SELECT {REPAIR_REQUEST_SELECT} FROM repair_requests WHERE id = $1");
    sqlx::query_as::<_, RepairRequestRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("repair request {id}")))
}

/// The oldest request on an ad, optionally only if `owner` owns the ad.
pub async fn get_by_ad(
    pool: &PgPool,
    ad_id: i64,
    owner: Option<i64>,
) -> Result<RepairRequestRow, DbError> {
    sqlx::query_as::<_, RepairRequestRow>(
        r#"
        SELECT r.id, r.ad_id, r.user_id, r.status, r.created_at
        FROM repair_requests r
        JOIN ads a ON a.id = r.ad_id
        WHERE r.ad_id = $1
          AND ($2::BIGINT IS NULL OR a.user_id = $2)
        ORDER BY r.id
        LIMIT 1
        "#,
    )
    .bind(ad_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DbError::NotFound(format!("repair request for ad {ad_id}")))
}

/// Set the status of one request.
///
/// Returns `DbError::NotFound` if no row was updated.
pub async fn update_status(
    pool: &PgPool,
    id: i64,
    status: RepairStatus,
) -> Result<RepairRequestRow, DbError> {
    let sql = format!(
        "UPDATE repair_requests SET status = $1 WHERE id = $2 RETURNING {REPAIR_REQUEST_SELECT}"
    );
    sqlx::query_as::<_, RepairRequestRow>(&sql)
        .bind(status.to_string())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("repair request {id}")))
}

/// Delete the (user, ad) request if it is in `status`; returns rows removed.
pub async fn delete_in_status(
    pool: &PgPool,
    user_id: i64,
    ad_id: i64,
    status: RepairStatus,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        "DELETE FROM repair_requests WHERE user_id = $1 AND ad_id = $2 AND status = $3",
    )
    .bind(user_id)
    .bind(ad_id)
    .bind(status.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Requests matching `filter`, oldest first.
pub async fn list_repair_requests(
    pool: &PgPool,
    filter: &RepairRequestFilter,
) -> Result<Vec<RepairRequestRow>, DbError> {
    let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(
        "SELECT r.id, r.ad_id, r.user_id, r.status, r.created_at \
         FROM repair_requests r JOIN ads a ON a.id = r.ad_id WHERE TRUE",
    );

    if let Some(status) = filter.status {
        query.push(" AND r.status = ").push_bind(status.to_string());
    }
    if let Some(requester) = filter.requester_id {
        query.push(" AND r.user_id = ").push_bind(requester);
    }
    if let Some(owner) = filter.ad_owner_id {
        query.push(" AND a.user_id = ").push_bind(owner);
    }
    query.push(" ORDER BY r.id");

    let rows = query.build_query_as::<RepairRequestRow>().fetch_all(pool).await?;
    Ok(rows)
}
