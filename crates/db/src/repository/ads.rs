//! Ad CRUD operations and the two listing queries.

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use store::query::is_ad_column;
use store::{AdPatch, EqualityFilters, NewAd, SortKey};

use crate::{
    DbError,
    models::{AdRow, AD_SELECT},
};

/// Insert a new ad and return the stored row.
pub async fn create_ad(pool: &PgPool, ad: &NewAd) -> Result<AdRow, DbError> {
    let sql = format!(
        r#"
        INSERT INTO ads
            (user_id, category_id, price, status, fly_time, airplane_model,
             repair_check, expert_check, plane_age, subject, description, image, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {AD_SELECT}
        "#
    );

    let row = sqlx::query_as::<_, AdRow>(&sql)
        .bind(ad.user_id)
        .bind(ad.category_id)
        .bind(ad.price)
        .bind(ad.status.to_string())
        .bind(ad.fly_time)
        .bind(&ad.airplane_model)
        .bind(ad.repair_check)
        .bind(ad.expert_check)
        .bind(ad.plane_age)
        .bind(&ad.subject)
        .bind(&ad.description)
        .bind(&ad.image)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Fetch a single ad by its primary key.
pub async fn get_ad(pool: &PgPool, id: i64) -> Result<AdRow, DbError> {
    let sql = format!("SELECT {AD_SELECT} FROM ads WHERE id = $1");
    sqlx::query_as::<_, AdRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("ad {id}")))
}

/// Apply the set fields of `patch` to one ad.
///
/// Returns `DbError::NotFound` if no row was updated.
pub async fn update_ad(pool: &PgPool, id: i64, patch: &AdPatch) -> Result<AdRow, DbError> {
    let sql = format!(
        r#"
        UPDATE ads
        SET price        = COALESCE($1, price),
            status       = COALESCE($2, status),
            repair_check = COALESCE($3, repair_check),
            expert_check = COALESCE($4, expert_check),
            plane_age    = COALESCE($5, plane_age)
        WHERE id = $6
        RETURNING {AD_SELECT}
        "#
    );

    sqlx::query_as::<_, AdRow>(&sql)
        .bind(patch.price)
        .bind(patch.status.map(|s| s.to_string()))
        .bind(patch.repair_check)
        .bind(patch.expert_check)
        .bind(patch.plane_age)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("ad {id}")))
}

/// Ads matching every set equality filter, in id order.
pub async fn list_ads_filtered(
    pool: &PgPool,
    filters: &EqualityFilters,
) -> Result<Vec<AdRow>, DbError> {
    let mut query: QueryBuilder<'_, Postgres> =
        QueryBuilder::new(format!("SELECT {AD_SELECT} FROM ads"));

    let mut separator = " WHERE ";
    if let Some(plane_age) = filters.plane_age {
        query.push(separator).push("plane_age = ").push_bind(plane_age);
        separator = " AND ";
    }
    if let Some(category_id) = filters.category_id {
        query.push(separator).push("category_id = ").push_bind(category_id);
        separator = " AND ";
    }
    if let Some(price) = filters.price {
        query.push(separator).push("price = ").push_bind(price);
    }
    query.push(" ORDER BY id");

    let rows = query.build_query_as::<AdRow>().fetch_all(pool).await?;
    Ok(rows)
}

/// All ads ordered by `keys`.
///
/// Column names cannot be bound as parameters, so each one is checked
/// against the ads table's columns before it is spliced into the SQL.
pub async fn list_ads_sorted(pool: &PgPool, keys: &[SortKey]) -> Result<Vec<AdRow>, DbError> {
    if let Some(bad) = keys.iter().find(|k| !is_ad_column(&k.column)) {
        return Err(DbError::UnknownColumn(bad.column.clone()));
    }

    let mut query: QueryBuilder<'_, Postgres> =
        QueryBuilder::new(format!("SELECT {AD_SELECT} FROM ads"));

    if !keys.is_empty() {
        query.push(" ORDER BY ");
        let mut terms = query.separated(", ");
        for key in keys {
            terms.push(format!("{} {}", key.column, key.direction.as_sql()));
        }
    }

    let rows = query.build_query_as::<AdRow>().fetch_all(pool).await?;
    Ok(rows)
}
