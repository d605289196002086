//! Complaint CRUD endpoints.

use anyhow::{anyhow, Context as _};
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, put},
    Json, Router,
};
use chrono::Utc;
use metrics::counter;
use serde::Deserialize;

use crate::{
    db::Db,
    metrics::{COMPLAINTS_CREATED, COMPLAINTS_DELETED, COMPLAINTS_STATUS_UPDATED},
    models::Complaint,
    serve::{AppState, Result},
    Error,
};

#[derive(Deserialize, Debug, Clone)]
pub(super) struct ComplaintInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub plate: Option<String>,
    pub firm_name: Option<String>,
    pub municipality: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub user_identifier: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub(super) struct StatusUpdate {
    pub status: String,
}

#[derive(Deserialize, Debug, Clone)]
pub(super) struct ListParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Reject empty required text fields before touching the store.
fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(anyhow!("{name} must not be empty")));
    }
    Ok(())
}

async fn create_complaint(
    State(db): State<Db>,
    Json(input): Json<ComplaintInput>,
) -> Result<Json<Complaint>> {
    require("title", &input.title)?;
    require("description", &input.description)?;
    require("category", &input.category)?;

    let now = Utc::now();
    let complaint = sqlx::query_as::<_, Complaint>(
        r#"
        INSERT INTO complaints
            (title, description, category, status, location, image_url,
             plate, firm_name, municipality, lat, lng, user_identifier,
             upvotes, created_at)
        VALUES (?, ?, ?, 'Pending', ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
        RETURNING *
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.category)
    .bind(&input.location)
    .bind(&input.image_url)
    .bind(&input.plate)
    .bind(&input.firm_name)
    .bind(&input.municipality)
    .bind(input.lat)
    .bind(input.lng)
    .bind(&input.user_identifier)
    .bind(now)
    .fetch_one(&db)
    .await
    .context("failed to insert complaint")?;

    counter!(COMPLAINTS_CREATED).increment(1);

    Ok(Json(complaint))
}

async fn list_complaints(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Complaint>>> {
    // Out-of-range skip yields an empty list, never an error.
    let skip = params.skip.max(0);
    let limit = params.limit.clamp(0, 1000);

    let complaints = sqlx::query_as::<_, Complaint>(
        r#"
        SELECT * FROM complaints
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(skip)
    .fetch_all(&db)
    .await
    .context("failed to list complaints")?;

    Ok(Json(complaints))
}

async fn update_complaint_status(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<StatusUpdate>,
) -> Result<Json<Complaint>> {
    // Any status text is accepted; the catalog of statuses is a frontend
    // convention, not a constraint here.
    let complaint = sqlx::query_as::<_, Complaint>(
        r#"UPDATE complaints SET status = ? WHERE id = ? RETURNING *"#,
    )
    .bind(&input.status)
    .bind(id)
    .fetch_optional(&db)
    .await
    .context("failed to update complaint status")?
    .ok_or_else(|| Error::not_found(anyhow!("complaint {id} not found")))?;

    counter!(COMPLAINTS_STATUS_UPDATED).increment(1);

    Ok(Json(complaint))
}

async fn delete_complaint(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let result = sqlx::query(r#"DELETE FROM complaints WHERE id = ?"#)
        .bind(id)
        .execute(&db)
        .await
        .context("failed to delete complaint")?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found(anyhow!("complaint {id} not found")));
    }

    counter!(COMPLAINTS_DELETED).increment(1);

    Ok(Json(serde_json::json!({ "message": "Complaint deleted" })))
}

pub fn routes() -> Router<AppState> {
    // UP /complaints/
    // UG /complaints/?skip=&limit=
    // UP /complaints/{id}/status
    // UD /complaints/{id}
    Router::new()
        .route(
            "/complaints/",
            get(list_complaints).post(create_complaint),
        )
        .route("/complaints/{id}/status", put(update_complaint_status))
        .route("/complaints/{id}", delete(delete_complaint))
}
