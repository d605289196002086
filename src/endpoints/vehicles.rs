//! Vehicle catalog endpoints.

use anyhow::anyhow;
use anyhow::Context as _;
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use metrics::counter;
use serde::Deserialize;

use crate::{
    db::Db,
    metrics::{VEHICLES_CREATED, VEHICLES_DELETED},
    models::Vehicle,
    serve::{AppState, Result},
    Error,
};

#[derive(Deserialize, Debug, Clone)]
pub(super) struct VehicleInput {
    pub plate: String,
    pub serial_no: String,
}

async fn create_vehicle(
    State(db): State<Db>,
    Json(input): Json<VehicleInput>,
) -> Result<Json<Vehicle>> {
    if input.plate.trim().is_empty() {
        return Err(Error::validation(anyhow!("plate must not be empty")));
    }
    if input.serial_no.trim().is_empty() {
        return Err(Error::validation(anyhow!("serial_no must not be empty")));
    }

    let now = Utc::now();
    let result = sqlx::query_as::<_, Vehicle>(
        r#"
        INSERT INTO vehicles (plate, serial_no, created_at)
        VALUES (?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&input.plate)
    .bind(&input.serial_no)
    .bind(now)
    .fetch_one(&db)
    .await;

    // The unique index is the authority on duplicates; a pre-insert check
    // would race with concurrent requests.
    let vehicle = match result {
        Ok(vehicle) => vehicle,
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            return Err(Error::conflict(anyhow!(
                "a vehicle with plate {} already exists",
                input.plate
            )));
        }
        Err(err) => {
            return Err(anyhow::Error::new(err)
                .context("failed to insert vehicle")
                .into());
        }
    };

    counter!(VEHICLES_CREATED).increment(1);

    Ok(Json(vehicle))
}

async fn list_vehicles(State(db): State<Db>) -> Result<Json<Vec<Vehicle>>> {
    let vehicles = sqlx::query_as::<_, Vehicle>(r#"SELECT * FROM vehicles"#)
        .fetch_all(&db)
        .await
        .context("failed to list vehicles")?;

    Ok(Json(vehicles))
}

async fn delete_vehicle(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let result = sqlx::query(r#"DELETE FROM vehicles WHERE id = ?"#)
        .bind(id)
        .execute(&db)
        .await
        .context("failed to delete vehicle")?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found(anyhow!("vehicle {id} not found")));
    }

    counter!(VEHICLES_DELETED).increment(1);

    Ok(Json(serde_json::json!({ "message": "Vehicle deleted" })))
}

pub fn routes() -> Router<AppState> {
    // UP /vehicles/
    // UG /vehicles/
    // UD /vehicles/{id}
    Router::new()
        .route("/vehicles/", get(list_vehicles).post(create_vehicle))
        .route("/vehicles/{id}", delete(delete_vehicle))
}
