//! Leaderboard endpoint.

use anyhow::Context as _;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{
    db::Db,
    rank::{self, Standing},
    serve::{AppState, Result},
};

async fn user_standing(
    State(db): State<Db>,
    Path(user_identifier): Path<String>,
) -> Result<Json<Standing>> {
    // Aggregation is pushed into the store; complaints without an identifier
    // do not count as a ranked user.
    let counts: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT user_identifier, COUNT(*)
        FROM complaints
        WHERE user_identifier IS NOT NULL
        GROUP BY user_identifier
        "#,
    )
    .fetch_all(&db)
    .await
    .context("failed to aggregate complaint counts")?;

    Ok(Json(rank::standing(counts, &user_identifier)))
}

pub fn routes() -> Router<AppState> {
    // UG /rank/{user_identifier}
    Router::new().route("/rank/{user_identifier}", get(user_standing))
}
