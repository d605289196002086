//! Row types for the two persisted collections.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A citizen complaint. `id`, `status`, `upvotes` and `created_at` are
/// system-assigned; everything else comes from the client at creation and is
/// returned unchanged.
#[derive(FromRow, Serialize, Debug, Clone)]
pub struct Complaint {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub plate: Option<String>,
    pub firm_name: Option<String>,
    pub municipality: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Anonymous client-supplied id used for the leaderboard.
    pub user_identifier: Option<String>,
    pub upvotes: i64,
    pub created_at: DateTime<Utc>,
}

/// A catalog vehicle. `plate` is unique across all records.
#[derive(FromRow, Serialize, Debug, Clone)]
pub struct Vehicle {
    pub id: i64,
    pub plate: String,
    pub serial_no: String,
    pub created_at: DateTime<Utc>,
}
