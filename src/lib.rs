//! Municipal complaint reporting service.
mod config;
mod db;
mod endpoints;
pub mod error;
mod metrics;
mod models;
mod rank;
mod serve;
#[cfg(test)]
mod tests;

pub use error::Error;
pub use serve::run;

/// The index (/) route.
async fn index() -> impl axum::response::IntoResponse {
    r"
                          _                   _
  _ __ ___  _   _ _ __  (_)_ __   ___  _ __ | |_
 | '_ ` _ \| | | | '_ \ | | '_ \ / _ \| '__|| __|
 | | | | | | |_| | | | || | |_) | (_) | |    | |_
 |_| |_| |_|\__,_|_| |_||_| .__/ \___/|_|     \__|
                          |_|

This is a municipal complaint reporting backend.

  POST   /complaints/              file a complaint
  GET    /complaints/              list complaints, newest first
  PUT    /complaints/{id}/status   update a complaint's status
  DELETE /complaints/{id}          remove a complaint
  GET    /rank/{user_identifier}   leaderboard standing
  POST   /vehicles/                register a vehicle
  GET    /vehicles/                list vehicles
  DELETE /vehicles/{id}            remove a vehicle
  POST   /upload/                  store a photo, returns its URL
    "
}
