use axum::Router;

use crate::serve::AppState;

mod complaints;
mod rank;
mod upload;
mod vehicles;

pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(complaints::routes())
        .merge(vehicles::routes())
        .merge(rank::routes())
        .merge(upload::routes())
}
