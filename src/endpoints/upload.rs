//! Photo upload endpoint.
//!
//! Files are stored under a server-generated name; the client's file name
//! contributes only an extension. Upload and complaint creation are two
//! independent calls, so an interrupted client can leave an orphaned file
//! behind. That is a known gap, not a correctness bug.

use anyhow::{anyhow, Context as _};
use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use metrics::counter;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    metrics::UPLOADS_STORED,
    serve::{AppState, Result},
    Error,
};

#[derive(Serialize, Debug, Clone)]
pub(super) struct UploadResponse {
    pub url: String,
}

/// Derive a safe extension from a client-supplied file name. Anything other
/// than a short alphanumeric suffix is discarded.
fn sanitized_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 8 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

async fn upload_image(
    State(config): State<AppConfig>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    // Take the first multipart field that carries a file name.
    let field = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|err| Error::validation(err))?;

        match field {
            Some(field) if field.file_name().is_some() => break field,
            Some(_) => continue,
            None => {
                return Err(Error::validation(anyhow!(
                    "multipart body contains no file"
                )));
            }
        }
    };

    let ext = field.file_name().and_then(sanitized_extension);
    let data = field
        .bytes()
        .await
        .map_err(|err| Error::validation(err))?;

    let name = match ext {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    };
    let path = config.upload.path.join(&name);

    if let Err(err) = tokio::fs::write(&path, &data).await {
        // Best effort: do not leave a truncated file behind.
        let _ = tokio::fs::remove_file(&path).await;
        return Err(Error::storage(
            anyhow::Error::new(err).context("failed to store upload"),
        ));
    }

    counter!(UPLOADS_STORED).increment(1);

    let url = config
        .upload
        .base_url
        .join("uploads/")
        .and_then(|base| base.join(&name))
        .context("failed to build public upload url")?;

    Ok(Json(UploadResponse {
        url: url.to_string(),
    }))
}

pub fn routes() -> Router<AppState> {
    // UP /upload/
    Router::new().route("/upload/", post(upload_image))
}
