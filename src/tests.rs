//! Testing utilities for the complaint service.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context as _, Result};
use figment::{providers::Format as _, Figment};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{config::AppConfig, serve, serve::AppState};

/// A temporary test directory that will be cleaned up when the struct is dropped.
struct TempDir {
    /// The path to the directory.
    path: PathBuf,
}

impl TempDir {
    /// Create a new temporary directory.
    fn new() -> Result<Self> {
        let path = std::env::temp_dir().join(format!("muniport-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    /// Get the path to the directory.
    fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Test state for the application. Each test gets its own temp directory,
/// database and listener so tests cannot observe each other's records.
pub(crate) struct TestState {
    /// The temporary directory for test data.
    temp_dir: TempDir,
    /// The address the test server is listening on.
    address: SocketAddr,
    /// The application configuration.
    config: AppConfig,
    /// The HTTP client.
    client: reqwest::Client,
}

impl TestState {
    /// Create a new test state and start the app in a background task.
    async fn start() -> Result<Self> {
        // Create a temporary directory for test data
        let temp_dir = TempDir::new()?;

        // Find a free port
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))?;
        let address = listener.local_addr()?;
        drop(listener);

        // Configure the test app
        #[derive(Serialize, Deserialize)]
        struct TestConfigInput {
            listen_address: Option<SocketAddr>,
            db: Option<String>,
        }

        let test_config = TestConfigInput {
            listen_address: Some(address),
            db: Some(format!("sqlite://{}/test.db", temp_dir.path().display())),
        };

        let config: AppConfig = Figment::new()
            .merge(figment::providers::Serialized::defaults(test_config))
            .merge(figment::providers::Toml::string(&format!(
                r#"
                [upload]
                path = "{}/uploads"
                base_url = "http://{}/"
                limit = 10485760   # 10 MB
            "#,
                temp_dir.path().display(),
                address
            )))
            .extract()?;

        // Create client
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let state = Self {
            temp_dir,
            address,
            config,
            client,
        };
        state.start_app().await?;

        Ok(state)
    }

    /// Start the application in a background task.
    async fn start_app(&self) -> Result<()> {
        let config = self.config.clone();
        let address = self.address;

        tokio::fs::create_dir_all(&config.upload.path)
            .await
            .context("failed to create upload directory")?;

        let db = crate::db::connect(&config.db)
            .await
            .context("failed to open test database")?;

        let app = serve::app(AppState { config, db });

        tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&address)
                .await
                .context("failed to bind address")?;

            axum::serve(listener, app.into_make_service())
                .await
                .context("failed to serve app")
        });

        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(300)).await;

        Ok(())
    }

    /// Build a URL on the test server.
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    /// File a complaint and return the created record.
    async fn create_complaint(&self, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(self.url("/complaints/"))
            .json(body)
            .send()
            .await?;
        anyhow::ensure!(
            response.status().is_success(),
            "create complaint failed: {}",
            response.status()
        );
        Ok(response.json().await?)
    }

    /// A minimal valid complaint body.
    fn complaint_body(title: &str, user_identifier: Option<&str>) -> Value {
        json!({
            "title": title,
            "description": "Overflowing container on the corner",
            "category": "Sanitation",
            "user_identifier": user_identifier,
        })
    }
}

mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_list_returns_newest_first() -> Result<()> {
        let state = TestState::start().await?;

        state
            .create_complaint(&TestState::complaint_body("first", None))
            .await?;
        state
            .create_complaint(&TestState::complaint_body("second", None))
            .await?;

        let listed: Vec<Value> = state
            .client
            .get(state.url("/complaints/?skip=0&limit=1"))
            .send()
            .await?
            .json()
            .await?;

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["title"], "second");
        assert_eq!(listed[0]["status"], "Pending");
        assert_eq!(listed[0]["upvotes"], 0);

        Ok(())
    }

    #[tokio::test]
    async fn created_fields_round_trip_through_list() -> Result<()> {
        let state = TestState::start().await?;

        let body = json!({
            "title": "Illegal dumping",
            "description": "Construction debris dumped overnight",
            "category": "Construction",
            "location": "Elm St & 5th Ave",
            "image_url": "http://example.com/p.jpg",
            "plate": "34ABC123",
            "firm_name": "Acme Hauling",
            "municipality": "Riverside",
            "lat": 41.015137,
            "lng": 28.979530,
            "user_identifier": "citizen-7",
        });
        let created = state.create_complaint(&body).await?;

        let listed: Vec<Value> = state
            .client
            .get(state.url("/complaints/"))
            .send()
            .await?
            .json()
            .await?;
        let found = &listed[0];

        for key in [
            "title",
            "description",
            "category",
            "location",
            "image_url",
            "plate",
            "firm_name",
            "municipality",
            "lat",
            "lng",
            "user_identifier",
        ] {
            assert_eq!(found[key], body[key], "field {key} did not round-trip");
        }
        assert_eq!(found["id"], created["id"]);
        assert_eq!(found["status"], "Pending");
        assert_eq!(found["created_at"], created["created_at"]);

        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_empty_required_fields() -> Result<()> {
        let state = TestState::start().await?;

        let response = state
            .client
            .post(state.url("/complaints/"))
            .json(&json!({
                "title": "  ",
                "description": "something",
                "category": "Traffic",
            }))
            .send()
            .await?;
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        // Nothing was inserted.
        let listed: Vec<Value> = state
            .client
            .get(state.url("/complaints/"))
            .send()
            .await?
            .json()
            .await?;
        assert!(listed.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn list_skip_past_the_end_is_empty() -> Result<()> {
        let state = TestState::start().await?;

        state
            .create_complaint(&TestState::complaint_body("only", None))
            .await?;

        let listed: Vec<Value> = state
            .client
            .get(state.url("/complaints/?skip=100&limit=10"))
            .send()
            .await?
            .json()
            .await?;
        assert!(listed.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn status_update_is_idempotent_and_404s_on_unknown_id() -> Result<()> {
        let state = TestState::start().await?;

        let response = state
            .client
            .put(state.url("/complaints/9999/status"))
            .json(&json!({ "status": "Resolved" }))
            .send()
            .await?;
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        let created = state
            .create_complaint(&TestState::complaint_body("pothole", None))
            .await?;
        let id = created["id"].as_i64().context("missing id")?;

        for _ in 0..2 {
            let updated: Value = state
                .client
                .put(state.url(&format!("/complaints/{id}/status")))
                .json(&json!({ "status": "Resolved" }))
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(updated["status"], "Resolved");
            assert_eq!(updated["id"], created["id"]);
        }

        Ok(())
    }

    #[tokio::test]
    async fn second_delete_of_a_complaint_is_not_found() -> Result<()> {
        let state = TestState::start().await?;

        let created = state
            .create_complaint(&TestState::complaint_body("noise", None))
            .await?;
        let id = created["id"].as_i64().context("missing id")?;

        let first = state
            .client
            .delete(state.url(&format!("/complaints/{id}")))
            .send()
            .await?;
        assert!(first.status().is_success());

        let second = state
            .client
            .delete(state.url(&format!("/complaints/{id}")))
            .send()
            .await?;
        assert_eq!(second.status(), reqwest::StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_plate_is_a_conflict() -> Result<()> {
        let state = TestState::start().await?;

        let created = state
            .client
            .post(state.url("/vehicles/"))
            .json(&json!({ "plate": "06XYZ42", "serial_no": "SN-0001" }))
            .send()
            .await?;
        assert!(created.status().is_success());

        // Same plate, different serial: still rejected.
        let duplicate = state
            .client
            .post(state.url("/vehicles/"))
            .json(&json!({ "plate": "06XYZ42", "serial_no": "SN-0002" }))
            .send()
            .await?;
        assert_eq!(duplicate.status(), reqwest::StatusCode::CONFLICT);

        let listed: Vec<Value> = state
            .client
            .get(state.url("/vehicles/"))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["plate"], "06XYZ42");
        assert_eq!(listed[0]["serial_no"], "SN-0001");

        Ok(())
    }

    #[tokio::test]
    async fn vehicle_delete_then_404() -> Result<()> {
        let state = TestState::start().await?;

        let created: Value = state
            .client
            .post(state.url("/vehicles/"))
            .json(&json!({ "plate": "35QRS77", "serial_no": "SN-1185" }))
            .send()
            .await?
            .json()
            .await?;
        let id = created["id"].as_i64().context("missing id")?;

        let first = state
            .client
            .delete(state.url(&format!("/vehicles/{id}")))
            .send()
            .await?;
        assert!(first.status().is_success());

        let second = state
            .client
            .delete(state.url(&format!("/vehicles/{id}")))
            .send()
            .await?;
        assert_eq!(second.status(), reqwest::StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn leaderboard_ranks_by_complaint_count() -> Result<()> {
        let state = TestState::start().await?;

        for (user, count) in [("A", 3), ("B", 3), ("C", 1)] {
            for i in 0..count {
                state
                    .create_complaint(&TestState::complaint_body(
                        &format!("{user}-{i}"),
                        Some(user),
                    ))
                    .await?;
            }
        }
        // Complaints without an identifier do not count as a ranked user.
        state
            .create_complaint(&TestState::complaint_body("anonymous", None))
            .await?;

        let c: Value = state
            .client
            .get(state.url("/rank/C"))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(c["total_users"], 3);
        assert_eq!(c["rank"], 3);

        // A and B are tied at 3; only the set {1, 2} is guaranteed.
        for user in ["A", "B"] {
            let standing: Value = state
                .client
                .get(state.url(&format!("/rank/{user}")))
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(standing["total_users"], 3);
            let rank = standing["rank"].as_i64().context("missing rank")?;
            assert!((1..=2).contains(&rank), "unexpected rank {rank}");
        }

        // A user with no complaints ranks one past the end.
        let nobody: Value = state
            .client
            .get(state.url("/rank/nobody"))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(nobody["total_users"], 3);
        assert_eq!(nobody["rank"], 4);

        Ok(())
    }

    #[tokio::test]
    async fn upload_stores_file_under_a_fresh_name() -> Result<()> {
        let state = TestState::start().await?;

        let payload = b"not really a png".to_vec();
        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(payload.clone()).file_name("my photo.PNG"),
        );

        let response: Value = state
            .client
            .post(state.url("/upload/"))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;

        let url = response["url"].as_str().context("missing url")?;
        assert!(url.contains("/uploads/"), "unexpected url {url}");
        assert!(url.ends_with(".png"), "unexpected url {url}");

        // The stored name is server-generated, not the client's.
        let name = url.rsplit('/').next().context("missing file name")?;
        assert!(!name.contains("my photo"));

        // The returned URL dereferences to the uploaded bytes.
        let served = state.client.get(url).send().await?;
        assert!(served.status().is_success());
        assert_eq!(served.bytes().await?.to_vec(), payload);

        // And the file landed in the configured upload directory.
        assert!(state.temp_dir.path().join("uploads").join(name).exists());

        Ok(())
    }
}
