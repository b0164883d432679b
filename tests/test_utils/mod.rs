//! Test utilities for integration tests
#![allow(dead_code)]

use std::env;
use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use axum::{Router, body::Body};
use chrono::NaiveTime;
use tokio_rusqlite::Connection;

use scheduling_assistant::api::AppState;
use scheduling_assistant::api::app;
use scheduling_assistant::core::AppConfig;
use scheduling_assistant::core::db::{async_db, initialize_db, upsert_refresh_token};
use scheduling_assistant::scheduling::TimeMode;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Config pointing Google calls at `google_url`, typically a mockito
/// server.
pub fn test_config(storage_path: &str, google_url: &str) -> AppConfig {
    AppConfig {
        storage_path: storage_path.to_string(),
        db_path: format!("{}/db", storage_path),
        google_client_id: String::from("test_client_id"),
        google_client_secret: String::from("test_client_secret"),
        google_redirect_uri: String::from("urn:ietf:wg:oauth:2.0:oob"),
        google_api_url: google_url.to_string(),
        google_token_url: format!("{}/token", google_url),
        cache_ttl_secs: 300,
        history_capacity: 100,
        time_mode: TimeMode::Naive,
        day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        day_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        fetch_days_behind: 180,
        fetch_days_ahead: 730,
    }
}

/// Creates a fresh, migrated database in a unique temp directory.
pub async fn test_db() -> (String, Connection) {
    // Create a unique directory for the test with a name built from
    // a timestamp and a counter to avoid collisions
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = env::temp_dir().join(format!("scheduling-test-{}-{}", ts, n));
    fs::create_dir_all(&dir).expect("Failed to create base directory");
    let storage_path = dir.display().to_string();

    let db = async_db(&format!("{}/db", storage_path))
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to migrate db");
        Ok(())
    })
    .await
    .unwrap();

    (storage_path, db)
}

/// Creates a test application router with no stored credentials.
pub async fn test_app() -> Router {
    let (storage_path, db) = test_db().await;
    let config = test_config(&storage_path, "http://127.0.0.1:9");
    app(Arc::new(RwLock::new(AppState::new(db, config))))
}

/// Creates a test application with a credential for `email` and
/// Google calls routed to `google_url`.
pub async fn test_app_with_account(google_url: &str, email: &str) -> Router {
    let (storage_path, db) = test_db().await;
    upsert_refresh_token(&db, email, "google", "test-refresh-token")
        .await
        .unwrap();
    let config = test_config(&storage_path, google_url);
    app(Arc::new(RwLock::new(AppState::new(db, config))))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}
