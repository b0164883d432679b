pub mod gcal;
pub mod oauth;

use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::core::db::find_refresh_token;
use crate::scheduling::{CalendarEvent, CalendarSource, collect_events};
use gcal::GoogleCalendar;
use oauth::refresh_access_token;

/// The span of events cached per account, relative to `now`.
pub fn fetch_window(config: &AppConfig, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    (
        now - Duration::days(config.fetch_days_behind),
        now + Duration::days(config.fetch_days_ahead),
    )
}

/// Fetch events across all of an account's calendars.
///
/// Returns `Ok(None)` when no credential is stored for the account.
pub async fn fetch_account_events(
    config: &AppConfig,
    db: &Connection,
    account: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Option<Vec<CalendarEvent>>> {
    let Some(refresh_token) = find_refresh_token(db, account).await? else {
        return Ok(None);
    };

    let token = refresh_access_token(
        &config.google_token_url,
        &config.google_client_id,
        &config.google_client_secret,
        &refresh_token,
    )
    .await?;

    let calendar = GoogleCalendar::new(&config.google_api_url, &token.access_token);
    let calendars = calendar.list_calendars().await?;
    tracing::debug!("Fetching events from {} calendars for {}", calendars.len(), account);

    Ok(Some(collect_events(&calendar, &calendars, start, end).await))
}

/// Events for one account, or `None` when it has no credential or fails
/// to load. The reason is logged.
pub async fn load_account_events(
    config: &AppConfig,
    db: &Connection,
    account: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Option<Vec<CalendarEvent>> {
    match fetch_account_events(config, db, account, start, end).await {
        Ok(Some(found)) => Some(found),
        Ok(None) => {
            tracing::warn!("No credential stored for {}", account);
            None
        }
        Err(e) => {
            tracing::error!("Failed getting calendar events for {}: {}", account, e);
            None
        }
    }
}

pub fn sort_events(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| a.start.cmp(&b.start));
}

/// Fetch events for several accounts. Accounts that have no
/// credential or fail to load contribute nothing.
pub async fn fetch_events(
    config: &AppConfig,
    db: &Connection,
    accounts: &[String],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    for account in accounts {
        if let Some(found) = load_account_events(config, db, account, start, end).await {
            events.extend(found);
        }
    }
    sort_events(&mut events);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use tempfile::TempDir;

    use crate::core::db::{async_db, initialize_db, upsert_refresh_token};
    use crate::scheduling::TimeMode;

    fn config(api_url: &str) -> AppConfig {
        AppConfig {
            storage_path: String::from("./"),
            db_path: String::from("./db"),
            google_client_id: String::from("client"),
            google_client_secret: String::from("secret"),
            google_redirect_uri: String::from("urn:ietf:wg:oauth:2.0:oob"),
            google_api_url: api_url.to_string(),
            google_token_url: format!("{}/token", api_url),
            cache_ttl_secs: 300,
            history_capacity: 10,
            time_mode: TimeMode::Naive,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            day_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            fetch_days_behind: 180,
            fetch_days_ahead: 730,
        }
    }

    async fn test_db(dir: &TempDir) -> Connection {
        let db = async_db(dir.path().join("db").to_str().unwrap())
            .await
            .unwrap();
        db.call(|conn| {
            initialize_db(conn)?;
            Ok(())
        })
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn it_skips_accounts_that_cannot_be_loaded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        upsert_refresh_token(&db, "revoked@example.com", "google", "stale")
            .await
            .unwrap();
        let config = config(&server.url());
        let now = chrono::Local::now().naive_local();

        assert!(
            load_account_events(&config, &db, "nobody@example.com", now, now)
                .await
                .is_none()
        );
        assert!(
            load_account_events(&config, &db, "revoked@example.com", now, now)
                .await
                .is_none()
        );

        let accounts = vec![
            String::from("nobody@example.com"),
            String::from("revoked@example.com"),
        ];
        assert!(fetch_events(&config, &db, &accounts, now, now).await.is_empty());
    }
}
