use anyhow::Result;
use serde_json::{Value, json};

use crate::core::AppConfig;
use crate::core::db::{async_db, initialize_db, list_accounts};
use crate::google::{fetch_events, fetch_window};
use crate::scheduling::{
    QueryMemory, generate_slots, interpret_query, normalize_events, parse_time_of_day,
};

/// Slot search against the stored accounts as a JSON document.
pub async fn find_slots(
    config: &AppConfig,
    query: &str,
    email: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
) -> Result<Value> {
    let start_time = start_time.as_deref().map(parse_time_of_day).transpose()?;
    let end_time = end_time.as_deref().map(parse_time_of_day).transpose()?;

    let db = async_db(&config.db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;

    let now = chrono::Local::now().naive_local();
    let intent = interpret_query(query, now).with_time_constraints(start_time, end_time);

    let accounts = match email {
        Some(email) => vec![email],
        None => list_accounts(&db).await.unwrap_or_else(|e| {
            tracing::error!("Failed listing accounts: {}", e);
            vec![]
        }),
    };
    let (start, end) = fetch_window(config, now);
    let events = fetch_events(config, &db, &accounts, start, end).await;

    let busy = normalize_events(&events, config.time_mode);
    let slots = generate_slots(&busy, &intent, &config.slot_policy(), now);

    let mut memory = QueryMemory::new(config.history_capacity);
    memory.learn(query, &intent, now);

    Ok(json!({
        "query": query,
        "intent": intent,
        "slots": slots,
        "agent_insights": memory.annotate(query, &intent),
    }))
}

/// One-shot slot search printed as JSON.
pub async fn run(
    query: String,
    email: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
) -> Result<()> {
    let config = AppConfig::default();
    let result = find_slots(&config, &query, email, start_time, end_time).await?;
    println!("{}", result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use tempfile::TempDir;

    use crate::scheduling::TimeMode;

    fn config(dir: &TempDir) -> AppConfig {
        let storage_path = dir.path().display().to_string();
        AppConfig {
            db_path: format!("{}/db", storage_path),
            storage_path,
            google_client_id: String::from("client"),
            google_client_secret: String::from("secret"),
            google_redirect_uri: String::from("urn:ietf:wg:oauth:2.0:oob"),
            google_api_url: String::from("http://127.0.0.1:9"),
            google_token_url: String::from("http://127.0.0.1:9/token"),
            cache_ttl_secs: 300,
            history_capacity: 10,
            time_mode: TimeMode::Naive,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            day_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            fetch_days_behind: 180,
            fetch_days_ahead: 730,
        }
    }

    #[tokio::test]
    async fn it_finds_slots_on_a_fresh_storage_path() {
        let dir = TempDir::new().unwrap();

        let result = find_slots(&config(&dir), "a week", None, None, None)
            .await
            .unwrap();

        assert_eq!(result["intent"]["time_range"], "a_week");
        assert!(!result["slots"].as_array().unwrap().is_empty());
        assert_eq!(result["agent_insights"]["successful_queries"], 1);
    }

    #[tokio::test]
    async fn it_rejects_invalid_time_constraints() {
        let dir = TempDir::new().unwrap();

        let result = find_slots(&config(&dir), "a week", None, Some("9am".into()), None).await;

        assert!(result.is_err());
    }
}
