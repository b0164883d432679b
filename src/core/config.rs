use std::env;
use std::time::Duration;

use chrono::NaiveTime;

use crate::scheduling::{SlotPolicy, TimeMode, parse_time_of_day};

pub const GOOGLE_API_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub google_api_url: String,
    pub google_token_url: String,
    pub cache_ttl_secs: u64,
    pub history_capacity: usize,
    pub time_mode: TimeMode,
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub fetch_days_behind: i64,
    pub fetch_days_ahead: i64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_time(key: &str, default: &str) -> NaiveTime {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    parse_time_of_day(&value).unwrap_or_else(|_| panic!("Invalid {}: {}", key, value))
}

/// Storage directory and database directory from `SCHED_STORAGE_PATH`.
pub fn storage_paths() -> (String, String) {
    let storage_path = env::var("SCHED_STORAGE_PATH").unwrap_or("./".to_string());
    let db_path = format!("{}/db", storage_path);
    (storage_path, db_path)
}

impl AppConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn slot_policy(&self) -> SlotPolicy {
        SlotPolicy {
            day_start: self.day_start,
            day_end: self.day_end,
            ..SlotPolicy::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let (storage_path, db_path) = storage_paths();
        let google_client_id =
            env::var("SCHED_GOOGLE_CLIENT_ID").expect("Missing SCHED_GOOGLE_CLIENT_ID");
        let google_client_secret =
            env::var("SCHED_GOOGLE_CLIENT_SECRET").expect("Missing SCHED_GOOGLE_CLIENT_SECRET");
        let google_redirect_uri = env::var("SCHED_GOOGLE_REDIRECT_URI")
            .unwrap_or_else(|_| "urn:ietf:wg:oauth:2.0:oob".to_string());
        let google_api_url =
            env::var("SCHED_GOOGLE_API_URL").unwrap_or_else(|_| GOOGLE_API_URL.to_string());
        let google_token_url =
            env::var("SCHED_GOOGLE_TOKEN_URL").unwrap_or_else(|_| GOOGLE_TOKEN_URL.to_string());
        let time_mode = env::var("SCHED_TIME_MODE")
            .unwrap_or_else(|_| "naive".to_string())
            .parse()
            .expect("Invalid SCHED_TIME_MODE");

        Self {
            storage_path,
            db_path,
            google_client_id,
            google_client_secret,
            google_redirect_uri,
            google_api_url,
            google_token_url,
            cache_ttl_secs: env_or("SCHED_CACHE_TTL_SECS", 300),
            history_capacity: env_or("SCHED_HISTORY_CAPACITY", 100),
            time_mode,
            day_start: env_time("SCHED_DAY_START", "09:00"),
            day_end: env_time("SCHED_DAY_END", "17:00"),
            fetch_days_behind: env_or("SCHED_FETCH_DAYS_BEHIND", 180),
            fetch_days_ahead: env_or("SCHED_FETCH_DAYS_AHEAD", 730),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn it_derives_the_db_path_from_the_storage_path() {
        unsafe {
            env::set_var("SCHED_STORAGE_PATH", "/tmp/sched-storage");
            env::set_var("SCHED_GOOGLE_CLIENT_ID", "client");
            env::set_var("SCHED_GOOGLE_CLIENT_SECRET", "secret");
        }

        let (storage_path, db_path) = storage_paths();
        assert_eq!(storage_path, "/tmp/sched-storage");
        assert_eq!(db_path, "/tmp/sched-storage/db");
        assert_eq!(AppConfig::default().db_path, db_path);

        unsafe {
            env::remove_var("SCHED_STORAGE_PATH");
        }
    }
}
