//! Offline unit tests for pulsecheck-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use pulsecheck_core::{AppConfig, Environment};
use pulsecheck_db::{
    MonitorSubscriptionRow, NewTrendPoint, PoolConfig, SubscriptionSettings, TrendPointRow,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use uuid::Uuid;

fn test_app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        user_agent: "ua".to_string(),
        retrieval_timeout_secs: 20,
        classifier_base_url: None,
        classifier_api_key: None,
        classifier_timeout_secs: 30,
        reddit_client_id: None,
        reddit_client_secret: None,
        mastodon_instance: "https://mastodon.social".to_string(),
        sweep_cron: "0 7 * * * *".to_string(),
        smtp_host: None,
        smtp_username: None,
        smtp_password: None,
        smtp_from: None,
        alert_email_to: None,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&test_app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`TrendPointRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn trend_point_row_has_expected_fields() {
    let row = TrendPointRow {
        id: 1_i64,
        subject: "widget".to_string(),
        positive_ratio: 60,
        negative_ratio: 25,
        neutral_ratio: 15,
        overall_score: 60,
        platform_counts: serde_json::json!({"reddit": 3}),
        total_count: 12,
        recorded_at: Utc::now(),
        created_at: Utc::now(),
    };
    assert_eq!(row.overall_score, row.positive_ratio);
}

#[test]
fn new_trend_point_carries_json_platform_counts() {
    let point = NewTrendPoint {
        subject: "widget".to_string(),
        positive_ratio: 50,
        negative_ratio: 30,
        neutral_ratio: 20,
        overall_score: 50,
        platform_counts: serde_json::json!({"news": 4, "mastodon": 1}),
        total_count: 5,
        recorded_at: Utc::now(),
    };
    assert!(point.platform_counts.is_object());
}

#[test]
fn subscription_row_has_expected_fields() {
    let row = MonitorSubscriptionRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        subject: "widget".to_string(),
        is_active: true,
        cadence: "daily".to_string(),
        change_threshold_percent: 10,
        notify_by_email: false,
        notify_in_app: true,
        last_run_at: None,
        last_score: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    assert!(row.last_run_at.is_none(), "fresh subscription has no runs");
}

#[test]
fn default_subscription_settings_change_nothing() {
    let settings = SubscriptionSettings::default();
    assert!(settings.cadence.is_none());
    assert!(settings.change_threshold_percent.is_none());
    assert!(settings.notify_by_email.is_none());
    assert!(settings.notify_in_app.is_none());
    assert!(settings.is_active.is_none());
}
