//! Notification requests and channel delivery.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use pulsecheck_analysis::{ChangeDirection, ChangeEvent};
use pulsecheck_db::MonitorSubscriptionRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::MonitorError;
use crate::ports::Notifier;

/// One notification to deliver, with per-channel gating flags taken from the
/// subscription that triggered it.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub owner_id: Uuid,
    pub subject: String,
    pub title: String,
    pub body: String,
    pub email: bool,
    pub in_app: bool,
}

/// Build the notification for a threshold-crossing change.
#[must_use]
pub fn change_notification(
    subscription: &MonitorSubscriptionRow,
    event: &ChangeEvent,
) -> NotificationRequest {
    let verb = match event.direction {
        ChangeDirection::Up => "climbed",
        ChangeDirection::Down => "dropped",
    };
    NotificationRequest {
        owner_id: subscription.owner_id,
        subject: event.subject.clone(),
        title: format!("Sentiment alert: {}", event.subject),
        body: format!(
            "Positive sentiment for {} {verb} from {}% to {}%, a swing of {} points \
             (alert threshold: {}).",
            event.subject,
            event.previous_score,
            event.current_score,
            event.magnitude,
            subscription.change_threshold_percent,
        ),
        email: subscription.notify_by_email,
        in_app: subscription.notify_in_app,
    }
}

/// SMTP settings for the email channel. All fields are required; the channel
/// is disabled when any of them is unset.
#[derive(Clone)]
pub struct EmailSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl EmailSettings {
    /// Assemble settings from app config, or `None` when incomplete.
    ///
    /// Subscriptions carry no email address (user accounts are outside this
    /// system), so alerts go to the deploy-level inbox.
    #[must_use]
    pub fn from_app_config(config: &pulsecheck_core::AppConfig) -> Option<Self> {
        Some(Self {
            host: config.smtp_host.clone()?,
            username: config.smtp_username.clone()?,
            password: config.smtp_password.clone()?,
            from: config.smtp_from.clone()?,
            to: config.alert_email_to.clone()?,
        })
    }
}

/// Production notifier: in-app rows plus optional SMTP email.
pub struct ChannelNotifier {
    pool: PgPool,
    email: Option<EmailSettings>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn new(pool: PgPool, email: Option<EmailSettings>) -> Self {
        Self { pool, email }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn deliver(&self, request: &NotificationRequest) -> Result<(), MonitorError> {
        let mut failures: Vec<String> = Vec::new();

        if request.in_app {
            match pulsecheck_db::insert_notification(
                &self.pool,
                request.owner_id,
                &request.subject,
                &request.title,
                &request.body,
            )
            .await
            {
                Ok(_) => {
                    tracing::debug!(subject = %request.subject, "in-app notification recorded");
                }
                Err(e) => failures.push(format!("in-app: {e}")),
            }
        }

        if request.email {
            match &self.email {
                Some(settings) => {
                    if let Err(e) = send_email(settings, request).await {
                        failures.push(format!("email: {e}"));
                    }
                }
                None => {
                    tracing::warn!(
                        subject = %request.subject,
                        "email channel requested but SMTP is not configured; skipping"
                    );
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(MonitorError::Notification(failures.join("; ")))
        }
    }
}

async fn send_email(
    settings: &EmailSettings,
    request: &NotificationRequest,
) -> Result<(), MonitorError> {
    fn notify_err(e: impl std::fmt::Display) -> MonitorError {
        MonitorError::Notification(e.to_string())
    }

    let from = settings.from.parse().map_err(notify_err)?;
    let to = settings.to.parse().map_err(notify_err)?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(&request.title)
        .header(ContentType::TEXT_PLAIN)
        .body(request.body.clone())
        .map_err(notify_err)?;

    let mailer: AsyncSmtpTransport<Tokio1Executor> =
        AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(notify_err)?
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

    mailer.send(message).await.map_err(notify_err)?;
    tracing::debug!(subject = %request.subject, "alert email sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn subscription(threshold: i32, email: bool, in_app: bool) -> MonitorSubscriptionRow {
        MonitorSubscriptionRow {
            id: 1,
            public_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            subject: "Fizzy Cola".to_string(),
            is_active: true,
            cadence: "daily".to_string(),
            change_threshold_percent: threshold,
            notify_by_email: email,
            notify_in_app: in_app,
            last_run_at: None,
            last_score: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn change_notification_carries_channel_flags_and_scores() {
        let sub = subscription(15, true, false);
        let event = ChangeEvent {
            subject: "Fizzy Cola".to_string(),
            previous_score: 60,
            current_score: 40,
            direction: ChangeDirection::Down,
            magnitude: 20,
        };
        let request = change_notification(&sub, &event);

        assert_eq!(request.owner_id, sub.owner_id);
        assert!(request.email);
        assert!(!request.in_app);
        assert!(request.title.contains("Fizzy Cola"));
        assert!(request.body.contains("dropped"));
        assert!(request.body.contains("60%"));
        assert!(request.body.contains("40%"));
        assert!(request.body.contains("20 points"));
    }

    #[test]
    fn email_settings_require_every_field() {
        let mut config = pulsecheck_core::AppConfig {
            database_url: "postgres://example".to_string(),
            env: pulsecheck_core::Environment::Test,
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            log_level: "info".to_string(),
            db_max_connections: 10,
            db_min_connections: 1,
            db_acquire_timeout_secs: 10,
            user_agent: "ua".to_string(),
            retrieval_timeout_secs: 20,
            classifier_base_url: None,
            classifier_api_key: None,
            classifier_timeout_secs: 30,
            reddit_client_id: None,
            reddit_client_secret: None,
            mastodon_instance: "https://mastodon.social".to_string(),
            sweep_cron: "0 7 * * * *".to_string(),
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_username: Some("mailer".to_string()),
            smtp_password: Some("secret".to_string()),
            smtp_from: Some("alerts@example.com".to_string()),
            alert_email_to: None,
        };
        assert!(EmailSettings::from_app_config(&config).is_none());

        config.alert_email_to = Some("ops@example.com".to_string());
        let settings = EmailSettings::from_app_config(&config).expect("all fields present");
        assert_eq!(settings.to, "ops@example.com");
    }
}
