//! Notification delivery
//!
//! Sinks deliver a finished plan by email (SMTP relay through lettre) or as
//! a Pushover push message. Delivery failures never affect the plan; they
//! are collected as warnings by [`deliver_all`].

use crate::config::NotificationsConfig;
use crate::models::TripPlan;
use crate::report;
use crate::{Result, TripScoutError};
use anyhow::Context;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::SmtpTransport;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, Transport};
use tracing::{info, warn};

pub const EMAIL_SUBJECT: &str = "🌟 Your Smart Trip Scout plan is ready!";
pub const PUSH_TITLE: &str = "Smart Trip Scout";

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Channel name used in warnings ("email", "push")
    fn channel(&self) -> &'static str;

    async fn deliver(&self, plan: &TripPlan) -> Result<()>;
}

/// Sends the full text report over an authenticated SMTP relay
pub struct EmailNotifier {
    relay: String,
    username: String,
    password: String,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// Set up email delivery to `recipient`. Fails when SMTP credentials are
    /// missing or an address does not parse.
    pub fn from_config(config: &NotificationsConfig, recipient: &str) -> anyhow::Result<Self> {
        let username = config
            .smtp_username
            .clone()
            .context("Missing notifications.smtp_username")?;
        let password = config
            .smtp_password
            .clone()
            .context("Missing notifications.smtp_password")?;
        let from_address = config.from_address.as_deref().unwrap_or(&username);

        let from = format!("Smart Trip Scout <{from_address}>")
            .parse::<Mailbox>()
            .context("Failed to parse from address")?;
        let to = recipient
            .parse::<Mailbox>()
            .context("Failed to parse to address")?;

        Ok(Self {
            relay: config.smtp_relay.clone(),
            username,
            password,
            from,
            to,
        })
    }

    fn message(&self, plan: &TripPlan) -> anyhow::Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(EMAIL_SUBJECT)
            .body(report::render(plan))
            .context("Failed to build email")
    }

    fn create_mailer(&self) -> anyhow::Result<SmtpTransport> {
        let credentials = Credentials::new(self.username.clone(), self.password.clone());
        let mailer = SmtpTransport::relay(&self.relay)
            .with_context(|| format!("Failed to connect to SMTP relay {}", self.relay))?
            .credentials(credentials)
            .build();
        Ok(mailer)
    }
}

#[async_trait]
impl NotificationSink for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, plan: &TripPlan) -> Result<()> {
        let email = self
            .message(plan)
            .map_err(|e| TripScoutError::notification("email", format!("{e:#}")))?;
        let mailer = self
            .create_mailer()
            .map_err(|e| TripScoutError::notification("email", format!("{e:#}")))?;

        // SmtpTransport blocks; keep it off the async workers
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| TripScoutError::notification("email", e.to_string()))?
            .map_err(|e| TripScoutError::notification("email", e.to_string()))?;

        info!("Sent trip plan email to {}", self.to);
        Ok(())
    }
}

/// Sends a one-line summary through the Pushover messages API
pub struct PushNotifier {
    http: reqwest::Client,
    endpoint: String,
    user_key: String,
    api_token: String,
}

impl PushNotifier {
    pub fn from_config(config: &NotificationsConfig) -> anyhow::Result<Self> {
        let user_key = config
            .pushover_user_key
            .clone()
            .context("Missing notifications.pushover_user_key")?;
        let api_token = config
            .pushover_api_token
            .clone()
            .context("Missing notifications.pushover_api_token")?;

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: config.pushover_endpoint.clone(),
            user_key,
            api_token,
        })
    }
}

#[async_trait]
impl NotificationSink for PushNotifier {
    fn channel(&self) -> &'static str {
        "push"
    }

    async fn deliver(&self, plan: &TripPlan) -> Result<()> {
        let message = report::summary(plan);
        let form = [
            ("token", self.api_token.as_str()),
            ("user", self.user_key.as_str()),
            ("message", message.as_str()),
            ("title", PUSH_TITLE),
        ];

        let response = self
            .http
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| TripScoutError::notification("push", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TripScoutError::notification(
                "push",
                format!("Pushover returned {status}: {error_text}"),
            ));
        }

        info!("Sent trip plan push notification");
        Ok(())
    }
}

/// Deliver to every sink concurrently and return one warning per failure,
/// in sink order
pub async fn deliver_all(sinks: &[Box<dyn NotificationSink>], plan: &TripPlan) -> Vec<String> {
    let results = futures::future::join_all(sinks.iter().map(|sink| sink.deliver(plan))).await;

    sinks
        .iter()
        .zip(results)
        .filter_map(|(sink, result)| {
            result.err().map(|e| {
                warn!(channel = sink.channel(), error = %e, "Notification delivery failed");
                e.to_string()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::StaticDestinationSource;
    use crate::models::PlanRequest;
    use crate::planning::TripPlanner;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn plan() -> TripPlan {
        let request = PlanRequest {
            destination: "Rome".to_string(),
            start_date: "2025-05-01".to_string(),
            end_date: "2025-05-02".to_string(),
            interests: vec!["history".to_string()],
            budget_tier: "low".to_string(),
            travelers: 1,
            include_lodging: false,
            origin: None,
        };
        TripPlanner::new(StaticDestinationSource::new(0.0, Some(3)))
            .plan(&request)
            .await
            .unwrap()
    }

    struct CountingSink {
        delivered: AtomicUsize,
    }

    #[async_trait]
    impl NotificationSink for CountingSink {
        fn channel(&self) -> &'static str {
            "counting"
        }

        async fn deliver(&self, _plan: &TripPlan) -> Result<()> {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct BrokenSink;

    #[async_trait]
    impl NotificationSink for BrokenSink {
        fn channel(&self) -> &'static str {
            "push"
        }

        async fn deliver(&self, _plan: &TripPlan) -> Result<()> {
            Err(TripScoutError::notification("push", "invalid user key"))
        }
    }

    #[tokio::test]
    async fn test_failures_become_warnings() {
        let plan = plan().await;
        let sinks: Vec<Box<dyn NotificationSink>> = vec![
            Box::new(BrokenSink),
            Box::new(CountingSink {
                delivered: AtomicUsize::new(0),
            }),
        ];
        let warnings = deliver_all(&sinks, &plan).await;

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("push"));
        assert!(warnings[0].contains("invalid user key"));
    }

    #[tokio::test]
    async fn test_successful_delivery_has_no_warnings() {
        let plan = plan().await;
        let sink = CountingSink {
            delivered: AtomicUsize::new(0),
        };
        let sinks: Vec<Box<dyn NotificationSink>> = vec![Box::new(sink)];
        assert!(deliver_all(&sinks, &plan).await.is_empty());
    }

    #[test]
    fn test_email_requires_credentials() {
        let config = NotificationsConfig::default();
        let err = EmailNotifier::from_config(&config, "me@example.com")
            .err()
            .unwrap();
        assert!(err.to_string().contains("smtp_username"));
    }

    #[test]
    fn test_email_rejects_bad_recipient() {
        let config = NotificationsConfig {
            smtp_username: Some("scout@example.com".to_string()),
            smtp_password: Some("app-password".to_string()),
            ..NotificationsConfig::default()
        };
        assert!(EmailNotifier::from_config(&config, "not an address").is_err());
        assert!(EmailNotifier::from_config(&config, "me@example.com").is_ok());
    }

    #[tokio::test]
    async fn test_email_message_carries_report() {
        let config = NotificationsConfig {
            smtp_username: Some("scout@example.com".to_string()),
            smtp_password: Some("app-password".to_string()),
            ..NotificationsConfig::default()
        };
        let notifier = EmailNotifier::from_config(&config, "me@example.com").unwrap();
        let message = notifier.message(&plan().await).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: me@example.com"));
    }

    #[test]
    fn test_push_requires_keys() {
        let config = NotificationsConfig {
            pushover_user_key: Some("user".to_string()),
            ..NotificationsConfig::default()
        };
        let err = PushNotifier::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("pushover_api_token"));
    }
}
