//! Fire-and-forget email notifications.
//!
//! ```text
//! handler
//!   └─ notifier.notify(notification)
//!        ├─ render() → OutgoingEmail
//!        └─ tx.try_send(email) ─────────────┐   (queue full → dropped + counted)
//!                                           ▼
//!   NotificationDispatcher::run (spawned task):
//!        ├─ recv from rx, or stop on shutdown
//!        ├─ acquire semaphore permit (caps concurrent sends)
//!        └─ spawn transport.send(email) → log + count outcome
//! ```
//!
//! Send failures never reach the request that triggered them and are not retried.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::NotificationsConfig;
use crate::email::{MailTransport, OutgoingEmail};

/// Events that produce an email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Sent to the patient after an appointment is booked
    AppointmentConfirmation {
        patient_name: String,
        patient_email: String,
        doctor_name: String,
        date: NaiveDate,
        time: String,
    },
    /// Sent to the admin address after an article is published
    NewArticle {
        title: String,
        author: String,
        category: String,
        publish_date: DateTime<Utc>,
        content: String,
    },
    /// Sent to the admin address for each item found with zero stock
    OutOfStock { item_name: String },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::AppointmentConfirmation { .. } => "appointment_confirmation",
            Notification::NewArticle { .. } => "new_article",
            Notification::OutOfStock { .. } => "out_of_stock",
        }
    }

    pub fn render(&self, admin_email: &str) -> OutgoingEmail {
        match self {
            Notification::AppointmentConfirmation {
                patient_name,
                patient_email,
                doctor_name,
                date,
                time,
            } => OutgoingEmail {
                to: patient_email.clone(),
                to_name: Some(patient_name.clone()),
                subject: "Appointment Confirmation".to_string(),
                body: format!(
                    "Hello {patient_name},\n\nYour appointment has been successfully scheduled with Dr. {doctor_name} on {} at {time}.\n\nThank you!",
                    date.format("%Y-%m-%d")
                ),
            },
            Notification::NewArticle {
                title,
                author,
                category,
                publish_date,
                content,
            } => OutgoingEmail {
                to: admin_email.to_string(),
                to_name: None,
                subject: "New Article Added".to_string(),
                body: format!(
                    "A new article titled \"{title}\" has been successfully added by {author}.\n\nDetails:\n- Category: {category}\n- Publish Date: {}\n- Content: {content}\n\nThank you!",
                    publish_date.format("%Y-%m-%d")
                ),
            },
            Notification::OutOfStock { item_name } => OutgoingEmail {
                to: admin_email.to_string(),
                to_name: None,
                subject: "Out of Stock Alert".to_string(),
                body: format!("The item {item_name} is out of stock."),
            },
        }
    }
}

/// Handle used by request handlers to queue notifications. Cheap to clone.
#[derive(Clone)]
pub struct Notifier {
    tx: Option<mpsc::Sender<OutgoingEmail>>,
    admin_email: String,
}

impl Notifier {
    /// Create the queue and spawn the dispatcher task that drains it.
    pub fn spawn(
        transport: Arc<dyn MailTransport>,
        config: &NotificationsConfig,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let dispatcher = NotificationDispatcher {
            rx,
            transport,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_sends)),
            shutdown,
        };
        let handle = tokio::spawn(dispatcher.run());

        let notifier = Self {
            tx: Some(tx),
            admin_email: config.admin_email.clone(),
        };
        (notifier, handle)
    }

    /// A notifier that discards everything, for `notifications.enabled: false`.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            admin_email: String::new(),
        }
    }

    /// Queue a notification. Returns whether it was accepted onto the queue.
    pub fn notify(&self, notification: Notification) -> bool {
        let kind = notification.kind();
        let Some(tx) = &self.tx else {
            tracing::debug!(kind, "Notifications disabled, skipping");
            return false;
        };

        match tx.try_send(notification.render(&self.admin_email)) {
            Ok(()) => {
                counter!("medctl_notifications_total", "kind" => kind, "outcome" => "queued").increment(1);
                tracing::debug!(kind, "Notification queued");
                true
            }
            Err(mpsc::error::TrySendError::Full(email)) => {
                counter!("medctl_notifications_total", "kind" => kind, "outcome" => "dropped").increment(1);
                tracing::warn!(kind, to = %email.to, "Notification queue full, dropping notification");
                false
            }
            Err(mpsc::error::TrySendError::Closed(email)) => {
                counter!("medctl_notifications_total", "kind" => kind, "outcome" => "dropped").increment(1);
                tracing::warn!(kind, to = %email.to, "Notification dispatcher stopped, dropping notification");
                false
            }
        }
    }
}

struct NotificationDispatcher {
    rx: mpsc::Receiver<OutgoingEmail>,
    transport: Arc<dyn MailTransport>,
    semaphore: Arc<Semaphore>,
    shutdown: CancellationToken,
}

impl NotificationDispatcher {
    async fn run(mut self) {
        loop {
            let email = tokio::select! {
                email = self.rx.recv() => {
                    match email {
                        Some(e) => e,
                        None => {
                            tracing::debug!("Notification channel closed, shutting down");
                            break;
                        }
                    }
                }
                _ = self.shutdown.cancelled() => {
                    tracing::debug!("Notification dispatcher received shutdown signal");
                    break;
                }
            };

            let permit = match self.semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => {
                    tracing::warn!("Notification dispatcher semaphore closed");
                    break;
                }
            };

            let transport = self.transport.clone();
            tokio::spawn(async move {
                let _permit = permit;

                match transport.send(&email).await {
                    Ok(()) => {
                        counter!("medctl_notification_sends_total", "outcome" => "success").increment(1);
                        tracing::info!(to = %email.to, subject = %email.subject, "Notification email sent");
                    }
                    Err(e) => {
                        counter!("medctl_notification_sends_total", "outcome" => "failure").increment(1);
                        tracing::error!(to = %email.to, subject = %email.subject, error = %e, "Failed to send notification email");
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingTransport;

    fn config(queue_capacity: usize) -> NotificationsConfig {
        NotificationsConfig {
            enabled: true,
            admin_email: "admin@hospital.example".to_string(),
            queue_capacity,
            max_concurrent_sends: 2,
        }
    }

    fn out_of_stock(name: &str) -> Notification {
        Notification::OutOfStock {
            item_name: name.to_string(),
        }
    }

    #[test]
    fn test_render_appointment_confirmation() {
        let email = Notification::AppointmentConfirmation {
            patient_name: "Nimal".to_string(),
            patient_email: "nimal@example.com".to_string(),
            doctor_name: "Perera".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            time: "10:30".to_string(),
        }
        .render("admin@hospital.example");

        assert_eq!(email.to, "nimal@example.com");
        assert_eq!(email.subject, "Appointment Confirmation");
        assert!(email.body.starts_with("Hello Nimal,"));
        assert!(email.body.contains("with Dr. Perera on 2025-03-14 at 10:30."));
    }

    #[test]
    fn test_render_admin_notifications() {
        let article = Notification::NewArticle {
            title: "Eat well".to_string(),
            author: "Dr. Fernando".to_string(),
            category: "nutrition".to_string(),
            publish_date: DateTime::parse_from_rfc3339("2025-01-02T08:00:00Z").unwrap().with_timezone(&Utc),
            content: "Vegetables.".to_string(),
        }
        .render("admin@hospital.example");
        assert_eq!(article.to, "admin@hospital.example");
        assert_eq!(article.subject, "New Article Added");
        assert!(article.body.contains("\"Eat well\""));
        assert!(article.body.contains("- Category: nutrition"));
        assert!(article.body.contains("- Publish Date: 2025-01-02"));

        let stock = out_of_stock("Gauze").render("admin@hospital.example");
        assert_eq!(stock.subject, "Out of Stock Alert");
        assert_eq!(stock.body, "The item Gauze is out of stock.");
    }

    #[tokio::test]
    async fn test_dispatcher_sends_queued_notifications() {
        let transport = RecordingTransport::new();
        let (notifier, _handle) = Notifier::spawn(Arc::new(transport.clone()), &config(8), CancellationToken::new());

        assert!(notifier.notify(out_of_stock("Gauze")));
        assert!(notifier.notify(out_of_stock("Saline")));

        let sent = transport.wait_for_sends(2).await;
        let mut bodies: Vec<_> = sent.iter().map(|e| e.body.clone()).collect();
        bodies.sort();
        assert_eq!(bodies, vec!["The item Gauze is out of stock.", "The item Saline is out of stock."]);
    }

    #[tokio::test]
    async fn test_send_failure_is_swallowed() {
        let transport = RecordingTransport::new();
        transport.fail_sends(true);
        let (notifier, _handle) = Notifier::spawn(Arc::new(transport.clone()), &config(8), CancellationToken::new());

        assert!(notifier.notify(out_of_stock("Gauze")));
        transport.wait_for_attempts(1).await;
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_full_queue_drops_notification() {
        let (tx, _rx) = mpsc::channel(1);
        let notifier = Notifier {
            tx: Some(tx),
            admin_email: "admin@hospital.example".to_string(),
        };

        assert!(notifier.notify(out_of_stock("Gauze")));
        assert!(!notifier.notify(out_of_stock("Saline")));
    }

    #[tokio::test]
    async fn test_shutdown_stops_dispatcher() {
        let transport = RecordingTransport::new();
        let shutdown = CancellationToken::new();
        let (notifier, handle) = Notifier::spawn(Arc::new(transport), &config(8), shutdown.clone());

        shutdown.cancel();
        handle.await.unwrap();
        assert!(!notifier.notify(out_of_stock("Gauze")));
    }

    #[test]
    fn test_disabled_notifier_discards() {
        assert!(!Notifier::disabled().notify(out_of_stock("Gauze")));
    }
}
