//! Test utilities: an in-memory application, a recording mail transport and request fixtures.

use crate::auth::password::Argon2Params;
use crate::config::{Config, DatabaseConfig};
use crate::email::{MailTransport, OutgoingEmail};
use crate::errors::Error;
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::Duration;

pub const TEST_ADMIN_EMAIL: &str = "admin@hospital.example";
pub const TEST_ADMIN_PASSWORD: &str = "AdminPassword1";
pub const TEST_USER_PASSWORD: &str = "CorrectHorse42";

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig::Memory,
        admin_email: TEST_ADMIN_EMAIL.to_string(),
        admin_password: Some(TEST_ADMIN_PASSWORD.to_string()),
        ..Default::default()
    };
    config.notifications.admin_email = TEST_ADMIN_EMAIL.to_string();
    config.notifications.queue_capacity = 64;
    config
}

pub async fn create_test_app() -> (TestServer, RecordingTransport) {
    create_test_app_with(create_test_config()).await
}

pub async fn create_test_app_with(config: Config) -> (TestServer, RecordingTransport) {
    let transport = RecordingTransport::new();
    let app = crate::Application::new_with(config, Arc::new(transport.clone()), Argon2Params::insecure_fast())
        .await
        .expect("Failed to create application");
    (app.into_test_server(), transport)
}

/// Mail transport that keeps every message in memory
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    attempts: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail
    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` messages were delivered, returning them
    pub async fn wait_for_sends(&self, n: usize) -> Vec<OutgoingEmail> {
        let waited = tokio::time::timeout(WAIT_TIMEOUT, async {
            loop {
                let sent = self.sent();
                if sent.len() >= n {
                    return sent;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        match waited {
            Ok(sent) => sent,
            Err(_) => panic!("expected {n} sent emails, got {}", self.sent().len()),
        }
    }

    /// Wait until at least `n` sends were attempted, successful or not
    pub async fn wait_for_attempts(&self, n: usize) {
        let waited = tokio::time::timeout(WAIT_TIMEOUT, async {
            while self.attempts() < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        if waited.is_err() {
            panic!("expected {n} send attempts, got {}", self.attempts());
        }
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Internal {
                operation: "send email: connection refused".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub fn doctor_json(name: &str, specialization: &str) -> Value {
    json!({
        "doctorName": name,
        "specialization": specialization,
        "contactNumber": "0771234567",
        "availableHours": "Mon-Fri 09:00-17:00",
    })
}

/// Create a doctor through the API, returning its id
pub async fn create_doctor(server: &TestServer, name: &str, specialization: &str) -> String {
    let response = server.post("/doctors").json(&doctor_json(name, specialization)).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"]
        .as_str()
        .expect("doctor id in response")
        .to_string()
}

pub fn appointment_json(doctor_id: &str) -> Value {
    json!({
        "name": "Kamala Silva",
        "age": 34,
        "contact": "0712345678",
        "doctor": doctor_id,
        "date": "2025-03-14",
        "time": "10:30",
        "email": "kamala@example.com",
    })
}

pub fn article_json(title: &str, category: &str) -> Value {
    json!({
        "image": "https://cdn.example.com/images/article.png",
        "title": title,
        "category": category,
        "author": "Dr. Fernando",
        "publish_date": "2025-02-01T08:00:00Z",
        "content": "Eat more vegetables and drink water.",
    })
}

pub fn ticket_json(title: &str, description: &str) -> Value {
    json!({
        "email": "patient@example.com",
        "issueTitle": title,
        "issueDescription": description,
    })
}

pub fn item_json(name: &str, quantity: impl Serialize, unit_price: impl Serialize) -> Value {
    json!({
        "itemName": name,
        "quantity": quantity,
        "unitPrice": unit_price,
        "supplierEmail": "supplies@example.com",
    })
}

pub fn user_json(email: &str, nic: &str) -> Value {
    json!({
        "title": "Mr",
        "firstName": "Saman",
        "lastName": "Jayasuriya",
        "address": "12 Lake Road",
        "NIC": nic,
        "DOB": "1990-05-17",
        "contact": "+94771234567",
        "emailAddress": email,
        "city": "Kandy",
        "district": "Kandy",
        "password": TEST_USER_PASSWORD,
    })
}
