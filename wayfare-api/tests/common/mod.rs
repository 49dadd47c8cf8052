#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use wayfare_api::middleware::issue_token;
use wayfare_api::password::hash_password;
use wayfare_api::{app, AppState, AuthConfig};
use wayfare_core::repository::{TripRepository, UserRepository};
use wayfare_core::{NewTrip, NewUser, Role, Trip, User};
use wayfare_store::{MailError, Mailer, MemoryStore, OutgoingMail, Repositories};

pub const PASSWORD: &str = "correct-horse";

/// Keeps every mail instead of sending it; `fail` makes every send error out.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if self.fail {
            let err = "not an address".parse::<lettre::message::Mailbox>().unwrap_err();
            return Err(MailError::from(err));
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

impl RecordingMailer {
    pub fn last(&self) -> Option<OutgoingMail> {
        self.sent.lock().unwrap().last().cloned()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub mailer: Arc<RecordingMailer>,
    pub auth: AuthConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_mailer(RecordingMailer::default())
    }

    pub fn with_mailer(mailer: RecordingMailer) -> Self {
        let store = MemoryStore::new();
        let mailer = Arc::new(mailer);
        let auth = AuthConfig { secret: "integration-secret".to_string(), expiration: 3600 };
        let state = AppState::new(
            Repositories::memory(store.clone()),
            mailer.clone(),
            auth.clone(),
            "http://localhost:3001".to_string(),
        );

        Self { router: app(state), store, mailer, auth }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Stores an account directly and returns it with a signed token.
    pub async fn user(&self, name: &str, role: Role) -> (User, String) {
        let user = self
            .store
            .create_user(NewUser {
                user_name: name.to_string(),
                email: format!("{}@example.com", name),
                password_hash: hash_password(PASSWORD.to_string()).await.unwrap(),
                role,
            })
            .await
            .unwrap();
        let token = issue_token(&user, &self.auth).unwrap();
        (user, token)
    }

    pub async fn trip(&self, owner: &User, overrides: Value) -> Trip {
        let mut body = json!({
            "title": "Sahara Dunes Camp",
            "description": "Two nights in a Bedouin camp near Douz",
            "destination": "Douz",
            "duration": 3,
            "price": 250.0,
            "maxGroupSize": 10,
            "startDates": ["2025-10-04", "2025-11-08"]
        });
        if let (Some(base), Some(extra)) = (body.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        let input: NewTrip = serde_json::from_value(body).unwrap();
        self.store.create_trip(input, owner.id).await.unwrap()
    }
}

pub fn booking_body(participants: i32, date: &str) -> Value {
    json!({
        "participants": participants,
        "selectedDate": date,
        "customerName": "Ines Ben Salah",
        "customerEmail": "ines@example.com",
        "customerPhone": "+21698000000"
    })
}
