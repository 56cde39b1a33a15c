//! In-process collaborators for router tests: a user store with the same
//! uniqueness rules as the `users` table, and delivery channels that record
//! what they were asked to send.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::database::{NewUser, StoreError, UniqueField, UpdatableField, User, UserStore};
use crate::notify::{DeliveryError, Mailer, SmsSender};
use crate::otp::OtpStore;
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret";

/// User store backed by a vector. Enforces the same unique keys as Postgres.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
    insert_conflict: Option<UniqueField>,
}

impl MemoryUserStore {
    /// A store whose every insert violates `field`, e.g. a constraint added
    /// to the table that the service does not know by name
    pub fn rejecting_inserts(field: UniqueField) -> Self {
        Self { insert_conflict: Some(field), ..Self::default() }
    }

    fn conflict(existing: &[User], candidate: &User, skip: Option<&str>) -> Option<UniqueField> {
        let others = existing.iter().filter(|u| Some(u.username.as_str()) != skip);

        for other in others {
            if other.username == candidate.username {
                return Some(UniqueField::Username);
            }
            if other.email == candidate.email {
                return Some(UniqueField::Email);
            }
            if other.phone_number == candidate.phone_number {
                return Some(UniqueField::PhoneNumber);
            }
            // NULLs never collide, as in a SQL unique constraint
            if other.sso_provider.is_some()
                && other.sso_id.is_some()
                && other.sso_provider == candidate.sso_provider
                && other.sso_id == candidate.sso_id
            {
                return Some(UniqueField::SsoIdentity);
            }
        }
        None
    }

    async fn find(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        self.users.read().await.iter().find(|u| predicate(u)).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.find(|u| u.username == username).await)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.find(|u| u.email == email).await)
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, StoreError> {
        Ok(self.find(|u| u.phone_number == phone_number).await)
    }

    async fn find_by_sso(
        &self,
        email: &str,
        sso_provider: &str,
        sso_id: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .find(|u| {
                u.email == email
                    && u.sso_provider.as_deref() == Some(sso_provider)
                    && u.sso_id.as_deref() == Some(sso_id)
            })
            .await)
    }

    async fn insert(&self, user: &NewUser) -> Result<(), StoreError> {
        if let Some(field) = self.insert_conflict {
            return Err(StoreError::Conflict(field));
        }

        let mut users = self.users.write().await;
        let candidate = User::from(user.clone());

        if let Some(field) = Self::conflict(&users, &candidate, None) {
            return Err(StoreError::Conflict(field));
        }
        users.push(candidate);
        Ok(())
    }

    async fn update_field(
        &self,
        field: UpdatableField,
        owner: &str,
        old: &str,
        new: &str,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;

        let Some(index) = users.iter().position(|u| {
            u.username == owner && column_value(u, field) == old
        }) else {
            return Ok(false);
        };

        let mut updated = users[index].clone();
        match field {
            UpdatableField::Username => updated.username = new.to_string(),
            UpdatableField::Email => updated.email = new.to_string(),
            UpdatableField::PhoneNumber => updated.phone_number = new.to_string(),
        }

        if let Some(conflict) = Self::conflict(&users, &updated, Some(owner)) {
            return Err(StoreError::Conflict(conflict));
        }
        users[index] = updated;
        Ok(true)
    }

    async fn update_password(
        &self,
        username: &str,
        current_hash: Option<&str>,
        new_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let row = users
            .iter_mut()
            .find(|u| u.username == username && u.password_hash.as_deref() == current_hash);
        match row {
            Some(user) => {
                user.password_hash = Some(new_hash.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn column_value(user: &User, field: UpdatableField) -> &str {
    match field {
        UpdatableField::Username => &user.username,
        UpdatableField::Email => &user.email,
        UpdatableField::PhoneNumber => &user.phone_number,
    }
}

/// Records every (phone_number, body) it is asked to send
#[derive(Default)]
pub struct RecordingSmsSender {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSmsSender {
    /// The 6-digit code in the most recent message to `phone_number`
    pub fn last_code(&self, phone_number: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        sent.iter()
            .rev()
            .find(|(to, _)| to == phone_number)
            .and_then(|(_, body)| {
                body.split(|c: char| !c.is_ascii_digit())
                    .find(|chunk| chunk.len() == 6)
                    .map(str::to_string)
            })
    }
}

#[async_trait]
impl SmsSender for RecordingSmsSender {
    async fn send(&self, phone_number: &str, body: &str) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push((phone_number.to_string(), body.to_string()));
        Ok(())
    }
}

/// Provider that rejects everything
pub struct FailingSmsSender;

#[async_trait]
impl SmsSender for FailingSmsSender {
    async fn send(&self, _phone_number: &str, _body: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::Rejected { status: 503, body: "unavailable".to_string() })
    }
}

/// Records every (to, subject, body) it is asked to send
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    /// The token at the end of the most recent reset mail to `to`
    pub fn last_token(&self, to: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        sent.iter()
            .rev()
            .find(|(recipient, _, _)| recipient == to)
            .and_then(|(_, _, body)| body.split_whitespace().last().map(str::to_string))
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// State plus handles on the recording collaborators behind it
pub struct TestContext {
    pub state: AppState,
    pub sms: Arc<RecordingSmsSender>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestContext {
    pub fn new() -> Self {
        let sms = Arc::new(RecordingSmsSender::default());
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState {
            users: Arc::new(MemoryUserStore::default()),
            otps: Arc::new(OtpStore::new(300, 5)),
            tokens: TokenIssuer::new(TEST_SECRET, 24, 15).unwrap(),
            // Minimum cost keeps the suite fast
            passwords: PasswordHasher::new(4),
            sms: sms.clone(),
            mailer: mailer.clone(),
        };

        Self { state, sms, mailer }
    }

    pub fn with_otp_store(mut self, otps: OtpStore) -> Self {
        self.state.otps = Arc::new(otps);
        self
    }

    pub fn with_user_store(mut self, users: MemoryUserStore) -> Self {
        self.state.users = Arc::new(users);
        self
    }

    pub fn router(&self) -> Router {
        crate::app(self.state.clone())
    }

    /// Send one request through a fresh router, returning status and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, None, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
