//! HTTP client for the attendance API
//!
//! Mirrors the dashboard's API layer: bearer token auth and the common
//! `{ success, data, message, error }` envelope.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::BridgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckinMode {
    #[default]
    Checkin,
    Checkout,
}

/// Reader-relevant part of the group settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderSettings {
    pub active_table: Option<Uuid>,
    pub mode: Option<CheckinMode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub id: Uuid,
    pub table_id: Uuid,
    pub name: String,
    pub employee_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinOutcome {
    pub member_name: String,
    pub member_employee_id: String,
    pub date: String,
    pub time: String,
    pub record_type: CheckinMode,
    #[serde(skip)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BridgeError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, BridgeError> {
        let token = self.token.read().await;
        match token.as_deref() {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(BridgeError::Unauthorized),
        }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), BridgeError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        let (data, _) = read_envelope::<LoginData>(response).await?;
        let data = data.ok_or_else(|| BridgeError::InvalidResponse("login without token".into()))?;
        *self.token.write().await = Some(data.token);
        debug!("Logged in as {}", username);
        Ok(())
    }

    pub async fn settings(&self) -> Result<ReaderSettings, BridgeError> {
        let request = self.authorized(self.http.get(self.url("/settings"))).await?;
        let (data, _) = read_envelope::<ReaderSettings>(request.send().await?).await?;
        Ok(data.unwrap_or_default())
    }

    /// `None` when no member holds the card.
    pub async fn member_by_card(&self, card_id: &str) -> Result<Option<MemberInfo>, BridgeError> {
        let url = self.url(&format!("/members/by-card/{}", card_id));
        let request = self.authorized(self.http.get(url)).await?;
        match read_envelope::<MemberInfo>(request.send().await?).await {
            Ok((data, _)) => Ok(data),
            Err(BridgeError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn card_checkin(
        &self,
        card_id: &str,
        table_id: Uuid,
        mode: CheckinMode,
    ) -> Result<CheckinOutcome, BridgeError> {
        let request = self
            .authorized(self.http.post(self.url("/records/card-checkin")))
            .await?
            .json(&serde_json::json!({
                "cardId": card_id,
                "tableId": table_id,
                "recordType": mode,
            }));

        let (data, message) = read_envelope::<CheckinOutcome>(request.send().await?).await?;
        let mut outcome =
            data.ok_or_else(|| BridgeError::InvalidResponse("check-in without data".into()))?;
        outcome.message = message;
        Ok(outcome)
    }
}

async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<(Option<T>, Option<String>), BridgeError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(BridgeError::Unauthorized);
    }

    let envelope: Envelope<T> = response.json().await?;
    if !status.is_success() {
        let (code, message) = envelope
            .error
            .map(|e| (e.code, e.message))
            .unwrap_or_else(|| ("UNKNOWN".to_string(), status.to_string()));
        return Err(BridgeError::Api {
            status: status.as_u16(),
            code,
            message,
        });
    }
    Ok((envelope.data, envelope.message))
}
