//! HTTP collaborators
//!
//! `reqwest` implementation of the three collaborator traits against the
//! membership backend's JSON API.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::aggregate::{AgeVerdict, EnrollmentAggregate};
use crate::config::Config;
use crate::domain::validators::normalize_phone;
use crate::domain::SessionContext;

use super::{
    precheck_referral, AgeCheckRequest, AgeCheckResponse, AgeVerifier, ClientError,
    ReferralCheck, ReferralLookup, RegistrationFailure, RegistrationPayload,
    RegistrationReceipt, RegistrationService,
};

/// Session header attached to every collaborator call
pub const SESSION_HEADER: &str = "X-Enrollment-Session";

/// Per-request correlation header
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Error body returned by the backend on non-success statuses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct MemberSummary {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct PhoneSearchResponse {
    user: Option<MemberSummary>,
}

#[derive(Debug, Deserialize)]
struct RegisteredUser {
    id: i64,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    user: Option<RegisteredUser>,
}

fn default_success() -> bool {
    true
}

/// Backend client shared by all wizard steps
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client from configuration
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, ctx: &SessionContext) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(SESSION_HEADER, ctx.session_id.to_string())
            .header(REQUEST_ID_HEADER, ctx.request_id().to_string())
    }

    /// Decode a success body, or turn a non-success status into an error
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: body.message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AgeVerifier for BackendClient {
    async fn check_age(
        &self,
        ctx: &SessionContext,
        birth_date: NaiveDate,
    ) -> Result<AgeVerdict, ClientError> {
        let response = self
            .request(Method::POST, "/auth/check-age", ctx)
            .json(&AgeCheckRequest { birth_date })
            .send()
            .await?;

        let body: AgeCheckResponse = Self::decode(response).await?;
        tracing::debug!(
            session_id = %ctx.session_id,
            is_minor = body.is_minor,
            server_date = %body.server_date,
            "Age verified"
        );
        Ok(body.into())
    }
}

#[async_trait]
impl ReferralLookup for BackendClient {
    async fn check_referral(
        &self,
        ctx: &SessionContext,
        identifier: &str,
    ) -> Result<ReferralCheck, ClientError> {
        if let Some(check) = precheck_referral(identifier) {
            return Ok(check);
        }

        let phone = normalize_phone(identifier);
        let response = self
            .request(Method::GET, "/users/search-by-phone", ctx)
            .query(&[("phone", phone.as_str())])
            .send()
            .await?;

        let body: PhoneSearchResponse = Self::decode(response).await?;
        Ok(match body.user {
            Some(member) => ReferralCheck::valid(format!("Found: {}", member.name), Some(member.id)),
            None => ReferralCheck::invalid("No member found with this phone number"),
        })
    }
}

#[async_trait]
impl RegistrationService for BackendClient {
    async fn register(
        &self,
        ctx: &SessionContext,
        aggregate: &EnrollmentAggregate,
    ) -> Result<RegistrationReceipt, RegistrationFailure> {
        let payload = RegistrationPayload::new(aggregate, Utc::now());

        let response = self
            .request(Method::POST, "/auth/register", ctx)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(session_id = %ctx.session_id, error = %e, "Registration request failed");
                RegistrationFailure::transport("Could not reach the server. Please try again.")
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            RegistrationFailure::transport(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(RegistrationFailure {
                status: Some(status.as_u16()),
                message: body
                    .message
                    .unwrap_or_else(|| "Registration failed".to_string()),
                field_errors: body.errors,
            });
        }

        let body: RegisterResponse = serde_json::from_slice(&bytes).map_err(|e| RegistrationFailure {
            status: Some(status.as_u16()),
            message: format!("Unexpected response body: {}", e),
            field_errors: BTreeMap::new(),
        })?;

        match (body.success, body.user) {
            (true, Some(user)) => Ok(RegistrationReceipt {
                user_id: user.id,
                status: user.status.unwrap_or_else(|| "pending".to_string()),
                message: body.message.unwrap_or_default(),
            }),
            _ => Err(RegistrationFailure {
                status: Some(status.as_u16()),
                message: body
                    .message
                    .unwrap_or_else(|| "Registration failed".to_string()),
                field_errors: BTreeMap::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_trims_base_url() {
        let client = BackendClient::from_config(&Config::with_base_url("http://localhost:9/api/v1/"))
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9/api/v1");
    }

    #[tokio::test]
    async fn test_short_referral_skips_network() {
        // nothing listens on port 9; a network call would fail
        let client =
            BackendClient::from_config(&Config::with_base_url("http://127.0.0.1:9")).unwrap();
        let check = client
            .check_referral(&SessionContext::new(), "ab")
            .await
            .unwrap();
        assert!(!check.is_valid);
    }

    #[test]
    fn test_error_body_tolerates_missing_fields() {
        let body: ErrorBody = serde_json::from_str(r#"{"message":"Invalid"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("Invalid"));
        assert!(body.errors.is_empty());
    }
}
