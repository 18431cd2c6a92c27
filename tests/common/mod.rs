//! Common test utilities
//!
//! An in-process `axum` stand-in for the membership backend, bound to an
//! ephemeral port, plus form-filling helpers for the wizard steps.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{json, Value};

use member_enrollment::aggregate::GuardianDetails;
use member_enrollment::signature::Point;
use member_enrollment::steps::{BasicInfoStep, MedicalHistoryStep, ParentConsentStep};
use member_enrollment::{BirthDateEntry, Config};

/// Member known to the referral search
pub const REFERRER_PHONE: &str = "6912345678";
pub const REFERRER_ID: i64 = 41;

/// Email the mock backend reports as already registered
pub const TAKEN_EMAIL: &str = "taken@example.com";

#[derive(Default)]
pub struct MockState {
    /// Registration requests still to fail with 503
    pub fail_registrations: AtomicUsize,
    pub registrations: Mutex<Vec<Value>>,
    pub age_checks: AtomicUsize,
    pub phone_searches: Mutex<Vec<String>>,
    pub sessions: Mutex<Vec<String>>,
}

impl MockState {
    fn record_session(&self, headers: &HeaderMap) {
        if let Some(session) = headers
            .get("x-enrollment-session")
            .and_then(|v| v.to_str().ok())
        {
            self.sessions.lock().unwrap().push(session.to_string());
        }
    }

    pub fn registrations(&self) -> Vec<Value> {
        self.registrations.lock().unwrap().clone()
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Client configuration with a short debounce to keep tests fast
    pub fn config(&self) -> Config {
        let mut config = Config::with_base_url(&self.base_url);
        config.referral_debounce = Duration::from_millis(50);
        config.http_timeout = Some(Duration::from_secs(5));
        config
    }
}

async fn check_age(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.record_session(&headers);
    state.age_checks.fetch_add(1, Ordering::SeqCst);

    let birth_date = body["birth_date"]
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .ok_or_else(|| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "message": "The birth date field is required." })),
            )
        })?;

    let today = Utc::now().date_naive();
    let age = today.years_since(birth_date).unwrap_or(0);
    Ok(Json(json!({
        "is_minor": age < 18,
        "age": age,
        "server_date": today.format("%Y-%m-%d").to_string(),
    })))
}

async fn search_by_phone(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.record_session(&headers);
    let phone = params.get("phone").cloned().unwrap_or_default();
    state.phone_searches.lock().unwrap().push(phone.clone());

    if phone == REFERRER_PHONE {
        Json(json!({
            "user": { "id": REFERRER_ID, "name": "Giorgos Ioannou", "phone": REFERRER_PHONE }
        }))
    } else {
        Json(json!({ "user": null }))
    }
}

async fn register(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record_session(&headers);
    state.registrations.lock().unwrap().push(body.clone());

    let pending_failures = state.fail_registrations.load(Ordering::SeqCst);
    if pending_failures > 0 {
        state
            .fail_registrations
            .store(pending_failures - 1, Ordering::SeqCst);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "Service temporarily unavailable" })),
        );
    }

    if body["email"] == TAKEN_EMAIL {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "message": "The email has already been taken.",
                "errors": { "email": ["The email has already been taken."] }
            })),
        );
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration received. Your account is pending approval.",
            "user": { "id": 1001, "status": "pending_approval" }
        })),
    )
}

/// Start the mock backend on an ephemeral port
pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(MockState::default());

    let app = Router::new()
        .route("/api/v1/auth/check-age", post(check_age))
        .route("/api/v1/users/search-by-phone", get(search_by_phone))
        .route("/api/v1/auth/register", post(register))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Mock backend has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock backend failed");
    });

    MockBackend {
        base_url: format!("http://{}/api/v1", addr),
        state,
    }
}

// =========================================================================
// Form helpers
// =========================================================================

/// Basic info filled for an applicant born on 1 January, `age` years ago
pub fn basic_info_aged(age: i32, email: &str) -> BasicInfoStep {
    let year = Utc::now().date_naive().year() - age;

    let mut step = BasicInfoStep::new();
    let identity = step.identity_mut();
    identity.first_name = "Eleni".to_string();
    identity.last_name = "Papadopoulou".to_string();
    identity.email = email.to_string();
    identity.phone = "6901234567".to_string();
    identity.password = "secret1".to_string();
    identity.password_confirmation = "secret1".to_string();
    *step.birth_date_mut() = BirthDateEntry::new("1", "1", format!("{:04}", year));
    step
}

pub fn signed_consent() -> ParentConsentStep {
    let mut step = ParentConsentStep::new();
    step.guardian = GuardianDetails {
        full_name: "Maria Papadopoulou".to_string(),
        father_first_name: "Nikos".to_string(),
        father_last_name: "Papadopoulos".to_string(),
        mother_first_name: "Maria".to_string(),
        mother_last_name: "Papadopoulou".to_string(),
        birth_date: "1980-03-14".to_string(),
        id_number: "AK123456".to_string(),
        phone: "6945678901".to_string(),
        location: "Thessaloniki".to_string(),
        street: "Tsimiski".to_string(),
        street_number: "10".to_string(),
        postal_code: "54624".to_string(),
        email: "maria@example.com".to_string(),
    };
    step.consent_accepted = true;

    step.begin_stroke(Point::new(20.0, 120.0));
    step.extend_stroke(Point::new(60.0, 80.0));
    step.extend_stroke(Point::new(140.0, 110.0));
    step.end_stroke();
    step
}

/// Medical history with no conditions, contact filled and liability accepted
pub fn minimal_medical() -> MedicalHistoryStep {
    let mut step = MedicalHistoryStep::new();
    step.emergency_contact_mut().name = "Nikos Papadopoulos".to_string();
    step.emergency_contact_mut().phone = "6977777777".to_string();
    step.set_liability_accepted(true);
    step
}
