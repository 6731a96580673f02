use axum::extract::rejection::JsonRejection;
use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::cli::ServeArgs;
use crate::config::Config;
use crate::core::donor::NewDonorData;
use crate::core::request::{NewRequestData, RequestSummaryInput};
use crate::core::types::{BloodType, UrgencyLevel};
use crate::digest::{summarize_requests, summarize_with_service, DigestSource};
use crate::directory::{
    donors_or_empty, hospitals_or_empty, requests_or_empty, DirectoryError, DonorDirectory,
    DonorFilter, HospitalDirectory, HospitalFilter, RequestDirectory, RequestFilter, RequestSort,
};
use crate::identity::{IdentityProvider, StaticIdentityProvider, UserProfile};
use crate::matching::{MatchRequest, MatchingConfig, MatchingEngine};
use crate::narrative::{self, TextService, TextServiceError};
use crate::utils::validation::{check_pool_limit, validate_text, MAX_LOCATION_LENGTH};

/// Security configuration constants to prevent `DoS` attacks
pub const MAX_BODY_SIZE: usize = 64 * 1024; // 64KB
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MAX_CONCURRENT_REQUESTS: usize = 100;

/// Shared application state
pub struct AppState {
    pub donors: Arc<dyn DonorDirectory>,
    pub requests: Arc<dyn RequestDirectory>,
    pub hospitals: Arc<dyn HospitalDirectory>,
    pub identity: Arc<dyn IdentityProvider>,
    pub text_service: Option<Arc<dyn TextService>>,
    pub matching: MatchingConfig,
    /// Accept submissions without a bearer token
    pub allow_anonymous: bool,
}

impl AppState {
    /// Build state from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be opened or the text service
    /// client cannot be built.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let directory = Arc::new(config.directory.open()?);
        let identity = StaticIdentityProvider::new(&config.identity.users);

        if identity.is_empty() && !config.identity.allow_anonymous {
            tracing::warn!("No identity users configured; submissions will be rejected");
        }

        let text_service = config
            .text_service
            .build()?
            .map(|s| Arc::new(s) as Arc<dyn TextService>);

        Ok(Self {
            donors: directory.clone(),
            requests: directory.clone(),
            hospitals: directory,
            identity: Arc::new(identity),
            text_service,
            matching: config.matching.clone(),
            allow_anonymous: config.identity.allow_anonymous,
        })
    }
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    // Log detailed error server-side for debugging (not exposed to client)
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None, // Never expose internal details to prevent information disclosure
    }
}

fn error_response(
    status: StatusCode,
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> Response {
    (
        status,
        Json(create_safe_error_response(
            error_type,
            user_message,
            internal_error,
        )),
    )
        .into_response()
}

fn directory_error_response(e: &DirectoryError) -> Response {
    match e {
        // Validation messages describe the caller's own input
        DirectoryError::Invalid(v) => {
            error_response(StatusCode::BAD_REQUEST, "validation_error", &v.to_string(), None)
        }
        DirectoryError::Full(_) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "directory_full",
            "The directory cannot accept more records",
            Some(&e.to_string()),
        ),
        _ => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "directory_error",
            "Failed to save the submission",
            Some(&e.to_string()),
        ),
    }
}

fn text_service_error_response(e: &TextServiceError) -> Response {
    let (status, message) = match e {
        TextServiceError::NotConfigured => (
            StatusCode::SERVICE_UNAVAILABLE,
            "The text service is not configured",
        ),
        TextServiceError::Timeout => (
            StatusCode::GATEWAY_TIMEOUT,
            "The text service did not respond in time",
        ),
        _ => (
            StatusCode::BAD_GATEWAY,
            "The text service could not produce a result",
        ),
    };
    error_response(status, "text_service_error", message, Some(&e.to_string()))
}

/// Run a directory write on a blocking thread. Creates persist with a
/// synchronous file write.
async fn create_blocking<T: Send + 'static>(
    create: impl FnOnce() -> Result<T, DirectoryError> + Send + 'static,
) -> Result<T, Response> {
    match tokio::task::spawn_blocking(create).await {
        Ok(Ok(id)) => Ok(id),
        Ok(Err(e)) => Err(directory_error_response(&e)),
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "directory_error",
            "Failed to save the submission",
            Some(&e.to_string()),
        )),
    }
}

fn json_rejection_response(rejection: &JsonRejection) -> Response {
    // Keeps axum's status (400, 413, 415 or 422) but not its message
    error_response(
        rejection.status(),
        "invalid_json",
        "Request body must be a JSON object of the expected shape",
        Some(&rejection.body_text()),
    )
}

/// Resolve the caller from an `Authorization: Bearer` header.
///
/// A missing token is allowed only in anonymous mode; a presented token must
/// always be valid.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<Option<UserProfile>, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let unauthorized = || {
        error_response(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "A valid bearer token is required",
            None,
        )
    };

    match token {
        Some(token) => state
            .identity
            .authenticate(token)
            .map(Some)
            .ok_or_else(unauthorized),
        None if state.allow_anonymous => Ok(None),
        None => Err(unauthorized()),
    }
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<&str>,
    field: &str,
) -> Result<Option<T>, Response>
where
    T::Err: std::fmt::Display,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some).map_err(|e: T::Err| {
            error_response(
                StatusCode::BAD_REQUEST,
                "validation_error",
                &format!("Invalid {field}: {e}"),
                None,
            )
        }),
        None => Ok(None),
    }
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server fails to start.
pub fn run(args: ServeArgs, config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;

    let address = args
        .address
        .unwrap_or_else(|| config.server.address.clone());
    let port = args.port.unwrap_or(config.server.port);

    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(state, &address, port).await })
}

/// Routes with the body-size limit but without rate limiting or timeouts
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/donors", get(list_donors_handler).post(create_donor_handler))
        .route(
            "/api/requests",
            get(list_requests_handler).post(create_request_handler),
        )
        .route("/api/hospitals", get(list_hospitals_handler))
        .route("/api/match", post(match_handler))
        .route("/api/digest", get(digest_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?;

    // Build router with comprehensive security layers
    let app = api_router(state).layer(
        ServiceBuilder::new()
            // Security headers for browser protection
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_static("max-age=31536000; includeSubDomains"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ))
            // IP-based rate limiting to prevent abuse
            .layer(GovernorLayer {
                config: Arc::new(governor_conf),
            })
            // Request timeout to prevent slow client attacks
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(REQUEST_TIMEOUT_SECS),
            ))
            // Limit concurrent requests to prevent DOS
            .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS)),
    );

    Ok(app)
}

async fn run_server(state: AppState, address: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(Arc::new(state))?;

    let addr = format!("{address}:{port}");
    println!("Starting donor-match API server at http://{addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Query parameters for donor listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DonorListParams {
    blood_type: Option<String>,
    location: Option<String>,
}

async fn list_donors_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DonorListParams>,
) -> Response {
    let blood_type = match parse_optional::<BloodType>(params.blood_type.as_deref(), "blood type") {
        Ok(bt) => bt,
        Err(response) => return response,
    };

    let filter = DonorFilter {
        blood_type,
        location: params.location,
    };
    let donors = filter.apply(donors_or_empty(state.donors.as_ref()));

    Json(serde_json::json!({
        "count": donors.len(),
        "donors": donors,
    }))
    .into_response()
}

async fn create_donor_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<NewDonorData>, JsonRejection>,
) -> Response {
    let user = match authorize(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Json(data) = match payload {
        Ok(p) => p,
        Err(rejection) => return json_rejection_response(&rejection),
    };

    let donors = Arc::clone(&state.donors);
    let id = match create_blocking(move || donors.create_donor(&data)).await {
        Ok(id) => id,
        Err(response) => return response,
    };

    tracing::info!(
        id = %id,
        user = user.as_ref().map_or("anonymous", |u| u.id.as_str()),
        "Donor registered via API"
    );
    (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response()
}

/// Query parameters for request listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestListParams {
    blood_type: Option<String>,
    location: Option<String>,
    urgency: Option<String>,
    sort: Option<String>,
}

async fn list_requests_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RequestListParams>,
) -> Response {
    let parsed = parse_optional::<BloodType>(params.blood_type.as_deref(), "blood type")
        .and_then(|bt| {
            parse_optional::<UrgencyLevel>(params.urgency.as_deref(), "urgency").map(|u| (bt, u))
        })
        .and_then(|(bt, u)| {
            parse_optional::<RequestSort>(params.sort.as_deref(), "sort").map(|s| (bt, u, s))
        });
    let (blood_type, urgency, sort) = match parsed {
        Ok(p) => p,
        Err(response) => return response,
    };

    let filter = RequestFilter {
        blood_type,
        location: params.location,
        urgency,
    };
    let requests = filter.apply(
        requests_or_empty(state.requests.as_ref()),
        sort.unwrap_or_default(),
    );

    Json(serde_json::json!({
        "count": requests.len(),
        "requests": requests,
    }))
    .into_response()
}

async fn create_request_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<NewRequestData>, JsonRejection>,
) -> Response {
    let user = match authorize(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Json(data) = match payload {
        Ok(p) => p,
        Err(rejection) => return json_rejection_response(&rejection),
    };

    let requests = Arc::clone(&state.requests);
    let id = match create_blocking(move || requests.create_request(&data)).await {
        Ok(id) => id,
        Err(response) => return response,
    };

    tracing::info!(
        id = %id,
        user = user.as_ref().map_or("anonymous", |u| u.id.as_str()),
        "Request posted via API"
    );
    (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response()
}

async fn list_hospitals_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<HospitalFilter>,
) -> Response {
    let hospitals = filter.apply(hospitals_or_empty(state.hospitals.as_ref()));

    Json(serde_json::json!({
        "count": hospitals.len(),
        "hospitals": hospitals,
    }))
    .into_response()
}

/// Body of `POST /api/match`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchBody {
    blood_type: String,
    #[serde(default)]
    location: String,
    urgency: String,
    /// Overrides the configured result cap
    max_results: Option<usize>,
    /// `"service"` asks the text service to explain the matches
    explain: Option<String>,
}

async fn match_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MatchBody>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(rejection) => return json_rejection_response(&rejection),
    };

    let request = match parse_match_body(&body) {
        Ok(r) => r,
        Err(message) => {
            return error_response(StatusCode::BAD_REQUEST, "validation_error", &message, None)
        }
    };

    let donors = donors_or_empty(state.donors.as_ref());
    if let Some(message) = check_pool_limit(donors.len()) {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "pool_too_large",
            "The donor pool is too large to rank",
            Some(&message),
        );
    }

    let config = MatchingConfig {
        result_cap: body.max_results.or(state.matching.result_cap),
    };
    let report = MatchingEngine::with_config(&donors, config).find_matches(&request);

    let mut response = serde_json::json!({
        "request": request,
        "urgency_weight": report.urgency_weight,
        "compatible_count": report.compatible_count,
        "truncated": report.truncated,
        "matches": report.candidates,
    });

    if body.explain.as_deref() == Some("service") {
        let explanation = match &state.text_service {
            Some(service) => narrative::suggest_matches(service.as_ref(), &request, &donors).await,
            None => Err(TextServiceError::NotConfigured),
        };

        // The ranking stands on its own; explanation failures are reported alongside it
        response["explanation"] = match explanation {
            Ok(suggestions) => serde_json::json!({
                "source": DigestSource::Service,
                "suggested_donors": suggestions,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Match explanation unavailable");
                serde_json::json!({ "error": e.to_string() })
            }
        };
    }

    Json(response).into_response()
}

fn parse_match_body(body: &MatchBody) -> Result<MatchRequest, String> {
    let blood_type: BloodType = body.blood_type.parse().map_err(|e| format!("{e}"))?;
    let urgency: UrgencyLevel = body.urgency.parse().map_err(|e| format!("{e}"))?;

    // An empty location is allowed and only matches empty donor locations
    let location = if body.location.trim().is_empty() {
        String::new()
    } else {
        validate_text("location", &body.location, MAX_LOCATION_LENGTH).map_err(|e| e.to_string())?
    };

    if body.max_results == Some(0) {
        return Err("maxResults must be at least 1".to_string());
    }

    Ok(MatchRequest::new(blood_type, location, urgency))
}

/// Query parameters for the digest endpoint
#[derive(Debug, Default, Deserialize)]
struct DigestParams {
    /// `service` or `local`; defaults to the service when one is configured
    source: Option<String>,
    /// `fail` (default) or `local`
    on_error: Option<String>,
}

async fn digest_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DigestParams>,
) -> Response {
    let want_service = match params.source.as_deref() {
        None => state.text_service.is_some(),
        Some("service") => true,
        Some("local") => false,
        Some(other) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "validation_error",
                &format!("Invalid source '{other}' (expected service or local)"),
                None,
            )
        }
    };
    let fallback_to_local = match params.on_error.as_deref() {
        None | Some("fail") => false,
        Some("local") => true,
        Some(other) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "validation_error",
                &format!("Invalid on_error '{other}' (expected fail or local)"),
                None,
            )
        }
    };

    let inputs: Vec<RequestSummaryInput> = requests_or_empty(state.requests.as_ref())
        .iter()
        .map(|r| r.summary_input())
        .collect();

    let local_digest = |fallback_reason: Option<String>| {
        Json(serde_json::json!({
            "digest": summarize_requests(&inputs),
            "source": DigestSource::Local,
            "request_count": inputs.len(),
            "fallback_reason": fallback_reason,
        }))
        .into_response()
    };

    if !want_service {
        return local_digest(None);
    }

    let result = match &state.text_service {
        Some(service) => summarize_with_service(service.as_ref(), &inputs).await,
        None => Err(TextServiceError::NotConfigured),
    };

    match result {
        Ok(digest) => Json(serde_json::json!({
            "digest": digest,
            "source": DigestSource::Service,
            "request_count": inputs.len(),
            "fallback_reason": null,
        }))
        .into_response(),
        Err(e) if fallback_to_local => {
            tracing::warn!(error = %e, "Text service digest failed, using local digest");
            local_digest(Some(e.to_string()))
        }
        Err(e) => text_service_error_response(&e),
    }
}
