//! StudyGate API Module
//! Decision endpoint for request pipelines running out of process

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};

use crate::engine::audit::{AuditEntry, AuditLog};
use crate::engine::error::AuthzError;
use crate::engine::rbac::{permissions_for, Claims, Enforcer, OwnableResource, ResourceRef, Role};

#[derive(Clone)]
pub struct ApiState {
    pub enforcer: Arc<Enforcer>,
    pub audit: Option<Arc<AuditLog>>,
}

impl ApiState {
    pub fn new(enforcer: Enforcer) -> Self {
        Self {
            enforcer: Arc::new(enforcer),
            audit: None,
        }
    }

    pub fn with_audit(mut self, log: AuditLog) -> Self {
        self.audit = Some(Arc::new(log));
        self
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list_policies,
        role_permissions,
        authorize,
    ),
    tags(
        (name = "policies", description = "Policy catalog"),
        (name = "decisions", description = "Authorization decisions"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/policies", get(list_policies))
        .route("/api/roles/{role}/permissions", get(role_permissions))
        .route("/api/authorize", post(authorize))
        .route("/api/health", get(health_check))
        .route("/api/openapi.json", get(openapi_doc))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: ApiState, host: &str, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Decision API listening");
    axum::serve(listener, create_router(state)).await
}

type ApiError = (StatusCode, Json<Value>);

fn error_response(err: &AuthzError) -> ApiError {
    let status = match err {
        AuthzError::UnknownPolicy(_) | AuthzError::UnknownRole(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn openapi_doc() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PolicyInfo {
    pub name: String,
    pub requirement: String,
}

#[utoipa::path(
    get,
    path = "/api/policies",
    responses(
        (status = 200, description = "Registered policies in registration order", body = Vec<PolicyInfo>)
    ),
    tag = "policies"
)]
async fn list_policies(State(state): State<ApiState>) -> Json<Vec<PolicyInfo>> {
    let policies = state
        .enforcer
        .registry()
        .iter()
        .map(|(name, requirement)| PolicyInfo {
            name: name.to_string(),
            requirement: requirement.to_string(),
        })
        .collect();
    Json(policies)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RolePermissionsResponse {
    pub role: String,
    pub permissions: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/roles/{role}/permissions",
    params(
        ("role" = String, Path, description = "Role name or numeric code"),
    ),
    responses(
        (status = 200, description = "Permissions granted to the role", body = RolePermissionsResponse),
        (status = 404, description = "Unknown role", body = Value)
    ),
    tag = "policies"
)]
async fn role_permissions(
    Path(role): Path<String>,
) -> Result<Json<RolePermissionsResponse>, ApiError> {
    let role: Role = role.parse().map_err(|e| error_response(&e))?;
    Ok(Json(RolePermissionsResponse {
        role: role.to_string(),
        permissions: permissions_for(role).iter().map(|p| p.to_string()).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    #[serde(default, deserialize_with = "scalar_claims")]
    pub claims: Claims,
    pub policy: String,
    #[serde(default)]
    pub resource: Option<ResourceRef>,
}

/// Scalar claim values are stringified; null and structured values are dropped
fn scalar_claims<'de, D>(deserializer: D) -> Result<Claims, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: HashMap<String, Value> = HashMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key, value))
        })
        .collect())
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorizeResponse {
    pub allowed: bool,
    pub decision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/authorize",
    request_body(
        content = Value,
        description = "claims (scalar values, stringified), policy name, optional resource ownership"
    ),
    responses(
        (status = 200, description = "Decision for the caller", body = AuthorizeResponse),
        (status = 404, description = "Unknown policy", body = Value)
    ),
    tag = "decisions"
)]
async fn authorize(
    State(state): State<ApiState>,
    Json(request): Json<AuthorizeRequest>,
) -> Result<Json<AuthorizeResponse>, ApiError> {
    let decision = {
        let resource = request.resource.as_ref().map(|r| r as &dyn OwnableResource);
        state
            .enforcer
            .evaluate_with_resource(&request.claims, &request.policy, resource)
    }
    .map_err(|e| error_response(&e))?;

    if let Some(log) = state.audit.clone() {
        let mut entry = AuditEntry::new(&request.policy, decision)
            .with_claims(&request.claims, state.enforcer.claim_keys());
        if let Some(resource) = &request.resource {
            entry = entry.with_resource(json!(resource));
        }
        match tokio::task::spawn_blocking(move || log.append(&entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Failed to append decision to audit log"),
            Err(e) => tracing::error!(error = %e, "Audit append task failed"),
        }
    }

    Ok(Json(AuthorizeResponse {
        allowed: decision.is_allowed(),
        decision: if decision.is_allowed() { "allow" } else { "deny" }.to_string(),
        reason: decision.reason().map(|r| r.code().to_string()),
    }))
}
