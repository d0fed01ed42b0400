use axum::{
	Form, Json, Router,
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use disco_service::{DiscoveryRequest, DiscoveryResponse, Error as ServiceError};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/discovery", get(discover_query).post(discover_form))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/metadata_updated", post(metadata_updated)).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn discover_query(
	State(state): State<AppState>,
	Query(params): Query<DiscoveryRequest>,
) -> Result<Json<DiscoveryResponse>, ApiError> {
	Ok(Json(state.service.discover(params).await?))
}

async fn discover_form(
	State(state): State<AppState>,
	Form(params): Form<DiscoveryRequest>,
) -> Result<Json<DiscoveryResponse>, ApiError> {
	Ok(Json(state.service.discover(params).await?))
}

async fn metadata_updated(State(state): State<AppState>) -> StatusCode {
	state.service.metadata_updated().await;

	StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: &'static str,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, error_code) = match &err {
			ServiceError::StoreUnavailable { .. } =>
				(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
			ServiceError::QueryFailed { .. } =>
				(StatusCode::INTERNAL_SERVER_ERROR, "query_failed"),
			ServiceError::DecodeFailed { .. } =>
				(StatusCode::INTERNAL_SERVER_ERROR, "decode_failed"),
		};

		tracing::warn!(error = %err, error_code, "Discovery lookup failed.");

		Self { status, error_code, message: err.to_string() }
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
