use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header},
};
use serde_json::Value;
use tower::util::ServiceExt;

use disco_api::{routes, state::AppState};
use disco_testkit::{IdpFixture, SpFixture, TestStores};

const SP: &str = "https://sp.example.org";

async fn fixture() -> (TestStores, AppState) {
	let idps = [
		IdpFixture::new("https://idp.alpha.example").display_name("en", "Alpha University").fed("fed1"),
		IdpFixture::new("https://idp.beta.example").display_name("en", "Beta College").fed("fed2"),
	];
	let sps = [SpFixture::new(SP).display_name("en", "Example Service").fed("fed1")];
	let stores = TestStores::new(&idps, &sps).await.expect("Failed to build stores.");
	let state = AppState::new(stores.config());

	(stores, state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.oneshot(request).await.expect("Failed to call the router.");
	let status = response.status();
	let bytes =
		body::to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body.");
	let json = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).expect("Response must be JSON.")
	};

	(status, json)
}

#[tokio::test]
async fn health_ok() {
	let (_stores, state) = fixture().await;
	let (status, _) = send(
		routes::router(state),
		Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request."),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn get_lookup_returns_result_json() {
	let (_stores, state) = fixture().await;
	let uri = "/v1/discovery?entityID=https%3A%2F%2Fsp.example.org&query=alpha";
	let (status, json) = send(
		routes::router(state),
		Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request."),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["spok"], true);
	assert_eq!(json["found"], 1);
	assert_eq!(json["rows"], 1);
	assert_eq!(json["feds"][0], "fed1");
	assert_eq!(json["idps"][0]["entityID"], "https://idp.alpha.example");
	assert_eq!(json["idps"][0]["DisplayNames"]["en"], "Alpha University");
	assert_eq!(json["sp"]["entityID"], SP);
	assert_eq!(json["sp"]["DisplayNames"]["en"], "Example Service");
}

#[tokio::test]
async fn post_form_lookup_matches_get() {
	let (_stores, state) = fixture().await;
	let (status, json) = send(
		routes::router(state),
		Request::builder()
			.method("POST")
			.uri("/v1/discovery")
			.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
			.body(Body::from("feds=fed2&query=beta"))
			.expect("Failed to build request."),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["spok"], true);
	assert_eq!(json["idps"][0]["entityID"], "https://idp.beta.example");
}

#[tokio::test]
async fn unknown_sp_is_reported_not_failed() {
	let (_stores, state) = fixture().await;
	let (status, json) = send(
		routes::router(state),
		Request::builder()
			.uri("/v1/discovery?entityID=https%3A%2F%2Funknown.example")
			.body(Body::empty())
			.expect("Failed to build request."),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["spok"], false);
	assert_eq!(json["found"], 0);
}

#[tokio::test]
async fn missing_index_maps_to_service_unavailable() {
	let stores = TestStores::empty().expect("Failed to create store directory.");
	let state = AppState::new(stores.config());
	let (status, json) = send(
		routes::router(state),
		Request::builder().uri("/v1/discovery").body(Body::empty()).expect("Failed to build request."),
	)
	.await;

	assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(json["error_code"], "store_unavailable");
}

#[tokio::test]
async fn admin_signal_invalidates_store_handles() {
	let (_stores, state) = fixture().await;
	let (status, _) = send(
		routes::router(state.clone()),
		Request::builder().uri("/v1/discovery").body(Body::empty()).expect("Failed to build request."),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert!(state.service.stores.is_idp_open().await);

	let (status, _) = send(
		routes::admin_router(state.clone()),
		Request::builder()
			.method("POST")
			.uri("/v1/admin/metadata_updated")
			.body(Body::empty())
			.expect("Failed to build request."),
	)
	.await;

	assert_eq!(status, StatusCode::NO_CONTENT);
	assert!(!state.service.stores.is_idp_open().await);
}
