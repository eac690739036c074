#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use bearer_gateway::{_preludet::*, http::RequestOptions};

#[tokio::test]
async fn bearer_header_is_attached_and_success_passes_through() {
	let server = MockServer::start_async().await;
	let (gateway, _store) = build_reqwest_test_gateway(&server.base_url());

	seed_credentials(&gateway.vault, "access-live", "refresh-live").await;

	let data = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/admin/dashboard")
				.header("authorization", "Bearer access-live");
			then.status(200).header("content-type", "application/json").body("{\"ok\":true}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/admin/auth/refresh");
			then.status(200);
		})
		.await;
	let response = gateway
		.request("/api/admin/dashboard", RequestOptions::get())
		.await
		.expect("Authenticated request should succeed.");

	data.assert_async().await;
	refresh.assert_calls_async(0).await;

	assert_eq!(response.status, 200);
	assert_eq!(response.body, b"{\"ok\":true}");
}

#[tokio::test]
async fn non_auth_statuses_pass_through_without_refresh() {
	for status in [200u16, 404, 500] {
		let server = MockServer::start_async().await;
		let (gateway, _store) = build_reqwest_test_gateway(&server.base_url());

		seed_credentials(&gateway.vault, "access-live", "refresh-live").await;

		let data = server
			.mock_async(move |when, then| {
				when.method(GET).path("/api/admin/sessions");
				then.status(status).body("payload");
			})
			.await;
		let refresh = server
			.mock_async(|when, then| {
				when.method(POST).path("/api/admin/auth/refresh");
				then.status(200);
			})
			.await;
		let response = gateway
			.request("/api/admin/sessions", RequestOptions::get())
			.await
			.expect("Non-auth statuses should pass through as responses, not errors.");

		data.assert_async().await;
		refresh.assert_calls_async(0).await;

		assert_eq!(response.status, status);
		assert_eq!(response.body, b"payload");
	}
}

#[tokio::test]
async fn json_payloads_are_posted_with_their_content_type() {
	let server = MockServer::start_async().await;
	let (gateway, _store) = build_reqwest_test_gateway(&server.base_url());

	seed_credentials(&gateway.vault, "access-live", "refresh-live").await;

	let data = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/admin/events")
				.header("content-type", "application/json")
				.header("authorization", "Bearer access-live")
				.json_body(serde_json::json!({ "title": "Open day" }));
			then.status(201).body("{\"id\":\"evt-1\"}");
		})
		.await;
	let options = RequestOptions::post_json(&serde_json::json!({ "title": "Open day" }))
		.expect("JSON options should serialize a plain object.");
	let response = gateway
		.request("/api/admin/events", options)
		.await
		.expect("JSON POST should succeed.");

	data.assert_async().await;

	assert_eq!(response.status, 201);
}
