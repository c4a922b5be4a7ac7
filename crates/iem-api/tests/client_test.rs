#![allow(clippy::unwrap_used)]
// Integration tests for `IemClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use iem_api::{
    BearerToken, ConfigFile, Error, IemClient, NewConfiguration, Outcome, TRANSPORT_STATUS,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, IemClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = IemClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn token() -> BearerToken {
    BearerToken::new("tok123")
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/portal/api/v1/login/direct"))
        .and(body_string_contains("\"username\":\"admin\""))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"access_token": "tok123"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "pw".to_string().into();
    let result = client.login_direct("admin", &secret).await;
    let outcome = Outcome::from_result(&result);

    assert!(outcome.success);
    assert_eq!(outcome.status_code, 200);
    assert_eq!(outcome.label, "bearertoken");
    assert_eq!(outcome.payload, json!("tok123"));
    assert_eq!(result.unwrap().payload, token());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/portal/api/v1/login/direct"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"errors": [{"message": "bad creds"}]})),
        )
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong".to_string().into();
    let outcome = Outcome::from_result(&client.login_direct("admin", &secret).await);

    assert_eq!(
        outcome,
        Outcome {
            success: false,
            status_code: 401,
            label: "Error Message".into(),
            payload: json!("bad creds"),
        }
    );
}

#[tokio::test]
async fn test_login_missing_token_is_malformed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/portal/api/v1/login/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "pw".to_string().into();
    let result = client.login_direct("admin", &secret).await;

    match result {
        Err(Error::Malformed { label, pointer, .. }) => {
            assert_eq!(label, "bearertoken");
            assert_eq!(pointer, "/data/access_token");
        }
        other => panic!("expected Malformed error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_logout() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/p.service/api/v4/logout"))
        .and(header("Authorization", "tok123"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let response = client.logout(&token()).await.unwrap();
    assert_eq!(response.payload, "Logout was successful.");
}

// ── Transport failures ──────────────────────────────────────────────

#[tokio::test]
async fn test_network_failure_reports_minus_one() {
    // Nothing listens on port 1; every call fails before a response.
    let client = IemClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:1").unwrap(),
    );

    let secret: secrecy::SecretString = "pw".to_string().into();
    let calls = [
        Outcome::from_result(&client.login_direct("admin", &secret).await),
        Outcome::from_result(&client.list_apps(&token()).await),
        Outcome::from_result(&client.list_all_devices(&token()).await),
        Outcome::from_result(&client.deploy_app(&token(), "a", "v", "d").await),
    ];

    for outcome in calls {
        assert!(!outcome.success);
        assert_eq!(outcome.status_code, TRANSPORT_STATUS);
        assert_eq!(outcome.label, "error");
    }
}

// ── Applications ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_apps() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/portal/api/v1/applications"))
        .and(header("Authorization", "tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "applicationId": "app-1", "title": "Flow Creator", "iconUrl": "x.png" },
                { "applicationId": "app-2", "title": "Data Service" }
            ]
        })))
        .mount(&server)
        .await;

    let response = client.list_apps(&token()).await.unwrap();

    assert_eq!(response.label, "Apps list");
    assert_eq!(response.payload.len(), 2);
    assert_eq!(response.payload[0].title, "Flow Creator");
    assert_eq!(response.payload[1].application_id, "app-2");
}

#[tokio::test]
async fn test_rejection_without_envelope_uses_raw_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/portal/api/v1/applications"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal meltdown"))
        .mount(&server)
        .await;

    let err = client.list_apps(&token()).await.unwrap_err();

    assert_eq!(err.status_code(), 500);
    assert_eq!(err.message(), "internal meltdown");
}

#[tokio::test]
async fn test_non_200_success_codes_are_rejections() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/portal/api/v1/applications"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let outcome = Outcome::from_result(&client.list_apps(&token()).await);
    assert!(!outcome.success);
    assert_eq!(outcome.status_code, 204);
}

#[tokio::test]
async fn test_app_id_by_title_encodes_name() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/p.service/api/v4/applications/names/Flow%20Creator"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"applicationId": "app-1"}})),
        )
        .mount(&server)
        .await;

    let response = client.app_id_by_title(&token(), "Flow Creator").await.unwrap();
    assert_eq!(response.label, "appId");
    assert_eq!(response.payload, "app-1");
}

#[tokio::test]
async fn test_newest_app_version_id() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/p.service/api/v4/dev-apps/app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "devappdetail": { "versions": [
                { "versionId": "v-new" }, { "versionId": "v-old" }
            ]}}
        })))
        .mount(&server)
        .await;

    let response = client.newest_app_version_id(&token(), "app-1").await.unwrap();
    assert_eq!(response.payload, "v-new");
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_all_devices_uses_fixed_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/portal/api/v1/devices"))
        .and(query_param("size", "100"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "deviceId": "d-1", "deviceName": "edge-01" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client.list_all_devices(&token()).await.unwrap();
    assert_eq!(response.payload[0].device_name, "edge-01");
}

#[tokio::test]
async fn test_list_installed_apps() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/portal/api/v1/devices/installed-apps"))
        .and(query_param("deviceid", "d-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "applicationId": "app-9", "title": "Notifier" }]
        })))
        .mount(&server)
        .await;

    let response = client.list_installed_apps(&token(), "d-1").await.unwrap();
    assert_eq!(response.label, "Installed Apps");
    assert_eq!(response.payload[0].title, "Notifier");
}

#[tokio::test]
async fn test_device_id_by_name() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/p.service/api/v4/devices/edge-07/discovery"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"discoveryDetails": {"deviceId": "d-7"}})),
        )
        .mount(&server)
        .await;

    let response = client.device_id_by_name(&token(), "edge-07").await.unwrap();
    assert_eq!(response.payload, "d-7");
}

#[tokio::test]
async fn test_create_device_returns_raw_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/p.service/api/v4/devices/create"))
        .and(body_string_contains("edge-new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ONBOARDING-BLOB"))
        .mount(&server)
        .await;

    let response = client
        .create_device(&token(), &json!({"deviceName": "edge-new"}))
        .await
        .unwrap();
    assert_eq!(response.label, "onboardingFile");
    assert_eq!(response.payload, "ONBOARDING-BLOB");
}

// ── Batches ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_install_app_sends_info_map_and_schedule() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/portal/api/v1/batches"))
        .and(query_param("appid", "app-1"))
        .and(query_param("operation", "installApplication"))
        .and(query_param("schedule", "1704067200000000"))
        .and(body_string_contains("infoMap"))
        .and(body_string_contains(r#"{"devices":["d-1"]}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "batch-42"})))
        .expect(1)
        .mount(&server)
        .await;

    let at = "2024-01-01T00:00:00Z".parse().unwrap();
    let response = client
        .install_app(&token(), "d-1", "app-1", Some(at))
        .await
        .unwrap();
    assert_eq!(response.label, "Install App Batch ID");
    assert_eq!(response.payload, json!("batch-42"));
}

#[tokio::test]
async fn test_uninstall_app() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/portal/api/v1/batches"))
        .and(query_param("operation", "uninstallApplication"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "batch-43"})))
        .mount(&server)
        .await;

    let response = client
        .uninstall_app(&token(), "d-1", "app-1", None)
        .await
        .unwrap();
    assert_eq!(response.label, "Uninstall App Batch ID");
}

#[tokio::test]
async fn test_deploy_succeeds_regardless_of_batch_content() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/p.service/api/v4/applications/app-1/versions/v-1/batch"))
        .and(query_param("operation", "installApplication"))
        .and(query_param("isRetainSecret", "false"))
        .and(query_param("allow", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("whatever"))
        .mount(&server)
        .await;

    let outcome = Outcome::from_result(&client.deploy_app(&token(), "app-1", "v-1", "d-1").await);
    assert!(outcome.success);
    assert_eq!(outcome.payload, json!("Application Download was triggered."));
}

// ── Configurations ──────────────────────────────────────────────────

#[tokio::test]
async fn test_add_versioned_configuration() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/p.service/api/v4/applications/app-1/configs"))
        .and(body_string_contains(r#""versioned":"true""#))
        .and(body_string_contains(r#""secured":"false""#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"appConfigId": "cfg-1"}})),
        )
        .mount(&server)
        .await;

    let config = NewConfiguration {
        display_name: "settings".into(),
        description: "runtime settings".into(),
        vol_path: "/cfg-data/".into(),
        relative_path: "settings/".into(),
    };
    let response = client
        .add_versioned_configuration(&token(), "app-1", &config)
        .await
        .unwrap();
    assert_eq!(response.payload, "cfg-1");
}

#[tokio::test]
async fn test_upload_configuration_file() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/p.service/api/v4/applications/app-1/configs/cfg-1/versions"))
        .and(body_string_contains("configversion"))
        .and(body_string_contains(r#"{"level":"debug"}"#))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let file = ConfigFile {
        reference_name: "v2".into(),
        description: "debug logging".into(),
        filename: "settings.json".into(),
        content: r#"{"level":"debug"}"#.into(),
    };
    let response = client
        .upload_configuration_file(&token(), "app-1", "cfg-1", &file)
        .await
        .unwrap();
    assert_eq!(response.payload, "Upload was successful.");
}

#[tokio::test]
async fn test_list_categories_needs_no_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/p.service/api/v4/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "categoryId": "cat-1", "name": "Monitoring" }]
        })))
        .mount(&server)
        .await;

    let response = client.list_categories().await.unwrap();
    assert_eq!(response.payload[0].category_id, "cat-1");
}
