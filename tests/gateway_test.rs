//! Tests for the gateway, authentication and retry with mocked HTTP responses.

mod common;

use common::{config_for, gateway_with_token, machine_config_for, mock_user_token, BASIC_AUTH};
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use syncplicity_sample::Gateway;

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_authenticate_stores_user_token() {
        let mut server = Server::new_async().await;
        let token_mock = mock_user_token(&mut server, "user-token").await;

        let gateway = Gateway::new(config_for(&server)).unwrap();
        assert!(!gateway.is_authenticated().await);

        gateway.authenticate().await;

        token_mock.assert_async().await;
        assert!(gateway.is_authenticated().await);
        assert_eq!(gateway.session().access_token().await, "user-token");
        assert_eq!(gateway.session().company_id().await, "company-1");
        assert!(gateway.session().machine_access_token().await.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_with_machine_token() {
        let mut server = Server::new_async().await;
        let user_mock = mock_user_token(&mut server, "user-token").await;
        let machine_mock = server
            .mock("POST", "/oauth/token")
            .match_header("authorization", BASIC_AUTH)
            .match_header("sync-machine-token", "machine-secret")
            .match_header("sync-app-token", Matcher::Missing)
            .match_body("grant_type=client_credentials")
            .with_status(200)
            .with_body(r#"{"access_token":"machine-access","user_company_id":"company-1"}"#)
            .expect(1)
            .create_async()
            .await;

        let gateway = Gateway::new(machine_config_for(&server)).unwrap();
        gateway.authenticate().await;

        user_mock.assert_async().await;
        machine_mock.assert_async().await;
        assert_eq!(gateway.session().access_token().await, "user-token");
        assert_eq!(
            gateway.session().machine_access_token().await,
            "machine-access"
        );
    }

    #[tokio::test]
    async fn test_rejected_token_call_is_not_retried() {
        let mut server = Server::new_async().await;
        let token_mock = server
            .mock("POST", "/oauth/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_client"}"#)
            .expect(1)
            .create_async()
            .await;

        let gateway = Gateway::new(config_for(&server)).unwrap();
        gateway.authenticate().await;

        token_mock.assert_async().await;
        assert!(!gateway.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_unparseable_token_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let gateway = Gateway::new(config_for(&server)).unwrap();
        gateway.authenticate().await;

        assert!(!gateway.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_revoke_clears_session() {
        let mut server = Server::new_async().await;
        let revoke_mock = server
            .mock("GET", "/oauth/revoke")
            .match_header("authorization", "Bearer user-token")
            .match_header("appkey", "app-key")
            .with_status(200)
            .with_body("")
            .expect(1)
            .create_async()
            .await;

        let gateway = gateway_with_token(config_for(&server), "user-token").await;
        assert!(gateway.is_authenticated().await);

        gateway.revoke_token().await;

        revoke_mock.assert_async().await;
        assert!(!gateway.is_authenticated().await);
    }
}

mod requests {
    use super::*;

    #[tokio::test]
    async fn test_bearer_headers_on_regular_calls() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/syncpoint/syncpoint.svc/7")
            .match_header("authorization", "Bearer user-token")
            .match_header("appkey", "app-key")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_body(json!({"Id": 7, "Name": "Docs"}).to_string())
            .expect(1)
            .create_async()
            .await;

        let gateway = gateway_with_token(config_for(&server), "user-token").await;
        let url = gateway.config().api_url("syncpoint/syncpoint.svc/7");
        let result: Option<Value> = gateway.get(&url, &[], false, false).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap()["Name"], "Docs");
    }

    #[tokio::test]
    async fn test_empty_body_yields_none() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/syncpoint/syncpoint.svc/7")
            .with_status(200)
            .with_body("  \n")
            .create_async()
            .await;

        let gateway = gateway_with_token(config_for(&server), "user-token").await;
        let url = gateway.config().api_url("syncpoint/syncpoint.svc/7");
        let result: Option<Value> = gateway.get(&url, &[], false, false).await;

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_body_yields_none() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/syncpoint/syncpoint.svc/7")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let gateway = gateway_with_token(config_for(&server), "user-token").await;
        let url = gateway.config().api_url("syncpoint/syncpoint.svc/7");
        let result: Option<Value> = gateway.get(&url, &[], true, false).await;

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_post_json_sends_entity() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/syncpoint/syncpoints.svc/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!([{"Name": "Docs"}])))
            .with_status(200)
            .with_body(json!([{"Id": 1, "Name": "Docs"}]).to_string())
            .expect(1)
            .create_async()
            .await;

        let gateway = gateway_with_token(config_for(&server), "user-token").await;
        let url = gateway.config().api_url("syncpoint/syncpoints.svc/");
        let result: Option<Vec<Value>> = gateway
            .post_json(&url, &json!([{"Name": "Docs"}]))
            .await;

        mock.assert_async().await;
        assert_eq!(result.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_post_raw_body_with_machine_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/storage/echo")
            .match_header("authorization", "Bearer machine-access")
            .match_header("content-type", "text/plain")
            .match_header("x-trace", "1")
            .match_body("hello")
            .with_status(200)
            .with_body(r#"{"echo":"hello"}"#)
            .expect(1)
            .create_async()
            .await;

        let gateway = gateway_with_token(machine_config_for(&server), "user-token").await;
        gateway
            .session()
            .set_machine_access_token(Some("machine-access".to_string()))
            .await;
        let url = gateway.config().api_url("storage/echo");
        let result: Option<Value> = gateway
            .post(false, false, true, &url, "text/plain", "hello", &[("X-Trace", "1")])
            .await;

        mock.assert_async().await;
        assert_eq!(result.unwrap()["echo"], "hello");
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mut server = Server::new_async().await;
        let request_mock = server
            .mock("GET", "/syncpoint/syncpoints.svc/")
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;
        let token_mock = server
            .mock("POST", "/oauth/token")
            .expect(0)
            .create_async()
            .await;

        let gateway = gateway_with_token(config_for(&server), "user-token").await;
        let url = gateway.config().api_url("syncpoint/syncpoints.svc/");
        let result: Option<Value> = gateway.get(&url, &[], false, false).await;

        assert!(result.is_none());
        request_mock.assert_async().await;
        token_mock.assert_async().await;
    }
}

mod retry {
    use super::*;

    #[tokio::test]
    async fn test_unauthorized_reauthenticates_and_retries() {
        let mut server = Server::new_async().await;
        let stale_mock = server
            .mock("GET", "/syncpoint/syncpoints.svc/")
            .match_header("authorization", "Bearer stale-token")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let fresh_mock = server
            .mock("GET", "/syncpoint/syncpoints.svc/")
            .match_header("authorization", "Bearer new-token")
            .with_status(200)
            .with_body(json!([{"Id": 1}]).to_string())
            .expect(1)
            .create_async()
            .await;
        let token_mock = mock_user_token(&mut server, "new-token").await;

        let gateway = gateway_with_token(config_for(&server), "stale-token").await;
        let url = gateway.config().api_url("syncpoint/syncpoints.svc/");
        let result: Option<Vec<Value>> = gateway.get(&url, &[], false, false).await;

        assert_eq!(result.unwrap().len(), 1);
        stale_mock.assert_async().await;
        fresh_mock.assert_async().await;
        token_mock.assert_async().await;
        assert_eq!(gateway.session().access_token().await, "new-token");
    }

    #[tokio::test]
    async fn test_retries_only_once() {
        let mut server = Server::new_async().await;
        let request_mock = server
            .mock("GET", "/syncpoint/syncpoints.svc/")
            .with_status(401)
            .expect(2)
            .create_async()
            .await;
        let token_mock = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body(r#"{"access_token":"new-token","user_company_id":"company-1"}"#)
            .expect(1)
            .create_async()
            .await;

        let gateway = gateway_with_token(config_for(&server), "stale-token").await;
        let url = gateway.config().api_url("syncpoint/syncpoints.svc/");
        let result: Option<Value> = gateway.get(&url, &[], false, false).await;

        assert!(result.is_none());
        request_mock.assert_async().await;
        token_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_reauthentication_skips_retry() {
        let mut server = Server::new_async().await;
        let request_mock = server
            .mock("DELETE", "/syncpoint/syncpoint.svc/7")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let token_mock = server
            .mock("POST", "/oauth/token")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let gateway = gateway_with_token(config_for(&server), "stale-token").await;
        let url = gateway.config().api_url("syncpoint/syncpoint.svc/7");
        let result: Option<Value> = gateway.delete(&url).await;

        assert!(result.is_none());
        assert!(!gateway.is_authenticated().await);
        request_mock.assert_async().await;
        token_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_machine_grant_skips_retry() {
        let mut server = Server::new_async().await;
        let stale_mock = server
            .mock("GET", "/storage/vault")
            .match_header("authorization", "Bearer old-machine")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let empty_bearer_mock = server
            .mock("GET", "/storage/vault")
            .match_header("authorization", Matcher::Regex(r"^Bearer\s*$".to_string()))
            .expect(0)
            .create_async()
            .await;
        let user_mock = mock_user_token(&mut server, "new-token").await;
        let machine_mock = server
            .mock("POST", "/oauth/token")
            .match_header("sync-machine-token", "machine-secret")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let gateway = gateway_with_token(machine_config_for(&server), "stale-token").await;
        gateway
            .session()
            .set_machine_access_token(Some("old-machine".to_string()))
            .await;
        let url = gateway.config().api_url("storage/vault");
        let result: Option<Value> = gateway.get(&url, &[], false, true).await;

        assert!(result.is_none());
        assert!(gateway.is_authenticated().await);
        assert!(gateway.session().machine_access_token().await.is_empty());
        stale_mock.assert_async().await;
        empty_bearer_mock.assert_async().await;
        user_mock.assert_async().await;
        machine_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bare_forbidden_triggers_retry() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/storage/storageendpoints.svc/")
            .match_header("authorization", "Bearer stale-token")
            .with_status(403)
            .with_body("Forbidden")
            .expect(1)
            .create_async()
            .await;
        let fresh_mock = server
            .mock("GET", "/storage/storageendpoints.svc/")
            .match_header("authorization", "Bearer new-token")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;
        let _token_mock = mock_user_token(&mut server, "new-token").await;

        let gateway = gateway_with_token(config_for(&server), "stale-token").await;
        let url = gateway.config().api_url("storage/storageendpoints.svc/");
        let result: Option<Vec<Value>> = gateway.get(&url, &[], false, false).await;

        assert_eq!(result, Some(Vec::new()));
        fresh_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forbidden_with_reason_is_not_retried() {
        let mut server = Server::new_async().await;
        let request_mock = server
            .mock("GET", "/storage/storageendpoints.svc/")
            .with_status(403)
            .with_body(r#"{"error":"no access to this company"}"#)
            .expect(1)
            .create_async()
            .await;
        let token_mock = server
            .mock("POST", "/oauth/token")
            .expect(0)
            .create_async()
            .await;

        let gateway = gateway_with_token(config_for(&server), "user-token").await;
        let url = gateway.config().api_url("storage/storageendpoints.svc/");
        let result: Option<Value> = gateway.get(&url, &[], false, false).await;

        assert!(result.is_none());
        request_mock.assert_async().await;
        token_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retry_keeps_extra_headers() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/sync/file.svc/1/file/2")
            .match_header("authorization", "Bearer stale-token")
            .match_header("x-correlation-id", "abc")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let fresh_mock = server
            .mock("GET", "/sync/file.svc/1/file/2")
            .match_header("authorization", "Bearer new-token")
            .match_header("x-correlation-id", "abc")
            .with_status(200)
            .with_body(json!({"FileId": 2}).to_string())
            .expect(1)
            .create_async()
            .await;
        let _token_mock = mock_user_token(&mut server, "new-token").await;

        let gateway = gateway_with_token(config_for(&server), "stale-token").await;
        let url = gateway.config().api_url("sync/file.svc/1/file/2");
        let result: Option<Value> = gateway
            .get(&url, &[("X-Correlation-Id", "abc")], false, false)
            .await;

        assert_eq!(result.unwrap()["FileId"], 2);
        fresh_mock.assert_async().await;
    }
}
