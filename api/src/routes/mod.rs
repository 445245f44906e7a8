pub mod health;
pub mod session;
pub mod tools;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::request_log::RequestLogLayer;
use crate::openapi;
use crate::state::AppState;

/// The full tool-server router, wired with request logging and tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(session::router())
        .merge(tools::router())
        .merge(openapi::router())
        .fallback(tools::unknown_route)
        .layer(RequestLogLayer::new(state.session.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::ServerConfig;

    const INBOX: &str = r#"[
        {"id": "m1", "sender": "boss@corp.com", "subject": "Q3 numbers",
         "body": "Need the Q3 numbers by end of day. This is blocking the board deck and I cannot present without them. Please prioritize.",
         "received_ts": "2026-01-05T09:00:00Z", "labels": ["work"], "is_urgent": true},
        {"id": "m2", "sender": "news@letters.io", "subject": "Weekly digest", "body": "Top stories"},
        {"id": "m3", "sender": "friend@mail.com", "subject": "Lunch?"}
    ]"#;

    struct Harness {
        _dir: TempDir,
        app: Router,
        logs: std::path::PathBuf,
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, content).expect("write");
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().expect("tempdir");
        let fixtures = dir.path().join("fixtures");
        let logs = dir.path().join("logs");
        std::fs::create_dir_all(&logs).expect("mkdir logs");
        write(&fixtures, "inbox_triage/inbox.json", INBOX);
        write(
            &fixtures,
            "inbox_triage/memory/preferences.md",
            "Reply formally.",
        );
        write(
            &fixtures,
            "busy_week/calendar.json",
            r#"[{"title": "Standup", "start": "2026-01-05T09:30:00Z"}]"#,
        );

        let config = ServerConfig {
            fixtures_path: fixtures,
            log_path: logs.clone(),
            default_scenario: "inbox_triage".to_string(),
            port: 0,
        };
        Harness {
            app: app(AppState::new(&config)),
            _dir: dir,
            logs,
        }
    }

    async fn send(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn post(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
        send(app, Method::POST, uri, body).await
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Method::GET, uri, "").await
    }

    #[tokio::test]
    async fn health_reports_active_scenario() {
        let h = harness();
        let (status, body) = get(&h.app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "scenario": "inbox_triage"}));
    }

    #[tokio::test]
    async fn inbox_list_projects_fixture_in_order() {
        let h = harness();
        post(&h.app, "/set_scenario/inbox_triage", "").await;

        let (status, body) = post(&h.app, "/tools/inbox.list", "{}").await;
        assert_eq!(status, StatusCode::OK);
        let messages = body["messages"].as_array().expect("messages array");
        assert_eq!(messages.len(), 3);
        let ids: Vec<&str> = messages.iter().map(|m| m["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert_eq!(messages[0]["snippet"].as_str().unwrap().chars().count(), 100);
        assert_eq!(messages[0]["is_urgent"], true);
        assert_eq!(messages[0]["labels"], json!(["work"]));
        assert_eq!(messages[1]["snippet"], "Top stories");
        assert_eq!(messages[2]["snippet"], "");
        assert!(messages[0].get("body").is_none());

        let (_, all) = get(&h.app, "/all_requests").await;
        assert_eq!(all["summary"], json!({"total": 1, "success": 1, "failed": 0}));
        assert_eq!(all["requests"][0]["tool"], "inbox.list");
        assert_eq!(all["requests"][0]["success"], true);

        let (_, calls) = get(&h.app, "/tool_calls").await;
        assert_eq!(calls["calls"][0]["result_summary"], "{\"count\":3}");
    }

    #[tokio::test]
    async fn inbox_list_without_fixture_is_404_and_logged_as_failure() {
        let h = harness();
        post(&h.app, "/set_scenario/busy_week", "").await;

        let (status, body) = post(&h.app, "/tools/inbox.list", "{}").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");

        let (_, calls) = get(&h.app, "/tool_calls").await;
        assert!(calls["calls"].as_array().unwrap().is_empty());
        let (_, all) = get(&h.app, "/all_requests").await;
        assert_eq!(all["summary"], json!({"total": 1, "success": 0, "failed": 1}));
        assert_eq!(all["requests"][0]["status_code"], 404);
    }

    #[tokio::test]
    async fn calendar_read_without_fixture_is_empty_success() {
        let h = harness();
        let (status, body) = post(&h.app, "/tools/calendar.read", "{}").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"events": []}));
    }

    #[tokio::test]
    async fn calendar_read_returns_fixture_events() {
        let h = harness();
        post(&h.app, "/set_scenario/busy_week", "").await;
        let (status, body) = post(
            &h.app,
            "/tools/calendar.read",
            r#"{"start_date": "2026-01-05", "end_date": "2026-01-06"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["events"][0]["title"], "Standup");
    }

    #[tokio::test]
    async fn email_draft_accepts_aliases() {
        let h = harness();
        let (status, body) =
            post(&h.app, "/tools/email.draft", r#"{"emailId": "m1", "text": "Thanks!"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"draft_id": "draft_m1", "preview": "[Draft reply to m1]: Thanks!..."})
        );

        let (_, calls) = get(&h.app, "/tool_calls").await;
        let args = &calls["calls"][0]["args"];
        assert_eq!(args["message_id"], "m1");
        assert_eq!(args["instructions"], "Thanks!");
        assert_eq!(args["_raw"], json!({"emailId": "m1", "text": "Thanks!"}));
    }

    #[tokio::test]
    async fn email_draft_never_fails_on_garbage() {
        let h = harness();
        let (status, body) = post(&h.app, "/tools/email.draft", "this is not json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["draft_id"], "draft_unknown");
        assert_eq!(
            body["preview"],
            "[Draft reply to unknown]: No instructions provided..."
        );

        let (_, all) = get(&h.app, "/all_requests").await;
        assert_eq!(
            all["requests"][0]["request_body"],
            json!({"_raw": "this is not json"})
        );
        assert_eq!(all["requests"][0]["success"], true);
    }

    #[tokio::test]
    async fn empty_body_is_logged_as_null_and_handled_as_empty_object() {
        let h = harness();
        let (status, body) = post(&h.app, "/tools/email.send", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "sent", "draft_id": "unknown"}));

        let (_, all) = get(&h.app, "/all_requests").await;
        assert_eq!(all["requests"][0]["request_body"], Value::Null);
        let (_, calls) = get(&h.app, "/tool_calls").await;
        assert_eq!(calls["calls"][0]["args"]["_raw"], json!({}));
    }

    #[tokio::test]
    async fn email_send_resolves_draft_id_aliases() {
        let h = harness();
        let (_, body) = post(&h.app, "/tools/email.send", r#"{"draftId": "draft_m2"}"#).await;
        assert_eq!(body, json!({"status": "sent", "draft_id": "draft_m2"}));
    }

    #[tokio::test]
    async fn memory_read_existing_and_missing() {
        let h = harness();
        let (status, body) =
            post(&h.app, "/tools/memory.read", r#"{"path": "preferences.md"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"content": "Reply formally.", "exists": true}));

        let (status, body) = post(&h.app, "/tools/memory.read", r#"{"key": "nope.md"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"content": null, "exists": false}));
    }

    #[tokio::test]
    async fn memory_write_is_acknowledged_but_not_persisted() {
        let h = harness();
        let (status, body) = post(
            &h.app,
            "/tools/memory.write",
            r#"{"path": "new.md", "content": "hello"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (_, body) = post(&h.app, "/tools/memory.read", r#"{"path": "new.md"}"#).await;
        assert_eq!(body["exists"], false);
    }

    #[tokio::test]
    async fn unknown_tool_is_logged_as_failed_request() {
        let h = harness();
        let (status, body) = post(&h.app, "/tools/email.delete", r#"{"id": "m1"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["received"], "/tools/email.delete");

        let (_, all) = get(&h.app, "/all_requests").await;
        assert_eq!(all["requests"][0]["tool"], "email.delete");
        assert_eq!(all["requests"][0]["success"], false);
    }

    #[tokio::test]
    async fn set_scenario_clears_both_logs() {
        let h = harness();
        post(&h.app, "/tools/inbox.list", "{}").await;
        post(&h.app, "/tools/email.draft", r#"{"message_id": "m1"}"#).await;
        post(&h.app, "/tools/nope", "{}").await;

        let (_, all) = get(&h.app, "/all_requests").await;
        assert_eq!(all["summary"]["total"], 3);
        let (_, calls) = get(&h.app, "/tool_calls").await;
        assert_eq!(calls["calls"].as_array().unwrap().len(), 2);

        let (status, body) = post(&h.app, "/set_scenario/other", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"scenario": "other"}));

        let (_, all) = get(&h.app, "/all_requests").await;
        assert_eq!(all["requests"], json!([]));
        assert_eq!(all["summary"], json!({"total": 0, "success": 0, "failed": 0}));
        let (_, calls) = get(&h.app, "/tool_calls").await;
        assert_eq!(calls["calls"], json!([]));
    }

    #[tokio::test]
    async fn encoded_separators_in_scenario_stay_inside_log_and_fixture_dirs() {
        let h = harness();
        let (status, body) = post(&h.app, "/set_scenario/..%2Fescaped", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenario"], "../escaped");

        let (status, _) = post(&h.app, "/tools/memory.write", r#"{"path": "x"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post(&h.app, "/tools/inbox.list", "{}").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = post(&h.app, "/set_scenario/..%2Ffixtures%2Finbox_triage", "").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post(&h.app, "/tools/inbox.list", "{}").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, body) = post(&h.app, "/tools/memory.read", r#"{"path": "preferences.md"}"#).await;
        assert_eq!(body["exists"], false);

        let root = h._dir.path();
        assert!(!root.join("escaped_all_requests.jsonl").exists());
        assert!(!root.join("escaped_calls.jsonl").exists());
        assert_eq!(std::fs::read_dir(&h.logs).expect("read logs").count(), 0);

        let (_, all) = get(&h.app, "/all_requests").await;
        assert_eq!(all["summary"]["total"], 2);
        assert_eq!(all["summary"]["failed"], 1);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_and_logged_as_failure() {
        let h = harness();
        let body = json!({"emailId": "m1", "text": "x".repeat(3 * 1024 * 1024)}).to_string();
        let (status, response) = post(&h.app, "/tools/email.draft", &body).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response["error"], "payload_too_large");

        let (_, all) = get(&h.app, "/all_requests").await;
        let request = &all["requests"][0];
        assert_eq!(request["tool"], "email.draft");
        assert_eq!(request["status_code"], 413);
        assert_eq!(request["success"], false);
        assert!(request["request_body"]["_raw"]
            .as_str()
            .unwrap()
            .contains("exceeded"));

        let (_, calls) = get(&h.app, "/tool_calls").await;
        assert_eq!(calls["calls"], json!([]));
    }

    #[tokio::test]
    async fn requests_never_outnumbered_by_calls() {
        let h = harness();
        post(&h.app, "/set_scenario/busy_week", "").await;
        post(&h.app, "/tools/inbox.list", "{}").await;
        post(&h.app, "/tools/calendar.read", "{}").await;
        post(&h.app, "/tools/memory.write", "{}").await;

        let (_, all) = get(&h.app, "/all_requests").await;
        let (_, calls) = get(&h.app, "/tool_calls").await;
        let total = all["summary"]["total"].as_u64().unwrap();
        let success = all["summary"]["success"].as_u64().unwrap();
        let failed = all["summary"]["failed"].as_u64().unwrap();
        assert_eq!(total, success + failed);
        assert!(total >= calls["calls"].as_array().unwrap().len() as u64);
        assert_eq!(failed, 1);
    }

    #[tokio::test]
    async fn tool_requests_are_persisted_per_scenario() {
        let h = harness();
        post(&h.app, "/tools/inbox.list", "{}").await;
        post(&h.app, "/set_scenario/busy_week", "").await;
        post(&h.app, "/tools/calendar.read", "{}").await;

        let first = std::fs::read_to_string(h.logs.join("inbox_triage_all_requests.jsonl"))
            .expect("first scenario log");
        assert_eq!(first.lines().count(), 1);
        let second = std::fs::read_to_string(h.logs.join("busy_week_all_requests.jsonl"))
            .expect("second scenario log");
        assert_eq!(second.lines().count(), 1);
        assert!(h.logs.join("busy_week_calls.jsonl").exists());
    }

    #[tokio::test]
    async fn non_tool_routes_are_not_logged() {
        let h = harness();
        get(&h.app, "/health").await;
        let (status, catalog) = get(&h.app, "/tools").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(catalog["tools"].as_array().unwrap().len(), 6);

        let (_, all) = get(&h.app, "/all_requests").await;
        assert_eq!(all["summary"]["total"], 0);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let h = harness();
        let (status, doc) = get(&h.app, "/api-doc/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"].get("/tools/email.draft").is_some());
    }
}
