//! End-to-end tests for the lab JSON API.

use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_status_and_route_table() {
    let lab = common::start_lab(common::fast_config()).await;

    let res = lab.client.get(lab.url("/status")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["sessions"], 0);

    let routes: Value = lab.client.get(lab.url("/routes")).send().await.unwrap().json().await.unwrap();
    let prefixes: Vec<&str> = routes
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["prefix"].as_str().unwrap())
        .collect();
    assert_eq!(prefixes, vec!["/users", "/products", "/auth"]);

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_session_lifecycle() {
    let lab = common::start_lab(common::fast_config()).await;

    let res = lab.client.post(lab.url("/sessions")).send().await.unwrap();
    assert_eq!(res.status(), 201);
    let body: Value = res.json().await.unwrap();
    let id = body["id"].as_str().unwrap().to_string();
    assert!(body["greeting"].as_str().unwrap().contains("Tutor"));

    let res = lab.client.delete(lab.session_url(&id, "")).send().await.unwrap();
    assert_eq!(res.status(), 204);

    // Gone after end
    let res = lab.client.get(lab.session_url(&id, "/breaker")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().is_some());

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_session_limit() {
    let mut config = common::fast_config();
    config.sessions.max_sessions = 1;
    let lab = common::start_lab(config).await;

    lab.new_session().await;
    let res = lab.client.post(lab.url("/sessions")).send().await.unwrap();
    assert_eq!(res.status(), 503);

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_route_matching() {
    let lab = common::start_lab(common::fast_config()).await;
    let id = lab.new_session().await;

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/route"))
        .json(&json!({ "path": "/users/123" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["result"], "matched");
    assert_eq!(body["name"], "users");
    assert_eq!(body["upstream_url"], "http://user-service:8080/users/123");

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/route"))
        .json(&json!({ "path": "/unknown" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["result"], "not_found");
    assert!(body["upstream_url"].is_null());
    assert!(body["message"].as_str().unwrap().starts_with("404"));

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_rate_limit_window() {
    let lab = common::start_lab(common::fast_config()).await;
    let id = lab.new_session().await;

    for i in 1..=5 {
        let body: Value = lab
            .client
            .post(lab.session_url(&id, "/rate-limit/submit"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["decision"], "allowed");
        assert_eq!(body["used"], i);
    }

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/rate-limit/submit"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["decision"], "denied");
    assert_eq!(body["used"], 5);
    assert_eq!(body["remaining"], 0);
    assert_eq!(body["history"].as_array().unwrap().len(), 5);

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/rate-limit/reset"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["used"], 0);
    assert_eq!(body["remaining"], 5);

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let lab = common::start_lab(common::fast_config()).await;
    let a = lab.new_session().await;
    let b = lab.new_session().await;

    for _ in 0..3 {
        lab.client
            .post(lab.session_url(&a, "/rate-limit/submit"))
            .send()
            .await
            .unwrap();
    }

    let body: Value = lab
        .client
        .get(lab.session_url(&b, "/rate-limit"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["used"], 0);

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_breaker_trips_and_resets() {
    let lab = common::start_lab(common::fast_config()).await;
    let id = lab.new_session().await;

    let mut last = Value::Null;
    for _ in 0..3 {
        last = lab
            .client
            .post(lab.session_url(&id, "/breaker/evaluate"))
            .json(&json!({ "healthy": false }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    }
    assert_eq!(last["state"], "OPEN");
    assert_eq!(last["breaker"]["failure_count"], 3);

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/breaker/evaluate"))
        .json(&json!({ "healthy": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["verdict"]["kind"], "rejected");
    assert_eq!(body["state"], "OPEN");

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/breaker/reset"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["state"], "CLOSED");
    assert_eq!(body["failure_count"], 0);

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_breaker_recovers_after_timeout() {
    let mut config = common::fast_config();
    config.circuit_breaker.recovery_ms = 50;
    let lab = common::start_lab(config).await;
    let id = lab.new_session().await;

    for _ in 0..3 {
        lab.client
            .post(lab.session_url(&id, "/breaker/evaluate"))
            .json(&json!({ "healthy": false }))
            .send()
            .await
            .unwrap();
    }

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let body: Value = lab
        .client
        .get(lab.session_url(&id, "/breaker"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["state"], "HALF_OPEN");

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/breaker/evaluate"))
        .json(&json!({ "healthy": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["state"], "CLOSED");

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_auth_cache_and_journey() {
    let lab = common::start_lab(common::fast_config()).await;
    let id = lab.new_session().await;

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/auth"))
        .json(&json!({ "token": "SECRET-TOKEN-123" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["outcome"], "accepted");

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/auth"))
        .json(&json!({ "token": "nope" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["outcome"], "rejected");

    let first: Value = lab
        .client
        .post(lab.session_url(&id, "/cache/fetch"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = lab
        .client
        .post(lab.session_url(&id, "/cache/fetch"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["hit"], false);
    assert_eq!(second["hit"], true);

    let res = lab.client.post(lab.session_url(&id, "/cache/purge")).send().await.unwrap();
    assert_eq!(res.status(), 204);

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/journey/next"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["step"], 2);

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/journey/prev"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["step"], 1);
    assert_eq!(body["total"], 8);

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_order_orchestration() {
    let lab = common::start_lab(common::fast_config()).await;
    let id = lab.new_session().await;

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/order"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let phases: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["phase"].as_str().unwrap())
        .collect();
    assert_eq!(phases.last(), Some(&"complete"));
    assert!(phases.contains(&"payment"));

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_quiz_flow() {
    let lab = common::start_lab(common::fast_config()).await;
    let id = lab.new_session().await;

    let questions: Value = lab.client.get(lab.url("/quiz/questions")).send().await.unwrap().json().await.unwrap();
    assert_eq!(questions.as_array().unwrap().len(), 3);
    assert!(questions[0].get("answer").is_none());

    let answers = [
        "To provide a single, unified entry point for clients",
        "Request Transformation",
        "Before backend services (facing the client)",
    ];
    let mut last = Value::Null;
    for option in answers {
        last = lab
            .client
            .post(lab.session_url(&id, "/quiz/answer"))
            .json(&json!({ "option": option }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    }
    assert_eq!(last["score"], 2);
    assert_eq!(last["finished"], true);

    let res = lab
        .client
        .post(lab.session_url(&id, "/quiz/answer"))
        .json(&json!({ "option": "Rate Limiting" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);

    let body: Value = lab
        .client
        .post(lab.session_url(&id, "/quiz/restart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["score"], 0);
    assert_eq!(body["finished"], false);

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_propagated() {
    let lab = common::start_lab(common::fast_config()).await;

    let res = lab.client.get(lab.url("/status")).send().await.unwrap();
    let generated = res.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(generated.len(), 36);

    let res = lab
        .client
        .get(lab.url("/status"))
        .header("x-request-id", "lab-test-1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), "lab-test-1");

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_session_id() {
    let lab = common::start_lab(common::fast_config()).await;

    let res = lab.client.get(lab.url("/sessions/not-a-uuid/breaker")).send().await.unwrap();
    assert_eq!(res.status(), 400);

    lab.shutdown.trigger();
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let mut config = common::fast_config();
    config.listener.request_timeout_secs = 1;
    config.simulation.order_step_ms = 1_500;
    let lab = common::start_lab(config).await;
    let id = lab.new_session().await;

    let res = lab.client.post(lab.session_url(&id, "/order")).send().await.unwrap();
    assert_eq!(res.status(), 408);
    assert!(res.headers().get("x-request-id").is_some());

    lab.shutdown.trigger();
}
