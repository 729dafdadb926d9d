// Integration tests for the Taskping API
// Run with: cargo test --test integration_test -- --ignored
//
// Requires a running server (cargo run --bin taskping-api) plus:
//   TASKPING_TEST_TOKEN    - session token (cargo run --bin issue-token -- <user_id>)
//   TASKPING_TEST_USER_ID  - the user the token belongs to

use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde_json::{json, Value};

const API_BASE_URL: &str = "http://localhost:9000";

fn test_token() -> String {
    std::env::var("TASKPING_TEST_TOKEN").expect("TASKPING_TEST_TOKEN required")
}

fn test_user_id() -> i64 {
    std::env::var("TASKPING_TEST_USER_ID")
        .expect("TASKPING_TEST_USER_ID required")
        .parse()
        .expect("TASKPING_TEST_USER_ID must be an integer")
}

async fn read_first_payload(client: &reqwest::Client, token: &str, last_id: i64) -> Value {
    let response = client
        .get(format!(
            "{}/v1/notifications/stream?last_id={}",
            API_BASE_URL, last_id
        ))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to open stream");

    assert_eq!(response.status(), 200);

    let mut stream = response.bytes_stream().eventsource();
    while let Some(event) = stream.next().await {
        let event = event.expect("Stream error");
        if event.event == "notifications" {
            return serde_json::from_str(&event.data).expect("Failed to parse payload");
        }
    }

    panic!("Stream ended without a notifications event");
}

#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_full_delivery_roundtrip() {
    let client = reqwest::Client::new();
    let token = test_token();
    let user_id = test_user_id();

    println!("🧪 Testing produce → stream → ack roundtrip...");

    // Step 1: Enable the push channel
    println!("\n📡 Step 1: Enabling push channel...");
    let channels_response = client
        .put(format!("{}/v1/me/channels", API_BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"channels": ["push"]}))
        .send()
        .await
        .expect("Failed to update channels");

    assert_eq!(channels_response.status(), 200);
    let channels: Value = channels_response.json().await.expect("Failed to parse");
    println!("✅ Channels: {}", channels["channels"]);

    // Step 2: Queue two notifications
    println!("\n📝 Step 2: Queueing notifications...");
    let mut queued_ids = Vec::new();
    for title in ["First task", "Second task"] {
        let response = client
            .post(format!("{}/v1/notifications", API_BASE_URL))
            .bearer_auth(&token)
            .json(&json!({
                "user_id": user_id,
                "event_name": "task.create",
                "event_data": {
                    "project_name": "Integration",
                    "task": {"id": 42, "title": title}
                }
            }))
            .send()
            .await
            .expect("Failed to queue notification");

        assert_eq!(response.status(), 201);
        let created: Value = response.json().await.expect("Failed to parse");
        queued_ids.push(created["id"].as_i64().unwrap());
    }
    println!("✅ Queued ids: {:?}", queued_ids);

    // Step 3: Open the stream and read the batch
    println!("\n📥 Step 3: Reading the delivered batch...");
    let payload = read_first_payload(&client, &token, 0).await;
    let delivered: Vec<i64> = payload["ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_i64().unwrap())
        .collect();
    let last_id = payload["last_id"].as_i64().unwrap();

    println!("✅ Delivered ids: {:?}, last_id: {}", delivered, last_id);
    for id in &queued_ids {
        assert!(delivered.contains(id), "queued id {} not delivered", id);
    }
    assert_eq!(last_id, *delivered.last().unwrap());
    assert_eq!(payload["items"][0]["title"], "Integration");

    // Step 4: Reconnect with the cursor; acknowledged rows must not reappear
    println!("\n🔁 Step 4: Reconnecting with last_id={}...", last_id);
    let newer = client
        .post(format!("{}/v1/notifications", API_BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "user_id": user_id,
            "event_name": "task.close",
            "event_data": {"task": {"id": 43, "title": "Later task"}}
        }))
        .send()
        .await
        .expect("Failed to queue notification");
    let newer_id = newer.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let payload = read_first_payload(&client, &token, last_id).await;
    let redelivered: Vec<i64> = payload["ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_i64().unwrap())
        .collect();

    println!("✅ Second batch ids: {:?}", redelivered);
    assert_eq!(redelivered, vec![newer_id]);
    for id in &queued_ids {
        assert!(!redelivered.contains(id), "acknowledged id {} reappeared", id);
    }

    println!("\n🎉 Roundtrip complete");
}

#[tokio::test]
#[ignore]
async fn test_stream_requires_auth() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/v1/notifications/stream", API_BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.expect("Failed to parse error body");
    assert_eq!(body["message"], "Access Forbidden");
}
