//! Integration test: run the relay on a free port against local Feishu and
//! DeepSeek stand-ins, post a chat message, and check the reply that goes out.

use axum::{extract::Query, routing::post, Json, Router};
use feishu_relay::{run_web_server, Settings};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Outbox = Arc<Mutex<Vec<(String, Value)>>>;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}

async fn fake_feishu(outbox: Outbox) -> String {
    let router = Router::new()
        .route(
            "/auth/v3/tenant_access_token/internal",
            post(|| async { Json(json!({"code": 0, "tenant_access_token": "t-int", "expire": 7200})) }),
        )
        .route(
            "/im/v1/messages",
            post(
                move |Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>| {
                    let outbox = outbox.clone();
                    async move {
                        let id_type = query.get("receive_id_type").cloned().unwrap_or_default();
                        outbox.lock().unwrap().push((id_type, body));
                        Json(json!({"code": 0, "msg": "success"}))
                    }
                },
            ),
        );
    serve(router).await
}

async fn fake_deepseek() -> String {
    let router = Router::new().route(
        "/chat/completions",
        post(|Json(body): Json<Value>| async move {
            let question = body["messages"][1]["content"].as_str().unwrap_or("").to_string();
            Json(json!({"choices": [{"message": {"content": format!("echo: {}", question)}}]}))
        }),
    );
    serve(router).await
}

async fn start_relay(outbox: Outbox) -> String {
    let port = free_port();
    let mut settings = Settings::default();
    settings.server.host = "127.0.0.1".to_string();
    settings.server.port = port;
    settings.feishu.app_id = "cli_int".to_string();
    settings.feishu.app_secret = "secret".to_string();
    settings.feishu.base_url = fake_feishu(outbox).await;
    settings.deepseek.api_key = Some("sk-int".to_string());
    settings.deepseek.base_url = fake_deepseek().await;

    tokio::spawn(async move {
        let _ = run_web_server(&settings).await;
    });

    let url = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(format!("{}/health", url)).send().await {
            if resp.status().is_success() {
                return url;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("relay did not become healthy on {}", url);
}

#[tokio::test]
async fn free_text_message_is_answered_in_chat() {
    let outbox: Outbox = Arc::default();
    let url = start_relay(outbox.clone()).await;

    let payload = json!({
        "type": "event_callback",
        "event": {
            "type": "im.message.receive_v1",
            "message": {
                "message_type": "text",
                "content": "{\"text\":\"  what is rust?  \"}",
                "chat_id": "oc_team",
                "chat_type": "p2p"
            },
            "sender": {"sender_id": {"user_id": "ou_alice"}}
        }
    });

    let resp = reqwest::Client::new()
        .post(format!("{}/webhook", url))
        .json(&payload)
        .send()
        .await
        .expect("post webhook");
    assert!(resp.status().is_success());
    let ack: Value = resp.json().await.expect("ack json");
    assert_eq!(ack, json!({"code": 0, "msg": "message processed"}));

    let sent = outbox.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    let (id_type, body) = &sent[0];
    assert_eq!(id_type, "open_id");
    assert_eq!(body["receive_id"], "ou_alice");
    assert_eq!(body["content"], json!({"text": "echo: what is rust?"}).to_string());
}

#[tokio::test]
async fn malformed_body_is_rejected_with_500() {
    let url = start_relay(Arc::default()).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/webhook", url))
        .header("content-type", "application/json")
        .body("{broken")
        .send()
        .await
        .expect("post webhook");

    assert_eq!(resp.status().as_u16(), 500);
    let body: Value = resp.json().await.expect("error json");
    assert_eq!(body["code"], 500);
}
