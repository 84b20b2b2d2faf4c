use axum::{
    extract::{State, ws::{WebSocket, WebSocketUpgrade, Message}},
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::time::{interval, Duration};

use crate::api::rest::AppState;
use crate::models::Opportunity;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Pushes a freshly ranked list every `refresh_secs`, with a ping heartbeat.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut update_ticker = interval(Duration::from_secs(state.refresh_secs.max(1)));
    let mut heartbeat_ticker = interval(Duration::from_secs(10));

    loop {
        tokio::select! {
            _ = update_ticker.tick() => {
                let msg = opportunities_message(&state.hunt().await);

                match tokio::time::timeout(
                    Duration::from_secs(5),
                    sender.send(Message::Text(msg))
                ).await {
                    Ok(Ok(_)) => {},
                    _ => return,
                }
            }

            _ = heartbeat_ticker.tick() => {
                if sender.send(Message::Ping(vec![])).await.is_err() {
                    return;
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = reply_to(&text) {
                            if sender.send(Message::Text(reply)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return,
                    _ => {}
                }
            }
        }
    }
}

fn opportunities_message(opportunities: &[Opportunity]) -> String {
    serde_json::json!({
        "type": "opportunities",
        "count": opportunities.len(),
        "data": opportunities,
    })
    .to_string()
}

/// Client commands; only `{"type":"ping"}` gets an answer.
fn reply_to(text: &str) -> Option<String> {
    let cmd: serde_json::Value = serde_json::from_str(text).ok()?;
    (cmd["type"] == "ping").then(|| r#"{"type":"pong"}"#.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_rest_router;
    use crate::config::{ReportConfig, Thresholds};
    use crate::services::ObservationCollector;
    use crate::sources::fixtures::FixtureSource;
    use crate::sources::ObservationSource;
    use tokio_tungstenite::{connect_async, tungstenite::Message as ClientMessage};

    #[test]
    fn test_reply_to_ping_only() {
        assert_eq!(reply_to(r#"{"type":"ping"}"#).as_deref(), Some(r#"{"type":"pong"}"#));
        assert_eq!(reply_to(r#"{"type":"subscribe"}"#), None);
        assert_eq!(reply_to("not json"), None);
    }

    async fn spawn_server() -> String {
        let sources: Vec<Arc<dyn ObservationSource>> = vec![Arc::new(FixtureSource::demo())];
        let state = Arc::new(AppState {
            collector: Arc::new(ObservationCollector::new(sources, Duration::from_secs(5))),
            thresholds: Thresholds::default(),
            report: ReportConfig::default(),
            refresh_secs: 30,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_rest_router(state)).await.unwrap();
        });
        format!("ws://{}/ws", addr)
    }

    /// Next text frame, skipping heartbeats.
    async fn next_json<S>(stream: &mut S) -> serde_json::Value
    where
        S: futures::Stream<Item = Result<ClientMessage, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(5), stream.next())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            if let ClientMessage::Text(text) = frame {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_push_and_pong() {
        let url = spawn_server().await;
        let (ws, _) = connect_async(url).await.unwrap();
        let (mut write, mut read) = ws.split();

        let pushed = next_json(&mut read).await;
        assert_eq!(pushed["type"], "opportunities");
        assert_eq!(pushed["count"], 9);
        assert_eq!(pushed["data"].as_array().unwrap().len(), 9);
        assert_eq!(pushed["data"][0]["type"], "LIQUIDATION_CASCADE");

        write
            .send(ClientMessage::Text(r#"{"type":"ping"}"#.to_string()))
            .await
            .unwrap();
        let reply = next_json(&mut read).await;
        assert_eq!(reply["type"], "pong");
    }
}
