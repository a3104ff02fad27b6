//! services/dashboard/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a dashboard WebSocket
//! connection. Client commands are routed to the connection's auth service and
//! synchronizer; every synchronizer change is pushed back as a fresh snapshot.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    state::{AppState, DashboardSession},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use chrono::Utc;
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use pregnancy_tracker_core::domain::Credentials;
use pregnancy_tracker_core::ports::AuthService;
use std::sync::Arc;
use tracing::{error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New dashboard connection established.");

    let (mut sender, mut receiver) = socket.split();
    let session = DashboardSession::start(&app_state).await;
    let mut changes = session.sync.changes();

    // --- 1. Initial State ---
    if send_snapshot(&mut sender, &session, &app_state).await.is_err() {
        error!("Failed to send initial snapshot.");
        return;
    }

    // --- 2. Main Loop ---
    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let reply = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                        Ok(message) => handle_client_message(&session, message).await.err(),
                        Err(e) => {
                            warn!("Unrecognised client message: {}", e);
                            Some(format!("Unrecognised message: {}", e))
                        }
                    };
                    if let Some(message) = reply {
                        if send_message(&mut sender, &ServerMessage::error(message)).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
            },
            changed = changes.changed() => {
                if changed.is_err() || send_snapshot(&mut sender, &session, &app_state).await.is_err() {
                    break;
                }
            }
        }
    }

    session.close();
    info!("Dashboard connection closed.");
}

/// Applies one client command. `Err` carries a message for the client.
pub async fn handle_client_message(
    session: &DashboardSession,
    message: ClientMessage,
) -> Result<(), String> {
    match message {
        ClientMessage::SignIn { email, password } => {
            let credentials = Credentials { email, password };
            session
                .auth
                .sign_in(&credentials)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
        ClientMessage::SignOut => session.auth.sign_out().await.map_err(|e| e.to_string()),
        // Writes are detached; their outcome reaches the client through snapshots.
        ClientMessage::SetPregnancyWeek { week } => {
            session.sync.set_pregnancy_week(week).await;
            Ok(())
        }
        ClientMessage::AddSymptom {
            symptom,
            severity,
            note,
        } => {
            session.sync.add_symptom_entry(symptom, severity, note).await;
            Ok(())
        }
        ClientMessage::SetReminderFrequency { weeks } => {
            session.sync.set_reminder_frequency(weeks).await;
            Ok(())
        }
        ClientMessage::SetCustomNotes { notes } => {
            session.sync.set_custom_notes(notes).await;
            Ok(())
        }
        ClientMessage::AddReflection { text } => {
            session.sync.add_reflection(&text).await;
            Ok(())
        }
    }
}

async fn send_snapshot(
    sender: &mut SplitSink<WebSocket, Message>,
    session: &DashboardSession,
    app_state: &AppState,
) -> Result<(), axum::Error> {
    let snapshot = session.sync.snapshot().await;
    let message = ServerMessage::snapshot(snapshot, &app_state.guidance, Utc::now());
    send_message(sender, &message).await
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}
