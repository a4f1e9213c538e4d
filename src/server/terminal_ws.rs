//! Interactive terminal WebSocket handler
//!
//! One shell per connection. Text frames from the client are keystrokes,
//! except the xterm resize sequence (`ESC[8;rows;colst`), which is applied
//! to the shell's window instead of being typed into it. Shell output is
//! decoded lossily and relayed back as text frames.
//!
//! Every exit path funnels through the same teardown so the shell is
//! always terminated, whether the client closed the socket, the shell
//! exited on its own, or a relay direction failed.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;

use crate::terminal::{self, RESIZE_PREFIX};

use super::AppState;

pub async fn terminal_ws(
    ws: WebSocketUpgrade,
    State(_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(handle_session)
}

async fn handle_session(mut socket: WebSocket) {
    let mut shell = match terminal::spawn_shell() {
        Ok(shell) => shell,
        Err(e) => {
            tracing::error!(error = %e, "failed to spawn terminal shell");
            let _ = socket
                .send(Message::Text("failed to start shell\r\n".to_string()))
                .await;
            let _ = socket.close().await;
            return;
        }
    };
    // The output channel is taken exactly once per transport, and this
    // handler owns a freshly spawned one.
    let Some(mut output) = shell.take_output() else {
        shell.shutdown().await;
        return;
    };
    tracing::debug!("terminal session started");

    loop {
        tokio::select! {
            chunk = output.recv() => {
                match chunk {
                    Some(bytes) => {
                        let text = String::from_utf8_lossy(&bytes).into_owned();
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    // Shell exited or its output pipe broke.
                    None => break,
                }
            }
            frame = socket.recv() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if handle_client_frame(shell.as_ref(), &text).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        if shell.write_input(&data).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    shell.shutdown().await;
    let _ = socket.close().await;
    tracing::debug!("terminal session closed");
}

/// Apply one client text frame: resize sequences steer the pty, anything
/// else is typed into the shell. A malformed resize sequence is dropped
/// rather than forwarded as keystrokes.
async fn handle_client_frame(
    shell: &dyn terminal::ShellTransport,
    text: &str,
) -> crate::error::Result<()> {
    if let Some((rows, cols)) = terminal::parse_resize(text) {
        shell.resize(rows, cols).await
    } else if text.starts_with(RESIZE_PREFIX) {
        tracing::debug!(frame = %text.escape_debug(), "ignoring malformed resize sequence");
        Ok(())
    } else {
        shell.write_input(text.as_bytes()).await
    }
}
