//! `robofleet-demo listen`: tail a robot or fleet WebSocket stream.

use std::io::Write;

use futures::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::config::{ws_base, ListenArgs};
use crate::error::DemoError;

/// Stream URL for `args`, e.g. `ws://host/ws/fleet?token=...`.
pub fn stream_url(api_url: &str, args: &ListenArgs) -> String {
    let path = match args.robot {
        Some(robot_id) if !args.fleet => format!("/ws/robots/{robot_id}"),
        _ => "/ws/fleet".to_string(),
    };
    format!("{}{path}?token={}", ws_base(api_url), args.token)
}

/// Print every text frame until the server closes the stream, Ctrl-C, or
/// `max_messages` is reached. Returns the number of messages printed.
pub async fn listen<W: Write>(
    api_url: &str,
    args: &ListenArgs,
    out: &mut W,
) -> Result<usize, DemoError> {
    let url = stream_url(api_url, args);
    // The token is in the query string; keep it out of the logs.
    let display_url = url.split('?').next().unwrap_or(&url).to_string();

    writeln!(out, "Connecting to {display_url}...")?;
    let (mut stream, _response) = connect_async(url.as_str()).await?;
    tracing::info!(url = %display_url, "WebSocket connected");
    writeln!(out, "Connected. Waiting for updates...")?;
    out.flush()?;

    let mut received = 0;
    if args.max_messages == Some(0) {
        return Ok(received);
    }

    loop {
        let frame = tokio::select! {
            frame = stream.next() => frame,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                received += 1;
                writeln!(out, "Received: {text}")?;
                out.flush()?;
                if args.max_messages.is_some_and(|max| received >= max) {
                    break;
                }
            }
            Some(Ok(Message::Close(frame))) => {
                match frame {
                    Some(frame) => writeln!(out, "Closed by server ({}: {})", frame.code, frame.reason)?,
                    None => writeln!(out, "Closed by server")?,
                }
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e.into()),
            None => break,
        }
    }

    if let Err(e) = stream.close(None).await {
        tracing::debug!(error = %e, "Error closing WebSocket");
    }
    Ok(received)
}
