//! WebSocket client session management.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use hibiki_shared::{
    protocol::{ClientEvent, ServerEvent},
    time::{Clock, SystemClock},
    trigger::TriggerMarker,
};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{
    error::ClientError,
    formatter::MessageFormatter,
    gate::TurnGate,
    input::{InputLoop, LineSource},
    playback::{Pacing, PlaybackHandle, PlaybackScheduler},
    ui::DisplaySurface,
};

/// Grace period for the close handshake after the user leaves
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebSocket endpoint without query
    pub url: String,
    pub name: String,
    pub room: Option<String>,
    pub trigger: TriggerMarker,
    pub exit_command: String,
    pub pacing: Pacing,
}

/// Append the `name` and `room` query parameters to the endpoint.
pub fn connect_url(base: &str, name: &str, room: Option<&str>) -> String {
    let mut params = vec![format!("name={}", urlencoding::encode(name))];
    if let Some(room) = room {
        params.push(format!("room={}", urlencoding::encode(room)));
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, separator, params.join("&"))
}

/// Route one server event to the turn gate and the playback queue.
///
/// The gate is updated before anything is enqueued so that playback of the
/// end marker always finds the stream already finished.
pub fn dispatch(
    event: ServerEvent,
    gate: &TurnGate,
    playback: &PlaybackHandle,
    clock: &dyn Clock,
) {
    match event {
        ServerEvent::BroadcastMessage { sender, text } => {
            playback.notice(MessageFormatter::format_broadcast(
                &sender,
                &text,
                clock.now_millis(),
            ));
        }
        ServerEvent::GeminiStream { data } => {
            if !data.is_empty() {
                playback.text(data);
            }
        }
        ServerEvent::StreamFinished { request_id } => {
            gate.stream_ended(request_id);
            playback.end_of_stream();
        }
        ServerEvent::GeminiError { error, request_id } => {
            tracing::debug!("Reply failed: {}", error);
            gate.stream_ended(request_id);
            playback.notice(MessageFormatter::format_error(&error));
            playback.release();
        }
        ServerEvent::ParticipantJoined { name } => {
            playback.notice(MessageFormatter::format_participant_joined(
                &name,
                clock.now_millis(),
            ));
        }
        ServerEvent::ParticipantLeft { name } => {
            playback.notice(MessageFormatter::format_participant_left(
                &name,
                clock.now_millis(),
            ));
        }
    }
}

/// Run one client session until the user exits or the connection is lost.
///
/// Returns the display surface once playback has drained. Only a failure to
/// connect is an error; losing the connection later ends the session
/// normally.
pub async fn run_client_session<S, L>(
    config: &SessionConfig,
    surface: S,
    source: L,
) -> Result<S, ClientError>
where
    S: DisplaySurface + 'static,
    L: LineSource,
{
    let url = connect_url(&config.url, &config.name, config.room.as_deref());
    let (ws_stream, _response) = connect_async(url.as_str())
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    tracing::info!("Connected to {}", url);

    let (mut write, mut read) = ws_stream.split();

    let gate = TurnGate::new();
    let (playback, display_task) = PlaybackScheduler::spawn(surface, gate.clone(), config.pacing);
    playback.notice(MessageFormatter::format_connected(
        &config.name,
        config.room.as_deref(),
        &config.exit_command,
    ));

    // Spawn a task to forward outbound events to the WebSocket
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ClientEvent>();
    let mut write_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let frame = match event.to_json() {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if let Err(e) = write.send(Message::text(frame)).await {
                tracing::warn!("Failed to send message: {}", e);
                return;
            }
        }
        write.send(Message::Close(None)).await.ok();
    });

    // Spawn a task to handle incoming events
    let read_task = tokio::spawn({
        let gate = gate.clone();
        let playback = playback.clone();
        async move {
            let clock = SystemClock;
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => match ServerEvent::from_json(text.as_str()) {
                        Ok(event) => dispatch(event, &gate, &playback, &clock),
                        Err(e) => tracing::warn!("Ignoring unknown frame: {}", e),
                    },
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed the connection");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            playback.notice(MessageFormatter::format_disconnected());
            playback.terminate();
            gate.close();
        }
    });

    let input = InputLoop {
        source,
        gate: gate.clone(),
        playback,
        outbound,
        trigger: config.trigger.clone(),
        exit_command: config.exit_command.clone(),
        prompt: MessageFormatter::prompt(&config.name),
    };
    let input_result = input.run().await;

    // Terminate has been enqueued on every exit path; wait for the display to drain
    let surface = display_task
        .await
        .map_err(|e| ClientError::PlaybackError(e.to_string()))?;
    gate.close();

    if tokio::time::timeout(CLOSE_TIMEOUT, &mut write_task)
        .await
        .is_err()
    {
        write_task.abort();
    }
    read_task.abort();

    input_result.map(|_| surface)
}
