//! Prompt loop: one line per turn.

use async_trait::async_trait;
use hibiki_shared::{protocol::ClientEvent, trigger::TriggerMarker};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::{mpsc, oneshot};

use crate::{error::ClientError, gate::TurnGate, playback::PlaybackHandle};

/// Source of user input lines
#[async_trait]
pub trait LineSource: Send {
    /// Show `prompt` and read one line. `Ok(None)` means end of input.
    async fn next_line(&mut self, prompt: &str) -> Result<Option<String>, ClientError>;
}

type ReadReply = Result<Option<String>, String>;

/// rustyline editor driven from a dedicated thread
pub struct RustylineSource {
    requests: std::sync::mpsc::Sender<(String, oneshot::Sender<ReadReply>)>,
}

impl RustylineSource {
    pub fn spawn() -> Self {
        let (requests, rx) = std::sync::mpsc::channel::<(String, oneshot::Sender<ReadReply>)>();

        // Spawn a blocking thread for rustyline (synchronous readline)
        std::thread::spawn(move || {
            let mut editor = DefaultEditor::new().map_err(|e| e.to_string());

            while let Ok((prompt, reply)) = rx.recv() {
                let result = match editor.as_mut() {
                    Ok(editor) => match editor.readline(&prompt) {
                        Ok(line) => {
                            if !line.trim().is_empty() {
                                editor.add_history_entry(line.as_str()).ok();
                            }
                            Ok(Some(line))
                        }
                        // Ctrl+C / Ctrl+D
                        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
                        Err(e) => Err(e.to_string()),
                    },
                    Err(e) => Err(format!("failed to initialize readline: {}", e)),
                };
                if reply.send(result).is_err() {
                    break;
                }
            }
        });

        Self { requests }
    }
}

#[async_trait]
impl LineSource for RustylineSource {
    async fn next_line(&mut self, prompt: &str) -> Result<Option<String>, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send((prompt.to_string(), reply))
            .map_err(|_| ClientError::InputError("line editor has stopped".to_string()))?;
        rx.await
            .map_err(|_| ClientError::InputError("line editor has stopped".to_string()))?
            .map_err(ClientError::InputError)
    }
}

/// Waits for each turn, reads a line and sends it.
pub struct InputLoop<L> {
    pub source: L,
    pub gate: TurnGate,
    pub playback: PlaybackHandle,
    pub outbound: mpsc::UnboundedSender<ClientEvent>,
    pub trigger: TriggerMarker,
    pub exit_command: String,
    pub prompt: String,
}

impl<L: LineSource> InputLoop<L> {
    /// Run until the exit command, end of input, or the session closes.
    pub async fn run(mut self) -> Result<(), ClientError> {
        loop {
            if self.gate.acquire().await.is_err() {
                return Ok(());
            }

            let line = tokio::select! {
                _ = self.gate.closed() => return Ok(()),
                line = self.source.next_line(&self.prompt) => line,
            };
            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.playback.terminate();
                    return Ok(());
                }
                Err(e) => {
                    self.playback.terminate();
                    return Err(e);
                }
            };

            let text = line.trim();
            if text.eq_ignore_ascii_case(&self.exit_command) {
                tracing::info!("Exit requested");
                self.playback.terminate();
                return Ok(());
            }
            if text.is_empty() {
                self.gate.submitted(false);
                self.playback.release();
                continue;
            }

            let triggered = self.trigger.is_triggered(text);
            let request_id = self.gate.submitted(triggered);
            if !triggered {
                self.playback.release();
            }

            let event = ClientEvent::ChatMessage {
                text: text.to_string(),
                request_id: Some(request_id),
            };
            if self.outbound.send(event).is_err() {
                tracing::warn!("Connection writer has stopped");
                self.playback.terminate();
                self.gate.close();
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_source {
    use std::collections::VecDeque;

    use super::*;

    /// Replays scripted lines, then reports end of input.
    pub struct ScriptedSource {
        lines: VecDeque<String>,
    }

    impl ScriptedSource {
        pub fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl LineSource for ScriptedSource {
        async fn next_line(&mut self, _prompt: &str) -> Result<Option<String>, ClientError> {
            Ok(self.lines.pop_front())
        }
    }
}
