//! Paced playback of streamed replies.
//!
//! Inbound handlers only enqueue [`DisplayQueueEntry`] values; a single
//! consumer task renders them in FIFO order. The queue is unbounded so pacing
//! never delays receipt of further chunks.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{gate::TurnGate, ui::DisplaySurface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayQueueEntry {
    /// One chunk of a reply, rendered character by character
    Text(String),
    /// A whole line, rendered on a line of its own
    Notice(String),
    /// End of a reply: one line break, then the turn may continue
    EndOfStream,
    /// Let the turn continue without rendering anything
    Release,
    /// Stop the consumer
    Terminate,
}

/// Typing effect timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub char_delay: Duration,
    /// Pause after a reply before the next prompt
    pub settle_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            char_delay: Duration::from_millis(5),
            settle_delay: Duration::from_millis(100),
        }
    }
}

impl Pacing {
    /// Render chunks atomically with no pauses
    pub fn disabled() -> Self {
        Self {
            char_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
        }
    }
}

/// Producer side of the display queue
#[derive(Clone)]
pub struct PlaybackHandle {
    queue: mpsc::UnboundedSender<DisplayQueueEntry>,
    terminated: Arc<AtomicBool>,
}

impl PlaybackHandle {
    fn enqueue(&self, entry: DisplayQueueEntry) {
        if self.queue.send(entry).is_err() {
            tracing::debug!("Playback consumer has stopped, dropping entry");
        }
    }

    pub fn text(&self, chunk: impl Into<String>) {
        self.enqueue(DisplayQueueEntry::Text(chunk.into()));
    }

    pub fn notice(&self, line: impl Into<String>) {
        self.enqueue(DisplayQueueEntry::Notice(line.into()));
    }

    pub fn end_of_stream(&self) {
        self.enqueue(DisplayQueueEntry::EndOfStream);
    }

    pub fn release(&self) {
        self.enqueue(DisplayQueueEntry::Release);
    }

    /// Enqueue `Terminate`. Only the first call has an effect.
    pub fn terminate(&self) {
        if !self.terminated.swap(true, Ordering::SeqCst) {
            self.enqueue(DisplayQueueEntry::Terminate);
        }
    }
}

pub struct PlaybackScheduler;

impl PlaybackScheduler {
    /// Start the consumer. The task hands the surface back once it stops.
    pub fn spawn<S>(surface: S, gate: TurnGate, pacing: Pacing) -> (PlaybackHandle, JoinHandle<S>)
    where
        S: DisplaySurface + 'static,
    {
        let (queue, rx) = mpsc::unbounded_channel();
        let handle = PlaybackHandle {
            queue,
            terminated: Arc::new(AtomicBool::new(false)),
        };
        let renderer = Renderer {
            surface,
            gate,
            pacing,
            at_line_start: true,
        };
        (handle, tokio::spawn(renderer.run(rx)))
    }
}

struct Renderer<S> {
    surface: S,
    gate: TurnGate,
    pacing: Pacing,
    at_line_start: bool,
}

impl<S: DisplaySurface> Renderer<S> {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<DisplayQueueEntry>) -> S {
        while let Some(entry) = rx.recv().await {
            match entry {
                DisplayQueueEntry::Text(chunk) => self.render_text(&chunk).await,
                DisplayQueueEntry::Notice(line) => {
                    self.break_line();
                    self.surface.write(&line);
                    self.surface.write("\n");
                }
                DisplayQueueEntry::EndOfStream => {
                    self.surface.write("\n");
                    self.at_line_start = true;
                    if !self.pacing.settle_delay.is_zero() {
                        tokio::time::sleep(self.pacing.settle_delay).await;
                    }
                    self.gate.display_drained();
                }
                DisplayQueueEntry::Release => self.gate.display_drained(),
                DisplayQueueEntry::Terminate => break,
            }
        }
        self.break_line();
        self.surface
    }

    async fn render_text(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        if self.pacing.char_delay.is_zero() {
            self.surface.write(chunk);
        } else {
            let mut buf = [0u8; 4];
            for ch in chunk.chars() {
                self.surface.write(ch.encode_utf8(&mut buf));
                tokio::time::sleep(self.pacing.char_delay).await;
            }
        }
        self.at_line_start = chunk.ends_with('\n');
    }

    /// Finish a partially rendered line
    fn break_line(&mut self) {
        if !self.at_line_start {
            self.surface.write("\n");
            self.at_line_start = true;
        }
    }
}
