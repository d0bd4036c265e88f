//! Off-thread parsing with a message-passing protocol.
//!
//! A [`WorkerRequest`] goes in; zero or more [`WorkerMessage::Progress`]
//! messages come out, followed by exactly one terminal
//! [`WorkerMessage::Parsed`] or [`WorkerMessage::Error`]. The worker shares
//! nothing with its caller except the channel and a [`CancelToken`].
//!
//! ```no_run
//! use clearlane_csv::worker::{WorkerMessage, WorkerRequest, spawn_parse};
//!
//! let handle = spawn_parse(WorkerRequest::new("stop,violations\nMain St,4"));
//! for message in handle.messages() {
//!     if let WorkerMessage::Parsed { metadata, .. } = message {
//!         println!("{} row(s)", metadata.row_count);
//!     }
//! }
//! ```

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::mpsc::{self, Receiver, Sender},
    thread::{self, JoinHandle},
    time::Instant,
};

use anyhow::{Context, Result, anyhow};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::{
    config::ParseConfig,
    memory::estimate_memory_usage,
    error::ParseError,
    parser::{CancelToken, ParseOutput, ProgressEvent, parse_text_with},
};

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerRequest {
    pub text: String,
    #[serde(default)]
    pub config: ParseConfig,
}

impl WorkerRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            config: ParseConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMetadata {
    pub processing_time_ms: f64,
    pub row_count: usize,
    pub column_count: usize,
    pub memory_usage_estimate_bytes: usize,
}

impl ParseMetadata {
    fn collect(output: &ParseOutput, started: Instant) -> Self {
        Self {
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            row_count: output.row_count(),
            column_count: output.column_count(),
            memory_usage_estimate_bytes: estimate_memory_usage(&output.rows),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerMessage {
    Progress(ProgressEvent),
    Parsed {
        data: ParseOutput,
        metadata: ParseMetadata,
    },
    Error {
        message: String,
        stack: String,
    },
}

impl WorkerMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerMessage::Progress(_))
    }
}

/// Runs one request to completion on the current thread, sending every
/// message through `sender`.
///
/// Send failures mean the caller stopped listening and are ignored. A panic
/// during the parse is reported as an `error` message.
pub fn handle_request(
    request: &WorkerRequest,
    cancel: &CancelToken,
    sender: &Sender<WorkerMessage>,
) {
    respond(sender, || {
        parse_text_with(&request.text, &request.config, cancel, |event| {
            let _ = sender.send(WorkerMessage::Progress(event));
        })
    });
}

/// Runs `parse` and sends exactly one terminal message for its outcome.
fn respond<F>(sender: &Sender<WorkerMessage>, parse: F)
where
    F: FnOnce() -> std::result::Result<ParseOutput, ParseError>,
{
    let started = Instant::now();
    let terminal = match panic::catch_unwind(AssertUnwindSafe(parse)) {
        Ok(Ok(output)) => {
            let metadata = ParseMetadata::collect(&output, started);
            debug!(
                "Parsed {} row(s) x {} column(s) in {:.2} ms",
                metadata.row_count, metadata.column_count, metadata.processing_time_ms
            );
            WorkerMessage::Parsed {
                data: output,
                metadata,
            }
        }
        Ok(Err(err)) => {
            error!("Parse failed: {err}");
            WorkerMessage::Error {
                message: err.to_string(),
                stack: err.source_chain(),
            }
        }
        Err(payload) => {
            let reason = panic_reason(payload.as_ref());
            error!("Parse panicked: {reason}");
            WorkerMessage::Error {
                message: format!("Parse failed unexpectedly: {reason}"),
                stack: reason,
            }
        }
    };
    let _ = sender.send(terminal);
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(reason) = payload.downcast_ref::<&str>() {
        (*reason).to_string()
    } else if let Some(reason) = payload.downcast_ref::<String>() {
        reason.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Handle to a parse running on its own thread.
pub struct ParseHandle {
    receiver: Receiver<WorkerMessage>,
    cancel: CancelToken,
    thread: JoinHandle<()>,
}

impl ParseHandle {
    /// Blocking iterator over messages; ends after the terminal message.
    pub fn messages(&self) -> impl Iterator<Item = WorkerMessage> + '_ {
        self.receiver.iter()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the terminal message, forwarding progress to `on_progress`.
    pub fn wait<F>(self, mut on_progress: F) -> Result<WorkerMessage>
    where
        F: FnMut(&ProgressEvent),
    {
        let mut terminal = None;
        for message in self.receiver.iter() {
            match message {
                WorkerMessage::Progress(event) => on_progress(&event),
                other => {
                    terminal = Some(other);
                    break;
                }
            }
        }
        self.thread
            .join()
            .map_err(|_| anyhow!("Parse worker panicked"))?;
        terminal.context("Parse worker exited without a terminal message")
    }
}

pub fn spawn_parse(request: WorkerRequest) -> ParseHandle {
    let (sender, receiver) = mpsc::channel();
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let thread = thread::spawn(move || handle_request(&request, &worker_cancel, &sender));
    ParseHandle {
        receiver,
        cancel,
        thread,
    }
}
