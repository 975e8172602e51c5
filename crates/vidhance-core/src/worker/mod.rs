//! Background thread that runs one long operation at a time.
//!
//! Callers submit [`WorkerCommand`]s and read [`WorkerResult`]s from a
//! channel. The preview session lives on the worker thread.

mod messages;
mod progress;

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Instant;

use tracing::{debug, warn};

pub use messages::{WorkerCommand, WorkerResult};
pub use progress::ChannelReporter;

use crate::error::{Result, VidhanceError};
use crate::pipeline::{export_videos_reported, CancelToken};
use crate::preview::PreviewSession;

/// Handle to a running worker thread.
///
/// Dropping the handle closes the command channel, which ends the thread
/// once the current command finishes.
pub struct WorkerHandle {
    commands: mpsc::Sender<WorkerCommand>,
    results: mpsc::Receiver<WorkerResult>,
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Queue a command. Commands run in submission order.
    pub fn submit(&self, command: WorkerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| VidhanceError::Worker("worker thread has stopped".into()))
    }

    /// Cancel the export in progress, or the next queued one if none is
    /// running yet. Checked between frames; cleared once that export ends.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the next result arrives.
    pub fn recv(&self) -> Option<WorkerResult> {
        self.results.recv().ok()
    }

    /// Next result, if one is already waiting.
    pub fn try_recv(&self) -> Option<WorkerResult> {
        self.results.try_recv().ok()
    }

    /// Close the command channel and wait for the thread to exit.
    pub fn shutdown(mut self) -> Result<()> {
        let thread = self.thread.take();
        drop(self);
        if let Some(thread) = thread {
            thread
                .join()
                .map_err(|_| VidhanceError::Worker("worker thread panicked".into()))?;
        }
        Ok(())
    }
}

/// Spawn the worker thread.
pub fn spawn_worker() -> Result<WorkerHandle> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();
    let (result_tx, result_rx) = mpsc::channel::<WorkerResult>();
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();

    let thread = std::thread::Builder::new()
        .name("vidhance-worker".into())
        .spawn(move || worker_loop(cmd_rx, result_tx, worker_cancel))?;

    Ok(WorkerHandle {
        commands: cmd_tx,
        results: result_rx,
        cancel,
        thread: Some(thread),
    })
}

fn send(tx: &mpsc::Sender<WorkerResult>, result: WorkerResult) {
    let _ = tx.send(result);
}

fn send_error(tx: &mpsc::Sender<WorkerResult>, msg: impl Into<String>) {
    send(tx, WorkerResult::Error { message: msg.into() });
}

fn send_preview(tx: &mpsc::Sender<WorkerResult>, session: &PreviewSession) {
    send(
        tx,
        WorkerResult::Preview {
            frame: session.current().clone(),
            index: session.frame_index(),
            total_frames: session.total_frames(),
        },
    );
}

fn worker_loop(
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    tx: mpsc::Sender<WorkerResult>,
    cancel: CancelToken,
) {
    let mut session: Option<PreviewSession> = None;

    while let Ok(cmd) = cmd_rx.recv() {
        debug!(?cmd, "Worker command");
        match cmd {
            WorkerCommand::LoadPreview { path, frame_index } => {
                match PreviewSession::load(&path, frame_index) {
                    Ok(loaded) => {
                        send_preview(&tx, &loaded);
                        session = Some(loaded);
                    }
                    Err(e) => send_error(&tx, format!("Failed to load preview: {e}")),
                }
            }
            WorkerCommand::Export { config } => {
                handle_export(&config, &cancel, &tx);
            }
            edit => {
                let Some(current) = session.as_ref() else {
                    send_error(&tx, "No preview loaded");
                    continue;
                };
                match apply_edit(current, edit, &tx) {
                    Ok(next) => {
                        send_preview(&tx, &next);
                        session = Some(next);
                    }
                    Err(VidhanceError::NotReady(message)) => {
                        send(&tx, WorkerResult::NotReady { message });
                    }
                    Err(e) => send_error(&tx, e.to_string()),
                }
            }
        }
    }
}

fn apply_edit(
    session: &PreviewSession,
    edit: WorkerCommand,
    tx: &mpsc::Sender<WorkerResult>,
) -> Result<PreviewSession> {
    match edit {
        WorkerCommand::SetGamma { level } => Ok(session.with_gamma(level)),
        WorkerCommand::ComputeHistogram => {
            let next = session.compute_histogram()?;
            if let Some(histogram) = next.histogram() {
                send(
                    tx,
                    WorkerResult::HistogramReady {
                        histogram: histogram.clone(),
                    },
                );
            }
            Ok(next)
        }
        WorkerCommand::Equalize { mode, clahe } => session.equalize(mode, &clahe),
        WorkerCommand::DetectEdges => session.with_edges(),
        WorkerCommand::Sharpen => Ok(session.sharpened()),
        WorkerCommand::ResetPreview => Ok(session.reset()),
        WorkerCommand::LoadPreview { .. } | WorkerCommand::Export { .. } => {
            Err(VidhanceError::Worker("not a preview edit".into()))
        }
    }
}

fn handle_export(
    config: &crate::pipeline::config::ExportConfig,
    cancel: &CancelToken,
    tx: &mpsc::Sender<WorkerResult>,
) {
    send(
        tx,
        WorkerResult::ExportStarted {
            total: config.inputs.len(),
        },
    );

    let start = Instant::now();
    let reporter = ChannelReporter::new(tx.clone());
    match export_videos_reported(config, &reporter, cancel) {
        Ok(report) => send(
            tx,
            WorkerResult::ExportComplete {
                report,
                elapsed: start.elapsed(),
            },
        ),
        Err(e) => {
            warn!(error = %e, "Export aborted");
            send_error(tx, format!("Export failed: {e}"));
        }
    }
    // a cancel only ever applies to the export it was issued against
    cancel.reset();
}
