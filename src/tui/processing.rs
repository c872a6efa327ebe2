use std::time::Instant;

use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};

use crate::error::RenameError;
use crate::rename_engine::{RenameEngine, Session};
use crate::report::ExecutionSummary;

use super::app::App;
use super::models::{Phase, ProcessingStatus, WorkerEvent};

impl App {
    /// Scans the configured folder on a blocking worker. Rows appear when the
    /// plan arrives through [`App::poll_worker`].
    pub fn start_planning(&mut self) {
        if self.phase.is_busy() {
            return;
        }
        let config = match self.build_config() {
            Ok(config) => config,
            Err(e) => {
                self.set_status_message(e.to_string());
                return;
            }
        };

        self.cancel.reset();
        let engine = RenameEngine::new(config).with_cancel_flag(self.cancel.clone());
        self.session = Some(Session::new(engine.clone()));
        self.files.clear();
        self.processing_progress = 0.0;
        self.phase = Phase::Planning;
        self.start_time = Some(Instant::now());
        self.set_status_message(format!("Reading {}", engine.config().directory.display()));

        let tx = self.spawn_channel();
        tokio::task::spawn_blocking(move || {
            let progress_tx = tx.clone();
            let result = engine.plan_with_progress(|p| {
                let _ = progress_tx.send(WorkerEvent::Progress(p));
            });
            let _ = tx.send(WorkerEvent::Planned(result.map_err(|e| match e {
                RenameError::Cancelled => "Scan cancelled".to_string(),
                other => other.to_string(),
            })));
        });
    }

    /// Applies the approved rows of the current plan on a blocking worker.
    pub fn start_execution(&mut self) {
        if self.phase != Phase::Reviewing {
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        let Some(plan) = session.plan().cloned() else {
            return;
        };
        if plan.ready_count() == 0 {
            self.set_status_message("Nothing selected to rename".to_string());
            return;
        }

        self.cancel.reset();
        let engine = session.engine().clone();
        self.phase = Phase::Executing;
        self.start_time = Some(Instant::now());
        self.stats.processed = 0;

        let tx = self.spawn_channel();
        tokio::task::spawn_blocking(move || {
            let progress_tx = tx.clone();
            let results = engine.execute_with_progress(&plan, |p| {
                let _ = progress_tx.send(WorkerEvent::Progress(p));
            });
            let _ = tx.send(WorkerEvent::Executed(results));
        });
    }

    pub fn cancel_work(&mut self) {
        if self.phase.is_busy() {
            self.cancel.cancel();
            self.set_status_message("Cancelling after the current file...".to_string());
        }
    }

    fn spawn_channel(&mut self) -> UnboundedSender<WorkerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.worker_rx = Some(rx);
        tx
    }

    /// Drains whatever the worker has sent since the last frame.
    pub fn poll_worker(&mut self) {
        let Some(rx) = self.worker_rx.as_mut() else {
            return;
        };
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        for event in events {
            self.handle_worker_event(event);
        }
    }

    pub fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Progress(p) => {
                self.processing_progress = if p.total == 0 { 1.0 } else { p.index as f64 / p.total as f64 };
                if self.phase == Phase::Executing {
                    if let Some(item) = self.files.get_mut(p.index) {
                        if item.will_rename() {
                            item.status = ProcessingStatus::Processing;
                        }
                    }
                    self.current_processing = Some(p.index);
                    self.stats.processed = p.index;
                }
            }
            WorkerEvent::Planned(Ok(plan)) => {
                self.worker_rx = None;
                self.load_plan(&plan);
                let ready = plan.ready_count();
                if let Some(session) = self.session.as_mut() {
                    session.set_plan(plan);
                }
                self.phase = Phase::Reviewing;
                self.show_config = false;
                self.processing_progress = 1.0;
                self.set_status_message(format!("{} of {} file(s) can be renamed", ready, self.files.len()));
            }
            WorkerEvent::Planned(Err(message)) => {
                self.worker_rx = None;
                warn!(error = %message, "scan failed");
                self.session = None;
                self.phase = Phase::Configuring;
                self.show_config = true;
                self.processing_progress = 0.0;
                self.set_status_message(message);
            }
            WorkerEvent::Executed(results) => {
                self.worker_rx = None;
                for (item, result) in self.files.iter_mut().zip(&results) {
                    item.apply_outcome(&result.outcome);
                }
                let summary = ExecutionSummary::of(&results);
                self.stats.processed = summary.total;
                self.stats.successful = summary.renamed;
                self.stats.failed = summary.failed;
                self.stats.skipped = summary.skipped;
                self.current_processing = None;
                self.processing_progress = 1.0;
                self.phase = Phase::Finished;
                if let Some(session) = self.session.as_mut() {
                    session.record_results(results);
                }
                info!(renamed = summary.renamed, failed = summary.failed, "batch finished");

                let message = if self.cancel.is_cancelled() {
                    format!("Cancelled: {} renamed, {} failed", summary.renamed, summary.failed)
                } else {
                    format!("Done: {} renamed, {} failed, {} skipped", summary.renamed, summary.failed, summary.skipped)
                };
                self.set_status_message(message);
            }
        }
    }
}
