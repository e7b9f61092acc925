//! Drives one session on a dedicated task.
//!
//! The task owns the session and handles a single queue of inputs in arrival
//! order: user commands, one-second ticks and autosave ticks. Ticks come from
//! [`Ticker`] tasks that are aborted as soon as the session completes or the
//! handle is dropped.

mod machine;
mod ticker;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use study_core::Clock;
use study_core::session::{
    AutosaveMark, CompletionReason, SessionKind, SessionProgress, round_percent,
};
use study_core::time::elapsed_secs;

use crate::error::RunnerError;

pub use machine::{PointsTally, SessionCommand, SessionMachine};
pub use ticker::Ticker;

const INPUT_QUEUE: usize = 64;

/// Timer settings for a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    pub tick_every: Duration,
    pub autosave_every: Duration,
    /// How long the saved indicator stays visible after an autosave.
    pub saved_visible_for: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_every: Duration::from_secs(1),
            autosave_every: Duration::from_secs(5),
            saved_visible_for: Duration::from_secs(2),
        }
    }
}

impl RunnerConfig {
    #[must_use]
    pub fn with_autosave_secs(mut self, secs: u64) -> Self {
        self.autosave_every = Duration::from_secs(secs.max(1));
        self
    }
}

/// Summary handed to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub kind: SessionKind,
    /// Score for MCQ, accuracy for flashcards, `None` for written tests.
    pub percent: Option<u8>,
    pub correct: u32,
    pub incorrect: u32,
    pub answered: u32,
    pub total: u32,
    pub time_spent_secs: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub reason: CompletionReason,
    /// Written tests only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points: Option<u32>,
}

impl SessionReport {
    /// The score to record: the session percent, or the share of points
    /// answered for written tests.
    #[must_use]
    pub fn score(&self) -> u8 {
        match (self.percent, self.answered_points, self.total_points) {
            (Some(percent), _, _) => percent,
            (None, Some(answered), Some(total)) => round_percent(answered as usize, total as usize),
            _ => 0,
        }
    }
}

/// The most recent autosave, with the moment it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedIndicator {
    pub mark: AutosaveMark,
    pub at: Instant,
}

/// Latest published state of a running session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot<M> {
    pub state: M,
    pub saved: Option<SavedIndicator>,
}

/// How a runner ended.
#[derive(Debug, Clone)]
pub struct SessionExit<M> {
    pub state: M,
    /// Present when the session completed; absent when the user left early.
    pub report: Option<SessionReport>,
}

enum SessionInput {
    Command(SessionCommand, oneshot::Sender<Result<SessionProgress, RunnerError>>),
    Tick,
    Autosave,
    Exit,
}

/// Callback run exactly once with the report of a completed session.
pub type CompletionCallback = Box<dyn FnOnce(SessionReport) + Send>;

/// Client side of a running session.
///
/// Dropping the handle aborts the runner and its tickers.
pub struct SessionHandle<M> {
    inputs: mpsc::Sender<SessionInput>,
    snapshot: watch::Receiver<SessionSnapshot<M>>,
    task: Option<JoinHandle<SessionExit<M>>>,
    saved_visible_for: Duration,
}

/// Spawn a runner for `machine`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_session<M: SessionMachine>(
    machine: M,
    config: RunnerConfig,
    clock: Clock,
    on_complete: CompletionCallback,
) -> SessionHandle<M> {
    let (inputs, queue) = mpsc::channel(INPUT_QUEUE);
    let (publish, snapshot) = watch::channel(SessionSnapshot {
        state: machine.clone(),
        saved: None,
    });

    let mut tickers = Vec::new();
    if machine.is_timed() {
        tickers.push(Ticker::spawn(config.tick_every, inputs.clone(), || {
            SessionInput::Tick
        }));
    }
    if machine.autosaves() {
        tickers.push(Ticker::spawn(config.autosave_every, inputs.clone(), || {
            SessionInput::Autosave
        }));
    }

    log::debug!("starting {} session", machine.kind());
    let runner = Runner {
        machine,
        queue,
        publish,
        tickers,
        clock,
        started_at: clock.now(),
        saved: None,
        on_complete: Some(on_complete),
    };
    let task = tokio::spawn(runner.run());

    SessionHandle {
        inputs,
        snapshot,
        task: Some(task),
        saved_visible_for: config.saved_visible_for,
    }
}

struct Runner<M> {
    machine: M,
    queue: mpsc::Receiver<SessionInput>,
    publish: watch::Sender<SessionSnapshot<M>>,
    tickers: Vec<Ticker>,
    clock: Clock,
    started_at: DateTime<Utc>,
    saved: Option<SavedIndicator>,
    on_complete: Option<CompletionCallback>,
}

impl<M: SessionMachine> Runner<M> {
    async fn run(mut self) -> SessionExit<M> {
        if self.machine.is_completed() {
            return self.complete();
        }

        while let Some(input) = self.queue.recv().await {
            match input {
                SessionInput::Command(command, reply) => {
                    let result = self.machine.apply(&command);
                    let answer = match result {
                        Ok(next) => {
                            self.machine = next;
                            Ok(self.machine.progress())
                        }
                        Err(e) => {
                            log::warn!("rejected {} command: {e}", command.name());
                            Err(e)
                        }
                    };
                    // The caller may have stopped waiting.
                    let _ = reply.send(answer);
                }
                SessionInput::Tick => self.machine = self.machine.tick(),
                SessionInput::Autosave => {
                    if let Some(mark) = self.machine.autosave() {
                        log::debug!(
                            "autosaved question {} ({} words)",
                            mark.question_id,
                            mark.words
                        );
                        self.saved = Some(SavedIndicator {
                            mark,
                            at: Instant::now(),
                        });
                    }
                }
                SessionInput::Exit => break,
            }

            self.publish_snapshot();
            if self.machine.is_completed() {
                return self.complete();
            }
        }

        self.tickers.clear();
        log::debug!("{} session left before completion", self.machine.kind());
        SessionExit {
            state: self.machine,
            report: None,
        }
    }

    fn publish_snapshot(&self) {
        self.publish.send_replace(SessionSnapshot {
            state: self.machine.clone(),
            saved: self.saved,
        });
    }

    fn complete(mut self) -> SessionExit<M> {
        self.tickers.clear();
        self.publish_snapshot();

        let report = self.report();
        if let Some(report) = &report {
            log::debug!(
                "{} session completed ({:?}) with {}/{} answered",
                report.kind,
                report.reason,
                report.answered,
                report.total
            );
            if let Some(callback) = self.on_complete.take() {
                callback(report.clone());
            }
        }
        SessionExit {
            state: self.machine,
            report,
        }
    }

    fn report(&self) -> Option<SessionReport> {
        let outcome = match self.machine.outcome() {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("completed session has no outcome: {e}");
                return None;
            }
        };
        let completed_at = self.clock.now();
        let points = self.machine.points();
        Some(SessionReport {
            kind: outcome.kind,
            percent: outcome.percent,
            correct: outcome.correct,
            incorrect: outcome.incorrect,
            answered: outcome.answered,
            total: outcome.total,
            time_spent_secs: outcome
                .elapsed_secs
                .unwrap_or_else(|| elapsed_secs(self.started_at, completed_at)),
            started_at: self.started_at,
            completed_at,
            reason: outcome.reason,
            answered_points: points.map(|p| p.answered),
            total_points: points.map(|p| p.total),
        })
    }
}

impl<M: SessionMachine> SessionHandle<M> {
    /// Apply a command and return the resulting progress.
    ///
    /// # Errors
    ///
    /// Returns the rejection from the session, or `RunnerError::Closed` once
    /// the runner has stopped.
    pub async fn send(&self, command: SessionCommand) -> Result<SessionProgress, RunnerError> {
        let (reply, answer) = oneshot::channel();
        self.inputs
            .send(SessionInput::Command(command, reply))
            .await
            .map_err(|_| RunnerError::Closed)?;
        answer.await.map_err(|_| RunnerError::Closed)?
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot<M> {
        self.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn state(&self) -> M {
        self.snapshot.borrow().state.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot<M>> {
        self.snapshot.clone()
    }

    /// The last autosave while it is still within its display window.
    #[must_use]
    pub fn saved_indicator(&self) -> Option<AutosaveMark> {
        let saved = self.snapshot.borrow().saved?;
        (saved.at.elapsed() < self.saved_visible_for).then_some(saved.mark)
    }

    /// Leave the session. A session that already completed still yields its report.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::Join` if the runner task failed.
    pub async fn exit(mut self) -> Result<SessionExit<M>, RunnerError> {
        // Fails only when the runner already stopped on its own.
        let _ = self.inputs.send(SessionInput::Exit).await;
        self.join().await
    }

    /// Wait for the session to complete.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::Join` if the runner task failed.
    pub async fn finished(mut self) -> Result<SessionExit<M>, RunnerError> {
        self.join().await
    }

    async fn join(&mut self) -> Result<SessionExit<M>, RunnerError> {
        let task = self.task.take().ok_or(RunnerError::Closed)?;
        Ok(task.await?)
    }
}

impl<M> Drop for SessionHandle<M> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
