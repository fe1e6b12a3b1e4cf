//! FormRuntime — async event loop and timer orchestration for one form.
//!
//! Goals
//! - Single loop that owns the [`FormValidator`] and receives commands over an MPSC channel,
//!   so every document mutation happens on one task, one event at a time.
//! - Interpret the validator's [`Effect`]s: `Schedule` spawns a sleeping task that posts
//!   `FormEvent::Timer` back into the loop, `Cancel` aborts it.
//! - Hand out a cloneable [`FormHandle`] for hosts (CLI, tests) to drive the form.
//!
//! Cancellation is cooperative via `JoinHandle::abort()`. A timer that already posted
//! its event before being aborted is filtered out by the validator, which only honours
//! ids it still considers pending.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::effects::{Effect, FormEvent, ScheduledTask, TaskId};
use crate::errors::{FormError, Result};
use crate::field::FieldKey;
use crate::rules::ValidationReport;
use crate::state::FormValues;
use crate::validator::{FormValidator, Phase};

/// Commands sent to the runtime loop.
#[derive(Debug)]
pub enum FormCommand {
    /// Deliver a form event to the validator.
    Dispatch(FormEvent),
    /// Set a field's value as if typed and fire the input event.
    Enter { field: FieldKey, value: String },
    /// Capture the current page state.
    Snapshot { reply: oneshot::Sender<FormSnapshot> },
    /// Abort all timers and stop the loop. Dropping every handle has the same effect.
    Shutdown,
}

/// Point-in-time view of the form, taken inside the loop.
#[derive(Debug, Clone, Serialize)]
pub struct FormSnapshot {
    pub phase: Phase,
    pub values: FormValues,
    pub report: Option<ValidationReport>,
    pub alert: Option<String>,
    pub html: String,
    pub pending_timers: usize,
}

/// Cloneable handle to send commands to the [`FormRuntime`].
#[derive(Clone)]
pub struct FormHandle {
    tx: mpsc::UnboundedSender<FormCommand>,
}

impl FormHandle {
    fn send(&self, cmd: FormCommand) -> Result<()> {
        self.tx.send(cmd).map_err(|_| FormError::RuntimeClosed)
    }

    pub fn submit(&self) -> Result<()> {
        self.send(FormCommand::Dispatch(FormEvent::Submit))
    }

    pub fn reset(&self) -> Result<()> {
        self.send(FormCommand::Dispatch(FormEvent::Reset))
    }

    pub fn input(&self, field: FieldKey, value: impl Into<String>) -> Result<()> {
        self.send(FormCommand::Enter {
            field,
            value: value.into(),
        })
    }

    pub fn dispatch(&self, event: FormEvent) -> Result<()> {
        self.send(FormCommand::Dispatch(event))
    }

    /// Snapshot taken after every previously sent command has been handled.
    pub async fn snapshot(&self) -> Result<FormSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(FormCommand::Snapshot { reply })?;
        rx.await.map_err(|_| FormError::RuntimeClosed)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(FormCommand::Shutdown)
    }
}

/// Runtime state and control loop.
pub struct FormRuntime {
    validator: FormValidator,
    // weak, so the loop ends once every `FormHandle` is gone
    self_tx: mpsc::WeakUnboundedSender<FormCommand>,
    cmd_rx: mpsc::UnboundedReceiver<FormCommand>,
    timers: HashMap<TaskId, JoinHandle<()>>,
}

impl FormRuntime {
    /// Spawn the loop, returning a handle for issuing commands and a `JoinHandle`
    /// that yields the validator back once the loop stops.
    pub fn spawn(validator: FormValidator) -> (FormHandle, JoinHandle<FormValidator>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runtime = FormRuntime {
            validator,
            self_tx: tx.downgrade(),
            cmd_rx: rx,
            timers: HashMap::new(),
        };
        let join = tokio::spawn(runtime.run());
        (FormHandle { tx }, join)
    }

    async fn run(mut self) -> FormValidator {
        info!("Form runtime started");
        while let Some(cmd) = self.cmd_rx.recv().await {
            match cmd {
                FormCommand::Dispatch(event) => {
                    if let FormEvent::Timer(id) = event {
                        self.timers.remove(&id);
                    }
                    match self.validator.handle(event) {
                        Ok(effects) => self.apply(effects),
                        Err(e) => error!("Form event failed: {}", e),
                    }
                }
                FormCommand::Enter { field, value } => {
                    if let Err(e) = self.validator.enter_value(field, value) {
                        error!("Input on #{} failed: {}", field, e);
                    }
                }
                FormCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                FormCommand::Shutdown => {
                    warn!(
                        "Form runtime shutdown requested; aborting {} timer(s)",
                        self.timers.len()
                    );
                    break;
                }
            }
        }

        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
        info!("Form runtime terminating");
        self.validator
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule { id, task, delay } => self.schedule(id, task, delay),
                Effect::Cancel(id) => self.cancel(id),
            }
        }
    }

    fn schedule(&mut self, id: TaskId, task: ScheduledTask, delay: Duration) {
        debug!("Scheduling {} ({}) in {:?}", task, id, delay);
        let tx = self.self_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(FormCommand::Dispatch(FormEvent::Timer(id)));
            }
        });
        self.timers.insert(id, handle);
    }

    fn cancel(&mut self, id: TaskId) {
        if let Some(timer) = self.timers.remove(&id) {
            debug!("Cancelling timer {}", id);
            timer.abort();
        }
    }

    fn snapshot(&self) -> FormSnapshot {
        let doc = self.validator.document();
        let form = self.validator.form();
        let alert = doc
            .find_first_by_class(form, &self.validator.config().alert_class)
            .ok()
            .flatten()
            .and_then(|a| doc.text(a).ok().map(str::to_string));
        FormSnapshot {
            phase: self.validator.phase(),
            values: self.validator.values(),
            report: self.validator.last_report().cloned(),
            alert,
            html: doc.to_html(form).unwrap_or_default(),
            pending_timers: self.timers.len(),
        }
    }
}
