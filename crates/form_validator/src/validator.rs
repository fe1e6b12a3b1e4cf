//! Registration form validator.
//!
//! Owns the document and reacts to form events the way a page script would:
//!
//! ```text
//! Idle --submit--> (validate) --invalid--> Idle   (danger alert, errors shown)
//!                             --valid----> Locked (success alert, controls disabled)
//! Locked --unlock timer--> Idle (form reset: controls enabled, fields, errors and alert cleared)
//! ```
//!
//! Operations are synchronous and return the timer [`Effect`]s the caller must
//! carry out. Each submission and each reset cancels whatever the previous
//! cycle left pending.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::accessor::{DocumentFields, FieldAccessor};
use crate::config::ValidatorConfig;
use crate::dom::{Document, NodeId};
use crate::effects::{Effect, FormEvent, ScheduledTask, TaskId};
use crate::errors::Result;
use crate::field::FieldKey;
use crate::render::{AlertVariant, FormRenderer};
use crate::rules::{self, ValidationReport};
use crate::state::FormValues;

pub const INVALID_SUMMARY: &str = "Please fix the errors above and try again.";
pub const SUCCESS_SUMMARY: &str = "Registration successful — thank you!";

/// Lifecycle phase between events. Validation itself is instantaneous and
/// never observable as a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Editable, accepting submissions.
    Idle,
    /// Successful submission in flight; controls are disabled.
    Locked,
}

pub struct FormValidator {
    document: Document,
    form: NodeId,
    config: ValidatorConfig,
    phase: Phase,
    next_task: u64,
    pending: BTreeMap<TaskId, ScheduledTask>,
    last_report: Option<ValidationReport>,
}

impl FormValidator {
    /// Bind to the first element carrying the configured form class.
    ///
    /// Returns `None` when the document has no such form; pages without a
    /// registration form simply get no validator.
    pub fn attach(document: Document, config: ValidatorConfig) -> Option<Self> {
        let Some(form) = document.query_root_by_class(&config.form_class) else {
            debug!("No .{} in document; validator not attached", config.form_class);
            return None;
        };
        debug!("Validator attached to form {}", form);
        Some(Self {
            document,
            form,
            config,
            phase: Phase::Idle,
            next_task: 0,
            pending: BTreeMap::new(),
            last_report: None,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct access for hosts that edit the page outside of form events.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Outcome of the most recent submission.
    pub fn last_report(&self) -> Option<&ValidationReport> {
        self.last_report.as_ref()
    }

    /// Ids of scheduled tasks still considered live.
    pub fn pending_tasks(&self) -> impl Iterator<Item = (&TaskId, &ScheduledTask)> {
        self.pending.iter()
    }

    pub fn values(&self) -> FormValues {
        self.fields().snapshot()
    }

    pub fn fields(&self) -> DocumentFields<'_> {
        DocumentFields::new(&self.document, self.form)
    }

    fn renderer(&mut self) -> FormRenderer<'_> {
        FormRenderer::new(&mut self.document, &self.config)
    }

    /// Dispatch a single event.
    pub fn handle(&mut self, event: FormEvent) -> Result<Vec<Effect>> {
        debug!("Form event: {:?}", event);
        match event {
            FormEvent::Input { target } => {
                self.on_input(target)?;
                Ok(Vec::new())
            }
            FormEvent::Reset => self.on_reset(),
            FormEvent::Submit => self.on_submit(),
            FormEvent::Timer(id) => self.on_timer(id),
        }
    }

    /// Set a field's value the way typing would, then fire the input event.
    ///
    /// Absent fields are ignored.
    pub fn enter_value(&mut self, field: FieldKey, value: impl Into<String>) -> Result<()> {
        let Some(target) = self.fields().element(field) else {
            debug!("Ignoring input for missing field #{}", field);
            return Ok(());
        };
        self.document.set_value(target, value)?;
        self.on_input(target)
    }

    /// A control's value changed: drop its error annotation.
    pub fn on_input(&mut self, target: NodeId) -> Result<()> {
        if !self.document.is_editable(target)? {
            return Ok(());
        }
        self.renderer().clear_error(target)?;
        Ok(())
    }

    /// Form reset: empty the fields and remove every annotation and alert.
    ///
    /// A reset during the lockout window ends it early.
    pub fn on_reset(&mut self) -> Result<Vec<Effect>> {
        if self.phase == Phase::Locked {
            info!("Reset during lockout; controls re-enabled");
        }
        self.reset_form()
    }

    /// Shared by user resets and the end of the lockout: cancel whatever is
    /// pending, unlock the controls and bring the form back to its initial state.
    fn reset_form(&mut self) -> Result<Vec<Effect>> {
        let effects = self.cancel_pending();
        let form = self.form;
        let mut r = self.renderer();
        r.set_controls_disabled(form, false)?;
        r.clear_fields(form)?;
        r.clear_all_errors(form)?;
        r.remove_alert(form)?;
        self.phase = Phase::Idle;
        self.last_report = None;
        Ok(effects)
    }

    /// Form submission: validate every field and render the outcome.
    pub fn on_submit(&mut self) -> Result<Vec<Effect>> {
        let values = self.values();
        self.submit_values(values)
    }

    /// Submit with values read through `fields` instead of the document.
    ///
    /// Feedback is still rendered next to the document's own field elements.
    pub fn submit_from<A: FieldAccessor>(&mut self, fields: &A) -> Result<Vec<Effect>> {
        self.submit_values(fields.snapshot())
    }

    fn submit_values(&mut self, values: FormValues) -> Result<Vec<Effect>> {
        if self.phase == Phase::Locked {
            // the submit control is disabled while locked
            warn!("Submit ignored: submission already in flight");
            return Ok(Vec::new());
        }

        let mut effects = self.cancel_pending();
        let report = rules::validate(&values);
        self.render_report(&report)?;

        let form = self.form;
        if !report.is_valid() {
            info!(
                "Registration rejected: {} field(s) invalid",
                report.failures().count()
            );
            self.renderer()
                .show_alert(form, INVALID_SUMMARY, AlertVariant::Danger)?;
            self.last_report = Some(report);
            return Ok(effects);
        }

        info!("Registration accepted; locking form for {} ms", self.config.lockout_ms);
        let alert = self
            .renderer()
            .show_alert(form, SUCCESS_SUMMARY, AlertVariant::Success)?;
        self.renderer().set_controls_disabled(form, true)?;
        self.phase = Phase::Locked;
        self.last_report = Some(report);

        let dismiss_delay = self.config.alert_dismiss_delay();
        let lockout_delay = self.config.lockout_delay();
        effects.push(self.schedule(ScheduledTask::DismissAlert { alert }, dismiss_delay));
        effects.push(self.schedule(ScheduledTask::Unlock, lockout_delay));
        Ok(effects)
    }

    /// A scheduled task fired. Cancelled or unknown ids are ignored.
    pub fn on_timer(&mut self, id: TaskId) -> Result<Vec<Effect>> {
        let Some(task) = self.pending.remove(&id) else {
            warn!("Ignoring stale timer {}", id);
            return Ok(Vec::new());
        };
        debug!("Running {} ({})", task, id);
        match task {
            ScheduledTask::DismissAlert { alert } => {
                if self.document.contains(alert) {
                    self.document.delete(alert)?;
                }
                Ok(Vec::new())
            }
            ScheduledTask::Unlock => {
                info!("Lockout over; resetting form");
                self.reset_form()
            }
        }
    }

    /// Replace every field's annotation with what the report says.
    fn render_report(&mut self, report: &ValidationReport) -> Result<()> {
        for field in FieldKey::all() {
            let Some(node) = self.fields().element(field) else {
                if let Some(message) = report.error_for(field) {
                    debug!("#{} missing from form: {}", field, message);
                }
                continue;
            };
            match report.error_for(field) {
                Some(message) => self.renderer().set_error(node, message)?,
                None => self.renderer().clear_error(node)?,
            }
        }
        Ok(())
    }

    fn schedule(&mut self, task: ScheduledTask, delay: std::time::Duration) -> Effect {
        self.next_task += 1;
        let id = TaskId(self.next_task);
        self.pending.insert(id, task);
        Effect::Schedule { id, task, delay }
    }

    fn cancel_pending(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.pending)
            .into_keys()
            .map(Effect::Cancel)
            .collect()
    }
}
