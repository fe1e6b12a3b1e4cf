/*!
Effect & event model.

The validator itself never sleeps or spawns anything. Operations that need
deferred work return declarative [`Effect`]s; whoever drives the validator
(see `scheduler.rs`) interprets them and feeds [`FormEvent::Timer`] back in
once a delay has elapsed.

Every scheduled task carries a [`TaskId`]. Cancelling a task is a request to
the driver; the validator additionally drops ids it no longer considers
pending, so a timer that slips through a cancellation has no effect.
*/

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::dom::NodeId;

/// Monotonic id of a scheduled task, unique per validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Deferred work the validator asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScheduledTask {
    /// Remove a success alert (if it is still shown).
    DismissAlert { alert: NodeId },
    /// End the lockout window: re-enable controls and clear the fields.
    Unlock,
}

impl fmt::Display for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduledTask::DismissAlert { alert } => write!(f, "DismissAlert({alert})"),
            ScheduledTask::Unlock => write!(f, "Unlock"),
        }
    }
}

/// Declarative instruction returned by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver `FormEvent::Timer(id)` after `delay`.
    Schedule {
        id: TaskId,
        task: ScheduledTask,
        delay: Duration,
    },
    /// Drop a previously scheduled task.
    Cancel(TaskId),
}

/// Events the validator reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The value of `target` changed.
    Input { target: NodeId },
    /// The form was reset.
    Reset,
    /// The form was submitted.
    Submit,
    /// A scheduled task's delay elapsed.
    Timer(TaskId),
}
