//! Registration form validation over an in-memory document.
//!
//! - `dom`: element tree standing in for the page
//! - `rules`: pure validation rules over a [`FormValues`] snapshot
//! - `render`: error / alert / lockout rendering into the document
//! - `validator`: the event-driven [`FormValidator`]
//! - `scheduler`: async [`FormRuntime`] owning the validator and its timers

pub mod accessor;
pub mod config;
pub mod dom;
pub mod effects;
pub mod errors;
pub mod field;
pub mod page;
pub mod render;
pub mod rules;
pub mod scheduler;
pub mod state;
pub mod validator;

pub use accessor::{DocumentFields, FieldAccessor};
pub use config::ValidatorConfig;
pub use dom::{Document, DomError, NodeId};
pub use effects::{Effect, FormEvent, ScheduledTask, TaskId};
pub use errors::{FormError, Result};
pub use field::FieldKey;
pub use page::RegistrationPage;
pub use render::{AlertVariant, FormRenderer};
pub use rules::{validate, ValidationReport, ValidationResult};
pub use scheduler::{FormCommand, FormHandle, FormRuntime, FormSnapshot};
pub use state::FormValues;
pub use validator::{FormValidator, Phase, INVALID_SUMMARY, SUCCESS_SUMMARY};
