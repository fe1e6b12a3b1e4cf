use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

/// Environment prefix, e.g. `FORM_VALIDATOR_LOCKOUT_MS=2000`.
pub const ENV_PREFIX: &str = "FORM_VALIDATOR";

/// Selectors and timings used by the validator.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Class identifying the form root.
    pub form_class: String,
    /// Class of the wrapper an error node is appended to.
    pub group_class: String,
    pub error_class: String,
    pub alert_class: String,
    /// How long a success alert stays visible.
    pub alert_dismiss_ms: u64,
    /// How long controls stay disabled after a successful submit.
    pub lockout_ms: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            form_class: "registration-form".to_string(),
            group_class: "form-group".to_string(),
            error_class: "form-error".to_string(),
            alert_class: "form-alert".to_string(),
            alert_dismiss_ms: 4000,
            lockout_ms: 1200,
        }
    }
}

impl ValidatorConfig {
    /// Defaults, then the optional file (TOML or JSON5 by extension), then
    /// `FORM_VALIDATOR_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("form_class", defaults.form_class)?
            .set_default("group_class", defaults.group_class)?
            .set_default("error_class", defaults.error_class)?
            .set_default("alert_class", defaults.alert_class)?
            .set_default("alert_dismiss_ms", defaults.alert_dismiss_ms)?
            .set_default("lockout_ms", defaults.lockout_ms)?;

        if let Some(path) = path {
            debug!("Loading validator config from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        builder.build()?.try_deserialize()
    }

    pub fn alert_dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.alert_dismiss_ms)
    }

    pub fn lockout_delay(&self) -> Duration {
        Duration::from_millis(self.lockout_ms)
    }
}
