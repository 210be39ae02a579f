//! Evaluator configuration.
//!
//! The only knob is whether the geometry-based checks run. Non-rendering
//! environments report zero-sized boxes for everything, which would make every
//! element look hidden, so those checks are skipped there. The context says
//! whether it is such an environment; configuration can override it.

use std::env;

use serde::Deserialize;

/// Environment variable read by [`EvaluatorConfig::from_env`].
pub const SIMULATED_ENV_VAR: &str = "VISIBILITY_SIMULATED";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// `None` asks the rendering context; `Some` forces the answer.
    pub simulated_environment: Option<bool>,
}

impl EvaluatorConfig {
    #[inline]
    #[must_use]
    pub const fn new(simulated_environment: Option<bool>) -> Self {
        Self {
            simulated_environment,
        }
    }

    /// Force (or stop forcing) the simulated-environment behaviour.
    #[inline]
    #[must_use]
    pub const fn with_simulated_environment(mut self, simulated: Option<bool>) -> Self {
        self.simulated_environment = simulated;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `VISIBILITY_SIMULATED`: `1`/`true` forces simulated mode,
    /// `0`/`false` forces real geometry, anything else (or unset) defers to
    /// the rendering context.
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let simulated_environment = env::var(SIMULATED_ENV_VAR)
            .ok()
            .and_then(|val| parse_flag(&val));
        Self {
            simulated_environment,
        }
    }

    /// Whether geometry checks should be skipped, given the context's own answer.
    #[inline]
    pub fn is_simulated(&self, context_says: bool) -> bool {
        self.simulated_environment.unwrap_or(context_says)
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_values() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn override_wins_over_context() {
        let deferred = EvaluatorConfig::default();
        assert!(deferred.is_simulated(true));
        assert!(!deferred.is_simulated(false));

        let forced = deferred.with_simulated_environment(Some(false));
        assert!(!forced.is_simulated(true));
    }

    #[test]
    fn deserializes_with_defaults() {
        let empty: EvaluatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, EvaluatorConfig::default());
        let forced: EvaluatorConfig =
            serde_json::from_str(r#"{ "simulated_environment": true }"#).unwrap();
        assert_eq!(forced.simulated_environment, Some(true));
    }
}
