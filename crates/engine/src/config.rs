//! Engine configuration.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockres_core::DomainError;

/// Which rule's fallback location receives the remainder when several
/// applicable rules declare one.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// The last applicable rule (in evaluation order) that declares a fallback.
    #[default]
    LastDeclared,
    /// The first applicable rule (in evaluation order) that declares a fallback.
    FirstDeclared,
}

impl FromStr for FallbackPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "last_declared" => Ok(Self::LastDeclared),
            "first_declared" => Ok(Self::FirstDeclared),
            other => Err(DomainError::validation(format!(
                "unknown fallback policy '{other}' (expected last_declared or first_declared)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fallback_policy: FallbackPolicy,
}

impl EngineConfig {
    pub const FALLBACK_POLICY_ENV: &'static str = "STOCKRES_FALLBACK_POLICY";

    /// Defaults overridden by `STOCKRES_FALLBACK_POLICY` when it is set.
    ///
    /// An unparsable value is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(Self::FALLBACK_POLICY_ENV) {
            match raw.parse() {
                Ok(policy) => config.fallback_policy = policy,
                Err(err) => tracing::warn!(
                    "{} ignored: {err}; using {:?}",
                    Self::FALLBACK_POLICY_ENV,
                    config.fallback_policy
                ),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_policy_parses_known_values() {
        assert_eq!(
            "first_declared".parse::<FallbackPolicy>().unwrap(),
            FallbackPolicy::FirstDeclared
        );
        assert_eq!(
            " last_declared ".parse::<FallbackPolicy>().unwrap(),
            FallbackPolicy::LastDeclared
        );
        assert!("newest".parse::<FallbackPolicy>().is_err());
    }

    #[test]
    fn default_policy_is_last_declared() {
        assert_eq!(EngineConfig::default().fallback_policy, FallbackPolicy::LastDeclared);
    }
}
