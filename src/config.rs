//! Engine configuration.
//!
//! Built from the command line at startup and changed at runtime through
//! UCI `setoption`.

use crate::error::{EngineError, Result};
use std::path::PathBuf;

pub const DEFAULT_POLICY: &str = "random";
pub const DEFAULT_VALUE: &str = "material";
pub const DEFAULT_CONFIDENCE: f32 = 5.0;
pub const DEFAULT_ROLLOUT_DEPTH: u32 = 50;

pub const OPTION_POLICY_NAME: &str = "Policy Name";
pub const OPTION_POLICY_FILE: &str = "Policy File";
pub const OPTION_VALUE_NAME: &str = "Value Name";
pub const OPTION_VALUE_FILE: &str = "Value File";
pub const OPTION_CONFIDENCE: &str = "Confidence";

/// What a `setoption` changed, so the caller knows how much to rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionChange {
    Oracles,
    Confidence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Name of the policy oracle (`random`, `capture`).
    pub policy_name: String,

    /// Weight file for a trained policy.
    pub policy_file: Option<PathBuf>,

    /// Name of the value oracle (`zero`, `material`, `rollout`).
    pub value_name: String,

    /// Weight file for a trained value network.
    pub value_file: Option<PathBuf>,

    /// Exploration weight in the UCB formula. Must be positive.
    pub confidence: f32,

    /// Maximum plies per playout for the `rollout` value oracle.
    pub rollout_depth: u32,

    /// Seed for the search RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy_name: DEFAULT_POLICY.to_string(),
            policy_file: None,
            value_name: DEFAULT_VALUE.to_string(),
            value_file: None,
            confidence: DEFAULT_CONFIDENCE,
            rollout_depth: DEFAULT_ROLLOUT_DEPTH,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_policy(mut self, name: &str) -> Self {
        self.policy_name = name.to_string();
        self
    }

    pub fn with_value(mut self, name: &str) -> Self {
        self.value_name = name.to_string();
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.confidence.is_finite() && self.confidence > 0.0) {
            return Err(EngineError::InvalidOption(format!(
                "{} must be a positive number, got {}",
                OPTION_CONFIDENCE, self.confidence
            )));
        }
        Ok(())
    }

    /// `option` lines announced in reply to `uci`.
    pub fn uci_options(&self) -> Vec<String> {
        let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
        vec![
            format!("option name {} type string default {}", OPTION_POLICY_NAME, self.policy_name),
            format!("option name {} type string default {}", OPTION_POLICY_FILE, path(&self.policy_file)),
            format!("option name {} type string default {}", OPTION_VALUE_NAME, self.value_name),
            format!("option name {} type string default {}", OPTION_VALUE_FILE, path(&self.value_file)),
            format!("option name {} type string default {}", OPTION_CONFIDENCE, self.confidence),
        ]
    }

    /// Applies `setoption name <name> value <value>`. Names match without
    /// regard to case. On error the config is left unchanged.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<OptionChange> {
        let name = name.trim();
        let value = value.trim();
        let file = |v: &str| if v.is_empty() { None } else { Some(PathBuf::from(v)) };

        if name.eq_ignore_ascii_case(OPTION_POLICY_NAME) {
            self.policy_name = value.to_string();
            Ok(OptionChange::Oracles)
        } else if name.eq_ignore_ascii_case(OPTION_POLICY_FILE) {
            self.policy_file = file(value);
            Ok(OptionChange::Oracles)
        } else if name.eq_ignore_ascii_case(OPTION_VALUE_NAME) {
            self.value_name = value.to_string();
            Ok(OptionChange::Oracles)
        } else if name.eq_ignore_ascii_case(OPTION_VALUE_FILE) {
            self.value_file = file(value);
            Ok(OptionChange::Oracles)
        } else if name.eq_ignore_ascii_case(OPTION_CONFIDENCE) {
            let confidence: f32 = value
                .parse()
                .map_err(|_| EngineError::InvalidOption(format!("{} is not a number: {}", OPTION_CONFIDENCE, value)))?;
            let candidate = self.clone().with_confidence(confidence);
            candidate.validate()?;
            *self = candidate;
            Ok(OptionChange::Confidence)
        } else {
            Err(EngineError::InvalidOption(format!("no such option: {}", name)))
        }
    }
}
