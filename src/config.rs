//! # Pass Configuration
//!
//! Options for the resolution passes, loadable from YAML in the same kebab-case
//! style as score metadata:
//!
//! ```yaml
//! tie-scope: layer
//! report-dangling-ties: false
//! ```
//!
//! Missing keys take their defaults: ties are scoped to the whole score and
//! dangling ties are reported.

use serde::Deserialize;

use crate::error::ScoreError;

/// Partitioning of the pending-ties set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieScope {
    /// One pending set for the whole score
    #[default]
    Score,
    /// One pending set per layer number; ties cross barlines but not voices
    Layer,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ResolveOptions {
    pub tie_scope: TieScope,
    pub report_dangling_ties: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            tie_scope: TieScope::Score,
            report_dangling_ties: true,
        }
    }
}

impl ResolveOptions {
    /// Parse options from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self, ScoreError> {
        // An empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ScoreError::ConfigError(e.to_string()))
    }

    pub fn with_tie_scope(mut self, tie_scope: TieScope) -> Self {
        self.tie_scope = tie_scope;
        self
    }
}
