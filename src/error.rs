//! # Error Types
//!
//! This module defines the fatal error type for score-context.
//!
//! Only structural violations are errors: they are programmer mistakes (building a
//! tree with an element in the wrong place, opening a tie twice on the same note)
//! and abort the operation that triggered them. Data-quality problems found while
//! resolving ties or lyrics are not errors; they are reported as
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s and the pass keeps going.
//!
//! ## Usage
//! ```rust
//! use score_context::{Element, Score, ScoreError, Verse};
//!
//! let (mut score, layer) = Score::with_layer();
//! // A verse can only live under a note
//! match score.add_child(layer, Element::Verse(Verse::new(1))) {
//!     Err(ScoreError::InvalidChildKind { parent, child }) => {
//!         eprintln!("cannot add {} under {}", child, parent);
//!     }
//!     _ => unreachable!(),
//! }
//! ```

use thiserror::Error;

use crate::model::ElementRole;

#[derive(Error, Debug, PartialEq)]
pub enum ScoreError {
    /// The child's role is not permitted under the parent's role.
    ///
    /// # Example
    /// ```
    /// # use score_context::{ElementRole, ScoreError};
    /// let err = ScoreError::InvalidChildKind {
    ///     parent: ElementRole::Chord,
    ///     child: ElementRole::Beam,
    /// };
    /// assert_eq!(err.to_string(), "Invalid child kind: beam cannot be added to chord");
    /// ```
    #[error("Invalid child kind: {child} cannot be added to {parent}")]
    InvalidChildKind {
        parent: ElementRole,
        child: ElementRole,
    },

    /// A tie relation was opened on a note that already holds one.
    #[error("Tie already open on note '{0}'")]
    TieAlreadyOpen(String),

    /// The end of a tie relation was bound a second time.
    #[error("Tie starting on note '{0}' is already bound")]
    TieAlreadyBound(String),

    /// An explicit id is already used by another node.
    #[error("Duplicate id: '{0}'")]
    DuplicateId(String),

    /// A node id does not belong to this score, or does not have the expected role.
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// A parent does not list its child exactly once.
    #[error("Broken parent link on '{id}': listed {count} time(s) by its parent")]
    BrokenParentLink { id: String, count: usize },

    /// Invalid pass configuration.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}
