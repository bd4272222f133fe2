//! # score-context
//!
//! Resolution of contextual properties in a music notation tree.
//!
//! A [`Score`] is a typed tree of notation elements. Once it is built, [`prepare`]
//! walks it to pair tied notes and to link sung syllables to notes; the functions
//! in [`context`] then answer position-dependent questions about any note (its
//! effective duration and stem direction inside chords and beams).
//!
//! ## Pipeline
//! 1. Build the tree with [`Score::add_child`]
//! 2. [`prepare`] - reset ties, run the tie pass, run the lyric pass
//! 3. Query: [`Score::tie_of`], [`effective_stem_direction`], [`LyricLinks::window_of`], ...
//!
//! Data problems (a tie end without a start, a tie never closed) are reported to
//! a [`DiagnosticSink`] and never abort the passes.

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod lyrics;
pub mod model;
pub mod note;
pub mod ties;
pub mod traversal;
pub mod tree;

pub use config::{ResolveOptions, TieScope};
pub use context::{
    effective_duration, effective_stem_direction, enclosing_chord, has_effective_stem_direction,
    MAX_CHORD_DEPTH,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, LogSink};
pub use error::ScoreError;
pub use lyrics::{link_lyrics, LyricLinks, LyricWindow, SyllableSpan};
pub use model::*;
pub use note::{Note, TieRelation};
pub use ties::{resolve_ties, TieReport};
pub use traversal::{walk, Flow, Visitor};
pub use tree::{Node, NodeId, Score};

/// Results of the resolution passes
#[derive(Debug, Clone)]
pub struct Prepared {
    pub ties: TieReport,
    pub lyrics: LyricLinks,
}

/// Run every resolution pass over the score.
///
/// Tie relations from an earlier run are dropped first, so this can be called again
/// after the tree changed.
///
/// # Example
/// ```rust
/// use score_context::{prepare, DurationValue, Note, PitchName, ResolveOptions, Score, TieState};
///
/// let (mut score, layer) = Score::with_layer();
/// let a = score.add_child(layer, Note::new(PitchName::C, 4, DurationValue::Whole).with_tie(TieState::Initial).into())?;
/// let b = score.add_child(layer, Note::new(PitchName::C, 4, DurationValue::Whole).with_tie(TieState::Terminal).into())?;
///
/// let mut diagnostics = Vec::new();
/// let prepared = prepare(&mut score, &ResolveOptions::default(), &mut diagnostics)?;
/// assert_eq!(prepared.ties.bound, 1);
/// assert_eq!(score.tie_of(a).and_then(|t| t.end), Some(b));
/// # Ok::<(), score_context::ScoreError>(())
/// ```
pub fn prepare<S: DiagnosticSink + ?Sized>(
    score: &mut Score,
    options: &ResolveOptions,
    sink: &mut S,
) -> Result<Prepared, ScoreError> {
    score.reset_ties();
    let ties = resolve_ties(score, options, sink)?;
    let lyrics = link_lyrics(score, sink)?;
    log::debug!(
        "prepared score: {} tie(s) bound, {} malformed, {} dangling",
        ties.bound,
        ties.malformed,
        ties.dangling
    );
    Ok(Prepared { ties, lyrics })
}

/// [`prepare`] with default options, reporting diagnostics through `log`
pub fn prepare_logged(score: &mut Score) -> Result<Prepared, ScoreError> {
    prepare(score, &ResolveOptions::default(), &mut LogSink)
}
