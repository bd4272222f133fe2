//! # Tie Resolution
//!
//! Pairs notes carrying `@tie` attributes into [`TieRelation`](crate::TieRelation)s in a single walk
//! over the score.
//!
//! ## Algorithm
//! The pass keeps a list of notes with an open tie (the pending set), in the order
//! they were opened. For every note, in reading order:
//!
//! 1. **Governing state** - inside a chord, the chord's `@tie` applies to each of its
//!    notes; otherwise the note's own `@tie`
//! 2. **Pitch match** - the first pending note with the same pitch name and octave
//!    is the candidate. Oldest first, not most recent
//! 3. **Close** - if the governing state is medial or terminal, the candidate's tie
//!    ends on this note. Any other state means the data is inconsistent: the
//!    candidate's tie is dropped and a diagnostic is emitted. Either way the candidate
//!    leaves the pending set. A medial or terminal note with no candidate at all is
//!    reported too
//! 4. **Open** - independently of step 3, an initial or medial state opens a new tie
//!    from this note and appends it to the pending set
//!
//! A medial note can therefore close one tie and open the next in the same visit,
//! which is how tie chains across barlines are resolved.
//!
//! Ties still pending at the end are reported as dangling and left open.
//!
//! ## Chords
//! A chord with `@tie="i"` opens one relation per member note; each member is matched
//! against the pending set by its own pitch.
//!
//! ## Scope
//! With [`TieScope::Layer`] each layer number gets its own pending set, so a tie
//! never binds notes of different voices.
//!
//! ## Example
//! ```rust
//! use score_context::{resolve_ties, DurationValue, Note, PitchName, ResolveOptions, Score, TieState};
//!
//! let (mut score, layer) = Score::with_layer();
//! let first = score.add_child(layer, Note::new(PitchName::C, 4, DurationValue::Half).with_tie(TieState::Initial).into())?;
//! let second = score.add_child(layer, Note::new(PitchName::C, 4, DurationValue::Half).with_tie(TieState::Terminal).into())?;
//!
//! let mut diagnostics = Vec::new();
//! let report = resolve_ties(&mut score, &ResolveOptions::default(), &mut diagnostics)?;
//!
//! assert_eq!(report.bound, 1);
//! assert_eq!(score.tie_of(first).and_then(|t| t.end), Some(second));
//! assert!(diagnostics.is_empty());
//! # Ok::<(), score_context::ScoreError>(())
//! ```
//!
//! ## Related Modules
//! - `note` - owns the tie relation and enforces open-once / bind-once
//! - `traversal` - the walk this pass plugs into
//! - `diagnostics` - where malformed and dangling ties are reported

use std::collections::BTreeMap;

use crate::config::{ResolveOptions, TieScope};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::ScoreError;
use crate::model::{Element, ElementRole, Pitch, TieState};
use crate::traversal::{walk, Flow, Visitor};
use crate::tree::{NodeId, Score};

/// Outcome counts of one tie pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TieReport {
    /// Relations bound to an end note
    pub bound: usize,
    /// Malformed tie attributes reported
    pub malformed: usize,
    /// Relations left open at the end
    pub dangling: usize,
}

/// Resolve all ties of the score.
///
/// The score must not hold tie relations from an earlier run; call
/// [`Score::reset_ties`] first when re-resolving.
///
/// # Errors
/// [`ScoreError::TieAlreadyOpen`] if a note that should open a tie already holds one.
pub fn resolve_ties<S: DiagnosticSink + ?Sized>(
    score: &mut Score,
    options: &ResolveOptions,
    sink: &mut S,
) -> Result<TieReport, ScoreError> {
    let mut pass = TiePass::new(options, sink);
    let root = score.root();
    walk(score, root, &mut pass)?;
    Ok(pass.finish(score))
}

struct TiePass<'s, S: DiagnosticSink + ?Sized> {
    scope: TieScope,
    report_dangling: bool,
    /// Pending set per partition (layer number, or 0 for the whole score)
    pending: BTreeMap<u8, Vec<NodeId>>,
    partition: u8,
    /// Partitions of the enclosing layers, restored on leaving each layer
    outer_partitions: Vec<u8>,
    chords: Vec<NodeId>,
    sink: &'s mut S,
    report: TieReport,
}

impl<'s, S: DiagnosticSink + ?Sized> TiePass<'s, S> {
    fn new(options: &ResolveOptions, sink: &'s mut S) -> Self {
        Self {
            scope: options.tie_scope,
            report_dangling: options.report_dangling_ties,
            pending: BTreeMap::new(),
            partition: 0,
            outer_partitions: Vec::new(),
            chords: Vec::new(),
            sink,
            report: TieReport::default(),
        }
    }

    fn governing_state(&self, score: &Score, note: NodeId) -> TieState {
        match self.chords.last() {
            Some(chord) => score
                .element(*chord)
                .and_then(Element::as_chord)
                .map(|c| c.tie)
                .unwrap_or_default(),
            None => score.note(note).map(|n| n.tie).unwrap_or_default(),
        }
    }

    fn visit_note(&mut self, score: &mut Score, id: NodeId) -> Result<(), ScoreError> {
        let state = self.governing_state(score, id);
        let xml_id = score.try_node(id)?.xml_id().to_string();
        let pitch = score.note(id).and_then(|n| n.pitch);

        let pending = self.pending.entry(self.partition).or_default();
        let matched = match pitch {
            Some(p) => first_pending_match(score, pending, p),
            None => None,
        };
        match matched {
            Some(position) => {
                let start = pending.remove(position);
                let start_id = score.try_node(start)?.xml_id().to_string();
                let start_note = score
                    .note_mut(start)
                    .ok_or_else(|| ScoreError::UnknownNode(start_id.clone()))?;
                if state.closes() {
                    start_note.bind_tie_end(id, &start_id)?;
                    log::debug!("tie '{}' -> '{}'", start_id, xml_id);
                    self.report.bound += 1;
                } else {
                    start_note.reset_drawing_tie();
                    self.report.malformed += 1;
                    self.sink.report(Diagnostic::new(
                        DiagnosticKind::MalformedTie,
                        format!("Expected @tie median or terminal in note '{}', skipping it", xml_id),
                        xml_id.clone(),
                    ));
                }
            }
            None if state.closes() => {
                self.report.malformed += 1;
                self.sink.report(Diagnostic::new(
                    DiagnosticKind::MalformedTie,
                    format!("No matching start for @tie {:?} in note '{}'", state, xml_id),
                    xml_id.clone(),
                ));
            }
            None => {}
        }

        if state.opens() {
            score
                .note_mut(id)
                .ok_or_else(|| ScoreError::UnknownNode(xml_id.clone()))?
                .open_tie(id, &xml_id)?;
            log::debug!("tie opened on '{}'", xml_id);
            self.pending.entry(self.partition).or_default().push(id);
        }
        Ok(())
    }

    fn finish(mut self, score: &Score) -> TieReport {
        let mut report = self.report;
        for open in self.pending.values() {
            for start in open {
                report.dangling += 1;
                if self.report_dangling {
                    let xml_id = score.xml_id(*start).unwrap_or_default();
                    self.sink.report(Diagnostic::new(
                        DiagnosticKind::DanglingTie,
                        format!("Tie starting on note '{}' is never closed", xml_id),
                        xml_id,
                    ));
                }
            }
        }
        report
    }
}

impl<'s, S: DiagnosticSink + ?Sized> Visitor for TiePass<'s, S> {
    fn enter(&mut self, score: &mut Score, id: NodeId) -> Result<Flow, ScoreError> {
        match score.role(id) {
            Some(ElementRole::Layer) => {
                if let (TieScope::Layer, Some(Element::Layer(layer))) = (self.scope, score.element(id)) {
                    self.outer_partitions.push(self.partition);
                    self.partition = layer.n;
                }
            }
            Some(ElementRole::Chord) => self.chords.push(id),
            Some(ElementRole::Note) => self.visit_note(score, id)?,
            // Nothing below a verse can carry a tie
            Some(ElementRole::Verse) => return Ok(Flow::SkipChildren),
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn leave(&mut self, score: &mut Score, id: NodeId) -> Result<(), ScoreError> {
        match score.role(id) {
            Some(ElementRole::Chord) => {
                self.chords.pop();
            }
            Some(ElementRole::Layer) if self.scope == TieScope::Layer => {
                self.partition = self.outer_partitions.pop().unwrap_or_default();
            }
            _ => {}
        }
        Ok(())
    }
}

/// Position of the oldest pending note with the given pitch
fn first_pending_match(score: &Score, pending: &[NodeId], pitch: Pitch) -> Option<usize> {
    pending
        .iter()
        .position(|candidate| score.note(*candidate).and_then(|n| n.pitch) == Some(pitch))
}
