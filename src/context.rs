//! # Contextual Properties
//!
//! Properties of a note that depend on where it sits in the tree. A chord governs
//! the duration and stem of its member notes; a beam shares its computed stem
//! direction with the notes directly under it.
//!
//! ## Precedence
//! Chord containment is checked first. The beam is only consulted when the note is
//! not in a chord, so a chord's stem direction wins over the beam holding the chord.
//!
//! | Query | Chord lookup | Beam lookup | Fallback |
//! |---|---|---|---|
//! | `effective_duration` | up to `MAX_CHORD_DEPTH` | - | note duration |
//! | `effective_stem_direction` | parent only | parent only | note stem |
//! | `has_effective_stem_direction` | parent only | parent only | note stem |
//!
//! `has_effective_stem_direction` does not follow the precedence: it is true when
//! any of the three sources reports a direction.
//! | `enclosing_chord` | up to `MAX_CHORD_DEPTH` | - | `None` |
//!
//! All functions are pure reads; an unknown id resolves to "nothing".

use crate::model::{DurationFacet, Element, ElementRole, StemDirection};
use crate::tree::{NodeId, Score};

/// How far up a note may sit below its chord (editorial wrappers in between)
pub const MAX_CHORD_DEPTH: usize = 8;

/// The chord a note belongs to, if any
pub fn enclosing_chord(score: &Score, note: NodeId) -> Option<NodeId> {
    score.find_ancestor(note, ElementRole::Chord, MAX_CHORD_DEPTH)
}

/// Duration used for drawing: the chord's when the note is a chord tone
pub fn effective_duration(score: &Score, note: NodeId) -> Option<DurationFacet> {
    if let Some(chord) = enclosing_chord(score, note) {
        return score.element(chord).and_then(Element::as_chord).map(|c| c.duration);
    }
    score.note(note).map(|n| n.duration)
}

/// Stem direction used for drawing
pub fn effective_stem_direction(score: &Score, note: NodeId) -> StemDirection {
    match stem_source(score, note) {
        StemSource::Chord(chord) => score
            .element(chord)
            .and_then(Element::as_chord)
            .map(|c| c.stem.dir)
            .unwrap_or_default(),
        StemSource::Beam(beam) => score
            .element(beam)
            .and_then(Element::as_beam)
            .map(|b| b.drawing_stem_dir)
            .unwrap_or_default(),
        StemSource::Own => score.note(note).map(|n| n.stem.dir).unwrap_or_default(),
    }
}

/// Whether the parent chord, the parent beam or the note itself reports a stem direction
pub fn has_effective_stem_direction(score: &Score, note: NodeId) -> bool {
    let chord_dir = score
        .find_ancestor(note, ElementRole::Chord, 1)
        .and_then(|chord| score.element(chord))
        .and_then(Element::as_chord)
        .is_some_and(|c| c.stem.dir.is_set());
    let beam_dir = score
        .find_ancestor(note, ElementRole::Beam, 1)
        .and_then(|beam| score.element(beam))
        .and_then(Element::as_beam)
        .is_some_and(|b| b.drawing_stem_dir.is_set());
    chord_dir || beam_dir || score.note(note).is_some_and(|n| n.stem.dir.is_set())
}

enum StemSource {
    Chord(NodeId),
    Beam(NodeId),
    Own,
}

fn stem_source(score: &Score, note: NodeId) -> StemSource {
    if let Some(chord) = score.find_ancestor(note, ElementRole::Chord, 1) {
        StemSource::Chord(chord)
    } else if let Some(beam) = score.find_ancestor(note, ElementRole::Beam, 1) {
        StemSource::Beam(beam)
    } else {
        StemSource::Own
    }
}
