//! # Lyric Linkage
//!
//! Keeps track of the last two notes seen in reading order, so that sung syllables
//! can be attached to the right notes when syllables and notes do not line up one
//! to one.
//!
//! ## Window
//! On every note the window shifts: `last` becomes `last_but_one`, and the note
//! becomes `last`. The window as it stands after the shift is recorded per note.
//!
//! ## Syllable Spans
//! A syllable is anchored to `last`, which is the note it belongs to since a note is
//! visited before its verses. A syllable that continues (initial or medial word
//! position, or an underscore extender) stays pending in its verse until the next
//! syllable of the same verse:
//! - a hyphenated syllable ends on the next syllable's note (`last`)
//! - an extender ends on the note before it (`last_but_one`); an extender that
//!   would end on its own start note is reported and left open

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::ScoreError;
use crate::model::{Connector, Element, ElementRole, WordPosition};
use crate::traversal::{walk, Flow, Visitor};
use crate::tree::{NodeId, Score};

/// The two most recent notes at a given point of the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LyricWindow {
    pub last: Option<NodeId>,
    pub last_but_one: Option<NodeId>,
}

impl LyricWindow {
    fn shift(&mut self, note: NodeId) {
        self.last_but_one = self.last;
        self.last = Some(note);
    }
}

/// Notes a syllable is drawn under. `end` is only set for syllables that continue
/// to a later note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyllableSpan {
    pub syllable: NodeId,
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct LyricLinks {
    windows: HashMap<NodeId, LyricWindow>,
    spans: Vec<SyllableSpan>,
}

impl LyricLinks {
    /// Window recorded when `note` was visited
    pub fn window_of(&self, note: NodeId) -> Option<LyricWindow> {
        self.windows.get(&note).copied()
    }

    /// Spans in reading order of their syllables
    pub fn spans(&self) -> &[SyllableSpan] {
        &self.spans
    }

    pub fn span_of(&self, syllable: NodeId) -> Option<&SyllableSpan> {
        self.spans.iter().find(|span| span.syllable == syllable)
    }
}

/// Walk the score once and link syllables to notes
pub fn link_lyrics<S: DiagnosticSink + ?Sized>(score: &mut Score, sink: &mut S) -> Result<LyricLinks, ScoreError> {
    let mut pass = LyricPass {
        window: LyricWindow::default(),
        pending: HashMap::new(),
        links: LyricLinks::default(),
        sink,
    };
    let root = score.root();
    walk(score, root, &mut pass)?;
    Ok(pass.links)
}

struct LyricPass<'s, S: DiagnosticSink + ?Sized> {
    window: LyricWindow,
    /// Continuing syllable per verse number, as an index into `links.spans`
    pending: HashMap<u8, usize>,
    links: LyricLinks,
    sink: &'s mut S,
}

impl<'s, S: DiagnosticSink + ?Sized> LyricPass<'s, S> {
    fn visit_syllable(&mut self, score: &Score, id: NodeId) {
        let Some(syl) = score.element(id).and_then(Element::as_syllable) else {
            return;
        };
        let verse = score
            .find_ancestor(id, ElementRole::Verse, 3)
            .and_then(|v| match score.element(v) {
                Some(Element::Verse(verse)) => Some(verse.n),
                _ => None,
            })
            .unwrap_or(0);

        if let Some(previous) = self.pending.remove(&verse) {
            self.close(score, previous);
        }

        self.links.spans.push(SyllableSpan {
            syllable: id,
            start: self.window.last,
            end: None,
        });
        if syl.continues() {
            self.pending.insert(verse, self.links.spans.len() - 1);
        }
    }

    /// End the pending syllable at `index` now that the next one is reached
    fn close(&mut self, score: &Score, index: usize) {
        let span = self.links.spans[index];
        let Some(previous) = score.element(span.syllable).and_then(Element::as_syllable) else {
            return;
        };

        if matches!(previous.wordpos, Some(WordPosition::Initial | WordPosition::Medial)) {
            self.links.spans[index].end = self.window.last;
        } else if previous.con == Some(Connector::Underscore) {
            if span.start == self.window.last_but_one {
                let xml_id = score.xml_id(span.syllable).unwrap_or_default();
                self.sink.report(Diagnostic::new(
                    DiagnosticKind::LyricExtender,
                    format!("Syllable with underline extender under one single note '{}'", xml_id),
                    xml_id,
                ));
            } else {
                self.links.spans[index].end = self.window.last_but_one;
            }
        }
    }
}

impl<'s, S: DiagnosticSink + ?Sized> Visitor for LyricPass<'s, S> {
    fn enter(&mut self, score: &mut Score, id: NodeId) -> Result<Flow, ScoreError> {
        match score.role(id) {
            Some(ElementRole::Note) => {
                self.window.shift(id);
                self.links.windows.insert(id, self.window);
            }
            Some(ElementRole::Syllable) => self.visit_syllable(score, id),
            _ => {}
        }
        Ok(Flow::Continue)
    }
}
