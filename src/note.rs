//! # Note
//!
//! The note payload: its intrinsic attributes, the duration setter with its
//! normalization rules, structural equality, and the tie relation a note owns
//! once tie resolution has run.
//!
//! ## Tie Ownership
//! A note that starts a tie holds the relation itself as `Option<TieRelation>`.
//! The relation is open (`end == None`) while the tie pass is still looking for the
//! matching note, and bound once that note is found. Resetting a note simply drops
//! the relation.

use crate::error::ScoreError;
use crate::model::{
    DurationFacet, DurationValue, Element, Embellishment, Ligature, Pitch, PitchName,
    StemDirection, StemFacet, TieState,
};
use crate::tree::NodeId;

/// A tie between two notes of identical pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TieRelation {
    pub start: NodeId,
    pub end: Option<NodeId>,
}

impl TieRelation {
    pub fn open(start: NodeId) -> Self {
        Self { start, end: None }
    }

    /// Whether both ends are known
    pub fn is_bound(&self) -> bool {
        self.end.is_some()
    }
}

/// A single note
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Note {
    pub pitch: Option<Pitch>,
    pub duration: DurationFacet,
    pub stem: StemFacet,
    pub tie: TieState,
    pub colored: Option<bool>,
    pub lig: Option<Ligature>,
    pub acciaccatura: bool,
    pub embellishment: Embellishment,
    drawing_tie: Option<TieRelation>,
}

impl Note {
    pub fn new(pname: PitchName, oct: u8, dur: DurationValue) -> Self {
        Self {
            pitch: Some(Pitch::new(pname, oct)),
            duration: DurationFacet::new(dur),
            ..Self::default()
        }
    }

    pub fn with_tie(mut self, tie: TieState) -> Self {
        self.tie = tie;
        self
    }

    pub fn with_stem_dir(mut self, dir: StemDirection) -> Self {
        self.stem.dir = dir;
        self
    }

    pub fn with_dots(mut self, dots: u8) -> Self {
        self.duration.dots = dots;
        self
    }

    /// Set the duration value.
    ///
    /// Three normalizations always apply:
    /// 1. Values outside breve..=whole drop the ligature
    /// 2. Coloration is reset to unspecified
    /// 3. Stemless values (strictly between long and half) drop stem direction and length
    ///
    /// # Example
    /// ```
    /// use score_context::{DurationValue, Note, PitchName, StemDirection};
    ///
    /// let mut note = Note::new(PitchName::G, 4, DurationValue::Quarter)
    ///     .with_stem_dir(StemDirection::Up);
    /// note.set_value(DurationValue::Whole);
    /// assert_eq!(note.stem.dir, StemDirection::None);
    /// ```
    pub fn set_value(&mut self, value: DurationValue) {
        self.duration.dur = Some(value);

        if value < DurationValue::Breve || value > DurationValue::Whole {
            self.lig = None;
        }

        self.colored = None;

        if value > DurationValue::Long && value < DurationValue::Half {
            self.stem.dir = StemDirection::None;
            self.stem.len = None;
        }
    }

    /// Compare intrinsic attributes with another element.
    ///
    /// Ties are relations between notes, not attributes of one, so they are not
    /// compared. Returns `false` if `other` is not a note.
    pub fn structurally_equals(&self, other: &Element) -> bool {
        let Some(other) = other.as_note() else {
            return false;
        };
        self.colored == other.colored
            && self.lig == other.lig
            && self.stem.dir == other.stem.dir
            && self.stem.len == other.stem.len
            && self.acciaccatura == other.acciaccatura
            && self.embellishment == other.embellishment
            && self.pitch == other.pitch
            && self.duration == other.duration
    }

    /// The tie relation started by this note, if any
    pub fn drawing_tie(&self) -> Option<&TieRelation> {
        self.drawing_tie.as_ref()
    }

    /// Open a tie relation with this note (`this`) as its start.
    pub(crate) fn open_tie(&mut self, this: NodeId, xml_id: &str) -> Result<(), ScoreError> {
        if self.drawing_tie.is_some() {
            return Err(ScoreError::TieAlreadyOpen(xml_id.to_string()));
        }
        self.drawing_tie = Some(TieRelation::open(this));
        Ok(())
    }

    /// Bind the end of the open relation to `end`.
    pub(crate) fn bind_tie_end(&mut self, end: NodeId, xml_id: &str) -> Result<(), ScoreError> {
        match self.drawing_tie.as_mut() {
            Some(tie) if tie.end.is_none() => {
                tie.end = Some(end);
                Ok(())
            }
            Some(_) => Err(ScoreError::TieAlreadyBound(xml_id.to_string())),
            None => Err(ScoreError::UnknownNode(format!("no open tie on '{}'", xml_id))),
        }
    }

    pub fn reset_drawing_tie(&mut self) {
        self.drawing_tie = None;
    }
}
