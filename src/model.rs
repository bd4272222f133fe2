//! # Element Model
//!
//! This module defines the typed element model of the score tree: the structural
//! roles, the payload carried by each role, and the attribute facets shared by notes
//! and chords.
//!
//! ## Type Hierarchy
//! ```text
//! Section
//!   └── Measure
//!         └── Layer (one voice)
//!               ├── Note
//!               │     └── Verse
//!               │           └── Syllable
//!               ├── Chord
//!               │     └── Note ...
//!               └── Beam
//!                     ├── Note ...
//!                     └── Chord ...
//!
//! Editorial wrappers may appear at any level below Section and hold whatever
//! their nearest non-editorial ancestor could hold.
//! ```
//!
//! ## Facets
//! Facets are independent attribute groups, not a class hierarchy. A facet is either
//! present or absent on a given element:
//! - [`Pitch`] - pitch name and octave (notes)
//! - [`DurationFacet`] - duration value and dots (notes, chords)
//! - [`StemFacet`] - stem direction and length (notes, chords)
//! - [`TieState`] - the `@tie` presence flag (notes, chords)
//! - coloration - `Option<bool>`, `None` meaning unspecified
//!
//! ## Related Modules
//! - `note` - the Note payload, equality and duration normalization
//! - `tree` - the arena that owns elements and links them
//! - `context` - queries that combine facets with tree position

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::note::Note;

/// Structural role of an element. Determines which children it may hold and
/// which ancestor queries make sense for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementRole {
    Section,
    Measure,
    Layer,
    Note,
    Chord,
    Beam,
    Verse,
    Syllable,
    Editorial,
}

impl ElementRole {
    /// Prefix used when generating ids (`note-12`, `chord-3`, ...)
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ElementRole::Section => "section",
            ElementRole::Measure => "measure",
            ElementRole::Layer => "layer",
            ElementRole::Note => "note",
            ElementRole::Chord => "chord",
            ElementRole::Beam => "beam",
            ElementRole::Verse => "verse",
            ElementRole::Syllable => "syl",
            ElementRole::Editorial => "app",
        }
    }

    /// Whether an element of role `child` may be added directly under this role.
    ///
    /// For `Editorial` this only excludes sections; [`Score::add_child`](crate::Score::add_child)
    /// also checks the child against the wrapper's nearest non-editorial ancestor.
    pub fn permits(&self, child: ElementRole) -> bool {
        use ElementRole::*;
        match self {
            Section => matches!(child, Measure | Editorial),
            Measure => matches!(child, Layer | Editorial),
            Layer => matches!(child, Note | Chord | Beam | Editorial),
            Beam => matches!(child, Note | Chord | Editorial),
            Chord => matches!(child, Note | Editorial),
            Note => matches!(child, Verse | Editorial),
            Verse => matches!(child, Syllable | Editorial),
            Syllable => false,
            // Editorial markup can wrap content at any level below the section
            Editorial => child != Section,
        }
    }
}

impl fmt::Display for ElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementRole::Section => "section",
            ElementRole::Measure => "measure",
            ElementRole::Layer => "layer",
            ElementRole::Note => "note",
            ElementRole::Chord => "chord",
            ElementRole::Beam => "beam",
            ElementRole::Verse => "verse",
            ElementRole::Syllable => "syllable",
            ElementRole::Editorial => "editorial",
        };
        f.write_str(name)
    }
}

/// Pitch names C through B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PitchName {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

/// Pitch facet: name and octave (scientific pitch notation, C4 = middle C).
///
/// Ties are matched on this pair only; accidentals are not part of tie identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pitch {
    pub pname: PitchName,
    pub oct: u8,
}

impl Pitch {
    pub fn new(pname: PitchName, oct: u8) -> Self {
        Self { pname, oct }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{}", self.pname, self.oct)
    }
}

/// Duration values, longest first.
///
/// The ordering matters: mensural values (maxima, long, breve) sort before the
/// CMN values, so range checks like "between long and half" are plain comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DurationValue {
    Maxima,
    Long,
    Breve,
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
    OneTwentyEighth,
    TwoFiftySixth,
}

/// Duration facet. `dur` is `None` when the element does not specify one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationFacet {
    pub dur: Option<DurationValue>,
    pub dots: u8,
}

impl DurationFacet {
    pub fn new(dur: DurationValue) -> Self {
        Self { dur: Some(dur), dots: 0 }
    }

    pub fn dotted(dur: DurationValue, dots: u8) -> Self {
        Self { dur: Some(dur), dots }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    #[default]
    None,
    Up,
    Down,
}

impl StemDirection {
    pub fn is_set(&self) -> bool {
        *self != StemDirection::None
    }
}

/// Stem facet: explicit direction and length (in staff half-spaces)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StemFacet {
    pub dir: StemDirection,
    pub len: Option<u8>,
}

/// The `@tie` attribute of a note or chord
///
/// - `Initial`: first note of a tied group
/// - `Medial`: both ends a tie and starts the next one
/// - `Terminal`: last note of a tied group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieState {
    #[default]
    None,
    Initial,
    Medial,
    Terminal,
}

impl TieState {
    /// Whether an element with this state starts a tie to a later element
    pub fn opens(&self) -> bool {
        matches!(self, TieState::Initial | TieState::Medial)
    }

    /// Whether an element with this state ends a tie from an earlier element
    pub fn closes(&self) -> bool {
        matches!(self, TieState::Medial | TieState::Terminal)
    }
}

/// Mensural ligature shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ligature {
    Recta,
    Obliqua,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Embellishment {
    #[default]
    None,
    Trill,
    Mordent,
}

/// A group of notes sounding together. Its duration, stem and tie attributes
/// govern every member note.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Chord {
    pub duration: DurationFacet,
    pub stem: StemFacet,
    pub tie: TieState,
    pub colored: Option<bool>,
}

impl Chord {
    pub fn new(dur: DurationValue) -> Self {
        Self {
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
}

/// A beamed group. The drawing stem direction is computed by layout and shared
/// by the notes directly under the beam.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Beam {
    pub drawing_stem_dir: StemDirection,
}

impl Beam {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_drawing_stem_dir(&mut self, dir: StemDirection) {
        self.drawing_stem_dir = dir;
    }
}

/// One voice within a measure, identified by its layer number
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub n: u8,
}

impl Layer {
    pub fn new(n: u8) -> Self {
        Self { n }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measure {
    pub n: Option<u32>,
}

/// A numbered line of lyrics attached to a note
#[derive(Debug, Clone, PartialEq)]
pub struct Verse {
    pub n: u8,
}

impl Verse {
    pub fn new(n: u8) -> Self {
        Self { n }
    }
}

/// Position of a syllable within its word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordPosition {
    Initial,
    Medial,
    Terminal,
}

/// Connector drawn after a syllable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    /// Hyphen between syllables of one word
    Dash,
    /// Underscore extender (melisma)
    Underscore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Syllable {
    pub text: String,
    pub wordpos: Option<WordPosition>,
    pub con: Option<Connector>,
}

impl Syllable {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            wordpos: None,
            con: None,
        }
    }

    pub fn with_wordpos(mut self, wordpos: WordPosition) -> Self {
        self.wordpos = Some(wordpos);
        self
    }

    pub fn with_connector(mut self, con: Connector) -> Self {
        self.con = Some(con);
        self
    }

    /// Whether this syllable continues to a later note: hyphenated word parts and
    /// underscore extenders.
    pub fn continues(&self) -> bool {
        matches!(self.wordpos, Some(WordPosition::Initial | WordPosition::Medial))
            || self.con == Some(Connector::Underscore)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorialKind {
    App,
    Lem,
    Rdg,
    Choice,
    Sic,
    Corr,
    Supplied,
}

/// Editorial markup wrapping other elements
#[derive(Debug, Clone, PartialEq)]
pub struct Editorial {
    pub kind: EditorialKind,
}

impl Editorial {
    pub fn new(kind: EditorialKind) -> Self {
        Self { kind }
    }
}

/// An element payload. One variant per structural role.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Section,
    Measure(Measure),
    Layer(Layer),
    Note(Note),
    Chord(Chord),
    Beam(Beam),
    Verse(Verse),
    Syllable(Syllable),
    Editorial(Editorial),
}

impl Element {
    pub fn role(&self) -> ElementRole {
        match self {
            Element::Section => ElementRole::Section,
            Element::Measure(_) => ElementRole::Measure,
            Element::Layer(_) => ElementRole::Layer,
            Element::Note(_) => ElementRole::Note,
            Element::Chord(_) => ElementRole::Chord,
            Element::Beam(_) => ElementRole::Beam,
            Element::Verse(_) => ElementRole::Verse,
            Element::Syllable(_) => ElementRole::Syllable,
            Element::Editorial(_) => ElementRole::Editorial,
        }
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Element::Note(note) => Some(note),
            _ => None,
        }
    }

    pub fn as_note_mut(&mut self) -> Option<&mut Note> {
        match self {
            Element::Note(note) => Some(note),
            _ => None,
        }
    }

    pub fn as_chord(&self) -> Option<&Chord> {
        match self {
            Element::Chord(chord) => Some(chord),
            _ => None,
        }
    }

    pub fn as_beam(&self) -> Option<&Beam> {
        match self {
            Element::Beam(beam) => Some(beam),
            _ => None,
        }
    }

    pub fn as_beam_mut(&mut self) -> Option<&mut Beam> {
        match self {
            Element::Beam(beam) => Some(beam),
            _ => None,
        }
    }

    pub fn as_syllable(&self) -> Option<&Syllable> {
        match self {
            Element::Syllable(syl) => Some(syl),
            _ => None,
        }
    }
}

impl From<Note> for Element {
    fn from(note: Note) -> Self {
        Element::Note(note)
    }
}

impl From<Chord> for Element {
    fn from(chord: Chord) -> Self {
        Element::Chord(chord)
    }
}

impl From<Beam> for Element {
    fn from(beam: Beam) -> Self {
        Element::Beam(beam)
    }
}
