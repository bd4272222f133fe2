//! Integration tests for score-context
//!
//! Builds small scores through the public API and checks the resolved ties, stem and
//! duration context, and lyric links.

use score_context::{
    effective_duration, effective_stem_direction, has_effective_stem_direction, prepare,
    prepare_logged, resolve_ties, Beam, Chord, Diagnostic, DiagnosticKind, DurationFacet, DurationValue, Element,
    Ligature, Note, PitchName, ResolveOptions, Score, ScoreError, StemDirection, TieReport,
    TieState,
};

fn note(pname: PitchName, oct: u8, tie: TieState) -> Element {
    Note::new(pname, oct, DurationValue::Quarter).with_tie(tie).into()
}

fn resolve(score: &mut Score) -> (TieReport, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let report = resolve_ties(score, &ResolveOptions::default(), &mut diagnostics)
        .expect("tie pass should not fail");
    (report, diagnostics)
}

#[test]
fn test_scenario_a_simple_tie() {
    // C4 tied to C4
    let (mut score, layer) = Score::with_layer();
    let n1 = score.add_child(layer, note(PitchName::C, 4, TieState::Initial)).unwrap();
    let n2 = score.add_child(layer, note(PitchName::C, 4, TieState::Terminal)).unwrap();

    let (report, diagnostics) = resolve(&mut score);

    assert_eq!(report, TieReport { bound: 1, malformed: 0, dangling: 0 });
    assert!(diagnostics.is_empty());
    let tie = score.tie_of(n1).expect("n1 should own the tie");
    assert_eq!(tie.start, n1);
    assert_eq!(tie.end, Some(n2));
}

#[test]
fn test_scenario_b_median_without_start() {
    let (mut score, layer) = Score::with_layer();
    let n1 = score.add_child(layer, note(PitchName::C, 4, TieState::Medial)).unwrap();

    let (report, diagnostics) = resolve(&mut score);

    // One report for the failed close, one for the tie n1 opens and never closes
    assert_eq!(report.malformed, 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedTie);
    assert_eq!(diagnostics[0].context_id, score.xml_id(n1).unwrap());
    assert!(diagnostics[0].message.contains("No matching start"));

    // Medial still opens a new relation
    assert_eq!(report.dangling, 1);
    assert_eq!(diagnostics[1].kind, DiagnosticKind::DanglingTie);
    let tie = score.tie_of(n1).unwrap();
    assert_eq!(tie.start, n1);
    assert_eq!(tie.end, None);
}

#[test]
fn test_scenario_c_chord_tie_closed_by_single_notes() {
    let (mut score, layer) = Score::with_layer();
    let chord = score
        .add_child(layer, Chord::new(DurationValue::Half).with_tie(TieState::Initial).into())
        .unwrap();
    let n1 = score.add_child(chord, note(PitchName::C, 4, TieState::None)).unwrap();
    let n2 = score.add_child(chord, note(PitchName::E, 4, TieState::None)).unwrap();
    let n3 = score.add_child(layer, note(PitchName::C, 4, TieState::Terminal)).unwrap();
    let n4 = score.add_child(layer, note(PitchName::E, 4, TieState::Terminal)).unwrap();

    let (report, diagnostics) = resolve(&mut score);

    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    assert_eq!(report.bound, 2);
    assert_eq!(score.tie_of(n1).and_then(|t| t.end), Some(n3));
    assert_eq!(score.tie_of(n2).and_then(|t| t.end), Some(n4));
}

#[test]
fn test_scenario_d_beam_stem_direction() {
    let (mut score, layer) = Score::with_layer();
    let beam = score.add_child(layer, Beam::new().into()).unwrap();
    let n = score
        .add_child(beam, Note::new(PitchName::F, 4, DurationValue::Eighth).into())
        .unwrap();
    score.set_beam_drawing_stem_dir(beam, StemDirection::Up).unwrap();

    assert_eq!(effective_stem_direction(&score, n), StemDirection::Up);
    assert!(has_effective_stem_direction(&score, n));
}

#[test]
fn test_p1_ties_bind_first_later_match_of_same_pitch() {
    let (mut score, layer) = Score::with_layer();
    let a = score.add_child(layer, note(PitchName::D, 4, TieState::Initial)).unwrap();
    // Other pitches in between, including the same name one octave up
    score.add_child(layer, note(PitchName::D, 5, TieState::None)).unwrap();
    score.add_child(layer, note(PitchName::E, 4, TieState::None)).unwrap();
    let b = score.add_child(layer, note(PitchName::D, 4, TieState::Terminal)).unwrap();
    let c = score.add_child(layer, note(PitchName::D, 4, TieState::Terminal)).unwrap();

    let (report, diagnostics) = resolve(&mut score);

    assert_eq!(score.tie_of(a).and_then(|t| t.end), Some(b));
    // c has nothing left to close
    assert_eq!(report.malformed, 1);
    assert_eq!(diagnostics[0].context_id, score.xml_id(c).unwrap());
}

#[test]
fn test_p1_two_pitches_open_at_once() {
    let (mut score, layer) = Score::with_layer();
    let c = score.add_child(layer, note(PitchName::C, 4, TieState::Initial)).unwrap();
    let g = score.add_child(layer, note(PitchName::G, 4, TieState::Initial)).unwrap();
    let g_end = score.add_child(layer, note(PitchName::G, 4, TieState::Terminal)).unwrap();
    let c_end = score.add_child(layer, note(PitchName::C, 4, TieState::Terminal)).unwrap();

    let (report, diagnostics) = resolve(&mut score);

    assert!(diagnostics.is_empty());
    assert_eq!(report.bound, 2);
    assert_eq!(score.tie_of(c).and_then(|t| t.end), Some(c_end));
    assert_eq!(score.tie_of(g).and_then(|t| t.end), Some(g_end));
}

#[test]
fn test_p2_overlapping_opens_do_not_crash() {
    // A second start on the same pitch discards the first and keeps the newest open
    let (mut score, layer) = Score::with_layer();
    let a = score.add_child(layer, note(PitchName::B, 3, TieState::Initial)).unwrap();
    let b = score.add_child(layer, note(PitchName::B, 3, TieState::Initial)).unwrap();
    let end = score.add_child(layer, note(PitchName::B, 3, TieState::Terminal)).unwrap();

    let (report, diagnostics) = resolve(&mut score);

    assert_eq!(report, TieReport { bound: 1, malformed: 1, dangling: 0 });
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(score.tie_of(a), None);
    assert_eq!(score.tie_of(b).and_then(|t| t.end), Some(end));
}

#[test]
fn test_p3_unmatched_end_leaves_pending_ties_alone() {
    let (mut score, layer) = Score::with_layer();
    let open = score.add_child(layer, note(PitchName::A, 4, TieState::Initial)).unwrap();
    let stray = score.add_child(layer, note(PitchName::F, 4, TieState::Terminal)).unwrap();
    let close = score.add_child(layer, note(PitchName::A, 4, TieState::Terminal)).unwrap();

    let (report, diagnostics) = resolve(&mut score);

    // Exactly one diagnostic, for the stray terminal
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].context_id, score.xml_id(stray).unwrap());
    // The open A4 tie was not disturbed by it
    assert_eq!(report.bound, 1);
    assert_eq!(score.tie_of(open).and_then(|t| t.end), Some(close));
}

#[test]
fn test_p4_chord_stem_wins_over_beam() {
    let (mut score, layer) = Score::with_layer();
    let beam = score.add_child(layer, Beam::new().into()).unwrap();
    let chord = score
        .add_child(
            beam,
            Chord::new(DurationValue::Eighth).with_stem_dir(StemDirection::Down).into(),
        )
        .unwrap();
    let n = score
        .add_child(chord, Note::new(PitchName::E, 5, DurationValue::Eighth).into())
        .unwrap();
    score.set_beam_drawing_stem_dir(beam, StemDirection::Up).unwrap();

    assert_eq!(effective_stem_direction(&score, n), StemDirection::Down);
    assert_eq!(effective_duration(&score, n), Some(DurationFacet::new(DurationValue::Eighth)));
}

#[test]
fn test_p5_duration_setter_idempotent() {
    for value in [
        DurationValue::Long,
        DurationValue::Breve,
        DurationValue::Whole,
        DurationValue::Half,
        DurationValue::Sixteenth,
    ] {
        let mut note = Note::new(PitchName::C, 4, DurationValue::Quarter).with_stem_dir(StemDirection::Up);
        note.lig = Some(Ligature::Recta);
        note.colored = Some(true);

        note.set_value(value);
        let once = note.clone();
        note.set_value(value);
        assert_eq!(note, once, "second set_value({:?}) changed the note", value);
    }
}

#[test]
fn test_p6_equality_excludes_tie_relations() {
    let (mut score, layer) = Score::with_layer();
    let a = score.add_child(layer, note(PitchName::G, 4, TieState::Initial)).unwrap();
    score.add_child(layer, note(PitchName::G, 4, TieState::Terminal)).unwrap();
    let plain = Note::new(PitchName::G, 4, DurationValue::Quarter);

    resolve(&mut score);

    let tied = score.note(a).unwrap();
    assert!(tied.drawing_tie().is_some());
    assert!(tied.structurally_equals(&Element::Note(plain.clone())));
    assert!(plain.structurally_equals(score.element(a).unwrap()));
}

#[test]
fn test_prepare_can_run_twice() {
    let (mut score, layer) = Score::with_layer();
    let a = score.add_child(layer, note(PitchName::C, 4, TieState::Initial)).unwrap();
    let b = score.add_child(layer, note(PitchName::C, 4, TieState::Terminal)).unwrap();

    let mut diagnostics = Vec::new();
    prepare(&mut score, &ResolveOptions::default(), &mut diagnostics).unwrap();
    let prepared = prepare(&mut score, &ResolveOptions::default(), &mut diagnostics).unwrap();

    assert_eq!(prepared.ties.bound, 1);
    assert_eq!(score.tie_of(a).and_then(|t| t.end), Some(b));
    assert_eq!(prepared.lyrics.window_of(b).and_then(|w| w.last_but_one), Some(a));
    assert!(diagnostics.is_empty());
}

#[test]
fn test_resolve_twice_without_reset_is_structural_violation() {
    let (mut score, layer) = Score::with_layer();
    score.add_child(layer, note(PitchName::C, 4, TieState::Initial)).unwrap();
    resolve(&mut score);

    let mut diagnostics = Vec::new();
    let result = resolve_ties(&mut score, &ResolveOptions::default(), &mut diagnostics);
    assert!(matches!(result, Err(ScoreError::TieAlreadyOpen(_))));
}

#[test]
fn test_layer_scope_from_yaml() {
    let mut score = Score::new();
    let root = score.root();
    let measure = score.add_child(root, Element::Measure(Default::default())).unwrap();
    let upper = score.add_child(measure, Element::Layer(score_context::Layer::new(1))).unwrap();
    let lower = score.add_child(measure, Element::Layer(score_context::Layer::new(2))).unwrap();
    let a = score.add_child(upper, note(PitchName::C, 5, TieState::Initial)).unwrap();
    score.add_child(lower, note(PitchName::C, 5, TieState::Terminal)).unwrap();

    let options = ResolveOptions::from_yaml("tie-scope: layer").unwrap();
    let mut diagnostics = Vec::new();
    let prepared = prepare(&mut score, &options, &mut diagnostics).unwrap();

    assert_eq!(prepared.ties.bound, 0);
    assert_eq!(score.tie_of(a).and_then(|t| t.end), None);
    let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::MalformedTie, DiagnosticKind::DanglingTie]);
}

#[test]
fn test_malformed_tie_does_not_corrupt_later_ties() {
    let (mut score, layer) = Score::with_layer();
    score.add_child(layer, note(PitchName::E, 4, TieState::Terminal)).unwrap();
    let a = score.add_child(layer, note(PitchName::E, 4, TieState::Initial)).unwrap();
    score.add_child(layer, note(PitchName::E, 4, TieState::None)).unwrap();
    let c = score.add_child(layer, note(PitchName::E, 4, TieState::Initial)).unwrap();
    let d = score.add_child(layer, note(PitchName::E, 4, TieState::Terminal)).unwrap();

    let (report, _) = resolve(&mut score);

    assert_eq!(report.malformed, 2);
    assert_eq!(score.tie_of(a), None);
    assert_eq!(score.tie_of(c).and_then(|t| t.end), Some(d));
    assert_eq!(score.tie_relations().len(), 1);
}

#[test]
fn test_prepare_logged_reports_through_log() {
    let (mut score, layer) = Score::with_layer();
    let a = score.add_child(layer, note(PitchName::C, 4, TieState::Initial)).unwrap();

    let prepared = prepare_logged(&mut score).unwrap();

    // The dangling tie goes to the log, the relation stays open
    assert_eq!(prepared.ties.dangling, 1);
    assert_eq!(score.tie_of(a).map(|t| t.end), Some(None));
}
