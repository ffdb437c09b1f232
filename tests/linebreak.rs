//! End-to-end checks of the width-constrained pipeline.

mod common;

use common::{assert_close, TestFont};
use mathflow::atom::{finalize, Atom, AtomKind};
use mathflow::dimensions::Unit;
use mathflow::layout::LayoutVariant;
use mathflow::linebreak::{fitter, tokenizer};
use mathflow::{typeset, FontContext, LayoutSettings, LineStyle};

fn var(ch: char) -> Atom {
    Atom::new(AtomKind::Variable, ch, 0..ch.len_utf8())
}

fn plus() -> Atom {
    Atom::new(AtomKind::BinaryOperator, '+', 0..1)
}

/// a + b + c + d at 16 px: glyphs are 8 wide, padded operators 8 + 32/9.
fn sum_chain() -> Vec<Atom> {
    vec![
        var('a'),
        plus(),
        var('b'),
        plus(),
        var('c'),
        plus(),
        var('d'),
    ]
}

const OP_WIDTH: f64 = 8.0 + 32.0 / 9.0;

#[test]
fn narrow_budget_breaks_at_operators() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config =
        LayoutSettings::new(&ctx, 16.0, LineStyle::Text).with_max_width(Unit::new(30.0));

    let layout = typeset(&sum_chain(), config).unwrap();

    assert_eq!(layout.contents.len(), 1);
    let stack = &layout.contents[0];
    match stack.node {
        LayoutVariant::VerticalBox(ref vb) => {
            // Three lines with an inter-line kern before each follow-up line.
            assert_eq!(vb.contents.len(), 5);
        }
        ref other => panic!("expected a vertical stack of lines, got {:?}", other),
    }

    // Baseline on the first line; two uniform 1.2 em skips below it.
    assert_close(layout.height, 11.2);
    assert_close(layout.depth, -2.0 * 19.2);
    // The widest line is "a + b".
    assert_close(layout.width, 16.0 + OP_WIDTH);
}

#[test]
fn every_line_fits_the_budget() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let atoms = finalize(&sum_chain());
    let elements = tokenizer::tokenize(&atoms, config).unwrap();
    let budget = Unit::new(30.0);
    let lines = fitter::fit(&elements, budget);

    assert!(lines.len() > 1);
    for line in &lines {
        let width: Unit<_> = elements[line.range.clone()]
            .iter()
            .map(|element| element.width)
            .sum();
        assert!(width <= budget, "line {:?} overflows: {}", line.range, width);
    }
}

#[test]
fn single_line_when_everything_fits() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config =
        LayoutSettings::new(&ctx, 16.0, LineStyle::Text).with_max_width(Unit::new(100.0));

    let atoms = [var('a'), plus(), var('b')];
    let layout = typeset(&atoms, config).unwrap();

    assert_eq!(layout.contents.len(), 1);
    match layout.contents[0].node {
        LayoutVariant::HorizontalBox(ref hb) => {
            // Glyph, padding kern, operator, padding kern, glyph.
            assert_eq!(hb.contents.len(), 5);
        }
        ref other => panic!("expected a single line, got {:?}", other),
    }
    assert_close(layout.width, 16.0 + OP_WIDTH);
}

#[test]
fn zero_budget_means_no_breaking() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let layout = typeset(&sum_chain(), config).unwrap();
    // The unconstrained walk: glyphs interleaved with spacing kerns, no stack.
    assert!(layout.contents.len() > 1);
    assert!(!layout
        .contents
        .iter()
        .any(|node| matches!(node.node, LayoutVariant::VerticalBox(_))));
}

#[test]
fn scripted_base_and_script_form_a_group() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let mut x = var('x');
    x.set_superscript(vec![Atom::new(AtomKind::Number, '2', 2..3)]);
    let atoms = finalize(&[x, plus(), var('y')]);
    let elements = tokenizer::tokenize(&atoms, config).unwrap();

    assert_eq!(elements.len(), 4);
    assert!(elements[0].group.is_some());
    assert_eq!(elements[0].group, elements[1].group);
    assert!(!elements[0].may_break_after);
    assert!(!elements[1].may_break_before);

    // Script stack: superscript at script scale plus the trailing space.
    assert_close(elements[1].width, 5.6 + 0.64);
    // The superscript box reaches above the base's own ascent.
    assert!(elements[1].ascent > elements[0].ascent);
}

#[test]
fn groups_survive_any_budget() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let mut x = var('x');
    x.set_superscript(vec![Atom::new(AtomKind::Number, '2', 2..3)]);
    let atoms = finalize(&[x, plus(), var('y')]);
    let elements = tokenizer::tokenize(&atoms, config).unwrap();

    for budget in [10.0, 15.0, 20.0, 40.0] {
        let lines = fitter::fit(&elements, Unit::new(budget));
        for line in &lines {
            let splits_group = line.range.start > 0
                && elements[line.range.start - 1].group.is_some()
                && elements[line.range.start - 1].group == elements[line.range.start].group;
            assert!(!splits_group, "budget {} split a script group", budget);
        }
    }
}

#[test]
fn oversized_elements_take_a_line_each() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config =
        LayoutSettings::new(&ctx, 16.0, LineStyle::Text).with_max_width(Unit::new(5.0));

    let atoms = [var('a'), plus(), var('b')];
    let layout = typeset(&atoms, config).unwrap();
    match layout.contents[0].node {
        LayoutVariant::VerticalBox(ref vb) => {
            // Three lines, each too wide for the budget, each alone.
            assert_eq!(vb.contents.len(), 5);
        }
        ref other => panic!("expected a vertical stack, got {:?}", other),
    }
    assert_close(layout.width, OP_WIDTH);
}

#[test]
fn word_boundaries_and_brackets_steer_character_breaks() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    // Roman single-character atoms fuse into one run before exploding.
    let word = |text: &str| -> Vec<Atom> {
        text.chars()
            .map(|ch| Atom::new(AtomKind::Ordinary, ch, 0..1))
            .collect()
    };

    let elements = tokenizer::tokenize(&word("fo(o"), config).unwrap();
    assert_eq!(elements.len(), 4);
    // No break after an opening bracket.
    assert!(!elements[3].may_break_before);

    let elements = tokenizer::tokenize(&word("ab-cd"), config).unwrap();
    assert_eq!(elements.len(), 5);
    // No break before a hyphen, a cheap one after it.
    assert!(!elements[2].may_break_before);
    assert!(elements[3].may_break_before);
    assert_eq!(elements[3].penalty_before, tokenizer::PENALTY_WORD_GAP);

    let elements = tokenizer::tokenize(&word("it's"), config).unwrap();
    // Apostrophes never split their word.
    assert!(!elements[2].may_break_before);
    assert!(!elements[3].may_break_before);
}
