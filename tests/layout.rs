//! End-to-end layout checks against hand-computed positions.
//!
//! The mock font uses a 1000-unit grid and flat glyph metrics (500 wide, 700
//! tall), so at a 16 px em every font unit is 0.016 px and the expectations
//! below can be derived on paper.

mod common;

use common::{assert_close, TestFont};
use mathflow::atom::{Accent, Atom, AtomKind, Body, Fraction, LargeOperator, Radical};
use mathflow::dimensions::Unit;
use mathflow::error::FontError;
use mathflow::layout::LayoutVariant;
use mathflow::{typeset, FontContext, LayoutError, LayoutSettings, LineStyle};

fn var(ch: char) -> Atom {
    Atom::new(AtomKind::Variable, ch, 0..ch.len_utf8())
}

#[test]
fn single_character_is_one_glyph_box() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let layout = typeset(&[var('x')], config).unwrap();
    assert_close(layout.width, 8.0);
    assert_close(layout.height, 11.2);
    assert_close(layout.depth, 0.0);
    assert_eq!(layout.contents.len(), 1);
}

#[test]
fn superscript_sits_at_the_computed_shift() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let mut base = var('x');
    base.set_superscript(vec![Atom::new(AtomKind::Number, '2', 2..3)]);
    let layout = typeset(&[base], config).unwrap();

    // Base glyph, script stack, and the trailing script space.
    assert_eq!(layout.contents.len(), 3);
    // Shift up: max(shift-up 6.4, base height 11.2 - drop max 4.0, bottom min
    // 1.92) = 7.2; the script box tops out at the shift plus the scaled-down
    // superscript's own height (0.7 * 11.2).
    assert_close(layout.contents[1].height, 7.2 + 7.84);
    // Base advance + superscript advance at script scale + space after script.
    assert_close(layout.width, 8.0 + 5.6 + 0.64);
}

#[test]
fn joint_scripts_share_one_stack() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let mut base = var('x');
    base.set_superscript(vec![Atom::new(AtomKind::Number, '2', 2..3)]);
    base.set_subscript(vec![Atom::new(AtomKind::Number, '1', 4..5)]);
    let layout = typeset(&[base], config).unwrap();

    assert_eq!(layout.contents.len(), 3);
    let stack = &layout.contents[1];
    // Superscript baseline at 7.2 as in the single-script case; subscript
    // shifted down by max(2.4, 7.84 - 5.6, 3.2 - 0) = 3.2. The resulting
    // script gap 2.56 clears the 2.4 minimum, so no further adjustment.
    assert_close(stack.height, 7.2 + 7.84);
    assert_close(stack.depth, -3.2);
}

#[test]
fn text_fraction_stacks_around_the_axis() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let frac = Atom::with_body(
        AtomKind::Fraction,
        "",
        0..3,
        Body::Fraction(Fraction {
            numerator: vec![Atom::new(AtomKind::Number, '1', 0..1)],
            denominator: vec![Atom::new(AtomKind::Number, '2', 2..3)],
            has_rule: true,
            left_delimiter: None,
            right_delimiter: None,
            continued: false,
        }),
    );
    let layout = typeset(&[frac], config).unwrap();

    // Numerator kern max(7.2 - 4.0 - 0.32, 0.64) = 2.88, denominator kern
    // max(7.2 + 4.0 - 11.2 - 0.32, 0.64) = 0.64, baseline offset 8.16.
    assert_close(layout.height, 18.4);
    assert_close(layout.depth, -8.16);
    // Numerator baseline lands exactly at the text-style shift up.
    assert_close(layout.height - Unit::new(11.2), 7.2);
    // A null delimiter space pads each side of the stack.
    assert_close(layout.width, 1.92 + 8.0 + 1.92);
}

#[test]
fn display_operator_grows_and_centers_on_the_axis() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Display);

    let sum = Atom::with_body(
        AtomKind::LargeOperator,
        '\u{2211}',
        0..3,
        Body::LargeOperator(LargeOperator { limits: false }),
    );
    let layout = typeset(&[sum], config).unwrap();

    // The 1300-unit minimum passes over the 1000 variant to the 1600 one,
    // whose ink spans -3.2..22.4 px before centering on the 4.0 axis.
    assert_close(layout.width, 8.0);
    assert_close(layout.height, 16.8);
    assert_close(layout.depth, -8.8);
    assert_close((layout.height + layout.depth).scale(0.5), 4.0);
}

#[test]
fn display_limits_stack_above_and_below() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Display);

    let mut sum = Atom::with_body(
        AtomKind::LargeOperator,
        '\u{2211}',
        0..3,
        Body::LargeOperator(LargeOperator { limits: true }),
    );
    sum.set_superscript(vec![Atom::new(AtomKind::Number, '2', 4..5)]);
    sum.set_subscript(vec![Atom::new(AtomKind::Number, '1', 6..7)]);
    let layout = typeset(&[sum], config).unwrap();

    // Upper limit: 7.84 of script-scale ink plus the 4.8 rise; lower limit:
    // gap max(1.6, 9.6 - 7.84) below the operator's -8.8 depth.
    assert_eq!(layout.contents.len(), 1);
    assert_close(layout.height, 29.44);
    assert_close(layout.depth, -18.4);
    assert_close(layout.width, 8.0);
}

#[test]
fn radical_clears_its_content() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let sqrt = Atom::with_body(
        AtomKind::Radical,
        "",
        0..4,
        Body::Radical(Radical {
            radicand: vec![var('x')],
            degree: None,
        }),
    );
    let layout = typeset(&[sqrt], config).unwrap();

    // Requested extent 12.8 px picks the 1000-unit sign; its 1.6 of spare
    // clearance plus the rule re-derives the gap as 2.24.
    assert_close(layout.width, 16.0);
    assert_close(layout.height, 14.4);
    assert_close(layout.depth, -1.92);
}

fn half_fraction() -> Atom {
    Atom::with_body(
        AtomKind::Fraction,
        "",
        0..3,
        Body::Fraction(Fraction {
            numerator: vec![Atom::new(AtomKind::Number, '1', 0..1)],
            denominator: vec![Atom::new(AtomKind::Number, '2', 2..3)],
            has_rule: true,
            left_delimiter: None,
            right_delimiter: None,
            continued: false,
        }),
    )
}

#[test]
fn scripts_on_a_fraction_widen_it() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let plain = typeset(&[half_fraction()], config).unwrap();

    let mut squared = half_fraction();
    squared.set_superscript(vec![Atom::new(AtomKind::Number, '2', 4..5)]);
    let scripted = typeset(&[squared], config).unwrap();

    // The superscript advance at script scale plus the trailing script space.
    assert_close(plain.width, 11.84);
    assert_close(scripted.width, 11.84 + 5.6 + 0.64);
    assert!(scripted.height > plain.height);
}

#[test]
fn scripts_on_a_radical_widen_it() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let sqrt = || {
        Atom::with_body(
            AtomKind::Radical,
            "",
            0..4,
            Body::Radical(Radical {
                radicand: vec![var('x')],
                degree: None,
            }),
        )
    };

    let plain = typeset(&[sqrt()], config).unwrap();
    let mut scripted_atom = sqrt();
    scripted_atom.set_subscript(vec![Atom::new(AtomKind::Number, '1', 5..6)]);
    let scripted = typeset(&[scripted_atom], config).unwrap();

    assert_close(plain.width, 16.0);
    assert_close(scripted.width, 16.0 + 5.6 + 0.64);
}

#[test]
fn overline_and_underline_carry_scripts() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    for kind in [AtomKind::Overline, AtomKind::Underline] {
        let lined = || Atom::with_body(kind, "", 0..1, Body::Enclosed(vec![var('x')]));
        let plain = typeset(&[lined()], config).unwrap();

        let mut scripted_atom = lined();
        scripted_atom.set_superscript(vec![Atom::new(AtomKind::Number, '2', 2..3)]);
        let scripted = typeset(&[scripted_atom], config).unwrap();

        assert!(
            scripted.width > plain.width,
            "{:?} dropped its superscript",
            kind
        );
    }
}

#[test]
fn wide_accent_picks_a_covering_variant() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let hat = Atom::with_body(
        AtomKind::Accent,
        '\u{0302}',
        0..1,
        Body::Accent(Accent {
            inner: vec![var('x'), var('y')],
            stretchy: false,
            wide: true,
        }),
    );
    let layout = typeset(&[hat], config).unwrap();

    // The 16 px content plus the coverage margin passes over the 1000-unit
    // variant to the 1600-unit one, whose optical center lands at 12.8.
    assert_close(layout.width, 8.0 - 12.8 + 25.6);
}

#[test]
fn binary_spacing_is_medium_in_text_style() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let atoms = [
        var('a'),
        Atom::new(AtomKind::BinaryOperator, '+', 1..2),
        var('b'),
    ];
    let layout = typeset(&atoms, config).unwrap();
    // Three glyphs plus a 4 mu gap on each side of the binary.
    assert_close(layout.width, 24.0 + 2.0 * (4.0 / 18.0) * 16.0);
}

#[test]
fn leading_minus_gets_no_operator_spacing() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let atoms = [Atom::new(AtomKind::BinaryOperator, '-', 0..1), var('a')];
    let layout = typeset(&atoms, config).unwrap();
    assert_close(layout.width, 16.0);
}

#[test]
fn adjacent_digits_render_flush() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    let atoms = [
        Atom::new(AtomKind::Number, '1', 0..1),
        Atom::new(AtomKind::Number, '2', 1..2),
    ];
    let layout = typeset(&atoms, config).unwrap();
    assert_close(layout.width, 16.0);
}

#[test]
fn nesting_past_the_cap_errors_out() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let mut config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);
    config.max_depth = 4;

    let mut atom = var('x');
    for _ in 0..6 {
        let mut outer = var('x');
        outer.set_superscript(vec![atom]);
        atom = outer;
    }

    let err = typeset(&[atom], config).unwrap_err();
    assert!(matches!(err, LayoutError::DepthLimit(4)));
}

#[test]
fn uncovered_codepoint_reports_the_character() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text);

    // Outside the mock font's BMP-only coverage.
    let atoms = [var('\u{1D538}')];
    let err = typeset(&atoms, config).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::Font(FontError::MissingGlyphCodepoint('\u{1D538}'))
    ));
}

#[test]
fn spaced_margin_widens_the_result() {
    let font = TestFont;
    let ctx = FontContext::new(&font);
    let config = LayoutSettings::new(&ctx, 16.0, LineStyle::Text).with_spaced(true);

    let layout = typeset(&[var('x')], config).unwrap();
    // One mu on each side of the glyph.
    assert_close(layout.width, 8.0 + 2.0 * 16.0 / 18.0);
    assert!(matches!(
        layout.contents[0].node,
        LayoutVariant::Kern
    ));
}
