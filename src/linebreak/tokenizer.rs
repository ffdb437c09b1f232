//! Flattening a finalized list into breakable elements.
//!
//! Each element is an atomic slice of the line: a character, a padded operator
//! symbol, a pre-rendered structural box, or blank space. Elements carry their
//! own break permissions and penalties on both sides; the fitter never looks
//! inside one. Scripted atoms become a two-element group so the script box can
//! never be separated from its base.

use std::ops::Range;
use std::slice;

use unicode_segmentation::UnicodeSegmentation;

use crate::atom::{Atom, AtomKind, Body, FontFamily};
use crate::dimensions::units::Px;
use crate::dimensions::{Unit, MU};
use crate::error::LayoutResult;
use crate::font::FontMetrics;
use crate::layout::engine;
use crate::layout::{AsLayoutNode, Layout, LayoutNode, LayoutSettings, Scaled};

/// Break here only if the line cannot be assembled otherwise.
pub const PENALTY_INTRA_WORD: i32 = 200;
/// Joining two runs with no better opportunity between them.
pub const PENALTY_RUN: i32 = 60;
/// Before or after a pre-rendered structural box.
pub const PENALTY_BOX: i32 = 50;
/// At a word boundary inside a run.
pub const PENALTY_WORD_GAP: i32 = 20;
/// At explicit or table-driven spacing.
pub const PENALTY_SPACE: i32 = 10;
/// Around a binary or relation symbol, the preferred place to break.
pub const PENALTY_OPERATOR: i32 = 0;
/// Marks a side no break may ever cross.
pub const PENALTY_NEVER: i32 = i32::MAX;

/// One atomic slice of a line.
pub struct BreakableElement<'f, F> {
    pub content: ElementContent<'f, F>,
    /// Full advance of the element, padding included for operators.
    pub width: Unit<Px>,
    /// Extent above the baseline.
    pub ascent: Unit<Px>,
    /// Extent below the baseline, non-negative.
    pub descent: Unit<Px>,
    pub may_break_before: bool,
    pub may_break_after: bool,
    pub penalty_before: i32,
    pub penalty_after: i32,
    /// Elements sharing a group are fitted and placed as one unit.
    pub group: Option<usize>,
    /// The element has no internal break opportunities.
    pub indivisible: bool,
    pub source: Option<Range<usize>>,
}

pub enum ElementContent<'f, F> {
    /// A glyph run or a single character.
    Text(LayoutNode<'f, F>),
    /// A binary or relation symbol; placement adds half the padding on each
    /// side, the element width already accounts for all of it.
    Operator(LayoutNode<'f, F>),
    /// A pre-rendered box, placed as-is.
    Box(LayoutNode<'f, F>),
    /// Blank space, width on the element.
    Space,
}

impl<'f, F> BreakableElement<'f, F> {
    fn from_node(content: ElementContent<'f, F>, node_width: Unit<Px>, ascent: Unit<Px>, descent: Unit<Px>) -> Self {
        BreakableElement {
            content,
            width: node_width,
            ascent,
            descent,
            may_break_before: true,
            may_break_after: true,
            penalty_before: PENALTY_RUN,
            penalty_after: PENALTY_RUN,
            group: None,
            indivisible: false,
            source: None,
        }
    }

    fn space(width: Unit<Px>) -> Self {
        BreakableElement {
            content: ElementContent::Space,
            width,
            ascent: Unit::ZERO,
            descent: Unit::ZERO,
            may_break_before: false,
            may_break_after: true,
            penalty_before: PENALTY_NEVER,
            penalty_after: PENALTY_SPACE,
            group: None,
            indivisible: true,
            source: None,
        }
    }

    pub fn is_space(&self) -> bool {
        matches!(self.content, ElementContent::Space)
    }
}

/// Half of the padding an operator symbol carries on each side.
pub fn operator_pad<'a, 'f, F>(config: LayoutSettings<'a, 'f, F>) -> Unit<Px> {
    MU.scale(2.0).scaled(config)
}

/// East Asian line-breaking classes of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KinsokuClass {
    /// Opening bracket or quote; no break after.
    Opening,
    /// Closing bracket or quote; no break before.
    Closing,
    /// Sentence-ending punctuation; no break before.
    SentenceEnding,
    /// Small kana and the prolonged sound mark; no break before.
    SmallKana,
    Neutral,
}

pub fn kinsoku_class(ch: char) -> KinsokuClass {
    match ch {
        '(' | '[' | '{' | '\u{2018}' | '\u{201C}'
        | '\u{3008}' | '\u{300A}' | '\u{300C}' | '\u{300E}' | '\u{3010}' | '\u{3014}'
        | '\u{FF08}' | '\u{FF3B}' | '\u{FF5B}' => KinsokuClass::Opening,

        ')' | ']' | '}' | '\u{2019}' | '\u{201D}'
        | '\u{3009}' | '\u{300B}' | '\u{300D}' | '\u{300F}' | '\u{3011}' | '\u{3015}'
        | '\u{FF09}' | '\u{FF3D}' | '\u{FF5D}' => KinsokuClass::Closing,

        '.' | ',' | '!' | '?' | ';' | ':'
        | '\u{3001}' | '\u{3002}' | '\u{FF01}' | '\u{FF0C}' | '\u{FF0E}' | '\u{FF1A}'
        | '\u{FF1B}' | '\u{FF1F}' => KinsokuClass::SentenceEnding,

        '\u{3041}' | '\u{3043}' | '\u{3045}' | '\u{3047}' | '\u{3049}' | '\u{3063}'
        | '\u{3083}' | '\u{3085}' | '\u{3087}' | '\u{308E}'
        | '\u{30A1}' | '\u{30A3}' | '\u{30A5}' | '\u{30A7}' | '\u{30A9}' | '\u{30C3}'
        | '\u{30E3}' | '\u{30E5}' | '\u{30E7}' | '\u{30EE}' | '\u{30F5}' | '\u{30F6}'
        | '\u{30FC}' => KinsokuClass::SmallKana,

        _ => KinsokuClass::Neutral,
    }
}

fn forbids_break_after(ch: char) -> bool {
    kinsoku_class(ch) == KinsokuClass::Opening
}

fn forbids_break_before(ch: char) -> bool {
    matches!(
        kinsoku_class(ch),
        KinsokuClass::Closing | KinsokuClass::SentenceEnding | KinsokuClass::SmallKana
    )
}

/// Flattens `atoms` into breakable elements at the given settings.
pub fn tokenize<'a, 'f: 'a, F: FontMetrics>(
    atoms: &[Atom],
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<Vec<BreakableElement<'f, F>>> {
    let fused = fuse_text_runs(atoms);
    let mut out = Vec::new();
    let mut config = config;
    let mut next_group = 0usize;
    let mut prev: Option<AtomKind> = None;

    for atom in &fused {
        match atom.body {
            Body::Style(style) => {
                config.style = style;
                continue;
            }
            Body::Space(space) => {
                out.push(BreakableElement::space(space.scaled(config)));
                continue;
            }
            _ => {}
        }

        let operator = is_operator(atom);

        // Table-driven gaps become space elements, except around operators
        // whose padding replaces them in this pipeline.
        if let Some(left) = prev {
            if !operator && !is_operator_kind(left) {
                let gap = crate::layout::spacing::atom_space(left, atom.kind, config.style)?;
                if !gap.is_zero() {
                    out.push(BreakableElement::space(gap.scaled(config)));
                }
            }
        }

        if atom.has_scripts() && matches!(atom.body, Body::None) {
            let group = next_group;
            next_group += 1;
            scripted_group(&mut out, atom, group, config)?;
        } else if operator && matches!(atom.body, Body::None) {
            operator_element(&mut out, atom, config)?;
        } else if matches!(atom.body, Body::None)
            && atom.font_style.family == FontFamily::Roman
            && atom.nucleus.chars().count() > 1
        {
            explode_run(&mut out, atom, config)?;
        } else {
            let node = engine::layout(slice::from_ref(atom), config)?.as_node();
            let structural = !matches!(atom.body, Body::None);
            let mut element = BreakableElement::from_node(
                if structural {
                    ElementContent::Box(node.clone())
                } else {
                    ElementContent::Text(node.clone())
                },
                node.width,
                node.height,
                -node.depth,
            );
            if structural {
                element.indivisible = true;
                element.penalty_before = PENALTY_BOX;
                element.penalty_after = PENALTY_BOX;
            }
            element.source = Some(atom.index_range.clone());
            out.push(element);
        }

        prev = Some(atom.kind);
    }

    Ok(out)
}

fn is_operator_kind(kind: AtomKind) -> bool {
    matches!(kind, AtomKind::BinaryOperator | AtomKind::Relation)
}

fn is_operator(atom: &Atom) -> bool {
    is_operator_kind(atom.kind) && !atom.has_scripts()
}

fn operator_element<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Vec<BreakableElement<'f, F>>,
    atom: &Atom,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    let node = engine::layout(slice::from_ref(atom), config)?.as_node();
    let pad = operator_pad(config);
    let mut element = BreakableElement::from_node(
        ElementContent::Operator(node.clone()),
        node.width + pad.scale(2.0),
        node.height,
        -node.depth,
    );
    element.penalty_before = PENALTY_OPERATOR;
    element.penalty_after = PENALTY_OPERATOR;
    element.source = Some(atom.index_range.clone());
    out.push(element);
    Ok(())
}

/// The base and its script box, bound into one group. The script placement is
/// the same joint-shift computation the unconstrained path uses.
fn scripted_group<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Vec<BreakableElement<'f, F>>,
    atom: &Atom,
    group: usize,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    let bare = atom.without_scripts();
    let base = engine::layout(slice::from_ref(&bare), config)?;
    let scripts = engine::lay_scripts(atom, config)?;

    let mut assembled = Layout::new();
    let base_height = base.height;
    crate::layout::scripts::add_scripts(&mut assembled, base, scripts, base_height, false, config)?;

    let mut nodes = assembled.contents.into_iter();
    let base_node = match nodes.next() {
        Some(node) => node,
        None => return Ok(()),
    };

    let mut script_box = Layout::new();
    for node in nodes {
        script_box.add_node(node);
    }
    let script_node = script_box.as_node();

    let mut base_element = BreakableElement::from_node(
        ElementContent::Text(base_node.clone()),
        base_node.width,
        base_node.height,
        -base_node.depth,
    );
    base_element.group = Some(group);
    base_element.may_break_after = false;
    base_element.penalty_after = PENALTY_NEVER;
    base_element.source = Some(atom.index_range.clone());
    out.push(base_element);

    let mut script_element = BreakableElement::from_node(
        ElementContent::Box(script_node.clone()),
        script_node.width,
        script_node.height,
        -script_node.depth,
    );
    script_element.group = Some(group);
    script_element.may_break_before = false;
    script_element.penalty_before = PENALTY_NEVER;
    script_element.indivisible = true;
    out.push(script_element);

    Ok(())
}

/// Explodes a roman run into per-character elements, marking break permissions
/// from Unicode word boundaries and bracket/punctuation classes.
fn explode_run<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Vec<BreakableElement<'f, F>>,
    atom: &Atom,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    let text = atom.nucleus.as_str();
    let word_starts: Vec<usize> = text.split_word_bound_indices().map(|(i, _)| i).collect();
    let first_index = out.len();
    let mut prev_char: Option<char> = None;

    for (offset, ch) in text.char_indices() {
        let node = config.ctx.glyph(ch)?.as_layout(config)?;
        let mut element = BreakableElement::from_node(
            ElementContent::Text(node.clone()),
            node.width,
            node.height,
            -node.depth,
        );
        element.source = Some(atom.index_range.clone());

        if let Some(prev) = prev_char {
            let mut may_break = true;
            let mut penalty = if word_starts.binary_search(&offset).is_ok() {
                PENALTY_WORD_GAP
            } else {
                PENALTY_INTRA_WORD
            };

            if forbids_break_after(prev) || forbids_break_before(ch) {
                may_break = false;
                penalty = PENALTY_NEVER;
            }
            // Apostrophes stay inside their word; hyphens invite a break after
            // but never before.
            if ch == '\'' || ch == '\u{2019}' || prev == '\'' || prev == '\u{2019}' {
                may_break = false;
                penalty = PENALTY_NEVER;
            }
            if prev == '-' && may_break {
                penalty = PENALTY_WORD_GAP;
            }
            if ch == '-' {
                may_break = false;
                penalty = PENALTY_NEVER;
            }

            element.may_break_before = may_break;
            element.penalty_before = penalty;
        }

        element.penalty_after = PENALTY_INTRA_WORD;
        out.push(element);
        prev_char = Some(ch);
    }

    // Run edges break at run level, not at character level.
    if let Some(first) = out.get_mut(first_index) {
        first.may_break_before = true;
        first.penalty_before = PENALTY_RUN;
    }
    if let Some(last) = out.last_mut() {
        last.may_break_after = true;
        last.penalty_after = PENALTY_RUN;
    }

    Ok(())
}

/// Merges adjacent text-like atoms of the same face into single runs so word
/// breaking can see whole words.
fn fuse_text_runs(atoms: &[Atom]) -> Vec<Atom> {
    let mut out: Vec<Atom> = Vec::with_capacity(atoms.len());

    for atom in atoms {
        if fusable(atom) {
            if let Some(prev) = out.last_mut() {
                if fusable(prev) && prev.font_style == atom.font_style {
                    prev.nucleus.push_str(&atom.nucleus);
                    prev.index_range.end = prev.index_range.end.max(atom.index_range.end);
                    prev.fused.push(atom.clone());
                    continue;
                }
            }
        }
        out.push(atom.clone());
    }

    out
}

fn fusable(atom: &Atom) -> bool {
    matches!(
        atom.kind,
        AtomKind::Ordinary | AtomKind::Number | AtomKind::Variable | AtomKind::UnaryOperator
    ) && matches!(atom.body, Body::None)
        && !atom.has_scripts()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;

    #[test]
    fn bracket_and_punctuation_classes() {
        assert_eq!(kinsoku_class('('), KinsokuClass::Opening);
        assert_eq!(kinsoku_class('\u{300C}'), KinsokuClass::Opening);
        assert_eq!(kinsoku_class(')'), KinsokuClass::Closing);
        assert_eq!(kinsoku_class('\u{3002}'), KinsokuClass::SentenceEnding);
        assert_eq!(kinsoku_class('\u{30C3}'), KinsokuClass::SmallKana);
        assert_eq!(kinsoku_class('a'), KinsokuClass::Neutral);
        assert!(forbids_break_after('('));
        assert!(forbids_break_before('\u{3002}'));
        assert!(!forbids_break_before('a'));
    }

    #[test]
    fn same_face_runs_fuse() {
        let atoms = vec![
            Atom::new(AtomKind::Ordinary, 'w', 0..1),
            Atom::new(AtomKind::Ordinary, 'o', 1..2),
            Atom::new(AtomKind::Ordinary, 'r', 2..3),
            Atom::new(AtomKind::Ordinary, 'd', 3..4),
        ];
        let fused = fuse_text_runs(&atoms);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].nucleus, "word");
        assert_eq!(fused[0].index_range, 0..4);
    }

    #[test]
    fn scripts_block_fusion() {
        let mut scripted = Atom::new(AtomKind::Ordinary, 'x', 1..2);
        scripted.set_superscript(vec![Atom::new(AtomKind::Number, '2', 3..4)]);
        let atoms = vec![
            Atom::new(AtomKind::Ordinary, 'a', 0..1),
            scripted,
            Atom::new(AtomKind::Ordinary, 'b', 4..5),
        ];
        assert_eq!(fuse_text_runs(&atoms).len(), 3);
    }

    #[test]
    fn face_change_blocks_fusion() {
        use crate::atom::{FontStyle, FontFamily};
        let mut italic = Atom::new(AtomKind::Ordinary, 'x', 1..2);
        italic.font_style = FontStyle {
            family: FontFamily::Italic,
            ..FontStyle::default()
        };
        let atoms = vec![Atom::new(AtomKind::Ordinary, 'a', 0..1), italic];
        assert_eq!(fuse_text_runs(&atoms).len(), 2);
    }
}
