//! Reassembling fitted lines into one box tree.
//!
//! Each line becomes a horizontal box, trimmed of the blank space it starts or
//! ends with. Lines stack into a vertical box whose baseline is the first
//! line's, with baseline distances adapted to the ink of the adjacent lines so
//! tall content never collides.

use super::fitter::Line;
use super::tokenizer::{operator_pad, BreakableElement, ElementContent};
use crate::dimensions::units::{Em, Px};
use crate::dimensions::Unit;
use crate::error::LayoutResult;
use crate::layout::{builders, Layout, LayoutNode, LayoutSettings};

/// White kept between the ink of consecutive lines, in em.
const LINE_GAP_MIN: f64 = 0.1;
/// Minimum baseline-to-baseline distance, in em.
const BASE_LINE_SKIP: f64 = 1.2;

/// Assembles `lines` over `elements` into a single layout whose baseline is the
/// first line's baseline.
pub fn build<'a, 'f: 'a, F>(
    elements: &[BreakableElement<'f, F>],
    lines: &[Line],
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<Layout<'f, F>> {
    let pad = operator_pad(config);
    let boxes: Vec<LayoutNode<'f, F>> = lines
        .iter()
        .filter_map(|line| line_box(&elements[line.range.clone()], pad))
        .collect();

    let mut out = Layout::new();
    match boxes.len() {
        0 => {}
        1 => {
            let only = boxes.into_iter().next().unwrap();
            out.add_node(only);
        }
        _ => {
            let breathing = Unit::<Em>::new(LINE_GAP_MIN) * config.font_size;
            let line_skip = Unit::<Em>::new(BASE_LINE_SKIP) * config.font_size;
            out.add_node(stack(boxes, breathing, line_skip));
        }
    }
    Ok(out)
}

/// The horizontal box of one line, or `None` for a line of pure space.
fn line_box<'f, F>(
    elements: &[BreakableElement<'f, F>],
    operator_pad: Unit<Px>,
) -> Option<LayoutNode<'f, F>> {
    let start = elements.iter().position(|element| !element.is_space())?;
    let end = elements.iter().rposition(|element| !element.is_space())? + 1;

    let mut line = Layout::new();
    for element in &elements[start..end] {
        match element.content {
            ElementContent::Space => line.add_node(kern!(horz: element.width)),
            ElementContent::Operator(ref node) => {
                line.add_node(kern!(horz: operator_pad));
                line.add_node(sourced(node, element));
                line.add_node(kern!(horz: operator_pad));
            }
            ElementContent::Text(ref node) | ElementContent::Box(ref node) => {
                line.add_node(sourced(node, element));
            }
        }
    }
    Some(line.as_node())
}

fn sourced<'f, F>(node: &LayoutNode<'f, F>, element: &BreakableElement<'f, F>) -> LayoutNode<'f, F> {
    let mut node = node.clone();
    if node.source.is_none() {
        node.source = element.source.clone();
    }
    node
}

/// Stacks line boxes top to bottom, baseline on the first line. The distance
/// between two baselines is the larger of the surrounding ink plus a breathing
/// minimum, and the uniform line skip.
fn stack<'f, F>(
    boxes: Vec<LayoutNode<'f, F>>,
    breathing: Unit<Px>,
    line_skip: Unit<Px>,
) -> LayoutNode<'f, F> {
    let mut vbox = builders::VBox::new();
    let mut below_first = Unit::<Px>::ZERO;
    let mut prev_depth = Unit::<Px>::ZERO;

    for (index, node) in boxes.into_iter().enumerate() {
        if index > 0 {
            let distance = Unit::max(-prev_depth + breathing + node.height, line_skip);
            let fill = distance - node.height;
            below_first += fill + node.height;
            vbox.add_node(kern!(vert: fill));
        }
        prev_depth = node.depth;
        vbox.add_node(node);
    }

    vbox.set_offset(below_first);
    vbox.build()
}
