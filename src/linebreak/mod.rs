//! Width-constrained typesetting: flatten, fit, rebuild.
//!
//! When a maximum width is given, the finalized list is flattened into
//! [`BreakableElement`](tokenizer::BreakableElement)s with width and penalty
//! metadata, a greedy fitter assigns them to lines, and the display builder
//! reassembles the lines into one box tree with adaptive leading. Structural
//! atoms pass through pre-rendered by the ordinary recursive walk, so both
//! paths share the same layout algorithms.

pub mod display;
pub mod fitter;
pub mod tokenizer;

use crate::atom::Atom;
use crate::error::LayoutResult;
use crate::font::FontMetrics;
use crate::layout::{Layout, LayoutSettings};

/// Typesets `atoms` into as many lines as `config.max_width` demands.
pub fn layout_constrained<'a, 'f: 'a, F: FontMetrics>(
    atoms: &[Atom],
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<Layout<'f, F>> {
    let elements = tokenizer::tokenize(atoms, config)?;
    let lines = fitter::fit(&elements, config.max_width);
    display::build(&elements, &lines, config)
}
