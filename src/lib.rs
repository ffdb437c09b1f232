//! Mathematical typesetting: TeX's box-and-glue layout over OpenType MATH
//! metrics.
//!
//! The input is a list of [`Atom`]s, the classified symbols a parser produces
//! from a formula. [`typeset`] normalizes the list, walks it recursively and
//! returns a tree of positioned boxes in surface units, ready for a renderer.
//! Font metrics come in through the [`FontMetrics`](font::FontMetrics) trait,
//! so any OpenType MATH capable font backend can drive the engine.
//!
//! With a width budget in the settings, the list is instead flattened into
//! breakable elements and fitted onto as many lines as it needs; see the
//! [`linebreak`] module.

#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate log;

pub mod dimensions;
pub mod error;
pub mod font;

pub mod atom;
#[macro_use]
pub mod layout;
pub mod linebreak;

pub use atom::{Atom, AtomKind};
pub use error::{LayoutError, LayoutResult};
pub use font::{FontContext, FontMetrics};
pub use layout::{Layout, LayoutSettings, LineStyle};

/// Typesets a formula. The atom list is normalized first, so it may come
/// straight from a parser; the result is a single layout whose baseline is the
/// main baseline of the formula.
///
/// A zero `max_width` lays the whole formula on one line. A non-zero budget
/// breaks it into lines at the least-bad opportunities.
pub fn typeset<'a, 'f: 'a, F: FontMetrics>(
    atoms: &[Atom],
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<Layout<'f, F>> {
    let finalized = atom::finalize(atoms);
    debug!(
        "typesetting {} atoms at {:?}, budget {}",
        finalized.len(),
        config.style,
        config.max_width
    );

    let inner = if config.max_width.is_zero() {
        layout::engine::layout(&finalized, config)?
    } else {
        linebreak::layout_constrained(&finalized, config)?
    };

    if !config.spaced {
        return Ok(inner);
    }

    // A thin margin keeps inline formulas from touching the surrounding text.
    use layout::Scaled;
    let margin = dimensions::MU.scaled(config);
    let mut out = Layout::new();
    out.add_node(kern!(horz: margin));
    out.add_node(inner.as_node());
    out.add_node(kern!(horz: margin));
    Ok(out)
}
