//! The output side of the engine: positioned boxes ready for a renderer.
//!
//! The box model is TeX's. A horizontal box lays children side by side and its
//! baseline runs through them; a vertical box stacks children top to bottom with
//! an offset locating its baseline. Every node carries width, height (baseline to
//! top) and depth (baseline to bottom), plus an optional source range so a
//! renderer can map a point back to the atom that produced it.

#[macro_use]
pub mod builders;
mod convert;
pub mod engine;
pub mod scripts;
pub mod spacing;

pub use self::convert::{AsLayoutNode, Scaled};

use crate::atom::Rgba;
use crate::dimensions::units::{Em, Px, Ratio};
use crate::dimensions::Unit;
use crate::error::{LayoutError, LayoutResult};
use crate::font::{FontContext, GlyphId};
use std::fmt;
use std::ops::{Deref, Range};

/// A laid-out horizontal run: children plus aggregate measurements. The direct
/// output of the engine, convertible into a node of an enclosing layout.
#[derive(Clone, Debug)]
pub struct Layout<'f, F> {
    pub contents: Vec<LayoutNode<'f, F>>,
    pub width: Unit<Px>,
    pub height: Unit<Px>,
    pub depth: Unit<Px>,
    pub offset: Unit<Px>,
    pub alignment: Alignment,
}

impl<'f, F> Default for Layout<'f, F> {
    fn default() -> Self {
        Self {
            contents: Vec::default(),
            width: Unit::ZERO,
            height: Unit::ZERO,
            depth: Unit::ZERO,
            offset: Unit::ZERO,
            alignment: Alignment::default(),
        }
    }
}

impl<'f, F> Layout<'f, F> {
    pub fn new() -> Layout<'f, F> {
        Layout::default()
    }

    /// Appends a node on the right.
    pub fn add_node(&mut self, node: LayoutNode<'f, F>) {
        self.width += node.width;
        self.height = self.height.max(node.height);
        self.depth = self.depth.min(node.depth);
        self.contents.push(node);
    }

    pub fn set_offset(&mut self, offset: Unit<Px>) {
        self.offset = offset;
    }

    /// Applies the accumulated offset to the reported extents.
    pub fn finalize(mut self) -> Layout<'f, F> {
        self.depth -= self.offset;
        self.height -= self.offset;
        self
    }

    /// Widens the layout to `new_width`, centering the children in it.
    pub fn centered(mut self, new_width: Unit<Px>) -> Layout<'f, F> {
        self.alignment = Alignment::Centered(self.width);
        self.width = new_width;
        self
    }

    /// Wraps the layout as a node of an enclosing layout.
    pub fn as_node(self) -> LayoutNode<'f, F> {
        LayoutNode {
            width: self.width,
            height: self.height,
            depth: self.depth,
            source: None,
            node: LayoutVariant::HorizontalBox(HorizontalBox {
                contents: self.contents,
                offset: self.offset,
                alignment: self.alignment,
            }),
        }
    }

    pub(crate) fn is_symbol(&self) -> Option<LayoutGlyph<'f, F>> {
        is_symbol(&self.contents)
    }
}

/// One node of the box tree.
pub struct LayoutNode<'f, F> {
    pub node: LayoutVariant<'f, F>,
    pub width: Unit<Px>,
    pub height: Unit<Px>,
    pub depth: Unit<Px>,
    /// Range into the source string of the atom this box renders, when known.
    pub source: Option<Range<usize>>,
}

impl<'f, F> Clone for LayoutNode<'f, F> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            width: self.width,
            height: self.height,
            depth: self.depth,
            source: self.source.clone(),
        }
    }
}

pub enum LayoutVariant<'f, F> {
    HorizontalBox(HorizontalBox<'f, F>),
    VerticalBox(VerticalBox<'f, F>),
    Glyph(LayoutGlyph<'f, F>),
    /// A color-scoped group of nodes.
    Color(ColorChange<'f, F>),
    /// A filled rectangle, dimensions on the node.
    Rule,
    /// Blank space, possibly negative, dimensions on the node.
    Kern,
}

impl<'f, F> Clone for LayoutVariant<'f, F> {
    fn clone(&self) -> Self {
        match self {
            LayoutVariant::HorizontalBox(hbox) => LayoutVariant::HorizontalBox(hbox.clone()),
            LayoutVariant::VerticalBox(vbox) => LayoutVariant::VerticalBox(vbox.clone()),
            LayoutVariant::Glyph(glyph) => LayoutVariant::Glyph(*glyph),
            LayoutVariant::Color(color) => LayoutVariant::Color(color.clone()),
            LayoutVariant::Rule => LayoutVariant::Rule,
            LayoutVariant::Kern => LayoutVariant::Kern,
        }
    }
}

/// Children are painted with `color` as the fill.
pub struct ColorChange<'f, F> {
    pub color: Rgba,
    /// Painted behind `inner` instead of recoloring it, for `\colorbox`.
    pub backdrop: bool,
    pub inner: Vec<LayoutNode<'f, F>>,
}

impl<'f, F> Clone for ColorChange<'f, F> {
    fn clone(&self) -> Self {
        Self {
            color: self.color,
            backdrop: self.backdrop,
            inner: self.inner.clone(),
        }
    }
}

/// Children placed side by side on a shared baseline.
pub struct HorizontalBox<'f, F> {
    pub contents: Vec<LayoutNode<'f, F>>,
    pub offset: Unit<Px>,
    pub alignment: Alignment,
}

impl<'f, F> Clone for HorizontalBox<'f, F> {
    fn clone(&self) -> Self {
        Self {
            contents: self.contents.clone(),
            offset: self.offset,
            alignment: self.alignment,
        }
    }
}

impl<'f, F> Default for HorizontalBox<'f, F> {
    fn default() -> Self {
        Self {
            contents: Vec::default(),
            offset: Unit::ZERO,
            alignment: Alignment::default(),
        }
    }
}

/// Children stacked top to bottom; `offset` raises or lowers the baseline.
pub struct VerticalBox<'f, F> {
    pub contents: Vec<LayoutNode<'f, F>>,
    pub offset: Unit<Px>,
    pub alignment: Alignment,
}

impl<'f, F> Clone for VerticalBox<'f, F> {
    fn clone(&self) -> Self {
        Self {
            contents: self.contents.clone(),
            offset: self.offset,
            alignment: self.alignment,
        }
    }
}

impl<'f, F> Default for VerticalBox<'f, F> {
    fn default() -> Self {
        Self {
            contents: Vec::default(),
            offset: Unit::ZERO,
            alignment: Alignment::default(),
        }
    }
}

/// A single positioned glyph.
pub struct LayoutGlyph<'f, F> {
    pub gid: GlyphId,
    /// Rendered size of one em, in surface units.
    pub size: Unit<Px>,
    /// Vertical offset from the baseline.
    pub offset: Unit<Px>,
    /// Top accent attachment point.
    pub attachment: Unit<Px>,
    pub italics: Unit<Px>,
    pub font: &'f F,
}

impl<'f, F> Clone for LayoutGlyph<'f, F> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'f, F> Copy for LayoutGlyph<'f, F> {}

/// Horizontal placement of children inside a box wider than their natural size.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Alignment {
    /// Centered within the argument width (the children's natural width).
    Centered(Unit<Px>),
    /// Right-aligned within the argument width.
    Right(Unit<Px>),
    Left,
    Default,
}

impl Default for Alignment {
    fn default() -> Alignment {
        Alignment::Default
    }
}

impl<'f, F> Deref for HorizontalBox<'f, F> {
    type Target = [LayoutNode<'f, F>];
    fn deref(&self) -> &Self::Target {
        &self.contents
    }
}

impl<'f, F> Deref for VerticalBox<'f, F> {
    type Target = [LayoutNode<'f, F>];
    fn deref(&self) -> &Self::Target {
        &self.contents
    }
}

impl<'f, F> fmt::Debug for HorizontalBox<'f, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HorizontalBox({:?})", self.contents)
    }
}

impl<'f, F> fmt::Debug for VerticalBox<'f, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.offset.is_zero() {
            write!(f, "VerticalBox({:?})", self.contents)
        } else {
            write!(f, "VerticalBox({:?}, offset: {})", self.contents, self.offset)
        }
    }
}

impl<'f, F> fmt::Debug for LayoutGlyph<'f, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LayoutGlyph({})", Into::<u16>::into(self.gid))
    }
}

impl<'f, F> fmt::Debug for LayoutVariant<'f, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LayoutVariant::HorizontalBox(hb) => write!(f, "HBox({:?})", hb.contents),
            LayoutVariant::VerticalBox(vb) => write!(f, "VBox({:?})", vb.contents),
            LayoutVariant::Glyph(glyph) => write!(f, "Glyph({:?})", glyph),
            LayoutVariant::Color(color) => write!(f, "Color({:?}, {:?})", color.color, color.inner),
            LayoutVariant::Rule => write!(f, "Rule()"),
            LayoutVariant::Kern => write!(f, "Kern()"),
        }
    }
}

impl<'f, F> fmt::Debug for LayoutNode<'f, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.node {
            LayoutVariant::HorizontalBox(ref hb) => write!(f, "HBox({:?})", hb.contents),
            LayoutVariant::VerticalBox(ref vb) => write!(f, "VBox({:?})", vb.contents),
            LayoutVariant::Glyph(ref glyph) => write!(f, "Glyph({:?})", glyph),
            LayoutVariant::Color(ref color) => write!(f, "Color({:?}, {:?})", color.color, color.inner),
            LayoutVariant::Rule => write!(f, "Rule()"),
            LayoutVariant::Kern => {
                let kern = if self.width.is_zero() { self.height } else { self.width };
                write!(f, "Kern({:.1})", kern)
            }
        }
    }
}

impl<'f, F> LayoutNode<'f, F> {
    /// Centers this node vertically on the math axis.
    pub fn centered(mut self, axis: Unit<Px>) -> LayoutNode<'f, F> {
        let shift = (self.height + self.depth).scale(0.5) - axis;

        match self.node {
            LayoutVariant::VerticalBox(ref mut vb) => {
                vb.offset = shift;
                self.height -= shift;
                self.depth -= shift;
            }
            LayoutVariant::Glyph(_) => return vbox!(offset: shift; self),
            _ => (),
        }

        self
    }

    pub(crate) fn is_symbol(&self) -> Option<LayoutGlyph<'f, F>> {
        match self.node {
            LayoutVariant::Glyph(glyph) => Some(glyph),
            LayoutVariant::HorizontalBox(ref hb) => is_symbol(&hb.contents),
            LayoutVariant::VerticalBox(ref vb) => is_symbol(&vb.contents),
            LayoutVariant::Color(ref color) => is_symbol(&color.inner),
            _ => None,
        }
    }

}

fn is_symbol<'a, 'b: 'a, F>(contents: &'a [LayoutNode<'b, F>]) -> Option<LayoutGlyph<'b, F>> {
    if contents.len() != 1 {
        return None;
    }
    contents[0].is_symbol()
}

/// The four TeX size levels. Whether a position is cramped is carried separately
/// in [`LayoutSettings`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineStyle {
    ScriptScript,
    Script,
    Text,
    Display,
}

impl Default for LineStyle {
    fn default() -> LineStyle {
        LineStyle::Display
    }
}

impl LineStyle {
    /// The next smaller script level.
    pub fn script_variant(self) -> LineStyle {
        match self {
            LineStyle::Display | LineStyle::Text => LineStyle::Script,
            LineStyle::Script | LineStyle::ScriptScript => LineStyle::ScriptScript,
        }
    }

    pub fn is_script(self) -> bool {
        matches!(self, LineStyle::Script | LineStyle::ScriptScript)
    }
}

/// Everything layout needs besides the atoms: the font, the size, the current
/// style level, and the recursion budget. `Copy`, so style transitions hand out
/// modified copies.
pub struct LayoutSettings<'a, 'f, F> {
    pub ctx: &'a FontContext<'f, F>,
    /// Font size, in pixels per em.
    pub font_size: Unit<Ratio<Px, Em>>,
    pub style: LineStyle,
    pub cramped: bool,
    /// Add a one-mu margin on each side of the whole expression.
    pub spaced: bool,
    /// Line width budget; zero means unconstrained.
    pub max_width: Unit<Px>,
    /// Nesting cap; exceeding it fails with [`LayoutError::DepthLimit`].
    pub max_depth: usize,
    depth: usize,
}

impl<'a, 'f, F> Clone for LayoutSettings<'a, 'f, F> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, 'f, F> Copy for LayoutSettings<'a, 'f, F> {}

pub const DEFAULT_MAX_DEPTH: usize = 256;

impl<'a, 'f, F> LayoutSettings<'a, 'f, F> {
    pub fn new(ctx: &'a FontContext<'f, F>, font_size: f64, style: LineStyle) -> Self {
        LayoutSettings {
            ctx,
            font_size: Unit::new(font_size),
            style,
            cramped: false,
            spaced: false,
            max_width: Unit::ZERO,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    pub fn with_cramped(self, cramped: bool) -> Self {
        LayoutSettings { cramped, ..self }
    }

    pub fn with_spaced(self, spaced: bool) -> Self {
        LayoutSettings { spaced, ..self }
    }

    pub fn with_max_width(self, max_width: Unit<Px>) -> Self {
        LayoutSettings { max_width, ..self }
    }

    /// One level deeper, or the depth error once the cap is hit.
    pub(crate) fn descend(self) -> LayoutResult<Self> {
        if self.depth >= self.max_depth {
            return Err(LayoutError::DepthLimit(self.max_depth));
        }
        Ok(LayoutSettings {
            depth: self.depth + 1,
            ..self
        })
    }

    pub(crate) fn cramped(self) -> Self {
        LayoutSettings {
            cramped: true,
            ..self
        }
    }

    pub(crate) fn superscript_variant(self) -> Self {
        LayoutSettings {
            style: self.style.script_variant(),
            ..self
        }
    }

    pub(crate) fn subscript_variant(self) -> Self {
        LayoutSettings {
            style: self.style.script_variant(),
            cramped: true,
            ..self
        }
    }

    /// Fractions keep the current size level so inline fractions stay readable;
    /// only the cramping of the denominator changes.
    pub(crate) fn numerator(self) -> Self {
        self
    }

    pub(crate) fn denominator(self) -> Self {
        self.cramped()
    }

    pub(crate) fn sup_shift_up(self) -> Unit<Em> {
        if self.cramped {
            self.ctx.constants.superscript_shift_up_cramped
        } else {
            self.ctx.constants.superscript_shift_up
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LineStyle;

    #[test]
    fn script_variant_bottoms_out() {
        assert_eq!(LineStyle::Display.script_variant(), LineStyle::Script);
        assert_eq!(LineStyle::Text.script_variant(), LineStyle::Script);
        assert_eq!(LineStyle::Script.script_variant(), LineStyle::ScriptScript);
        assert_eq!(
            LineStyle::ScriptScript.script_variant(),
            LineStyle::ScriptScript
        );
    }
}
