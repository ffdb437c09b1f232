//! Incremental horizontal and vertical box builders, plus the `hbox!`, `vbox!`,
//! `rule!` and `kern!` shorthands the layout algorithms are written in.

#![allow(dead_code)]

use super::{Alignment, HorizontalBox, LayoutNode, LayoutVariant, VerticalBox};
use crate::dimensions::{units::Px, Unit};

pub struct VBox<'a, F> {
    pub width: Unit<Px>,
    pub height: Unit<Px>,
    pub depth: Unit<Px>,
    node: VerticalBox<'a, F>,
}

impl<'a, F> Default for VBox<'a, F> {
    fn default() -> Self {
        Self {
            width: Unit::ZERO,
            height: Unit::ZERO,
            depth: Unit::ZERO,
            node: VerticalBox::default(),
        }
    }
}

impl<'a, F> VBox<'a, F> {
    pub fn new() -> VBox<'a, F> {
        VBox::default()
    }

    pub fn add_node(&mut self, node: LayoutNode<'a, F>) {
        self.width = self.width.max(node.width);
        self.height += node.height;
        self.node.contents.push(node);
    }

    pub fn insert_node(&mut self, idx: usize, node: LayoutNode<'a, F>) {
        self.width = self.width.max(node.width);
        self.height += node.height;
        self.node.contents.insert(idx, node);
    }

    pub fn set_offset(&mut self, offset: Unit<Px>) {
        self.node.offset = offset;
    }

    pub fn set_alignment(&mut self, align: Alignment) {
        self.node.alignment = align;
    }

    pub fn build(mut self) -> LayoutNode<'a, F> {
        // The depth of a vertical stack is the depth of its last child, shifted
        // by the baseline offset.
        if let Some(node) = self.node.contents.last() {
            self.depth = node.depth;
        }

        self.depth -= self.node.offset;
        self.height -= self.node.offset;

        LayoutNode {
            width: self.width,
            height: self.height,
            depth: self.depth,
            source: None,
            node: LayoutVariant::VerticalBox(self.node),
        }
    }
}

pub struct HBox<'a, F> {
    pub width: Unit<Px>,
    pub height: Unit<Px>,
    pub depth: Unit<Px>,
    pub node: HorizontalBox<'a, F>,
}

impl<'a, F> Default for HBox<'a, F> {
    fn default() -> Self {
        Self {
            width: Unit::ZERO,
            height: Unit::ZERO,
            depth: Unit::ZERO,
            node: HorizontalBox::default(),
        }
    }
}

impl<'a, F> HBox<'a, F> {
    pub fn new() -> HBox<'a, F> {
        HBox::default()
    }

    pub fn add_node(&mut self, node: LayoutNode<'a, F>) {
        self.width += node.width;
        self.height = self.height.max(node.height);
        self.depth = self.depth.min(node.depth);
        self.node.contents.push(node);
    }

    pub fn set_offset(&mut self, offset: Unit<Px>) {
        self.node.offset = offset;
    }

    pub fn set_alignment(&mut self, align: Alignment) {
        self.node.alignment = align;
    }

    pub fn set_width(&mut self, width: Unit<Px>) {
        self.width = width;
    }

    pub fn build(mut self) -> LayoutNode<'a, F> {
        self.depth -= self.node.offset;
        self.height -= self.node.offset;

        LayoutNode {
            width: self.width,
            height: self.height,
            depth: self.depth,
            source: None,
            node: LayoutVariant::HorizontalBox(self.node),
        }
    }
}

macro_rules! vbox {
    (offset: $offset:expr; $($node:expr),*) => ({
        let mut _vbox = $crate::layout::builders::VBox::new();
        $( _vbox.add_node($node); )*
        _vbox.set_offset($offset);
        _vbox.build()
    });

    ( $($node:expr),* ) => ({
        let mut _vbox = $crate::layout::builders::VBox::new();
        $( _vbox.add_node($node); )*
        _vbox.build()
    });
}

macro_rules! hbox {
    (offset: $offset:expr; $($node:expr),*) => ({
        let mut _hbox = $crate::layout::builders::HBox::new();
        $( _hbox.add_node($node); )*
        _hbox.set_offset($offset);
        _hbox.build()
    });

    (align: $align:expr; width: $width:expr; $($node:expr),*) => ({
        let mut _hbox = $crate::layout::builders::HBox::new();
        let align = $align;
        let width = $width;
        $( _hbox.add_node($node); )*
        _hbox.set_alignment(align);
        _hbox.set_width(width);
        _hbox.build()
    });

    ( $($node:expr),* ) => ({
        let mut _hbox = $crate::layout::builders::HBox::new();
        $( _hbox.add_node($node); )*
        _hbox.build()
    });
}

macro_rules! rule {
    (width: $width:expr, height: $height:expr) => (
        rule!(width: $width, height: $height, depth: $crate::dimensions::Unit::ZERO)
    );

    (width: $width:expr, height: $height:expr, depth: $depth:expr) => (
        $crate::layout::LayoutNode {
            width:  $width,
            height: $height,
            depth:  $depth,
            source: None,
            node:   $crate::layout::LayoutVariant::Rule,
        }
    );
}

macro_rules! kern {
    (vert: $height:expr) => (
        $crate::layout::LayoutNode {
            width:  $crate::dimensions::Unit::ZERO,
            height: $height,
            depth:  $crate::dimensions::Unit::ZERO,
            source: None,
            node:   $crate::layout::LayoutVariant::Kern,
        }
    );

    (horz: $width:expr) => (
        $crate::layout::LayoutNode {
            width:  $width,
            height: $crate::dimensions::Unit::ZERO,
            depth:  $crate::dimensions::Unit::ZERO,
            source: None,
            node:   $crate::layout::LayoutVariant::Kern,
        }
    );
}

macro_rules! max {
    ($only:expr) => ($only);
    ($first:expr, $($rest:expr),+ $(,)?) => ($first.max(max!($($rest),+)));
}

#[cfg(test)]
mod tests {
    use crate::dimensions::{units::Px, Unit};

    fn px(v: f64) -> Unit<Px> {
        Unit::new(v)
    }

    // The boxes are generic over the font type; an uninhabited one keeps these
    // tests font-free.
    pub enum NoFont {}

    #[test]
    fn hbox_accumulates_width_and_extents() {
        let node: crate::layout::LayoutNode<'static, NoFont> = hbox!(
            rule!(width: px(2.0), height: px(5.0)),
            kern!(horz: px(1.0)),
            rule!(width: px(3.0), height: px(2.0), depth: px(-1.0))
        );
        assert_eq!(node.width, px(6.0));
        assert_eq!(node.height, px(5.0));
        assert_eq!(node.depth, px(-1.0));
    }

    #[test]
    fn vbox_offset_moves_baseline() {
        let node: crate::layout::LayoutNode<'static, NoFont> = vbox!(
            offset: px(2.0);
            rule!(width: px(4.0), height: px(3.0)),
            rule!(width: px(4.0), height: px(3.0))
        );
        assert_eq!(node.height, px(4.0));
        assert_eq!(node.depth, px(-2.0));
        assert_eq!(node.width, px(4.0));
    }
}
