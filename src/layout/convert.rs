//! Converting font-space quantities into positioned, surface-space nodes.

use super::builders;
use super::{LayoutGlyph, LayoutNode, LayoutSettings, LayoutVariant, LineStyle};
use crate::dimensions::units::{Em, FUnit, Px};
use crate::dimensions::Unit;
use crate::error::LayoutResult;
use crate::font::{Direction, FontMetrics, Glyph, VariantGlyph};

/// Things that turn into a layout node under the current settings.
pub trait AsLayoutNode<'f, F> {
    fn as_layout<'a>(&self, config: LayoutSettings<'a, 'f, F>) -> LayoutResult<LayoutNode<'f, F>>;
}

impl<'f, F> AsLayoutNode<'f, F> for Glyph<'f, F> {
    fn as_layout<'a>(&self, config: LayoutSettings<'a, 'f, F>) -> LayoutResult<LayoutNode<'f, F>> {
        Ok(LayoutNode {
            height: self.height().scaled(config),
            width: self.advance.scaled(config),
            depth: self.depth().scaled(config),
            source: None,
            node: LayoutVariant::Glyph(LayoutGlyph {
                font: self.font,
                gid: self.gid,
                size: Unit::<Em>::new(1.0).scaled(config),
                attachment: self.attachment.scaled(config),
                italics: self.italics.scaled(config),
                offset: Unit::ZERO,
            }),
        })
    }
}

impl<'f, F: FontMetrics> AsLayoutNode<'f, F> for VariantGlyph {
    fn as_layout<'a>(&self, config: LayoutSettings<'a, 'f, F>) -> LayoutResult<LayoutNode<'f, F>> {
        match *self {
            VariantGlyph::Replacement(gid) => {
                let glyph = config.ctx.glyph_from_gid(gid)?;
                glyph.as_layout(config)
            }

            VariantGlyph::Constructable(dir, ref parts) => match dir {
                // Instructions run bottom-up; a vertical box runs top-down.
                Direction::Vertical => {
                    let mut contents = builders::VBox::new();
                    for instr in parts.iter().rev() {
                        let glyph = config.ctx.glyph_from_gid(instr.gid)?;
                        contents.add_node(glyph.as_layout(config)?);
                        if instr.overlap != 0 {
                            let overlap = Unit::<FUnit>::new(instr.overlap.into());
                            let kern = -(overlap + glyph.depth()).scaled(config);
                            contents.add_node(kern!(vert: kern));
                        }
                    }
                    Ok(contents.build())
                }

                Direction::Horizontal => {
                    let mut contents = builders::HBox::new();
                    for instr in parts {
                        let glyph = config.ctx.glyph_from_gid(instr.gid)?;
                        if instr.overlap != 0 {
                            let kern = -Unit::<FUnit>::new(instr.overlap.into()).scaled(config);
                            contents.add_node(kern!(horz: kern));
                        }
                        contents.add_node(glyph.as_layout(config)?);
                    }
                    Ok(contents.build())
                }
            },
        }
    }
}

impl<'a, 'f, F> LayoutSettings<'a, 'f, F> {
    /// Glyph shrink factor of the current script level.
    pub fn scale_factor(&self) -> f64 {
        match self.style {
            LineStyle::Display | LineStyle::Text => 1.0,
            LineStyle::Script => self.ctx.constants.script_percent_scale_down,
            LineStyle::ScriptScript => self.ctx.constants.script_script_percent_scale_down,
        }
    }

    fn scale_font_unit(&self, length: Unit<FUnit>) -> Unit<Px> {
        length * self.ctx.units_per_em.recip() * self.font_size
    }

    /// Surface units back to the font's design grid, for variant requests.
    pub fn to_font(&self, length: Unit<Px>) -> Unit<FUnit> {
        length * self.font_size.recip() * self.ctx.units_per_em
    }
}

/// A quantity scalable to surface units under the current font size and style.
pub trait Scaled {
    fn scaled<F>(self, config: LayoutSettings<F>) -> Unit<Px>;
}

impl Scaled for Unit<FUnit> {
    fn scaled<F>(self, config: LayoutSettings<F>) -> Unit<Px> {
        config.scale_font_unit(self).scale(config.scale_factor())
    }
}

impl Scaled for Unit<Em> {
    fn scaled<F>(self, config: LayoutSettings<F>) -> Unit<Px> {
        (self * config.font_size).scale(config.scale_factor())
    }
}

impl Scaled for Unit<Px> {
    fn scaled<F>(self, config: LayoutSettings<F>) -> Unit<Px> {
        self.scale(config.scale_factor())
    }
}
