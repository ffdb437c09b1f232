//! The boundary to the font metrics provider.
//!
//! The engine never parses font files. Everything it needs from a font — glyph ids,
//! advances, bounding boxes, the OpenType MATH constants, glyph variant lists and
//! extensible assembly recipes — comes through the [`FontMetrics`] trait, implemented
//! by an external provider bound to a concrete font. [`FontContext`] wraps a provider
//! with its resolved constants and design-grid scale.
//!
//! Variant *selection* (choosing a big-enough pre-built glyph or assembling one from
//! parts) is this crate's job, see [`variants`].

pub mod variants;

use crate::dimensions::units::{Em, FUnit, Ratio};
use crate::dimensions::Unit;
use crate::error::FontError;

/// The id of a glyph in the bound font.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct GlyphId(u16);

impl From<u16> for GlyphId {
    fn from(x: u16) -> Self {
        Self(x)
    }
}

impl From<GlyphId> for u16 {
    fn from(gid: GlyphId) -> u16 {
        gid.0
    }
}

/// Axis along which a glyph grows: vertical for delimiters and radicals, horizontal
/// for wide accents and braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// One pre-built size variant of a glyph, as listed (in increasing size) by the
/// font's MATH variants table. `advance` is the variant's extent along its growth
/// axis, in font units.
#[derive(Debug, Clone, Copy)]
pub struct VariantRecord {
    pub gid: GlyphId,
    pub advance: u16,
}

/// One piece of an extensible glyph recipe.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyPart {
    pub gid: GlyphId,
    /// Full extent of the part along the growth axis, in font units.
    pub full_advance: u32,
    /// How much of the part's leading edge may overlap its predecessor.
    pub start_connector: u32,
    /// How much of the part's trailing edge may overlap its successor.
    pub end_connector: u32,
    /// Extender parts may repeat any number of times; end pieces appear once.
    pub extender: bool,
}

/// A font-declared recipe for building arbitrarily large glyphs from parts.
#[derive(Debug, Clone)]
pub struct GlyphAssembly {
    pub parts: Vec<AssemblyPart>,
}

/// Result of variant selection: either a pre-built replacement glyph or a list of
/// parts with resolved overlaps.
#[derive(Debug, Clone)]
pub enum VariantGlyph {
    Replacement(GlyphId),
    Constructable(Direction, Vec<GlyphInstruction>),
}

/// One placed part of a constructed glyph. `overlap` (font units) is how far this
/// part overlaps the previous one along the growth axis.
#[derive(Debug, Clone, Copy)]
pub struct GlyphInstruction {
    pub gid: GlyphId,
    pub overlap: u16,
}

/// What the engine demands of a font metrics provider.
///
/// All lengths are in font units; [`FontContext`] owns the conversion to em and the
/// layout code the conversion to surface units.
pub trait FontMetrics: Sized {
    /// Glyph id for a character, if the font covers it.
    fn glyph_index(&self, codepoint: char) -> Option<GlyphId>;

    /// Full metrics record for a glyph id.
    fn glyph_from_gid(&self, gid: GlyphId) -> Result<Glyph<'_, Self>, FontError>;

    /// The named MATH scalar constants, converted to em by the given factor.
    fn constants(&self, font_units_to_em: Unit<Ratio<Em, FUnit>>) -> Constants;

    /// Size of one font unit in em (the reciprocal of units-per-em).
    fn font_units_to_em(&self) -> Unit<Ratio<Em, FUnit>>;

    /// Pre-built size variants of a glyph along the given axis, smallest first.
    /// Empty when the font declares none.
    fn glyph_variants(&self, gid: GlyphId, direction: Direction) -> Vec<VariantRecord>;

    /// Extensible assembly recipe for a glyph along the given axis, if declared.
    fn glyph_assembly(&self, gid: GlyphId, direction: Direction) -> Option<GlyphAssembly>;

    /// Minimum connector overlap between adjacent assembly parts, in font units.
    fn min_connector_overlap(&self) -> u32;
}

/// A provider plus its resolved constants and design-grid scale; the form in which
/// layout code consumes a font.
pub struct FontContext<'f, F> {
    pub font: &'f F,
    pub constants: Constants,
    pub units_per_em: Unit<Ratio<FUnit, Em>>,
}

impl<'f, F> Clone for FontContext<'f, F> {
    fn clone(&self) -> Self {
        Self {
            font: self.font,
            constants: self.constants.clone(),
            units_per_em: self.units_per_em,
        }
    }
}

impl<'f, F: FontMetrics> FontContext<'f, F> {
    pub fn new(font: &'f F) -> Self {
        let font_units_to_em = font.font_units_to_em();
        FontContext {
            font,
            units_per_em: font_units_to_em.recip(),
            constants: font.constants(font_units_to_em),
        }
    }

    /// Metrics for the glyph of a character.
    pub fn glyph(&self, codepoint: char) -> Result<Glyph<'f, F>, FontError> {
        let gid = self
            .font
            .glyph_index(codepoint)
            .ok_or(FontError::MissingGlyphCodepoint(codepoint))?;
        self.glyph_from_gid(gid)
    }

    pub fn glyph_from_gid(&self, gid: GlyphId) -> Result<Glyph<'f, F>, FontError> {
        self.font.glyph_from_gid(gid)
    }

    /// A glyph for `codepoint` at least `height` tall, selected or constructed.
    pub fn vert_variant(
        &self,
        codepoint: char,
        height: Unit<FUnit>,
    ) -> Result<VariantGlyph, FontError> {
        let gid = self
            .font
            .glyph_index(codepoint)
            .ok_or(FontError::MissingGlyphCodepoint(codepoint))?;
        Ok(variants::grown_glyph(self.font, gid, Direction::Vertical, height))
    }

    /// A glyph for `codepoint` at least `width` wide, selected or constructed.
    pub fn horz_variant(
        &self,
        codepoint: char,
        width: Unit<FUnit>,
    ) -> Result<VariantGlyph, FontError> {
        let gid = self
            .font
            .glyph_index(codepoint)
            .ok_or(FontError::MissingGlyphCodepoint(codepoint))?;
        Ok(variants::grown_glyph(self.font, gid, Direction::Horizontal, width))
    }
}

/// Metrics of one glyph, in font units.
pub struct Glyph<'f, F> {
    pub font: &'f F,
    pub gid: GlyphId,
    /// x_min, y_min, x_max, y_max relative to the baseline origin.
    pub bbox: (Unit<FUnit>, Unit<FUnit>, Unit<FUnit>, Unit<FUnit>),
    pub advance: Unit<FUnit>,
    /// Italic correction: how much wider a leaning glyph must be treated to avoid
    /// colliding with an upright successor or a superscript.
    pub italics: Unit<FUnit>,
    /// Top accent attachment point; zero when the font declares none.
    pub attachment: Unit<FUnit>,
}

impl<'f, F> Glyph<'f, F> {
    /// Distance from the baseline to the top of the ink.
    pub fn height(&self) -> Unit<FUnit> {
        self.bbox.3
    }

    /// Distance from the baseline to the bottom of the ink (negative below).
    pub fn depth(&self) -> Unit<FUnit> {
        self.bbox.1
    }
}

impl<'f, F> Clone for Glyph<'f, F> {
    fn clone(&self) -> Self {
        Self {
            font: self.font,
            gid: self.gid,
            bbox: self.bbox,
            advance: self.advance,
            italics: self.italics,
            attachment: self.attachment,
        }
    }
}

/// The named OpenType MATH constants the layout algorithms read, in em.
#[derive(Clone)]
pub struct Constants {
    pub subscript_shift_down: Unit<Em>,
    pub subscript_top_max: Unit<Em>,
    pub subscript_baseline_drop_min: Unit<Em>,

    pub superscript_baseline_drop_max: Unit<Em>,
    pub superscript_bottom_min: Unit<Em>,
    pub superscript_shift_up_cramped: Unit<Em>,
    pub superscript_shift_up: Unit<Em>,
    pub superscript_bottom_max_with_subscript: Unit<Em>,
    pub sub_superscript_gap_min: Unit<Em>,
    pub space_after_script: Unit<Em>,

    pub upper_limit_baseline_rise_min: Unit<Em>,
    pub upper_limit_gap_min: Unit<Em>,
    pub lower_limit_gap_min: Unit<Em>,
    pub lower_limit_baseline_drop_min: Unit<Em>,

    pub fraction_rule_thickness: Unit<Em>,
    pub fraction_numerator_display_style_shift_up: Unit<Em>,
    pub fraction_denominator_display_style_shift_down: Unit<Em>,
    pub fraction_num_display_style_gap_min: Unit<Em>,
    pub fraction_denom_display_style_gap_min: Unit<Em>,
    pub fraction_numerator_shift_up: Unit<Em>,
    pub fraction_denominator_shift_down: Unit<Em>,
    pub fraction_numerator_gap_min: Unit<Em>,
    pub fraction_denominator_gap_min: Unit<Em>,

    pub axis_height: Unit<Em>,
    pub accent_base_height: Unit<Em>,

    pub delimited_sub_formula_min_height: Unit<Em>,
    pub display_operator_min_height: Unit<Em>,

    pub radical_display_style_vertical_gap: Unit<Em>,
    pub radical_vertical_gap: Unit<Em>,
    pub radical_rule_thickness: Unit<Em>,
    pub radical_extra_ascender: Unit<Em>,
    pub radical_kern_before_degree: Unit<Em>,
    pub radical_kern_after_degree: Unit<Em>,
    /// Fraction of the radical glyph's height by which the degree is raised.
    pub radical_degree_bottom_raise_percent: f64,

    pub overbar_vertical_gap: Unit<Em>,
    pub overbar_rule_thickness: Unit<Em>,
    pub overbar_extra_ascender: Unit<Em>,
    pub underbar_vertical_gap: Unit<Em>,
    pub underbar_rule_thickness: Unit<Em>,
    pub underbar_extra_descender: Unit<Em>,

    pub stack_display_style_gap_min: Unit<Em>,
    pub stack_gap_min: Unit<Em>,

    pub delimiter_factor: f64,
    pub delimiter_short_fall: Unit<Em>,
    pub null_delimiter_space: Unit<Em>,

    pub script_percent_scale_down: f64,
    pub script_script_percent_scale_down: f64,
}
