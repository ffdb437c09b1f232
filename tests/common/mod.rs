//! A deterministic metrics provider driving the integration tests.
//!
//! Every regular glyph is 500 font units wide with ink from the baseline up to
//! 700, on a 1000-unit design grid. Growable glyphs get three pre-built sizes
//! and a vertical assembly recipe. The flat metrics keep expected positions
//! computable by hand.

#![allow(dead_code)]

use mathflow::dimensions::units::{Em, FUnit, Ratio};
use mathflow::dimensions::Unit;
use mathflow::error::FontError;
use mathflow::font::{
    AssemblyPart, Constants, Direction, FontMetrics, Glyph, GlyphAssembly, GlyphId, VariantRecord,
};

pub const UNITS_PER_EM: f64 = 1000.0;

#[derive(Debug)]
pub struct TestFont;

const VERT_VARIANT_BASE: u16 = 0xF000;
const HORZ_VARIANT_BASE: u16 = 0xF100;
const PART_BOTTOM: u16 = 0xF200;
const PART_EXTENDER: u16 = 0xF201;
const PART_TOP: u16 = 0xF202;
const VARIANT_COUNT: u16 = 3;

/// Extent along the growth axis of the k-th pre-built size.
fn variant_extent(step: u16) -> u16 {
    1000 + 600 * step
}

impl FontMetrics for TestFont {
    fn glyph_index(&self, codepoint: char) -> Option<GlyphId> {
        u16::try_from(u32::from(codepoint)).ok().map(GlyphId::from)
    }

    fn glyph_from_gid(&self, gid: GlyphId) -> Result<Glyph<'_, Self>, FontError> {
        let code: u16 = gid.into();
        let fu = Unit::<FUnit>::new;

        let (bbox, advance) = match code {
            c if (VERT_VARIANT_BASE..VERT_VARIANT_BASE + VARIANT_COUNT).contains(&c) => {
                let extent = f64::from(variant_extent(c - VERT_VARIANT_BASE));
                ((fu(0.0), fu(-200.0), fu(500.0), fu(extent - 200.0)), fu(500.0))
            }
            c if (HORZ_VARIANT_BASE..HORZ_VARIANT_BASE + VARIANT_COUNT).contains(&c) => {
                let extent = f64::from(variant_extent(c - HORZ_VARIANT_BASE));
                ((fu(0.0), fu(500.0), fu(extent), fu(700.0)), fu(extent))
            }
            PART_BOTTOM | PART_TOP => ((fu(0.0), fu(-200.0), fu(500.0), fu(700.0)), fu(500.0)),
            PART_EXTENDER => ((fu(0.0), fu(-200.0), fu(500.0), fu(400.0)), fu(500.0)),
            _ => ((fu(0.0), fu(0.0), fu(500.0), fu(700.0)), fu(500.0)),
        };

        Ok(Glyph {
            font: self,
            gid,
            bbox,
            advance,
            italics: Unit::ZERO,
            attachment: Unit::ZERO,
        })
    }

    fn constants(&self, f: Unit<Ratio<Em, FUnit>>) -> Constants {
        let em = |v: f64| Unit::<FUnit>::new(v) * f;
        Constants {
            subscript_shift_down: em(150.0),
            subscript_top_max: em(350.0),
            subscript_baseline_drop_min: em(200.0),

            superscript_baseline_drop_max: em(250.0),
            superscript_bottom_min: em(120.0),
            superscript_shift_up_cramped: em(350.0),
            superscript_shift_up: em(400.0),
            superscript_bottom_max_with_subscript: em(380.0),
            sub_superscript_gap_min: em(150.0),
            space_after_script: em(40.0),

            upper_limit_baseline_rise_min: em(300.0),
            upper_limit_gap_min: em(100.0),
            lower_limit_gap_min: em(100.0),
            lower_limit_baseline_drop_min: em(600.0),

            fraction_rule_thickness: em(40.0),
            fraction_numerator_display_style_shift_up: em(700.0),
            fraction_denominator_display_style_shift_down: em(700.0),
            fraction_num_display_style_gap_min: em(150.0),
            fraction_denom_display_style_gap_min: em(150.0),
            fraction_numerator_shift_up: em(450.0),
            fraction_denominator_shift_down: em(450.0),
            fraction_numerator_gap_min: em(40.0),
            fraction_denominator_gap_min: em(40.0),

            axis_height: em(250.0),
            accent_base_height: em(450.0),

            delimited_sub_formula_min_height: em(1300.0),
            display_operator_min_height: em(1300.0),

            radical_display_style_vertical_gap: em(150.0),
            radical_vertical_gap: em(60.0),
            radical_rule_thickness: em(40.0),
            radical_extra_ascender: em(60.0),
            radical_kern_before_degree: em(280.0),
            radical_kern_after_degree: em(-560.0),
            radical_degree_bottom_raise_percent: 0.6,

            overbar_vertical_gap: em(120.0),
            overbar_rule_thickness: em(40.0),
            overbar_extra_ascender: em(40.0),
            underbar_vertical_gap: em(120.0),
            underbar_rule_thickness: em(40.0),
            underbar_extra_descender: em(40.0),

            stack_display_style_gap_min: em(300.0),
            stack_gap_min: em(150.0),

            delimiter_factor: 0.901,
            delimiter_short_fall: em(100.0),
            null_delimiter_space: em(120.0),

            script_percent_scale_down: 0.7,
            script_script_percent_scale_down: 0.5,
        }
    }

    fn font_units_to_em(&self) -> Unit<Ratio<Em, FUnit>> {
        Unit::new(1.0 / UNITS_PER_EM)
    }

    fn glyph_variants(&self, _gid: GlyphId, direction: Direction) -> Vec<VariantRecord> {
        let base = match direction {
            Direction::Vertical => VERT_VARIANT_BASE,
            Direction::Horizontal => HORZ_VARIANT_BASE,
        };
        (0..VARIANT_COUNT)
            .map(|step| VariantRecord {
                gid: GlyphId::from(base + step),
                advance: variant_extent(step),
            })
            .collect()
    }

    fn glyph_assembly(&self, _gid: GlyphId, direction: Direction) -> Option<GlyphAssembly> {
        match direction {
            Direction::Horizontal => None,
            Direction::Vertical => Some(GlyphAssembly {
                parts: vec![
                    AssemblyPart {
                        gid: GlyphId::from(PART_BOTTOM),
                        full_advance: 900,
                        start_connector: 0,
                        end_connector: 300,
                        extender: false,
                    },
                    AssemblyPart {
                        gid: GlyphId::from(PART_EXTENDER),
                        full_advance: 600,
                        start_connector: 300,
                        end_connector: 300,
                        extender: true,
                    },
                    AssemblyPart {
                        gid: GlyphId::from(PART_TOP),
                        full_advance: 900,
                        start_connector: 300,
                        end_connector: 0,
                        extender: false,
                    },
                ],
            }),
        }
    }

    fn min_connector_overlap(&self) -> u32 {
        50
    }
}

/// Absolute-tolerance comparison for computed lengths.
pub fn assert_close<U>(actual: Unit<U>, expected: f64) {
    let delta = (actual.to_unitless() - expected).abs();
    assert!(
        delta < 1e-6,
        "expected {expected}, got {actual} (off by {delta})"
    );
}
