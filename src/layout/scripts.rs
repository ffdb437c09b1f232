//! Sub/superscript placement against a laid-out base.
//!
//! See: https://tug.org/TUGboat/tb27-1/tb86jackowski.pdf
//!      https://www.tug.org/tugboat/tb30-1/tb94vieth.pdf
//!
//! The caller lays out the base and the script lists (at their script style
//! levels) and hands them over; this module only decides shifts and assembles
//! the boxes. Operators with limits use [`operator_limits`] instead, which
//! stacks the scripts above and below the base.

use super::builders;
use super::{Alignment, Layout, LayoutSettings, Scaled};
use crate::dimensions::units::Px;
use crate::dimensions::Unit;
use crate::error::LayoutResult;

/// The script boxes of one atom, each already laid out at its script style.
pub struct Scripts<'f, F> {
    pub superscript: Option<Layout<'f, F>>,
    pub subscript: Option<Layout<'f, F>>,
}

impl<'f, F> Scripts<'f, F> {
    pub fn none() -> Self {
        Scripts {
            superscript: None,
            subscript: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.superscript.is_none() && self.subscript.is_none()
    }
}

/// Appends `base` with its scripts attached to the right.
///
/// `sup_base_height` is the height the superscript shift is computed against;
/// normally `base.height`, but accented single characters pass the bare
/// character's height so the accent does not push the superscript up.
/// `nolimits_base` marks a large operator whose subscript must tuck under the
/// italic overhang.
pub fn add_scripts<'a, 'f, F>(
    out: &mut Layout<'f, F>,
    base: Layout<'f, F>,
    scripts: Scripts<'f, F>,
    sup_base_height: Unit<Px>,
    nolimits_base: bool,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    if scripts.is_empty() {
        out.add_node(base.as_node());
        return Ok(());
    }

    let base_italics = base.is_symbol().map(|sym| sym.italics);
    let mut sup = scripts.superscript.unwrap_or_default();
    let mut sub = scripts.subscript.unwrap_or_default();
    let has_sup = !sup.contents.is_empty() || !sup.width.is_zero();
    let has_sub = !sub.contents.is_empty() || !sub.width.is_zero();

    let mut adjust_up = Unit::ZERO;
    let mut adjust_down = Unit::ZERO;
    let mut sup_kern = Unit::ZERO;
    let mut sub_kern = Unit::ZERO;

    if has_sup {
        adjust_up = config.sup_shift_up().scaled(config);

        // Leaning bases push their superscript right by the italic correction.
        if let Some(italics) = base_italics {
            sup_kern = italics;
        }

        let drop_max = config
            .ctx
            .constants
            .superscript_baseline_drop_max
            .scaled(config);
        adjust_up = max!(
            adjust_up,
            sup_base_height - drop_max,
            config.ctx.constants.superscript_bottom_min.scaled(config) - sup.depth,
        );
    }

    if has_sub {
        adjust_down = max!(
            config.ctx.constants.subscript_shift_down.scaled(config),
            sub.height - config.ctx.constants.subscript_top_max.scaled(config),
            config.ctx.constants.subscript_baseline_drop_min.scaled(config) - base.depth,
        );

        // A nolimits operator's subscript tucks under the slanted integral sign.
        if nolimits_base {
            if let Some(italics) = base_italics {
                sub_kern = -italics;
            }
        }
    }

    // With both scripts present their vertical gap has a floor; the subscript
    // gives way first, but never so far that the superscript bottom drops below
    // the font's stated maximum, which reclaims the rest from the superscript.
    if has_sup && has_sub {
        let sup_bottom = adjust_up + sup.depth;
        let sub_top = sub.height - adjust_down;
        let gap_min = config.ctx.constants.sub_superscript_gap_min.scaled(config);
        if sup_bottom - sub_top < gap_min {
            adjust_down += gap_min - (sup_bottom - sub_top);

            let bottom_max = config
                .ctx
                .constants
                .superscript_bottom_max_with_subscript
                .scaled(config);
            let deficit = bottom_max - (adjust_up + sup.depth);
            if deficit > Unit::ZERO {
                adjust_up += deficit;
                adjust_down -= deficit;
            }
        }
    }

    let mut contents = builders::VBox::new();
    if has_sup {
        if !sup_kern.is_zero() {
            sup.contents.insert(0, kern!(horz: sup_kern));
            sup.width += sup_kern;
        }

        let corrected_adjust = adjust_up - sub.height + adjust_down;
        contents.add_node(sup.as_node());
        contents.add_node(kern!(vert: corrected_adjust));
    }

    contents.set_offset(adjust_down);
    if has_sub {
        if !sub_kern.is_zero() {
            sub.contents.insert(0, kern!(horz: sub_kern));
            sub.width += sub_kern;
        }
        contents.add_node(sub.as_node());
    }

    out.add_node(base.as_node());
    out.add_node(contents.build());
    out.add_node(kern!(horz: config.ctx.constants.space_after_script.scaled(config)));

    Ok(())
}

/// Stacks limits above and below an operator, keeping the operator's baseline.
/// `delta` is the base glyph's italic correction; the limits are offset by half
/// of it in opposite directions so they optically center on the slanted glyph.
pub fn operator_limits<'a, 'f, F>(
    out: &mut Layout<'f, F>,
    base: Layout<'f, F>,
    sup: Option<Layout<'f, F>>,
    sub: Option<Layout<'f, F>>,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    let delta = match base.is_symbol() {
        Some(glyph) => glyph.italics,
        None => Unit::ZERO,
    };

    let sup = sup.unwrap_or_default();
    let sub = sub.unwrap_or_default();

    let sup_kern = Unit::max(
        config
            .ctx
            .constants
            .upper_limit_baseline_rise_min
            .scaled(config),
        config.ctx.constants.upper_limit_gap_min.scaled(config) - sup.depth,
    );
    let sub_kern = Unit::max(
        config.ctx.constants.lower_limit_gap_min.scaled(config),
        config
            .ctx
            .constants
            .lower_limit_baseline_drop_min
            .scaled(config)
            - sub.height,
    ) - base.depth;

    // Keep the operator's baseline: offset the stack by what the subscript adds
    // below it.
    let offset = sub.height + sub_kern;

    let width = max!(
        base.width,
        sub.width + delta.scale(0.5),
        sup.width + delta.scale(0.5),
    );

    out.add_node(vbox![
        offset: offset;
        hbox![align: Alignment::Centered(sup.width);
            width: width;
            kern![horz: delta.scale(0.5)],
            sup.as_node()
        ],

        kern!(vert: sup_kern),
        base.centered(width).as_node(),
        kern!(vert: sub_kern),

        hbox![align: Alignment::Centered(sub.width);
            width: width;
            kern![horz: -delta.scale(0.5)],
            sub.as_node()
        ]
    ]);

    Ok(())
}
