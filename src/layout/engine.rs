//! The recursive layout walk: atoms in, positioned boxes out.
//!
//! [`layout`] walks a finalized list left to right, inserting the table-driven
//! inter-atom gaps, and dispatches each atom to the branch for its kind. Every
//! structural construct (fraction, radical, accent, table, ...) is laid out as
//! one atomic sub-tree, so the line-breaking pipeline can reuse the same
//! branches through [`layout`] on sub-lists.

use super::builders;
use super::convert::AsLayoutNode;
use super::scripts::{self, Scripts};
use super::spacing::atom_space;
use super::{Alignment, Layout, LayoutNode, LayoutSettings, LayoutVariant, LineStyle};

use crate::atom::{
    Accent, Atom, AtomKind, Body, ColorSpan, ColumnAlignment, FontFamily, Fraction, Inner,
    LargeOperator, Radical, Table,
};
use crate::dimensions::units::{Em, Px};
use crate::dimensions::Unit;
use crate::error::LayoutResult;
use crate::font::{FontMetrics, VariantGlyph};
use crate::layout::convert::Scaled;
use crate::layout::ColorChange;

const OVERBRACE: char = '\u{23DE}';
const UNDERBRACE: char = '\u{23DF}';
const RADICAL_SIGN: char = '\u{221A}';
const PLACEHOLDER_GLYPH: char = '\u{25A1}';

/// Margin a growable accent keeps past its content on each end combined.
const ACCENT_COVER_PAD: Unit<Em> = Unit::new(0.1);

/// Lays out a finalized list at the given settings.
pub fn layout<'a, 'f: 'a, F: FontMetrics>(
    atoms: &[Atom],
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<Layout<'f, F>> {
    let mut out = Layout::new();
    let mut config = config;
    let mut prev: Option<AtomKind> = None;
    let mut italic_correction: Option<Unit<Px>> = None;

    for atom in atoms {
        // Style and space atoms affect the walk without being spaced themselves.
        match atom.body {
            Body::Style(style) => {
                config.style = style;
                continue;
            }
            Body::Space(space) => {
                out.add_node(kern!(horz: space.scaled(config)));
                continue;
            }
            _ => {}
        }

        let mut separated = false;
        if let Some(left) = prev {
            let gap = atom_space(left, atom.kind, config.style)?;
            if !gap.is_zero() {
                out.add_node(kern!(horz: gap.scaled(config)));
                separated = true;
            }
        }

        // A leaning glyph run followed flush by an upright one gets the stored
        // italic correction so the strokes do not collide.
        if let Some(correction) = italic_correction.take() {
            if !separated && atom.font_style.family != FontFamily::Italic {
                out.add_node(kern!(horz: correction));
            }
        }

        let first_new = out.contents.len();
        dispatch(&mut out, atom, config)?;

        if let Some(node) = out.contents.get_mut(first_new) {
            if node.source.is_none() {
                node.source = Some(atom.index_range.clone());
            }
        }

        italic_correction = if atom.font_style.family == FontFamily::Italic && !atom.has_scripts()
        {
            out.contents.last().and_then(|n| n.is_symbol()).map(|s| s.italics)
        } else {
            None
        };

        prev = Some(atom.kind);
    }

    Ok(out.finalize())
}

fn dispatch<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Layout<'f, F>,
    atom: &Atom,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    match atom.body {
        Body::None => plain(out, atom, config),
        Body::LargeOperator(ref op) => large_operator(out, atom, op, config),
        Body::Fraction(ref frac) => fraction(out, atom, frac, config),
        Body::Radical(ref rad) => radical(out, atom, rad, config),
        Body::Inner(ref inner) => delimited(out, atom, inner, config),
        Body::Enclosed(ref list) => enclosed(out, atom, list, config),
        Body::Accent(ref acc) => accent(out, atom, acc, config),
        Body::Color(ref span) => color(out, span, config),
        Body::Table(ref table) => grid(out, table, config),
        // Handled by the walk before dispatch.
        Body::Space(_) | Body::Style(_) => unreachable!("space/style atoms are walk-level"),
    }
}

/// The glyph run for an atom's nucleus.
fn text_run<'a, 'f: 'a, F: FontMetrics>(
    atom: &Atom,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<Layout<'f, F>> {
    let mut run = Layout::new();
    if atom.kind == AtomKind::Placeholder && atom.nucleus.is_empty() {
        run.add_node(config.ctx.glyph(PLACEHOLDER_GLYPH)?.as_layout(config)?);
        return Ok(run);
    }
    for character in atom.nucleus.chars() {
        run.add_node(config.ctx.glyph(character)?.as_layout(config)?);
    }
    Ok(run)
}

/// Lays out both script lists of an atom at their script style levels.
pub(crate) fn lay_scripts<'a, 'f: 'a, F: FontMetrics>(
    atom: &Atom,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<Scripts<'f, F>> {
    Ok(Scripts {
        superscript: match atom.superscript() {
            Some(list) => Some(layout(list, config.descend()?.superscript_variant())?),
            None => None,
        },
        subscript: match atom.subscript() {
            Some(list) => Some(layout(list, config.descend()?.subscript_variant())?),
            None => None,
        },
    })
}

fn plain<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Layout<'f, F>,
    atom: &Atom,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    let base = text_run(atom, config)?;
    let height = base.height;
    let scripts = lay_scripts(atom, config)?;
    scripts::add_scripts(out, base, scripts, height, false, config)
}

fn large_operator<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Layout<'f, F>,
    atom: &Atom,
    op: &LargeOperator,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    let mut base = Layout::new();
    let mut single = atom.nucleus.chars();
    let codepoint = match (single.next(), single.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    };

    match codepoint {
        // Single-character operators grow outside script styles and sit
        // centered on the math axis.
        Some(c) if !config.style.is_script() => {
            let min_height =
                config.ctx.constants.display_operator_min_height * config.ctx.units_per_em;
            let axis_offset = config.ctx.constants.axis_height.scaled(config);
            let largeop = config
                .ctx
                .vert_variant(c, min_height)?
                .as_layout(config)?;
            let shift = (largeop.height + largeop.depth).scale(0.5) - axis_offset;
            base.add_node(vbox!(offset: shift; largeop));
        }
        _ => {
            base = text_run(atom, config)?;
        }
    }

    let limits_mode = op.limits && !config.style.is_script();
    if limits_mode && atom.has_scripts() {
        let scripts = lay_scripts(atom, config)?;
        return scripts::operator_limits(out, base, scripts.superscript, scripts.subscript, config);
    }

    let height = base.height;
    let scripts = lay_scripts(atom, config)?;
    scripts::add_scripts(out, base, scripts, height, true, config)
}

fn fraction<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Layout<'f, F>,
    atom: &Atom,
    frac: &Fraction,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    // Continued fractions keep display proportions all the way down.
    let mut config = config;
    if frac.continued {
        config.style = LineStyle::Display;
    }

    let bar = if frac.has_rule {
        config.ctx.constants.fraction_rule_thickness.scaled(config)
    } else {
        Unit::ZERO
    };

    let child = config.descend()?;
    let mut n = layout(&frac.numerator, child.numerator())?;
    let mut d = layout(&frac.denominator, child.denominator())?;

    if n.width > d.width {
        d.alignment = Alignment::Centered(d.width);
        d.width = n.width;
    } else {
        n.alignment = Alignment::Centered(n.width);
        n.width = d.width;
    }

    let numer = n.as_node();
    let denom = d.as_node();

    let axis = config.ctx.constants.axis_height.scaled(config);
    let display = config.style == LineStyle::Display;

    let (shift_up, shift_down, mut gap_num, mut gap_denom) = if display {
        (
            config
                .ctx
                .constants
                .fraction_numerator_display_style_shift_up
                .scaled(config),
            config
                .ctx
                .constants
                .fraction_denominator_display_style_shift_down
                .scaled(config),
            config
                .ctx
                .constants
                .fraction_num_display_style_gap_min
                .scaled(config),
            config
                .ctx
                .constants
                .fraction_denom_display_style_gap_min
                .scaled(config),
        )
    } else {
        (
            config.ctx.constants.fraction_numerator_shift_up.scaled(config),
            config
                .ctx
                .constants
                .fraction_denominator_shift_down
                .scaled(config),
            config.ctx.constants.fraction_numerator_gap_min.scaled(config),
            config
                .ctx
                .constants
                .fraction_denominator_gap_min
                .scaled(config),
        )
    };

    // Without a rule the clearance comes from the stack constants, widened for
    // visual separation.
    if !frac.has_rule {
        let stack_gap = if display {
            config.ctx.constants.stack_display_style_gap_min.scaled(config)
        } else {
            config.ctx.constants.stack_gap_min.scaled(config)
        };
        gap_num = stack_gap.scale(1.5).scale(0.5);
        gap_denom = gap_num;
    }

    let kern_num = Unit::max(shift_up - axis - bar.scale(0.5), gap_num - numer.depth);
    let kern_den = Unit::max(shift_down + axis - denom.height - bar.scale(0.5), gap_denom);
    let offset = denom.height + kern_den + bar.scale(0.5) - axis;

    let width = numer.width;
    let inner = vbox!(offset: offset;
        numer,
        kern!(vert: kern_num),
        rule!(width: width, height: bar),
        kern!(vert: kern_den),
        denom
    );

    let null_delimiter_space = config.ctx.constants.null_delimiter_space * config.font_size;
    let axis_height = config.ctx.constants.axis_height * config.font_size;

    let wrap = |delimiter: Option<char>| -> LayoutResult<LayoutNode<'f, F>> {
        match delimiter {
            None => Ok(kern!(horz: null_delimiter_space)),
            Some(symbol) => {
                let clearance =
                    Unit::max(inner.height - axis_height, axis_height - inner.depth).scale(2.0);
                let clearance = Unit::max(
                    clearance,
                    config.ctx.constants.delimited_sub_formula_min_height * config.font_size,
                );

                Ok(config
                    .ctx
                    .vert_variant(symbol, config.to_font(clearance))?
                    .as_layout(config)?
                    .centered(axis_height.scaled(config)))
            }
        }
    };

    let left = wrap(frac.left_delimiter)?;
    let right = wrap(frac.right_delimiter)?;

    // The fraction takes scripts as one unit, like a delimited group.
    let mut base = Layout::new();
    base.add_node(left);
    base.add_node(inner);
    base.add_node(right);
    let height = base.height;
    let scripts = lay_scripts(atom, config)?;
    scripts::add_scripts(out, base, scripts, height, false, config)
}

fn radical<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Layout<'f, F>,
    atom: &Atom,
    rad: &Radical,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    // Rule 11, p. 443 of the TeXBook.
    let contents = layout(&rad.radicand, config.descend()?.cramped())?.as_node();

    let gap = if config.style == LineStyle::Display {
        config
            .ctx
            .constants
            .radical_display_style_vertical_gap
            .scaled(config)
    } else {
        config.ctx.constants.radical_vertical_gap.scaled(config)
    };

    let rule_thickness = config.ctx.constants.radical_rule_thickness.scaled(config);
    let rule_ascender = config.ctx.constants.radical_extra_ascender.scaled(config);

    let inner_height = (contents.height - contents.depth) + gap + rule_thickness;
    let sqrt = config
        .ctx
        .vert_variant(RADICAL_SIGN, config.to_font(inner_height))?
        .as_layout(config)?;

    // When the chosen glyph overshoots, the spare clearance recenters the
    // radicand under the bar.
    let delta = (sqrt.height - sqrt.depth - inner_height).scale(0.5) + rule_thickness;
    let gap = Unit::max(delta, gap);

    let offset = rule_thickness + gap + contents.height;
    let offset = sqrt.height - offset;

    let top_padding = rule_ascender - rule_thickness;

    let mut base = Layout::new();

    if let Some(ref degree) = rad.degree {
        let kern_before = config.ctx.constants.radical_kern_before_degree.scaled(config);
        let kern_after = config.ctx.constants.radical_kern_after_degree.scaled(config);

        let mut degree_config = config.descend()?;
        degree_config.style = LineStyle::ScriptScript;
        let degree = layout(degree, degree_config)?.as_node();

        let radical_extent = sqrt.height - sqrt.depth;
        let raise = radical_extent
            .scale(config.ctx.constants.radical_degree_bottom_raise_percent)
            + (sqrt.depth - offset);

        base.add_node(kern!(horz: kern_before));
        base.add_node(vbox!(offset: -raise; degree));
        base.add_node(kern!(horz: kern_after));
    }

    base.add_node(vbox![offset: offset; sqrt]);
    base.add_node(vbox![
        kern!(vert: top_padding),
        rule!(width: contents.width, height: rule_thickness),
        kern!(vert: gap),
        contents
    ]);

    let height = base.height;
    let scripts = lay_scripts(atom, config)?;
    scripts::add_scripts(out, base, scripts, height, false, config)
}

fn delimited<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Layout<'f, F>,
    atom: &Atom,
    inner: &Inner,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    let body = layout(&inner.inner, config.descend()?)?.as_node();

    let min_height = config.ctx.constants.delimited_sub_formula_min_height * config.font_size;
    let null_delimiter_space = config.ctx.constants.null_delimiter_space * config.font_size;

    // Delimiters only grow once the content is meaningfully taller than a
    // plain glyph.
    let clearance = if Unit::max(body.height, -body.depth) > min_height.scale(0.5) {
        let axis = config.ctx.constants.axis_height * config.font_size;
        let inner_size = Unit::max(body.height - axis, axis - body.depth).scale(2.0);
        let clearance_px = Unit::max(
            inner_size.scale(config.ctx.constants.delimiter_factor),
            body.height - body.depth
                - config.ctx.constants.delimiter_short_fall * config.font_size,
        );
        Some(config.to_font(clearance_px))
    } else {
        None
    };

    let axis = config.ctx.constants.axis_height.scaled(config);
    let make = |symbol: Option<char>| -> LayoutResult<LayoutNode<'f, F>> {
        match symbol {
            None => Ok(kern!(horz: null_delimiter_space)),
            Some(symbol) => match clearance {
                Some(clearance) => Ok(config
                    .ctx
                    .vert_variant(symbol, clearance)?
                    .as_layout(config)?
                    .centered(axis)),
                None => config.ctx.glyph(symbol)?.as_layout(config),
            },
        }
    };

    let left = make(inner.left_delimiter)?;
    let right = make(inner.right_delimiter)?;

    let mut hbox = builders::HBox::new();
    hbox.add_node(left);
    hbox.add_node(body);
    hbox.add_node(right);
    let body = hbox.build();

    // The whole delimited group takes scripts as one unit.
    let mut base = Layout::new();
    base.add_node(body);
    let height = base.height;
    let scripts = lay_scripts(atom, config)?;
    scripts::add_scripts(out, base, scripts, height, false, config)
}

/// Underline, overline, overbrace and underbrace, selected by the atom's kind.
fn enclosed<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Layout<'f, F>,
    atom: &Atom,
    list: &[Atom],
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    match atom.kind {
        AtomKind::Overline => {
            let contents = layout(list, config.descend()?)?.as_node();
            let thickness = config.ctx.constants.overbar_rule_thickness.scaled(config);
            let gap = config.ctx.constants.overbar_vertical_gap.scaled(config);
            let ascender = config.ctx.constants.overbar_extra_ascender.scaled(config);
            let mut base = Layout::new();
            base.add_node(vbox![
                kern!(vert: ascender),
                rule!(width: contents.width, height: thickness),
                kern!(vert: gap),
                contents
            ]);
            let height = base.height;
            let scripts = lay_scripts(atom, config)?;
            scripts::add_scripts(out, base, scripts, height, false, config)
        }

        AtomKind::Underline => {
            let contents = layout(list, config.descend()?.cramped())?.as_node();
            let thickness = config.ctx.constants.underbar_rule_thickness.scaled(config);
            let gap = config.ctx.constants.underbar_vertical_gap.scaled(config);
            let descender = config.ctx.constants.underbar_extra_descender.scaled(config);

            // The gap is measured from the content's ink bottom; the content's
            // depth is not part of the stacked heights.
            let width = contents.width;
            let below = gap - contents.depth;
            let offset = below + thickness + descender;
            let mut base = Layout::new();
            base.add_node(vbox![
                offset: offset;
                contents,
                kern!(vert: below),
                rule!(width: width, height: thickness),
                kern!(vert: descender)
            ]);
            let height = base.height;
            let scripts = lay_scripts(atom, config)?;
            scripts::add_scripts(out, base, scripts, height, false, config)
        }

        AtomKind::Overbrace => {
            let contents = layout(list, config.descend()?)?;
            let width = contents.width;
            let brace = config
                .ctx
                .horz_variant(OVERBRACE, config.to_font(width))?
                .as_layout(config)?;
            let gap = config.ctx.constants.overbar_vertical_gap.scaled(config);
            let braced = vbox![brace, kern!(vert: gap), contents.as_node()];

            let mut base = Layout::new();
            base.add_node(braced);

            // The annotation rides above the brace like an upper limit.
            if atom.has_scripts() {
                let scripts = lay_scripts(atom, config)?;
                return scripts::operator_limits(
                    out,
                    base,
                    scripts.superscript,
                    scripts.subscript,
                    config,
                );
            }
            out.add_node(base.as_node());
            Ok(())
        }

        AtomKind::Underbrace => {
            let contents = layout(list, config.descend()?.cramped())?;
            let width = contents.width;
            let brace = config
                .ctx
                .horz_variant(UNDERBRACE, config.to_font(width))?
                .as_layout(config)?;
            let gap = config.ctx.constants.underbar_vertical_gap.scaled(config);

            let inner = contents.as_node();
            let below = gap - inner.depth;
            let offset = below + brace.height;
            let braced = vbox![
                offset: offset;
                inner,
                kern!(vert: below),
                brace
            ];

            let mut base = Layout::new();
            base.add_node(braced);

            if atom.has_scripts() {
                let scripts = lay_scripts(atom, config)?;
                return scripts::operator_limits(
                    out,
                    base,
                    scripts.superscript,
                    scripts.subscript,
                    config,
                );
            }
            out.add_node(base.as_node());
            Ok(())
        }

        _ => unreachable!("enclosed payload on a non-enclosing atom kind"),
    }
}

fn accent<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Layout<'f, F>,
    atom: &Atom,
    acc: &Accent,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    let accent_char = match atom.nucleus.chars().next() {
        Some(c) => c,
        // No accent character to draw; the content stands alone.
        None => {
            out.add_node(layout(&acc.inner, config.descend()?)?.as_node());
            return Ok(());
        }
    };

    // A single accented character hands its scripts to the accented result, so
    // the accent never pushes the superscript outward.
    let mut detached: Option<(Scripts<'f, F>, Unit<Px>)> = None;
    let inner_storage: [Atom; 1];
    let inner: &[Atom] = if acc.inner.len() == 1 && acc.inner[0].has_scripts() {
        let bare = acc.inner[0].without_scripts();
        let scripts = lay_scripts(&acc.inner[0], config)?;
        let bare_height = match bare.nucleus.chars().next() {
            Some(c) if bare.nucleus.chars().count() == 1 => {
                config.ctx.glyph(c)?.height().scaled(config)
            }
            _ => Unit::ZERO,
        };
        detached = Some((scripts, bare_height));
        inner_storage = [bare];
        &inner_storage
    } else {
        &acc.inner
    };

    let base = layout(inner, config.descend()?.cramped())?;

    // Regular accents keep their design-size glyph; stretchy and wide ones
    // grow to the content.
    let (accent_node, accent_variant) = if acc.stretchy || acc.wide {
        let covered = base.width + ACCENT_COVER_PAD.scaled(config);
        let variant = config.ctx.horz_variant(accent_char, config.to_font(covered))?;
        (variant.as_layout(config)?, Some(variant))
    } else {
        (config.ctx.glyph(accent_char)?.as_layout(config)?, None)
    };

    // Attachment points: the font's, when declared, otherwise optical centers.
    let base_offset = match base.is_symbol() {
        Some(sym) => {
            let glyph = config.ctx.glyph_from_gid(sym.gid)?;
            if !glyph.attachment.is_zero() {
                glyph.attachment.scaled(config)
            } else {
                (glyph.advance + glyph.italics).scale(0.5).scaled(config)
            }
        }
        None => base.width.scale(0.5),
    };

    let acc_offset = match accent_variant {
        Some(VariantGlyph::Replacement(gid)) => {
            let glyph = config.ctx.glyph_from_gid(gid)?;
            if !glyph.attachment.is_zero() {
                glyph.attachment.scaled(config)
            } else {
                // Combining accents may have ink entirely left of the origin.
                (glyph.bbox.2 + glyph.bbox.0).scale(0.5).scaled(config)
            }
        }
        Some(VariantGlyph::Constructable(..)) => accent_node.width.scale(0.5),
        None => match accent_node.is_symbol() {
            Some(sym) => {
                let glyph = config.ctx.glyph_from_gid(sym.gid)?;
                if !glyph.attachment.is_zero() {
                    glyph.attachment.scaled(config)
                } else {
                    (glyph.bbox.2 + glyph.bbox.0).scale(0.5).scaled(config)
                }
            }
            None => accent_node.width.scale(0.5),
        },
    };

    // Sit the accent no higher above the base than over an `x`.
    let delta = -Unit::min(
        base.height,
        config.ctx.constants.accent_base_height.scaled(config),
    );

    let base_height = base.height;
    let accented = vbox!(
        hbox!(kern!(horz: base_offset - acc_offset), accent_node),
        kern!(vert: delta),
        base.as_node()
    );

    let mut result = Layout::new();
    result.add_node(accented);

    match detached {
        Some((scripts, bare_height)) => {
            let hint = if bare_height.is_zero() {
                base_height
            } else {
                bare_height
            };
            scripts::add_scripts(out, result, scripts, hint, false, config)
        }
        None => {
            let height = result.height;
            let scripts = lay_scripts(atom, config)?;
            scripts::add_scripts(out, result, scripts, height, false, config)
        }
    }
}

fn color<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Layout<'f, F>,
    span: &ColorSpan,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    let inner = layout(&span.inner, config.descend()?)?;
    out.add_node(LayoutNode {
        width: inner.width,
        height: inner.height,
        depth: inner.depth,
        source: None,
        node: LayoutVariant::Color(ColorChange {
            color: span.color,
            backdrop: !span.foreground,
            inner: inner.contents,
        }),
    });
    Ok(())
}

fn grid<'a, 'f: 'a, F: FontMetrics>(
    out: &mut Layout<'f, F>,
    table: &Table,
    config: LayoutSettings<'a, 'f, F>,
) -> LayoutResult<()> {
    // "A rule of thumb is that the baselineskip should be 1.2 times the font
    // size", from the LaTeX sources; struts are 0.7/0.3 of it.
    let base_line_skip = Unit::<Em>::new(1.2);
    const STRUT_HEIGHT: f64 = 0.7;
    const STRUT_DEPTH: f64 = 0.3;

    let strut_height = base_line_skip.scale(STRUT_HEIGHT) * config.font_size;
    let strut_depth = base_line_skip.scale(STRUT_DEPTH) * config.font_size;
    let half_col_sep = table.inter_column_spacing * config.font_size;
    let jot = table.inter_row_additional * config.font_size;

    let num_rows = table.cells.len();
    let num_columns = table.cells.iter().map(Vec::len).max().unwrap_or(0);
    if num_columns == 0 {
        return Ok(());
    }

    let child = config.descend()?;
    let mut columns: Vec<Vec<Layout<'f, F>>> = Vec::with_capacity(num_columns);
    for _ in 0..num_columns {
        columns.push(Vec::with_capacity(num_rows));
    }

    // Lay out every cell, tracking per-column widths and per-row extents.
    let mut col_widths = vec![Unit::ZERO; num_columns];
    let mut row_heights = Vec::with_capacity(num_rows);
    let mut prev_depth = Unit::ZERO;
    let mut row_max = strut_height;
    for row in &table.cells {
        let mut max_depth = Unit::ZERO;
        for col_idx in 0..num_columns {
            let cell = match row.get(col_idx) {
                Some(cell) => {
                    let cell = layout(cell, child)?;
                    row_max = Unit::max(cell.height, row_max);
                    max_depth = Unit::max(max_depth, -cell.depth);
                    col_widths[col_idx] = Unit::max(col_widths[col_idx], cell.width);
                    cell
                }
                None => Layout::new(),
            };
            columns[col_idx].push(cell);
        }

        // Rows land on the baseline grid, opening up when content would
        // otherwise collide with the row above.
        row_heights.push(row_max + prev_depth);
        row_max = strut_height;
        prev_depth = Unit::max(Unit::ZERO, max_depth - strut_depth);
    }

    let mut hbox = builders::HBox::new();

    if table.left_delimiter.is_none() {
        hbox.add_node(kern![horz: half_col_sep]);
    }

    for (col_idx, col) in columns.into_iter().enumerate() {
        let alignment = table
            .alignments
            .get(col_idx.min(table.alignments.len().saturating_sub(1)))
            .copied()
            .unwrap_or(ColumnAlignment::Center);

        let mut vbox = builders::VBox::new();
        for (row_idx, mut cell) in col.into_iter().enumerate() {
            if cell.width < col_widths[col_idx] {
                cell.alignment = match alignment {
                    ColumnAlignment::Center => Alignment::Centered(cell.width),
                    ColumnAlignment::Left => Alignment::Left,
                    ColumnAlignment::Right => Alignment::Right(cell.width),
                };
                cell.width = col_widths[col_idx];
            }

            if cell.height < row_heights[row_idx] {
                let diff = row_heights[row_idx] - cell.height;
                vbox.add_node(kern![vert: diff]);
            }

            let node = cell.as_node();
            let mut vert_dist = strut_depth + jot;
            if row_idx + 1 == num_rows {
                vert_dist = Unit::max(vert_dist, -node.depth);
            }
            vbox.add_node(node);
            vbox.add_node(kern![vert: vert_dist]);
        }

        hbox.add_node(vbox.build());
        if !(table.right_delimiter.is_some() && col_idx + 1 == num_columns) {
            hbox.add_node(kern![horz: half_col_sep]);
        }
        if col_idx + 1 < num_columns {
            hbox.add_node(kern![horz: half_col_sep]);
        }
    }

    // Recenter the whole grid on the math axis. The hbox has no depth, so its
    // height is the total extent.
    let height = hbox.height;
    let mut vbox = builders::VBox::new();
    let offset = height.scale(0.5) - config.ctx.constants.axis_height.scaled(config);
    vbox.set_offset(offset);
    vbox.add_node(hbox.build());
    let body = vbox.build();

    if table.left_delimiter.is_none() && table.right_delimiter.is_none() {
        out.add_node(body);
        return Ok(());
    }

    let mut hbox = builders::HBox::new();
    let axis = config.ctx.constants.axis_height.scaled(config);
    let clearance = Unit::max(
        height.scale(config.ctx.constants.delimiter_factor),
        height - config.ctx.constants.delimiter_short_fall * config.font_size,
    );

    if let Some(left) = table.left_delimiter {
        hbox.add_node(
            config
                .ctx
                .vert_variant(left, config.to_font(clearance))?
                .as_layout(config)?
                .centered(axis),
        );
    }
    hbox.add_node(body);
    if let Some(right) = table.right_delimiter {
        hbox.add_node(
            config
                .ctx
                .vert_variant(right, config.to_font(clearance))?
                .as_layout(config)?
                .centered(axis),
        );
    }
    out.add_node(hbox.build());

    Ok(())
}
