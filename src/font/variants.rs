//! Glyph variant selection and extensible glyph construction.
//!
//! Delimiters, radical signs, wide accents and braces must grow to cover their
//! content. The font offers two mechanisms: an ordered list of pre-built size
//! variants, and an assembly recipe (end pieces plus a repeatable extender) for
//! sizes beyond the largest variant. Selection scans the variant list for the first
//! one meeting the requested size; construction searches for the smallest extender
//! repeat count whose achievable size range covers the request, then spreads the
//! remaining slack evenly over the connector overlaps.

use crate::dimensions::units::FUnit;
use crate::dimensions::Unit;
use crate::font::{
    AssemblyPart, Direction, FontMetrics, GlyphId, GlyphInstruction, VariantGlyph,
};

/// Returns a glyph for `gid` measuring at least `size` along `direction`, either as
/// a pre-built replacement or as assembly instructions. When neither a variant nor
/// an assembly can reach `size`, the largest available form is returned.
pub fn grown_glyph<F: FontMetrics>(
    font: &F,
    gid: GlyphId,
    direction: Direction,
    size: Unit<FUnit>,
) -> VariantGlyph {
    let records = font.glyph_variants(gid, direction);
    let requested = size.to_unitless();

    for record in &records {
        if f64::from(record.advance) >= requested {
            return VariantGlyph::Replacement(record.gid);
        }
    }

    // No pre-built variant is big enough; the largest one is the fallback if the
    // font declares no assembly either.
    let largest = records.last().map(|r| r.gid).unwrap_or(gid);

    let assembly = match font.glyph_assembly(gid, direction) {
        Some(assembly) if !assembly.parts.is_empty() => assembly,
        _ => return VariantGlyph::Replacement(largest),
    };

    let instructions = assemble(
        font.min_connector_overlap(),
        &assembly.parts,
        requested.max(0.0).ceil(),
    );
    VariantGlyph::Constructable(direction, instructions)
}

/// Largest permitted overlap between two adjacent parts: bounded by both connector
/// lengths and by half the advance of the incoming part, never below the font's
/// minimum.
fn max_overlap(min_connector_overlap: u32, left: &AssemblyPart, right: &AssemblyPart) -> u32 {
    let overlap = left.end_connector.min(right.start_connector);
    let overlap = overlap.min(right.full_advance / 2);
    overlap.max(min_connector_overlap)
}

/// The flattened part sequence for a given extender repeat count.
fn piece_sequence(parts: &[AssemblyPart], repeats: u32) -> Vec<AssemblyPart> {
    let mut pieces = Vec::new();
    for part in parts {
        let n = if part.extender { repeats } else { 1 };
        for _ in 0..n {
            pieces.push(*part);
        }
    }
    pieces
}

/// Achievable size range `[tightest, loosest]` of a piece sequence: the loosest
/// form uses the minimum overlap at every joint, the tightest the maximum.
fn size_range(min_connector_overlap: u32, pieces: &[AssemblyPart]) -> (f64, f64) {
    let total: f64 = pieces.iter().map(|p| f64::from(p.full_advance)).sum();
    let mut min_total_overlap = 0.0;
    let mut max_total_overlap = 0.0;
    for pair in pieces.windows(2) {
        min_total_overlap += f64::from(min_connector_overlap);
        max_total_overlap += f64::from(max_overlap(min_connector_overlap, &pair[0], &pair[1]));
    }
    (total - max_total_overlap, total - min_total_overlap)
}

fn assemble(
    min_connector_overlap: u32,
    parts: &[AssemblyPart],
    size: f64,
) -> Vec<GlyphInstruction> {
    const MAX_REPEATS: u32 = 1024;

    let has_extender = parts.iter().any(|p| p.extender);

    // Smallest repeat count whose loosest form reaches the requested size. Without
    // extenders there is nothing to iterate on; the single sequence must do.
    let mut repeats = 0;
    let mut pieces = piece_sequence(parts, repeats);
    let (_, mut loosest) = size_range(min_connector_overlap, &pieces);
    while loosest < size && has_extender && repeats < MAX_REPEATS {
        repeats += 1;
        pieces = piece_sequence(parts, repeats);
        loosest = size_range(min_connector_overlap, &pieces).1;
    }

    let (tightest, loosest) = size_range(min_connector_overlap, &pieces);

    // Interpolation factor from the loosest form (f = 0) towards the tightest
    // (f = 1) that lands on the requested size. Rounding overlaps down keeps the
    // constructed glyph at least as large as requested.
    let factor = if loosest > tightest {
        ((loosest - size) / (loosest - tightest)).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut instructions = Vec::with_capacity(pieces.len());
    let mut prev: Option<AssemblyPart> = None;
    for part in pieces {
        let overlap = match prev {
            None => 0,
            Some(ref prev) => {
                let max = max_overlap(min_connector_overlap, prev, &part);
                min_connector_overlap
                    + (factor * f64::from(max - min_connector_overlap)).floor() as u32
            }
        };
        instructions.push(GlyphInstruction {
            gid: part.gid,
            overlap: overlap.min(u32::from(u16::MAX)) as u16,
        });
        prev = Some(part);
    }
    instructions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(gid: u16, advance: u32, connector: u32, extender: bool) -> AssemblyPart {
        AssemblyPart {
            gid: GlyphId::from(gid),
            full_advance: advance,
            start_connector: connector,
            end_connector: connector,
            extender,
        }
    }

    fn brace_parts() -> Vec<AssemblyPart> {
        // Bottom hook, extender, middle pip, extender, top hook: the shape of a
        // typical vertical brace assembly.
        vec![
            part(10, 1400, 150, false),
            part(11, 2000, 150, true),
            part(12, 1000, 150, false),
            part(11, 2000, 150, true),
            part(13, 1400, 150, false),
        ]
    }

    fn assembled_size(instrs: &[GlyphInstruction], parts: &[AssemblyPart]) -> f64 {
        instrs
            .iter()
            .map(|i| {
                let advance = parts
                    .iter()
                    .find(|p| p.gid == i.gid)
                    .map(|p| f64::from(p.full_advance))
                    .unwrap();
                advance - f64::from(i.overlap)
            })
            .sum()
    }

    #[test]
    fn assembly_covers_requested_sizes() {
        let parts = brace_parts();
        // Sweep from just above the extender-free minimum to well beyond it.
        for step in 0..60 {
            let size = 3600.0 + 500.0 * f64::from(step);
            let instrs = assemble(100, &parts, size);
            let total = assembled_size(&instrs, &parts);
            assert!(total >= size, "requested {} built {}", size, total);
        }
    }

    #[test]
    fn slack_spreads_over_the_joints() {
        let parts = brace_parts();
        // 7300 sits inside the one-repeat range [7200, 7400]; the overlaps can
        // land on it up to the floor rounding, one font unit per joint.
        let instrs = assemble(100, &parts, 7300.0);
        let total = assembled_size(&instrs, &parts);
        assert!(total >= 7300.0, "built {}", total);
        assert!(total <= 7300.0 + instrs.len() as f64, "built {}", total);
    }

    #[test]
    fn overlaps_respect_connector_bounds() {
        let parts = brace_parts();
        let instrs = assemble(100, &parts, 9000.0);
        for instr in instrs.iter().skip(1) {
            assert!(u32::from(instr.overlap) >= 100);
            assert!(u32::from(instr.overlap) <= 150);
        }
    }

    #[test]
    fn no_extender_falls_back_to_largest_form() {
        let parts = vec![part(1, 1000, 100, false), part(2, 1000, 100, false)];
        let instrs = assemble(50, &parts, 10_000.0);
        assert_eq!(instrs.len(), 2);
        // Cannot reach the size; the loosest achievable form is produced.
        assert_eq!(u32::from(instrs[1].overlap), 50);
    }
}
