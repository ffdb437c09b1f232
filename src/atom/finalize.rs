//! List normalization ahead of layout.
//!
//! One walk with a `previous` pointer over a parsed list: adjacent scriptless
//! digits fuse into one number, binary operators with no left operand become
//! unary, and variable/number atoms end up as styled ordinary text. Pure: the
//! input list is never mutated.

use super::{Atom, AtomKind, AtomList, Body, FontFamily};

/// Returns the normalized form of `list`. Every nested list (scripts, fraction
/// parts, radicands, table cells, ...) is normalized too.
pub fn finalize(list: &[Atom]) -> AtomList {
    let mut out: AtomList = Vec::with_capacity(list.len());

    for atom in list {
        let mut atom = finalize_atom(atom);

        // Adjacent scriptless numbers fuse; scripts of the right-hand digit move
        // onto the fused atom ("1" "2" "^2" reads as 12 squared).
        let fusable = atom.kind == AtomKind::Number
            && out
                .last()
                .map_or(false, |p| p.kind == AtomKind::Number && !p.has_scripts());
        if fusable {
            let prev = out.last_mut().expect("fusable implies a previous atom");
            prev.nucleus.push_str(&atom.nucleus);
            prev.index_range.end = prev.index_range.end.max(atom.index_range.end);
            let (sup, sub) = atom.take_scripts();
            prev.replace_scripts(sup, sub);
            prev.fused.push(atom);
            continue;
        }

        match atom.kind {
            // No left operand means the operator is a sign, not an operation.
            AtomKind::BinaryOperator => {
                if unary_context(context_kind(&out)) {
                    atom.kind = AtomKind::UnaryOperator;
                }
            }
            // "x + , y": the comma retroactively strips the operator of its
            // right operand as well.
            AtomKind::Relation | AtomKind::Punctuation | AtomKind::Close => {
                demote_trailing_binary(&mut out);
            }
            _ => {}
        }
        out.push(atom);
    }

    demote_trailing_binary(&mut out);

    // Number and variable atoms leave this pass as styled ordinary text.
    for atom in &mut out {
        match atom.kind {
            AtomKind::Variable => {
                atom.kind = AtomKind::Ordinary;
                if atom.font_style.family == FontFamily::Roman {
                    atom.font_style.family = FontFamily::Italic;
                }
            }
            AtomKind::Number => atom.kind = AtomKind::Ordinary,
            _ => {}
        }
    }

    out
}

/// Kind of the atom that counts as "preceding" for operator classification.
/// Space and style switches are invisible to it.
fn context_kind(out: &[Atom]) -> Option<AtomKind> {
    out.iter()
        .rev()
        .map(|a| a.kind)
        .find(|k| !matches!(k, AtomKind::Space | AtomKind::Style))
}

fn unary_context(previous: Option<AtomKind>) -> bool {
    match previous {
        None => true,
        Some(
            AtomKind::BinaryOperator
            | AtomKind::Relation
            | AtomKind::Open
            | AtomKind::Punctuation
            | AtomKind::LargeOperator,
        ) => true,
        Some(_) => false,
    }
}

fn demote_trailing_binary(out: &mut [Atom]) {
    if let Some(last) = out
        .iter_mut()
        .rev()
        .find(|a| !matches!(a.kind, AtomKind::Space | AtomKind::Style))
    {
        if last.kind == AtomKind::BinaryOperator {
            last.kind = AtomKind::UnaryOperator;
        }
    }
}

/// A copy of one atom with all its nested lists finalized.
fn finalize_atom(atom: &Atom) -> Atom {
    let mut atom = atom.clone();

    let (sup, sub) = atom.take_scripts();
    atom.replace_scripts(
        sup.as_deref().map(finalize),
        sub.as_deref().map(finalize),
    );

    atom.body = match atom.body {
        Body::None => Body::None,
        Body::LargeOperator(op) => Body::LargeOperator(op),
        Body::Fraction(mut frac) => {
            frac.numerator = finalize(&frac.numerator);
            frac.denominator = finalize(&frac.denominator);
            Body::Fraction(frac)
        }
        Body::Radical(mut rad) => {
            rad.radicand = finalize(&rad.radicand);
            rad.degree = rad.degree.as_deref().map(finalize);
            Body::Radical(rad)
        }
        Body::Inner(mut inner) => {
            inner.inner = finalize(&inner.inner);
            Body::Inner(inner)
        }
        Body::Enclosed(list) => Body::Enclosed(finalize(&list)),
        Body::Accent(mut accent) => {
            accent.inner = finalize(&accent.inner);
            Body::Accent(accent)
        }
        Body::Space(space) => Body::Space(space),
        Body::Style(style) => Body::Style(style),
        Body::Color(mut span) => {
            span.inner = finalize(&span.inner);
            Body::Color(span)
        }
        Body::Table(mut table) => {
            for row in &mut table.cells {
                for cell in row.iter_mut() {
                    *cell = finalize(cell);
                }
            }
            Body::Table(table)
        }
    };

    atom
}
