//! Inter-atom spacing, TeX's table of thin/medium/thick gaps.
//!
//! The table is indexed by the spacing classes of the two adjacent atoms. Cells
//! marked conditional contribute nothing in script styles. Cells marked invalid
//! correspond to adjacencies normalization makes impossible (a binary operator
//! next to a relation, say); hitting one means the input list was not finalized.

use crate::atom::AtomKind;
use crate::dimensions::units::Em;
use crate::dimensions::{Unit, MU};
use crate::error::{Invariant, LayoutError, LayoutResult};
use crate::layout::LineStyle;

/// The spacing classes the table is indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpacingClass {
    Ordinary,
    Operator,
    Binary,
    Relation,
    Open,
    Close,
    Punctuation,
    /// Fractions, delimited inners and tables.
    Inner,
    /// Appears on the left only; as a right neighbor a radical spaces like an
    /// ordinary atom.
    Radical,
}

impl SpacingClass {
    pub fn from_kind(kind: AtomKind) -> SpacingClass {
        match kind {
            AtomKind::LargeOperator => SpacingClass::Operator,
            AtomKind::BinaryOperator => SpacingClass::Binary,
            AtomKind::Relation => SpacingClass::Relation,
            AtomKind::Open => SpacingClass::Open,
            AtomKind::Close => SpacingClass::Close,
            AtomKind::Punctuation => SpacingClass::Punctuation,
            AtomKind::Fraction | AtomKind::Inner | AtomKind::Table => SpacingClass::Inner,
            AtomKind::Radical => SpacingClass::Radical,
            _ => SpacingClass::Ordinary,
        }
    }
}

/// One cell of the spacing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Cell {
    None,
    /// 3 mu, always.
    Thin,
    /// 3 mu outside script styles.
    NsThin,
    /// 4 mu outside script styles.
    NsMedium,
    /// 5 mu outside script styles.
    NsThick,
    Invalid,
}

use self::Cell::*;

// Rows: left class (Radical last). Columns: right class (no Radical column).
#[rustfmt::skip]
const TABLE: [[Cell; 8]; 9] = [
    /* ord   */ [None,     Thin,   NsMedium, NsThick, None,     None,    None,   NsThin],
    /* op    */ [Thin,     Thin,   Invalid,  NsThick, None,     None,    None,   NsThin],
    /* bin   */ [NsMedium, NsMedium, Invalid, Invalid, NsMedium, Invalid, Invalid, NsMedium],
    /* rel   */ [NsThick,  NsThick, Invalid, None,    NsThick,  None,    None,   NsThick],
    /* open  */ [None,     None,   Invalid,  None,    None,     None,    None,   None],
    /* close */ [None,     Thin,   NsMedium, NsThick, None,     None,    None,   NsThin],
    /* punct */ [NsThin,   NsThin, Invalid,  NsThin,  NsThin,   NsThin,  NsThin, NsThin],
    /* inner */ [NsThin,   Thin,   NsMedium, NsThick, NsThin,   None,    NsThin, NsThin],
    /* rad   */ [NsMedium, NsThin, NsMedium, NsThick, NsMedium, None,    NsThin, NsMedium],
];

fn row(class: SpacingClass) -> usize {
    match class {
        SpacingClass::Ordinary => 0,
        SpacingClass::Operator => 1,
        SpacingClass::Binary => 2,
        SpacingClass::Relation => 3,
        SpacingClass::Open => 4,
        SpacingClass::Close => 5,
        SpacingClass::Punctuation => 6,
        SpacingClass::Inner => 7,
        SpacingClass::Radical => 8,
    }
}

fn column(class: SpacingClass) -> usize {
    match class {
        SpacingClass::Radical => 0,
        other => row(other),
    }
}

/// The gap to insert between two adjacent atoms at the given style, in em.
pub fn atom_space(left: AtomKind, right: AtomKind, style: LineStyle) -> LayoutResult<Unit<Em>> {
    let lclass = SpacingClass::from_kind(left);
    let rclass = SpacingClass::from_kind(right);
    let cell = TABLE[row(lclass)][column(rclass)];

    let mu_count = match cell {
        None => 0.0,
        Thin => 3.0,
        NsThin | NsMedium | NsThick if style.is_script() => 0.0,
        NsThin => 3.0,
        NsMedium => 4.0,
        NsThick => 5.0,
        Invalid => {
            debug_assert!(false, "unfinalized adjacency {:?} {:?}", left, right);
            return Err(LayoutError::Invariant(Invariant::IllegalAdjacency(
                left, right,
            )));
        }
    };

    Ok(MU.scale(mu_count))
}
