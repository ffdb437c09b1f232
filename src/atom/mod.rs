//! The input AST: atoms, atom lists, and the structural payloads.
//!
//! An [`Atom`] is one mathematical element. Its [`AtomKind`] drives inter-atom
//! spacing and script permissions; structural kinds carry their children in a
//! [`Body`] payload, so every consumer is an exhaustive `match` rather than a
//! downcast. A parsed list is normalized once by [`finalize`] before layout.

pub mod finalize;

pub use self::finalize::finalize;

use crate::dimensions::units::Em;
use crate::dimensions::Unit;
use crate::error::TableError;
use crate::layout::LineStyle;
use std::ops::Range;

/// An ordered, owned sequence of atoms.
pub type AtomList = Vec<Atom>;

/// The classification of an atom. Ordering is meaningful: scripts are permitted
/// only on kinds before [`AtomKind::Boundary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AtomKind {
    Ordinary,
    Number,
    Variable,
    BinaryOperator,
    UnaryOperator,
    Relation,
    Open,
    Close,
    Punctuation,
    LargeOperator,
    Fraction,
    Radical,
    Inner,
    Underline,
    Overline,
    Accent,
    Overbrace,
    Underbrace,
    Boundary,
    Space,
    Style,
    Color,
    TextColor,
    ColorBox,
    Table,
    Placeholder,
}

impl AtomKind {
    /// May an atom of this kind carry sub/superscripts?
    pub fn scripts_allowed(self) -> bool {
        self < AtomKind::Boundary
    }
}

/// Which glyph family renders an atom's nucleus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    Roman,
    Italic,
    SansSerif,
    Monospace,
    Script,
    Fraktur,
    Blackboard,
}

/// Family plus weight. Two text atoms fuse in the tokenizer only when these match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontStyle {
    pub family: FontFamily,
    pub bold: bool,
}

impl Default for FontStyle {
    fn default() -> Self {
        FontStyle {
            family: FontFamily::Roman,
            bold: false,
        }
    }
}

/// An sRGB color with alpha, parsed upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Structural payload of an atom. Plain symbol kinds carry [`Body::None`]; each
/// structural kind has exactly one matching variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    None,
    LargeOperator(LargeOperator),
    Fraction(Fraction),
    Radical(Radical),
    Inner(Inner),
    /// Inner list of an underline, overline, overbrace or underbrace atom.
    Enclosed(AtomList),
    Accent(Accent),
    /// Explicit horizontal space.
    Space(Unit<Em>),
    /// In-list style switch (`\displaystyle` and friends).
    Style(LineStyle),
    /// Color-scoped sub-list (color, textColor and colorBox atoms).
    Color(ColorSpan),
    Table(Table),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LargeOperator {
    /// Render scripts as limits above/below in display and text styles.
    pub limits: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fraction {
    pub numerator: AtomList,
    pub denominator: AtomList,
    pub has_rule: bool,
    pub left_delimiter: Option<char>,
    pub right_delimiter: Option<char>,
    /// `\cfrac`: children stay at display proportions.
    pub continued: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Radical {
    pub radicand: AtomList,
    pub degree: Option<AtomList>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Accent {
    pub inner: AtomList,
    /// Grows with the content (arrow accents and the wide family).
    pub stretchy: bool,
    /// `\widehat`-class: variant chosen by content width, then scaled to cover it.
    pub wide: bool,
}

/// A delimited sub-formula, `\left( ... \right)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Inner {
    pub inner: AtomList,
    pub left_delimiter: Option<char>,
    pub right_delimiter: Option<char>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpan {
    pub color: Rgba,
    pub inner: AtomList,
    /// Paint the glyphs themselves rather than a backdrop box.
    pub foreground: bool,
}

/// How cells in one table column line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Row-major cell grid; rows may be ragged except where the environment
    /// fixes a column count.
    pub cells: Vec<Vec<AtomList>>,
    /// Per-column alignment, cycled when the grid is wider.
    pub alignments: Vec<ColumnAlignment>,
    /// Extra space added between rows on top of the baseline skip (the jot).
    pub inter_row_additional: Unit<Em>,
    /// Space inserted on each side of every column.
    pub inter_column_spacing: Unit<Em>,
    pub left_delimiter: Option<char>,
    pub right_delimiter: Option<char>,
    pub environment: Option<String>,
}

// LaTeX's \jot and \arraycolsep, expressed in em at 10pt.
const JOT: Unit<Em> = Unit::new(0.3);
const COLUMN_SEP: Unit<Em> = Unit::new(0.5);

impl Table {
    /// A bare grid with centered columns and default spacing.
    pub fn new(cells: Vec<Vec<AtomList>>) -> Table {
        Table {
            cells,
            alignments: vec![ColumnAlignment::Center],
            inter_row_additional: Unit::ZERO,
            inter_column_spacing: COLUMN_SEP,
            left_delimiter: None,
            right_delimiter: None,
            environment: None,
        }
    }

    /// Builds the table for a named environment, validating the column count it
    /// demands and applying its alignments, delimiters and spacing.
    pub fn for_environment(name: &str, cells: Vec<Vec<AtomList>>) -> Result<Table, TableError> {
        let columns = cells.iter().map(Vec::len).max().unwrap_or(0);
        let empty = cells.is_empty();
        let check_exact = |n: usize| -> Result<(), TableError> {
            if columns == n || empty {
                Ok(())
            } else {
                Err(TableError::InvalidColumnCount(name.to_owned(), n, columns))
            }
        };
        let check_at_most = |n: usize| -> Result<(), TableError> {
            if columns <= n {
                Ok(())
            } else {
                Err(TableError::InvalidColumnCount(name.to_owned(), n, columns))
            }
        };

        let mut table = Table::new(cells);
        table.environment = Some(name.to_owned());
        match name {
            "matrix" | "smallmatrix" => {}
            "pmatrix" => {
                table.left_delimiter = Some('(');
                table.right_delimiter = Some(')');
            }
            "bmatrix" => {
                table.left_delimiter = Some('[');
                table.right_delimiter = Some(']');
            }
            "Bmatrix" => {
                table.left_delimiter = Some('{');
                table.right_delimiter = Some('}');
            }
            "vmatrix" => {
                table.left_delimiter = Some('|');
                table.right_delimiter = Some('|');
            }
            "Vmatrix" => {
                table.left_delimiter = Some('\u{2016}');
                table.right_delimiter = Some('\u{2016}');
            }
            "cases" => {
                check_at_most(2)?;
                table.left_delimiter = Some('{');
                table.alignments = vec![ColumnAlignment::Left, ColumnAlignment::Left];
                table.inter_column_spacing = Unit::new(1.0);
            }
            "eqnarray" => {
                check_exact(3)?;
                table.alignments = vec![
                    ColumnAlignment::Right,
                    ColumnAlignment::Center,
                    ColumnAlignment::Left,
                ];
                table.inter_row_additional = JOT;
            }
            "split" | "aligned" => {
                check_at_most(2)?;
                table.alignments = vec![ColumnAlignment::Right, ColumnAlignment::Left];
                table.inter_column_spacing = Unit::ZERO;
                table.inter_row_additional = JOT;
            }
            "gather" | "gathered" => {
                check_exact(1)?;
                table.inter_row_additional = JOT;
            }
            _ => return Err(TableError::UnknownEnvironment(name.to_owned())),
        }
        Ok(table)
    }
}

/// One node of the input tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub kind: AtomKind,
    /// Text payload; one character for most symbol atoms, the accent character
    /// for accents, possibly many characters after digit fusion.
    pub nucleus: String,
    superscript: Option<AtomList>,
    subscript: Option<AtomList>,
    /// Range into the source string, for hit-testing.
    pub index_range: Range<usize>,
    pub font_style: FontStyle,
    /// Atoms merged into this one by finalization, kept for hit-testing.
    pub fused: Vec<Atom>,
    pub body: Body,
}

impl Atom {
    /// A plain (payload-free) atom. Debug builds reject structural kinds here.
    pub fn new(kind: AtomKind, nucleus: impl Into<String>, index_range: Range<usize>) -> Atom {
        debug_assert!(
            !matches!(
                kind,
                AtomKind::Fraction
                    | AtomKind::Radical
                    | AtomKind::Inner
                    | AtomKind::Accent
                    | AtomKind::Table
            ),
            "structural kind {:?} needs a payload, use Atom::with_body",
            kind
        );
        Atom {
            kind,
            nucleus: nucleus.into(),
            superscript: None,
            subscript: None,
            index_range,
            font_style: FontStyle::default(),
            fused: Vec::new(),
            body: Body::None,
        }
    }

    /// An atom with a structural payload.
    pub fn with_body(
        kind: AtomKind,
        nucleus: impl Into<String>,
        index_range: Range<usize>,
        body: Body,
    ) -> Atom {
        Atom {
            body,
            ..Atom::new_unchecked(kind, nucleus.into(), index_range)
        }
    }

    fn new_unchecked(kind: AtomKind, nucleus: String, index_range: Range<usize>) -> Atom {
        Atom {
            kind,
            nucleus,
            superscript: None,
            subscript: None,
            index_range,
            font_style: FontStyle::default(),
            fused: Vec::new(),
            body: Body::None,
        }
    }

    pub fn superscript(&self) -> Option<&AtomList> {
        self.superscript.as_ref()
    }

    pub fn subscript(&self) -> Option<&AtomList> {
        self.subscript.as_ref()
    }

    pub fn has_scripts(&self) -> bool {
        self.superscript.is_some() || self.subscript.is_some()
    }

    /// Attaches a superscript.
    ///
    /// # Panics
    /// If this atom's kind forbids scripts. That is a parser bug, not input the
    /// layout engine can make sense of.
    pub fn set_superscript(&mut self, script: AtomList) {
        assert!(
            self.kind.scripts_allowed(),
            "superscript on a script-disallowed atom kind {:?}",
            self.kind
        );
        self.superscript = Some(script);
    }

    /// Attaches a subscript. Panics under the same contract as
    /// [`set_superscript`](Atom::set_superscript).
    pub fn set_subscript(&mut self, script: AtomList) {
        assert!(
            self.kind.scripts_allowed(),
            "subscript on a script-disallowed atom kind {:?}",
            self.kind
        );
        self.subscript = Some(script);
    }

    /// A copy with both scripts detached. Structural layouts that hand scripts to
    /// a different code path (operator limits, brace annotations) lay out this
    /// copy, leaving the input tree untouched.
    pub fn without_scripts(&self) -> Atom {
        Atom {
            superscript: None,
            subscript: None,
            ..self.clone()
        }
    }

    pub(crate) fn replace_scripts(
        &mut self,
        superscript: Option<AtomList>,
        subscript: Option<AtomList>,
    ) {
        self.superscript = superscript;
        self.subscript = subscript;
    }

    pub(crate) fn take_scripts(&mut self) -> (Option<AtomList>, Option<AtomList>) {
        (self.superscript.take(), self.subscript.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(kind: AtomKind, nucleus: &str) -> Atom {
        Atom::new(kind, nucleus, 0..nucleus.len())
    }

    #[test]
    fn script_permission_follows_kind_order() {
        assert!(AtomKind::Ordinary.scripts_allowed());
        assert!(AtomKind::LargeOperator.scripts_allowed());
        assert!(AtomKind::Underbrace.scripts_allowed());
        assert!(!AtomKind::Boundary.scripts_allowed());
        assert!(!AtomKind::Space.scripts_allowed());
        assert!(!AtomKind::Table.scripts_allowed());
    }

    #[test]
    #[should_panic(expected = "script-disallowed")]
    fn scripts_on_boundary_panic() {
        let mut boundary = atom(AtomKind::Boundary, "");
        boundary.set_superscript(vec![atom(AtomKind::Number, "2")]);
    }

    #[test]
    fn without_scripts_leaves_original_intact() {
        let mut x = atom(AtomKind::Variable, "x");
        x.set_subscript(vec![atom(AtomKind::Number, "1")]);
        let bare = x.without_scripts();
        assert!(!bare.has_scripts());
        assert!(x.subscript().is_some());
    }

    #[test]
    fn eqnarray_demands_three_columns() {
        let row = |n: usize| vec![vec![atom(AtomKind::Variable, "x")]; n];
        assert!(Table::for_environment("eqnarray", vec![row(3)]).is_ok());
        match Table::for_environment("eqnarray", vec![row(2)]) {
            Err(TableError::InvalidColumnCount(env, expected, got)) => {
                assert_eq!(env, "eqnarray");
                assert_eq!((expected, got), (3, 2));
            }
            other => panic!("expected column-count error, got {:?}", other),
        }
    }

    #[test]
    fn cases_takes_one_or_two_columns() {
        let row = |n: usize| vec![vec![atom(AtomKind::Variable, "x")]; n];
        let table = Table::for_environment("cases", vec![row(2), row(1)]).unwrap();
        assert_eq!(table.left_delimiter, Some('{'));
        assert_eq!(table.right_delimiter, None);
        assert!(Table::for_environment("cases", vec![row(3)]).is_err());
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert_eq!(
            Table::for_environment("tabular", Vec::new()),
            Err(TableError::UnknownEnvironment("tabular".into()))
        );
    }

    #[test]
    fn matrix_family_sets_delimiters() {
        let cells = vec![vec![vec![atom(AtomKind::Number, "1")]]];
        let table = Table::for_environment("pmatrix", cells).unwrap();
        assert_eq!(table.left_delimiter, Some('('));
        assert_eq!(table.right_delimiter, Some(')'));
    }
}
