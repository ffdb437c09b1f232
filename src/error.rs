//! Error types for the layout pipeline.
//!   - [`FontError`]: the metrics provider could not answer a glyph query.
//!   - [`TableError`]: a table environment was constructed with malformed input.
//!   - [`LayoutError`]: anything that can abort laying out a (sub-)expression.
//!
//! Contract violations (scripts on a script-disallowed atom, an unreachable spacing
//! cell) fail fast with a `debug_assert!` during development and surface as
//! [`LayoutError::Invariant`] in release builds. Missing content is not an error at
//! this level: an empty sub-list simply lays out as an empty box.

use crate::atom::AtomKind;
use crate::font::GlyphId;
use std::fmt;

/// Result alias used throughout layout.
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;

/// Errors during the layout phase.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The metrics provider failed a query.
    Font(FontError),
    /// Expression nesting exceeded the configured recursion cap.
    DepthLimit(usize),
    /// An upstream contract was broken (release-mode form of a `debug_assert!`).
    Invariant(Invariant),
}

/// The specific broken contract behind a [`LayoutError::Invariant`].
#[derive(Debug, Clone, PartialEq)]
pub enum Invariant {
    /// Two atom kinds that can never be adjacent in a finalized list were looked up
    /// in the spacing table.
    IllegalAdjacency(AtomKind, AtomKind),
}

/// Errors from the font metrics provider.
#[derive(Debug, Clone, PartialEq)]
pub enum FontError {
    /// No glyph for the given character.
    MissingGlyphCodepoint(char),
    /// No glyph with the given id.
    MissingGlyphGid(GlyphId),
}

/// Errors constructing a table atom from an environment name and a cell grid.
#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// The environment demands a fixed column count the cells do not satisfy.
    /// Fields: environment name, expected columns, widest row found.
    InvalidColumnCount(String, usize, usize),
    /// The environment name is not one this engine knows.
    UnknownEnvironment(String),
}

impl From<FontError> for LayoutError {
    fn from(e: FontError) -> Self {
        LayoutError::Font(e)
    }
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FontError::MissingGlyphCodepoint(cp) => {
                write!(f, "missing glyph for codepoint '{}'", cp)
            }
            FontError::MissingGlyphGid(gid) => {
                write!(f, "missing glyph with gid {}", Into::<u16>::into(gid))
            }
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LayoutError::Font(e) => write!(f, "font error: {}", e),
            LayoutError::DepthLimit(limit) => {
                write!(f, "expression nesting exceeded the depth cap of {}", limit)
            }
            LayoutError::Invariant(inv) => write!(f, "invariant violation: {}", inv),
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Invariant::IllegalAdjacency(left, right) => write!(
                f,
                "atom kinds {:?} and {:?} cannot be adjacent in a finalized list",
                left, right
            ),
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableError::InvalidColumnCount(env, expected, got) => write!(
                f,
                "environment '{}' requires {} column(s), found a row with {}",
                env, expected, got
            ),
            TableError::UnknownEnvironment(env) => {
                write!(f, "unknown table environment '{}'", env)
            }
        }
    }
}

impl std::error::Error for LayoutError {}
impl std::error::Error for FontError {}
impl std::error::Error for TableError {}
