//! Unit tags for the lengths this engine manipulates: font units, em, points, pixels.
//!
//! Conversion factors not given here come from elsewhere: the factor between
//! [`FUnit`] and [`Em`] is declared in the font file, and choosing a factor between
//! [`Em`] and [`Px`] is precisely what specifying a font size is about.

/// Smallest virtual unit a font file can address; every dimension inside the font is
/// an integer number of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FUnit;

/// The conventional typographic reference square of a font. Inter-atom spacing is
/// specified in mu, where 1 mu = 1/18 em, so it scales with the font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Em;

/// Desktop-publishing point, 1/72 inch at the standard 96 PPI. Used only for the
/// table constants inherited from LaTeX (`\arraycolsep` and friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pt;

/// Final surface unit; whatever the renderer draws in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Px;

/// If U and V are units, `Ratio<U, V>` is the unit U·V⁻¹. A font size is a
/// `Unit<Ratio<Px, Em>>`; the font's design grid is a `Unit<Ratio<FUnit, Em>>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio<U, V> {
    _numerator: std::marker::PhantomData<U>,
    _denominator: std::marker::PhantomData<V>,
}

impl<U, V> Ratio<U, V> {
    /// Creates the ratio unit tag.
    pub const fn new() -> Self {
        Self {
            _numerator: std::marker::PhantomData,
            _denominator: std::marker::PhantomData,
        }
    }
}
