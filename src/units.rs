use derive_more::{Add, AddAssign, Display, Div, From, Into, Mul, MulAssign, Sub, SubAssign, Sum};
use serde::{Deserialize, Serialize};

/// Points per millimetre, as used by the template designer when converting box geometry
pub const PT_PER_MM: f32 = 2.8346;

/// Points per inch
pub const PT_PER_IN: f32 = 72.0;

/// A length in PostScript points (1/72 of an inch). All measurement and layout
/// arithmetic in this crate is carried out in points.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Mul,
    Div,
    MulAssign,
    Sum,
    From,
    Into,
    Display,
    Serialize,
    Deserialize,
)]
#[display("{_0}pt")]
#[serde(transparent)]
pub struct Pt(pub f32);

/// A length in millimetres, the unit template geometry is authored in
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Mul,
    Div,
    MulAssign,
    Sum,
    From,
    Into,
    Display,
    Serialize,
    Deserialize,
)]
#[display("{_0}mm")]
#[serde(transparent)]
pub struct Mm(pub f32);

/// A length in inches
#[derive(
    Debug, Default, Copy, Clone, PartialEq, PartialOrd, Add, Sub, Mul, Div, From, Into, Display,
)]
#[display("{_0}in")]
pub struct In(pub f32);

impl Pt {
    pub const ZERO: Pt = Pt(0.0);

    pub fn max(self, other: Pt) -> Pt {
        Pt(self.0.max(other.0))
    }

    pub fn min(self, other: Pt) -> Pt {
        Pt(self.0.min(other.0))
    }

    pub fn abs(self) -> Pt {
        Pt(self.0.abs())
    }
}

impl From<Mm> for Pt {
    fn from(mm: Mm) -> Self {
        Pt(mm.0 * PT_PER_MM)
    }
}

impl From<Pt> for Mm {
    fn from(pt: Pt) -> Self {
        Mm(pt.0 / PT_PER_MM)
    }
}

impl From<In> for Pt {
    fn from(inches: In) -> Self {
        Pt(inches.0 * PT_PER_IN)
    }
}

impl From<Pt> for In {
    fn from(pt: Pt) -> Self {
        In(pt.0 / PT_PER_IN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millimetres_convert_with_the_designer_ratio() {
        let pt: Pt = Mm(10.0).into();
        assert!((pt.0 - 28.346).abs() < 1e-4);

        let mm: Mm = Pt(28.346).into();
        assert!((mm.0 - 10.0).abs() < 1e-4);
    }

    #[test]
    fn arithmetic_stays_in_points() {
        let total: Pt = [Pt(1.5), Pt(2.0), Pt(0.5)].into_iter().sum();
        assert_eq!(total, Pt(4.0));
        assert_eq!(Pt(3.0) * 2.0, Pt(6.0));
        assert_eq!(Pt(3.0) / 2.0, Pt(1.5));
        assert_eq!(Pt::from(In(1.0)), Pt(72.0));
        assert_eq!(format!("{}", Pt(12.0)), "12pt");
    }
}
