use std::cmp;
use std::fmt;
use crate::error::{Result, TableError};

/// The ways a box can be described by its producer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoxFormat {
    Empty,
    // (top, bottom, left, right)
    TupleTblr,
    // (left, top, width, height), as emitted by Tesseract
    TupleLtwh,
    BoxClass,
}

/// Axis-aligned pixel rectangle, inclusive on all four sides.
///
/// The all -1 box is the empty sentinel. Nothing but [`BBox::empty`]
/// produces it; degenerate boxes with negative spans are legal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BBox {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl BBox {
    pub fn empty() -> Self {
        Self{top: -1, bottom: -1, left: -1, right: -1}
    }

    pub fn from_tblr(top: i32, bottom: i32, left: i32, right: i32) -> Self {
        Self{top, bottom, left, right}
    }

    pub fn from_ltwh(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self{top, bottom: top + height - 1, left, right: left + width - 1}
    }

    /// Builds a box from whichever source `format` asks for. A missing
    /// source is a caller contract violation.
    pub fn build(format: BoxFormat, values: Option<[i32; 4]>, other: Option<&BBox>) -> Result<Self> {
        match format {
            BoxFormat::Empty => Ok(Self::empty()),
            BoxFormat::TupleTblr => {
                let [t, b, l, r] = values.ok_or_else(|| {
                    TableError::InvalidArgument("a TBLR box needs a 4 values tuple".to_string())
                })?;
                Ok(Self::from_tblr(t, b, l, r))
            },
            BoxFormat::TupleLtwh => {
                let [l, t, w, h] = values.ok_or_else(|| {
                    TableError::InvalidArgument("a LTWH box needs a 4 values tuple".to_string())
                })?;
                Ok(Self::from_ltwh(l, t, w, h))
            },
            BoxFormat::BoxClass => {
                other.copied().ok_or_else(|| {
                    TableError::InvalidArgument("a box copy needs a source box".to_string())
                })
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top == -1 && self.bottom == -1 && self.left == -1 && self.right == -1
    }

    pub fn set_top(&mut self, v: i32) {
        self.top = v;
    }

    pub fn set_bottom(&mut self, v: i32) {
        self.bottom = v;
    }

    pub fn set_left(&mut self, v: i32) {
        self.left = v;
    }

    pub fn set_right(&mut self, v: i32) {
        self.right = v;
    }

    /// Grows `self` to cover `other`. An empty `other` leaves `self`
    /// alone, an empty `self` becomes a copy of `other`.
    pub fn union(&mut self, other: &BBox) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }

        self.top = self.top.min(other.top);
        self.bottom = self.bottom.max(other.bottom);
        self.left = self.left.min(other.left);
        self.right = self.right.max(other.right);
    }

    pub fn horizontal_span(&self) -> i32 {
        self.right - self.left + 1
    }

    pub fn vertical_span(&self) -> i32 {
        self.bottom - self.top + 1
    }

    pub fn contains_horizontally(&self, other: &BBox) -> bool {
        self.left <= other.left && self.right >= other.right
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.top, self.bottom, self.left, self.right)
    }
}

fn overlapping(a_lb: i32, a_ub: i32, b_lb: i32, b_ub: i32) -> (i32, f64, f64) {
    let overlap = cmp::min(a_ub, b_ub) - cmp::max(a_lb, b_lb) + 1;
    if overlap <= 0 {
        return (0, 0., 0.);
    }
    let a_span = (a_ub - a_lb + 1) as f64;
    let b_span = (b_ub - b_lb + 1) as f64;
    (overlap, overlap as f64 / a_span, overlap as f64 / b_span)
}

/// Common pixels on the x axis, then the fraction of `a` and of `b`
/// they represent. Disjoint boxes give `(0, 0., 0.)`.
pub fn horizontal_overlapping(a: &BBox, b: &BBox) -> (i32, f64, f64) {
    overlapping(a.left, a.right, b.left, b.right)
}

/// Same as [`horizontal_overlapping`] on the y axis.
pub fn vertical_overlapping(a: &BBox, b: &BBox) -> (i32, f64, f64) {
    overlapping(a.top, a.bottom, b.top, b.bottom)
}

#[test]
fn test_create() {
    let b = BBox::build(BoxFormat::Empty, None, None).unwrap();
    assert_eq!((b.top, b.bottom, b.left, b.right), (-1, -1, -1, -1));
    assert!(b.is_empty());

    let b2 = BBox::build(BoxFormat::TupleTblr, Some([30, 40, 50, 60]), None).unwrap();
    assert_eq!((b2.top, b2.bottom, b2.left, b2.right), (30, 40, 50, 60));
    assert!(!b2.is_empty());

    let b3 = BBox::build(BoxFormat::TupleLtwh, Some([30, 40, 50, 60]), None).unwrap();
    assert_eq!((b3.top, b3.bottom, b3.left, b3.right), (40, 40 + 60 - 1, 30, 30 + 50 - 1));

    let b4 = BBox::build(BoxFormat::BoxClass, None, Some(&b3)).unwrap();
    assert_eq!(format!("{}", b4), format!("{}", b3));
    assert_eq!(format!("{}", b2), "(30, 40, 50, 60)");
}

#[test]
fn test_create_missing_source() {
    for format in [BoxFormat::TupleTblr, BoxFormat::TupleLtwh, BoxFormat::BoxClass] {
        match BBox::build(format, None, None) {
            Err(TableError::InvalidArgument(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }
}

#[test]
fn test_union() {
    let mut b1 = BBox::from_tblr(30, 40, 50, 70);
    let b2 = BBox::from_tblr(35, 50, 45, 65);
    b1.union(&b2);
    assert_eq!(b1, BBox::from_tblr(30, 50, 45, 70));
    // only the receiver changes
    assert_eq!(b2, BBox::from_tblr(35, 50, 45, 65));
}

#[test]
fn test_union_with_empty() {
    let mut b = BBox::from_tblr(3, 9, 4, 12);
    b.union(&BBox::empty());
    assert_eq!(b, BBox::from_tblr(3, 9, 4, 12));

    let mut e = BBox::empty();
    e.union(&b);
    assert_eq!(e, b);

    let mut e = BBox::empty();
    e.union(&BBox::empty());
    assert!(e.is_empty());
}

#[test]
fn test_span() {
    let b = BBox::from_tblr(35, 50, 45, 65);
    assert_eq!(b.horizontal_span(), 65 - 45 + 1);
    assert_eq!(b.vertical_span(), 50 - 35 + 1);

    let degenerate = BBox::from_tblr(10, 5, 10, 8);
    assert_eq!(degenerate.horizontal_span(), -1);
    assert_eq!(degenerate.vertical_span(), -4);
}

#[test]
fn test_overlapping() {
    let b1 = BBox::from_tblr(30, 40, 50, 60);
    let b2 = BBox::from_tblr(35, 50, 45, 65);

    assert_eq!(horizontal_overlapping(&b1, &b2), (11, 1.0, 11. / 21.));
    assert_eq!(vertical_overlapping(&b1, &b2), (6, 6. / 11., 6. / 16.));
}

#[test]
fn test_overlapping_disjoint() {
    let b1 = BBox::from_tblr(0, 10, 0, 10);
    let b2 = BBox::from_tblr(0, 10, 11, 20);
    assert_eq!(horizontal_overlapping(&b1, &b2), (0, 0., 0.));
    assert_eq!(horizontal_overlapping(&b2, &b1), (0, 0., 0.));

    let b3 = BBox::from_tblr(40, 50, 0, 10);
    assert_eq!(vertical_overlapping(&b1, &b3), (0, 0., 0.));
    // touching on one pixel is an overlap
    assert_eq!(horizontal_overlapping(&b1, &BBox::from_tblr(0, 0, 10, 12)), (1, 1. / 11., 1. / 3.));
}

#[test]
fn test_ltwh_round_trip() {
    for (l, t, w, h) in [(0, 0, 1, 1), (12, 40, 100, 27), (-5, 3, 0, 2)] {
        let b = BBox::from_ltwh(l, t, w, h);
        assert_eq!((b.top, b.bottom, b.left, b.right), (t, t + h - 1, l, l + w - 1));
    }
}
