use std::fmt::{Display, Formatter};

/// Axis-aligned box `[lower, upper]` in the variable's domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Region {
    /// Caller guarantees `lower[i] <= upper[i]` and equal lengths.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Self {
        debug_assert_eq!(lower.len(), upper.len());
        debug_assert!(lower.iter().zip(&upper).all(|(l, u)| l <= u));
        Self { lower, upper }
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    /// Whether the box is a single point.
    pub fn is_point(&self) -> bool {
        self.lower == self.upper
    }

    /// Coordinate of largest extent, with that extent.
    pub fn widest(&self) -> (usize, f64) {
        self.lower
            .iter()
            .zip(&self.upper)
            .map(|(l, u)| u - l)
            .enumerate()
            .fold((0, 0.0), |best, (i, w)| if w > best.1 { (i, w) } else { best })
    }

    pub fn center(&self) -> Vec<f64> {
        self.lower
            .iter()
            .zip(&self.upper)
            .map(|(&l, &u)| l + (u - l) / 2.0)
            .collect()
    }

    /// Split along the widest coordinate at its midpoint.
    ///
    /// Returns `None` when the midpoint coincides with an end of the interval,
    /// i.e. the box can not be subdivided any further in floating point.
    pub fn split(&self) -> Option<(Region, Region)> {
        self.split_at(self.widest().0)
    }

    /// Split coordinate `i` at its midpoint.
    pub fn split_at(&self, i: usize) -> Option<(Region, Region)> {
        let w = self.upper[i] - self.lower[i];
        if w <= 0.0 {
            return None;
        }
        let mid = self.lower[i] + w / 2.0;
        if mid <= self.lower[i] || mid >= self.upper[i] {
            return None;
        }
        let mut left = self.clone();
        let mut right = self.clone();
        left.upper[i] = mid;
        right.lower[i] = mid;
        Some((left, right))
    }

    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.dim()
            && point
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(p, (l, u))| l <= p && p <= u)
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}, {:?}]", self.lower, self.upper)
    }
}
