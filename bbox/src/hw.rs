use crate::common::*;

/// Image or box size in `[h, w]` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HW<T> {
    h: T,
    w: T,
}

impl<T> HW<T>
where
    T: Copy,
{
    /// Build a size from known non-negative values, such as tensor dimensions.
    pub fn from_hw(hw: [T; 2]) -> Self {
        let [h, w] = hw;
        Self { h, w }
    }

    pub fn hw(&self) -> [T; 2] {
        [self.h, self.w]
    }

    pub fn w(&self) -> T {
        self.w
    }

    pub fn h(&self) -> T {
        self.h
    }
}

impl<T> HW<T>
where
    T: Copy + Num + PartialOrd,
{
    /// The shorter and the longer side.
    pub fn min_max(&self) -> (T, T) {
        if self.h <= self.w {
            (self.h, self.w)
        } else {
            (self.w, self.h)
        }
    }

    /// True if either side is zero or negative.
    pub fn is_empty(&self) -> bool {
        let zero = T::zero();
        self.h <= zero || self.w <= zero
    }
}

impl HW<i64> {
    /// The pixel size in box coordinates.
    pub fn to_f32(&self) -> HW<f32> {
        HW {
            h: self.h as f32,
            w: self.w as f32,
        }
    }
}
