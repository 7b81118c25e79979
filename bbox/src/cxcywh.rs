use super::{Rect, XYXY};
use crate::{common::*, HW};

/// Bounding box in center format `[cx, cy, w, h]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CxCyWH<T> {
    pub(crate) cx: T,
    pub(crate) cy: T,
    pub(crate) w: T,
    pub(crate) h: T,
}

impl<T> CxCyWH<T> {
    pub fn into_raw(self) -> [T; 4] {
        let Self { cx, cy, w, h } = self;
        [cx, cy, w, h]
    }
}

impl<T> CxCyWH<T>
where
    T: Copy + Num + PartialOrd,
{
    /// Express the box in fractions of the image size.
    pub fn normalize(&self, size: &HW<T>) -> Self {
        Self {
            cx: self.cx / size.w(),
            cy: self.cy / size.h(),
            w: self.w / size.w(),
            h: self.h / size.h(),
        }
    }
}

impl<T> Rect for CxCyWH<T>
where
    T: Copy + Num + PartialOrd,
{
    type Type = T;

    fn x1(&self) -> Self::Type {
        let two = T::one() + T::one();
        self.cx - self.w / two
    }

    fn y1(&self) -> Self::Type {
        let two = T::one() + T::one();
        self.cy - self.h / two
    }

    fn x2(&self) -> Self::Type {
        let two = T::one() + T::one();
        self.cx + self.w / two
    }

    fn y2(&self) -> Self::Type {
        let two = T::one() + T::one();
        self.cy + self.h / two
    }

    fn cx(&self) -> Self::Type {
        self.cx
    }

    fn cy(&self) -> Self::Type {
        self.cy
    }

    fn w(&self) -> Self::Type {
        self.w
    }

    fn h(&self) -> Self::Type {
        self.h
    }

    fn try_from_xyxy(xyxy: [Self::Type; 4]) -> Result<Self> {
        let [x1, y1, x2, y2] = xyxy;
        ensure!(x2 >= x1 && y2 >= y1, "x2 >= x1 and y2 >= y1 must hold");

        let two = T::one() + T::one();
        Ok(Self {
            cx: (x1 + x2) / two,
            cy: (y1 + y2) / two,
            w: x2 - x1,
            h: y2 - y1,
        })
    }

    fn try_from_cxcywh(cxcywh: [Self::Type; 4]) -> Result<Self> {
        let [cx, cy, w, h] = cxcywh;
        let zero = T::zero();
        ensure!(w >= zero && h >= zero, "w and h must be non-negative");
        Ok(Self { cx, cy, w, h })
    }
}

impl<T> From<&XYXY<T>> for CxCyWH<T>
where
    T: Copy + Num,
{
    fn from(from: &XYXY<T>) -> Self {
        let two = T::one() + T::one();
        let XYXY { x1, y1, x2, y2 } = *from;
        Self {
            cx: (x1 + x2) / two,
            cy: (y1 + y2) / two,
            w: x2 - x1,
            h: y2 - y1,
        }
    }
}

impl<T> From<XYXY<T>> for CxCyWH<T>
where
    T: Copy + Num,
{
    fn from(from: XYXY<T>) -> Self {
        Self::from(&from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn normalize_by_image_size() {
        let bbox = CxCyWH::try_from_xyxy([0.0, 0.0, 50.0, 20.0]).unwrap();
        let [cx, cy, w, h] = bbox.normalize(&HW::from_hw([40.0, 100.0])).into_raw();
        assert_abs_diff_eq!(cx, 0.25);
        assert_abs_diff_eq!(cy, 0.25);
        assert_abs_diff_eq!(w, 0.5);
        assert_abs_diff_eq!(h, 0.5);
    }
}
