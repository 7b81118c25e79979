use super::{Rect, XYXY};
use crate::{common::*, HW};

/// Axis-aligned scaling followed by translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transform<T> {
    pub sx: T,
    pub sy: T,
    pub tx: T,
    pub ty: T,
}

impl<T> Transform<T>
where
    T: Copy + Num + PartialOrd,
{
    pub fn translation(tx: T, ty: T) -> Self {
        Self {
            sx: T::one(),
            sy: T::one(),
            tx,
            ty,
        }
    }

    pub fn from_rects<R>(src: &R, tgt: &R) -> Self
    where
        R: Rect<Type = T>,
    {
        let sx = tgt.w() / src.w();
        let sy = tgt.h() / src.h();
        let tx = tgt.x1() - src.x1() * sx;
        let ty = tgt.y1() - src.y1() * sy;

        Self { sx, sy, tx, ty }
    }

    /// Map an image of `src` size onto `tgt` size, ignoring aspect ratio.
    pub fn from_sizes_exact(src: &HW<T>, tgt: &HW<T>) -> Self {
        let zero = T::zero();
        let src = XYXY::from_raw([zero, zero, src.w(), src.h()]);
        let tgt = XYXY::from_raw([zero, zero, tgt.w(), tgt.h()]);
        Self::from_rects(&src, &tgt)
    }
}

impl<T> Mul<&XYXY<T>> for &Transform<T>
where
    T: Copy + Num + PartialOrd,
{
    type Output = XYXY<T>;

    fn mul(self, rhs: &XYXY<T>) -> Self::Output {
        rhs.transform(self)
    }
}

impl<T> Mul<&Transform<T>> for &Transform<T>
where
    T: Copy + Num,
{
    type Output = Transform<T>;

    fn mul(self, rhs: &Transform<T>) -> Self::Output {
        Transform {
            sx: self.sx * rhs.sx,
            sy: self.sy * rhs.sy,
            tx: rhs.tx * self.sx + self.tx,
            ty: rhs.ty * self.sy + self.ty,
        }
    }
}
