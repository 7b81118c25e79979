use super::CxCyWH;
use crate::common::*;

/// The generic rectangle in image coordinates, x to the right and y downwards.
pub trait Rect {
    type Type;

    fn x1(&self) -> Self::Type;
    fn y1(&self) -> Self::Type;
    fn x2(&self) -> Self::Type;
    fn y2(&self) -> Self::Type;
    fn cx(&self) -> Self::Type;
    fn cy(&self) -> Self::Type;
    fn w(&self) -> Self::Type;
    fn h(&self) -> Self::Type;

    fn try_from_xyxy(xyxy: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;

    fn try_from_cxcywh(cxcywh: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;
}

pub trait RectExt: Rect
where
    Self::Type: Copy + Num + PartialOrd,
{
    fn to_cxcywh(&self) -> CxCyWH<Self::Type> {
        CxCyWH {
            cx: self.cx(),
            cy: self.cy(),
            w: self.w(),
            h: self.h(),
        }
    }

    fn area(&self) -> Self::Type {
        self.w() * self.h()
    }
}

impl<T> RectExt for T
where
    T: Rect,
    T::Type: Copy + Num + PartialOrd,
{
}
