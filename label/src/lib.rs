use bbox::{Rect, Transform, XYXY};
use num_traits::Num;
use std::ops::Mul;

/// A box tagged with its dense class and the position of the annotation it
/// came from.
///
/// The source index survives every augmentation step, so references into the
/// original object list can be resolved after boxes are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label<R, C>
where
    R: Rect,
{
    pub rect: R,
    pub class: C,
    pub source: usize,
}

impl<'a, T, C> Mul<&'a Label<XYXY<T>, C>> for &'a Transform<T>
where
    T: Copy + Num + PartialOrd,
    C: Copy,
{
    type Output = Label<XYXY<T>, C>;

    fn mul(self, rhs: &'a Label<XYXY<T>, C>) -> Self::Output {
        Label {
            rect: self * &rhs.rect,
            class: rhs.class,
            source: rhs.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_keeps_class_and_source() {
        let label = Label {
            rect: XYXY::from_raw([0.0, 0.0, 10.0, 10.0]),
            class: 3usize,
            source: 7,
        };
        let moved = &Transform::translation(5.0, 1.0) * &label;
        assert_eq!(moved.rect.into_raw(), [5.0, 1.0, 15.0, 11.0]);
        assert_eq!(moved.class, 3);
        assert_eq!(moved.source, 7);
    }
}
