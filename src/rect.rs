use nalgebra::Matrix1x4;
use num::Float;
use std::fmt::Debug;

/* ------------------------------------------------------------------------------
 * Rect struct
 * ------------------------------------------------------------------------------ */
#[derive(Debug, Clone, PartialEq)]
pub struct Rect<T>
where
    T: Debug + Float + 'static,
{
    tlwh: Matrix1x4<T>,
}

impl<T> Rect<T>
where
    T: Clone + Debug + Float + 'static,
{
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        let tlwh = Matrix1x4::new(x, y, width, height);
        Self { tlwh }
    }

    /// Create Rect from [x1, y1, x2, y2] format
    pub fn from_xyxy(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    #[inline(always)]
    pub fn x(&self) -> T {
        self.tlwh[(0, 0)]
    }

    #[inline(always)]
    pub fn y(&self) -> T {
        self.tlwh[(0, 1)]
    }

    #[inline(always)]
    pub fn width(&self) -> T {
        self.tlwh[(0, 2)]
    }

    #[inline(always)]
    pub fn height(&self) -> T {
        self.tlwh[(0, 3)]
    }

    /// Centroid of the box.
    pub fn center(&self) -> (T, T) {
        let two = T::from(2).unwrap();
        (
            self.tlwh[(0, 0)] + self.tlwh[(0, 2)] / two,
            self.tlwh[(0, 1)] + self.tlwh[(0, 3)] / two,
        )
    }

    pub fn area(&self) -> T {
        self.tlwh[(0, 2)] * self.tlwh[(0, 3)]
    }

    /// Length of the box diagonal, used as the adaptive match-distance scale.
    pub fn diagonal(&self) -> T {
        let w = self.tlwh[(0, 2)];
        let h = self.tlwh[(0, 3)];
        (w * w + h * h).sqrt()
    }

    pub fn aspect_ratio(&self) -> T {
        self.tlwh[(0, 2)] / self.tlwh[(0, 3)]
    }

    /// Get bounding box as [x1, y1, x2, y2] format
    pub fn get_xyxy(&self) -> [T; 4] {
        [
            self.tlwh[(0, 0)],
            self.tlwh[(0, 1)],
            self.tlwh[(0, 0)] + self.tlwh[(0, 2)],
            self.tlwh[(0, 1)] + self.tlwh[(0, 3)],
        ]
    }
}
