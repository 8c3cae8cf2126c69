/// Drawable size in physical pixels.
///
/// `(0, 0)` (or any zero axis) is a valid state: the window is minimized and
/// nothing can be presented.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub const ZERO: Self = Self::new(0, 0);

    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when both axes are non-zero.
    #[inline]
    pub const fn is_presentable(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width over height; 1.0 for a non-presentable size.
    #[inline]
    pub fn aspect_ratio(self) -> f32 {
        if self.is_presentable() {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }

    /// Center point in pixels.
    #[inline]
    pub fn center(self) -> (f32, f32) {
        (self.width as f32 * 0.5, self.height as f32 * 0.5)
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for ViewportSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

impl std::fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_axis_is_not_presentable() {
        assert!(!ViewportSize::ZERO.is_presentable());
        assert!(!ViewportSize::new(800, 0).is_presentable());
        assert!(!ViewportSize::new(0, 600).is_presentable());
        assert!(ViewportSize::new(1, 1).is_presentable());
    }

    #[test]
    fn aspect_ratio_falls_back_to_one() {
        assert_eq!(ViewportSize::ZERO.aspect_ratio(), 1.0);
        assert!((ViewportSize::new(800, 600).aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
    }
}
