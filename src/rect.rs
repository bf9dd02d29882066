//! Node frames.

use cgmath::{Point2, Vector2};

/// An axis-aligned frame in vp (virtual pixel) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Point2<f32>,
    pub size: Vector2<f32>,
}

impl Rect {
    pub fn new(origin: Point2<f32>, size: Vector2<f32>) -> Rect {
        Rect { origin, size }
    }

    /// A frame of the given size at the origin of its own coordinate system.
    pub fn from_size(size: Vector2<f32>) -> Rect {
        Rect::new(Point2::new(0., 0.), size)
    }

    /// Hit test. The near edges are inside the frame, the far edges are not.
    pub fn contains(&self, point: Point2<f32>) -> bool {
        let dx = point.x - self.origin.x;
        let dy = point.y - self.origin.y;
        (0. ..self.size.x).contains(&dx) && (0. ..self.size.y).contains(&dy)
    }
}

#[test]
fn test_frame_hit() {
    let frame = Rect::new(Point2::new(10., 10.), Vector2::new(20., 5.));
    assert!(frame.contains(Point2::new(10., 10.)));
    assert!(frame.contains(Point2::new(29.5, 14.)));
    assert!(!frame.contains(Point2::new(30., 12.)), "far edge is exclusive");
    assert!(!frame.contains(Point2::new(9., 12.)));
    assert!(!Rect::from_size(Vector2::new(0., 0.)).contains(Point2::new(0., 0.)));
}
