use core::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2f {
    pub x: f32,
    pub y: f32,
}

impl Point2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).norm()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// z-component of the 3D cross product.
    pub fn cross(self, rhs: Self) -> f32 {
        self.x * rhs.y - self.y * rhs.x
    }

    pub fn norm(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Self {
        let n = self.norm();
        if n == 0.0 {
            Self::default()
        } else {
            self * (1.0 / n)
        }
    }
}

/// Integer pixel coordinate. Signed so that offsets and polygon arithmetic
/// never need casts back and forth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point2i {
    pub x: i32,
    pub y: i32,
}

impl Point2i {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_f32(self) -> Point2f {
        Point2f {
            x: self.x as f32,
            y: self.y as f32,
        }
    }
}

/// Straight pixel segment between two inclusive endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment2i {
    pub p0: Point2i,
    pub p1: Point2i,
}

impl Segment2i {
    pub fn new(p0: Point2i, p1: Point2i) -> Self {
        Self { p0, p1 }
    }

    pub fn direction(&self) -> Vec2f {
        self.p1.to_f32() - self.p0.to_f32()
    }

    pub fn length(&self) -> f32 {
        self.direction().norm()
    }

    /// Distance from `p` to the closest point of the segment.
    pub fn distance_to(&self, p: Point2f) -> f32 {
        let a = self.p0.to_f32();
        let d = self.direction();
        let len2 = d.dot(d);
        if len2 <= f32::EPSILON {
            return p.distance(a);
        }

        let t = ((p - a).dot(d) / len2).clamp(0.0, 1.0);
        p.distance(a + d * t)
    }
}

impl Add<Vec2f> for Point2f {
    type Output = Point2f;

    fn add(self, rhs: Vec2f) -> Self::Output {
        Point2f {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub<Point2f> for Point2f {
    type Output = Vec2f;

    fn sub(self, rhs: Point2f) -> Self::Output {
        Vec2f {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Add for Vec2f {
    type Output = Vec2f;

    fn add(self, rhs: Vec2f) -> Self::Output {
        Vec2f {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2f {
    type Output = Vec2f;

    fn sub(self, rhs: Vec2f) -> Self::Output {
        Vec2f {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2f {
    type Output = Vec2f;

    fn mul(self, rhs: f32) -> Self::Output {
        Vec2f {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Point2f, Point2i, Segment2i, Vec2f};

    #[test]
    fn vec_ops_and_normalize() {
        let a = Vec2f { x: 3.0, y: 4.0 };
        let b = Vec2f { x: 1.0, y: -2.0 };

        assert_eq!(a + b, Vec2f { x: 4.0, y: 2.0 });
        assert_eq!(a - b, Vec2f { x: 2.0, y: 6.0 });
        assert!((a.dot(b) + 5.0).abs() < 1e-6);
        assert!((a.cross(b) + 10.0).abs() < 1e-6);
        assert!((a.normalize().norm() - 1.0).abs() < 1e-6);
        assert_eq!(Vec2f::default().normalize(), Vec2f::default());
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let s = Segment2i::new(Point2i::new(0, 0), Point2i::new(10, 0));

        assert!((s.length() - 10.0).abs() < 1e-6);
        assert!((s.distance_to(Point2f::new(5.0, 3.0)) - 3.0).abs() < 1e-6);
        assert!((s.distance_to(Point2f::new(13.0, 4.0)) - 5.0).abs() < 1e-6);

        let dot = Segment2i::new(Point2i::new(2, 2), Point2i::new(2, 2));
        assert!((dot.distance_to(Point2f::new(2.0, 5.0)) - 3.0).abs() < 1e-6);
    }
}
