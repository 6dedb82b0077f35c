use pd_core::Point2i;

pub type ContourId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub id: ContourId,
    /// Closed border; the last point connects back to the first.
    pub points: Vec<Point2i>,
    pub area: f64,
    pub perimeter: f64,
}

impl Contour {
    pub fn circularity(&self) -> f64 {
        circularity(self.area, self.perimeter)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Arena of contours; a contour's id is its index in the set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourSet {
    pub width: usize,
    pub height: usize,
    contours: Vec<Contour>,
}

impl ContourSet {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            contours: Vec::new(),
        }
    }

    /// Appends a closed border and measures it.
    pub fn push(&mut self, points: Vec<Point2i>) -> ContourId {
        let id = self.contours.len();
        let area = polygon_area(&points);
        let perimeter = polygon_perimeter(&points);
        self.contours.push(Contour {
            id,
            points,
            area,
            perimeter,
        });
        id
    }

    pub fn get(&self, id: ContourId) -> Option<&Contour> {
        self.contours.get(id)
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contour> {
        self.contours.iter()
    }

    pub fn as_slice(&self) -> &[Contour] {
        &self.contours
    }

    /// New set holding the contours that satisfy `keep`, renumbered in order.
    pub fn filtered(&self, mut keep: impl FnMut(&Contour) -> bool) -> ContourSet {
        let mut out = ContourSet::new(self.width, self.height);
        for c in self.contours.iter().filter(|c| keep(c)) {
            let id = out.contours.len();
            out.contours.push(Contour { id, ..c.clone() });
        }
        out
    }
}

/// Absolute shoelace area of a closed polygon.
pub fn polygon_area(points: &[Point2i]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut twice = 0i64;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    0.5 * twice.abs() as f64
}

/// Length of the closed polyline through `points`.
pub fn polygon_perimeter(points: &[Point2i]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let b = points[(i + 1) % points.len()];
            let dx = (b.x - a.x) as f64;
            let dy = (b.y - a.y) as f64;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

/// `4π·area / (perimeter² + 1e-5)`; 1 for a disk, smaller for elongated shapes.
pub fn circularity(area: f64, perimeter: f64) -> f64 {
    4.0 * std::f64::consts::PI * area / (perimeter * perimeter + 1e-5)
}
