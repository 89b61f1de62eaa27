use super::Point;

/// Four corner points delimiting one detected code
///
/// Order follows the engine that produced it (usually top-left, top-right,
/// bottom-right, bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quad {
    /// Corner points in image coordinates
    pub corners: [Point; 4],
}

impl Quad {
    /// Create a quad from four corners
    pub fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Average of the four corners
    pub fn center(&self) -> Point {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }

    /// Scale every corner by `factor`
    pub fn scale(&self, factor: f32) -> Self {
        Self {
            corners: self.corners.map(|p| p.scale(factor)),
        }
    }

    /// Scale x coordinates by `sx` and y coordinates by `sy`
    pub fn scale_xy(&self, sx: f32, sy: f32) -> Self {
        Self {
            corners: self.corners.map(|p| p.scale_xy(sx, sy)),
        }
    }
}

/// Engine-neutral corner geometry: one quad per detected code
///
/// Single-code engines report a flat list of points; multi-code engines report
/// one point container per code. Both shapes are folded into this type at the
/// engine boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CornerGeometry {
    quads: Vec<Quad>,
}

impl CornerGeometry {
    /// Geometry from per-code quads
    pub fn from_quads(quads: Vec<Quad>) -> Self {
        Self { quads }
    }

    /// Geometry from a flat point list; every four consecutive points form one
    /// quad and a trailing partial group is dropped
    pub fn from_flat_points(points: &[Point]) -> Self {
        let quads = points
            .chunks_exact(4)
            .map(|c| Quad::new([c[0], c[1], c[2], c[3]]))
            .collect();
        Self { quads }
    }

    /// Per-code quads
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// All corners as one flat list
    pub fn flat_points(&self) -> Vec<Point> {
        self.quads.iter().flat_map(|q| q.corners).collect()
    }

    /// Number of codes described
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Whether no code is described
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Scale every corner by `factor`
    pub fn scale(&self, factor: f32) -> Self {
        Self {
            quads: self.quads.iter().map(|q| q.scale(factor)).collect(),
        }
    }

    /// Per-axis scale, for mapping between images resized unevenly
    pub fn scale_xy(&self, sx: f32, sy: f32) -> Self {
        Self {
            quads: self.quads.iter().map(|q| q.scale_xy(sx, sy)).collect(),
        }
    }
}

/// Outcome of one decode attempt
///
/// An empty `texts` means "no code found"; it is a normal negative result,
/// not an error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detection {
    /// Decoded payloads, one per code, empty strings filtered out
    pub texts: Vec<String>,
    /// Corner geometry when it was requested and the engine reported it
    pub geometry: Option<CornerGeometry>,
}

impl Detection {
    /// Attempt that found nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a detection, dropping empty payloads
    pub fn new(texts: Vec<String>, geometry: Option<CornerGeometry>) -> Self {
        let texts = texts.into_iter().filter(|t| !t.is_empty()).collect();
        Self { texts, geometry }
    }

    /// Whether at least one payload was decoded
    pub fn is_found(&self) -> bool {
        !self.texts.is_empty()
    }
}
