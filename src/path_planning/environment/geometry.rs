//! Geometry primitives: workspace rectangle and half-space obstacles

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::common::{PlanningError, PlanningResult, Point2D};

/// Absolute tolerance on the workspace border; points this close count as out
pub const WORKSPACE_TOLERANCE: f64 = 0.1;
/// Absolute tolerance on half-space rows
pub const HALF_SPACE_ATOL: f64 = 1.0e-5;
/// Relative tolerance on half-space rows
pub const HALF_SPACE_RTOL: f64 = 1.0e-5;
/// Polygons with no more area than this are degenerate
pub const MIN_POLYGON_AREA: f64 = 1.0e-9;

/// `|a - b| <= atol + rtol * |b|`
#[inline]
pub fn is_close(a: f64, b: f64, atol: f64, rtol: f64) -> bool {
    (a - b).abs() <= atol + rtol * b.abs()
}

/// Rectangular workspace bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl WorkspaceBounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> PlanningResult<Self> {
        let bounds = WorkspaceBounds { x_min, x_max, y_min, y_max };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn from_array(area: [f64; 4]) -> PlanningResult<Self> {
        Self::new(area[0], area[1], area[2], area[3])
    }

    pub fn validate(&self) -> PlanningResult<()> {
        let finite = [self.x_min, self.x_max, self.y_min, self.y_max, self.width(), self.height()]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(PlanningError::InvalidParameter(format!(
                "workspace bounds and extent must be finite, got {:?}",
                self
            )));
        }
        if !(self.x_min < self.x_max) || !(self.y_min < self.y_max) {
            return Err(PlanningError::InvalidParameter(format!(
                "workspace bounds must satisfy x_min < x_max and y_min < y_max, got {:?}",
                self
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// True iff `point` is strictly inside the rectangle and further than
    /// [`WORKSPACE_TOLERANCE`] from every border.
    pub fn contains(&self, point: Point2D) -> bool {
        let axis_out = |v: f64, lo: f64, hi: f64| {
            v < lo
                || is_close(v, lo, WORKSPACE_TOLERANCE, 0.0)
                || v > hi
                || is_close(v, hi, WORKSPACE_TOLERANCE, 0.0)
        };
        !(axis_out(point.x, self.x_min, self.x_max) || axis_out(point.y, self.y_min, self.y_max))
    }

    /// Corners in counter-clockwise order, starting at (x_min, y_min)
    pub fn corners(&self) -> [Point2D; 4] {
        [
            Point2D::new(self.x_min, self.y_min),
            Point2D::new(self.x_max, self.y_min),
            Point2D::new(self.x_max, self.y_max),
            Point2D::new(self.x_min, self.y_max),
        ]
    }
}

/// Convex polygonal obstacle `{ p : N·p + b >= 0 }`.
///
/// Each row of `N` is an edge normal pointing into the obstacle. The boundary
/// vertices, when known, are only kept for plotting.
#[derive(Debug, Clone)]
pub struct HalfSpaceObstacle {
    normals: DMatrix<f64>,
    offsets: DVector<f64>,
    vertices: Vec<Point2D>,
}

impl HalfSpaceObstacle {
    pub fn new(normals: DMatrix<f64>, offsets: DVector<f64>) -> PlanningResult<Self> {
        if normals.ncols() != 2 {
            return Err(PlanningError::InvalidObstacle(format!(
                "normal matrix must have 2 columns, got {}",
                normals.ncols()
            )));
        }
        if normals.nrows() != offsets.len() {
            return Err(PlanningError::InvalidObstacle(format!(
                "{} normal rows but {} offsets",
                normals.nrows(),
                offsets.len()
            )));
        }
        if normals.nrows() == 0 {
            return Err(PlanningError::InvalidObstacle("no half-spaces".to_string()));
        }
        Ok(HalfSpaceObstacle {
            normals,
            offsets,
            vertices: Vec::new(),
        })
    }

    pub fn from_arrays(normals: &[[f64; 2]], offsets: &[f64]) -> PlanningResult<Self> {
        let n = DMatrix::from_fn(normals.len(), 2, |i, j| normals[i][j]);
        let b = DVector::from_column_slice(offsets);
        Self::new(n, b)
    }

    /// Build the half-space system of a convex polygon.
    ///
    /// Vertices may be given in either winding order. Repeated vertices are
    /// dropped; what remains must enclose a non-zero area.
    pub fn from_vertices(vertices: &[Point2D]) -> PlanningResult<Self> {
        let mut ccw: Vec<Point2D> = Vec::with_capacity(vertices.len());
        for v in vertices {
            if ccw.last().map_or(true, |last| last != v) {
                ccw.push(*v);
            }
        }
        while ccw.len() > 1 && ccw.first() == ccw.last() {
            ccw.pop();
        }

        if ccw.len() < 3 {
            return Err(PlanningError::InvalidObstacle(format!(
                "polygon needs at least 3 distinct vertices, got {}",
                ccw.len()
            )));
        }

        let area = signed_area(&ccw);
        if !area.is_finite() || area.abs() <= MIN_POLYGON_AREA {
            return Err(PlanningError::InvalidObstacle(format!(
                "polygon is degenerate, area {}",
                area
            )));
        }
        if area < 0.0 {
            ccw.reverse();
        }

        let k = ccw.len();
        let mut normals = DMatrix::zeros(k, 2);
        let mut offsets = DVector::zeros(k);
        for i in 0..k {
            let a = ccw[i];
            let b = ccw[(i + 1) % k];
            let (dx, dy) = (b.x - a.x, b.y - a.y);
            // left of a->b is inside for a counter-clockwise polygon
            normals[(i, 0)] = -dy;
            normals[(i, 1)] = dx;
            offsets[i] = dy * a.x - dx * a.y;
        }

        let mut obstacle = Self::new(normals, offsets)?;
        if !ccw.iter().all(|v| obstacle.contains(*v)) {
            return Err(PlanningError::InvalidObstacle(
                "polygon is not convex".to_string(),
            ));
        }
        obstacle.vertices = ccw;
        Ok(obstacle)
    }

    /// True iff every row satisfies `N_i·p + b_i >= 0`, or is within tolerance of zero
    pub fn contains(&self, point: Point2D) -> bool {
        self.normals
            .row_iter()
            .zip(self.offsets.iter())
            .all(|(row, b)| {
                let v = row[0] * point.x + row[1] * point.y + b;
                v >= 0.0 || is_close(v, 0.0, HALF_SPACE_ATOL, HALF_SPACE_RTOL)
            })
    }

    pub fn normals(&self) -> &DMatrix<f64> {
        &self.normals
    }

    pub fn offsets(&self) -> &DVector<f64> {
        &self.offsets
    }

    pub fn num_edges(&self) -> usize {
        self.offsets.len()
    }

    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    /// Vertex centroid, None when the vertices are unknown
    pub fn centroid(&self) -> Option<Point2D> {
        if self.vertices.is_empty() {
            return None;
        }
        let n = self.vertices.len() as f64;
        let sx: f64 = self.vertices.iter().map(|v| v.x).sum();
        let sy: f64 = self.vertices.iter().map(|v| v.y).sum();
        Some(Point2D::new(sx / n, sy / n))
    }
}

/// Workspace membership of a point
pub fn in_workspace(bounds: &WorkspaceBounds, point: Point2D) -> bool {
    bounds.contains(point)
}

/// Convex-polygon containment of a point
pub fn inside_obstacle(obstacle: &HalfSpaceObstacle, point: Point2D) -> bool {
    obstacle.contains(point)
}

fn signed_area(vertices: &[Point2D]) -> f64 {
    let k = vertices.len();
    (0..k)
        .map(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % k];
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> HalfSpaceObstacle {
        HalfSpaceObstacle::from_arrays(
            &[[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0]],
            &[0.5, 0.5, 0.5, 0.5],
        )
        .unwrap()
    }

    #[test]
    fn test_square_containment() {
        let square = unit_square();
        assert!(inside_obstacle(&square, Point2D::new(0.0, 0.0)));
        assert!(inside_obstacle(&square, Point2D::new(0.49, -0.49)));
        assert!(!inside_obstacle(&square, Point2D::new(10.0, 10.0)));
        assert!(!inside_obstacle(&square, Point2D::new(0.6, 0.0)));
    }

    #[test]
    fn test_square_boundary_within_tolerance() {
        let square = unit_square();
        assert!(square.contains(Point2D::new(0.5, 0.5)));
        assert!(square.contains(Point2D::new(0.5 + 5.0e-6, 0.0)));
        assert!(!square.contains(Point2D::new(0.5 + 1.0e-3, 0.0)));
    }

    #[test]
    fn test_mismatched_rows_rejected() {
        let err = HalfSpaceObstacle::from_arrays(&[[1.0, 0.0], [0.0, 1.0]], &[0.5]).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidObstacle(_)));

        let err = HalfSpaceObstacle::new(DMatrix::zeros(3, 3), DVector::zeros(3)).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidObstacle(_)));

        let err = HalfSpaceObstacle::from_arrays(&[], &[]).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidObstacle(_)));
    }

    #[test]
    fn test_from_vertices_matches_half_spaces() {
        let cw = [
            Point2D::new(-0.5, -0.5),
            Point2D::new(-0.5, 0.5),
            Point2D::new(0.5, 0.5),
            Point2D::new(0.5, -0.5),
        ];
        let square = HalfSpaceObstacle::from_vertices(&cw).unwrap();
        assert_eq!(square.num_edges(), 4);
        assert!(square.contains(Point2D::new(0.0, 0.0)));
        assert!(square.contains(Point2D::new(0.5, 0.5)));
        assert!(!square.contains(Point2D::new(0.0, 0.7)));

        let c = square.centroid().unwrap();
        assert!(c.x.abs() < 1e-12 && c.y.abs() < 1e-12);
    }

    #[test]
    fn test_from_vertices_rejects_concave() {
        let dart = [
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 1.0),
            Point2D::new(0.0, 2.0),
            Point2D::new(0.5, 1.0),
        ];
        assert!(HalfSpaceObstacle::from_vertices(&dart).is_err());
        assert!(HalfSpaceObstacle::from_vertices(&dart[..2]).is_err());
    }

    #[test]
    fn test_from_vertices_rejects_degenerate() {
        let collinear = [Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(2.0, 0.0)];
        let err = HalfSpaceObstacle::from_vertices(&collinear).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidObstacle(_)));

        let repeated = [Point2D::new(0.0, 0.0), Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0)];
        assert!(HalfSpaceObstacle::from_vertices(&repeated).is_err());
    }

    #[test]
    fn test_from_vertices_drops_repeated_vertices() {
        let square = HalfSpaceObstacle::from_vertices(&[
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(square.num_edges(), 4);
        assert_eq!(square.vertices().len(), 4);
        assert!(square.contains(Point2D::new(0.5, 0.5)));
        assert!(!square.contains(Point2D::new(100.0, 0.0)));
        assert!(!square.contains(Point2D::new(2.0, 0.5)));
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        // finite bounds whose width overflows
        let err = WorkspaceBounds::new(-1.0e308, 1.0e308, 0.0, 10.0).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidParameter(_)));
        assert!(WorkspaceBounds::new(0.0, 10.0, -1.0e308, 1.0e308).is_err());
        assert!(WorkspaceBounds::new(f64::NEG_INFINITY, 10.0, 0.0, 10.0).is_err());
        assert!(WorkspaceBounds::new(0.0, f64::INFINITY, 0.0, 10.0).is_err());
        assert!(WorkspaceBounds::new(0.0, 1.0e300, 0.0, 10.0).is_ok());
    }

    #[test]
    fn test_workspace_boundary_is_out() {
        let bounds = WorkspaceBounds::new(0.0, 10.0, 0.0, 10.0).unwrap();
        assert!(in_workspace(&bounds, Point2D::new(5.0, 5.0)));
        assert!(!in_workspace(&bounds, Point2D::new(10.0, 5.0)));
        assert!(!in_workspace(&bounds, Point2D::new(5.0, 0.05)));
        assert!(!in_workspace(&bounds, Point2D::new(-1.0, 5.0)));
        assert!(in_workspace(&bounds, Point2D::new(0.2, 9.8)));
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(WorkspaceBounds::new(1.0, 1.0, 0.0, 1.0).is_err());
        assert!(WorkspaceBounds::new(0.0, 1.0, 2.0, 1.0).is_err());
        assert!(WorkspaceBounds::new(0.0, f64::NAN, 0.0, 1.0).is_err());
    }
}
