//! Intersection geometry and grid cell synthesis

use super::lines::LineSegment;
use crate::config::VisionConfig;

/// Pixel-space point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

impl PixelPoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: &PixelPoint) -> u64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        (dx * dx + dy * dy) as u64
    }
}

/// One detected grid cell, recomputed every frame
#[derive(Debug, Clone)]
pub struct Cell {
    pub center: PixelPoint,
    pub corners: [PixelPoint; 4],
    /// Detector-local row index (block position, not a grid coordinate)
    pub row: usize,
    /// Detector-local column index
    pub col: usize,
}

/// Intersections of horizontal and vertical line segments.
///
/// A pair intersects when the vertical line's midpoint X falls within the
/// horizontal line's X-span and the horizontal line's midpoint Y within
/// the vertical line's Y-span; the midpoint pair is the intersection.
pub fn intersections(horizontal: &[LineSegment], vertical: &[LineSegment]) -> Vec<PixelPoint> {
    let mut points = Vec::new();
    for h in horizontal {
        let h_y = h.mid_y();
        for v in vertical {
            let v_x = v.mid_x();
            if h.x0 <= v_x && v_x <= h.x1 && v.y0 <= h_y && h_y <= v.y1 {
                points.push(PixelPoint::new(v_x, h_y));
            }
        }
    }
    points
}

/// Greedy de-duplication in discovery order, applied only when the raw
/// count exceeds the noise threshold.
pub fn dedup(points: Vec<PixelPoint>, config: &VisionConfig) -> Vec<PixelPoint> {
    if points.len() <= config.dedup_threshold {
        return points;
    }

    let min_sq = (config.dedup_distance_px * config.dedup_distance_px) as u64;
    let mut kept: Vec<PixelPoint> = Vec::with_capacity(points.len());
    for point in points {
        if kept.iter().all(|k| k.distance_sq(&point) >= min_sq) {
            kept.push(point);
        }
    }
    kept
}

/// Cluster intersections into rows.
///
/// Points are sorted by (Y, X); a new row starts whenever Y jumps by more
/// than the row tolerance from the previous point. Each row is kept
/// X-sorted.
pub fn cluster_rows(mut points: Vec<PixelPoint>, row_tolerance: u32) -> Vec<Vec<PixelPoint>> {
    if points.is_empty() {
        return Vec::new();
    }
    points.sort_by_key(|p| (p.y, p.x));

    let mut rows: Vec<Vec<PixelPoint>> = Vec::new();
    let mut current = vec![points[0]];
    let mut last_y = points[0].y;

    for point in points.into_iter().skip(1) {
        if point.y.abs_diff(last_y) > row_tolerance {
            current.sort_by_key(|p| p.x);
            rows.push(std::mem::take(&mut current));
        }
        last_y = point.y;
        current.push(point);
    }
    current.sort_by_key(|p| p.x);
    rows.push(current);

    rows
}

/// Synthesize cells from every 2x2 block of adjacent intersections across
/// consecutive rows. The shorter of the two rows bounds the iteration, so
/// uneven row lengths never index out of range.
pub fn synthesize_cells(rows: &[Vec<PixelPoint>]) -> Vec<Cell> {
    let mut cells = Vec::new();
    for i in 0..rows.len().saturating_sub(1) {
        let cols = rows[i].len().min(rows[i + 1].len());
        for j in 0..cols.saturating_sub(1) {
            let top_left = rows[i][j];
            let top_right = rows[i][j + 1];
            let bottom_left = rows[i + 1][j];
            let bottom_right = rows[i + 1][j + 1];

            let center = PixelPoint::new(
                (top_left.x + top_right.x + bottom_left.x + bottom_right.x) / 4,
                (top_left.y + top_right.y + bottom_left.y + bottom_right.y) / 4,
            );
            cells.push(Cell {
                center,
                corners: [top_left, top_right, bottom_left, bottom_right],
                row: i,
                col: j,
            });
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(x0: u32, y0: u32, x1: u32, y1: u32) -> LineSegment {
        LineSegment { x0, y0, x1, y1 }
    }

    #[test]
    fn test_intersections_accept_crossing_pairs() {
        let horizontal = [segment(0, 48, 200, 52)];
        let vertical = [segment(98, 0, 102, 200), segment(300, 0, 304, 200)];

        let points = intersections(&horizontal, &vertical);
        // Second vertical line is outside the horizontal span
        assert_eq!(points, vec![PixelPoint::new(100, 50)]);
    }

    #[test]
    fn test_intersections_reject_disjoint_spans() {
        let horizontal = [segment(0, 48, 200, 52)];
        // Vertical line ends above the horizontal line
        let vertical = [segment(98, 0, 102, 30)];
        assert!(intersections(&horizontal, &vertical).is_empty());
    }

    #[test]
    fn test_dedup_only_above_threshold() {
        let config = VisionConfig {
            dedup_distance_px: 5.0,
            dedup_threshold: 3,
            ..VisionConfig::default()
        };

        let close_pair = vec![
            PixelPoint::new(10, 10),
            PixelPoint::new(12, 10),
            PixelPoint::new(100, 100),
        ];
        // At or below the threshold the raw set passes through
        assert_eq!(dedup(close_pair.clone(), &config).len(), 3);

        let mut noisy = close_pair;
        noisy.push(PixelPoint::new(101, 101));
        let kept = dedup(noisy, &config);
        // (12,10) and (101,101) fold into their earlier neighbors
        assert_eq!(
            kept,
            vec![PixelPoint::new(10, 10), PixelPoint::new(100, 100)]
        );
    }

    #[test]
    fn test_cluster_rows_groups_by_y() {
        let points = vec![
            PixelPoint::new(90, 51),
            PixelPoint::new(10, 50),
            PixelPoint::new(10, 120),
            PixelPoint::new(90, 119),
        ];
        let rows = cluster_rows(points, 10);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![PixelPoint::new(10, 50), PixelPoint::new(90, 51)]);
        assert_eq!(
            rows[1],
            vec![PixelPoint::new(10, 120), PixelPoint::new(90, 119)]
        );
    }

    #[test]
    fn test_synthesize_cells_from_grid() {
        let rows = vec![
            vec![
                PixelPoint::new(0, 0),
                PixelPoint::new(100, 0),
                PixelPoint::new(200, 0),
            ],
            vec![
                PixelPoint::new(0, 100),
                PixelPoint::new(100, 100),
                PixelPoint::new(200, 100),
            ],
        ];
        let cells = synthesize_cells(&rows);

        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].center, PixelPoint::new(50, 50));
        assert_eq!(cells[0].row, 0);
        assert_eq!(cells[0].col, 0);
        assert_eq!(cells[1].center, PixelPoint::new(150, 50));
        assert_eq!(cells[1].col, 1);
    }

    #[test]
    fn test_synthesize_cells_bounded_by_shorter_row() {
        let rows = vec![
            vec![
                PixelPoint::new(0, 0),
                PixelPoint::new(100, 0),
                PixelPoint::new(200, 0),
            ],
            vec![PixelPoint::new(0, 100), PixelPoint::new(100, 100)],
        ];
        let cells = synthesize_cells(&rows);
        assert_eq!(cells.len(), 1);

        // A single row can never form a block
        assert!(synthesize_cells(&rows[..1]).is_empty());
    }
}
