//! Raw contour tracing.
//!
//! The pipeline only depends on the [`RawTracer`] contract: a flattened grid
//! plus ascending thresholds in, per-threshold rings in fractional grid
//! coordinates out. [`MarchingSquares`] is the bundled implementation.

/// A point in fractional grid coordinates (`col` along years, `row` along ages).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub col: f64,
    pub row: f64,
}

impl GridPoint {
    pub fn new(col: f64, row: f64) -> Self {
        Self { col, row }
    }

    pub fn is_finite(&self) -> bool {
        self.col.is_finite() && self.row.is_finite()
    }
}

/// A line segment between two grid points.
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: GridPoint,
    pub end: GridPoint,
}

/// One traced ring. Closed rings may repeat their first point at the end.
#[derive(Debug, Clone)]
pub struct Ring {
    pub points: Vec<GridPoint>,
    pub closed: bool,
}

/// A traced polygon: an outer ring plus any holes.
pub type Polygon = Vec<Ring>;

/// Tracer output for one threshold.
#[derive(Debug, Clone)]
pub struct TracedLevel {
    pub level: f64,
    pub polygons: Vec<Polygon>,
}

/// Maps a scalar grid and thresholds to rings in grid coordinates.
///
/// `values` is row-major with `cols * rows` entries; missing samples are
/// non-finite. Implementations return one [`TracedLevel`] per input level,
/// in input order.
pub trait RawTracer {
    fn trace(&self, values: &[f64], cols: usize, rows: usize, levels: &[f64])
        -> Vec<TracedLevel>;
}

/// Marching squares with linear edge interpolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarchingSquares;

impl RawTracer for MarchingSquares {
    fn trace(
        &self,
        values: &[f64],
        cols: usize,
        rows: usize,
        levels: &[f64],
    ) -> Vec<TracedLevel> {
        levels
            .iter()
            .map(|&level| {
                let segments = march_squares(values, cols, rows, level);
                let polygons = connect_segments(&segments)
                    .into_iter()
                    .map(|ring| vec![ring])
                    .collect();
                TracedLevel { level, polygons }
            })
            .collect()
    }
}

/// Segments of the `level` isoline, one or two per grid cell.
///
/// Cells with a missing corner are skipped. A corner counts as "above" when
/// its value is at or above the level.
pub fn march_squares(data: &[f64], width: usize, height: usize, level: f64) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return vec![];
    }

    let mut segments = Vec::new();

    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];

            if !(tl.is_finite() && tr.is_finite() && bl.is_finite() && br.is_finite()) {
                continue;
            }

            let mut cell_index = 0u8;
            if tl >= level {
                cell_index |= 1;
            }
            if tr >= level {
                cell_index |= 2;
            }
            if br >= level {
                cell_index |= 4;
            }
            if bl >= level {
                cell_index |= 8;
            }

            segments.extend(cell_segments(
                cell_index, x as f64, y as f64, tl, tr, br, bl, level,
            ));
        }
    }

    segments
}

fn cell_segments(
    cell_index: u8,
    x: f64,
    y: f64,
    tl: f64,
    tr: f64,
    br: f64,
    bl: f64,
    level: f64,
) -> Vec<Segment> {
    let top = interpolate_edge(x, y, x + 1.0, y, tl, tr, level);
    let right = interpolate_edge(x + 1.0, y, x + 1.0, y + 1.0, tr, br, level);
    let bottom = interpolate_edge(x, y + 1.0, x + 1.0, y + 1.0, bl, br, level);
    let left = interpolate_edge(x, y, x, y + 1.0, tl, bl, level);

    let seg = |start, end| Segment { start, end };
    match cell_index {
        0 | 15 => vec![],
        1 | 14 => vec![seg(left, top)],
        2 | 13 => vec![seg(top, right)],
        3 | 12 => vec![seg(left, right)],
        4 | 11 => vec![seg(right, bottom)],
        // Saddles: disambiguate with the cell centre average.
        5 => {
            if (tl + tr + br + bl) / 4.0 >= level {
                vec![seg(left, bottom), seg(top, right)]
            } else {
                vec![seg(left, top), seg(right, bottom)]
            }
        }
        6 | 9 => vec![seg(top, bottom)],
        7 | 8 => vec![seg(left, bottom)],
        10 => {
            if (tl + tr + br + bl) / 4.0 >= level {
                vec![seg(left, top), seg(right, bottom)]
            } else {
                vec![seg(top, right), seg(left, bottom)]
            }
        }
        _ => vec![],
    }
}

fn interpolate_edge(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    val1: f64,
    val2: f64,
    level: f64,
) -> GridPoint {
    if (val2 - val1).abs() < 1e-12 {
        return GridPoint::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);
    GridPoint::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}

const JOIN_EPSILON: f64 = 1e-9;

fn same_point(a: GridPoint, b: GridPoint) -> bool {
    (a.col - b.col).abs() < JOIN_EPSILON && (a.row - b.row).abs() < JOIN_EPSILON
}

/// Chain unordered segments into rings, growing each ring at both ends.
pub fn connect_segments(segments: &[Segment]) -> Vec<Ring> {
    let mut rings = Vec::new();
    let mut used = vec![false; segments.len()];

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }
        used[start_idx] = true;

        let mut forward = vec![segments[start_idx].start, segments[start_idx].end];
        extend_chain(&mut forward, segments, &mut used);

        let closes = |pts: &[GridPoint]| pts.len() > 3 && same_point(pts[0], pts[pts.len() - 1]);
        let points = if closes(&forward) {
            forward
        } else {
            let mut backward = vec![forward[0]];
            extend_chain(&mut backward, segments, &mut used);
            backward.reverse();
            backward.extend_from_slice(&forward[1..]);
            backward
        };

        let closed = closes(&points);
        rings.push(Ring { points, closed });
    }

    rings
}

fn extend_chain(points: &mut Vec<GridPoint>, segments: &[Segment], used: &mut [bool]) {
    loop {
        let Some(&tail) = points.last() else {
            return;
        };
        let next = segments.iter().enumerate().find_map(|(i, seg)| {
            if used[i] {
                None
            } else if same_point(seg.start, tail) {
                Some((i, seg.end))
            } else if same_point(seg.end, tail) {
                Some((i, seg.start))
            } else {
                None
            }
        });
        match next {
            Some((i, point)) => {
                used[i] = true;
                points.push(point);
            }
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_edge() {
        let p = interpolate_edge(0.0, 0.0, 1.0, 0.0, 0.0, 10.0, 5.0);
        assert!((p.col - 0.5).abs() < 1e-12);
        assert_eq!(p.row, 0.0);
    }

    #[test]
    fn test_march_squares_flat() {
        let data = vec![5.0; 9];
        assert!(march_squares(&data, 3, 3, 5.0).is_empty());
    }

    #[test]
    fn test_march_squares_skips_missing() {
        let data = vec![f64::NAN, 10.0, 0.0, 10.0];
        assert!(march_squares(&data, 2, 2, 5.0).is_empty());
    }

    #[test]
    fn test_peak_traces_one_closed_ring() {
        let data = vec![
            0.0, 0.0, 0.0, //
            0.0, 10.0, 0.0, //
            0.0, 0.0, 0.0,
        ];
        let traced = MarchingSquares.trace(&data, 3, 3, &[5.0]);
        assert_eq!(traced.len(), 1);
        assert_eq!(traced[0].polygons.len(), 1);
        let ring = &traced[0].polygons[0][0];
        assert!(ring.closed);
        assert_eq!(ring.points.len(), 5);
    }

    #[test]
    fn test_chain_grows_both_ends() {
        // Three collinear segments handed over middle-first.
        let segments = vec![
            Segment { start: GridPoint::new(1.0, 0.0), end: GridPoint::new(2.0, 0.0) },
            Segment { start: GridPoint::new(0.0, 0.0), end: GridPoint::new(1.0, 0.0) },
            Segment { start: GridPoint::new(2.0, 0.0), end: GridPoint::new(3.0, 0.0) },
        ];
        let rings = connect_segments(&segments);
        assert_eq!(rings.len(), 1);
        assert!(!rings[0].closed);
        let cols: Vec<f64> = rings[0].points.iter().map(|p| p.col).collect();
        assert_eq!(cols, vec![0.0, 1.0, 2.0, 3.0]);
    }
}
