//! Geometry to shape-record conversion.
//!
//! The target format only knows straight and quadratic edges with integer twip deltas, so
//! cubic segments (from path data, ellipses and rounded corners) are approximated by
//! quadratics. Absolute positions are rounded to twips before deltas are taken, which keeps
//! rounding error from accumulating along long paths.

use std::f64::consts::{FRAC_PI_2, PI};

use kurbo::{Arc, CubicBez, Ellipse, PathEl, Shape as _};

use crate::{
    foundation::core::{BezPath, Point, Rect, TwipsRect, Vec2, to_twips},
    tags::model::{ShapeRecord, StyleChange},
};

/// Tolerance used for shapes built from straight segments only.
const STRAIGHT_TOLERANCE: f64 = 0.1;

/// Corner radii of a rounded rectangle, in pixels, clockwise from the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct CornerRadii {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_right: Vec2,
    pub bottom_left: Vec2,
}

struct RecordWriter {
    records: Vec<ShapeRecord>,
    cursor: (i32, i32),
    start: (i32, i32),
    cursor_px: Point,
    start_px: Point,
    tolerance: f64,
}

impl RecordWriter {
    fn new(tolerance: f64) -> Self {
        Self {
            records: Vec::new(),
            cursor: (0, 0),
            start: (0, 0),
            cursor_px: Point::ZERO,
            start_px: Point::ZERO,
            tolerance,
        }
    }

    fn move_to(&mut self, p: Point) {
        let t = twips(p);
        self.records
            .push(ShapeRecord::StyleChange(StyleChange::move_to(t.0, t.1)));
        self.cursor = t;
        self.start = t;
        self.cursor_px = p;
        self.start_px = p;
    }

    fn line_to(&mut self, p: Point) {
        let t = twips(p);
        let (dx, dy) = (t.0 - self.cursor.0, t.1 - self.cursor.1);
        if dx != 0 || dy != 0 {
            self.records.push(ShapeRecord::StraightEdge { dx, dy });
        }
        self.cursor = t;
        self.cursor_px = p;
    }

    fn quad_to(&mut self, c: Point, p: Point) {
        let ct = twips(c);
        let pt = twips(p);
        let control = (ct.0 - self.cursor.0, ct.1 - self.cursor.1);
        let anchor = (pt.0 - ct.0, pt.1 - ct.1);
        if control == (0, 0) || anchor == (0, 0) {
            // Degenerate after rounding: a straight edge is exact.
            self.line_to(p);
            return;
        }
        self.records.push(ShapeRecord::CurvedEdge {
            control_dx: control.0,
            control_dy: control.1,
            anchor_dx: anchor.0,
            anchor_dy: anchor.1,
        });
        self.cursor = pt;
        self.cursor_px = p;
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        let cubic = CubicBez::new(self.cursor_px, c1, c2, p);
        for (_, _, q) in cubic.to_quads(self.tolerance) {
            self.quad_to(q.p1, q.p2);
        }
        // Land exactly on the anchor even if the approximation drifted by rounding.
        self.line_to(p);
    }

    fn close(&mut self) {
        let start = self.start_px;
        self.line_to(start);
    }

    fn push_path(&mut self, els: impl IntoIterator<Item = PathEl>) {
        for el in els {
            match el {
                PathEl::MoveTo(p) => self.move_to(p),
                PathEl::LineTo(p) => self.line_to(p),
                PathEl::QuadTo(c, p) => self.quad_to(c, p),
                PathEl::CurveTo(c1, c2, p) => self.curve_to(c1, c2, p),
                PathEl::ClosePath => self.close(),
            }
        }
    }
}

fn twips(p: Point) -> (i32, i32) {
    (to_twips(p.x), to_twips(p.y))
}

/// Convert a path into shape records.
pub(crate) fn path_records(path: &BezPath, tolerance: f64) -> Vec<ShapeRecord> {
    let mut w = RecordWriter::new(tolerance);
    w.push_path(path.elements().iter().copied());
    w.records
}

/// Rectangle from the origin to `(width, height)`.
pub(crate) fn rectangle(width: f64, height: f64) -> Vec<ShapeRecord> {
    let rect = Rect::new(0.0, 0.0, width, height);
    let mut w = RecordWriter::new(STRAIGHT_TOLERANCE);
    w.push_path(rect.path_elements(STRAIGHT_TOLERANCE));
    w.records
}

/// Rectangle from the origin with elliptical corners.
///
/// Radii are clamped to half the rectangle size; a corner with a zero radius is square.
pub(crate) fn rounded_rectangle(
    width: f64,
    height: f64,
    radii: CornerRadii,
    tolerance: f64,
) -> Vec<ShapeRecord> {
    let clamp = |r: Vec2| Vec2::new(r.x.clamp(0.0, width / 2.0), r.y.clamp(0.0, height / 2.0));
    let tl = clamp(radii.top_left);
    let tr = clamp(radii.top_right);
    let br = clamp(radii.bottom_right);
    let bl = clamp(radii.bottom_left);

    let mut path = BezPath::new();
    path.move_to((tl.x, 0.0));
    path.line_to((width - tr.x, 0.0));
    corner(&mut path, (width - tr.x, tr.y), tr, -FRAC_PI_2, tolerance);
    path.line_to((width, height - br.y));
    corner(&mut path, (width - br.x, height - br.y), br, 0.0, tolerance);
    path.line_to((bl.x, height));
    corner(&mut path, (bl.x, height - bl.y), bl, FRAC_PI_2, tolerance);
    path.line_to((0.0, tl.y));
    corner(&mut path, (tl.x, tl.y), tl, PI, tolerance);
    path.close_path();

    path_records(&path, tolerance)
}

fn corner(
    path: &mut BezPath,
    center: (f64, f64),
    radii: Vec2,
    start_angle: f64,
    tolerance: f64,
) {
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return;
    }
    let arc = Arc {
        center: Point::from(center),
        radii,
        start_angle,
        sweep_angle: FRAC_PI_2,
        x_rotation: 0.0,
    };
    path.extend(arc.append_iter(tolerance));
}

/// Ellipse inscribed in the rectangle from the origin to `(width, height)`.
pub(crate) fn ellipse(width: f64, height: f64, tolerance: f64) -> Vec<ShapeRecord> {
    let e = Ellipse::from_rect(Rect::new(0.0, 0.0, width, height));
    let mut w = RecordWriter::new(tolerance);
    w.push_path(e.path_elements(tolerance));
    w.records
}

/// Single straight segment.
pub(crate) fn line(x_from: f64, y_from: f64, x_to: f64, y_to: f64) -> Vec<ShapeRecord> {
    let mut w = RecordWriter::new(STRAIGHT_TOLERANCE);
    w.move_to(Point::new(x_from, y_from));
    w.line_to(Point::new(x_to, y_to));
    w.records
}

/// Bounds of every point the records visit, control points included.
///
/// With `line_width` (twips), the result is grown by half the width on every side.
pub(crate) fn bounds(records: &[ShapeRecord], line_width: Option<u16>) -> TwipsRect {
    let mut cursor = (0, 0);
    let mut acc: Option<TwipsRect> = None;
    let mut visit = |p: (i32, i32)| {
        acc = Some(match acc {
            None => TwipsRect {
                x_min: p.0,
                x_max: p.0,
                y_min: p.1,
                y_max: p.1,
            },
            Some(r) => TwipsRect {
                x_min: r.x_min.min(p.0),
                x_max: r.x_max.max(p.0),
                y_min: r.y_min.min(p.1),
                y_max: r.y_max.max(p.1),
            },
        });
    };

    for record in records {
        match *record {
            ShapeRecord::StyleChange(sc) => {
                if let Some(p) = sc.move_to {
                    cursor = p;
                    visit(cursor);
                }
            }
            ShapeRecord::StraightEdge { dx, dy } => {
                visit(cursor);
                cursor = (cursor.0 + dx, cursor.1 + dy);
                visit(cursor);
            }
            ShapeRecord::CurvedEdge {
                control_dx,
                control_dy,
                anchor_dx,
                anchor_dy,
            } => {
                visit(cursor);
                let control = (cursor.0 + control_dx, cursor.1 + control_dy);
                visit(control);
                cursor = (control.0 + anchor_dx, control.1 + anchor_dy);
                visit(cursor);
            }
        }
    }

    let edge = acc.unwrap_or_default();
    match line_width {
        Some(w) => edge.inflate(i32::from(w.div_ceil(2))),
        None => edge,
    }
}

/// Apply style indices to the records.
///
/// The first style-change record always receives the styles (one is inserted if the records
/// start with an edge). With `every_subpath`, every later pen move restates them too.
pub(crate) fn set_styles(
    records: &mut Vec<ShapeRecord>,
    line_style: u32,
    fill_style0: u32,
    fill_style1: u32,
    every_subpath: bool,
) {
    if !matches!(records.first(), Some(ShapeRecord::StyleChange(_))) {
        records.insert(0, ShapeRecord::StyleChange(StyleChange::default()));
    }

    let mut first = true;
    for record in records.iter_mut() {
        if let ShapeRecord::StyleChange(sc) = record {
            if first || (every_subpath && sc.move_to.is_some()) {
                sc.line_style = Some(line_style);
                sc.fill_style0 = Some(fill_style0);
                sc.fill_style1 = Some(fill_style1);
            }
            first = false;
        }
    }
}

/// Nine-region mesh over a bitmap of `width` x `height` twips, split by `grid`.
///
/// Each region is bounded by edges whose left/right fill styles select one of nine
/// identical bitmap fills (1..=9, row-major), so the player can stretch regions
/// independently.
pub(crate) fn nine_slice_records(grid: TwipsRect, width: i32, height: i32) -> Vec<ShapeRecord> {
    let dxa = grid.x_min;
    let dxb = grid.x_max - grid.x_min;
    let dxc = width - grid.x_max;
    let dya = grid.y_min;
    let dyb = grid.y_max - grid.y_min;
    let dyc = height - grid.y_max;

    let styles = |fill0: Option<u32>, fill1: u32| {
        ShapeRecord::StyleChange(StyleChange {
            move_to: None,
            fill_style0: fill0,
            fill_style1: Some(fill1),
            line_style: None,
        })
    };
    let moved = |x: i32, y: i32, fill0: Option<u32>, fill1: u32| {
        ShapeRecord::StyleChange(StyleChange {
            move_to: Some((x, y)),
            fill_style0: fill0,
            fill_style1: Some(fill1),
            line_style: None,
        })
    };
    let edge = |dx: i32, dy: i32| ShapeRecord::StraightEdge { dx, dy };

    vec![
        // Outer border, clockwise from the left edge of the top row.
        moved(0, dya, None, 1),
        edge(0, -dya),
        edge(dxa, 0),
        styles(None, 2),
        edge(dxb, 0),
        styles(None, 3),
        edge(dxc, 0),
        edge(0, dya),
        styles(None, 6),
        edge(0, dyb),
        styles(None, 9),
        edge(0, dyc),
        edge(-dxc, 0),
        styles(None, 8),
        edge(-dxb, 0),
        styles(None, 7),
        edge(-dxa, 0),
        edge(0, -dyc),
        styles(None, 4),
        edge(0, -dyb),
        // First vertical splitter.
        moved(dxa, 0, Some(2), 1),
        edge(0, dya),
        styles(Some(5), 4),
        edge(0, dyb),
        styles(Some(8), 7),
        edge(0, dyc),
        // Second vertical splitter.
        moved(dxa + dxb, 0, Some(3), 2),
        edge(0, dya),
        styles(Some(6), 5),
        edge(0, dyb),
        styles(Some(9), 8),
        edge(0, dyc),
        // First horizontal splitter.
        moved(0, dya, Some(1), 4),
        edge(dxa, 0),
        styles(Some(2), 5),
        edge(dxb, 0),
        styles(Some(3), 6),
        edge(dxc, 0),
        // Second horizontal splitter.
        moved(0, dya + dyb, Some(4), 7),
        edge(dxa, 0),
        styles(Some(5), 8),
        edge(dxb, 0),
        styles(Some(6), 9),
        edge(dxc, 0),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/tags/shape.rs"]
mod tests;
