//! The single chokepoint for polygon set algebra.
//!
//! Every union, intersection, difference, and area measurement in the
//! workspace goes through this module, so the floating-point behaviour of
//! the underlying geometry library is confined to one place and the differ's
//! tolerance policy has a single enforcement point.
//!
//! Coordinates are planar equal-area kilometres, so areas come out in km².

use geo::{
  Area, BooleanOps, Centroid, Coord, LineString, MultiPolygon, Polygon,
  orient::{Direction, Orient},
};

// ─── Set algebra ─────────────────────────────────────────────────────────────

pub fn empty() -> MultiPolygon<f64> { MultiPolygon::new(Vec::new()) }

pub fn is_empty(shape: &MultiPolygon<f64>) -> bool { shape.0.is_empty() }

pub fn union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
  if is_empty(a) {
    return b.clone();
  }
  if is_empty(b) {
    return a.clone();
  }
  a.union(b)
}

pub fn intersection(
  a: &MultiPolygon<f64>,
  b: &MultiPolygon<f64>,
) -> MultiPolygon<f64> {
  if is_empty(a) || is_empty(b) {
    return empty();
  }
  a.intersection(b)
}

/// The part of `a` not covered by `b`.
pub fn difference(
  a: &MultiPolygon<f64>,
  b: &MultiPolygon<f64>,
) -> MultiPolygon<f64> {
  if is_empty(a) {
    return empty();
  }
  if is_empty(b) {
    return a.clone();
  }
  a.difference(b)
}

/// Union of an arbitrary number of shapes. Order-independent up to
/// floating-point noise; the differ's tolerance absorbs the rest.
pub fn union_all<'a, I>(shapes: I) -> MultiPolygon<f64>
where
  I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
  shapes
    .into_iter()
    .fold(empty(), |acc, shape| union(&acc, shape))
}

// ─── Measurement ─────────────────────────────────────────────────────────────

pub fn area_km2(shape: &MultiPolygon<f64>) -> f64 { shape.unsigned_area() }

pub fn centroid(shape: &MultiPolygon<f64>) -> Option<(f64, f64)> {
  shape.centroid().map(|p| (p.x(), p.y()))
}

// ─── Ring construction ───────────────────────────────────────────────────────

/// Build a polygon from raw coordinate rings: the first ring is the
/// exterior, any following rings are holes. Rings are closed if they arrive
/// open and the winding order is normalised.
///
/// Returns `None` when the exterior ring is degenerate (fewer than three
/// distinct vertices). Degenerate holes are dropped silently; the polygon
/// survives without them.
pub fn polygon_from_rings(rings: &[Vec<[f64; 2]>]) -> Option<Polygon<f64>> {
  let (first, rest) = rings.split_first()?;
  let exterior = ring_from_coords(first)?;
  let interiors: Vec<LineString<f64>> =
    rest.iter().filter_map(|r| ring_from_coords(r)).collect();
  Some(Polygon::new(exterior, interiors).orient(Direction::Default))
}

fn ring_from_coords(coords: &[[f64; 2]]) -> Option<LineString<f64>> {
  let mut points: Vec<Coord<f64>> = Vec::with_capacity(coords.len() + 1);
  for c in coords {
    let p = Coord { x: c[0], y: c[1] };
    if points.last() != Some(&p) {
      points.push(p);
    }
  }

  // Drop an explicit closing vertex; `close` re-adds it either way.
  if points.len() > 1 && points.first() == points.last() {
    points.pop();
  }
  if points.len() < 3 {
    return None;
  }

  let mut ring = LineString::from(points);
  ring.close();
  Some(ring)
}
