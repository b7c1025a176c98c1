use super::ScreenPoint;

/// Ray-casting point-in-polygon test.
///
/// Casts a horizontal ray towards `+x` and counts edge crossings; odd parity
/// means inside. Each vertex is paired with its predecessor, so the polygon
/// is closed implicitly from the last vertex back to the first. Polygons with
/// fewer than 3 vertices contain nothing.
///
/// Points exactly on an edge or vertex fall on either side depending on the
/// half-open `>` comparison; callers must not rely on boundary results.
#[must_use]
pub fn point_in_polygon(point: &ScreenPoint, polygon: &[ScreenPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for (i, pi) in polygon.iter().enumerate() {
        let pj = &polygon[j];
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
