//! Utilities for fuzz and/or property testing using `arbitrary`.

use arbitrary::Unstructured;

use crate::{geom::Point, geom::Segment, input::Scene, segments::Segments};

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

fn float(u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    float_in_range(-1e3, 1e3, u)
}

/// Generate a float in some range, but give it a chance to be close to another float.
fn another_float_in_range(
    orig: f64,
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let close: bool = u.arbitrary()?;
    if close {
        let ulps: i32 = u.int_in_range(-32..=32)?;
        let scale = 1.0f64 + ulps as f64 * f64::EPSILON;
        Ok((orig * scale).clamp(start, end))
    } else {
        float_in_range(start, end, u)
    }
}

/// Generate an arbitrary point.
pub fn point(u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    Ok(Point::new(float(u)?, float(u)?))
}

/// Generate an arbitrary segment.
///
/// There's a good chance that it starts at one of the points in `near`, or
/// that one of its coordinates almost agrees with one of theirs. Shared
/// endpoints and near-ties in angle are where the sweep is most delicate.
pub fn segment(near: &[Point], u: &mut Unstructured<'_>) -> Result<Segment, arbitrary::Error> {
    let p0 = if !near.is_empty() && u.arbitrary()? {
        *u.choose(near)?
    } else {
        point(u)?
    };
    let p1 = if u.arbitrary()? {
        Point::new(
            another_float_in_range(p0.x, -1e3, 1e3, u)?,
            float(u)?,
        )
    } else {
        point(u)?
    };
    Ok(Segment::new(p0, p1))
}

/// Generate a scene whose segments don't cross one another or the origin.
///
/// Candidate segments that would cross an earlier one (or touch the origin)
/// are dropped, so the scene might have fewer segments than were generated.
pub fn scene(u: &mut Unstructured<'_>) -> Result<Scene, arbitrary::Error> {
    let origin = point(u)?;
    let count = u.int_in_range(0..=24)?;
    let mut segments = Segments::default();
    let mut endpoints = Vec::new();
    for _ in 0..count {
        let seg = segment(&endpoints, u)?;
        if seg.has_inside(&origin) {
            continue;
        }
        // Sharing an endpoint is fine; anything more isn't.
        let crosses = segments.segments().any(|other| {
            let shared = other.contains_endpoint(&seg.p0) || other.contains_endpoint(&seg.p1);
            if shared {
                seg.intersects_interior(other)
                    || other.has_inside(&unshared_endpoint(&seg, other))
                    || seg.has_inside(&unshared_endpoint(other, &seg))
            } else {
                seg.intersects(other)
            }
        });
        if !crosses {
            endpoints.extend([seg.p0, seg.p1]);
            segments.push(seg);
        }
    }
    Ok(Scene { origin, segments })
}

// The endpoint of `seg` that isn't shared with `other`.
fn unshared_endpoint(seg: &Segment, other: &Segment) -> Point {
    if other.contains_endpoint(&seg.p0) {
        seg.p1
    } else {
        seg.p0
    }
}
