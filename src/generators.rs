//! Utilities for generating examples, benchmarks, and test cases.
//!
//! Every scene here has segments that don't cross one another, and an
//! origin that isn't on any segment.

use std::f64::consts::PI;

use crate::{input::Scene, Point, Segments};

type Contours = Vec<Vec<Point>>;

/// Generate a bunch of squares, arranged in a grid.
///
/// The bottom-left of the first square is at (x0, y0). Each square has size `size
/// x size`, and the distance between squares (both horizontally and vertically)
/// is `offset`.
///
/// If `slant` is non-zero, generates parallelograms instead of squares: the
/// right-hand side of each square gets translated up by `slant`.
fn squares((x0, y0): (f64, f64), size: f64, offset: f64, slant: f64, count: usize) -> Contours {
    let mut ret = Vec::new();
    for i in 0..count {
        let x = x0 + i as f64 * offset;
        for j in 0..count {
            let y = y0 + j as f64 * offset;
            ret.push(vec![
                Point::new(x, y),
                Point::new(x + size, y + slant),
                Point::new(x + size, y + size + slant),
                Point::new(x, y + size),
            ]);
        }
    }

    ret
}

fn walled(origin: Point, contours: Contours, (min, max): (f64, f64)) -> Scene {
    let mut segments = Segments::default();
    segments.add_cycle([(max, min), (max, max), (min, max), (min, min)]);
    for c in contours {
        segments.add_cycle(c);
    }
    Scene { origin, segments }
}

/// A square room of half-width `size`, centered on the origin.
pub fn room(size: f64) -> Scene {
    walled(Point::new(0.0, 0.0), Vec::new(), (-size, size))
}

/// An `n` by `n` grid of square pillars in a room, seen from the gap between
/// the first four of them.
///
/// Most pillars are hidden behind others, so only a few segments are visible.
pub fn pillars(n: usize) -> Scene {
    let grid = squares((0.0, 0.0), 30.0, 40.0, 0.0, n);
    walled(Point::new(35.0, 35.0), grid, (-10.0, 40.0 * n as f64))
}

/// Like `pillars`, but with no exactly-horizontal lines.
///
/// Segments lined up exactly with one another produce exact angular ties,
/// so their presence or absence can affect performance.
pub fn slanted_pillars(n: usize) -> Scene {
    let grid = squares((0.0, 0.0), 30.0, 40.0, 1.0, n);
    walled(Point::new(35.0, 35.0), grid, (-10.0, 40.0 * n as f64 + 1.0))
}

/// A row of `n` long, skinny parallelograms, like venetian blinds, seen from below.
///
/// The view between the slats is narrow, so the visible set is mostly slat
/// ends with a few slivers of the far wall.
pub fn blinds(n: usize) -> Scene {
    let h = 20.0 * n as f64;

    let mut slats = Vec::new();
    for i in 0..n {
        let x_off = 20.0 * i as f64;
        slats.push(vec![
            Point::new(x_off, 0.0),
            Point::new(x_off + 10.0, 0.0),
            Point::new(x_off + h + 10.0, h),
            Point::new(x_off + h, h),
        ]);
    }

    let origin = Point::new(h / 2.0, -10.0);
    walled(origin, slats, (-20.0, 2.0 * h + 20.0))
}

/// `n` short segments at increasing distances from the origin, scattered
/// around it by the golden angle.
///
/// The segments overlap one another in angle a lot, so the status structure
/// gets big.
pub fn fan(n: usize) -> Scene {
    let golden_angle = PI * (3.0 - 5.0f64.sqrt());
    let mut segments = Segments::default();
    for k in 0..n {
        let r = 10.0 + k as f64;
        // A chord of the circle of radius r dips inside it, but not as far as
        // the previous circle.
        let half_width = 0.9 * ((r - 1.0) / r).acos();
        let theta = k as f64 * golden_angle;
        let at = |angle: f64| (r * angle.cos(), r * angle.sin());
        segments.add(at(theta - half_width), at(theta + half_width));
    }
    Scene {
        origin: Point::new(0.0, 0.0),
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_scene(scene: &Scene) {
        scene.check().unwrap();
        let segs = &scene.segments;
        for (i, a) in segs.iter() {
            for (j, b) in segs.iter() {
                if i < j && !(a.contains_endpoint(&b.p0) || a.contains_endpoint(&b.p1)) {
                    assert!(!a.intersects(b), "{a:?} and {b:?} intersect");
                }
            }
        }
    }

    #[test]
    fn generated_scenes_are_valid() {
        for scene in [room(5.0), pillars(4), slanted_pillars(4), blinds(5), fan(50)] {
            check_scene(&scene);
        }
    }

    #[test]
    fn pillars_hide_things() {
        let scene = pillars(4);
        let visible = scene.visible(&Default::default()).unwrap();
        assert!(!visible.is_empty());
        assert!(visible.len() < scene.segments.len() / 2);
    }
}
