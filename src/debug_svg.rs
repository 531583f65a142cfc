//! Drawing sweeps as SVG, for debugging.

use std::path::Path;

use svg::node::element::{Circle, Group, Line};
use svg::Document;

use crate::{
    geom::{Point, Ray, Segment},
    segments::{SegIdx, Segments},
    sweep::SweepObserver,
};

/// A [`SweepObserver`] that remembers what the sweep did, and can draw it.
///
/// The drawing shows every segment in grey, every position of the sweep ray
/// as a faint line from the origin, and the visible segments in red.
#[derive(Clone, Debug)]
pub struct SvgRecorder {
    origin: Point,
    segments: Segments,
    bbox: kurbo::Rect,
    rays: Vec<f64>,
    highlighted: Vec<SegIdx>,
    plotted: usize,
    hidden: usize,
}

impl SvgRecorder {
    /// A recorder for sweeping `segments` around `origin`.
    pub fn new(origin: Point, segments: &Segments) -> Self {
        SvgRecorder {
            origin,
            segments: segments.clone(),
            bbox: segments.bounding_box(origin),
            rays: Vec::new(),
            highlighted: Vec::new(),
            plotted: 0,
            hidden: 0,
        }
    }

    /// The angles the sweep ray pointed at, in the order it visited them.
    pub fn rays(&self) -> &[f64] {
        &self.rays
    }

    /// The segments that were highlighted as visible, in the order they were found.
    pub fn highlighted(&self) -> &[SegIdx] {
        &self.highlighted
    }

    /// How many times a segment entered the status structure.
    pub fn plotted(&self) -> usize {
        self.plotted
    }

    /// How many times a segment left the status structure.
    pub fn hidden(&self) -> usize {
        self.hidden
    }

    /// Draws the sweep.
    pub fn document(&self) -> Document {
        let pad = 1.0;
        let width = self.bbox.width() + 2.0 * pad;
        let height = self.bbox.height() + 2.0 * pad;
        let stroke_width = width.max(height) / 512.0;
        // Long enough to leave the bounding box from anywhere inside it.
        let ray_len = width.hypot(height);

        // SVG's y axis points down, so flip everything over.
        let mut group = Group::new().set(
            "transform",
            format!(
                "translate(0, {}) scale(1, -1)",
                self.bbox.min_y() + self.bbox.max_y()
            ),
        );

        for &theta in &self.rays {
            let end = Ray::from_angle(self.origin, theta).at(ray_len);
            group = group.add(
                line(&Segment::new(self.origin, end))
                    .set("stroke", "lightblue")
                    .set("stroke-width", stroke_width / 2.0),
            );
        }

        for seg in self.segments.segments() {
            group = group.add(
                line(seg)
                    .set("stroke", "grey")
                    .set("stroke-width", stroke_width),
            );
        }

        for &idx in &self.highlighted {
            group = group.add(
                line(&self.segments[idx])
                    .set("stroke", "red")
                    .set("stroke-width", 2.0 * stroke_width),
            );
        }

        group = group.add(
            Circle::new()
                .set("cx", self.origin.x)
                .set("cy", self.origin.y)
                .set("r", 3.0 * stroke_width)
                .set("fill", "black"),
        );

        Document::new()
            .set(
                "viewBox",
                (self.bbox.min_x() - pad, self.bbox.min_y() - pad, width, height),
            )
            .add(group)
    }

    /// Draws the sweep to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        svg::save(path, &self.document())
    }
}

fn line(seg: &Segment) -> Line {
    Line::new()
        .set("x1", seg.p0.x)
        .set("y1", seg.p0.y)
        .set("x2", seg.p1.x)
        .set("y2", seg.p1.y)
        .set("stroke-linecap", "round")
}

impl SweepObserver for SvgRecorder {
    fn ray_moved(&mut self, ray: &Ray) {
        self.rays.push(ray.angle());
    }

    fn plot(&mut self, _idx: SegIdx, _seg: &Segment) {
        self.plotted += 1;
    }

    fn hide(&mut self, _idx: SegIdx, _seg: &Segment) {
        self.hidden += 1;
    }

    fn highlight(&mut self, idx: SegIdx, _seg: &Segment) {
        self.highlighted.push(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SweepOptions;

    #[test]
    fn records_a_room() {
        let mut segs = Segments::default();
        segs.add_cycle([(10.0, -10.0), (10.0, 10.0), (-10.0, 10.0), (-10.0, -10.0)]);
        let origin = Point::new(0.0, 0.0);

        let mut rec = SvgRecorder::new(origin, &segs);
        let visible =
            crate::visible_segments_with(origin, &segs, &SweepOptions::default(), &mut rec)
                .unwrap();

        let mut found = rec.highlighted().to_vec();
        found.sort();
        assert_eq!(found, visible);
        // The initial ray, then one per event.
        assert_eq!(rec.rays().len(), 9);
        assert_eq!(rec.plotted(), 5);
        assert_eq!(rec.hidden(), 4);

        let text = rec.document().to_string();
        assert_eq!(text.matches("<line").count(), 9 + 4 + 4);
        assert!(text.contains("<circle"));
    }
}
