//! Reading visibility problems from text.
//!
//! The format is line-oriented. The first line holds the origin as `x y`;
//! every following line holds one segment as `x1 y1 x2 y2`. Blank lines and
//! lines starting with `#` are skipped.
//!
//! ```text
//! # a square room
//! 0 0
//! 10 -10 10 10
//! 10 10 -10 10
//! -10 10 -10 -10
//! -10 -10 10 -10
//! ```

use std::path::Path;
use std::str::FromStr;

use crate::{
    geom::Point,
    segments::{SegIdx, Segments},
    sweep::{self, SweepObserver, SweepOptions},
    Error,
};

/// What was wrong with a line of input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// There were no data lines at all.
    MissingOrigin,
    /// A line had the wrong number of fields.
    FieldCount {
        /// How many there should have been.
        expected: usize,
        /// How many there were.
        found: usize,
    },
    /// A field wasn't a finite number.
    BadNumber(String),
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::MissingOrigin => write!(f, "no origin point"),
            ParseErrorKind::FieldCount { expected, found } => {
                write!(f, "expected {expected} coordinates, found {found}")
            }
            ParseErrorKind::BadNumber(s) => write!(f, "{s:?} is not a finite number"),
        }
    }
}

/// A syntax error in the input, with the (1-based) line it was found on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// The line number.
    pub line: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error at line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for ParseError {}

/// Failed to load a scene from a file.
#[derive(Debug)]
pub enum LoadError {
    /// Couldn't read the file.
    Io(std::io::Error),
    /// Couldn't parse it.
    Parse(ParseError),
    /// Parsed it, but it doesn't describe a valid problem.
    Invalid(Error),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "failed to read scene: {e}"),
            LoadError::Parse(e) => e.fmt(f),
            LoadError::Invalid(e) => write!(f, "invalid scene: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Parse(e) => Some(e),
            LoadError::Invalid(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::Parse(e)
    }
}

impl From<Error> for LoadError {
    fn from(e: Error) -> Self {
        LoadError::Invalid(e)
    }
}

/// A visibility problem: an origin and some opaque segments.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// Where we're looking from.
    pub origin: Point,
    /// What we're looking at.
    pub segments: Segments,
}

fn parse_fields<const N: usize>(line: &str, line_no: usize) -> Result<[f64; N], ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let err = |kind| ParseError {
        line: line_no,
        kind,
    };
    if fields.len() != N {
        return Err(err(ParseErrorKind::FieldCount {
            expected: N,
            found: fields.len(),
        }));
    }

    let mut ret = [0.0; N];
    for (out, field) in ret.iter_mut().zip(fields) {
        *out = field
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .ok_or_else(|| err(ParseErrorKind::BadNumber(field.to_owned())))?;
    }
    Ok(ret)
}

impl Scene {
    /// Parses a scene from text.
    pub fn parse(text: &str) -> Result<Scene, ParseError> {
        let mut origin = None;
        let mut segments = Segments::default();
        let mut last_line = 0;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            last_line = line_no;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if origin.is_none() {
                let [x, y] = parse_fields::<2>(line, line_no)?;
                origin = Some(Point::new(x, y));
            } else {
                let [x0, y0, x1, y1] = parse_fields::<4>(line, line_no)?;
                segments.add((x0, y0), (x1, y1));
            }
        }

        let origin = origin.ok_or(ParseError {
            line: last_line.max(1),
            kind: ParseErrorKind::MissingOrigin,
        })?;
        tracing::debug!(segments = segments.len(), "parsed scene");
        Ok(Scene { origin, segments })
    }

    /// Reads and parses a scene file, and checks that it describes a valid problem.
    pub fn read(path: impl AsRef<Path>) -> Result<Scene, LoadError> {
        let text = std::fs::read_to_string(path)?;
        let scene = Scene::parse(&text)?;
        scene.check()?;
        Ok(scene)
    }

    /// Builds a scene from a list of points, the way they'd be clicked in by hand.
    ///
    /// The first point is the origin, and the rest are paired up into
    /// segments. If that leaves one point over, it gets paired with itself.
    pub fn from_drawn_points<P: Into<Point>>(
        points: impl IntoIterator<Item = P>,
    ) -> Result<Scene, Error> {
        let mut points: Vec<Point> = points.into_iter().map(Into::into).collect();
        if points.len() < 3 {
            return Err(Error::TooFewPoints {
                found: points.len(),
            });
        }
        let origin = points.remove(0);
        if points.len() % 2 == 1 {
            let last = points[points.len() - 1];
            points.push(last);
        }

        let mut segments = Segments::default();
        segments.add_pairs(points);
        Ok(Scene { origin, segments })
    }

    /// Checks that this scene can be swept.
    pub fn check(&self) -> Result<(), Error> {
        sweep::check_input(&self.origin, &self.segments)
    }

    /// Finds the visible segments.
    pub fn visible(&self, options: &SweepOptions) -> Result<Vec<SegIdx>, Error> {
        sweep::sweep(self.origin, &self.segments, options, ())
    }

    /// Finds the visible segments, reporting progress to an observer.
    pub fn visible_with(
        &self,
        options: &SweepOptions,
        observer: impl SweepObserver,
    ) -> Result<Vec<SegIdx>, Error> {
        sweep::sweep(self.origin, &self.segments, options, observer)
    }
}

impl FromStr for Scene {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scene::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::geom::Segment;

    const ROOM: &str = "
# a square room, seen from the middle
0 0
10 -10 10 10
10 10 -10 10

  -10 10 -10 -10
-10 -10 10 -10
";

    #[test]
    fn parse_room() {
        let scene: Scene = ROOM.parse().unwrap();
        assert_eq!(scene.origin, Point::new(0.0, 0.0));
        assert_eq!(scene.segments.len(), 4);
        assert_eq!(
            scene.segments[SegIdx(2)],
            Segment::new((-10.0, 10.0), (-10.0, -10.0))
        );
        let visible = scene.visible(&SweepOptions::default()).unwrap();
        assert_eq!(visible.len(), 4);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            Scene::parse("0 0\n1 2 3\n"),
            Err(ParseError {
                line: 2,
                kind: ParseErrorKind::FieldCount {
                    expected: 4,
                    found: 3
                }
            })
        );
        assert_eq!(
            Scene::parse("# origin\n0 0 0\n"),
            Err(ParseError {
                line: 2,
                kind: ParseErrorKind::FieldCount {
                    expected: 2,
                    found: 3
                }
            })
        );
        assert_eq!(
            Scene::parse("0 0\n1 2 3 4\n\n1 2 x 4"),
            Err(ParseError {
                line: 4,
                kind: ParseErrorKind::BadNumber("x".to_owned())
            })
        );
        assert_matches!(
            Scene::parse("0 0\n1 2 inf 4"),
            Err(ParseError {
                kind: ParseErrorKind::BadNumber(_),
                ..
            })
        );
        assert_matches!(
            Scene::parse("# nothing here\n\n"),
            Err(ParseError {
                line: 2,
                kind: ParseErrorKind::MissingOrigin
            })
        );
        assert_matches!(
            Scene::parse(""),
            Err(ParseError {
                line: 1,
                kind: ParseErrorKind::MissingOrigin
            })
        );

        let err = Scene::parse("0 0\n1 2 3\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error at line 2: expected 4 coordinates, found 3"
        );
    }

    #[test]
    fn read_missing_file() {
        assert_matches!(
            Scene::read("this/file/does/not/exist.txt"),
            Err(LoadError::Io(_))
        );
    }

    #[test]
    fn invalid_scene() {
        let scene = Scene::parse("0 0\n-1 0 1 0\n").unwrap();
        assert_matches!(scene.check(), Err(Error::ContainsOrigin(SegIdx(0))));
    }

    #[test]
    fn drawn_points() {
        assert_matches!(
            Scene::from_drawn_points([(0.0, 0.0), (1.0, 1.0)]),
            Err(Error::TooFewPoints { found: 2 })
        );

        let scene = Scene::from_drawn_points([(0.0, 0.0), (1.0, 1.0), (2.0, 1.0)]).unwrap();
        assert_eq!(scene.origin, Point::new(0.0, 0.0));
        assert_eq!(scene.segments.len(), 1);

        // An even number of points leaves a lone point at the end, which
        // becomes a zero-length segment.
        let scene =
            Scene::from_drawn_points([(0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (5.0, 5.0)]).unwrap();
        assert_eq!(scene.segments.len(), 2);
        assert_eq!(
            scene.segments[SegIdx(1)],
            Segment::new((5.0, 5.0), (5.0, 5.0))
        );
    }
}
