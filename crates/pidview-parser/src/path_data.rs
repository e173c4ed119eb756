//! Bounding-box measurement for SVG path data (`d` attributes).
//!
//! Paths are measured by the hull of every point the path visits,
//! including Bézier control points. Control points bound the curve, so
//! the result is never smaller than the drawn shape, at the cost of
//! sometimes being larger. Arcs use a similarly conservative box derived
//! from their radii.

use winnow::{
    Parser as _,
    ascii::multispace0,
    combinator::{preceded, repeat},
    token::one_of,
};

use pidview_core::geometry::{Bounds, Point};

use crate::{
    error::{Diagnostic, ErrorCode},
    number::{IResult, Input, comma_wsp, number, number_list},
};

const COMMANDS: &str = "MmZzLlHhVvCcSsQqTtAa";

/// One command letter and its raw argument list.
#[derive(Debug, Clone, PartialEq)]
struct Segment {
    command: char,
    args: Vec<f32>,
}

/// Parse a path command letter
fn command(input: &mut Input<'_>) -> IResult<char> {
    preceded(multispace0, one_of(|c: char| COMMANDS.contains(c))).parse_next(input)
}

/// Parse an arc flag, which may be written without a separator (`a5 5 0 0110 10`)
fn flag(input: &mut Input<'_>) -> IResult<f32> {
    preceded(comma_wsp, one_of(['0', '1']))
        .map(|c| if c == '1' { 1.0 } else { 0.0 })
        .parse_next(input)
}

/// Parse a number preceded by an optional separator
fn arg(input: &mut Input<'_>) -> IResult<f32> {
    preceded(comma_wsp, number).parse_next(input)
}

/// Parse one group of seven arc arguments
fn arc_group(input: &mut Input<'_>) -> IResult<[f32; 7]> {
    (arg, arg, arg, flag, flag, arg, arg)
        .map(|(rx, ry, rotation, large, sweep, x, y)| [rx, ry, rotation, large, sweep, x, y])
        .parse_next(input)
}

/// Parse a command and its arguments
fn segment(input: &mut Input<'_>) -> IResult<Segment> {
    let letter = command.parse_next(input)?;
    let args = if matches!(letter, 'A' | 'a') {
        let groups: Vec<[f32; 7]> = repeat(0.., arc_group).parse_next(input)?;
        groups.into_iter().flatten().collect()
    } else {
        preceded(comma_wsp, number_list).parse_next(input)?
    };
    Ok(Segment {
        command: letter,
        args,
    })
}

/// Tracks the pen while walking the segments.
#[derive(Debug, Default)]
struct Pen {
    current: Point,
    subpath_start: Point,
    /// Last curve control point, tagged with its family (`'C'` or `'Q'`).
    last_control: Option<(char, Point)>,
    points: Vec<Point>,
}

impl Pen {
    fn resolve(&self, relative: bool, x: f32, y: f32) -> Point {
        if relative {
            self.current.add_point(Point::new(x, y))
        } else {
            Point::new(x, y)
        }
    }

    fn move_to(&mut self, p: Point) {
        self.current = p;
        self.subpath_start = p;
        self.points.push(p);
    }

    fn line_to(&mut self, p: Point) {
        self.current = p;
        self.points.push(p);
    }

    /// Reflection of the previous control point about the current point.
    ///
    /// Only a control point of the same curve family is reflected.
    fn reflected_control(&self, family: char) -> Point {
        match self.last_control {
            Some((previous, control)) if previous == family => {
                self.current.scale(2.0).sub_point(control)
            }
            _ => self.current,
        }
    }

    /// Adds a conservative box for an elliptical arc from the current point to `end`.
    fn arc_to(&mut self, rx: f32, ry: f32, end: Point) {
        let start = self.current;
        let delta = end.sub_point(start);
        let half_chord = delta.x().hypot(delta.y()) / 2.0;
        let radius = rx.abs().max(ry.abs()).max(half_chord);

        // The arc centre lies within `radius` of both endpoints, so every arc
        // point lies within `2 * radius` of each of them.
        let reach = 2.0 * radius;
        let min = Point::new(
            (start.x() - reach).max(end.x() - reach),
            (start.y() - reach).max(end.y() - reach),
        );
        let max = Point::new(
            (start.x() + reach).min(end.x() + reach),
            (start.y() + reach).min(end.y() + reach),
        );

        self.points.push(min);
        self.points.push(max);
        self.line_to(end);
    }
}

/// Number of arguments each command consumes per repetition.
fn arity(command: char) -> usize {
    match command.to_ascii_uppercase() {
        'Z' => 0,
        'H' | 'V' => 1,
        'M' | 'L' | 'T' => 2,
        'S' | 'Q' => 4,
        'C' => 6,
        'A' => 7,
        _ => unreachable!("command letters are filtered by the grammar"),
    }
}

fn walk(segments: &[Segment]) -> Option<Vec<Point>> {
    let mut pen = Pen::default();
    let mut started = false;

    for segment in segments {
        let upper = segment.command.to_ascii_uppercase();
        let relative = segment.command.is_ascii_lowercase();
        let arity = arity(segment.command);

        if !started && upper != 'M' {
            return None;
        }

        if arity == 0 {
            if !segment.args.is_empty() {
                return None;
            }
            pen.current = pen.subpath_start;
            pen.last_control = None;
            continue;
        }

        if segment.args.is_empty() || segment.args.len() % arity != 0 {
            return None;
        }

        for (repetition, args) in segment.args.chunks(arity).enumerate() {
            let mut control = None;
            match upper {
                // Repeated moveto pairs are implicit linetos
                'M' if repetition == 0 => {
                    let p = if started {
                        pen.resolve(relative, args[0], args[1])
                    } else {
                        Point::new(args[0], args[1])
                    };
                    pen.move_to(p);
                    started = true;
                }
                'M' | 'L' => pen.line_to(pen.resolve(relative, args[0], args[1])),
                'H' => {
                    let x = if relative { pen.current.x() + args[0] } else { args[0] };
                    pen.line_to(Point::new(x, pen.current.y()));
                }
                'V' => {
                    let y = if relative { pen.current.y() + args[0] } else { args[0] };
                    pen.line_to(Point::new(pen.current.x(), y));
                }
                'C' => {
                    let c1 = pen.resolve(relative, args[0], args[1]);
                    let c2 = pen.resolve(relative, args[2], args[3]);
                    let end = pen.resolve(relative, args[4], args[5]);
                    pen.points.extend([c1, c2]);
                    pen.line_to(end);
                    control = Some(('C', c2));
                }
                'S' => {
                    let c1 = pen.reflected_control('C');
                    let c2 = pen.resolve(relative, args[0], args[1]);
                    let end = pen.resolve(relative, args[2], args[3]);
                    pen.points.extend([c1, c2]);
                    pen.line_to(end);
                    control = Some(('C', c2));
                }
                'Q' => {
                    let c = pen.resolve(relative, args[0], args[1]);
                    let end = pen.resolve(relative, args[2], args[3]);
                    pen.points.push(c);
                    pen.line_to(end);
                    control = Some(('Q', c));
                }
                'T' => {
                    let c = pen.reflected_control('Q');
                    let end = pen.resolve(relative, args[0], args[1]);
                    pen.points.push(c);
                    pen.line_to(end);
                    control = Some(('Q', c));
                }
                'A' => {
                    let end = pen.resolve(relative, args[5], args[6]);
                    pen.arc_to(args[0], args[1], end);
                }
                _ => return None,
            }
            pen.last_control = control;
        }
    }

    Some(pen.points)
}

/// Measures the bounding box of a `d` attribute in local coordinates.
///
/// Returns `Ok(None)` for an empty path.
///
/// # Errors
///
/// Returns an [`ErrorCode::E201`] warning diagnostic if the path data is
/// malformed. Callers treat the element as unmeasurable.
pub fn path_bounds(d: &str) -> Result<Option<Bounds>, Diagnostic> {
    let invalid = || {
        Diagnostic::warning(format!("invalid path data `{}`", abbreviate(d)))
            .with_code(ErrorCode::E201)
            .with_help("path data must start with a moveto (`M x y`)")
    };

    let mut input = d;
    let segments: Vec<Segment> = repeat(0.., segment)
        .parse_next(&mut input)
        .map_err(|_| invalid())?;
    if !input.trim().is_empty() {
        return Err(invalid());
    }
    if segments.is_empty() {
        return Ok(None);
    }

    let points = walk(&segments).ok_or_else(invalid)?;
    if points.iter().any(|p| !p.x().is_finite() || !p.y().is_finite()) {
        return Err(invalid());
    }

    Ok(Bounds::from_points(points))
}

/// Shortens long path data for diagnostics.
fn abbreviate(d: &str) -> String {
    const LIMIT: usize = 40;
    match d.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &d[..cut]),
        None => d.to_string(),
    }
}
