//! Parser for the SVG `transform` attribute.
//!
//! A transform list is a sequence of transform functions separated by
//! whitespace and/or commas. The functions compose left to right, so the
//! rightmost function is applied to the element's coordinates first:
//!
//! ```
//! # use pidview_core::geometry::Point;
//! # use pidview_parser::parse_transform;
//! let t = parse_transform("translate(10,5) scale(2)").unwrap();
//! assert_eq!(t.apply(Point::new(5.0, 5.0)), Point::new(20.0, 15.0));
//! ```
//!
//! Supported functions: `matrix(a b c d e f)`, `translate(tx [ty])`,
//! `scale(sx [sy])`, `rotate(deg [cx cy])`, `skewX(deg)`, `skewY(deg)`.

use winnow::{
    Parser as _,
    ascii::multispace0,
    combinator::{delimited, preceded, repeat},
    token::take_while,
};

use pidview_core::geometry::Transform;

use crate::{
    error::{Diagnostic, ErrorCode},
    number::{IResult, Input, comma_wsp, number_list},
};

/// Builds a transform from a function name and its arguments.
///
/// Returns `None` for unknown names or the wrong number of arguments.
fn build_transform(name: &str, args: &[f32]) -> Option<Transform> {
    let transform = match (name, args) {
        ("matrix", [a, b, c, d, e, f]) => Transform::new(*a, *b, *c, *d, *e, *f),
        ("translate", [tx]) => Transform::translate(*tx, 0.0),
        ("translate", [tx, ty]) => Transform::translate(*tx, *ty),
        ("scale", [s]) => Transform::scale(*s, *s),
        ("scale", [sx, sy]) => Transform::scale(*sx, *sy),
        ("rotate", [angle]) => Transform::rotate(*angle),
        ("rotate", [angle, cx, cy]) => Transform::translate(*cx, *cy)
            .then_apply(&Transform::rotate(*angle))
            .then_apply(&Transform::translate(-cx, -cy)),
        ("skewX", [angle]) => Transform::skew_x(*angle),
        ("skewY", [angle]) => Transform::skew_y(*angle),
        _ => return None,
    };
    Some(transform)
}

/// Parse a single transform function such as `rotate(45, 10, 10)`
fn transform_function(input: &mut Input<'_>) -> IResult<Transform> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic()),
        delimited(
            (multispace0, '(', multispace0),
            number_list,
            (comma_wsp, ')'),
        ),
    )
        .verify_map(|(name, args): (&str, Vec<f32>)| build_transform(name, &args))
        .parse_next(input)
}

/// Parse a transform list, composing the functions left to right
fn transform_list(input: &mut Input<'_>) -> IResult<Transform> {
    let functions: Vec<Transform> =
        repeat(0.., preceded(comma_wsp, transform_function)).parse_next(input)?;

    Ok(functions
        .iter()
        .fold(Transform::identity(), |acc, next| acc.then_apply(next)))
}

/// Parses a `transform` attribute value.
///
/// # Errors
///
/// Returns an [`ErrorCode::E200`] warning diagnostic if the value is not a
/// valid transform list. Callers treat the element as untransformed.
pub fn parse_transform(value: &str) -> Result<Transform, Diagnostic> {
    let mut input = value;
    let invalid = || {
        Diagnostic::warning(format!("invalid transform `{value}`"))
            .with_code(ErrorCode::E200)
            .with_help("expected functions like `translate(10 5)` or `matrix(1 0 0 1 0 0)`")
    };

    let transform = transform_list.parse_next(&mut input).map_err(|_| invalid())?;
    let _ = comma_wsp.parse_next(&mut input);

    if !input.is_empty() || transform.components().iter().any(|c| !c.is_finite()) {
        return Err(invalid());
    }

    Ok(transform)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use pidview_core::geometry::Point;

    use super::*;

    fn apply(value: &str, p: Point) -> Point {
        parse_transform(value)
            .expect("valid transform")
            .apply(p)
    }

    #[test]
    fn test_empty_is_identity() {
        assert!(parse_transform("").unwrap().is_identity());
        assert!(parse_transform("   ").unwrap().is_identity());
    }

    #[test]
    fn test_translate_and_scale() {
        assert_eq!(apply("translate(10)", Point::new(1.0, 1.0)), Point::new(11.0, 1.0));
        assert_eq!(apply("translate(10 5)", Point::new(1.0, 1.0)), Point::new(11.0, 6.0));
        assert_eq!(apply("scale(2)", Point::new(3.0, 4.0)), Point::new(6.0, 8.0));
        assert_eq!(apply("scale(2, 3)", Point::new(3.0, 4.0)), Point::new(6.0, 12.0));
    }

    #[test]
    fn test_list_applies_rightmost_first() {
        assert_eq!(
            apply("translate(10,5) scale(2)", Point::new(5.0, 5.0)),
            Point::new(20.0, 15.0)
        );
        assert_eq!(
            apply("scale(2),translate(10,5)", Point::new(5.0, 5.0)),
            Point::new(30.0, 20.0)
        );
        // No separator between functions
        assert_eq!(
            apply("translate(1,1)scale(2)", Point::new(1.0, 1.0)),
            Point::new(3.0, 3.0)
        );
    }

    #[test]
    fn test_matrix() {
        assert_eq!(
            apply("matrix(1 0 0 1 7 -3)", Point::new(0.0, 0.0)),
            Point::new(7.0, -3.0)
        );
    }

    #[test]
    fn test_rotate_about_center() {
        let p = apply("rotate(90 10 10)", Point::new(20.0, 10.0));
        assert_approx_eq!(f32, p.x(), 10.0, epsilon = 1e-4);
        assert_approx_eq!(f32, p.y(), 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_skew() {
        let p = apply("skewX(45)", Point::new(0.0, 10.0));
        assert_approx_eq!(f32, p.x(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_invalid_transforms() {
        for value in [
            "translate(",
            "translate(1 2 3)",
            "spin(45)",
            "matrix(1 0 0 1)",
            "scale(2) garbage",
        ] {
            let err = parse_transform(value).unwrap_err();
            assert_eq!(err.code(), Some(ErrorCode::E200), "value: {value}");
            assert!(err.severity().is_warning());
        }
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use pidview_core::geometry::Point;
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn translate_then_scale_matches_composition(
            tx in -1000.0f32..1000.0,
            ty in -1000.0f32..1000.0,
            s in 0.1f32..10.0,
            x in -100.0f32..100.0,
            y in -100.0f32..100.0,
        ) {
            let parsed = parse_transform(&format!("translate({tx}, {ty}) scale({s})")).unwrap();
            let p = parsed.apply(Point::new(x, y));
            prop_assert!(approx_eq!(f32, p.x(), x * s + tx, epsilon = 1e-2));
            prop_assert!(approx_eq!(f32, p.y(), y * s + ty, epsilon = 1e-2));
        }
    }
}
