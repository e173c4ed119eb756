//! Number, list and length grammars shared by the attribute parsers.
//!
//! SVG number lists are separated by whitespace and/or a single comma, and
//! the separator may be omitted entirely when the next number starts with a
//! sign or a dot (`10-5` is two numbers).

use winnow::{
    Parser as _,
    ascii::{float, multispace0},
    combinator::{opt, preceded, repeat},
    error::{ContextError, ErrMode},
    token::take_while,
};

pub(crate) type Input<'src> = &'src str;
pub(crate) type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

/// CSS pixels per unit for the absolute units SVG allows on lengths.
const PX_PER_IN: f32 = 96.0;

/// Parse a single number
pub(crate) fn number(input: &mut Input<'_>) -> IResult<f32> {
    float.parse_next(input)
}

/// Parse an optional comma surrounded by optional whitespace
pub(crate) fn comma_wsp(input: &mut Input<'_>) -> IResult<()> {
    (multispace0, opt(','), multispace0)
        .void()
        .parse_next(input)
}

/// Parse zero or more numbers separated by `comma_wsp`
pub(crate) fn number_list(input: &mut Input<'_>) -> IResult<Vec<f32>> {
    let Some(first) = opt(number).parse_next(input)? else {
        return Ok(Vec::new());
    };

    let rest: Vec<f32> = repeat(0.., preceded(comma_wsp, number)).parse_next(input)?;

    let mut numbers = Vec::with_capacity(rest.len() + 1);
    numbers.push(first);
    numbers.extend(rest);
    Ok(numbers)
}

/// Parse a unit suffix such as `px`, `mm` or `%`
fn unit_suffix<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    take_while(0.., |c: char| c.is_ascii_alphabetic() || c == '%').parse_next(input)
}

/// Parses a complete attribute value as a number list.
///
/// Returns `None` if anything other than numbers and separators is present.
pub(crate) fn parse_number_list(value: &str) -> Option<Vec<f32>> {
    let mut input = value.trim();
    let numbers = number_list.parse_next(&mut input).ok()?;
    let _ = comma_wsp.parse_next(&mut input);
    input.is_empty().then_some(numbers)
}

/// Parses a length attribute (`12`, `12px`, `3mm`) into user units.
///
/// Returns `None` for percentages, unknown units, and malformed values,
/// none of which can be resolved without a layout context.
pub(crate) fn parse_length(value: &str) -> Option<f32> {
    let mut input = value.trim();
    let magnitude = number.parse_next(&mut input).ok()?;
    let unit = unit_suffix.parse_next(&mut input).ok()?;

    if !input.trim().is_empty() || !magnitude.is_finite() {
        return None;
    }

    let factor = match unit {
        "" | "px" => 1.0,
        "in" => PX_PER_IN,
        "cm" => PX_PER_IN / 2.54,
        "mm" => PX_PER_IN / 25.4,
        "pt" => PX_PER_IN / 72.0,
        "pc" => PX_PER_IN / 6.0,
        _ => return None,
    };

    Some(magnitude * factor)
}
