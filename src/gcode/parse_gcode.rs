use crate::motion::Axis;

use winnow::combinator::alt;
use winnow::token::{literal, take_while};
use winnow::{Parser, Result};

use super::parse_steps::{parse_digits_u8, parse_steps};

/// GCode atoms.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum GCode {
    /// Axis position word, like `X42.5` (in steps).
    Linear(Linear),
    /// G command, like `G0`.
    G(G),
    /// M command, like `M3`.
    M(M),
}
impl GCode {
    /// Creates a `Gxxx` GCode.
    pub fn g(value: u8) -> GCode {
        GCode::G(G(value))
    }

    /// Creates an `Mxxx` GCode.
    pub fn m(value: u8) -> GCode {
        GCode::M(M(value))
    }
}

/// Axis move amount, in steps.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Linear {
    pub axis: Axis,
    pub amount: f64,
}

/// G command.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct G(u8);

/// M command.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct M(u8);

/// Allow GCode to be a token in winnow.
impl winnow::stream::ContainsToken<GCode> for GCode {
    #[inline(always)]
    fn contains_token(&self, token: GCode) -> bool {
        *self == token
    }
}

/// Parse multiple GCodes, storing them in a buffer.
///
/// This function tries to parse as many [GCode]s as will fit in the
/// `buffer` before returning. It will return when either the input is
/// empty, or when the buffer is full. The function does not empty the
/// buffer before accumulating into it.
///
/// If the buffer fills up before the input has been read, the input will
/// be set to the next gcode.
///
/// # Parameters
///
/// - `input`: The input to parse.
/// - `buffer`: Buffer in which to accumulate values.
///
/// # Returns
///
/// - `Ok(completed)` if parsing was successful. `completed` indicates
///   whether the complete string was parsed without filling up the buffer.
/// - `Err(_)` if the parsing failed.
pub fn parse_gcodes<const N: usize>(
    input: &mut &str,
    buffer: &mut heapless::Vec<GCode, N>,
) -> Result<bool> {
    while !input.is_empty() {
        let prev_input = *input;
        let gcode = parse_trim_gcode.parse_next(input)?;
        if buffer.push(gcode).is_err() {
            *input = prev_input;
            break;
        }
    }
    Ok(input.is_empty())
}

/// Parse a GCode, trimming whitespace on either side.
fn parse_trim_gcode(input: &mut &str) -> Result<GCode> {
    skip_ws.parse_next(input)?;
    let result = parse_gcode.parse_next(input)?;
    skip_ws.parse_next(input)?;
    Ok(result)
}

/// Parse a GCode.
fn parse_gcode(input: &mut &str) -> Result<GCode> {
    alt((
        parse_linear.map(GCode::Linear),
        parse_g.map(GCode::G),
        parse_m.map(GCode::M),
    ))
    .parse_next(input)
}

/// Parse a Linear.
fn parse_linear(input: &mut &str) -> Result<Linear> {
    let axis = parse_axis.parse_next(input)?;
    skip_ws.parse_next(input)?;
    let amount = parse_steps.parse_next(input)?;
    Ok(Linear { axis, amount })
}

/// Parse a "G" command.
fn parse_g(input: &mut &str) -> Result<G> {
    literal("G").parse_next(input)?;
    let value = parse_digits_u8.parse_next(input)?;
    Ok(G(value))
}

/// Parse an "M" command.
fn parse_m(input: &mut &str) -> Result<M> {
    literal("M").parse_next(input)?;
    let value = parse_digits_u8.parse_next(input)?;
    Ok(M(value))
}

/// Parse an axis letter.
fn parse_axis(input: &mut &str) -> Result<Axis> {
    alt((
        literal("X").map(|_| Axis::X),
        literal("Y").map(|_| Axis::Y),
        literal("Z").map(|_| Axis::Z),
    ))
    .parse_next(input)
}

/// Skip whitespace.
fn skip_ws(input: &mut &str) -> Result<()> {
    take_while(0.., (' ', '\t', '\r', '\n'))
        .map(|_: &str| ())
        .parse_next(input)
}
