use crate::gcode::{parse_gcodes, GCode};
use crate::motion::Axis;

use ufmt_macros::uDebug;
use winnow::combinator::alt;
use winnow::error::ContextError;
use winnow::token::one_of;
use winnow::Parser;

/// Commands the motion layer's callers can issue.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Command {
    /// G0: Move to an absolute position.
    MoveAbsolute(Move),
    /// G1: Move relative to the pending position.
    MoveRelative(Move),
    /// M3: Spindle on.
    SpindleOn,
    /// M5: Spindle off.
    SpindleOff,
}

/// Per-axis amounts of a move command.
///
/// `None` means the axis word was omitted: unchanged for an absolute move,
/// zero delta for a relative one. The caller resolves that against its
/// pending position; the parser has no position knowledge.
#[derive(Debug, PartialEq, Default, Copy, Clone)]
pub struct Move {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}
impl Move {
    fn set(&mut self, axis: Axis, amount: f64) {
        match axis {
            Axis::X => self.x = Some(amount),
            Axis::Y => self.y = Some(amount),
            Axis::Z => self.z = Some(amount),
        }
    }
}

/// Possible errors that might occur during parsing.
#[derive(Debug, uDebug, PartialEq, Copy, Clone)]
pub enum Error {
    /// Input buffer overflowed.
    BufferOverflow,
    /// Parsing failed.
    ParseError,
}

/// Command Parser.
///
/// This is a struct because it statically owns a buffer used to read GCode.
pub struct CommandParser<const N_GCODES: usize> {
    buffer: heapless::Vec<GCode, N_GCODES>,
}
impl<const N_GCODES: usize> CommandParser<N_GCODES> {
    /// Creates a new command parser.
    pub fn new() -> Self {
        Self {
            buffer: heapless::Vec::new(),
        }
    }

    /// Parses a command from one input line.
    pub fn parse(&mut self, input: &str) -> Result<Command, Error> {
        self.buffer.clear();
        let mut input_ref: &str = input;
        match parse_gcodes(&mut input_ref, &mut self.buffer) {
            Err(_) => Err(Error::ParseError),
            Ok(false) => Err(Error::BufferOverflow),
            Ok(true) => {
                let mut tok_input = self.buffer.as_slice();
                let command = parse_command(&mut tok_input)
                    .map_err(|_| Error::ParseError)?;
                if tok_input.is_empty() {
                    Ok(command)
                } else {
                    // Trailing atoms the command did not consume.
                    Err(Error::ParseError)
                }
            }
        }
    }
}

/// Parse a command from a slice of GCode atoms.
fn parse_command(input: &mut &[GCode]) -> Result<Command, ContextError> {
    alt((
        parse_move_command(0, Command::MoveAbsolute),
        parse_move_command(1, Command::MoveRelative),
        parse_simple_m(3, Command::SpindleOn),
        parse_simple_m(5, Command::SpindleOff),
    ))
    .parse_next(input)
}

/// Parse a `G<value>` move head followed by axis words.
///
/// A repeated axis word overwrites the earlier one; the last value wins.
///
/// # Parameters
///
/// - `value`: The numeric `G<value>` of the move head.
/// - `wrap`: Constructor for the corresponding move `Command`.
fn parse_move_command<'s>(
    value: u8,
    wrap: fn(Move) -> Command,
) -> impl FnMut(&mut &'s [GCode]) -> Result<Command, ContextError> {
    move |input| {
        one_of(GCode::g(value)).parse_next(input)?;
        let mut mv = Move::default();
        while let Some(GCode::Linear(linear)) = input.first() {
            mv.set(linear.axis, linear.amount);
            *input = &input[1..];
        }
        Ok(wrap(mv))
    }
}

/// Parse a simple `Mxxx` code that has nothing except its numeric part.
///
/// # Parameters
///
/// - `value`: The numeric `M<value>`.
/// - `command`: The corresponding `Command`.
fn parse_simple_m<'s>(
    value: u8,
    command: Command,
) -> impl FnMut(&mut &'s [GCode]) -> Result<Command, ContextError> {
    move |input| one_of(GCode::m(value)).parse_next(input).map(|_| command)
}
