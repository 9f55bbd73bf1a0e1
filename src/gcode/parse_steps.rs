use winnow::ascii::digit1;
use winnow::combinator::{alt, opt};
use winnow::token::literal;
use winnow::{Parser, Result};

/// Number of fractional digits accepted in a step value.
///
/// Five places are exactly enough to write the finest microstep fraction
/// (1/32 = 0.03125) in decimal, and every multiple of 1/32 with five
/// decimal places converts to `f64` without rounding.
const FRACTION_DIGITS: usize = 5;

/// Parses a decimal step value.
///
/// This permits only decimal notation, NOT scientific notation. A maximum
/// of 5 decimal places is allowed following the decimal point.
///
/// Examples of valid input:
///
/// - `"50"`
/// - `"+12.5"`
/// - `"-0.03125"`
pub fn parse_steps(input: &mut &str) -> Result<f64> {
    let sign = {
        match opt(parse_sign).parse_next(input)? {
            None => 1i64,
            Some(sign) => sign.to_i64(),
        }
    };
    let int_part = parse_digits_i64.parse_next(input)?;
    let frac_part = {
        match opt(parse_period).parse_next(input)? {
            None => 0i64,
            Some(()) => {
                parse_fractional_digits::<FRACTION_DIGITS>.parse_next(input)?
            }
        }
    };

    let scale = 10i64.pow(FRACTION_DIGITS as u32);
    let scaled: i64 = sign * (int_part * scale + frac_part);
    Ok(scaled as f64 / scale as f64)
}

/// Parse digits (0-9) as a u8.
pub fn parse_digits_u8(input: &mut &str) -> Result<u8> {
    digit1.try_map(str::parse).parse_next(input)
}

/// Represents a sign when parsing numbers.
#[derive(Debug, PartialEq, Copy, Clone)]
enum Sign {
    Plus,
    Minus,
}
impl Sign {
    fn to_i64(&self) -> i64 {
        use Sign::*;
        match self {
            Plus => 1,
            Minus => -1,
        }
    }
}

/// Parse a sign indicator ("+" or "-").
fn parse_sign(input: &mut &str) -> Result<Sign> {
    alt((
        literal("+").map(|_| Sign::Plus),
        literal("-").map(|_| Sign::Minus),
    ))
    .parse_next(input)
}

/// Parse digits (0-9) as an i64.
fn parse_digits_i64(input: &mut &str) -> Result<i64> {
    digit1.try_map(str::parse).parse_next(input)
}

/// Parse digits (0-9) as "fractional digits".
///
/// This means that the digits will be padded with zeros up to `N` width.
fn parse_fractional_digits<const N: usize>(input: &mut &str) -> Result<i64> {
    digit1
        .try_map(|s: &str| {
            let n_digits = s.len();
            if n_digits > N {
                Err("too many fractional digits")
            } else {
                s.parse::<i64>()
                    .map(|number| number * 10i64.pow((N - n_digits) as u32))
                    .map_err(|_| "could not parse digits as i64")
            }
        })
        .parse_next(input)
}

/// Parse and discard a period (`.`)
fn parse_period(input: &mut &str) -> Result<()> {
    literal(".").map(|_| ()).parse_next(input)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_sign() {
        let mut input_plus = "+";
        let mut input_minus = "-";
        let mut input_other = "foo";
        assert_eq!(Ok(Sign::Plus), parse_sign(&mut input_plus));
        assert_eq!(Ok(Sign::Minus), parse_sign(&mut input_minus));
        assert!(parse_sign(&mut input_other).is_err());
    }

    #[test]
    fn test_parse_digits_u8() {
        let mut input1 = "42";
        let mut input2 = "999";
        assert_eq!(Ok(42u8), parse_digits_u8(&mut input1));
        assert!(parse_digits_u8(&mut input2).is_err());
    }

    #[test]
    fn test_parse_steps_integers() {
        let mut input1 = "50";
        let mut input2 = "+12";
        let mut input3 = "-3";
        assert_eq!(Ok(50.0), parse_steps(&mut input1));
        assert_eq!(Ok(12.0), parse_steps(&mut input2));
        assert_eq!(Ok(-3.0), parse_steps(&mut input3));
    }

    #[test]
    fn test_parse_steps_fractions_are_exact() {
        // Multiples of binary step fractions must convert without any
        // rounding, otherwise the planner would reject them.
        let mut half = "0.5";
        let mut sixteenth = "2.0625";
        let mut thirty_second = "-0.03125";
        assert_eq!(Ok(0.5), parse_steps(&mut half));
        assert_eq!(Ok(2.0625), parse_steps(&mut sixteenth));
        assert_eq!(Ok(-0.03125), parse_steps(&mut thirty_second));
    }

    #[test]
    fn test_parse_steps_pads_short_fractions() {
        let mut input = "1.5";
        assert_eq!(Ok(1.5), parse_steps(&mut input));
    }

    #[test]
    fn test_parse_steps_too_many_fraction_digits() {
        let mut input = "1.000001";
        assert!(parse_steps(&mut input).is_err());
    }

    #[test]
    fn test_parse_steps_rejects_garbage() {
        let mut input1 = "foo";
        let mut input2 = ".5";
        assert!(parse_steps(&mut input1).is_err());
        assert!(parse_steps(&mut input2).is_err());
    }

    proptest! {
        /// Multiples of 1/32 with five decimal places round-trip exactly
        /// through the parser.
        #[test]
        fn test_parse_steps_round_trips_microsteps(n in -320_000i64..320_000) {
            let value = n as f64 * 0.03125;
            let text = format!("{:.5}", value);
            let mut input: &str = &text;
            assert_eq!(Ok(value), parse_steps(&mut input));
        }
    }
}
