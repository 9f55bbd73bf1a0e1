use crate::motion::Axis;
use crate::motion::Direction;

use ufmt::{uDisplay, uWrite, Formatter};

/// Position of the tool, in fractional steps per axis.
///
/// A full motor step is 1.0; microstepping accumulates in exact binary
/// fractions of that, so every reachable position is representable without
/// rounding.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Position {
    coords: [f64; 3],
}
impl Position {
    /// Creates a position from per-axis step values.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { coords: [x, y, z] }
    }

    /// The machine origin.
    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Returns the value for one axis.
    pub fn get(&self, axis: Axis) -> f64 {
        self.coords[axis.index()]
    }

    /// Sets the value for one axis.
    pub fn set(&mut self, axis: Axis, value: f64) {
        self.coords[axis.index()] = value;
    }

    /// Advances one axis by a step fraction in the given direction.
    ///
    /// This is the executor's per-pulse odometer update; it must be called
    /// exactly once per physically emitted pulse so that the tracked
    /// position stays exact.
    pub fn advance(
        &mut self,
        axis: Axis,
        fraction: f64,
        direction: Direction,
    ) {
        let delta = match direction {
            Direction::Positive => fraction,
            Direction::Negative => -fraction,
        };
        self.coords[axis.index()] += delta;
    }
}

impl uDisplay for Position {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_char('X')?;
        udisplay_steps(self.get(Axis::X), f)?;
        f.write_str(" Y")?;
        udisplay_steps(self.get(Axis::Y), f)?;
        f.write_str(" Z")?;
        udisplay_steps(self.get(Axis::Z), f)?;
        Ok(())
    }
}

/// Writes a step value with a sign and five decimal places.
///
/// Five places are enough to show the finest microstep fraction (1/32 =
/// 0.03125) without rounding.
pub fn udisplay_steps<W>(
    value: f64,
    f: &mut Formatter<W>,
) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    let magnitude = if value >= 0.0 {
        f.write_char('+')?;
        value
    } else {
        f.write_char('-')?;
        -value
    };

    // Scale to hundred-thousandths; all in-envelope positions fit a u64.
    let scaled = (magnitude * 100_000.0 + 0.5) as u64;
    let int_part = scaled / 100_000;
    let frc_part = scaled % 100_000;

    int_part.fmt(f)?;
    f.write_char('.')?;

    let mut divisor = 10_000;
    while divisor > 1 && frc_part < divisor {
        f.write_char('0')?;
        divisor /= 10;
    }
    if frc_part == 0 {
        f.write_char('0')?;
    } else {
        frc_part.fmt(f)?;
    }

    Ok(())
}
