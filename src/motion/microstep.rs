use ufmt_macros::uDebug;

/// Microstep mode of the driver chip.
///
/// Each mode selects what fraction of one full motor step a single pulse
/// advances. The chip has a single set of mode inputs shared by every axis,
/// so exactly one mode is active machine-wide at any instant.
///
/// Modes are ordered coarsest to finest, so `Ord` comparisons read as
/// "finer than".
#[derive(Debug, uDebug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub enum MicrostepMode {
    /// Full step (2-phase excitation).
    Full,
    /// 1/2 step (1-2 phase excitation).
    Half,
    /// 1/4 step (W1-2 phase excitation).
    Quarter,
    /// 8 microsteps per step.
    Eighth,
    /// 16 microsteps per step.
    Sixteenth,
    /// 32 microsteps per step. Not available on all driver variants.
    ThirtySecond,
}
impl MicrostepMode {
    /// All modes, coarsest first.
    pub const ALL: [MicrostepMode; 6] = [
        MicrostepMode::Full,
        MicrostepMode::Half,
        MicrostepMode::Quarter,
        MicrostepMode::Eighth,
        MicrostepMode::Sixteenth,
        MicrostepMode::ThirtySecond,
    ];

    /// Fraction of a full step that one pulse advances in this mode.
    pub fn step_fraction(&self) -> f64 {
        1.0 / (1u32 << self.index()) as f64
    }

    /// Levels for the MODE0/MODE1/MODE2 input pins selecting this mode.
    ///
    /// The encoding is the binary mode index with MODE0 as the least
    /// significant bit, matching the DRV8825 decay/mode truth table.
    pub fn mode_lines(&self) -> ModeLines {
        let index = self.index() as u8;
        ModeLines {
            mode_0: index & 0b001 != 0,
            mode_1: index & 0b010 != 0,
            mode_2: index & 0b100 != 0,
        }
    }

    /// Coarsest mode whose step fraction divides `distance` exactly.
    ///
    /// Modes are checked coarsest first, down to `finest`; the first exact
    /// match wins, so the result is the mode reaching `distance` in the
    /// smallest number of pulses. Zero distance trivially matches
    /// [MicrostepMode::Full].
    ///
    /// Returns `None` when not even `finest` divides the distance exactly.
    /// This is a hard rejection rather than a best-effort rounding: rounding
    /// here would silently accumulate positional drift over repeated moves.
    pub fn for_distance(
        distance: f64,
        finest: MicrostepMode,
    ) -> Option<MicrostepMode> {
        MicrostepMode::ALL
            .into_iter()
            .filter(|mode| *mode <= finest)
            .find(|mode| {
                let (_, covered) = accumulate(distance, mode.step_fraction());
                covered == distance
            })
    }

    /// Number of pulses of this mode's fraction needed to cover `distance`.
    ///
    /// Computed by repeated accumulation rather than a single division, so
    /// that the count agrees bit-for-bit with the divisibility check in
    /// [MicrostepMode::for_distance] (a division could round differently at
    /// the boundary and produce an off-by-one count).
    pub fn step_count(&self, distance: f64) -> u32 {
        let (steps, _) = accumulate(distance, self.step_fraction());
        steps
    }

    fn index(&self) -> usize {
        match self {
            MicrostepMode::Full => 0,
            MicrostepMode::Half => 1,
            MicrostepMode::Quarter => 2,
            MicrostepMode::Eighth => 3,
            MicrostepMode::Sixteenth => 4,
            MicrostepMode::ThirtySecond => 5,
        }
    }
}

/// Levels for the three shared mode input pins.
#[derive(Debug, uDebug, PartialEq, Eq, Copy, Clone)]
pub struct ModeLines {
    pub mode_0: bool,
    pub mode_1: bool,
    pub mode_2: bool,
}

/// Driver chip variant attached to the board.
///
/// The variant bounds the finest microstep mode the planner may select.
#[derive(Debug, uDebug, PartialEq, Eq, Copy, Clone)]
pub enum DriverVariant {
    /// DRV8825: down to 1/32 microsteps.
    Drv8825,
    /// A4988: down to 1/16 microsteps.
    A4988,
}
impl DriverVariant {
    /// Finest microstep mode the variant supports.
    pub fn finest_mode(&self) -> MicrostepMode {
        match self {
            DriverVariant::Drv8825 => MicrostepMode::ThirtySecond,
            DriverVariant::A4988 => MicrostepMode::Sixteenth,
        }
    }
}

/// Accumulates `fraction` until it covers `distance`.
///
/// Returns the number of accumulation steps and the total distance covered.
/// The covered distance equals `distance` exactly iff `fraction` divides
/// `distance` with zero remainder under f64 arithmetic.
fn accumulate(distance: f64, fraction: f64) -> (u32, f64) {
    let mut steps: u32 = 0;
    let mut covered: f64 = 0.0;
    while covered < distance {
        covered += fraction;
        steps += 1;
    }
    (steps, covered)
}
