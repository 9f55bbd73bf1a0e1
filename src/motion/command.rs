use crate::motion::Axis;
use crate::motion::AxisSet;
use crate::motion::Direction;
use crate::motion::MicrostepMode;

use ufmt_macros::uDebug;

/// Motion of a single axis within a command.
#[derive(Debug, uDebug, PartialEq, Eq, Copy, Clone)]
pub struct AxisMove {
    /// Number of step pulses to emit.
    ///
    /// The step count is deliberately "dumb": the planner has already folded
    /// the microstep mode into it, so the executor just counts pulses.
    pub steps: u32,
    /// Level to drive on the direction line while pulsing.
    pub direction: Direction,
}
impl AxisMove {
    /// A zero-length move. The direction is the planner's zero-distance
    /// convention (positive).
    pub fn zero() -> Self {
        Self {
            steps: 0,
            direction: Direction::Positive,
        }
    }
}

/// One queued unit of motion.
///
/// Created by the planner, consumed and destroyed by the executor. A
/// command is exclusively owned by whichever structure currently holds it
/// (the queue, or the executor's working copy); it is never aliased.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct MotionCommand {
    moves: [AxisMove; 3],
    mode: MicrostepMode,
}
impl MotionCommand {
    /// Creates a new command.
    ///
    /// # Parameters
    ///
    /// - `moves`: Per-axis step counts and directions, indexed by
    ///   [Axis::index].
    /// - `mode`: The shared microstep mode for all three axes.
    pub fn new(moves: [AxisMove; 3], mode: MicrostepMode) -> Self {
        Self { moves, mode }
    }

    /// Returns the move for one axis.
    pub fn axis(&self, axis: Axis) -> AxisMove {
        self.moves[axis.index()]
    }

    /// Returns the shared microstep mode.
    pub fn mode(&self) -> MicrostepMode {
        self.mode
    }

    /// Largest step count across the three axes.
    ///
    /// This is the number of iterations of the executor's pulse loop.
    pub fn longest_axis_steps(&self) -> u32 {
        self.moves.iter().map(|m| m.steps).max().unwrap_or(0)
    }

    /// Returns `true` when every axis has a zero step count.
    ///
    /// Such a command is valid but vacuous; the executor skips it without
    /// touching the hardware.
    pub fn is_noop(&self) -> bool {
        self.moves.iter().all(|m| m.steps == 0)
    }

    /// Axes that still require a pulse at iteration `pulse_index` of the
    /// pulse loop.
    pub fn axes_pending_at(&self, pulse_index: u32) -> AxisSet {
        let mut set = AxisSet::empty();
        for axis in Axis::ALL {
            if pulse_index < self.axis(axis).steps {
                set.insert(axis);
            }
        }
        set
    }
}
