use crate::motion::queue::QueueFull;
use crate::motion::Axis;
use crate::motion::AxisMove;
use crate::motion::Direction;
use crate::motion::DriverVariant;
use crate::motion::MicrostepMode;
use crate::motion::MotionCommand;
use crate::motion::MotionQueue;
use crate::motion::Position;

use embassy_sync::blocking_mutex::raw::RawMutex;
use ufmt_macros::uDebug;

/// Why a requested move could not be planned.
///
/// A rejected move has no side effects at all: nothing is queued and the
/// pending position is unchanged.
#[derive(Debug, uDebug, PartialEq, Eq, Copy, Clone)]
pub enum PlanError {
    /// The named axis's travel distance is not an exact multiple of any
    /// microstep fraction the driver variant supports. The whole move is
    /// rejected because all three axes must share one mode.
    Unreachable(Axis),
    /// The motion queue is at capacity.
    QueueFull,
}

impl From<QueueFull> for PlanError {
    fn from(_: QueueFull) -> Self {
        PlanError::QueueFull
    }
}

/// Machine envelope: per-axis travel bounds, in steps.
///
/// Targets outside the envelope are clamped to it silently; that is
/// envelope enforcement, not an error.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Envelope {
    bounds: [(f64, f64); 3],
}
impl Envelope {
    /// Creates an envelope from per-axis `(min, max)` step bounds.
    pub fn new(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Self {
        Self { bounds: [x, y, z] }
    }

    /// An envelope with the same `[min, max]` bounds on every axis.
    pub fn uniform(min: f64, max: f64) -> Self {
        Self::new((min, max), (min, max), (min, max))
    }

    /// Clamps a target position into the envelope.
    pub fn clamp(&self, target: Position) -> Position {
        let mut clamped = target;
        for axis in Axis::ALL {
            let (min, max) = self.bounds[axis.index()];
            let value = target.get(axis);
            if value < min {
                clamped.set(axis, min);
            } else if value > max {
                clamped.set(axis, max);
            }
        }
        clamped
    }
}

/// Pending-position half of the machine state.
///
/// Written only by the planner (the producer context). It records where the
/// machine will be once the queue drains, so that rapid successive move
/// requests compose correctly before execution catches up. The executor's
/// odometer lives in [crate::motion::ExecutedState]; the two halves join
/// only through the queue.
#[derive(Debug, PartialEq, Copy, Clone)]
struct PlannedState {
    pending: Position,
}

/// Turns target positions into queued motion commands.
///
/// # Type Parameters
///
/// - `M`: Raw mutex type of the shared [MotionQueue].
/// - `N`: Capacity of the shared [MotionQueue].
pub struct MotionPlanner<'q, M: RawMutex, const N: usize> {
    queue: &'q MotionQueue<M, N>,
    envelope: Envelope,
    variant: DriverVariant,
    state: PlannedState,
}

impl<'q, M: RawMutex, const N: usize> MotionPlanner<'q, M, N> {
    /// Creates a planner starting from the machine origin.
    ///
    /// # Parameters
    ///
    /// - `queue`: Queue shared with the step executor.
    /// - `envelope`: Per-axis travel bounds.
    /// - `variant`: Driver chip variant, bounding the finest microstep
    ///   mode the planner may select.
    pub fn new(
        queue: &'q MotionQueue<M, N>,
        envelope: Envelope,
        variant: DriverVariant,
    ) -> Self {
        Self {
            queue,
            envelope,
            variant,
            state: PlannedState {
                pending: Position::origin(),
            },
        }
    }

    /// Position the machine will occupy once the queue drains.
    pub fn pending_position(&self) -> Position {
        self.state.pending
    }

    /// Plans a move to an absolute target position and queues it.
    ///
    /// The target is clamped to the envelope first. Then, per axis: the
    /// direction is `pending <= target` (zero-distance moves report
    /// positive), the distance is the absolute travel from the pending
    /// position, and the coarsest exactly-dividing microstep mode is
    /// looked up. The finest of the three per-axis modes becomes the
    /// command's shared mode, since finer granularity also divides every
    /// coarser axis's distance but not vice versa.
    ///
    /// The pending position is committed only after the push succeeds, so
    /// a failed call leaves the planner exactly as it was.
    pub fn go_to_absolute(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
    ) -> Result<(), PlanError> {
        let target = self.envelope.clamp(Position::new(x, y, z));

        let mut distances = [0.0f64; 3];
        let mut directions = [Direction::Positive; 3];
        let mut shared_mode = MicrostepMode::Full;

        for axis in Axis::ALL {
            let from = self.state.pending.get(axis);
            let to = target.get(axis);

            directions[axis.index()] = Direction::from_travel(from, to);
            let distance = abs_difference(from, to);
            distances[axis.index()] = distance;

            let mode = MicrostepMode::for_distance(
                distance,
                self.variant.finest_mode(),
            )
            .ok_or(PlanError::Unreachable(axis))?;

            // All axes share one mode input, so keep the finest
            // requirement seen so far.
            if mode > shared_mode {
                shared_mode = mode;
            }
        }

        let mut moves = [AxisMove::zero(); 3];
        for axis in Axis::ALL {
            moves[axis.index()] = AxisMove {
                steps: shared_mode.step_count(distances[axis.index()]),
                direction: directions[axis.index()],
            };
        }

        self.queue.push(MotionCommand::new(moves, shared_mode))?;
        self.state.pending = target;
        Ok(())
    }

    /// Plans a move relative to the pending position and queues it.
    pub fn append_relative(
        &mut self,
        dx: f64,
        dy: f64,
        dz: f64,
    ) -> Result<(), PlanError> {
        let pending = self.state.pending;
        self.go_to_absolute(
            pending.get(Axis::X) + dx,
            pending.get(Axis::Y) + dy,
            pending.get(Axis::Z) + dz,
        )
    }

    /// Queues a return to the machine origin.
    ///
    /// The Z axis retracts first so the tool clears the workpiece before X
    /// and Y travel together. Each leg is split into a whole-step move
    /// followed by its fractional remainder, so the bulk of the travel
    /// runs at full steps instead of microstepping the entire distance.
    ///
    /// Stops at the first planning error; legs already queued stay queued.
    pub fn return_to_origin(&mut self) -> Result<(), PlanError> {
        let z_whole = whole_steps(self.state.pending.get(Axis::Z));
        self.append_relative(0.0, 0.0, -z_whole)?;
        self.append_relative(0.0, 0.0, -self.state.pending.get(Axis::Z))?;

        let x_whole = whole_steps(self.state.pending.get(Axis::X));
        let y_whole = whole_steps(self.state.pending.get(Axis::Y));
        self.append_relative(-x_whole, -y_whole, 0.0)?;
        self.append_relative(
            -self.state.pending.get(Axis::X),
            -self.state.pending.get(Axis::Y),
            0.0,
        )
    }
}

/// Whole-step part of a position, truncated toward zero.
fn whole_steps(value: f64) -> f64 {
    value as i64 as f64
}

/// Absolute difference, without `f64::abs` (not available in `core` on the
/// toolchains this crate targets).
fn abs_difference(a: f64, b: f64) -> f64 {
    if a <= b {
        b - a
    } else {
        a - b
    }
}
