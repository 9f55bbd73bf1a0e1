use crate::motion::Axis;
use crate::motion::AxisSet;
use crate::motion::Direction;
use crate::motion::MicrostepMode;
use crate::motion::MotionCommand;
use crate::motion::MotionQueue;
use crate::motion::Position;

use embassy_sync::blocking_mutex::raw::RawMutex;
use ufmt_macros::uDebug;

/// Hardware seam for the step executor.
///
/// Implementations drive the physical control lines of a step/direction
/// driver board. All datasheet timing lives behind this trait: settle
/// delays inside `set_enabled`, setup/hold inside `set_direction` and
/// `set_mode`, and the minimum high/low pulse widths inside `step_pulse`.
/// That keeps the executor's state machine free of timing concerns, so an
/// implementation can busy-wait or use a hardware timer as it sees fit.
///
/// Line writes are assumed synchronous: each call takes effect before the
/// next one is made.
pub trait StepDriver {
    /// Powers the driver chip up or down, including any wake/enable/reset
    /// sequencing the chip requires.
    fn set_enabled(&mut self, enabled: bool);

    /// Applies the shared microstep mode lines.
    fn set_mode(&mut self, mode: MicrostepMode);

    /// Applies one axis's direction line level.
    fn set_direction(&mut self, axis: Axis, direction: Direction);

    /// Emits one timed step pulse simultaneously on every axis in `axes`.
    fn step_pulse(&mut self, axes: AxisSet);

    /// Switches the spindle relay.
    fn set_spindle(&mut self, enabled: bool);
}

/// Where the executor is in its per-command cycle.
#[derive(Debug, uDebug, PartialEq, Eq, Copy, Clone)]
pub enum Phase {
    /// Queue empty or paused; nothing is being executed.
    Idle,
    /// Driver power-up, direction, mode and spindle lines being applied.
    Arming,
    /// Step pulses being emitted.
    Pulsing,
    /// Command finished; deciding whether to continue or wind down.
    Settling,
}

/// Executed-position half of the machine state.
///
/// Written only by the executor (the consumer context). The planner's
/// pending position lives in its own record; the two halves join only
/// through the queue, so neither needs a lock.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct ExecutedState {
    position: Position,
    phase: Phase,
    mode: MicrostepMode,
    directions: [Direction; 3],
    driver_enabled: bool,
    spindle_enabled: bool,
}
impl ExecutedState {
    fn new() -> Self {
        Self {
            position: Position::origin(),
            phase: Phase::Idle,
            mode: MicrostepMode::Full,
            directions: [Direction::Positive; 3],
            driver_enabled: false,
            spindle_enabled: false,
        }
    }

    /// Physical position of the tool. Authoritative once the executor is
    /// idle; advances pulse by pulse while a command runs.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Current phase of the per-command cycle.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Microstep mode most recently applied to the hardware.
    pub fn mode(&self) -> MicrostepMode {
        self.mode
    }

    /// Direction line level most recently applied for one axis.
    pub fn direction(&self, axis: Axis) -> Direction {
        self.directions[axis.index()]
    }

    /// Whether the driver chip is powered.
    pub fn driver_enabled(&self) -> bool {
        self.driver_enabled
    }

    /// Whether the spindle is running.
    pub fn spindle_enabled(&self) -> bool {
        self.spindle_enabled
    }
}

/// Drains the motion queue and turns commands into timed pulse trains.
///
/// The executor runs in the consumer context. Its entry point is
/// [StepExecutor::poll], which the surrounding firmware calls from its
/// wait/wake loop; everything between two `poll` calls is the Idle phase.
///
/// Cancellation is only possible between commands: once a command arms, it
/// runs to completion. Clearing the queue's running gate stops consumption
/// at the next between-commands check.
pub struct StepExecutor<'q, M: RawMutex, const N: usize, D> {
    queue: &'q MotionQueue<M, N>,
    driver: D,
    state: ExecutedState,
}

impl<'q, M: RawMutex, const N: usize, D: StepDriver> StepExecutor<'q, M, N, D> {
    /// Creates an executor.
    ///
    /// # Parameters
    ///
    /// - `queue`: Queue shared with the motion planner.
    /// - `driver`: Hardware driver to pulse.
    pub fn new(queue: &'q MotionQueue<M, N>, driver: D) -> Self {
        Self {
            queue,
            driver,
            state: ExecutedState::new(),
        }
    }

    /// Read-only view of the executed machine state.
    pub fn state(&self) -> &ExecutedState {
        &self.state
    }

    /// Consumes the driver, returning it.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Drains and executes queued commands.
    ///
    /// Commands are executed back to back while the queue has entries and
    /// the running gate is set; the driver and spindle stay enabled across
    /// consecutive commands within the pass. When the pass ends (queue
    /// empty or paused), the executor winds down: spindle off first, then
    /// driver power-down.
    ///
    /// # Returns
    ///
    /// The number of commands that emitted pulses during this pass.
    pub fn poll(&mut self) -> usize {
        let mut executed = 0;

        while self.queue.is_running() {
            let Some(command) = self.queue.pop() else {
                break;
            };

            // Degenerate command: valid but vacuous. Skip without touching
            // the hardware; this is distinct from the planner-time
            // rejection of unreachable distances.
            if command.is_noop() {
                continue;
            }

            self.arm(&command);
            self.pulse(&command);
            self.state.phase = Phase::Settling;
            executed += 1;
        }

        self.wind_down();
        self.state.phase = Phase::Idle;
        executed
    }

    /// Arming phase: applies every non-pulse line the command needs.
    ///
    /// Order matters. The driver chip must be powered (wake, enable,
    /// reset, with settle delays applied inside the driver) before the
    /// direction and mode lines are guaranteed to register, and all of
    /// them need their setup time before the first pulse edge.
    fn arm(&mut self, command: &MotionCommand) {
        self.state.phase = Phase::Arming;

        self.driver.set_enabled(true);
        self.state.driver_enabled = true;

        for axis in Axis::ALL {
            let direction = command.axis(axis).direction;
            self.driver.set_direction(axis, direction);
            self.state.directions[axis.index()] = direction;
        }

        self.driver.set_mode(command.mode());
        self.state.mode = command.mode();

        self.driver.set_spindle(true);
        self.state.spindle_enabled = true;
    }

    /// Pulsing phase: emits the command's pulse train.
    ///
    /// Iterates a virtual counter up to the longest axis's step count; on
    /// each iteration, every axis still short of its own count gets a
    /// pulse, all asserted within the same `step_pulse` call. The odometer
    /// advances per pulse, which keeps the tracked position exact only
    /// because every pulse is physically emitted; duty-cycle skipping
    /// would break that.
    fn pulse(&mut self, command: &MotionCommand) {
        self.state.phase = Phase::Pulsing;
        let fraction = command.mode().step_fraction();

        for pulse_index in 0..command.longest_axis_steps() {
            let axes = command.axes_pending_at(pulse_index);
            self.driver.step_pulse(axes);
            for axis in axes.iter() {
                self.state.position.advance(
                    axis,
                    fraction,
                    command.axis(axis).direction,
                );
            }
        }
    }

    /// Settling decision at the end of a pass: wind the hardware down.
    ///
    /// The spindle is released before the driver chip so the workpiece is
    /// never engaged by a de-powered axis. Spindle wind-down is immediate
    /// (the wind-up delay applies on enable only).
    fn wind_down(&mut self) {
        if self.state.spindle_enabled {
            self.driver.set_spindle(false);
            self.state.spindle_enabled = false;
        }
        if self.state.driver_enabled {
            self.driver.set_enabled(false);
            self.state.driver_enabled = false;
        }
    }
}

#[cfg(test)]
pub use test::RecordingDriver;
