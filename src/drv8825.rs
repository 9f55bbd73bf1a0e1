//! DRV8825 driver board, behind the [StepDriver] seam.
//!
//! Data sheet: <https://www.ti.com/lit/gpn/drv8825>
//!
//! All datasheet timing lives in this module, applied through the supplied
//! [DelayNs]. The delays are blocking busy-waits by contract: pulse-timing
//! correctness depends on bounded jitter, so the executor's inner loop must
//! not yield while a command runs.

use crate::motion::Axis;
use crate::motion::AxisSet;
use crate::motion::Direction;
use crate::motion::MicrostepMode;
use crate::motion::StepDriver;
use crate::MicroSeconds;

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Step and direction pins for one axis.
pub struct AxisPins<P> {
    pub step: P,
    pub direction: P,
}

/// DRV8825 (or A4988) board driven over plain GPIO output pins.
///
/// All pins share one type; HALs with dynamic pin identifiers satisfy this
/// directly. Pins must be infallible, which every memory-mapped GPIO
/// implementation is.
///
/// The chip's SLEEP/ENABLE/RESET and MODE lines are single traces shared by
/// all three axis drivers on the reference board, which is why enable state
/// and microstep mode are machine-wide rather than per-axis.
///
/// # Type Parameters
///
/// - `P`: Output pin type.
/// - `D`: Delay provider.
pub struct Drv8825<P, D> {
    axes: [AxisPins<P>; 3],
    mode_pins: [P; 3],
    sleep_pin: P,
    enable_pin: P,
    reset_pin: P,
    spindle_pin: P,
    delay: D,
    enabled: bool,
    spindle: bool,
}

impl<P, D> Drv8825<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    /// Minimum STEP high and low pulse width. Datasheet: 1.9 us each;
    /// together they bound the maximum safe step frequency.
    pub const STEP_PULSE: MicroSeconds = MicroSeconds::new(2);

    /// Setup plus hold time for direction and mode line changes relative
    /// to a STEP rising edge. Datasheet: 650 ns each.
    pub const SETUP_HOLD: MicroSeconds = MicroSeconds::new(2);

    /// Wakeup time from nSLEEP inactive until STEP input is accepted.
    /// Datasheet: 1.7 ms.
    pub const WAKE: MicroSeconds = MicroSeconds::from_millis(2);

    /// Settle time after nENBL or nRESET changes. Datasheet: 650 ns.
    pub const ENABLE_SETTLE: MicroSeconds = MicroSeconds::new(1);

    /// Spindle wind-up time from power-on until it is safe to engage the
    /// workpiece. Applies on enable only; wind-down is immediate.
    pub const SPINDLE_WIND_UP: MicroSeconds = MicroSeconds::from_millis(200);

    /// Creates a driver. The chip starts powered down with the spindle
    /// off; lines are driven to that state immediately.
    pub fn new(
        x: AxisPins<P>,
        y: AxisPins<P>,
        z: AxisPins<P>,
        mode_pins: [P; 3],
        sleep_pin: P,
        enable_pin: P,
        reset_pin: P,
        spindle_pin: P,
        delay: D,
    ) -> Self {
        let mut driver = Self {
            axes: [x, y, z],
            mode_pins,
            sleep_pin,
            enable_pin,
            reset_pin,
            spindle_pin,
            delay,
            enabled: false,
            spindle: false,
        };
        driver.force_power_down();
        infallible(driver.spindle_pin.set_low());
        driver
    }

    /// Drives the power-down levels without checking tracked state.
    fn force_power_down(&mut self) {
        infallible(self.sleep_pin.set_low());
        infallible(self.enable_pin.set_high());
        infallible(self.reset_pin.set_low());
    }

    fn delay_us(&mut self, duration: MicroSeconds) {
        self.delay.delay_us(duration.get_value());
    }
}

impl<P, D> StepDriver for Drv8825<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    /// Powers the chip up or down.
    ///
    /// Power-up order is wake (nSLEEP high), then output enable (nENBL
    /// low), then reset release (nRESET high), each followed by its settle
    /// time. Repeated calls in the same state are free: the sequencing is
    /// skipped, which is what makes re-arming between queued commands
    /// cheap.
    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        if enabled {
            infallible(self.sleep_pin.set_high());
            self.delay_us(Self::WAKE);
            infallible(self.enable_pin.set_low());
            self.delay_us(Self::ENABLE_SETTLE);
            infallible(self.reset_pin.set_high());
            self.delay_us(Self::ENABLE_SETTLE);
        } else {
            self.force_power_down();
        }
        self.enabled = enabled;
    }

    fn set_mode(&mut self, mode: MicrostepMode) {
        let lines = mode.mode_lines();
        let levels = [lines.mode_0, lines.mode_1, lines.mode_2];
        for (pin, level) in self.mode_pins.iter_mut().zip(levels) {
            infallible(pin.set_state(level.into()));
            self.delay.delay_us(Self::SETUP_HOLD.get_value());
        }
    }

    fn set_direction(&mut self, axis: Axis, direction: Direction) {
        let pin = &mut self.axes[axis.index()].direction;
        match direction {
            Direction::Positive => infallible(pin.set_high()),
            Direction::Negative => infallible(pin.set_low()),
        }
        self.delay_us(Self::SETUP_HOLD);
    }

    /// One simultaneous step pulse.
    ///
    /// All requested step lines rise together, hold for the minimum high
    /// width, fall together, then hold low, so the axes stride in lockstep
    /// within the pulse.
    fn step_pulse(&mut self, axes: AxisSet) {
        for axis in axes.iter() {
            infallible(self.axes[axis.index()].step.set_high());
        }
        self.delay_us(Self::STEP_PULSE);
        for axis in axes.iter() {
            infallible(self.axes[axis.index()].step.set_low());
        }
        self.delay_us(Self::STEP_PULSE);
    }

    /// Switches the spindle relay.
    ///
    /// Enabling blocks for the wind-up time so the workpiece is never
    /// engaged by a spindle still coming up to speed. Disabling is
    /// deliberately immediate: the documented risk is a premature stop
    /// while still engaged, and holding the relay on any longer than
    /// needed makes that worse, not better.
    fn set_spindle(&mut self, enabled: bool) {
        if self.spindle == enabled {
            return;
        }
        if enabled {
            infallible(self.spindle_pin.set_high());
            self.delay_us(Self::SPINDLE_WIND_UP);
        } else {
            infallible(self.spindle_pin.set_low());
        }
        self.spindle = enabled;
    }
}

/// Unwraps a result that cannot fail.
fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// A line write or delay, as seen by the hardware.
    #[derive(Debug, PartialEq, Copy, Clone)]
    enum Event {
        Set(&'static str, bool),
        DelayNs(u32),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    #[derive(Clone)]
    struct MockPin {
        name: &'static str,
        log: Log,
    }
    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }
    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(Event::Set(self.name, false));
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(Event::Set(self.name, true));
            Ok(())
        }
    }

    struct MockDelay {
        log: Log,
    }
    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.log.borrow_mut().push(Event::DelayNs(ns));
        }
    }

    /// Builds a driver whose every pin and delay writes to one shared log,
    /// and drains the construction-time events.
    fn driver_with_log() -> (Drv8825<MockPin, MockDelay>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let pin = |name| MockPin {
            name,
            log: log.clone(),
        };
        let axis = |step, direction| AxisPins {
            step: pin(step),
            direction: pin(direction),
        };
        let driver = Drv8825::new(
            axis("x_step", "x_dir"),
            axis("y_step", "y_dir"),
            axis("z_step", "z_dir"),
            [pin("mode0"), pin("mode1"), pin("mode2")],
            pin("sleep"),
            pin("enable"),
            pin("reset"),
            pin("spindle"),
            MockDelay { log: log.clone() },
        );
        log.borrow_mut().clear();
        (driver, log)
    }

    fn delay_event(duration: MicroSeconds) -> Event {
        Event::DelayNs(duration.get_value() * 1_000)
    }

    type Chip = Drv8825<MockPin, MockDelay>;

    #[test]
    fn test_construction_powers_down() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let pin = |name| MockPin {
            name,
            log: log.clone(),
        };
        let axis = |step, direction| AxisPins {
            step: pin(step),
            direction: pin(direction),
        };
        let _driver = Drv8825::new(
            axis("x_step", "x_dir"),
            axis("y_step", "y_dir"),
            axis("z_step", "z_dir"),
            [pin("mode0"), pin("mode1"), pin("mode2")],
            pin("sleep"),
            pin("enable"),
            pin("reset"),
            pin("spindle"),
            MockDelay { log: log.clone() },
        );
        assert_eq!(
            vec![
                Event::Set("sleep", false),
                Event::Set("enable", true),
                Event::Set("reset", false),
                Event::Set("spindle", false),
            ],
            *log.borrow()
        );
    }

    #[test]
    fn test_power_up_sequencing() {
        let (mut driver, log) = driver_with_log();
        driver.set_enabled(true);

        assert_eq!(
            vec![
                Event::Set("sleep", true),
                delay_event(Chip::WAKE),
                Event::Set("enable", false),
                delay_event(Chip::ENABLE_SETTLE),
                Event::Set("reset", true),
                delay_event(Chip::ENABLE_SETTLE),
            ],
            *log.borrow()
        );
    }

    #[test]
    fn test_enable_is_level_aware() {
        let (mut driver, log) = driver_with_log();
        driver.set_enabled(true);
        log.borrow_mut().clear();

        // Second enable in the same state touches nothing.
        driver.set_enabled(true);
        assert!(log.borrow().is_empty());

        driver.set_enabled(false);
        assert_eq!(
            vec![
                Event::Set("sleep", false),
                Event::Set("enable", true),
                Event::Set("reset", false),
            ],
            *log.borrow()
        );
    }

    #[test]
    fn test_mode_lines_with_setup_hold() {
        let (mut driver, log) = driver_with_log();
        driver.set_mode(MicrostepMode::Sixteenth);

        assert_eq!(
            vec![
                Event::Set("mode0", false),
                delay_event(Chip::SETUP_HOLD),
                Event::Set("mode1", false),
                delay_event(Chip::SETUP_HOLD),
                Event::Set("mode2", true),
                delay_event(Chip::SETUP_HOLD),
            ],
            *log.borrow()
        );
    }

    #[test]
    fn test_direction_levels() {
        let (mut driver, log) = driver_with_log();
        driver.set_direction(Axis::Y, Direction::Negative);
        driver.set_direction(Axis::Z, Direction::Positive);

        assert_eq!(
            vec![
                Event::Set("y_dir", false),
                delay_event(Chip::SETUP_HOLD),
                Event::Set("z_dir", true),
                delay_event(Chip::SETUP_HOLD),
            ],
            *log.borrow()
        );
    }

    #[test]
    fn test_step_pulse_is_simultaneous() {
        let (mut driver, log) = driver_with_log();
        let mut axes = AxisSet::empty();
        axes.insert(Axis::X);
        axes.insert(Axis::Z);
        driver.step_pulse(axes);

        assert_eq!(
            vec![
                Event::Set("x_step", true),
                Event::Set("z_step", true),
                delay_event(Chip::STEP_PULSE),
                Event::Set("x_step", false),
                Event::Set("z_step", false),
                delay_event(Chip::STEP_PULSE),
            ],
            *log.borrow()
        );
    }

    #[test]
    fn test_spindle_wind_up_is_asymmetric() {
        let (mut driver, log) = driver_with_log();
        driver.set_spindle(true);
        assert_eq!(
            vec![
                Event::Set("spindle", true),
                delay_event(Chip::SPINDLE_WIND_UP),
            ],
            *log.borrow()
        );

        log.borrow_mut().clear();
        driver.set_spindle(false);
        assert_eq!(vec![Event::Set("spindle", false)], *log.borrow());
    }
}
