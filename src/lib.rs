#![cfg_attr(not(test), no_std)]

pub mod drv8825;
pub mod gcode;
mod microseconds;
mod motion;

pub use microseconds::MicroSeconds;
pub use motion::Axis;
pub use motion::AxisMove;
pub use motion::AxisSet;
pub use motion::Direction;
pub use motion::DriverVariant;
pub use motion::Envelope;
pub use motion::ExecutedState;
pub use motion::MicrostepMode;
pub use motion::ModeLines;
pub use motion::MotionCommand;
pub use motion::MotionPlanner;
pub use motion::MotionQueue;
pub use motion::Phase;
pub use motion::PlanError;
pub use motion::Position;
pub use motion::QueueFull;
pub use motion::StepDriver;
pub use motion::StepExecutor;

#[cfg(test)]
pub use motion::RecordingDriver;
