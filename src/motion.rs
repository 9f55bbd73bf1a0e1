mod axis;
mod command;
mod direction;
mod executor;
mod microstep;
mod planner;
mod queue;
mod state;

pub use axis::Axis;
pub use axis::AxisSet;
pub use command::AxisMove;
pub use command::MotionCommand;
pub use direction::Direction;
pub use executor::ExecutedState;
pub use executor::Phase;
pub use executor::StepDriver;
pub use executor::StepExecutor;
pub use microstep::DriverVariant;
pub use microstep::MicrostepMode;
pub use microstep::ModeLines;
pub use planner::Envelope;
pub use planner::MotionPlanner;
pub use planner::PlanError;
pub use queue::MotionQueue;
pub use queue::QueueFull;
pub use state::Position;

#[cfg(test)]
pub use executor::RecordingDriver;
