mod command;
mod parse_gcode;
mod parse_steps;

pub use command::Command;
pub use command::CommandParser;
pub use command::Error;
pub use command::Move;
pub use parse_gcode::parse_gcodes;
pub use parse_gcode::GCode;
pub use parse_gcode::Linear;
pub use parse_gcode::G;
pub use parse_gcode::M;
pub use parse_steps::parse_steps;
