use ufmt_macros::uDebug;

/// Describes the direction of travel along an axis.
#[derive(Debug, uDebug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    /// Positive direction is associated with a "high" direction signal.
    Positive,
    /// Negative direction is associated with a "low" direction signal.
    Negative,
}
impl Direction {
    /// Direction of travel from one position to another.
    ///
    /// A zero-length move reports `Positive`. The tie-break is deliberate:
    /// it affects nothing downstream because zero-step moves never pulse,
    /// but it keeps the planner's direction computation total.
    pub fn from_travel(from: f64, to: f64) -> Self {
        if from <= to {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }
}
