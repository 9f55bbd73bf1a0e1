use ufmt_macros::uDebug;

/// Machine axis.
///
/// Identifies which physical step/direction line pair of the driver board a
/// value refers to.
#[derive(Debug, uDebug, PartialEq, Eq, Copy, Clone)]
pub enum Axis {
    X,
    Y,
    Z,
}
impl Axis {
    /// All axes, in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the array index of the axis.
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Set of axes, stored as a bitmask.
///
/// The step executor uses an `AxisSet` to describe which step lines must be
/// asserted together during a single pulse.
#[derive(Debug, uDebug, PartialEq, Eq, Copy, Clone)]
pub struct AxisSet(u8);
impl AxisSet {
    /// Creates an empty set.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Adds an axis to the set.
    pub fn insert(&mut self, axis: Axis) {
        self.0 |= 1 << axis.index();
    }

    /// Returns `true` if the set contains `axis`.
    pub fn contains(&self, axis: Axis) -> bool {
        self.0 & (1 << axis.index()) != 0
    }

    /// Returns `true` if the set contains no axes.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates over the axes in the set, in index order.
    pub fn iter(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.into_iter().filter(|axis| self.contains(*axis))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_axis_index() {
        assert_eq!(0, Axis::X.index());
        assert_eq!(1, Axis::Y.index());
        assert_eq!(2, Axis::Z.index());
    }

    #[test]
    fn test_empty_set() {
        let set = AxisSet::empty();
        assert!(set.is_empty());
        for axis in Axis::ALL {
            assert!(!set.contains(axis));
        }
        assert_eq!(0, set.iter().count());
    }

    #[test]
    fn test_insert_contains() {
        let mut set = AxisSet::empty();
        set.insert(Axis::X);
        set.insert(Axis::Z);
        assert!(!set.is_empty());
        assert!(set.contains(Axis::X));
        assert!(!set.contains(Axis::Y));
        assert!(set.contains(Axis::Z));
    }

    #[test]
    fn test_insert_idempotent() {
        let mut set = AxisSet::empty();
        set.insert(Axis::Y);
        set.insert(Axis::Y);
        let collected: Vec<Axis> = set.iter().collect();
        assert_eq!(vec![Axis::Y], collected);
    }

    #[test]
    fn test_iter_order() {
        let mut set = AxisSet::empty();
        set.insert(Axis::Z);
        set.insert(Axis::X);
        let collected: Vec<Axis> = set.iter().collect();
        assert_eq!(vec![Axis::X, Axis::Z], collected);
    }
}
