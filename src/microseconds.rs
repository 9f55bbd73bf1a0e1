/// Time in microseconds.
#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Copy, Clone)]
pub struct MicroSeconds(u32);
impl MicroSeconds {
    /// Creates a new `MicroSeconds`.
    ///
    /// This is a `const fn` so that datasheet timing requirements can be
    /// expressed as associated constants.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Creates a `MicroSeconds` from a number of milliseconds.
    pub const fn from_millis(value: u32) -> Self {
        Self(value * 1_000)
    }

    /// Returns the value as a `u32`.
    pub fn get_value(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_get() {
        assert_eq!(42, MicroSeconds::new(42).get_value());
    }

    #[test]
    fn test_from_millis() {
        assert_eq!(MicroSeconds::new(200_000), MicroSeconds::from_millis(200));
    }
}
