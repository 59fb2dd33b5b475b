//! Identity types for Tickline

use std::fmt;

/// Entity identity - unique within a world snapshot
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntityId(pub u64);

impl EntityId {
    pub const ZERO: EntityId = EntityId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        EntityId(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        EntityId(id)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logical tick identity
///
/// Tick IDs are authoritative simulation time. `TickId::ZERO` is reserved
/// for "nothing consumed yet".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TickId(pub u64);

impl TickId {
    pub const ZERO: TickId = TickId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        TickId(id)
    }

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    /// The tick right after this one
    #[inline]
    pub fn next(self) -> Self {
        TickId(self.0.saturating_add(1))
    }
}

impl From<u64> for TickId {
    fn from(id: u64) -> Self {
        TickId(id)
    }
}

impl fmt::Debug for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tick({})", self.0)
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_ordering() {
        assert!(TickId::new(1) > TickId::ZERO);
        assert_eq!(TickId::new(4).next(), TickId::new(5));
        assert_eq!(TickId::new(u64::MAX).next(), TickId::new(u64::MAX));
    }

    #[test]
    fn test_id_formatting() {
        assert_eq!(format!("{:?}", EntityId::new(7)), "Entity(7)");
        assert_eq!(TickId::from(12).to_string(), "12");
    }
}
