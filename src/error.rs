//! Error types for the fallible table API and the invariant audit.

/// Failures surfaced by the `try_*` methods of [`BufTable`](crate::BufTable).
///
/// The infallible methods treat all of these as fatal and panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Reserving storage for the slot or probe array failed.
    #[error("allocation of {capacity} slots failed")]
    AllocFailed { capacity: usize },
    /// Growing past `capacity` would overflow `usize`.
    #[error("capacity overflow while growing from {capacity}")]
    CapacityOverflow { capacity: usize },
    /// The insertion would store a probe length larger than `max`.
    #[error("probe length would exceed {max}")]
    ProbeOverflow { max: u8 },
    /// Rehash target must not shrink and must exceed occupancy.
    #[error("invalid rehash target {target} (capacity {capacity}, occupancy {occupancy})")]
    RehashTarget {
        target: usize,
        capacity: usize,
        occupancy: usize,
    },
    #[error("invalid table config: {0}")]
    InvalidConfig(&'static str),
}

/// A broken structural invariant found by [`BufTable::audit`](crate::BufTable::audit).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("remaining {remaining} + occupancy {occupancy} must be below capacity {capacity}")]
    Budget {
        remaining: usize,
        occupancy: usize,
        capacity: usize,
    },
    #[error("backing arrays have lengths {probes}/{slots}, expected {capacity}")]
    Storage {
        probes: usize,
        slots: usize,
        capacity: usize,
    },
    #[error("counted {counted} occupied slots but occupancy is {occupancy}")]
    Occupancy { counted: usize, occupancy: usize },
    #[error("slot {index} stores probe length {stored}, actual displacement gives {expected}")]
    ProbeLength {
        index: usize,
        stored: u8,
        expected: usize,
    },
    #[error("slot {index} holds a key equal to slot {other}")]
    DuplicateKey { index: usize, other: usize },
    /// Search from the key's home index stops before reaching the slot.
    #[error("slot {index} is not reachable by search")]
    Unreachable { index: usize },
}
