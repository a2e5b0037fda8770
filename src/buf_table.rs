//! BufTable: Robin Hood open-addressing table over borrowed byte buffers.
//!
//! Storage is two co-indexed arrays: `probe[i]` holds the probe length of
//! slot `i` (0 = empty, 1 = at its home index, k = displaced by k - 1) and
//! `slots[i]` holds the key/value descriptors. Probe scans touch only the
//! byte array until a candidate needs a key comparison.

use core::hash::{BuildHasher, Hasher};

use crate::buf::Buf;
use crate::config::TableConfig;
use crate::error::{InvariantViolation, TableError};
use crate::hash::Fnv1BuildHasher;

#[derive(Clone, Copy, Debug)]
struct Slot<'a> {
    key: Buf<'a>,
    value: Buf<'a>,
}

impl<'a> Slot<'a> {
    const EMPTY: Slot<'a> = Slot {
        key: Buf::EMPTY,
        value: Buf::EMPTY,
    };
}

/// Open-addressing map from key bytes to value bytes.
///
/// The table stores `Buf` descriptors only; it never copies or frees the
/// referenced bytes. Callers own cleanup of bytes belonging to overwritten or
/// deleted entries.
pub struct BufTable<'a, S = Fnv1BuildHasher> {
    hasher: S,
    config: TableConfig,
    capacity: usize,
    occupancy: usize,
    remaining: usize, // insertions left before growth
    probe: Vec<u8>,
    slots: Vec<Slot<'a>>,
}

impl<'a> BufTable<'a> {
    /// Table at the default capacity (16).
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Table with `capacity` slots; 0 selects the default capacity.
    /// Panics if the storage cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(capacity, TableConfig::default(), Fnv1BuildHasher)
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self, TableError> {
        Self::try_with_config(capacity, TableConfig::default(), Fnv1BuildHasher)
    }
}

impl<'a> Default for BufTable<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, S> BufTable<'a, S>
where
    S: BuildHasher + Clone,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_config(0, TableConfig::default(), hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self::with_config(capacity, TableConfig::default(), hasher)
    }

    /// Panicking form of [`try_with_config`](Self::try_with_config).
    pub fn with_config(capacity: usize, config: TableConfig, hasher: S) -> Self {
        match Self::try_with_config(capacity, config, hasher) {
            Ok(table) => table,
            Err(err) => panic!("BufTable allocation failed: {err}"),
        }
    }

    /// Allocate a table. A `capacity` of 0 selects `config.default_capacity`;
    /// the insertion budget starts at `floor(capacity * max_load_factor)`.
    pub fn try_with_config(
        capacity: usize,
        config: TableConfig,
        hasher: S,
    ) -> Result<Self, TableError> {
        config.validate()?;
        let capacity = config.resolve_capacity(capacity);

        let mut probe = Vec::new();
        probe
            .try_reserve_exact(capacity)
            .map_err(|_| TableError::AllocFailed { capacity })?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| TableError::AllocFailed { capacity })?;
        probe.resize(capacity, 0);
        slots.resize(capacity, Slot::EMPTY);

        Ok(Self {
            hasher,
            config,
            capacity,
            occupancy: 0,
            remaining: config.budget(capacity),
            probe,
            slots,
        })
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.occupancy
    }
    pub fn is_empty(&self) -> bool {
        self.occupancy == 0
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    /// Insertions of new keys left before the table grows.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
    pub fn config(&self) -> &TableConfig {
        &self.config
    }
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Cheap consistency predicate: both arrays are sized to capacity and
    /// `remaining + occupancy < capacity`, which guarantees an empty slot.
    pub fn validate(&self) -> bool {
        self.probe.len() == self.capacity
            && self.slots.len() == self.capacity
            && self.remaining + self.occupancy < self.capacity
    }

    /// Release the table's storage. Equivalent to dropping it, but asserts
    /// validity first in debug builds.
    pub fn free(self) {
        debug_assert!(self.validate(), "freeing an invalid BufTable");
        drop(self);
    }

    #[inline]
    fn home(&self, key: Buf<'_>) -> usize {
        let mut h = self.hasher.build_hasher();
        h.write(key.as_bytes());
        (h.finish() % self.capacity as u64) as usize
    }

    #[inline]
    fn next(&self, i: usize) -> usize {
        let j = i + 1;
        if j == self.capacity {
            0
        } else {
            j
        }
    }

    /// Robin Hood search. A resident whose probe length is below the current
    /// probe counter (an empty slot included) ends the search, since the key
    /// would have displaced it on insertion.
    fn find_index(&self, key: Buf<'_>) -> Option<usize> {
        let mut i = self.home(key);
        let mut probe = 1usize;
        while probe <= usize::from(self.probe[i]) {
            debug_assert!(probe <= self.occupancy);
            if self.slots[i].key.as_bytes() == key.as_bytes() {
                return Some(i);
            }
            i = self.next(i);
            probe += 1;
        }
        None
    }

    pub fn get(&self, key: Buf<'_>) -> Option<Buf<'a>> {
        debug_assert!(self.validate());
        self.find_index(key).map(|i| self.slots[i].value)
    }

    pub fn contains_key(&self, key: Buf<'_>) -> bool {
        debug_assert!(self.validate());
        self.find_index(key).is_some()
    }

    /// Insert or update. Returns `true` if the key already existed (its value
    /// was replaced), `false` if a new entry was added. Panics where
    /// [`try_put`](Self::try_put) would return an error.
    pub fn put(&mut self, key: Buf<'a>, value: Buf<'a>) -> bool {
        match self.try_put(key, value) {
            Ok(existed) => existed,
            Err(err) => panic!("BufTable put failed: {err}"),
        }
    }

    /// Insert or update, reporting growth and probe-length failures.
    ///
    /// On error the table is unchanged in content and still valid: a probe
    /// overflow is detected before any slot moves, and a failed growth
    /// removes the just-inserted entry again.
    pub fn try_put(&mut self, key: Buf<'a>, value: Buf<'a>) -> Result<bool, TableError> {
        debug_assert!(self.validate());
        if let Some(i) = self.find_index(key) {
            self.slots[i].value = value;
            return Ok(true);
        }

        let home = self.home(key);
        self.check_insert(home)?;
        self.insert_at(home, Slot { key, value });

        if self.remaining <= 1 {
            if let Err(err) = self.grow() {
                tracing::warn!(
                    capacity = self.capacity,
                    occupancy = self.occupancy,
                    error = %err,
                    "growth failed; rolling back insertion"
                );
                if let Some(i) = self.find_index(key) {
                    self.remove_at(i);
                }
                return Err(err);
            }
        } else {
            self.remaining -= 1;
        }
        Ok(false)
    }

    /// Dry run of the insertion walk from `home` over the probe array only.
    /// Fails if any probe length the walk would store exceeds `u8::MAX`.
    fn check_insert(&self, home: usize) -> Result<(), TableError> {
        let max = usize::from(u8::MAX);
        let mut i = home;
        let mut carried = 1usize;
        loop {
            let resident = usize::from(self.probe[i]);
            if carried > resident && carried > max {
                return Err(TableError::ProbeOverflow { max: u8::MAX });
            }
            if resident == 0 {
                return Ok(());
            }
            carried = carried.min(resident);
            i = self.next(i);
            carried += 1;
        }
    }

    /// Robin Hood insertion of a key known to be absent. The carried entry
    /// takes any slot whose resident is closer to home, and the evicted
    /// resident continues the walk. Callers run `check_insert` first.
    fn insert_at(&mut self, home: usize, mut slot: Slot<'a>) {
        let mut i = home;
        let mut carried: u8 = 1;
        while self.probe[i] != 0 {
            debug_assert!(usize::from(carried) <= self.occupancy);
            if carried > self.probe[i] {
                core::mem::swap(&mut self.probe[i], &mut carried);
                core::mem::swap(&mut self.slots[i], &mut slot);
            }
            i = self.next(i);
            carried += 1;
        }
        self.probe[i] = carried;
        self.slots[i] = slot;
        self.occupancy += 1;
    }

    /// Remove the entry for `key`. Returns `true` if it was present.
    pub fn del(&mut self, key: Buf<'_>) -> bool {
        debug_assert!(self.validate());
        match self.find_index(key) {
            Some(i) => {
                self.remove_at(i);
                self.remaining += 1;
                true
            }
            None => false,
        }
    }

    /// Backward-shift deletion: pull each following displaced entry back one
    /// slot until an empty or home slot, leaving no tombstone.
    fn remove_at(&mut self, mut i: usize) {
        self.probe[i] = 0;
        let mut j = self.next(i);
        while self.probe[j] > 1 {
            self.slots[i] = self.slots[j];
            self.probe[i] = self.probe[j] - 1;
            self.probe[j] = 0;
            i = j;
            j = self.next(j);
        }
        // Drop the stale descriptors of the vacated slot.
        self.slots[i] = Slot::EMPTY;
        self.occupancy -= 1;
    }

    /// Smallest capacity reached by repeated multiplication by the growth
    /// factor (at least once) at which load is at or below the low-water mark.
    fn grow_target(&self) -> Result<usize, TableError> {
        let mut target = self.capacity;
        loop {
            target = target
                .checked_mul(self.config.growth_factor)
                .ok_or(TableError::CapacityOverflow {
                    capacity: self.capacity,
                })?;
            if !self.config.above_low_water(self.occupancy, target) {
                return Ok(target);
            }
        }
    }

    fn grow(&mut self) -> Result<(), TableError> {
        let target = self.grow_target()?;
        tracing::debug!(
            from = self.capacity,
            to = target,
            occupancy = self.occupancy,
            "growing table"
        );
        self.rehash_into(target)
    }

    /// Panicking form of [`try_rehash`](Self::try_rehash).
    pub fn rehash(&mut self, capacity: usize) {
        if let Err(err) = self.try_rehash(capacity) {
            panic!("BufTable rehash failed: {err}");
        }
    }

    /// Move every entry into fresh storage of `capacity` slots. Growth only:
    /// `capacity` must not be below the current capacity and must exceed the
    /// occupancy. On error the table is left as it was.
    pub fn try_rehash(&mut self, capacity: usize) -> Result<(), TableError> {
        debug_assert!(self.validate());
        if capacity < self.capacity || capacity <= self.occupancy {
            return Err(TableError::RehashTarget {
                target: capacity,
                capacity: self.capacity,
                occupancy: self.occupancy,
            });
        }
        self.rehash_into(capacity)
    }

    fn rehash_into(&mut self, capacity: usize) -> Result<(), TableError> {
        let mut fresh = Self::try_with_config(capacity, self.config, self.hasher.clone())?;
        for i in 0..self.capacity {
            if fresh.occupancy == self.occupancy {
                break;
            }
            if self.probe[i] != 0 {
                let slot = self.slots[i];
                let home = fresh.home(slot.key);
                fresh.check_insert(home)?;
                fresh.insert_at(home, slot);
            }
        }
        debug_assert_eq!(fresh.occupancy, self.occupancy);
        fresh.remaining = fresh.remaining.saturating_sub(fresh.occupancy);
        *self = fresh;
        tracing::trace!(
            capacity = self.capacity,
            occupancy = self.occupancy,
            remaining = self.remaining,
            "rehash complete"
        );
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn probe_lengths(&self) -> &[u8] {
        &self.probe
    }

    /// Full structural scan. Checks the counters, that every probe length
    /// matches the entry's distance from its home index, and that every
    /// entry is the one search finds for its key.
    pub fn audit(&self) -> Result<(), InvariantViolation> {
        if self.probe.len() != self.capacity || self.slots.len() != self.capacity {
            return Err(InvariantViolation::Storage {
                probes: self.probe.len(),
                slots: self.slots.len(),
                capacity: self.capacity,
            });
        }
        if self.remaining + self.occupancy >= self.capacity {
            return Err(InvariantViolation::Budget {
                remaining: self.remaining,
                occupancy: self.occupancy,
                capacity: self.capacity,
            });
        }

        let mut counted = 0;
        for (index, &stored) in self.probe.iter().enumerate() {
            if stored == 0 {
                continue;
            }
            counted += 1;
            let key = self.slots[index].key;
            let home = self.home(key);
            let expected = (index + self.capacity - home) % self.capacity + 1;
            if usize::from(stored) != expected {
                return Err(InvariantViolation::ProbeLength {
                    index,
                    stored,
                    expected,
                });
            }
            match self.find_index(key) {
                Some(found) if found == index => {}
                Some(other) => return Err(InvariantViolation::DuplicateKey { index, other }),
                None => return Err(InvariantViolation::Unreachable { index }),
            }
        }
        if counted != self.occupancy {
            return Err(InvariantViolation::Occupancy {
                counted,
                occupancy: self.occupancy,
            });
        }
        Ok(())
    }
}
