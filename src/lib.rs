//! robin-bufmap: an open-addressing hash table over borrowed byte buffers,
//! using Robin Hood probing and backward-shift deletion.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, predictable key-value engine for higher-level stores,
//!   caches and interpreters. Probe lengths stay bounded and deletions leave
//!   no tombstones behind.
//! - Layers:
//!   - `Buf<'a>`: a borrowed view of bytes used for keys and values.
//!   - `fnv1` / `Fnv1BuildHasher`: the default key hash.
//!   - `BufTable<'a, S>`: the table engine (search, insert, delete, growth,
//!     rehash, invariant checks).
//!
//! Constraints
//! - Single-threaded: mutation takes `&mut self`; no locks or atomics.
//! - The table never copies key or value bytes. It stores `Buf` descriptors,
//!   and the `'a` lifetime keeps the referenced bytes alive for as long as
//!   the table is.
//! - Rehash copies descriptors, not bytes.
//! - No iteration order is promised, and the table never shrinks.
//!
//! Storage layout
//! - Two co-indexed arrays: `probe: Vec<u8>` and `slots: Vec<Slot>`.
//!   `probe[i] == 0` marks slot `i` empty; `probe[i] == k` means the entry
//!   sits `k - 1` slots past its home index `hash % capacity`.
//! - `remaining + occupancy < capacity` always holds, so every probe
//!   sequence reaches an empty slot.
//!
//! Growth
//! - Each new key spends one unit of the insertion budget
//!   (`floor(capacity * 0.9)` for a fresh table). When the budget runs out,
//!   capacity is doubled until load is at or below 0.5 and every entry is
//!   reinserted into fresh storage. See [`TableConfig`] for the knobs.
//!
//! Failure model
//! - Broken invariants are programmer errors. Every operation checks
//!   `validate()` under `debug_assertions`, and `audit()` performs a full
//!   structural scan for tests.
//! - The default API treats allocation failure and probe-length overflow as
//!   fatal and panics. The `try_*` methods return [`TableError`] instead and
//!   leave the table valid.
//!
//! Hashing
//! - The default FNV-1 variant (multiply, then xor, seed 1) is fast on
//!   trusted keys but offers no collision-attack resistance. Pass a keyed
//!   `BuildHasher` (e.g. `RandomState`) when keys come from untrusted input.

pub mod buf;
pub mod buf_table;
mod buf_table_proptest;
pub mod config;
pub mod error;
pub mod hash;

// Public surface
pub use buf::Buf;
pub use buf_table::BufTable;
pub use config::{TableConfig, DEFAULT_CAPACITY};
pub use error::{InvariantViolation, TableError};
pub use hash::{fnv1, Fnv1BuildHasher, Fnv1Hasher};
