#![cfg(test)]

// Property tests for BufTable kept inside the crate so they can look at the
// probe array directly.

use crate::buf::Buf;
use crate::buf_table::BufTable;
use crate::config::TableConfig;
use crate::error::TableError;
use proptest::prelude::*;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, usize),
    Get(usize),
    Del(usize),
    Probe(String),
    Rehash(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), 0usize..VALUES).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Del),
            1 => "[a-z]{0,5}".prop_map(OpI::Probe),
            1 => (0usize..64).prop_map(OpI::Rehash),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

const VALUES: usize = 8;

fn value_pool() -> Vec<Vec<u8>> {
    (0..VALUES).map(|i| format!("value-{i}").into_bytes()).collect()
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put` reports prior existence exactly when the model has the key.
// - `get` returns the very descriptor last stored for the key.
// - `del` reports presence and removes the key.
// - Capacity never decreases; rehash requests below capacity are refused.
// - After every op: `validate()`, a clean `audit()`, and len parity.
fn run_state_machine<'a, S>(
    mut sut: BufTable<'a, S>,
    pool: &'a [String],
    values: &'a [Vec<u8>],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone,
{
    let mut model: HashMap<&str, usize> = HashMap::new();
    let mut last_capacity = sut.capacity();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = pool[i].as_str();
                let existed = sut.put(Buf::from(k), Buf::from(&values[v]));
                prop_assert_eq!(existed, model.insert(k, v).is_some());
            }
            OpI::Get(i) => {
                let k = pool[i].as_str();
                let got = sut.get(Buf::from(k));
                match model.get(k) {
                    Some(&v) => {
                        let got = got.expect("model has key");
                        prop_assert!(got.ptr_eq(&Buf::from(&values[v])));
                    }
                    None => prop_assert!(got.is_none()),
                }
            }
            OpI::Del(i) => {
                let k = pool[i].as_str();
                let remaining = sut.remaining();
                let removed = sut.del(Buf::from(k));
                prop_assert_eq!(removed, model.remove(k).is_some());
                if removed {
                    prop_assert_eq!(sut.remaining(), remaining + 1);
                } else {
                    prop_assert_eq!(sut.remaining(), remaining);
                }
                prop_assert!(!sut.contains_key(Buf::from(k)));
            }
            OpI::Probe(s) => {
                // Keys outside the pool are usually absent.
                prop_assert_eq!(sut.contains_key(Buf::from(s.as_str())), model.contains_key(s.as_str()));
            }
            OpI::Rehash(extra) => {
                let target = sut.capacity() + extra;
                match sut.try_rehash(target) {
                    Ok(()) => prop_assert_eq!(sut.capacity(), target),
                    Err(TableError::RehashTarget { .. }) => {
                        prop_assert!(target <= sut.len());
                    }
                    Err(other) => prop_assert!(false, "unexpected rehash error: {}", other),
                }
            }
        }

        prop_assert!(sut.validate());
        if let Err(v) = sut.audit() {
            prop_assert!(false, "audit failed: {}", v);
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.capacity() >= last_capacity, "capacity shrank");
        last_capacity = sut.capacity();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), hint in 0usize..8) {
        let values = value_pool();
        run_state_machine(BufTable::with_capacity(hint), &pool, &values, ops)?;
    }
}

// Collision variant using a constant hasher: every key shares one home
// index, so probe lengths grow linearly and backward shift does real work.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Two-bucket hasher: keys split by their first byte's parity, which makes
// neighbouring clusters interleave and exercises Robin Hood eviction.
#[derive(Clone, Default)]
struct ParityBuildHasher;
struct ParityHasher(u64);
impl BuildHasher for ParityBuildHasher {
    type Hasher = ParityHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ParityHasher(0)
    }
}
impl Hasher for ParityHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0 = bytes.first().map_or(0, |b| u64::from(b & 1));
    }
    fn finish(&self) -> u64 {
        self.0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let values = value_pool();
        run_state_machine(BufTable::with_hasher(ConstBuildHasher), &pool, &values, ops)?;
    }

    #[test]
    fn prop_state_machine_two_clusters((pool, ops) in arb_scenario()) {
        let values = value_pool();
        let config = TableConfig::new().with_default_capacity(2);
        run_state_machine(BufTable::with_config(0, config, ParityBuildHasher), &pool, &values, ops)?;
    }
}

// Property: whatever the order of insertions and deletions, probe lengths
// along any run never increase by more than one from slot to slot.
proptest! {
    #[test]
    fn prop_probe_runs_are_gradual(keys in proptest::collection::vec(any::<u16>(), 1..300), del_mask in any::<u64>()) {
        let bytes: Vec<[u8; 2]> = keys.iter().map(|k| k.to_le_bytes()).collect();
        let mut t = BufTable::new();
        for k in &bytes {
            t.put(Buf::from(k), Buf::EMPTY);
        }
        for (n, k) in bytes.iter().enumerate() {
            if del_mask & (1 << (n % 64)) != 0 {
                t.del(Buf::from(k));
            }
        }
        let probe = t.probe_lengths();
        let cap = probe.len();
        for i in 0..cap {
            let next = probe[(i + 1) % cap];
            if next > 1 {
                prop_assert!(
                    usize::from(next) <= usize::from(probe[i]) + 1,
                    "probe jumps at slot {}",
                    i
                );
            }
        }
        t.audit().map_err(|v| TestCaseError::fail(v.to_string()))?;
    }
}
