use proptest::prelude::*;
use robin_bufmap::{Buf, BufTable, TableConfig};
use std::collections::HashMap;

// Model random put/del traffic over a small key space on the public API and
// assert presence, values, counters and structure after every step.
proptest! {
    #[test]
    fn prop_bufmap_matches_model(
        keys in 1usize..=64,
        ops in proptest::collection::vec((0u8..=2u8, 0usize..1000usize, 0usize..4usize), 1..300),
    ) {
        let key_bytes: Vec<Vec<u8>> = (0..keys).map(|k| format!("k{}", k).into_bytes()).collect();
        let values: Vec<Vec<u8>> = (0..4).map(|v| vec![v as u8; v]).collect();
        let mut m = BufTable::new();
        let mut model: HashMap<usize, usize> = HashMap::new();
        let mut max_cap = m.capacity();

        for (op, raw_k, v) in ops {
            let k = raw_k % keys;
            let key = Buf::from(&key_bytes[k]);
            match op {
                // Put: reports whether the key already existed
                0 => {
                    let before = m.len();
                    let existed = m.put(key, Buf::from(&values[v]));
                    prop_assert_eq!(existed, model.insert(k, v).is_some());
                    prop_assert_eq!(m.len(), if existed { before } else { before + 1 });
                }
                // Del: reports presence
                1 => {
                    let before = m.len();
                    let removed = m.del(key);
                    prop_assert_eq!(removed, model.remove(&k).is_some());
                    prop_assert_eq!(m.len(), if removed { before - 1 } else { before });
                }
                // Get: same descriptor as the one stored
                2 => {
                    match (m.get(key), model.get(&k)) {
                        (Some(got), Some(&v)) => prop_assert!(got.ptr_eq(&Buf::from(&values[v]))),
                        (None, None) => {}
                        (got, want) => prop_assert!(false, "get mismatch: {:?} vs {:?}", got, want),
                    }
                }
                _ => unreachable!(),
            }

            // Invariants after each step
            prop_assert!(m.validate());
            prop_assert!(m.remaining() + m.len() < m.capacity());
            prop_assert!(m.capacity() >= max_cap);
            max_cap = m.capacity();
        }

        m.audit().map_err(|v| TestCaseError::fail(v.to_string()))?;
        prop_assert_eq!(m.len(), model.len());
        for (k, bytes) in key_bytes.iter().enumerate() {
            prop_assert_eq!(m.contains_key(Buf::from(bytes)), model.contains_key(&k));
        }
    }
}

// Any valid configuration keeps the structural invariants through growth.
proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_configs_preserve_invariants(
        default_capacity in 1usize..40,
        max_load in 0.3f64..0.95,
        min_frac in 0.1f64..0.9,
        growth in 2usize..5,
        n in 1u32..600,
    ) {
        let config = TableConfig::new()
            .with_default_capacity(default_capacity)
            .with_max_load_factor(max_load)
            .with_min_load_factor(max_load * min_frac)
            .with_growth_factor(growth);
        prop_assert!(config.validate().is_ok());

        let keys: Vec<[u8; 4]> = (0..n).map(u32::to_le_bytes).collect();
        let mut m = BufTable::with_config(0, config, robin_bufmap::Fnv1BuildHasher);
        for k in &keys {
            prop_assert!(!m.put(Buf::from(k), Buf::EMPTY));
            prop_assert!(m.validate());
        }
        m.audit().map_err(|v| TestCaseError::fail(v.to_string()))?;
        for k in keys.iter().step_by(2) {
            prop_assert!(m.del(Buf::from(k)));
        }
        m.audit().map_err(|v| TestCaseError::fail(v.to_string()))?;
        prop_assert_eq!(m.len(), keys.len() / 2);
    }
}
