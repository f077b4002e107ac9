// ChainedHashMap property tests over the public API.
//
// Property 1: insert/erase sequences against a BTreeMap model.
//  - Invariant after every op: len() == model.len(); every model key finds
//    its latest value; a cursor walk visits exactly len() distinct keys;
//    len / bucket_count <= 0.5.
//  - Operations: insert (new or overwrite), erase via find, clear.
//
// Property 2: collect/clone round-trip.
//  - A map collected from pairs equals the model of "last write wins", and
//    its clone stays equal after the original is cleared.
use chained_hashmap::growth::MAX_LOAD_FACTOR;
use chained_hashmap::ChainedHashMap;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

proptest! {
    #[test]
    fn prop_insert_erase_against_model(
        ops in proptest::collection::vec((0u8..=9u8, 0u16..300u16, any::<i64>()), 1..400)
    ) {
        let mut m: ChainedHashMap<u16, i64> = ChainedHashMap::new();
        let mut model: BTreeMap<u16, i64> = BTreeMap::new();

        for (op, k, v) in ops {
            match op {
                // Mostly inserts so the table grows through several primes.
                0..=5 => {
                    prop_assert_eq!(m.insert(k, v), model.insert(k, v));
                }
                6..=8 => {
                    let c = m.find(&k);
                    match model.remove(&k) {
                        Some(mv) => {
                            prop_assert_eq!(m.erase(c).ok(), Some((k, mv)));
                        }
                        None => {
                            prop_assert!(m.is_end(c));
                        }
                    }
                }
                9 => {
                    if k % 16 == 0 {
                        m.clear();
                        model.clear();
                    }
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(m.len(), model.len());
            prop_assert!(m.load_factor() <= MAX_LOAD_FACTOR);
            for (mk, mv) in &model {
                prop_assert_eq!(m.get(mk), Some(mv));
            }

            let mut seen = BTreeSet::new();
            let mut c = m.begin();
            while c != m.end() {
                prop_assert!(seen.insert(*m.key_at(c).unwrap()));
                c = m.advance(c);
            }
            prop_assert_eq!(seen.len(), m.len());
        }
    }
}

proptest! {
    #[test]
    fn prop_collect_and_clone(pairs in proptest::collection::vec((any::<u8>(), any::<u32>()), 0..200)) {
        let model: BTreeMap<u8, u32> = pairs.iter().copied().collect();
        let mut m: ChainedHashMap<u8, u32> = pairs.into_iter().collect();
        let snapshot = m.clone();
        m.clear();

        prop_assert!(m.is_empty());
        prop_assert_eq!(snapshot.len(), model.len());
        let got: BTreeMap<u8, u32> = snapshot.into_iter().collect();
        prop_assert_eq!(got, model);
    }
}
