#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can check
// internal table invariants after every step.

use crate::chained_hash_map::ChainedHashMap;
use crate::cursor::Cursor;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    TryInsert(usize, i32),
    Erase(usize),
    Remove(usize),
    Find(usize),
    Contains(String),
    Mutate(usize, i32),
    Walk,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::TryInsert(i, v)),
            2 => idx.clone().prop_map(Op::Erase),
            1 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Find),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(Op::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Walk),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap.
// Invariants exercised after every op:
// - len/is_empty parity with the model.
// - Count equals the sum of chain lengths; every entry sits in the slot its
//   stored hash selects; load factor at most one half.
// - Erased cursors never resolve again.
fn run_state_machine<S>(
    mut sut: ChainedHashMap<Key, i32, S>,
    pool: Vec<String>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut stale: Vec<Cursor> = Vec::new();

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = key_from(&pool, i);
                let buckets = sut.bucket_count();
                let existed = model.contains_key(&k);
                prop_assert_eq!(sut.insert(k.clone(), v), model.insert(k, v));
                if existed {
                    prop_assert_eq!(sut.bucket_count(), buckets, "overwrite must not grow");
                }
            }
            Op::TryInsert(i, v) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.try_insert(k.clone(), v), Ok(model.insert(k, v)));
            }
            Op::Erase(i) => {
                let k = key_from(&pool, i);
                let c = sut.find(&k);
                match model.remove(&k) {
                    Some(mv) => {
                        let (kk, vv) = sut.erase(c).expect("live cursor erases");
                        prop_assert_eq!(kk, k);
                        prop_assert_eq!(vv, mv);
                        stale.push(c);
                    }
                    None => {
                        prop_assert!(sut.is_end(c));
                        prop_assert!(sut.erase(c).is_err());
                    }
                }
            }
            Op::Remove(i) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
            }
            Op::Find(i) => {
                let k = key_from(&pool, i);
                let c = sut.find(&k);
                prop_assert_eq!(sut.value_at(c), model.get(&k));
                prop_assert_eq!(sut.is_end(c), !model.contains_key(&k));
                if !sut.is_end(c) {
                    prop_assert_eq!(c.bucket(), sut.bucket_index(&k));
                    prop_assert_eq!(sut.key_at(c), Some(&k));
                }
            }
            Op::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            Op::Mutate(i, d) => {
                let k = key_from(&pool, i);
                if let Some(v) = sut.get_mut(&k) {
                    *v = v.saturating_add(d);
                    let mv = model.get_mut(&k).expect("model tracks live key");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            Op::Walk => {
                let mut seen = BTreeSet::new();
                let mut c = sut.begin();
                let mut steps = 0;
                while c != sut.end() {
                    let (k, v) = sut.entry_at(c).expect("walk stays on live entries");
                    prop_assert_eq!(model.get(k), Some(v));
                    prop_assert!(seen.insert(k.clone()), "entry visited twice");
                    c = sut.advance(c);
                    steps += 1;
                }
                prop_assert_eq!(steps, sut.len());
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(&seen, &m_keys);
                let i_keys: BTreeSet<_> = sut.keys().cloned().collect();
                prop_assert_eq!(i_keys, m_keys);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.begin(), sut.end());
            }
        }

        for &c in &stale {
            prop_assert!(sut.entry_at(c).is_err(), "erased cursor resolved");
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        sut.assert_invariants();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(ChainedHashMap::new(), pool, ops)?;
    }
}

// Collision variant using a constant hasher: every key shares bucket 0, so
// chain search, middle-of-chain erase and slot release are all stressed.
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

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(ChainedHashMap::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}

// Property: from any insert sequence, bucket_count ends at the smallest
// prime that keeps len / buckets at or below one half.
proptest! {
    #[test]
    fn prop_bucket_count_is_minimal_prime(keys in proptest::collection::vec(any::<u32>(), 0..400)) {
        let mut m: ChainedHashMap<u32, ()> = ChainedHashMap::new();
        for k in keys {
            m.insert(k, ());
        }
        let expected = crate::growth::PRIMES
            .iter()
            .copied()
            .find(|&p| !crate::growth::exceeds_load(m.len(), p))
            .unwrap();
        prop_assert_eq!(m.bucket_count(), expected);
    }
}
