use proptest::prelude::*;
use termgraph_store::{GraphSink, TripleStore};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn interning_is_order_independent(
        iris in prop::collection::vec("[A-Z]{1,4}/[0-9]{1,3}", 1..40),
        seed in any::<u64>(),
    ) {
        let mut forward = TripleStore::new();
        let first: Vec<_> = iris.iter().map(|s| forward.intern(s)).collect();

        // Re-interning in any order never changes a handle.
        let mut shuffled: Vec<usize> = (0..iris.len()).collect();
        shuffled.sort_by_key(|i| (*i as u64).wrapping_mul(seed | 1).rotate_left(17));
        for i in shuffled {
            prop_assert_eq!(forward.intern(&iris[i]), first[i]);
        }

        // Equal strings share a handle, distinct strings never do.
        for (i, a) in iris.iter().enumerate() {
            for (j, b) in iris.iter().enumerate() {
                prop_assert_eq!(a == b, first[i] == first[j]);
            }
        }
    }
}
