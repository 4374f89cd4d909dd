//! Integration tests and laws for `PersistentHashSet`.

use std::collections::HashSet;

use proptest::prelude::*;
use rstest::rstest;
use trieste::persistent::PersistentHashSet;

fn sorted(set: &PersistentHashSet<i32>) -> Vec<i32> {
    let mut elements: Vec<i32> = set.iter().copied().collect();
    elements.sort_unstable();
    elements
}

// =============================================================================
// Scale Tests
// =============================================================================

#[rstest]
fn test_large_set_insert_contains_remove() {
    let mut set = PersistentHashSet::new();
    for index in 0..10_000 {
        set = set.insert(index);
    }
    assert_eq!(set.len(), 10_000);

    for index in (0..10_000).step_by(101) {
        assert!(set.contains(&index));
    }

    let mut shrunk = set.clone();
    for index in 0..5_000 {
        shrunk = shrunk.remove(&index);
    }
    assert_eq!(shrunk.len(), 5_000);
    assert!(!shrunk.contains(&0));
    assert!(shrunk.contains(&9_999));
    assert_eq!(set.len(), 10_000);
}

#[rstest]
fn test_set_version_chain() {
    let empty: PersistentHashSet<i32> = PersistentHashSet::new();
    let one = empty.insert(1);
    let two = one.insert(2);
    let back_to_one = two.remove(&1);

    assert_eq!(empty.len(), 0);
    assert_eq!(sorted(&one), vec![1]);
    assert_eq!(sorted(&two), vec![1, 2]);
    assert_eq!(sorted(&back_to_one), vec![2]);
}

// =============================================================================
// Set Algebra Laws
// =============================================================================

fn arbitrary_elements() -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::vec(-100i32..100, 0..50)
}

fn model(elements: &[i32]) -> HashSet<i32> {
    elements.iter().copied().collect()
}

fn build_set(elements: &[i32]) -> PersistentHashSet<i32> {
    elements.iter().copied().collect()
}

proptest! {
    #[test]
    fn law_set_matches_model(elements in arbitrary_elements()) {
        let set = build_set(&elements);
        let model = model(&elements);

        prop_assert_eq!(set.len(), model.len());
        for element in &model {
            prop_assert!(set.contains(element));
        }
    }

    #[test]
    fn law_union_matches_model(
        left in arbitrary_elements(),
        right in arbitrary_elements(),
    ) {
        let union = build_set(&left).union(&build_set(&right));
        let expected: HashSet<i32> = model(&left).union(&model(&right)).copied().collect();

        prop_assert_eq!(union.len(), expected.len());
        for element in &expected {
            prop_assert!(union.contains(element));
        }
    }

    #[test]
    fn law_intersection_matches_model(
        left in arbitrary_elements(),
        right in arbitrary_elements(),
    ) {
        let intersection = build_set(&left).intersection(&build_set(&right));
        let expected: HashSet<i32> =
            model(&left).intersection(&model(&right)).copied().collect();

        prop_assert_eq!(intersection.len(), expected.len());
        for element in &expected {
            prop_assert!(intersection.contains(element));
        }
    }

    #[test]
    fn law_difference_matches_model(
        left in arbitrary_elements(),
        right in arbitrary_elements(),
    ) {
        let difference = build_set(&left).difference(&build_set(&right));
        let expected: HashSet<i32> =
            model(&left).difference(&model(&right)).copied().collect();

        prop_assert_eq!(difference.len(), expected.len());
        for element in &expected {
            prop_assert!(difference.contains(element));
        }
    }

    #[test]
    fn law_symmetric_difference_matches_model(
        left in arbitrary_elements(),
        right in arbitrary_elements(),
    ) {
        let symmetric = build_set(&left).symmetric_difference(&build_set(&right));
        let expected: HashSet<i32> = model(&left)
            .symmetric_difference(&model(&right))
            .copied()
            .collect();

        prop_assert_eq!(symmetric.len(), expected.len());
        for element in &expected {
            prop_assert!(symmetric.contains(element));
        }
    }

    #[test]
    fn law_union_is_commutative(
        left in arbitrary_elements(),
        right in arbitrary_elements(),
    ) {
        let left = build_set(&left);
        let right = build_set(&right);
        prop_assert_eq!(left.union(&right), right.union(&left));
    }

    #[test]
    fn law_subset_relations_are_consistent(
        left in arbitrary_elements(),
        right in arbitrary_elements(),
    ) {
        let left = build_set(&left);
        let right = build_set(&right);
        let union = left.union(&right);

        prop_assert!(left.is_subset(&union));
        prop_assert!(right.is_subset(&union));
        prop_assert!(union.is_superset(&left));
        prop_assert_eq!(
            left.is_disjoint(&right),
            left.intersection(&right).is_empty()
        );
    }

    #[test]
    fn law_algebra_never_disturbs_operands(
        left in arbitrary_elements(),
        right in arbitrary_elements(),
    ) {
        let left = build_set(&left);
        let right = build_set(&right);
        let left_length = left.len();
        let right_length = right.len();

        let _union = left.union(&right);
        let _intersection = left.intersection(&right);
        let _difference = left.difference(&right);

        prop_assert_eq!(left.len(), left_length);
        prop_assert_eq!(right.len(), right_length);
    }

    #[test]
    fn law_insert_remove_round_trip(
        elements in arbitrary_elements(),
        element in -100i32..100,
    ) {
        let set = build_set(&elements);
        let without = set.insert(element).remove(&element);
        prop_assert!(!without.contains(&element));
        prop_assert_eq!(without, set.remove(&element));
    }
}

// =============================================================================
// View Tests
// =============================================================================

#[rstest]
fn test_view_chain_over_large_set() {
    let set: PersistentHashSet<i32> = (0..1_000).collect();

    let result = set
        .view()
        .filter(|element| element % 3 == 0)
        .map(|element| element * 2)
        .collect();

    assert_eq!(result.len(), 334); // 0, 3, ..., 999
    assert!(result.contains(&0));
    assert!(result.contains(&1_998));
    assert!(!result.contains(&2));
}

#[rstest]
fn test_view_deduplicates_on_collect() {
    let set: PersistentHashSet<i32> = (0..10).collect();

    // Mapping onto a smaller codomain collapses duplicates.
    let result = set.view().map(|element| element % 3).collect();
    assert_eq!(result.len(), 3);
}
