//! Tests for EntityTreeGenerator and GeneratorPolicy

use std::collections::HashSet;

use rstest::rstest;

use dendromerge::domain::generator::{
    group_leaf_name, unique_group_name, unique_leaf_name, DEFAULT_CANDIDATE_GROUPS,
};
use dendromerge::domain::{DomainError, EntityTreeGenerator, GeneratorPolicy};
use dendromerge::util::testing::{init_test_setup, seeded};

fn pool(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================
// Shape of the generated hierarchy
// ============================================================

#[test]
fn given_entity_when_generating_then_root_is_entity_name() {
    init_test_setup();
    let tree = EntityTreeGenerator::default().generate("Alice", &mut seeded(1));
    assert_eq!(tree.name, "Alice");
    assert!(!tree.nested);
}

#[rstest]
fn given_any_seed_when_generating_then_first_child_is_nested_unique_branch(
    #[values(0, 1, 2, 3, 42, 1234)] seed: u64,
) {
    // Act
    let tree = EntityTreeGenerator::default().generate("Alice", &mut seeded(seed));

    // Assert
    let unique = &tree.children[0];
    assert_eq!(unique.name, unique_group_name("Alice"));
    assert!(unique.nested);
    assert_eq!(unique.children.len(), 1);
    assert_eq!(unique.children[0].name, unique_leaf_name("Alice"));
    assert!(unique.children[0].is_leaf());
}

#[rstest]
fn given_any_seed_when_generating_then_second_child_is_shared_branch(
    #[values(0, 1, 2, 3, 42, 1234)] seed: u64,
) {
    let tree = EntityTreeGenerator::default().generate("Bob", &mut seeded(seed));

    let shared = &tree.children[1];
    assert_eq!(shared.name, "OU=Admins");
    assert!(!shared.nested);
    assert_eq!(shared.children.len(), 1);
    assert_eq!(shared.children[0].name, "Permission-Admin-Shared");
}

#[rstest]
fn given_any_seed_when_generating_then_draws_two_to_four_distinct_groups(
    #[values(0, 1, 2, 3, 4, 5, 6, 7, 42, 1234)] seed: u64,
) {
    // Act
    let tree = EntityTreeGenerator::default().generate("Alice", &mut seeded(seed));

    // Assert
    let drawn = &tree.children[2..];
    assert!(
        (2..=4).contains(&drawn.len()),
        "expected 2..=4 groups, got {}",
        drawn.len()
    );
    let names: HashSet<&str> = drawn.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names.len(), drawn.len(), "groups drawn without replacement");
    for group in drawn {
        assert!(DEFAULT_CANDIDATE_GROUPS.contains(&group.name.as_str()));
        assert!(
            (1..=3).contains(&group.children.len()),
            "expected 1..=3 leaves below {}, got {}",
            group.name,
            group.children.len()
        );
        for (i, leaf) in group.children.iter().enumerate() {
            assert_eq!(leaf.name, group_leaf_name(&group.name, "Alice", i));
            assert!(leaf.is_leaf());
        }
    }
}

#[test]
fn given_many_seeds_when_generating_then_every_group_count_occurs() {
    let generator = EntityTreeGenerator::default();
    let counts: HashSet<usize> = (0..200)
        .map(|seed| generator.generate("Alice", &mut seeded(seed)).children.len() - 2)
        .collect();
    assert_eq!(counts, HashSet::from([2, 3, 4]));
}

#[test]
fn given_same_seed_when_generating_twice_then_trees_are_equal() {
    let generator = EntityTreeGenerator::default();
    let a = generator.generate("Alice", &mut seeded(99));
    let b = generator.generate("Alice", &mut seeded(99));
    assert_eq!(a, b);
}

#[test]
fn given_two_entities_when_generating_then_leaf_names_embed_entity() {
    let generator = EntityTreeGenerator::default();
    let mut rng = seeded(5);
    let alice = generator.generate("Alice", &mut rng);
    let bob = generator.generate("Bob", &mut rng);

    let leaves = |tree: &dendromerge::domain::SourceNode| -> HashSet<String> {
        tree.children[2..]
            .iter()
            .flat_map(|g| g.children.iter().map(|l| l.name.clone()))
            .collect()
    };
    assert!(leaves(&alice).is_disjoint(&leaves(&bob)));
}

// ============================================================
// Policy
// ============================================================

#[test]
fn given_full_range_policy_when_generating_then_draws_whole_pool() {
    // Arrange
    let policy = GeneratorPolicy::new(
        "OU=Shared",
        "Permission-Shared",
        pool(&["OU=A", "OU=B"]),
        (2, 2),
        (1, 1),
    )
    .unwrap();

    // Act
    let tree = EntityTreeGenerator::new(policy).generate("Carol", &mut seeded(0));

    // Assert
    assert_eq!(tree.children.len(), 4);
    assert_eq!(tree.children[1].name, "OU=Shared");
    let drawn: HashSet<&str> = tree.children[2..].iter().map(|g| g.name.as_str()).collect();
    assert_eq!(drawn, HashSet::from(["OU=A", "OU=B"]));
    assert!(tree.children[2..].iter().all(|g| g.children.len() == 1));
}

#[test]
fn given_default_policy_then_matches_documented_shape() {
    let policy = GeneratorPolicy::default();
    assert_eq!(policy.shared_group(), "OU=Admins");
    assert_eq!(policy.shared_leaf(), "Permission-Admin-Shared");
    assert_eq!(policy.candidate_groups().len(), 4);
    assert_eq!(policy.group_range(), (2, 4));
    assert_eq!(policy.leaf_range(), (1, 3));
}

#[rstest]
#[case::empty_shared_group("", "leaf", &["OU=A", "OU=B"], (1, 2), (1, 1), DomainError::EmptyName("shared_group"))]
#[case::empty_shared_leaf("OU=S", "", &["OU=A", "OU=B"], (1, 2), (1, 1), DomainError::EmptyName("shared_leaf"))]
#[case::leaf_is_shared_group("X", "X", &["OU=A", "OU=B"], (1, 2), (1, 1), DomainError::ReservedLeaf("X".into()))]
#[case::leaf_is_candidate("OU=Admins", "OU=Finance", &["OU=Finance", "OU=HR"], (2, 2), (1, 1), DomainError::ReservedLeaf("OU=Finance".into()))]
#[case::duplicate("OU=S", "leaf", &["OU=A", "OU=A"], (1, 2), (1, 1), DomainError::DuplicateCandidate("OU=A".into()))]
#[case::reserved("OU=S", "leaf", &["OU=A", "OU=S"], (1, 2), (1, 1), DomainError::ReservedCandidate("OU=S".into()))]
#[case::zero_groups("OU=S", "leaf", &["OU=A", "OU=B"], (0, 2), (1, 1), DomainError::InvalidRange { what: "group", min: 0, max: 2 })]
#[case::inverted_groups("OU=S", "leaf", &["OU=A", "OU=B"], (2, 1), (1, 1), DomainError::InvalidRange { what: "group", min: 2, max: 1 })]
#[case::inverted_leaves("OU=S", "leaf", &["OU=A", "OU=B"], (1, 2), (3, 1), DomainError::InvalidRange { what: "leaf", min: 3, max: 1 })]
#[case::pool_too_small("OU=S", "leaf", &["OU=A", "OU=B"], (1, 3), (1, 1), DomainError::PoolTooSmall { pool: 2, required: 3 })]
fn given_invalid_policy_when_creating_then_errors(
    #[case] shared_group: &str,
    #[case] shared_leaf: &str,
    #[case] candidates: &[&str],
    #[case] groups: (usize, usize),
    #[case] leaves: (usize, usize),
    #[case] expected: DomainError,
) {
    let result = GeneratorPolicy::new(shared_group, shared_leaf, pool(candidates), groups, leaves);
    assert_eq!(result, Err(expected));
}
