//! Tests for MergeSession on hand-built source hierarchies

use dendromerge::domain::{Category, MergeSession, SourceNode};
use dendromerge::util::testing::init_test_setup;

fn leaf(name: &str) -> SourceNode {
    SourceNode::new(name)
}

fn child_names(session: &MergeSession, name: &str) -> Vec<String> {
    let idx = session.lookup(name).expect("registered");
    let tree = session.tree();
    tree.get_node(idx)
        .unwrap()
        .children
        .iter()
        .map(|&c| tree.get_node(c).unwrap().data.name.clone())
        .collect()
}

fn root_child_names(session: &MergeSession) -> Vec<String> {
    let tree = session.tree();
    tree.get_node(session.root())
        .unwrap()
        .children
        .iter()
        .map(|&c| tree.get_node(c).unwrap().data.name.clone())
        .collect()
}

#[test]
fn given_entity_tree_when_merging_then_children_fold_into_root() {
    init_test_setup();
    // Arrange
    let alice = SourceNode::new("Alice")
        .with_child(SourceNode::new("G1").with_child(leaf("p1")))
        .with_child(leaf("G2"));

    // Act
    let mut session = MergeSession::new("Permissions");
    session.merge_entity(&alice);

    // Assert
    assert_eq!(root_child_names(&session), ["G1", "G2"]);
    assert!(session.lookup("Alice").is_none(), "entity node is not inserted");
    assert!(session.lookup("p1").is_some(), "descendants are registered");
    assert_eq!(session.tree().len(), 4);
}

#[test]
fn given_first_insertion_when_merging_then_signals_reflect_source() {
    let alice = SourceNode::new("Alice")
        .with_child(SourceNode::new("U").nested().with_child(leaf("u1")))
        .with_child(SourceNode::new("G").with_child(leaf("g1")))
        .with_child(leaf("L"));

    let mut session = MergeSession::new("Permissions");
    session.merge_entity(&alice);

    let u = session.signals("U").unwrap();
    assert!(u.has_parent && u.has_children && !u.overlapping);

    let g = session.signals("G").unwrap();
    assert!(!g.has_parent && g.has_children && !g.overlapping);

    let l = session.signals("L").unwrap();
    assert!(!l.has_parent && !l.has_children && !l.overlapping);
}

#[test]
fn given_shared_name_when_merging_second_tree_then_existing_subtree_overlaps() {
    // Arrange
    let alice = SourceNode::new("Alice").with_child(SourceNode::new("G").with_child(leaf("a")));
    let bob = SourceNode::new("Bob").with_child(SourceNode::new("G").with_child(leaf("b")));

    // Act
    let mut session = MergeSession::new("Permissions");
    session.merge_entity(&alice);
    session.merge_entity(&bob);

    // Assert
    assert_eq!(root_child_names(&session), ["G"], "G is not duplicated");
    assert_eq!(child_names(&session, "G"), ["a", "b"]);

    let g = session.signals("G").unwrap();
    assert!(g.overlapping && g.has_parent && g.has_children);
    assert!(session.signals("a").unwrap().overlapping);
    // attached after the overlap was marked, inherits it from G
    assert!(session.signals("b").unwrap().overlapping);
}

#[test]
fn given_shared_leaf_when_merging_then_leaf_overlaps_once() {
    let alice = SourceNode::new("Alice").with_child(SourceNode::new("G").with_child(leaf("shared")));
    let bob = SourceNode::new("Bob").with_child(SourceNode::new("G").with_child(leaf("shared")));

    let mut session = MergeSession::new("Permissions");
    session.merge_entity(&alice);
    session.merge_entity(&bob);

    assert_eq!(child_names(&session, "G"), ["shared"]);
    let shared = session.signals("shared").unwrap();
    assert!(shared.overlapping && shared.has_parent && !shared.has_children);
}

#[test]
fn given_nested_collision_when_merging_then_overlap_does_not_propagate_upward() {
    // Arrange: Y sits below X for Alice and below Q for Bob
    let alice = SourceNode::new("Alice")
        .with_child(SourceNode::new("X").with_child(SourceNode::new("Y").with_child(leaf("Z"))));
    let bob = SourceNode::new("Bob").with_child(SourceNode::new("Q").with_child(leaf("Y")));

    // Act
    let mut session = MergeSession::new("Permissions");
    session.merge_entity(&alice);
    session.merge_entity(&bob);

    // Assert
    assert!(session.signals("Y").unwrap().overlapping);
    assert!(session.signals("Z").unwrap().overlapping);
    assert!(!session.signals("X").unwrap().overlapping);
    assert!(!session.signals("Q").unwrap().overlapping);
    // Y keeps its single parent edge below X
    assert_eq!(child_names(&session, "X"), ["Y"]);
    assert!(child_names(&session, "Q").is_empty());
    assert_eq!(session.tree().len(), 5);
}

#[test]
fn given_leaf_reencountered_with_children_when_merging_then_has_children_stays_false() {
    let alice = SourceNode::new("Alice").with_child(leaf("L"));
    let bob = SourceNode::new("Bob").with_child(SourceNode::new("L").with_child(leaf("M")));

    let mut session = MergeSession::new("Permissions");
    session.merge_entity(&alice);
    session.merge_entity(&bob);

    let l = session.signals("L").unwrap();
    assert!(l.overlapping && l.has_parent && !l.has_children);
    assert_eq!(child_names(&session, "L"), ["M"]);

    let dendrogram = session.finish();
    assert_eq!(dendrogram.category("L"), Some(Category::Overlap));
    assert_eq!(dendrogram.category("M"), Some(Category::Overlap));
}

#[test]
fn given_three_entities_when_merging_then_late_children_inherit_overlap() {
    // Arrange: Carol adds a new leaf and a new subtree below the shared G
    let alice = SourceNode::new("Alice").with_child(SourceNode::new("G").with_child(leaf("a")));
    let bob = SourceNode::new("Bob").with_child(SourceNode::new("G").with_child(leaf("b")));
    let carol = SourceNode::new("Carol")
        .with_child(SourceNode::new("G").with_child(SourceNode::new("H").with_child(leaf("h"))));

    // Act
    let mut session = MergeSession::new("Permissions");
    for entity in [&alice, &bob, &carol] {
        session.merge_entity(entity);
    }

    // Assert
    assert_eq!(child_names(&session, "G"), ["a", "b", "H"]);
    for name in ["G", "a", "b", "H", "h"] {
        assert!(session.signals(name).unwrap().overlapping, "{name} should overlap");
    }
    let h = session.signals("H").unwrap();
    assert!(!h.has_parent && h.has_children);
}

#[test]
fn given_merged_session_when_finishing_then_categories_follow_signals() {
    let alice = SourceNode::new("Alice")
        .with_child(SourceNode::new("U-Alice").nested().with_child(leaf("u-Alice")))
        .with_child(SourceNode::new("G").with_child(leaf("g")));
    let bob = SourceNode::new("Bob")
        .with_child(SourceNode::new("U-Bob").nested().with_child(leaf("u-Bob")))
        .with_child(SourceNode::new("G").with_child(leaf("g")));

    let mut session = MergeSession::new("Permissions");
    session.merge_entity(&alice);
    session.merge_entity(&bob);
    let dendrogram = session.finish();

    assert_eq!(dendrogram.root().data.category, Category::None);
    assert_eq!(dendrogram.category("U-Alice"), Some(Category::Hierarchical));
    assert_eq!(dendrogram.category("U-Bob"), Some(Category::Hierarchical));
    assert_eq!(dendrogram.category("u-Alice"), Some(Category::None));
    assert_eq!(dendrogram.category("G"), Some(Category::Both));
    assert_eq!(dendrogram.category("g"), Some(Category::Overlap));
}

#[test]
fn given_entity_merged_twice_when_finishing_then_its_branches_overlap() {
    let alice = SourceNode::new("Alice")
        .with_child(SourceNode::new("U").nested().with_child(leaf("u")));

    let mut session = MergeSession::new("Permissions");
    session.merge_entity(&alice);
    session.merge_entity(&alice);
    let dendrogram = session.finish();

    assert_eq!(dendrogram.category("U"), Some(Category::Both));
    assert_eq!(dendrogram.category("u"), Some(Category::Overlap));
    assert_eq!(dendrogram.node_count(), 3);
}
