use super::*;
use crate::location::ResourceUri;
use crate::unique_id::{FEATURE_SEGMENT, SCENARIO_SEGMENT};
use std::path::Path;

fn pending(tree: &TestTree, feature: &str, scenarios: &[&str]) -> PendingFeature {
    let root_id = tree.node(tree.root()).expect("root").id.clone();
    let id = root_id.append(FEATURE_SEGMENT, feature);
    let location = Location::physical(ResourceUri::from_path(Path::new(feature)));
    PendingFeature {
        scenarios: scenarios
            .iter()
            .map(|name| PendingScenario {
                id: id.append(SCENARIO_SEGMENT, name),
                display_name: name.to_string(),
                location: location.clone(),
                body: ScenarioBody(serde_json::json!({ "steps": [] })),
            })
            .collect(),
        id,
        display_name: feature.to_string(),
        location,
    }
}

fn names(tree: &TestTree, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| tree.node(*id))
        .map(|node| node.display_name.clone())
        .collect()
}

#[test]
fn attach_links_parent_and_children_in_order() {
    let mut tree = TestTree::new(UniqueId::for_engine("fd"), "fd");
    let feature = tree
        .attach_feature(tree.root(), pending(&tree, "a.feature", &["A", "B", "C"]))
        .expect("attach feature");

    assert_eq!(tree.features(), vec![feature]);
    assert_eq!(names(&tree, tree.children(feature)), vec!["A", "B", "C"]);
    for scenario in tree.children(feature) {
        let node = tree.node(*scenario).expect("scenario");
        assert_eq!(node.parent(), Some(feature));
        assert!(node.is_scenario());
        assert!(node.body().is_some());
    }
    assert_eq!(
        tree.node(feature).expect("feature").parent(),
        Some(tree.root())
    );
}

#[test]
fn duplicate_feature_ids_are_rejected() {
    let mut tree = TestTree::new(UniqueId::for_engine("fd"), "fd");
    let first = pending(&tree, "a.feature", &["A"]);
    let again = pending(&tree, "a.feature", &["B"]);
    tree.attach_feature(tree.root(), first).expect("attach first");

    assert!(tree.attach_feature(tree.root(), again).is_err());
    assert_eq!(tree.features().len(), 1);
}

#[test]
fn same_named_step_groups_collapse() {
    let mut tree = TestTree::new(UniqueId::for_engine("fd"), "fd");
    let feature = tree
        .attach_feature(tree.root(), pending(&tree, "a.feature", &["A", "A", "B"]))
        .expect("attach feature");
    assert_eq!(names(&tree, tree.children(feature)), vec!["A", "B"]);
}

#[test]
fn foreign_scenario_ids_are_rejected() {
    let mut tree = TestTree::new(UniqueId::for_engine("fd"), "fd");
    let mut feature = pending(&tree, "a.feature", &["A"]);
    feature.scenarios[0].id = UniqueId::for_engine("other").append(SCENARIO_SEGMENT, "A");

    assert!(tree.attach_feature(tree.root(), feature).is_err());
    assert!(tree.is_empty());
}

#[test]
fn remove_detaches_subtree() {
    let mut tree = TestTree::new(UniqueId::for_engine("fd"), "fd");
    let a = tree
        .attach_feature(tree.root(), pending(&tree, "a.feature", &["A1", "A2"]))
        .expect("attach a");
    let b = tree
        .attach_feature(tree.root(), pending(&tree, "b.feature", &["B1"]))
        .expect("attach b");
    let a_children = tree.children(a).to_vec();

    tree.remove(a_children[0]);
    assert_eq!(names(&tree, tree.children(a)), vec!["A2"]);
    assert!(tree.node(a_children[0]).is_none());

    tree.remove(a);
    assert_eq!(tree.features(), vec![b]);
    assert!(tree.node(a_children[1]).is_none());
    assert_eq!(tree.scenarios().len(), 1);

    tree.remove(a);
    tree.remove(tree.root());
    assert!(tree.node(tree.root()).is_some());
}

#[test]
fn find_locates_nodes_by_identifier() {
    let mut tree = TestTree::new(UniqueId::for_engine("fd"), "fd");
    let feature = tree
        .attach_feature(tree.root(), pending(&tree, "a.feature", &["A"]))
        .expect("attach feature");
    let scenario_id = UniqueId::for_engine("fd")
        .append(FEATURE_SEGMENT, "a.feature")
        .append(SCENARIO_SEGMENT, "A");

    let found = tree.find(&scenario_id).expect("find scenario");
    assert_eq!(tree.node(found).and_then(TestNode::parent), Some(feature));
    assert_eq!(tree.find(&UniqueId::for_engine("fd")), Some(tree.root()));
    assert!(tree.find(&UniqueId::for_engine("nope")).is_none());
}

#[test]
fn report_mirrors_live_tree() {
    let mut tree = TestTree::new(UniqueId::for_engine("fd"), "fd");
    tree.attach_feature(tree.root(), pending(&tree, "a.feature", &["A"]))
        .expect("attach feature");

    let report = serde_json::to_value(tree.report()).expect("serialize report");
    assert_eq!(report["kind"], "root");
    assert_eq!(report["children"][0]["unique_id"], "[engine:fd]/[feature:a.feature]");
    assert_eq!(report["children"][0]["children"][0]["kind"], "scenario");
    assert_eq!(
        report["children"][0]["children"][0]["location"]["kind"],
        "physical"
    );
}
