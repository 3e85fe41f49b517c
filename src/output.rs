//! Rendering of a resolved tree for the `fdisc` binary.
use crate::resolver::ResolutionSummary;
use crate::tree::{NodeId, NodeReport, TestTree};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DiscoveryReport {
    features: usize,
    scenarios: usize,
    class_mode: bool,
    fallback_resolved: bool,
    duplicates_skipped: usize,
    scenarios_pruned: usize,
    tree: NodeReport,
}

pub fn render_json(tree: &TestTree, summary: &ResolutionSummary) -> Result<String> {
    let report = DiscoveryReport {
        features: tree.features().len(),
        scenarios: tree.scenarios().len(),
        class_mode: summary.class_mode,
        fallback_resolved: summary.fallback_resolved,
        duplicates_skipped: summary.duplicates_skipped,
        scenarios_pruned: summary.scenarios_pruned,
        tree: tree.report(),
    };
    serde_json::to_string_pretty(&report).context("serialize discovery report")
}

/// Indented outline: one line per feature with its location, one per scenario.
pub fn render_text(tree: &TestTree) -> String {
    let mut out = String::new();
    let features = tree.features();
    if features.is_empty() {
        out.push_str("no features discovered\n");
        return out;
    }
    for feature in &features {
        push_node(&mut out, tree, *feature, 0);
        for scenario in tree.children(*feature) {
            push_node(&mut out, tree, *scenario, 1);
        }
    }
    out.push_str(&format!(
        "{} features, {} scenarios\n",
        features.len(),
        tree.scenarios().len()
    ));
    out
}

fn push_node(out: &mut String, tree: &TestTree, id: NodeId, depth: usize) {
    let Some(node) = tree.node(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let marker = if node.is_feature() { "feature" } else { "scenario" };
    out.push_str(&format!("{indent}{marker}: {}", node.display_name));
    if depth == 0 {
        if let Some(location) = &node.location {
            out.push_str(&format!(" ({location})"));
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{Location, ResourceUri};
    use crate::parser::ScenarioBody;
    use crate::tree::{PendingFeature, PendingScenario};
    use crate::unique_id::{UniqueId, FEATURE_SEGMENT, SCENARIO_SEGMENT};

    fn sample_tree() -> TestTree {
        let mut tree = TestTree::new(UniqueId::for_engine("fd"), "fd");
        let id = UniqueId::for_engine("fd").append(FEATURE_SEGMENT, "a.feature");
        let location = Location::physical(ResourceUri::new("file", "/srv/a.feature"));
        let feature = PendingFeature {
            scenarios: vec![PendingScenario {
                id: id.append(SCENARIO_SEGMENT, "works"),
                display_name: "works".to_string(),
                location: location.clone(),
                body: ScenarioBody(serde_json::json!({ "steps": ["Given it"] })),
            }],
            id,
            display_name: "a.feature".to_string(),
            location,
        };
        tree.attach_feature(tree.root(), feature)
            .expect("attach feature");
        tree
    }

    #[test]
    fn text_lists_features_then_scenarios() {
        let text = render_text(&sample_tree());
        assert_eq!(
            text,
            "feature: a.feature (file:/srv/a.feature)\n  scenario: works\n1 features, 1 scenarios\n"
        );
        let empty = TestTree::new(UniqueId::for_engine("fd"), "fd");
        assert_eq!(render_text(&empty), "no features discovered\n");
    }

    #[test]
    fn json_carries_counts_and_bodies() {
        let summary = ResolutionSummary::default();
        let json = render_json(&sample_tree(), &summary).expect("render json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse json");
        assert_eq!(value["features"], 1);
        assert_eq!(value["scenarios"], 1);
        assert_eq!(
            value["tree"]["children"][0]["children"][0]["body"]["steps"][0],
            "Given it"
        );
    }
}
