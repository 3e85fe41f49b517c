//! Arena-backed discovery tree.
//!
//! Nodes live in a flat table and refer to each other by `NodeId`, so the
//! parent link is a plain index and no ownership cycle exists. Removing a node
//! frees its slot (and its descendants' slots); ids of removed nodes are never
//! reused within one tree.
use crate::location::Location;
use crate::parser::ScenarioBody;
use crate::unique_id::UniqueId;
use anyhow::{anyhow, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
    Root,
    Feature,
    Scenario { body: ScenarioBody },
}

#[derive(Debug, Clone)]
pub struct TestNode {
    pub id: UniqueId,
    pub display_name: String,
    pub location: Option<Location>,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TestNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_feature(&self) -> bool {
        matches!(self.kind, NodeKind::Feature)
    }

    pub fn is_scenario(&self) -> bool {
        matches!(self.kind, NodeKind::Scenario { .. })
    }

    /// Parsed body handed through for execution; `None` for non-scenarios.
    pub fn body(&self) -> Option<&ScenarioBody> {
        match &self.kind {
            NodeKind::Scenario { body } => Some(body),
            _ => None,
        }
    }
}

/// A feature with its scenarios, built off-tree and attached in one step.
#[derive(Debug, Clone)]
pub struct PendingFeature {
    pub id: UniqueId,
    pub display_name: String,
    pub location: Location,
    pub scenarios: Vec<PendingScenario>,
}

#[derive(Debug, Clone)]
pub struct PendingScenario {
    pub id: UniqueId,
    pub display_name: String,
    pub location: Location,
    pub body: ScenarioBody,
}

#[derive(Debug, Clone)]
pub struct TestTree {
    slots: Vec<Option<TestNode>>,
    root: NodeId,
}

impl TestTree {
    pub fn new(root_id: UniqueId, display_name: &str) -> Self {
        let root = TestNode {
            id: root_id,
            display_name: display_name.to_string(),
            location: None,
            kind: NodeKind::Root,
            parent: None,
            children: Vec::new(),
        };
        Self {
            slots: vec![Some(root)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a live node.
    pub fn node(&self, id: NodeId) -> Option<&TestNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(TestNode::children).unwrap_or_default()
    }

    /// Direct child of `parent` whose identifier equals `unique_id`.
    pub fn find_child(&self, parent: NodeId, unique_id: &UniqueId) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.node(*child).is_some_and(|node| &node.id == unique_id))
    }

    /// Any live node whose identifier equals `unique_id`.
    pub fn find(&self, unique_id: &UniqueId) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .chain(std::iter::once(self.root))
            .find(|id| self.node(*id).is_some_and(|node| &node.id == unique_id))
    }

    /// All live descendants of `id` in depth-first pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn features(&self) -> Vec<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .filter(|id| self.node(*id).is_some_and(TestNode::is_feature))
            .collect()
    }

    pub fn scenarios(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.node(*id).is_some_and(TestNode::is_scenario))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    /// Attach a fully built feature under `parent`.
    ///
    /// Each scenario id must extend the feature id by one segment, and the
    /// feature id must extend the parent id by one segment.
    pub fn attach_feature(&mut self, parent: NodeId, pending: PendingFeature) -> Result<NodeId> {
        let parent_id = self
            .node(parent)
            .map(|node| node.id.clone())
            .ok_or_else(|| anyhow!("parent node {parent:?} was removed"))?;
        if !is_direct_child(&parent_id, &pending.id) {
            return Err(anyhow!("{} is not a child id of {parent_id}", pending.id));
        }
        if self.find_child(parent, &pending.id).is_some() {
            return Err(anyhow!("{} already exists under {parent_id}", pending.id));
        }
        if let Some(stray) = pending
            .scenarios
            .iter()
            .find(|scenario| !is_direct_child(&pending.id, &scenario.id))
        {
            return Err(anyhow!("{} is not a child id of {}", stray.id, pending.id));
        }

        let feature = self.push(TestNode {
            id: pending.id,
            display_name: pending.display_name,
            location: Some(pending.location),
            kind: NodeKind::Feature,
            parent: Some(parent),
            children: Vec::new(),
        });
        for scenario in pending.scenarios {
            // Step groups sharing a name collapse onto the first one.
            if self.find_child(feature, &scenario.id).is_some() {
                continue;
            }
            let child = self.push(TestNode {
                id: scenario.id,
                display_name: scenario.display_name,
                location: Some(scenario.location),
                kind: NodeKind::Scenario {
                    body: scenario.body,
                },
                parent: Some(feature),
                children: Vec::new(),
            });
            self.link(feature, child);
        }
        self.link(parent, feature);
        Ok(feature)
    }

    /// Detach `id` from its parent and drop it with all descendants.
    ///
    /// The root cannot be removed; removing an already removed node is a no-op.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        let Some(parent) = self.node(id).and_then(TestNode::parent) else {
            return;
        };
        if let Some(Some(parent_node)) = self.slots.get_mut(parent.0) {
            parent_node.children.retain(|child| *child != id);
        }
        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in doomed {
            self.slots[node.0] = None;
        }
    }

    fn push(&mut self, node: TestNode) -> NodeId {
        self.slots.push(Some(node));
        NodeId(self.slots.len() - 1)
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(Some(parent_node)) = self.slots.get_mut(parent.0) {
            parent_node.children.push(child);
        }
    }

    /// Serializable snapshot of the live tree.
    pub fn report(&self) -> NodeReport {
        self.report_node(self.root)
    }

    fn report_node(&self, id: NodeId) -> NodeReport {
        let node = self.node(id);
        NodeReport {
            unique_id: node.map(|node| node.id.to_string()).unwrap_or_default(),
            display_name: node.map(|node| node.display_name.clone()).unwrap_or_default(),
            kind: match node.map(|node| &node.kind) {
                Some(NodeKind::Feature) => "feature",
                Some(NodeKind::Scenario { .. }) => "scenario",
                _ => "root",
            },
            location: node.and_then(|node| node.location.clone()),
            body: node.and_then(TestNode::body).cloned(),
            children: self
                .children(id)
                .iter()
                .map(|child| self.report_node(*child))
                .collect(),
        }
    }
}

fn is_direct_child(parent: &UniqueId, child: &UniqueId) -> bool {
    child.segments().len() == parent.segments().len() + 1
        && child.segments().starts_with(parent.segments())
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub unique_id: String,
    pub display_name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ScenarioBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeReport>,
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
