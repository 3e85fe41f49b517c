//! Feature-file discovery.
//!
//! Resolves heterogeneous selectors (code units, files, directories, resource
//! roots, namespaces, resource paths, URIs, identifiers) into a deduplicated
//! tree of features and their scenarios.
pub mod cli;
pub mod config;
pub mod location;
pub mod namespace;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod resources;
pub mod selector;
pub mod tree;
pub mod unique_id;
pub mod workflow;

pub use location::{Location, ResourceUri};
pub use namespace::{NamespaceFilter, NamespaceRule};
pub use parser::{FeatureParser, GherkinParser, ScenarioBody, StepGroup};
pub use resolver::{ResolutionSummary, SelectorResolver};
pub use resources::{FsResourceLocator, ResourceHandle, ResourceLocator};
pub use selector::{CodeUnit, MarkerPredicate, Selector, SelectorKind, SuitePredicate};
pub use tree::{NodeId, NodeKind, TestNode, TestTree};
pub use unique_id::UniqueId;
