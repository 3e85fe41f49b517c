//! Shared test infrastructure for integration tests.

use feature_discovery::{FsResourceLocator, GherkinParser, SelectorResolver, TestTree, UniqueId};
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

pub const ENGINE: &str = "it";

/// Scratch resource tree holding feature files under `res/`.
pub struct FeatureFixture {
    pub temp: TempDir,
}

impl FeatureFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        std::fs::create_dir_all(temp.path().join("res")).expect("create res dir");
        Self { temp }
    }

    /// Root every resource lives under.
    pub fn res(&self) -> PathBuf {
        self.temp.path().join("res")
    }

    /// Write a feature at `relative` (slash-separated, under `res/`) with one
    /// scenario per name.
    pub fn feature(&self, relative: &str, scenarios: &[&str]) -> PathBuf {
        let mut text = format!("Feature: {relative}\n");
        for name in scenarios {
            text.push_str(&format!("  Scenario: {name}\n    Given {name} runs\n"));
        }
        self.write(relative, &text)
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.res().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write fixture file");
        path
    }

    /// Resolver searching `res/` with the stock Gherkin parser.
    pub fn resolver(&self) -> SelectorResolver {
        SelectorResolver::new(
            Box::new(GherkinParser),
            Box::new(FsResourceLocator::new(vec![self.res()])),
        )
    }

    /// Run the `fdisc` binary from inside the fixture directory.
    pub fn fdisc(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_fdisc"))
            .args(args)
            .current_dir(self.temp.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("run fdisc")
    }
}

pub fn empty_tree() -> TestTree {
    TestTree::new(UniqueId::for_engine(ENGINE), ENGINE)
}

/// Feature display names directly under the root, in tree order.
pub fn feature_names(tree: &TestTree) -> Vec<String> {
    tree.features()
        .into_iter()
        .filter_map(|id| tree.node(id))
        .map(|node| node.display_name.clone())
        .collect()
}

/// Scenario display names across the whole tree, in tree order.
pub fn scenario_names(tree: &TestTree) -> Vec<String> {
    tree.scenarios()
        .into_iter()
        .filter_map(|id| tree.node(id))
        .map(|node| node.display_name.clone())
        .collect()
}

