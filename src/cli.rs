//! CLI argument parsing for `fdisc`.
//!
//! The CLI only turns flags into selectors and namespace rules; resolution
//! itself lives in the library so the same engine can be driven elsewhere.
use crate::location::ResourceUri;
use crate::resources::absolute_path;
use crate::selector::{CodeUnit, Selector};
use crate::unique_id::UniqueId;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Engine name used for the root identifier of CLI runs.
pub const ENGINE_NAME: &str = "feature-discovery";

#[derive(Parser, Debug)]
#[command(
    name = "fdisc",
    version,
    about = "Resolve feature-file selectors into a feature/scenario tree",
    after_help = "Examples:\n  fdisc discover --dir features\n  fdisc discover --root src/test/resources --namespace com.acme\n  fdisc discover --root res --suite com.acme.LoginSuite --json\n  fdisc discover --dir features --unique-id '[feature:login.feature]'\n  fdisc config > discovery.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Discover(DiscoverArgs),
    Config(ConfigArgs),
}

/// Discover command inputs: selectors plus resolution settings.
#[derive(Parser, Debug, Default)]
#[command(about = "Resolve selectors and print the discovered tree")]
pub struct DiscoverArgs {
    /// JSON discovery config (defaults apply when omitted)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Extra resolution root searched by namespace and resource selectors
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Suite code unit (dotted name); switches locations to logical form
    #[arg(long = "suite", value_name = "UNIT")]
    pub suites: Vec<String>,

    /// Code unit without the suite marker (ignored unless configured otherwise)
    #[arg(long = "unit", value_name = "UNIT")]
    pub units: Vec<String>,

    /// Single feature file
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Directory searched recursively for feature files
    #[arg(long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Directory whose contents are namespace-filtered by relative path
    #[arg(long = "classpath-root", value_name = "DIR")]
    pub classpath_roots: Vec<PathBuf>,

    /// Dotted namespace searched across resolution roots
    #[arg(long = "namespace", value_name = "NAME")]
    pub namespaces: Vec<String>,

    /// Slash-separated resource path relative to the resolution roots
    #[arg(long = "resource", value_name = "PATH")]
    pub resources: Vec<String>,

    /// Resource URI (file: or classpath:)
    #[arg(long = "uri", value_name = "URI")]
    pub uris: Vec<String>,

    /// Identifier (or identifier fragment) to keep; applied last
    #[arg(long = "unique-id", value_name = "ID")]
    pub unique_ids: Vec<String>,

    /// Namespace to include (repeatable, alternatives; must also pass the config file rules)
    #[arg(long = "include-namespace", value_name = "NAME")]
    pub include_namespaces: Vec<String>,

    /// Namespace to exclude (repeatable, on top of the config file rules)
    #[arg(long = "exclude-namespace", value_name = "NAME")]
    pub exclude_namespaces: Vec<String>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Config command inputs.
#[derive(Parser, Debug)]
#[command(about = "Print the default discovery config")]
pub struct ConfigArgs {
    /// Write the stub to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

impl DiscoverArgs {
    /// Turn flags into selectors; `suite_marker` is attached to `--suite` units.
    pub fn selectors(&self, suite_marker: &str) -> Result<Vec<Selector>> {
        let mut selectors = Vec::new();
        selectors.extend(
            self.suites
                .iter()
                .map(|name| Selector::CodeUnit(CodeUnit::new(name).with_marker(suite_marker))),
        );
        selectors.extend(
            self.units
                .iter()
                .map(|name| Selector::CodeUnit(CodeUnit::new(name))),
        );
        selectors.extend(self.files.iter().cloned().map(Selector::File));
        selectors.extend(self.dirs.iter().cloned().map(Selector::Directory));
        for root in &self.classpath_roots {
            let absolute = absolute_path(root)?;
            selectors.push(Selector::ClasspathRoot(ResourceUri::from_path(&absolute)));
        }
        selectors.extend(self.namespaces.iter().cloned().map(Selector::Namespace));
        selectors.extend(self.resources.iter().cloned().map(Selector::Resource));
        for raw in &self.uris {
            let uri = ResourceUri::parse(raw).with_context(|| format!("invalid --uri {raw:?}"))?;
            selectors.push(Selector::Uri(uri));
        }
        for raw in &self.unique_ids {
            let id =
                UniqueId::parse(raw).with_context(|| format!("invalid --unique-id {raw:?}"))?;
            selectors.push(Selector::UniqueId(id));
        }
        Ok(selectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::SelectorKind;

    #[test]
    fn every_flag_maps_to_its_selector_kind() {
        let args = RootArgs::try_parse_from([
            "fdisc",
            "discover",
            "--suite",
            "com.acme.Suite",
            "--unit",
            "com.acme.Plain",
            "--file",
            "a.feature",
            "--dir",
            "features",
            "--classpath-root",
            "/res",
            "--namespace",
            "com.acme",
            "--resource",
            "com/acme/a.feature",
            "--uri",
            "classpath:com/acme/a.feature",
            "--unique-id",
            "[feature:a.feature]",
        ])
        .expect("parse args");
        let Command::Discover(discover) = args.command else {
            panic!("expected discover command");
        };

        let selectors = discover.selectors("feature_suite").expect("selectors");
        let kinds: Vec<SelectorKind> = selectors.iter().map(Selector::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SelectorKind::CodeUnit,
                SelectorKind::CodeUnit,
                SelectorKind::File,
                SelectorKind::Directory,
                SelectorKind::ClasspathRoot,
                SelectorKind::Namespace,
                SelectorKind::Resource,
                SelectorKind::Uri,
                SelectorKind::UniqueId,
            ]
        );
        let Selector::CodeUnit(suite) = &selectors[0] else {
            panic!("expected code unit");
        };
        assert!(suite.markers.contains("feature_suite"));
    }

    #[test]
    fn malformed_identifiers_are_rejected() {
        let args = DiscoverArgs {
            unique_ids: vec!["feature:a.feature".to_string()],
            ..DiscoverArgs::default()
        };
        assert!(args.selectors("feature_suite").is_err());
    }
}
