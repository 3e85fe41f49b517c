//! Selector resolution.
//!
//! `SelectorResolver::resolve` turns a batch of selectors into feature and
//! scenario nodes under the root of a `TestTree`. Selector kinds run in the
//! fixed order of `DISPATCH`, not in arrival order: code units go first so
//! that class mode is settled before any node exists, and identifier
//! selectors go last because they prune whatever the others produced.
use crate::config::DiscoveryConfig;
use crate::location::{Location, ResourceUri, CLASSPATH_SCHEME};
use crate::namespace::{namespace_to_path, path_to_namespace, NamespaceFilter};
use crate::parser::FeatureParser;
use crate::resources::{
    absolute_path, collect_feature_files, FsResourceLocator, ResourceHandle, ResourceLocator,
};
use crate::selector::{CodeUnit, MarkerPredicate, Selector, SelectorKind, SuitePredicate};
use crate::tree::{NodeId, PendingFeature, PendingScenario, TestTree};
use crate::unique_id::{FEATURE_SEGMENT, SCENARIO_SEGMENT};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

pub const DEFAULT_FEATURE_EXTENSION: &str = ".feature";

type Handler = fn(&SelectorResolver, &mut Pass<'_>, &[&Selector]) -> Result<()>;

const DISPATCH: [(SelectorKind, Handler); 8] = [
    (SelectorKind::CodeUnit, SelectorResolver::resolve_code_units),
    (SelectorKind::File, SelectorResolver::resolve_files),
    (SelectorKind::Directory, SelectorResolver::resolve_directories),
    (SelectorKind::ClasspathRoot, SelectorResolver::resolve_classpath_roots),
    (SelectorKind::Namespace, SelectorResolver::resolve_namespaces),
    (SelectorKind::Resource, SelectorResolver::resolve_resources),
    (SelectorKind::Uri, SelectorResolver::resolve_uris),
    (SelectorKind::UniqueId, SelectorResolver::resolve_unique_ids),
];

/// Counts reported by one `resolve` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub features_added: usize,
    pub duplicates_skipped: usize,
    pub class_mode: bool,
    /// A default resolution ran because identifier selectors met an empty tree.
    pub fallback_resolved: bool,
    pub scenarios_pruned: usize,
    pub features_pruned: usize,
}

/// Per-call state. Lives only for one `resolve` call so the resolver itself
/// stays immutable and reusable.
struct Pass<'t> {
    tree: &'t mut TestTree,
    parent: NodeId,
    filter: &'t NamespaceFilter,
    class_mode: bool,
    summary: ResolutionSummary,
}

pub struct SelectorResolver {
    parser: Box<dyn FeatureParser>,
    locator: Box<dyn ResourceLocator>,
    suite: Box<dyn SuitePredicate>,
    extension: String,
}

impl SelectorResolver {
    /// Resolver with the default `.feature` extension and suite marker.
    pub fn new(parser: Box<dyn FeatureParser>, locator: Box<dyn ResourceLocator>) -> Self {
        Self {
            parser,
            locator,
            suite: Box::new(MarkerPredicate::new(crate::config::DEFAULT_SUITE_MARKER)),
            extension: DEFAULT_FEATURE_EXTENSION.to_string(),
        }
    }

    /// Filesystem-backed resolver configured from `config`.
    pub fn from_config(config: &DiscoveryConfig, parser: Box<dyn FeatureParser>) -> Self {
        let locator = FsResourceLocator::new(config.resolution_roots.clone());
        Self::new(parser, Box::new(locator))
            .with_extension(&config.feature_extension)
            .with_suite_predicate(Box::new(MarkerPredicate::new(&config.suite_marker)))
    }

    /// Only resources whose file name ends with `extension` become features.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    /// Decides which code units switch a call into class mode.
    pub fn with_suite_predicate(mut self, suite: Box<dyn SuitePredicate>) -> Self {
        self.suite = suite;
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Resolve `selectors` into `tree`, filtering namespaces through `filter`.
    ///
    /// Any IO failure aborts the call; nodes attached before the failure stay
    /// in the tree, but never a half-built feature.
    pub fn resolve(
        &self,
        selectors: &[Selector],
        filter: &NamespaceFilter,
        tree: &mut TestTree,
    ) -> Result<ResolutionSummary> {
        let start = Instant::now();
        let mut by_kind: BTreeMap<SelectorKind, Vec<&Selector>> = BTreeMap::new();
        for selector in selectors {
            by_kind.entry(selector.kind()).or_default().push(selector);
        }

        let parent = tree.root();
        let mut pass = Pass {
            tree,
            parent,
            filter,
            class_mode: false,
            summary: ResolutionSummary::default(),
        };
        for (kind, handler) in DISPATCH {
            let Some(batch) = by_kind.get(&kind) else {
                continue;
            };
            tracing::debug!(kind = kind.as_str(), count = batch.len(), "resolving selectors");
            handler(self, &mut pass, batch)?;
        }

        pass.summary.class_mode = pass.class_mode;
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            selectors = selectors.len(),
            features = pass.tree.features().len(),
            scenarios = pass.tree.scenarios().len(),
            class_mode = pass.class_mode,
            "selector resolution complete"
        );
        Ok(pass.summary)
    }

    fn resolve_code_units(&self, pass: &mut Pass<'_>, selectors: &[&Selector]) -> Result<()> {
        for selector in selectors {
            if let Selector::CodeUnit(unit) = selector {
                self.resolve_code_unit(pass, unit)?;
            }
        }
        Ok(())
    }

    fn resolve_code_unit(&self, pass: &mut Pass<'_>, unit: &CodeUnit) -> Result<()> {
        if !self.suite.is_suite(unit) {
            tracing::debug!(unit = %unit.name, "code unit is not a feature suite");
            return Ok(());
        }
        pass.class_mode = true;
        self.resolve_namespace(pass, &namespace_to_path(unit.namespace()))
    }

    fn resolve_files(&self, pass: &mut Pass<'_>, selectors: &[&Selector]) -> Result<()> {
        for selector in selectors {
            if let Selector::File(path) = selector {
                self.resolve_file(pass, path)?;
            }
        }
        Ok(())
    }

    fn resolve_directories(&self, pass: &mut Pass<'_>, selectors: &[&Selector]) -> Result<()> {
        for selector in selectors {
            let Selector::Directory(dir) = selector else {
                continue;
            };
            if !dir.is_dir() {
                tracing::debug!(dir = %dir.display(), "directory selector skipped");
                continue;
            }
            let files = collect_feature_files(dir, &self.extension)
                .with_context(|| format!("cannot list feature files in {}", dir.display()))?;
            for file in files {
                self.resolve_file(pass, &file)?;
            }
        }
        Ok(())
    }

    fn resolve_classpath_roots(&self, pass: &mut Pass<'_>, selectors: &[&Selector]) -> Result<()> {
        for selector in selectors {
            let Selector::ClasspathRoot(root) = selector else {
                continue;
            };
            let resources = self
                .locator
                .find_under_root(root, &self.extension)
                .with_context(|| format!("cannot get resources from {root}"))?;
            for resource in resources {
                let uri = resource_uri(resource.as_ref())?;
                let relative = uri
                    .scheme_specific_part()
                    .strip_prefix(root.scheme_specific_part())
                    .unwrap_or(uri.scheme_specific_part());
                let namespace = path_to_namespace(relative);
                if !pass.filter.accepts(&namespace) {
                    tracing::debug!(%namespace, "resource filtered by namespace rules");
                    continue;
                }
                self.resolve_resource(pass, resource.as_ref())?;
            }
        }
        Ok(())
    }

    fn resolve_namespaces(&self, pass: &mut Pass<'_>, selectors: &[&Selector]) -> Result<()> {
        for selector in selectors {
            let Selector::Namespace(namespace) = selector else {
                continue;
            };
            if !pass.filter.accepts(namespace) {
                tracing::debug!(%namespace, "namespace filtered by namespace rules");
                continue;
            }
            self.resolve_namespace(pass, namespace)?;
        }
        Ok(())
    }

    fn resolve_resources(&self, pass: &mut Pass<'_>, selectors: &[&Selector]) -> Result<()> {
        for selector in selectors {
            let Selector::Resource(name) = selector else {
                continue;
            };
            if !name.ends_with(&self.extension) || !pass.filter.accepts(&path_to_namespace(name)) {
                tracing::debug!(resource = %name, "resource selector skipped");
                continue;
            }
            let uri = ResourceUri::new(CLASSPATH_SCHEME, name);
            let resource = self
                .locator
                .resource(&uri)
                .with_context(|| format!("cannot get resource {uri}"))?;
            self.resolve_resource(pass, resource.as_ref())?;
        }
        Ok(())
    }

    fn resolve_uris(&self, pass: &mut Pass<'_>, selectors: &[&Selector]) -> Result<()> {
        for selector in selectors {
            if let Selector::Uri(uri) = selector {
                let resource = self
                    .locator
                    .resource(uri)
                    .with_context(|| format!("cannot get resource {uri}"))?;
                self.resolve_resource(pass, resource.as_ref())?;
            }
        }
        Ok(())
    }

    /// Keep only scenarios whose identifier contains one of the targets.
    fn resolve_unique_ids(&self, pass: &mut Pass<'_>, selectors: &[&Selector]) -> Result<()> {
        let targets: Vec<String> = selectors
            .iter()
            .filter_map(|selector| match selector {
                Selector::UniqueId(id) => Some(id.to_string()),
                _ => None,
            })
            .collect();
        if targets.is_empty() {
            return Ok(());
        }

        if pass.tree.children(pass.parent).is_empty() {
            tracing::debug!("no candidates yet; resolving every namespace before filtering");
            pass.summary.fallback_resolved = true;
            self.resolve_namespace(pass, "")?;
        }

        let features = pass.tree.children(pass.parent).to_vec();
        let mut unmatched = Vec::new();
        for feature in &features {
            for scenario in pass.tree.children(*feature) {
                let Some(node) = pass.tree.node(*scenario) else {
                    continue;
                };
                let rendered = node.id.to_string();
                if !targets.iter().any(|target| rendered.contains(target.as_str())) {
                    unmatched.push(*scenario);
                }
            }
        }
        pass.summary.scenarios_pruned += unmatched.len();
        for scenario in unmatched {
            pass.tree.remove(scenario);
        }

        for feature in features {
            if pass.tree.children(feature).is_empty() {
                pass.tree.remove(feature);
                pass.summary.features_pruned += 1;
            }
        }
        Ok(())
    }

    fn resolve_namespace(&self, pass: &mut Pass<'_>, namespace: &str) -> Result<()> {
        let resources = self
            .locator
            .find_in_namespace(&namespace_to_path(namespace), &self.extension)
            .with_context(|| format!("cannot get resources from {namespace:?}"))?;
        for resource in resources {
            self.resolve_resource(pass, resource.as_ref())?;
        }
        Ok(())
    }

    fn resolve_file(&self, pass: &mut Pass<'_>, path: &Path) -> Result<()> {
        if !path.is_file() {
            tracing::debug!(file = %path.display(), "file selector skipped");
            return Ok(());
        }
        let Some(name) = path.file_name().map(|name| name.to_string_lossy().to_string()) else {
            return Ok(());
        };
        let uri = ResourceUri::from_path(&absolute_path(path)?);
        self.resolve_feature(pass, &name, &uri, || {
            fs::read_to_string(path).with_context(|| format!("unable to read {}", path.display()))
        })
    }

    fn resolve_resource(&self, pass: &mut Pass<'_>, resource: &dyn ResourceHandle) -> Result<()> {
        if !resource.exists() {
            tracing::debug!(resource = %resource.description(), "resource does not exist");
            return Ok(());
        }
        let uri = resource_uri(resource)?;
        let name = uri
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| resource.description());
        self.resolve_feature(pass, &name, &uri, || read_resource(resource))
    }

    /// Add one feature with its scenarios unless the parent already has it.
    ///
    /// Content is loaded and parsed before anything is attached.
    fn resolve_feature<F>(
        &self,
        pass: &mut Pass<'_>,
        name: &str,
        uri: &ResourceUri,
        load: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Result<String>,
    {
        let Some(parent_id) = pass.tree.node(pass.parent).map(|node| node.id.clone()) else {
            return Ok(());
        };
        let feature_id = parent_id.append(FEATURE_SEGMENT, name);
        if pass.tree.find_child(pass.parent, &feature_id).is_some() {
            tracing::debug!(feature = %feature_id, "feature already resolved");
            pass.summary.duplicates_skipped += 1;
            return Ok(());
        }

        let content = load()?;
        let groups = self.parser.parse(&content)?;
        let location = Location::for_feature(uri, pass.class_mode);
        let scenarios = groups
            .into_iter()
            .map(|group| PendingScenario {
                id: feature_id.append(SCENARIO_SEGMENT, &group.name),
                location: location.for_scenario(&group.name),
                display_name: group.name,
                body: group.body,
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            feature = %feature_id,
            scenarios = scenarios.len(),
            %location,
            "feature resolved"
        );
        pass.tree.attach_feature(
            pass.parent,
            PendingFeature {
                id: feature_id,
                display_name: name.to_string(),
                location,
                scenarios,
            },
        )?;
        pass.summary.features_added += 1;
        Ok(())
    }
}

fn resource_uri(resource: &dyn ResourceHandle) -> Result<ResourceUri> {
    resource
        .uri()
        .with_context(|| format!("cannot get URI from {}", resource.description()))
}

fn read_resource(resource: &dyn ResourceHandle) -> Result<String> {
    let description = resource.description();
    let mut reader = resource
        .open()
        .with_context(|| format!("cannot get input stream from {description}"))?;
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .with_context(|| format!("unable to read {description}"))?;
    Ok(text)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
