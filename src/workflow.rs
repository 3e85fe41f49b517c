//! Command drivers behind `fdisc discover` and `fdisc config`.
use crate::cli::{ConfigArgs, DiscoverArgs, ENGINE_NAME};
use crate::config::{self, DiscoveryConfig};
use crate::namespace::{NamespaceFilter, NamespaceRule};
use crate::output::{render_json, render_text};
use crate::parser::GherkinParser;
use crate::resolver::{ResolutionSummary, SelectorResolver};
use crate::tree::TestTree;
use crate::unique_id::UniqueId;
use anyhow::{anyhow, Result};

pub fn run_discover(args: DiscoverArgs) -> Result<()> {
    let (tree, summary) = discover(&args)?;
    if args.json {
        println!("{}", render_json(&tree, &summary)?);
    } else {
        print!("{}", render_text(&tree));
    }
    Ok(())
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match &args.out {
        Some(path) => {
            config::write_config(path, &config::default_config())?;
            println!("wrote {}", path.display());
        }
        None => println!("{}", config::config_stub()),
    }
    Ok(())
}

/// Resolve the selectors named by `args` into a fresh tree.
pub fn discover(args: &DiscoverArgs) -> Result<(TestTree, ResolutionSummary)> {
    let config = effective_config(args)?;
    let filter = namespace_filter(&config, args)?;
    let selectors = args.selectors(&config.suite_marker)?;
    if selectors.is_empty() {
        return Err(anyhow!(
            "no selectors given (use --file, --dir, --namespace, --suite, ...)"
        ));
    }

    let resolver = SelectorResolver::from_config(&config, Box::new(GherkinParser));
    let mut tree = TestTree::new(UniqueId::for_engine(ENGINE_NAME), ENGINE_NAME);
    let summary = resolver.resolve(&selectors, &filter, &mut tree)?;
    Ok((tree, summary))
}

/// Config file (or defaults) with command-line roots appended.
fn effective_config(args: &DiscoverArgs) -> Result<DiscoveryConfig> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::default_config(),
    };
    config.resolution_roots.extend(args.roots.iter().cloned());
    config::validate_config(&config)?;
    Ok(config)
}

/// Config rules and command-line rules, each composed on its own, ANDed.
fn namespace_filter(config: &DiscoveryConfig, args: &DiscoverArgs) -> Result<NamespaceFilter> {
    if let Some(name) = args
        .include_namespaces
        .iter()
        .chain(args.exclude_namespaces.iter())
        .find(|name| name.trim().is_empty() || name.contains('/'))
    {
        return Err(anyhow!("namespace flags take dotted names (got {name:?})"));
    }
    let flags = args
        .include_namespaces
        .iter()
        .map(|name| NamespaceRule::include(name))
        .chain(
            args.exclude_namespaces
                .iter()
                .map(|name| NamespaceRule::exclude(name)),
        );
    Ok(config.namespace_filter()?.and(NamespaceFilter::compose(flags)))
}
