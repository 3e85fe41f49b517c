//! Resource enumeration capabilities consumed by the resolver.
//!
//! The resolver only talks to `ResourceLocator`/`ResourceHandle`; the
//! filesystem implementation below treats a list of directories as the
//! resolution roots that namespace and resource selectors are searched in.
use crate::location::{ResourceUri, CLASSPATH_SCHEME, FILE_SCHEME};
use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub trait ResourceHandle {
    fn exists(&self) -> bool;
    /// Fails when the resource has no addressable location.
    fn uri(&self) -> Result<ResourceUri>;
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;
    /// Human-readable label used in error messages.
    fn description(&self) -> String;
}

pub type Resources = Vec<Box<dyn ResourceHandle>>;

pub trait ResourceLocator {
    /// Every resource below `root` whose name ends with `extension`.
    fn find_under_root(&self, root: &ResourceUri, extension: &str) -> Result<Resources>;

    /// Every resource below `namespace_path` (slash form) in any resolution
    /// root. An empty path means the whole of every root.
    fn find_in_namespace(&self, namespace_path: &str, extension: &str) -> Result<Resources>;

    /// The single resource a URI addresses. A `classpath:` URI names a path
    /// relative to the resolution roots.
    fn resource(&self, uri: &ResourceUri) -> Result<Box<dyn ResourceHandle>>;
}

/// All regular files below `dir` whose file name ends with `extension`,
/// sorted by path.
pub fn collect_feature_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(extension));
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

#[derive(Debug, Clone)]
pub struct FsResource {
    path: Option<PathBuf>,
    label: String,
}

/// `path` joined onto the current directory unless it is already absolute.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("resolve current directory")?;
    Ok(cwd.join(path))
}

impl FsResource {
    /// Resource at `path`; relative paths are anchored at the current directory.
    pub fn at(path: PathBuf) -> Self {
        let path = match absolute_path(&path) {
            Ok(absolute) => absolute,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "keeping relative resource path");
                path
            }
        };
        let label = format!("file [{}]", path.display());
        Self {
            path: Some(path),
            label,
        }
    }

    pub fn missing(label: String) -> Self {
        Self { path: None, label }
    }
}

impl ResourceHandle for FsResource {
    fn exists(&self) -> bool {
        self.path.as_deref().is_some_and(Path::is_file)
    }

    fn uri(&self) -> Result<ResourceUri> {
        self.path
            .as_deref()
            .map(ResourceUri::from_path)
            .ok_or_else(|| anyhow!("{} has no location", self.label))
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        let path = self.path.as_deref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} does not exist", self.label))
        })?;
        Ok(Box::new(File::open(path)?))
    }

    fn description(&self) -> String {
        self.label.clone()
    }
}

/// Filesystem-backed locator over an ordered list of resolution roots.
#[derive(Debug, Clone, Default)]
pub struct FsResourceLocator {
    roots: Vec<PathBuf>,
}

impl FsResourceLocator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    fn boxed(paths: Vec<PathBuf>) -> Resources {
        paths
            .into_iter()
            .map(|path| Box::new(FsResource::at(path)) as Box<dyn ResourceHandle>)
            .collect()
    }
}

impl ResourceLocator for FsResourceLocator {
    fn find_under_root(&self, root: &ResourceUri, extension: &str) -> Result<Resources> {
        let dir = root
            .to_file_path()
            .ok_or_else(|| anyhow!("unsupported root scheme {:?} in {root}", root.scheme()))?;
        Ok(Self::boxed(collect_feature_files(&dir, extension)?))
    }

    fn find_in_namespace(&self, namespace_path: &str, extension: &str) -> Result<Resources> {
        let relative = namespace_path.trim_matches('/');
        let mut paths = Vec::new();
        for root in &self.roots {
            let dir = if relative.is_empty() {
                root.clone()
            } else {
                root.join(relative)
            };
            // A namespace usually lives in only some of the roots.
            if !dir.is_dir() {
                continue;
            }
            paths.extend(collect_feature_files(&dir, extension)?);
        }
        Ok(Self::boxed(paths))
    }

    fn resource(&self, uri: &ResourceUri) -> Result<Box<dyn ResourceHandle>> {
        match uri.scheme() {
            FILE_SCHEME => Ok(Box::new(FsResource::at(PathBuf::from(
                uri.scheme_specific_part(),
            )))),
            CLASSPATH_SCHEME => {
                let name = uri.scheme_specific_part().trim_start_matches('/');
                let found = self
                    .roots
                    .iter()
                    .map(|root| root.join(name))
                    .find(|candidate| candidate.is_file());
                Ok(Box::new(match found {
                    Some(path) => FsResource::at(path),
                    None => FsResource::missing(format!("classpath resource [{name}]")),
                }))
            }
            other => Err(anyhow!("unsupported resource scheme {other:?} in {uri}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
        fs::write(path, text).expect("write file");
    }

    #[test]
    fn collects_only_exact_suffix_matches() {
        let temp = TempDir::new().expect("temp dir");
        write(temp.path(), "a.feature", "");
        write(temp.path(), "nested/b.feature", "");
        write(temp.path(), "nested/c.FEATURE", "");
        write(temp.path(), "nested/d.feature.bak", "");
        fs::create_dir_all(temp.path().join("dir.feature")).expect("create dir");

        let files = collect_feature_files(temp.path(), ".feature").expect("collect");
        let names: Vec<String> = files
            .iter()
            .map(|path| {
                path.strip_prefix(temp.path())
                    .expect("relative")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.feature", "nested/b.feature"]);
    }

    #[test]
    fn namespace_search_spans_all_roots() {
        let first = TempDir::new().expect("temp dir");
        let second = TempDir::new().expect("temp dir");
        write(first.path(), "com/acme/a.feature", "");
        write(second.path(), "com/acme/deep/b.feature", "");
        write(second.path(), "org/other/c.feature", "");

        let locator =
            FsResourceLocator::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        let found = locator
            .find_in_namespace("com/acme", ".feature")
            .expect("find in namespace");
        let names: Vec<String> = found
            .iter()
            .filter_map(|resource| resource.uri().ok())
            .filter_map(|uri| uri.file_name().map(str::to_string))
            .collect();
        assert_eq!(names, vec!["a.feature", "b.feature"]);
        assert_eq!(
            locator
                .find_in_namespace("", ".feature")
                .expect("find everything")
                .len(),
            3
        );
    }

    #[test]
    fn classpath_resource_resolves_against_roots() {
        let root = TempDir::new().expect("temp dir");
        write(root.path(), "com/acme/a.feature", "Feature: a\n");
        let locator = FsResourceLocator::new(vec![root.path().to_path_buf()]);

        let found = locator
            .resource(&ResourceUri::new(CLASSPATH_SCHEME, "com/acme/a.feature"))
            .expect("resource");
        assert!(found.exists());
        let mut text = String::new();
        found
            .open()
            .expect("open")
            .read_to_string(&mut text)
            .expect("read");
        assert_eq!(text, "Feature: a\n");

        let missing = locator
            .resource(&ResourceUri::new(CLASSPATH_SCHEME, "nope.feature"))
            .expect("missing resource handle");
        assert!(!missing.exists());
        assert!(missing.uri().is_err());
    }

    #[test]
    fn relative_resource_paths_become_absolute() {
        let resource = FsResource::at(PathBuf::from("res/com/acme/a.feature"));
        let cwd = std::env::current_dir().expect("current dir");
        assert_eq!(
            resource.uri().expect("uri"),
            ResourceUri::from_path(&cwd.join("res/com/acme/a.feature"))
        );
        assert!(resource.description().contains(&cwd.display().to_string()));
    }

    #[test]
    fn unknown_scheme_is_an_error() {
        let locator = FsResourceLocator::default();
        let uri = ResourceUri::parse("https://example.com/a.feature").expect("parse uri");
        assert!(locator.resource(&uri).is_err());
    }
}
