use std::{
    collections::HashMap,
    io::{Cursor, Read},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::{FxgError, FxgResult};

/// Opens byte streams for bitmap `source` locators.
///
/// The transcoder calls this synchronously during the walk and caches results per source, so
/// an implementation is asked at most once per distinct locator and transcode.
pub trait ResourceResolver {
    /// Open the resource named by `source`.
    fn open(&self, source: &str) -> FxgResult<Box<dyn Read + '_>>;
}

/// Resolves sources as file paths under a root directory.
///
/// Sources are taken relative to a base directory inside the root (the root itself unless
/// [`FileResourceResolver::with_base`] is used), so `@Embed('../img/a.png')` from a document
/// in `root/doc/` reads `root/img/a.png`. Absolute sources and sources that climb above the
/// root are rejected.
#[derive(Clone, Debug)]
pub struct FileResourceResolver {
    root: PathBuf,
    base: String,
}

impl FileResourceResolver {
    /// Resolver rooted at `root` (typically the directory of the FXG document).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base: String::new(),
        }
    }

    /// Resolve sources against `base`, a directory given relative to the root.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceResolver for FileResourceResolver {
    fn open(&self, source: &str) -> FxgResult<Box<dyn Read + '_>> {
        let rel = resolve_rel_path(&self.base, source)?;
        let path = self.root.join(Path::new(&rel));
        let file = std::fs::File::open(&path)
            .with_context(|| format!("open image '{}'", path.display()))?;
        Ok(Box::new(std::io::BufReader::new(file)))
    }
}

/// In-memory resolver mapping source locators to bytes.
#[derive(Clone, Debug, Default)]
pub struct MemoryResourceResolver {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryResourceResolver {
    /// Empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes for a source locator.
    pub fn insert(&mut self, source: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(source.into(), bytes);
    }

    /// Builder-style [`MemoryResourceResolver::insert`].
    pub fn with_entry(mut self, source: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(source, bytes);
        self
    }
}

impl ResourceResolver for MemoryResourceResolver {
    fn open(&self, source: &str) -> FxgResult<Box<dyn Read + '_>> {
        let bytes = self
            .entries
            .get(source)
            .ok_or_else(|| FxgError::validation(format!("no resource registered for '{source}'")))?;
        Ok(Box::new(Cursor::new(bytes.as_slice())))
    }
}

/// Join `source` onto the directory `base` and return the root-relative path.
///
/// Either may use `\` separators. `.` segments vanish and `..` drops the previous segment.
pub fn resolve_rel_path(base: &str, source: &str) -> FxgResult<String> {
    let source = source.trim().replace('\\', "/");
    if source.is_empty() {
        return Err(FxgError::validation("resource path is empty"));
    }
    if source.starts_with('/') {
        return Err(FxgError::validation(format!(
            "resource '{source}' is absolute; only relative paths resolve"
        )));
    }
    let base = base.replace('\\', "/");

    let mut segments = Vec::<&str>::new();
    for part in base.split('/').chain(source.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(FxgError::validation(format!(
                        "resource '{source}' climbs above the resolver root"
                    )));
                }
            }
            name => segments.push(name),
        }
    }

    if segments.is_empty() {
        return Err(FxgError::validation(format!(
            "resource '{source}' names no file"
        )));
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;
