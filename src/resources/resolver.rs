use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine;

/// Fetches resources a document refers to by URI (external buffers, MTL files).
///
/// Failures are handed back to the caller unchanged; loaders never retry.
pub trait ResourceResolver {
    fn resolve(&self, uri: &str) -> anyhow::Result<Vec<u8>>;
}

impl<F> ResourceResolver for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>>,
{
    fn resolve(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        self(uri)
    }
}

/// Resolves URIs relative to a directory on disk.
#[derive(Clone, Debug)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolver for the files next to `path`.
    pub fn for_file(path: &Path) -> Self {
        Self::new(path.parent().unwrap_or_else(|| Path::new(".")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceResolver for FsResolver {
    fn resolve(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        load_binary(self.root.join(uri))
    }
}

pub fn load_binary(path: impl AsRef<Path>) -> anyhow::Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Decodes a base64 `data:` URI, whatever its media type.
pub fn decode_data_uri(uri: &str) -> anyhow::Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .with_context(|| format!("not a data URI: {uri:.32}"))?;
    let (_, payload) = rest
        .split_once(";base64,")
        .with_context(|| format!("data URI is not base64 encoded: {uri:.32}"))?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .context("decoding base64 data URI")
}
