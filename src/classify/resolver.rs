//! Mapping of page URLs to files under the document root.

use std::fs;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::Url;

/// A local file backing an asset URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Resolves asset URLs to local files.
///
/// `None` means the URL is remote or no such file exists.
pub trait LocalResolver {
    fn resolve_local(&self, url: &str) -> Option<LocalFile>;
}

/// Resolver over a document root, treating `site` as the local origin.
#[derive(Debug, Clone)]
pub struct FsResolver {
    root: PathBuf,
    site: Option<Url>,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>, site: Option<Url>) -> Self {
        Self {
            root: root.into(),
            site,
        }
    }

    /// Decoded URL path relative to the site root, or `None` if remote.
    pub fn local_path(&self, url: &str) -> Option<String> {
        let url = url.trim();
        match &self.site {
            Some(site) => {
                let joined = site.join(url).ok()?;
                if joined.host_str() != site.host_str() || joined.port() != site.port() {
                    return None;
                }
                let path = decode(joined.path());
                let prefix = site.path().trim_end_matches('/');
                let rel = path
                    .strip_prefix(prefix)
                    .filter(|r| r.is_empty() || r.starts_with('/'))?;
                Some(rel.trim_start_matches('/').to_string())
            }
            None => {
                if url.starts_with("//") || url.contains("://") {
                    return None;
                }
                let path = url.split(['?', '#']).next().unwrap_or(url);
                Some(decode(path).trim_start_matches('/').to_string())
            }
        }
    }
}

impl LocalResolver for FsResolver {
    fn resolve_local(&self, url: &str) -> Option<LocalFile> {
        let rel = self.local_path(url)?;
        let rel = Path::new(&rel);
        if rel.as_os_str().is_empty()
            || rel
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }

        let path = self.root.join(rel);
        let meta = fs::metadata(&path).ok()?;
        meta.is_file().then(|| LocalFile {
            path,
            size: meta.len(),
        })
    }
}

fn decode(path: &str) -> String {
    percent_decode_str(path)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
