//! Hash registry: stable URLs for ordered lists of asset sources.
//!
//! A source list is named by the last five hex characters of its content
//! hash. The short name is claimed atomically in the store; if it is already
//! held by a different list, the full 32-character hash is used instead and
//! stored under its own key, leaving the short entry untouched.
//!
//! ```text
//! ["/a.css", "/b.css"] ──hash──▶ 9f3c…e41d7
//!                                    │
//!            claim "e41d7.css" ◀─────┘
//!              ├─ free         → store, /min/e41d7.css
//!              ├─ same list    → /min/e41d7.css
//!              └─ other list   → store "9f3c…e41d7.css", /min/9f3c…e41d7.css
//! ```

mod hash;
mod store;

pub use hash::{SHORT_LEN, SourceHash};
pub use store::{FileStore, HashStore, MemoryStore, StoreError};

use crate::asset::AssetKind;
use crate::debug;

/// Resolves source lists to generated-file URLs.
pub struct HashRegistry<'a> {
    store: &'a dyn HashStore,
    /// URL prefix of generated files, without trailing slash.
    base_url: String,
}

impl<'a> HashRegistry<'a> {
    pub fn new(store: &'a dyn HashStore, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { store, base_url }
    }

    /// URL of the generated file serving `sources` concatenated in order.
    pub fn resolve(&self, sources: &[String], kind: AssetKind) -> Result<String, StoreError> {
        let name = self.name_for(sources, kind)?;
        Ok(self.url_for(&name, kind))
    }

    /// File stem (short or full hash) for `sources`.
    pub fn name_for(&self, sources: &[String], kind: AssetKind) -> Result<String, StoreError> {
        let hash = SourceHash::of(sources);
        let short = hash.short();

        match self.store.put_if_absent(&key(&short, kind), sources)? {
            None => Ok(short),
            Some(existing) if existing == sources => Ok(short),
            Some(_) => {
                let full = hash.to_hex();
                debug!("registry"; "short hash {}.{} taken, using {}", short, kind, full);
                self.store.put(&key(&full, kind), sources)?;
                Ok(full)
            }
        }
    }

    /// Stored source list for a generated file name such as `e41d7.css`.
    pub fn sources(&self, file_name: &str) -> Result<Option<Vec<String>>, StoreError> {
        self.store.get(file_name)
    }

    pub fn url_for(&self, name: &str, kind: AssetKind) -> String {
        format!("{}/{}", self.base_url, key(name, kind))
    }
}

#[inline]
fn key(name: &str, kind: AssetKind) -> String {
    format!("{name}.{}", kind.ext())
}
