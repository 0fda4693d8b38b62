//! pageopt - HTML response optimizer.
//!
//! Rewrites outgoing HTML pages to speed up asset delivery: stylesheets and
//! scripts are minified or combined into content-hashed files, loaded async
//! or deferred, and announced through preload push hints. The generated
//! files are answered by [`serve::AssetResponder`].
//!
//! # Example
//!
//! ```ignore
//! let config = PageoptConfig::from_path(Path::new("pageopt.toml"))?;
//! let store = FileStore::new("pageopt-registry.json");
//! let resolver = FsResolver::new(&config.site.root, config.site.home());
//! let out = Pipeline::new(&config, &store, &resolver, &DefaultMinifier)
//!     .optimize_request(html, "/blog/");
//! ```

pub mod asset;
pub mod classify;
pub mod config;
pub mod embed;
pub mod error;
pub mod group;
pub mod logger;
pub mod minify;
pub mod pipeline;
pub mod registry;
pub mod scan;
pub mod serve;
pub mod synth;

pub use asset::{AssetKind, AssetReference, ClassifiedReference, ExcludeReason, Position};
pub use config::PageoptConfig;
pub use error::PipelineError;
pub use pipeline::{Hooks, Injection, Optimized, Pipeline, Stage};
