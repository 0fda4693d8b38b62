//! Embedded static resources.
//!
//! - `serve` - files answered by the asset responder (css_async.js)

pub mod serve {
    /// Preload-to-stylesheet loader referenced by async CSS pages.
    pub const CSS_ASYNC_JS: &str = include_str!("serve/css_async.js");

    /// Cache lifetime of the loader, in seconds.
    pub const CSS_ASYNC_TTL: u64 = 8_640_000;
}
