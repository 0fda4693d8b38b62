//! Markup synthesizer: tags, rewrites and document splicing.
//!
//! Every change to a page goes through a [`DocumentBuffer`]: reference spans
//! are replaced in one [`Splice`] pass, and generated tags are queued for the
//! head or foot and injected once the asset stages are done.

mod buffer;
mod push;
mod splice;
mod tags;

pub use buffer::DocumentBuffer;
pub use push::{PushHints, to_uri};
pub use splice::Splice;
pub use tags::{
    DeferRules, async_css, combined_css, combined_css_async, combined_js, mark_optimized,
    rewrite_url,
};
