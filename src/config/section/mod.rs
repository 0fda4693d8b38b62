//! Configuration section definitions.
//!
//! Each module corresponds to a section in `pageopt.toml`:
//!
//! | Module     | TOML Section   | Purpose                                   |
//! |------------|----------------|-------------------------------------------|
//! | `site`     | `[site]`       | Home URL, document root, URI excludes     |
//! | `css`      | `[css]`        | Stylesheet minify/combine/async/push      |
//! | `js`       | `[js]`         | Script minify/combine/defer/push          |
//! | `html`     | `[html]`       | Document-level transforms                 |
//! | `optimize` | `[optimize]`   | Combined size ceiling, generated-file TTL |

mod css;
mod html;
mod js;
mod optimize;
mod site;

pub use css::CssConfig;
pub use html::HtmlConfig;
pub use js::JsConfig;
pub use optimize::OptimizeConfig;
pub use site::SiteConfig;
