//! End-to-end runs of the optimization pipeline over a temporary site.

use std::fs;
use std::path::Path;

use pageopt::classify::FsResolver;
use pageopt::minify::{DefaultMinifier, Minifier, MinifyError, MinifyKind};
use pageopt::registry::{HashStore, MemoryStore, SourceHash};
use pageopt::serve::{AssetResponder, CachePolicy};
use pageopt::{AssetKind, Optimized, PageoptConfig, Pipeline, Stage};
use regex::Regex;
use tempfile::TempDir;

/// Minifier whose HTML pass always fails.
struct BrokenHtmlMinifier;

impl Minifier for BrokenHtmlMinifier {
    fn minify(&self, source: &str, kind: MinifyKind) -> Result<String, MinifyError> {
        match kind {
            MinifyKind::Html => Err(MinifyError::Parse {
                kind,
                message: "unbalanced tags".into(),
            }),
            _ => Ok(source.to_string()),
        }
    }
}

struct Site {
    dir: TempDir,
    config: PageoptConfig,
    store: MemoryStore,
}

impl Site {
    /// Site whose document root holds `files` (path, byte size).
    fn new(files: &[(&str, usize)]) -> Self {
        let dir = TempDir::new().unwrap();
        for (path, size) in files {
            let full = dir.path().join(path.trim_start_matches('/'));
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, body_of(path, *size)).unwrap();
        }
        let mut config = PageoptConfig::default();
        config.site.root = dir.path().to_path_buf();
        Self {
            dir,
            config,
            store: MemoryStore::new(),
        }
    }

    fn resolver(&self) -> FsResolver {
        FsResolver::new(self.dir.path(), None)
    }

    fn run_with(&self, html: &str, minifier: &dyn Minifier) -> Optimized {
        let resolver = self.resolver();
        Pipeline::new(&self.config, &self.store, &resolver, minifier).optimize(html.to_string())
    }

    fn run(&self, html: &str) -> Optimized {
        self.run_with(html, &DefaultMinifier)
    }

    fn sources(&self, file: &str) -> Vec<String> {
        self.store.get(file).unwrap().unwrap_or_default()
    }
}

/// Comment-padded file content of an exact size.
fn body_of(path: &str, size: usize) -> String {
    let head = if path.ends_with(".css") {
        format!(".{} {{ color: red; }}\n", stem(path))
    } else {
        format!("window.{} = 1;\n", stem(path).replace(['.', '-'], "_"))
    };
    let pad = size.saturating_sub(head.len() + 5);
    format!("{head}/*{}*/\n", " ".repeat(pad))
}

fn stem(path: &str) -> &str {
    Path::new(path).file_stem().unwrap().to_str().unwrap()
}

/// Generated file names referenced by a page, in order.
fn generated(html: &str, kind: AssetKind) -> Vec<String> {
    let re = Regex::new(&format!(r"/min/(\w+\.{})", kind.ext())).unwrap();
    re.captures_iter(html).map(|c| c[1].to_string()).collect()
}

fn page(head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>t</title>\n{head}\n</head>\n<body>\n<p>content</p>\n{body}\n</body></html>\n"
    )
}

#[test]
fn test_batches_close_before_exceeding_ceiling() {
    let mut site = Site::new(&[
        ("/css/a.css", 100_000),
        ("/css/b.css", 200_000),
        ("/css/c.css", 50_000),
    ]);
    site.config.css.combine = true;
    site.config.optimize.max_combined_bytes = 250_000;

    let html = page(
        r#"<link rel="stylesheet" href="/css/a.css">
<link rel="stylesheet" href="/css/b.css">
<link rel="stylesheet" href="/css/c.css">"#,
        "",
    );
    let out = site.run(&html);

    let files = generated(&out.html, AssetKind::Css);
    assert_eq!(files.len(), 2);
    assert_eq!(site.sources(&files[0]), ["/css/a.css"]);
    assert_eq!(site.sources(&files[1]), ["/css/b.css", "/css/c.css"]);
    assert!(!out.html.contains(r#"href="/css/"#));
}

#[test]
fn test_no_optimize_script_untouched() {
    let mut site = Site::new(&[("/js/a.js", 100), ("/js/keep.js", 100)]);
    site.config.js.combine = true;
    site.config.js.minify = true;
    site.config.js.defer = true;

    let keep = r#"<script data-no-optimize src="/js/keep.js"></script>"#;
    let html = page(&format!(r#"{keep}<script src="/js/a.js"></script>"#), "");
    let out = site.run(&html);

    assert!(out.html.contains(&format!("<title>t</title>\n{keep}")));
    assert_eq!(out.html.matches("keep.js").count(), 1);
    for file in generated(&out.html, AssetKind::Js) {
        assert!(!site.sources(&file).iter().any(|s| s.contains("keep.js")));
    }
}

#[test]
fn test_minify_failure_keeps_earlier_stages() {
    let html = page(
        r#"<link rel="stylesheet" href="/css/a.css"><script src="/js/h.js"></script>"#,
        r#"<script src="/js/f.js"></script>"#,
    );
    let files = [("/css/a.css", 100), ("/js/h.js", 100), ("/js/f.js", 100)];

    let mut site = Site::new(&files);
    site.config.css.combine = true;
    site.config.js.combine = true;
    site.config.js.defer = true;
    site.config.html.dns_prefetch = vec!["//fonts.example.net".into()];
    let reference = site.run(&html);

    site.config.html.minify = true;
    let failed = site.run_with(&html, &BrokenHtmlMinifier);

    assert!(failed.entered(Stage::MinifyingWhole));
    assert_eq!(failed.html, reference.html);
    assert!(failed.html.contains("dns-prefetch"));
    assert_eq!(generated(&failed.html, AssetKind::Js).len(), 2);
}

#[test]
fn test_jquery_hoisted_ahead_of_bundle() {
    let mut site = Site::new(&[
        ("/js/a.js", 100),
        ("/wp-includes/js/jquery/jquery.js", 1_000),
        ("/js/b.js", 100),
    ]);
    site.config.js.combine = true;
    site.config.js.exclude_jquery = true;
    site.config.js.combined_first = true;
    site.config.js.http2_push = true;

    let html = page(
        r#"<script src="/js/a.js"></script>
<script src="/wp-includes/js/jquery/jquery.js"></script>
<script src="/js/b.js"></script>"#,
        "",
    );
    let out = site.run(&html);

    let jquery = out.html.find("jquery.js").unwrap();
    let bundle = out.html.find("<script data-optimized='1'").unwrap();
    let charset = out.html.find("<meta charset").unwrap();
    assert!(charset < jquery && jquery < bundle);

    let files = generated(&out.html, AssetKind::Js);
    assert_eq!(files.len(), 1);
    assert_eq!(site.sources(&files[0]), ["/js/a.js", "/js/b.js"]);
    assert!(
        out.push_hints
            .contains(&"</wp-includes/js/jquery/jquery.js>; rel=preload; as=script".to_string())
    );
}

#[test]
fn test_collision_uses_full_hash() {
    let mut site = Site::new(&[("/css/a.css", 100)]);
    site.config.css.minify = true;

    let sources = vec!["/css/a.css".to_string()];
    let hash = SourceHash::of(&sources);
    site.store
        .put(&format!("{}.css", hash.short()), &["/css/other.css".to_string()])
        .unwrap();

    let out = site.run(&page(r#"<link rel="stylesheet" href="/css/a.css">"#, ""));
    let files = generated(&out.html, AssetKind::Css);
    assert_eq!(files, [format!("{}.css", hash.to_hex())]);
    assert_eq!(site.sources(&files[0]), sources);
    assert_eq!(site.sources(&format!("{}.css", hash.short())), ["/css/other.css"]);
}

#[test]
fn test_second_run_changes_nothing() {
    let mut site = Site::new(&[
        ("/css/a.css", 500),
        ("/css/b.css", 500),
        ("/js/jquery.min.js", 500),
        ("/js/app.js", 500),
        ("/js/footer.js", 500),
    ]);
    let config = &mut site.config;
    config.css.combine = true;
    config.css.minify = true;
    config.css.async_load = true;
    config.css.http2_push = true;
    config.css.google_fonts_async = true;
    config.js.combine = true;
    config.js.defer = true;
    config.js.exclude_jquery = true;
    config.js.combined_first = true;
    config.js.http2_push = true;
    config.html.remove_query_strings = true;
    config.html.dns_prefetch = vec!["//cdn.example.net".into()];

    let html = page(
        r#"<!-- <link rel="stylesheet" href="/css/old.css"> -->
<link rel="stylesheet" href="/css/a.css?ver=5.1">
<link rel="stylesheet" href="https://fonts.googleapis.com/css?family=Lato">
<link rel="stylesheet" href="/css/b.css">
<noscript><link rel="stylesheet" href="/css/a.css"></noscript>
<script src="/js/jquery.min.js?ver=3"></script>
<script src="https://cdn.example.net/lib.js"></script>
<script src="/js/app.js"></script>
<script>var inline = true;</script>"#,
        r#"<script src="/js/footer.js"></script>"#,
    );

    let first = site.run(&html);
    assert_ne!(first.html, html);
    assert!(first.html.contains(r#"<!-- <link rel="stylesheet" href="/css/old.css"> -->"#));
    assert!(first.html.contains("<script>var inline = true;</script>"));

    let second = site.run(&first.html);
    assert_eq!(second.html, first.html);
}

#[test]
fn test_generated_file_served() {
    let mut site = Site::new(&[("/css/a.css", 200), ("/css/b.css", 200)]);
    site.config.css.combine = true;

    let out = site.run(&page(
        r#"<link rel="stylesheet" href="/css/a.css"><link rel="stylesheet" href="/css/b.css">"#,
        "",
    ));
    let files = generated(&out.html, AssetKind::Css);
    assert_eq!(files.len(), 1);

    let resolver = site.resolver();
    let responder = AssetResponder::new(&site.config, &site.store, &resolver, &DefaultMinifier);
    let mut cache = CachePolicy::default();
    let response = responder
        .respond(&format!("/min/{}", files[0]), &mut cache)
        .unwrap();

    let a = response.body.find(".a {").unwrap();
    let b = response.body.find(".b {").unwrap();
    assert!(a < b);
    assert!(cache.cacheable);
}

#[test]
fn test_whole_page_minified() {
    let mut site = Site::new(&[]);
    site.config.html.minify = true;
    let html = page("", "");
    let out = site.run(&html);
    assert!(out.html.len() < html.len() + pageopt::pipeline::BANNER.len());
    assert!(out.html.contains("<p>content</p>"));
    assert!(out.html.ends_with(pageopt::pipeline::BANNER));
}

#[test]
fn test_minified_bundle_keeps_every_global() {
    let mut site = Site::new(&[]);
    site.config.js.combine = true;
    site.config.js.minify = true;
    let scripts = [
        ("js/menu.js", "function initMenu(el) {\n  el.classList.add('open');\n}\n"),
        ("js/config.js", "var siteConfig = { lang: 'en' };\n"),
        ("js/track.js", "function track(event) {\n  return event.type;\n}\n"),
    ];
    let js = site.dir.path().join("js");
    fs::create_dir_all(&js).unwrap();
    for (path, source) in scripts {
        fs::write(site.dir.path().join(path), source).unwrap();
    }

    let out = site.run(&page(
        r#"<script src="/js/menu.js"></script>
<script src="/js/config.js"></script>
<script src="/js/track.js"></script>"#,
        "",
    ));
    let files = generated(&out.html, AssetKind::Js);
    assert_eq!(files.len(), 1);

    let resolver = site.resolver();
    let responder = AssetResponder::new(&site.config, &site.store, &resolver, &DefaultMinifier);
    let mut cache = CachePolicy::default();
    let body = responder
        .respond(&format!("/min/{}", files[0]), &mut cache)
        .unwrap()
        .body;

    let menu = body.find("function initMenu(").unwrap();
    let config = body.find("var siteConfig=").unwrap();
    let track = body.find("function track(").unwrap();
    assert!(menu < config && config < track);
    assert!(cache.cacheable);
}
