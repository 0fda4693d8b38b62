//! Stylesheet stage.

use super::RenderContext;
use crate::asset::{AssetKind, AssetReference, ClassifiedReference};
use crate::debug;
use crate::group::group;
use crate::synth::{Splice, combined_css, combined_css_async};

const GOOGLE_FONTS_HOST: &str = "fonts.googleapis.com";

/// Whether a stylesheet URL loads Google Fonts.
pub fn is_google_fonts(url: &str) -> bool {
    url.contains(GOOGLE_FONTS_HOST)
}

impl RenderContext<'_, '_> {
    pub(super) fn process_css(&mut self, refs: Vec<AssetReference>) {
        let kind = AssetKind::Css;
        let mut splice = Splice::new();

        let refs = if self.config.css.google_fonts_remove {
            let (fonts, rest): (Vec<_>, Vec<_>) =
                refs.into_iter().partition(|r| is_google_fonts(&r.url));
            for font in &fonts {
                debug!("optm"; "removing {}", font.url);
                splice.remove(&font.spans);
            }
            rest
        } else {
            refs
        };

        let classified = self.classify(refs, kind);
        self.push_kept_internal(&classified, kind);

        let combined = self.config.css.combine
            && classified.iter().any(|c| c.eligible)
            && self.combine_css(&classified, &mut splice);
        if !combined {
            self.rewrite_in_place(&classified, kind, &mut splice);
        }

        self.doc.apply(splice);
    }

    /// Move every non-pinned stylesheet into the head as combined bundles
    /// plus the ignored tags. Returns `false` when nothing was changed.
    fn combine_css(&mut self, refs: &[ClassifiedReference], splice: &mut Splice) -> bool {
        let kind = AssetKind::Css;
        let batches = group(
            refs.iter().filter(|c| c.eligible),
            self.config.optimize.max_combined_bytes,
        );
        let Some(urls) = batches
            .iter()
            .map(|batch| self.resolve(&batch.sources(), kind))
            .collect::<Option<Vec<_>>>()
        else {
            return false;
        };

        let build: fn(&str) -> String = if self.config.css.async_load {
            combined_css_async
        } else {
            combined_css
        };
        let bundles: String = urls.iter().map(|url| build(url)).collect();
        let ignored: String = refs
            .iter()
            .filter(|c| c.is_ignored())
            .map(|c| self.decorate(c.raw_tag().to_string(), c))
            .collect();

        if self.config.css.combined_first {
            self.doc.push_head(&bundles);
            self.doc.push_head(&ignored);
        } else {
            self.doc.push_head(&ignored);
            self.doc.push_head(&bundles);
        }

        for c in refs.iter().filter(|c| !c.is_pinned()) {
            splice.remove(&c.reference.spans);
        }
        for url in &urls {
            self.push(url, kind);
        }
        true
    }

    /// Async-wrap every kept stylesheet, or only Google Fonts ones.
    pub(super) fn wants_async(&self, c: &ClassifiedReference) -> bool {
        let css = &self.config.css;
        css.async_load || (css.google_fonts_async && is_google_fonts(c.url()))
    }
}
