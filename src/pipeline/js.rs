//! Script stage: head and foot groups are combined independently.

use super::{Injection, RenderContext};
use crate::asset::{AssetKind, AssetReference, ClassifiedReference};
use crate::classify::is_jquery;
use crate::group::group;
use crate::synth::{DeferRules, Splice, combined_js};

/// Assembled markup for one placement group.
struct GroupMarkup {
    bundles: String,
    ignored: String,
    /// Ignored jQuery tag, hoisted ahead of the bundles.
    jquery: Option<String>,
    urls: Vec<String>,
}

impl RenderContext<'_, '_> {
    pub(super) fn process_js(&mut self, refs: Vec<AssetReference>) {
        let kind = AssetKind::Js;
        let mut splice = Splice::new();

        let classified = self.classify(refs, kind);
        self.push_kept_internal(&classified, kind);

        let combined = self.config.js.combine
            && classified.iter().any(|c| c.eligible)
            && self.combine_js(&classified, &mut splice);
        if !combined {
            self.rewrite_in_place(&classified, kind, &mut splice);
        }

        self.doc.apply(splice);
    }

    pub(super) fn defer_rules(&self) -> DeferRules<'_> {
        DeferRules {
            exclude: &self.config.js.defer_exclude,
            exclude_jquery: self.config.js.exclude_jquery,
        }
    }

    fn combine_js(&mut self, refs: &[ClassifiedReference], splice: &mut Splice) -> bool {
        let (head, foot): (Vec<&ClassifiedReference>, Vec<&ClassifiedReference>) = refs
            .iter()
            .filter(|c| !c.is_pinned())
            .partition(|c| c.reference.is_head());

        let hoist = self.config.js.combined_first;
        let Some(head_markup) = self.assemble(&head, hoist) else {
            return false;
        };
        let Some(foot_markup) = self.assemble(&foot, false) else {
            return false;
        };

        for (markup, injection) in [
            (head_markup, Injection::Head),
            (foot_markup, Injection::Foot),
        ] {
            let mut html = String::new();
            if let Some(jquery) = &markup.jquery {
                html.push_str(jquery);
            }
            if self.config.js.combined_first {
                html.push_str(&markup.bundles);
                html.push_str(&markup.ignored);
            } else {
                html.push_str(&markup.ignored);
                html.push_str(&markup.bundles);
            }
            match injection {
                Injection::Head => self.doc.push_head(&html),
                Injection::Foot => self.doc.push_foot(&html),
            }
            for url in &markup.urls {
                self.push(url, AssetKind::Js);
            }
        }

        for c in head.iter().chain(&foot) {
            splice.remove(&c.reference.spans);
        }
        true
    }

    /// Bundles and ignored tags for one group. `None` when the store fails.
    fn assemble(&self, refs: &[&ClassifiedReference], hoist_jquery: bool) -> Option<GroupMarkup> {
        let batches = group(
            refs.iter().copied().filter(|c| c.eligible),
            self.config.optimize.max_combined_bytes,
        );
        let urls = batches
            .iter()
            .map(|batch| self.resolve(&batch.sources(), AssetKind::Js))
            .collect::<Option<Vec<_>>>()?;

        let defer = self.config.js.defer;
        let bundles = urls.iter().map(|url| combined_js(url, defer)).collect();

        let mut jquery = None;
        let mut ignored = String::new();
        for c in refs.iter().filter(|c| c.is_ignored()) {
            let tag = self.decorate(c.raw_tag().to_string(), c);
            if hoist_jquery && jquery.is_none() && is_jquery(c.url()) {
                jquery = Some(tag);
            } else {
                ignored.push_str(&tag);
            }
        }

        Some(GroupMarkup {
            bundles,
            ignored,
            jquery,
            urls,
        })
    }
}
