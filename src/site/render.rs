use std::path::Path;
use std::sync::Arc;

use tera::{Context, Tera};

use crate::error::{TapError, TapResult};
use crate::model::Venue;

use super::group::{StyleGroup, StyleGroups};

pub const INDEX_TEMPLATE: &str = "index.html";
pub const TYPE_TEMPLATE: &str = "type_page.html";

/// Owns the template environment for one run.
///
/// Home page context: `groups` (ordered `{key, style, beers}`) and `venues`.
/// Style page context: `beer_list`, `style`, `key`.
/// Output is not escaped; templates control their own markup.
pub struct SiteRenderer {
    tera: Tera,
}

impl SiteRenderer {
    /// Load every `*.html` under `dir`; both page templates must be present.
    pub fn from_dir(dir: &Path) -> TapResult<Self> {
        let glob = format!("{}/**/*.html", dir.display());
        let tera = Tera::new(&glob).map_err(|e| TapError::Render { template: glob.clone(), source: e })?;
        Self::finish(tera, dir)
    }

    pub fn from_raw(index: &str, type_page: &str) -> TapResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![(INDEX_TEMPLATE, index), (TYPE_TEMPLATE, type_page)])
            .map_err(|e| TapError::Render { template: "<raw>".into(), source: e })?;
        Self::finish(tera, Path::new("<raw>"))
    }

    fn finish(mut tera: Tera, origin: &Path) -> TapResult<Self> {
        tera.autoescape_on(vec![]);
        for name in [INDEX_TEMPLATE, TYPE_TEMPLATE] {
            if !tera.get_template_names().any(|n| n == name) {
                return Err(TapError::Config(format!("template `{}` not found in {}", name, origin.display())));
            }
        }
        Ok(Self { tera })
    }

    pub fn render_index(&self, groups: &StyleGroups, venues: &[Arc<Venue>]) -> TapResult<String> {
        let mut ctx = Context::new();
        ctx.insert("groups", groups.as_slice());
        ctx.insert("venues", venues);
        self.render(INDEX_TEMPLATE, &ctx)
    }

    pub fn render_type_page(&self, group: &StyleGroup) -> TapResult<String> {
        let mut ctx = Context::new();
        ctx.insert("beer_list", &group.beers);
        ctx.insert("style", &group.style);
        ctx.insert("key", &group.key);
        self.render(TYPE_TEMPLATE, &ctx)
    }

    fn render(&self, template: &str, ctx: &Context) -> TapResult<String> {
        self.tera.render(template, ctx).map_err(|e| TapError::Render { template: template.to_string(), source: e })
    }
}
