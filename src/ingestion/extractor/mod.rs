use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{TapError, TapResult};
use crate::model::{Beer, Venue};

pub mod fields;

const VENUE_NAME: &str = "div.venue-name h1";
const ADDRESS: &str = "p.address";
const PHONE: &str = "p.phone";
const UPDATED: &str = "span.updated-time";
const UPDATED_ATTR: &str = "span.updated-time[data-time]";
const LOGO: &str = "div.logo img";
const SECTION: &str = "ul.menu-section-list";
const ENTRY: &str = "li";
const BEER_INFO: &str = "div.beer-info";
const BEER_LINK: &str = "div.beer-info a[href]";
const BEER_STYLE: &str = "div.beer-info em";
const BEER_DETAILS: &str = "div.beer-info h6 span";

/// A parsed venue page. Venue header and tap list are read separately so the
/// caller can settle the logo before the venue is shared by its beers.
pub struct TapPage {
    doc: Html,
    url: String,
}

impl TapPage {
    pub fn parse(markup: &str, url: &str) -> Self {
        Self { doc: Html::parse_document(markup), url: url.to_string() }
    }

    pub fn venue(&self) -> TapResult<Venue> {
        let root = self.doc.root_element();
        let name = text(self.require(root, VENUE_NAME)?);
        let address = fields::clean_address(&text(self.require(root, ADDRESS)?));
        let phone = text(self.require(root, PHONE)?).trim().to_string();
        let updated = self
            .require(root, UPDATED)?
            .value()
            .attr("data-time")
            .ok_or_else(|| self.missing(UPDATED_ATTR))?
            .to_string();

        let logo_url = first(root, LOGO).and_then(|img| img.value().attr("src")).map(|src| self.resolve(src));
        let logo = logo_url.as_deref().and_then(fields::logo_file_name);

        Ok(Venue { name: name.trim().to_string(), address, phone, logo, logo_url, updated, url: self.url.clone() })
    }

    /// Beers in document order; `tracker_base` prefixes each relative beer link.
    pub fn beers(&self, venue: &Arc<Venue>, tracker_base: &str) -> TapResult<Vec<Beer>> {
        let base = tracker_base.trim_end_matches('/');
        let mut out = Vec::new();
        for section in all(self.doc.root_element(), SECTION) {
            for entry in all(section, ENTRY) {
                if first(entry, BEER_INFO).is_none() { return Err(self.missing(BEER_INFO)); }

                let link = self.require(entry, BEER_LINK)?;
                let name = text(link).trim().to_string();
                let href = link.value().attr("href").unwrap_or_default();

                let (style, substyle) = fields::split_style(&text(self.require(entry, BEER_STYLE)?));

                let details_el = self.require(entry, BEER_DETAILS)?;
                let details = details_el.text().next().unwrap_or_default();
                let (abv, ibu) = fields::split_details(details).ok_or_else(|| TapError::MalformedBeer {
                    url: self.url.clone(),
                    beer: name.clone(),
                    details: details.trim().to_string(),
                })?;

                out.push(Beer {
                    name,
                    style,
                    substyle,
                    abv,
                    ibu,
                    url: format!("{base}{href}"),
                    venue: Arc::clone(venue),
                });
            }
        }
        Ok(out)
    }

    /// `href` made absolute against the page URL; left as is when either does not parse.
    fn resolve(&self, href: &str) -> String {
        match Url::parse(&self.url).and_then(|base| base.join(href)) {
            Ok(u) => u.to_string(),
            Err(_) => href.to_string(),
        }
    }

    fn require<'a>(&self, scope: ElementRef<'a>, css: &'static str) -> TapResult<ElementRef<'a>> {
        first(scope, css).ok_or_else(|| self.missing(css))
    }

    fn missing(&self, marker: &'static str) -> TapError {
        TapError::MalformedPage { url: self.url.clone(), marker }
    }
}

fn first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(css).ok()?;
    scope.select(&sel).next()
}

fn all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(sel) => scope.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

fn text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}
