use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::model::Beer;

use super::write::STATIC_SUBDIR;

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("static regex"));

/// Key for beers whose style has no letters or digits at all.
pub const UNKNOWN_KEY: &str = "unknown";
/// Stands in for a style keyed `static`, whose directory would collide with the copied assets.
/// The dash keeps it out of reach of `style_key`.
pub const STATIC_STYLE_KEY: &str = "static-style";

/// Grouping key and directory name: lowercase, letters and digits only.
pub fn style_key(style: &str) -> String {
    NON_ALNUM.replace_all(&style.to_lowercase(), "").into_owned()
}

#[derive(Debug, Clone, Serialize)]
pub struct StyleGroup {
    pub key: String,
    /// Style as spelled by the first beer seen with this key.
    pub style: String,
    pub beers: Vec<Beer>,
}

/// Style groups in first-seen order with lookup by key.
#[derive(Debug, Default)]
pub struct StyleGroups {
    groups: Vec<StyleGroup>,
    index: HashMap<String, usize>,
}

impl StyleGroups {
    pub fn insert(&mut self, beer: Beer) {
        let mut key = style_key(&beer.style);
        if key.is_empty() { key = UNKNOWN_KEY.to_string(); }
        if key == STATIC_SUBDIR { key = STATIC_STYLE_KEY.to_string(); }
        match self.index.get(&key) {
            Some(&i) => self.groups[i].beers.push(beer),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                let style = if beer.style.trim().is_empty() { "Unknown".to_string() } else { beer.style.clone() };
                self.groups.push(StyleGroup { key, style, beers: vec![beer] });
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StyleGroup> { self.groups.iter() }

    pub fn as_slice(&self) -> &[StyleGroup] { &self.groups }

    pub fn len(&self) -> usize { self.groups.len() }

    pub fn is_empty(&self) -> bool { self.groups.is_empty() }

    pub fn beer_count(&self) -> usize { self.groups.iter().map(|g| g.beers.len()).sum() }
}

#[cfg(test)]
impl StyleGroups {
    pub fn get(&self, key: &str) -> Option<&StyleGroup> {
        self.index.get(key).map(|&i| &self.groups[i])
    }
}

impl<'a> IntoIterator for &'a StyleGroups {
    type Item = &'a StyleGroup;
    type IntoIter = std::slice::Iter<'a, StyleGroup>;
    fn into_iter(self) -> Self::IntoIter { self.groups.iter() }
}

pub fn group_by_style(beers: &[Beer]) -> StyleGroups {
    let mut groups = StyleGroups::default();
    for beer in beers { groups.insert(beer.clone()); }
    groups
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::Venue;
    use std::sync::Arc;

    pub(crate) fn beer(name: &str, style: &str, venue: &Arc<Venue>) -> Beer {
        Beer {
            name: name.into(),
            style: style.into(),
            substyle: None,
            abv: "5.0".into(),
            ibu: "20".into(),
            url: format!("https://untappd.com/b/{}", name.to_lowercase()),
            venue: Arc::clone(venue),
        }
    }

    pub(crate) fn venue(name: &str) -> Arc<Venue> {
        Arc::new(Venue {
            name: name.into(),
            address: "1 Tap Rd".into(),
            phone: "555".into(),
            logo: None,
            logo_url: None,
            updated: "now".into(),
            url: format!("https://untappd.com/v/{}", name.to_lowercase()),
        })
    }

    #[test]
    fn key_strips_non_alphanumerics() {
        assert_eq!(style_key("IPA"), "ipa");
        assert_eq!(style_key("Pale Ale"), "paleale");
        assert_eq!(style_key("Belgian Strong Dark Ale / Quad"), "belgianstrongdarkalequad");
        assert_eq!(style_key("Märzen"), "märzen");
        assert_eq!(style_key(" - / "), "");
    }

    #[test]
    fn key_is_idempotent() {
        for s in ["IPA", "Pale Ale", "Sour - Fruited Gose", "Kölsch", "Brut IPA!!", "", "  ", "100% Wild_Ale", "İstanbul Lager"] {
            let k = style_key(s);
            assert_eq!(style_key(&k), k, "style {s:?}");
        }
    }

    #[test]
    fn grouping_is_a_partition() {
        let a = venue("A");
        let b = venue("B");
        let beers = vec![
            beer("One", "IPA", &a),
            beer("Two", "Stout", &a),
            beer("Three", "I.P.A.", &b),
            beer("Four", "Pale Ale", &b),
            beer("Five", "stout", &b),
        ];
        let groups = group_by_style(&beers);
        assert_eq!(groups.beer_count(), beers.len());
        for b in &beers {
            let hits = groups.iter().filter(|g| g.beers.iter().any(|x| x.name == b.name)).count();
            assert_eq!(hits, 1, "{} should be in exactly one group", b.name);
        }
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["ipa", "stout", "paleale"]);
    }

    #[test]
    fn first_seen_spelling_names_the_group() {
        let a = venue("A");
        let groups = group_by_style(&[beer("One", "I.P.A.", &a), beer("Two", "IPA", &a)]);
        let g = groups.get("ipa").unwrap();
        assert_eq!(g.style, "I.P.A.");
        assert_eq!(g.beers.len(), 2);
    }

    #[test]
    fn static_style_does_not_take_the_assets_dir() {
        let a = venue("A");
        let groups = group_by_style(&[beer("Hiss", "Static", &a), beer("Crackle", "static!", &a)]);
        assert!(groups.get(STATIC_SUBDIR).is_none());
        let g = groups.get(STATIC_STYLE_KEY).unwrap();
        assert_eq!(g.style, "Static");
        assert_eq!(g.beers.len(), 2);
    }

    #[test]
    fn styleless_beers_go_to_unknown() {
        let a = venue("A");
        let groups = group_by_style(&[beer("Mystery", "", &a)]);
        let g = groups.get(UNKNOWN_KEY).unwrap();
        assert_eq!(g.style, "Unknown");
    }
}
