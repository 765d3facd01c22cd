// Text cleanup for individual tap-list fields.

use url::Url;

const MAP_ARTIFACT: &str = "( Map )";
const DETAIL_SEPARATOR: char = '•';

pub fn clean_address(raw: &str) -> String {
    raw.replace(MAP_ARTIFACT, "").trim().to_string()
}

/// "IPA - Double" -> ("IPA", Some("Double")); "Stout" -> ("Stout", None)
pub fn split_style(raw: &str) -> (String, Option<String>) {
    let mut parts = raw.split('-');
    let style = parts.next().unwrap_or_default().trim().to_string();
    let substyle = parts.next().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
    (style, substyle)
}

/// "5.2 ABV  •  34 IBU" -> ("5.2", "34"). None when there is no second segment.
pub fn split_details(raw: &str) -> Option<(String, String)> {
    let mut parts = raw.split(DETAIL_SEPARATOR);
    let abv = parts.next()?;
    let ibu = parts.next()?;
    Some((strip_unit(abv, "ABV"), strip_unit(ibu, "IBU")))
}

fn strip_unit(segment: &str, unit: &str) -> String {
    let s = segment.trim();
    s.strip_suffix(unit).unwrap_or(s).trim().to_string()
}

/// Last non-empty path segment of the logo URL.
pub fn logo_file_name(logo_url: &str) -> Option<String> {
    if let Ok(u) = Url::parse(logo_url) {
        return u.path_segments()?.filter(|s| !s.is_empty()).last().map(str::to_string);
    }
    logo_url.split(['?', '#']).next()?.rsplit('/').find(|s| !s.is_empty()).map(str::to_string)
}
