use std::sync::Arc;

use serde::Serialize;

/// A taproom whose tap list is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Venue {
    pub name: String,
    pub address: String,
    pub phone: String,
    /// File name of the downloaded logo inside the static dir; `None` when not on disk.
    pub logo: Option<String>,
    #[serde(skip)]
    pub logo_url: Option<String>,
    pub updated: String,
    pub url: String,
}

/// One tap-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Beer {
    pub name: String,
    pub style: String,
    pub substyle: Option<String>,
    pub abv: String,
    pub ibu: String,
    pub url: String,
    pub venue: Arc<Venue>,
}
