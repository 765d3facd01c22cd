use serde::Serialize;

// Plan envelope types
#[derive(Serialize)]
pub struct ScrapePlan { pub venues: Vec<String>, pub static_dir: String, pub tracker_base: String }

// Apply/result envelope types
#[derive(Serialize)]
pub struct VenueSummary { pub name: String, pub url: String, pub beers: usize, pub logo: Option<String> }

#[derive(Serialize)]
pub struct ScrapeResult { pub venues: Vec<VenueSummary>, pub beers: usize, pub styles: Vec<String> }
