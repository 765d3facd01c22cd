use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Scrape;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Venue, FetchPage, Extract, FetchLogo }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Venue => "venue",
        Phase::FetchPage => "fetch_page",
        Phase::Extract => "extract",
        Phase::FetchLogo => "fetch_logo",
    }}
    fn span(&self) -> Span { match self {
        Phase::Venue => info_span!("venue"),
        Phase::FetchPage => info_span!("fetch_page"),
        Phase::Extract => info_span!("extract"),
        Phase::FetchLogo => info_span!("fetch_logo"),
    }}
}

impl OpMarker for Scrape {
    const NAME: &'static str = "scrape";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("scrape") }
}
