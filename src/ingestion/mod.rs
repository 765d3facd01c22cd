use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use crate::config::SiteConfig;
use crate::error::TapResult;
use crate::model::{Beer, Venue};
use crate::site::group::group_by_style;
use crate::telemetry::{self};
use crate::telemetry::ops::scrape::Phase as ScrapePhase;

pub mod extractor;
pub mod fetch;
mod types;

use extractor::TapPage;
use fetch::{Binary, Fetch, HttpFetcher};

/// taplist scrape: fetch and extract every venue without building the site
#[derive(Args)]
pub struct ScrapeCmd {
    #[arg(long, default_value_t = false)] pub apply: bool, // default is plan-only; use --apply to fetch
}

/// Everything one pass over the venue list produced.
pub struct Harvest {
    pub venues: Vec<Arc<Venue>>,
    pub beers: Vec<Beer>,
}

pub async fn run(cfg: &SiteConfig, args: ScrapeCmd) -> Result<()> {
    let log = telemetry::scrape();
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("venues", cfg.venues.len().to_string()),
    ]).entered();

    if !args.apply {
        if telemetry::config::json_mode() {
            use types::ScrapePlan;
            let plan = ScrapePlan {
                venues: cfg.venues.clone(),
                static_dir: cfg.static_dir.display().to_string(),
                tracker_base: cfg.tracker_base.clone(),
            };
            log.plan(&plan)?;
        } else {
            log.info(format!("📝 Scrape plan — venues={} static_dir={}", cfg.venues.len(), cfg.static_dir.display()));
            for v in &cfg.venues { log.info(format!("  {}", v)); }
            log.info("   Use --apply to execute.");
        }
        return Ok(());
    }

    let fetcher = HttpFetcher::new()?;
    let harvest = collect_taps(&fetcher, cfg).await?;

    // text mode prints the same summary through the text presenter
    use types::{ScrapeResult, VenueSummary};
    let venues = harvest.venues.iter().map(|v| VenueSummary {
        name: v.name.clone(),
        url: v.url.clone(),
        beers: harvest.beers.iter().filter(|b| Arc::ptr_eq(&b.venue, v)).count(),
        logo: v.logo.clone(),
    }).collect();
    let styles = group_by_style(&harvest.beers).iter().map(|g| g.style.clone()).collect();
    log.result(&ScrapeResult { venues, beers: harvest.beers.len(), styles })?;
    Ok(())
}

/// Fetch each configured venue in order, download its logo, and extract its tap list.
///
/// A logo that does not download leaves the venue without a logo file name so
/// pages never point at a missing image. Any other failure aborts the run.
pub async fn collect_taps<F: Fetch>(fetcher: &F, cfg: &SiteConfig) -> TapResult<Harvest> {
    let log = telemetry::scrape();
    let mut venues = Vec::with_capacity(cfg.venues.len());
    let mut beers = Vec::new();

    for url in &cfg.venues {
        let _v = log.span_kv(&ScrapePhase::Venue, [("url", url.clone())]).entered();

        let markup = { let _s = log.span(&ScrapePhase::FetchPage).entered(); fetcher.fetch(url).await? };
        let page = TapPage::parse(&markup, url);
        let mut venue = { let _s = log.span(&ScrapePhase::Extract).entered(); page.venue()? };

        if let (Some(logo_url), Some(file)) = (venue.logo_url.clone(), venue.logo.clone()) {
            let _s = log.span_kv(&ScrapePhase::FetchLogo, [("url", logo_url.clone())]).entered();
            match fetcher.fetch_binary(&logo_url).await? {
                Binary::Found(bytes) => {
                    let path = fetch::save_logo(&cfg.static_dir, &file, &bytes)?;
                    log.debug(format!("logo saved to {}", path.display()));
                }
                Binary::NotFound(status) => {
                    log.warn_kv("⚠️ logo not downloaded", [("venue", venue.name.clone()), ("status", status.to_string())]);
                    venue.logo = None;
                }
            }
        }

        let venue = Arc::new(venue);
        let found = { let _s = log.span(&ScrapePhase::Extract).entered(); page.beers(&venue, &cfg.tracker_base)? };
        log.venue_summary(&venue.name, found.len(), venue.logo.is_some());
        beers.extend(found);
        venues.push(venue);
    }

    log.totals(venues.len(), beers.len());
    Ok(Harvest { venues, beers })
}
