use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::error::TapResult;
use crate::ingestion::{self, fetch::{Fetch, HttpFetcher}};
use crate::model::{Beer, Venue};
use crate::publish;
use crate::telemetry::{self};
use crate::telemetry::ops::build::Phase as BuildPhase;

pub mod group;
pub mod render;
pub mod write;

use group::group_by_style;
use render::SiteRenderer;

/// taplist build: full rebuild of the site, optionally published
#[derive(Args)]
pub struct BuildCmd {
    #[arg(long, default_value_t = false)] pub apply: bool, // default is plan-only; use --apply to execute
    #[arg(long, default_value_t = false)] pub publish: bool, // upload the rebuilt site to the bucket
    #[arg(long, default_value_t = false)] pub copy_static: bool, // mirror the static dir into <output>/static
}

#[derive(Serialize)]
pub struct BuildPlan {
    pub venues: Vec<String>,
    pub output_dir: String,
    pub templates_dir: String,
    pub copy_static: bool,
    pub publish: Option<String>,
}

/// What one rebuild wrote.
#[derive(Debug, Serialize)]
pub struct SiteReport {
    pub venues: usize,
    pub beers: usize,
    pub styles: Vec<String>,
    pub pages: usize,
    pub skipped_deletes: usize,
    pub static_files: usize,
}

pub async fn run(cfg: &SiteConfig, args: BuildCmd) -> Result<()> {
    let log = telemetry::build();
    let copy_static = args.copy_static || cfg.copy_static_assets;
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("publish", args.publish.to_string()),
        ("copy_static", copy_static.to_string()),
        ("output_dir", cfg.output_dir.display().to_string()),
    ]).entered();

    let bucket = if args.publish { Some(cfg.require_bucket()?.to_string()) } else { None };

    if !args.apply {
        if telemetry::config::json_mode() {
            let plan = BuildPlan {
                venues: cfg.venues.clone(),
                output_dir: cfg.output_dir.display().to_string(),
                templates_dir: cfg.templates_dir.display().to_string(),
                copy_static,
                publish: bucket,
            };
            log.plan(&plan)?;
        } else {
            log.info(format!("📝 Build plan — venues={} output_dir={} templates_dir={}", cfg.venues.len(), cfg.output_dir.display(), cfg.templates_dir.display()));
            log.info(format!("  copy_static={} publish={}", copy_static, bucket.as_deref().unwrap_or("no")));
            log.info(format!("  ⚠️ {} will be emptied before writing", cfg.output_dir.display()));
            log.info("   Use --apply to execute.");
        }
        return Ok(());
    }

    // templates first so a bad template dir fails before any network traffic
    let renderer = SiteRenderer::from_dir(&cfg.templates_dir).context("loading templates")?;
    let fetcher = HttpFetcher::new()?;
    let report = rebuild(&fetcher, &renderer, cfg, copy_static).await?;

    let published = match bucket {
        Some(name) => {
            let target = publish::bucket::S3Bucket::connect(&name).await;
            Some(publish::publish(&target, &cfg.output_dir, &cfg.static_dir).await?)
        }
        None => None,
    };

    #[derive(Serialize)]
    struct BuildResult { site: SiteReport, publish: Option<publish::PublishReport> }
    log.result(&BuildResult { site: report, publish: published })?;
    Ok(())
}

/// Fetch, extract, group, render and write. The output dir is emptied first.
pub async fn rebuild<F: Fetch>(fetcher: &F, renderer: &SiteRenderer, cfg: &SiteConfig, copy_static: bool) -> TapResult<SiteReport> {
    let harvest = ingestion::collect_taps(fetcher, cfg).await?;
    let mut report = build_site(renderer, &harvest.beers, &harvest.venues, &cfg.output_dir)?;
    if copy_static {
        let log = telemetry::build();
        let _s = log.span(&BuildPhase::CopyStatic).entered();
        report.static_files = write::copy_static_assets(&cfg.static_dir, &cfg.output_dir)?;
    }
    Ok(report)
}

/// Group `beers` by style and write the home page plus one page per style under `out_dir`.
pub fn build_site(renderer: &SiteRenderer, beers: &[Beer], venues: &[Arc<Venue>], out_dir: &Path) -> TapResult<SiteReport> {
    let log = telemetry::build();

    let groups = { let _s = log.span(&BuildPhase::Group).entered(); group_by_style(beers) };
    if groups.is_empty() { log.warn("⚠️ no beers found; only the home page will be written"); }
    let skipped_deletes = { let _s = log.span(&BuildPhase::Clear).entered(); write::clear_output_dir(out_dir)? };

    let mut pages = 0usize;
    for g in &groups {
        let html = { let _s = log.span_kv(&BuildPhase::Render, [("key", g.key.clone())]).entered(); renderer.render_type_page(g)? };
        let _s = log.span(&BuildPhase::Write).entered();
        write::write_page(&out_dir.join(&g.key), &html)?;
        pages += 1;
    }

    let home = { let _s = log.span(&BuildPhase::Render).entered(); renderer.render_index(&groups, venues)? };
    { let _s = log.span(&BuildPhase::Write).entered(); write::write_page(out_dir, &home)?; }
    pages += 1;

    log.site_summary(groups.len(), pages, groups.beer_count());
    Ok(SiteReport {
        venues: venues.len(),
        beers: groups.beer_count(),
        styles: groups.iter().map(|g| g.key.clone()).collect(),
        pages,
        skipped_deletes,
        static_files: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::tests::two_venue_setup;
    use crate::site::render::tests::{INDEX, TYPE_PAGE};
    use std::fs;

    fn read_tree(dir: &Path) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(dir).unwrap().to_string_lossy().into_owned();
                (rel, fs::read_to_string(e.path()).unwrap())
            })
            .collect();
        out.sort();
        out
    }

    #[tokio::test]
    async fn two_venues_two_styles() {
        let tmp = tempfile::tempdir().unwrap();
        let (fetcher, mut cfg) = two_venue_setup(&tmp.path().join("static"));
        cfg.output_dir = tmp.path().join("site");
        let renderer = SiteRenderer::from_raw(INDEX, TYPE_PAGE).unwrap();

        let report = rebuild(&fetcher, &renderer, &cfg, false).await.unwrap();
        assert_eq!(report.styles, vec!["ipa", "stout"]);
        assert_eq!(report.pages, 3);

        let mut dirs: Vec<String> = fs::read_dir(&cfg.output_dir).unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        dirs.sort();
        assert_eq!(dirs, vec!["ipa", "stout"]);

        let home = fs::read_to_string(cfg.output_dir.join("index.html")).unwrap();
        assert!(home.contains("ipa/"));
        assert!(home.contains("stout/"));
        let stout = fs::read_to_string(cfg.output_dir.join("stout/index.html")).unwrap();
        assert!(stout.contains("Night Ox @ Venue B"));
    }

    #[tokio::test]
    async fn rebuild_is_byte_identical() {
        let tmp = tempfile::tempdir().unwrap();
        let (fetcher, mut cfg) = two_venue_setup(&tmp.path().join("static"));
        cfg.output_dir = tmp.path().join("site");
        let renderer = SiteRenderer::from_raw(INDEX, TYPE_PAGE).unwrap();

        rebuild(&fetcher, &renderer, &cfg, false).await.unwrap();
        let first = read_tree(&cfg.output_dir);
        rebuild(&fetcher, &renderer, &cfg, false).await.unwrap();
        let second = read_tree(&cfg.output_dir);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn stale_style_dirs_are_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let (fetcher, mut cfg) = two_venue_setup(&tmp.path().join("static"));
        cfg.output_dir = tmp.path().join("site");
        fs::create_dir_all(cfg.output_dir.join("porter")).unwrap();
        fs::write(cfg.output_dir.join("porter/index.html"), "gone").unwrap();
        let renderer = SiteRenderer::from_raw(INDEX, TYPE_PAGE).unwrap();

        rebuild(&fetcher, &renderer, &cfg, false).await.unwrap();
        assert!(!cfg.output_dir.join("porter").exists());
    }

    #[tokio::test]
    async fn copy_static_lands_under_site() {
        let tmp = tempfile::tempdir().unwrap();
        let static_dir = tmp.path().join("static");
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("style.css"), "body{}").unwrap();
        let (fetcher, mut cfg) = two_venue_setup(&static_dir);
        cfg.output_dir = tmp.path().join("site");
        let renderer = SiteRenderer::from_raw(INDEX, TYPE_PAGE).unwrap();

        let report = rebuild(&fetcher, &renderer, &cfg, true).await.unwrap();
        assert_eq!(report.static_files, 1);
        assert!(cfg.output_dir.join("static/style.css").is_file());
    }

    #[test]
    fn static_style_page_stays_out_of_copied_assets() {
        let tmp = tempfile::tempdir().unwrap();
        let renderer = SiteRenderer::from_raw(INDEX, TYPE_PAGE).unwrap();
        let a = group::tests::venue("Old Ox");
        let beers = vec![group::tests::beer("Hiss", "Static", &a)];
        let report = build_site(&renderer, &beers, &[a], tmp.path()).unwrap();
        assert_eq!(report.styles, vec![group::STATIC_STYLE_KEY]);
        assert!(tmp.path().join("static-style/index.html").is_file());
        assert!(!tmp.path().join(write::STATIC_SUBDIR).exists());
    }

    #[test]
    fn empty_tap_lists_still_write_home_page() {
        let tmp = tempfile::tempdir().unwrap();
        let renderer = SiteRenderer::from_raw(INDEX, TYPE_PAGE).unwrap();
        let report = build_site(&renderer, &[], &[group::tests::venue("Old Ox")], tmp.path()).unwrap();
        assert_eq!(report.pages, 1);
        assert!(tmp.path().join("index.html").is_file());
    }

    #[test]
    fn shipped_templates_render_a_site() {
        let tmp = tempfile::tempdir().unwrap();
        let renderer = SiteRenderer::from_dir(&Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")).unwrap();
        let a = group::tests::venue("Old Ox");
        let beers = vec![group::tests::beer("Alpha Ox", "IPA", &a), group::tests::beer("Black Ox", "Stout", &a)];
        let report = build_site(&renderer, &beers, &[a], tmp.path()).unwrap();
        assert_eq!(report.pages, 3);
        let home = fs::read_to_string(tmp.path().join("index.html")).unwrap();
        assert!(home.contains("href=\"ipa/\""));
        assert!(home.contains("href=\"stout/\""));
        let ipa = fs::read_to_string(tmp.path().join("ipa/index.html")).unwrap();
        assert!(ipa.contains("Alpha Ox"));
        assert!(ipa.contains("Old Ox"));
    }
}
