//! Run configuration: CLI flag, then environment (`.env` is loaded first), then default.

use std::env;
use std::path::PathBuf;

use clap::Args;
use url::Url;

use crate::error::{TapError, TapResult};

pub const DEFAULT_VENUES: &[&str] = &[
    "https://untappd.com/v/old-ox-brewery/1575236",
    "https://untappd.com/v/ocelot-brewing-company/1879890",
    "https://untappd.com/v/vanish-brewery/4152486",
    "https://untappd.com/v/adroit-theory-brewing-company/548535",
    "https://untappd.com/v/crooked-run-brewing/886724",
    "https://untappd.com/v/quattro-goombas-virginia-craft-brewery/2648732",
];
pub const DEFAULT_TRACKER_BASE: &str = "https://untappd.com";
pub const DEFAULT_OUTPUT_DIR: &str = "site";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Venue page URL to collect; repeat to list several (replaces the built-in list)
    #[arg(global = true, long = "venue")] pub venues: Vec<String>,
    #[arg(global = true, long)] pub output_dir: Option<PathBuf>, // generated site root
    #[arg(global = true, long)] pub static_dir: Option<PathBuf>, // logos, stylesheet, icon
    #[arg(global = true, long)] pub templates_dir: Option<PathBuf>, // index.html + type_page.html
    #[arg(global = true, long)] pub tracker_base: Option<String>, // prefix for relative beer links
    #[arg(global = true, long)] pub bucket: Option<String>, // publish target
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub venues: Vec<String>,
    pub output_dir: PathBuf,
    pub static_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub tracker_base: String,
    pub bucket: Option<String>,
    pub copy_static_assets: bool,
}

impl SiteConfig {
    pub fn from_env(args: &ConfigArgs) -> TapResult<Self> {
        Self::resolve(args, |k| env::var(k).ok())
    }

    pub fn resolve<F>(args: &ConfigArgs, var: F) -> TapResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| var(k).filter(|v| !v.trim().is_empty());

        let venues = if !args.venues.is_empty() {
            args.venues.clone()
        } else if let Some(list) = var("TAPLIST_VENUES") {
            list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
        } else {
            DEFAULT_VENUES.iter().map(|s| s.to_string()).collect()
        };

        let path = |flag: &Option<PathBuf>, key: &str, default: &str| {
            flag.clone().or_else(|| var(key).map(PathBuf::from)).unwrap_or_else(|| PathBuf::from(default))
        };

        let cfg = SiteConfig {
            venues,
            output_dir: path(&args.output_dir, "TAPLIST_OUTPUT_DIR", DEFAULT_OUTPUT_DIR),
            static_dir: path(&args.static_dir, "TAPLIST_STATIC_DIR", DEFAULT_STATIC_DIR),
            templates_dir: path(&args.templates_dir, "TAPLIST_TEMPLATES_DIR", DEFAULT_TEMPLATES_DIR),
            tracker_base: args.tracker_base.clone().or_else(|| var("TAPLIST_TRACKER_BASE")).unwrap_or_else(|| DEFAULT_TRACKER_BASE.to_string()),
            bucket: args.bucket.clone().or_else(|| var("TAPLIST_BUCKET")),
            copy_static_assets: var("TAPLIST_COPY_STATIC").is_some_and(|v| truthy(&v)),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> TapResult<()> {
        if self.venues.is_empty() {
            return Err(TapError::Config("no venues configured".into()));
        }
        for v in self.venues.iter().chain(std::iter::once(&self.tracker_base)) {
            match Url::parse(v) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => {}
                _ => return Err(TapError::Config(format!("not an http(s) url: {v}"))),
            }
        }
        Ok(())
    }

    pub fn require_bucket(&self) -> TapResult<&str> {
        self.bucket.as_deref().ok_or_else(|| TapError::Config("no bucket configured (use --bucket or TAPLIST_BUCKET)".into()))
    }
}

fn truthy(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
