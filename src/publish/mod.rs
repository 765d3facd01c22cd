use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::error::{TapError, TapResult};
use crate::site::write::{walk_err, STATIC_SUBDIR};
use crate::telemetry::{self};
use crate::telemetry::ops::publish::Phase as PublishPhase;

pub mod bucket;

use bucket::{Bucket, S3Bucket};

/// taplist publish: replace the bucket contents with an already built site
#[derive(Args)]
pub struct PublishCmd {
    #[arg(long, default_value_t = false)] pub apply: bool, // default is plan-only; use --apply to upload
}

/// One file scheduled for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Upload {
    pub key: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub content_type: &'static str,
}

#[derive(Serialize)]
struct PublishPlan {
    bucket: String,
    uploads: Vec<Upload>,
}

#[derive(Debug, Serialize)]
pub struct PublishReport {
    pub bucket: String,
    pub deleted: usize,
    pub uploaded: usize,
}

pub async fn run(cfg: &SiteConfig, args: PublishCmd) -> Result<()> {
    let log = telemetry::publish();
    let name = cfg.require_bucket()?;
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("bucket", name.to_string()),
        ("site_dir", cfg.output_dir.display().to_string()),
    ]).entered();

    if !args.apply {
        let uploads = collect_uploads(&cfg.output_dir, &cfg.static_dir)?;
        if telemetry::config::json_mode() {
            log.plan(&PublishPlan { bucket: name.to_string(), uploads })?;
        } else {
            log.info(format!("📝 Publish plan — bucket={} files={}", name, uploads.len()));
            log.info(format!("  ⚠️ every object in {} will be deleted first", name));
            for u in &uploads { log.info(format!("  {} ({})", u.key, u.content_type)); }
            log.info("   Use --apply to execute.");
        }
        return Ok(());
    }

    let target = S3Bucket::connect(name).await;
    let report = publish(&target, &cfg.output_dir, &cfg.static_dir).await?;
    log.result(&report)?;
    Ok(())
}

/// Empty `bucket`, then upload the site tree and the static assets.
pub async fn publish<B: Bucket>(bucket: &B, site_dir: &Path, static_dir: &Path) -> TapResult<PublishReport> {
    let log = telemetry::publish();
    let uploads = { let _s = log.span(&PublishPhase::Collect).entered(); collect_uploads(site_dir, static_dir)? };
    let deleted = clear_bucket(bucket).await?;

    for u in &uploads {
        let _s = log.span_kv(&PublishPhase::Upload, [("key", u.key.clone())]).entered();
        let body = fs::read(&u.path).map_err(|e| TapError::fs(&u.path, e))?;
        bucket.put(&u.key, body, u.content_type).await?;
        log.debug(format!("uploaded {}", u.key));
    }

    log.totals(deleted, uploads.len());
    Ok(PublishReport { bucket: bucket.name().to_string(), deleted, uploaded: uploads.len() })
}

/// Delete every object, following the listing cursor until it runs out.
pub async fn clear_bucket<B: Bucket>(bucket: &B) -> TapResult<usize> {
    let log = telemetry::publish();
    let _s = log.span_kv(&PublishPhase::ClearBucket, [("bucket", bucket.name().to_string())]).entered();

    let mut keys = Vec::new();
    let mut cursor = None;
    loop {
        let page = bucket.list_keys(cursor).await?;
        keys.extend(page.keys);
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    for key in &keys { bucket.delete(key).await?; }
    Ok(keys.len())
}

/// Every file under `site_dir` keyed by its relative path, then every file
/// directly inside `static_dir` keyed `static/<name>`. A key already taken by
/// the site tree is not scheduled twice.
pub fn collect_uploads(site_dir: &Path, static_dir: &Path) -> TapResult<Vec<Upload>> {
    let mut uploads = Vec::new();
    let mut seen = HashSet::new();

    for entry in WalkDir::new(site_dir).sort_by_file_name() {
        let entry = entry.map_err(walk_err)?;
        if !entry.file_type().is_file() { continue; }
        let rel = entry.path().strip_prefix(site_dir).unwrap_or(entry.path());
        let key = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");
        seen.insert(key.clone());
        uploads.push(Upload { key, path: entry.path().to_path_buf(), content_type: content_type_for(entry.path()) });
    }

    if static_dir.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(static_dir)
            .map_err(|e| TapError::fs(static_dir, e))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        for path in files {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else { continue };
            let key = format!("{STATIC_SUBDIR}/{name}");
            if !seen.insert(key.clone()) { continue; }
            let content_type = content_type_for(&path);
            uploads.push(Upload { key, path, content_type });
        }
    }

    Ok(uploads)
}

pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase()).unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "jpg" | "jpeg" => "image/jpeg",
        "js" => "text/javascript",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucket::KeyPage;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// In-memory bucket that lists keys `page` at a time.
    struct MemBucket {
        page: usize,
        objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
        list_calls: Mutex<usize>,
    }

    impl MemBucket {
        fn with_keys(page: usize, keys: &[&str]) -> Self {
            let objects = keys.iter().map(|k| (k.to_string(), (b"old".to_vec(), "text/plain".to_string()))).collect();
            Self { page, objects: Mutex::new(objects), list_calls: Mutex::new(0) }
        }

        fn keys(&self) -> Vec<String> { self.objects.lock().unwrap().keys().cloned().collect() }
    }

    impl Bucket for MemBucket {
        fn name(&self) -> &str { "mem" }

        async fn list_keys(&self, continuation: Option<String>) -> TapResult<KeyPage> {
            *self.list_calls.lock().unwrap() += 1;
            let start: usize = continuation.map(|c| c.parse().unwrap()).unwrap_or(0);
            let all = self.keys();
            let end = (start + self.page).min(all.len());
            let next = if end < all.len() { Some(end.to_string()) } else { None };
            Ok(KeyPage { keys: all[start..end].to_vec(), next })
        }

        async fn delete(&self, key: &str) -> TapResult<()> {
            self.objects.lock().unwrap().remove(key);
            Ok(())
        }

        async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> TapResult<()> {
            if key.contains("fail") { return Err(TapError::publish(key, "denied")); }
            self.objects.lock().unwrap().insert(key.to_string(), (body, content_type.to_string()));
            Ok(())
        }
    }

    fn site_fixture(root: &Path) -> (PathBuf, PathBuf) {
        let site = root.join("site");
        let stat = root.join("static");
        fs::create_dir_all(site.join("ipa")).unwrap();
        fs::create_dir_all(stat.join("nested")).unwrap();
        fs::write(site.join("index.html"), "<h1>home</h1>").unwrap();
        fs::write(site.join("ipa/index.html"), "<h1>ipa</h1>").unwrap();
        fs::write(stat.join("style.css"), "body{}").unwrap();
        fs::write(stat.join("old-ox.png"), "png").unwrap();
        fs::write(stat.join("nested/skip.txt"), "no").unwrap();
        (site, stat)
    }

    #[tokio::test]
    async fn clearing_walks_every_page() {
        let b = MemBucket::with_keys(2, &["a", "b", "c", "d", "e"]);
        let deleted = clear_bucket(&b).await.unwrap();
        assert_eq!(deleted, 5);
        assert!(b.keys().is_empty());
        assert_eq!(*b.list_calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn clearing_an_empty_bucket() {
        let b = MemBucket::with_keys(2, &[]);
        assert_eq!(clear_bucket(&b).await.unwrap(), 0);
    }

    #[test]
    fn uploads_use_slash_keys_and_static_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let (site, stat) = site_fixture(tmp.path());
        let keys: Vec<String> = collect_uploads(&site, &stat).unwrap().into_iter().map(|u| u.key).collect();
        assert_eq!(keys, vec!["index.html", "ipa/index.html", "static/old-ox.png", "static/style.css"]);
    }

    #[test]
    fn copied_static_files_are_not_uploaded_twice() {
        let tmp = tempfile::tempdir().unwrap();
        let (site, stat) = site_fixture(tmp.path());
        fs::create_dir_all(site.join("static")).unwrap();
        fs::write(site.join("static/style.css"), "body{}").unwrap();
        let uploads = collect_uploads(&site, &stat).unwrap();
        assert_eq!(uploads.iter().filter(|u| u.key == "static/style.css").count(), 1);
        assert_eq!(uploads.len(), 4);
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for(Path::new("ipa/index.html")), "text/html");
        assert_eq!(content_type_for(Path::new("style.css")), "text/css");
        assert_eq!(content_type_for(Path::new("logo.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("icon.svg")), "image/svg+xml");
        assert_eq!(content_type_for(Path::new("favicon.ico")), "image/x-icon");
        assert_eq!(content_type_for(Path::new("logo.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("README")), "application/octet-stream");
    }

    #[tokio::test]
    async fn publish_replaces_bucket_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let (site, stat) = site_fixture(tmp.path());
        let b = MemBucket::with_keys(2, &["stale/index.html", "porter/index.html", "index.html"]);

        let report = publish(&b, &site, &stat).await.unwrap();
        assert_eq!(report.deleted, 3);
        assert_eq!(report.uploaded, 4);
        assert_eq!(b.keys(), vec!["index.html", "ipa/index.html", "static/old-ox.png", "static/style.css"]);

        let objects = b.objects.lock().unwrap();
        assert_eq!(objects["ipa/index.html"], (b"<h1>ipa</h1>".to_vec(), "text/html".to_string()));
        assert_eq!(objects["static/old-ox.png"].1, "image/png");
    }

    #[tokio::test]
    async fn upload_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let (site, stat) = site_fixture(tmp.path());
        fs::write(stat.join("fail.css"), "x").unwrap();
        let b = MemBucket::with_keys(2, &[]);
        let err = publish(&b, &site, &stat).await.unwrap_err();
        assert!(matches!(err, TapError::Publish { .. }));
    }
}
