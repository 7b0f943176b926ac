// src/cache/mod.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::{fs, path::PathBuf};
use tracing::{debug, info};

/// Raw rate card bodies kept on disk, one file per currency and region.
#[derive(Debug, Clone)]
pub struct RateCardCache {
    dir: PathBuf,
}

/// A cached body together with the time it was written.
#[derive(Debug, Clone)]
pub struct CachedRateCard {
    pub body: String,
    pub saved_at: DateTime<Utc>,
}

impl CachedRateCard {
    pub fn age(&self) -> Duration {
        Utc::now() - self.saved_at
    }

    pub fn is_older_than(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }
}

fn file_stem_part(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

impl RateCardCache {
    /// Open (and create if needed) the cache directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// `<dir>/<currency>-<region>.txt`
    pub fn path_for(&self, currency: &str, region: &str) -> PathBuf {
        self.dir.join(format!(
            "{}-{}.txt",
            file_stem_part(currency),
            file_stem_part(region)
        ))
    }

    pub fn save(&self, currency: &str, region: &str, body: &str) -> Result<PathBuf> {
        let path = self.path_for(currency, region);
        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), bytes = body.len(), "cached rate card");
        Ok(path)
    }

    /// `None` when nothing has been cached for this pair yet.
    pub fn load(&self, currency: &str, region: &str) -> Result<Option<CachedRateCard>> {
        let path = self.path_for(currency, region);
        if !path.is_file() {
            debug!(path = %path.display(), "no cached rate card");
            return Ok(None);
        }
        let body =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .with_context(|| format!("reading mtime of {}", path.display()))?;
        let cached = CachedRateCard {
            body,
            saved_at: DateTime::<Utc>::from(modified),
        };
        info!(
            path = %path.display(),
            age_hours = cached.age().num_hours(),
            "loaded cached rate card"
        );
        Ok(Some(cached))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let cache = RateCardCache::new(dir.path().join("ratecards"))?;
        assert!(cache.load("USD", "US West")?.is_none());

        let path = cache.save("USD", "US West", r#"{"Meters":[]}"#)?;
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("USD-US_West.txt"));

        let cached = cache.load("USD", "US West")?.expect("cached body");
        assert_eq!(cached.body, r#"{"Meters":[]}"#);
        assert!(!cached.is_older_than(Duration::hours(1)));
        assert!(cache.load("EUR", "US West")?.is_none());
        Ok(())
    }
}
