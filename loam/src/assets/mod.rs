//! Cache-busting asset fingerprints
//!
//! The frontend build writes fingerprint files (`css.txt`, `js.txt`) next
//! to the bundled assets; pages append the fingerprint to asset URLs so a
//! new build busts client caches. The manifest is read once at startup.

use std::fs;
use std::path::Path;

/// Fingerprints for the bundled stylesheet and script
#[derive(Debug, Clone, Default)]
pub struct AssetManifest {
    /// CSS bundle fingerprint
    pub css: String,
    /// JS bundle fingerprint
    pub js: String,
}

impl AssetManifest {
    /// Read the fingerprint files from a manifest directory. A missing or
    /// unreadable file degrades to an empty fingerprint with a warning.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        Self {
            css: read_fingerprint(&dir.join("css.txt")),
            js: read_fingerprint(&dir.join("js.txt")),
        }
    }
}

fn read_fingerprint(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(contents) => contents.trim().to_string(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "asset fingerprint unavailable");
            String::new()
        }
    }
}
