//! Release check against the GitHub releases API
//!
//! Runs once on a background thread and reports an [`UpdateStatus`] over a
//! channel. Any failure degrades to `Failed`; nothing here can block the UI.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::cmp::Ordering;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

use crate::constants::{app, update};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    Available { latest: String, url: String },
    Failed(String),
}

/// Numeric dotted version, compared component-wise with missing parts as 0
#[derive(Debug, Clone)]
pub struct Version(Vec<u64>);

impl Version {
    /// Parse `v1.2.3` / `V1.2` / `1.2.3`; anything unparsable is version 0
    pub fn parse(tag: &str) -> Self {
        let cleaned = tag.trim().trim_start_matches(['v', 'V']).trim();
        let parts: Option<Vec<u64>> = cleaned.split('.').map(|p| p.trim().parse().ok()).collect();
        Self(parts.unwrap_or_else(|| vec![0]))
    }

    fn component(&self, i: usize) -> u64 {
        self.0.get(i).copied().unwrap_or(0)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

/// The fields we use from `releases/latest`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub html_url: String,
}

/// Compare a release against the running version
pub fn interpret(release: &Release, current: &str) -> UpdateStatus {
    let latest = Version::parse(&release.tag_name);
    let running = Version::parse(current);

    if latest > running {
        let latest_tag = release.tag_name.trim().trim_start_matches(['v', 'V']).to_string();
        info!(current, latest = %latest_tag, "Update available");
        UpdateStatus::Available { latest: latest_tag, url: release.html_url.clone() }
    } else {
        info!(current, remote = %release.tag_name, "Up to date");
        UpdateStatus::UpToDate
    }
}

fn fetch_latest() -> Result<Release> {
    let client = Client::builder()
        .timeout(Duration::from_secs(update::TIMEOUT_SECS))
        .user_agent(update::USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;

    let release = client
        .get(update::RELEASES_URL)
        .header(ACCEPT, update::ACCEPT)
        .send()
        .context("Release request failed")?
        .error_for_status()
        .context("Release endpoint returned an error")?
        .json::<Release>()
        .context("Failed to parse release response")?;
    Ok(release)
}

/// Check for a newer release in the background
///
/// `wake` is called once the result has been sent.
pub fn spawn_check<F>(sender: Sender<UpdateStatus>, wake: F) -> thread::JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    thread::spawn(move || {
        info!(url = update::RELEASES_URL, "Checking for updates");
        let status = match fetch_latest() {
            Ok(release) => interpret(&release, app::VERSION),
            Err(e) => {
                error!(error = %format!("{:#}", e), "Update check failed");
                UpdateStatus::Failed(format!("{:#}", e))
            }
        };
        // Receiver gone means the app is closing
        if sender.send(status).is_ok() {
            wake();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str) -> Release {
        Release { tag_name: tag.to_string(), html_url: "https://example.invalid/r".to_string() }
    }

    #[test]
    fn test_version_parse_strips_prefix() {
        assert_eq!(Version::parse("v1.2.3"), Version::parse("1.2.3"));
        assert_eq!(Version::parse("V2.0"), Version::parse("2.0.0"));
        assert_eq!(Version::parse(" v1.4 "), Version::parse("1.4"));
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::parse("1.2.10") > Version::parse("1.2.9"));
        assert!(Version::parse("1.3") > Version::parse("1.2.99"));
        assert!(Version::parse("2") > Version::parse("1.9.9"));
        assert_eq!(Version::parse("1.2"), Version::parse("1.2.0"));
        assert!(Version::parse("1.2.0.1") > Version::parse("1.2"));
    }

    #[test]
    fn test_unparsable_tag_is_zero() {
        assert_eq!(Version::parse("nightly"), Version::parse("0"));
        assert_eq!(Version::parse(""), Version::parse("0"));
        assert!(Version::parse("1.2-beta") < Version::parse("0.0.1"));
    }

    #[test]
    fn test_interpret_newer_release() {
        assert_eq!(
            interpret(&release("v1.3.0"), "1.2.3"),
            UpdateStatus::Available {
                latest: "1.3.0".to_string(),
                url: "https://example.invalid/r".to_string()
            }
        );
    }

    #[test]
    fn test_interpret_same_or_older_release() {
        assert_eq!(interpret(&release("V1.2.3"), "1.2.3"), UpdateStatus::UpToDate);
        assert_eq!(interpret(&release("v1.0"), "1.2.3"), UpdateStatus::UpToDate);
        assert_eq!(interpret(&release("garbage"), "1.2.3"), UpdateStatus::UpToDate);
    }

    #[test]
    fn test_release_json_missing_fields() {
        let parsed: Release = serde_json::from_str(r#"{ "name": "SlickClick" }"#).unwrap();
        assert_eq!(parsed.tag_name, "");
        assert_eq!(interpret(&parsed, "1.0.0"), UpdateStatus::UpToDate);

        let parsed: Release = serde_json::from_str(
            r#"{ "tag_name": "v9.0.0", "html_url": "https://github.com/x/y/releases/tag/v9.0.0", "draft": false }"#,
        )
        .unwrap();
        assert!(matches!(interpret(&parsed, "1.0.0"), UpdateStatus::Available { .. }));
    }
}
