//! Java version banner parsing and the [`VersionQuery`] seam.
//!
//! `java -version` prints its banner on stderr in a handful of vendor
//! dialects:
//!
//! ```text
//! openjdk version "21.0.2" 2024-01-16 LTS
//! java version "1.8.0_381"
//! openjdk 17.0.9 2023-10-17            (java --version)
//! ```
//!
//! Parsing is a pure function so it can be tested without a JDK.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JavaVersion {
    /// Feature release number (8, 11, 17, 21, ...)
    pub major: u32,
    /// Full version string as reported, e.g. `1.8.0_381`
    pub raw: String,
}

fn banner_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)(?:version\s+"|^\s*(?:openjdk|java)\s+)(\d+(?:[._]\d+)*)"#)
            .expect("version banner regex is valid")
    })
}

/// Extracts the version from a `java -version` banner.
///
/// The legacy `1.x` scheme is folded so that `1.8.0_381` reports major 8.
pub fn parse_version_banner(banner: &str) -> Option<JavaVersion> {
    let raw = banner_regex().captures(banner)?.get(1)?.as_str();

    let mut parts = raw.split(['.', '_']);
    let first: u32 = parts.next()?.parse().ok()?;
    let major = match (first, parts.next()) {
        (1, Some(legacy)) => legacy.parse().ok()?,
        _ => first,
    };

    Some(JavaVersion {
        major,
        raw: raw.to_string(),
    })
}

/// Asks a Java runtime which version it is.
#[async_trait]
pub trait VersionQuery: Send + Sync {
    async fn query(&self, java: &Path) -> Result<JavaVersion>;
}

/// Runs `<java> -version` and parses the banner.
pub struct JavaVersionQuery;

#[async_trait]
impl VersionQuery for JavaVersionQuery {
    async fn query(&self, java: &Path) -> Result<JavaVersion> {
        let output = Command::new(java)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run {} -version", java.display()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(java = %java.display(), banner = %stderr.trim(), "java -version");

        if !output.status.success() {
            bail!(
                "{} -version exited with {}",
                java.display(),
                output.status.code().unwrap_or(-1)
            );
        }

        parse_version_banner(&stderr)
            .or_else(|| parse_version_banner(&stdout))
            .with_context(|| format!("Unrecognized java version banner: {}", stderr.trim()))
    }
}

/// Answers every query with the same version; lets tests run without a JDK.
pub struct FixedVersionQuery(pub Option<JavaVersion>);

impl FixedVersionQuery {
    pub fn major(major: u32) -> Self {
        Self(Some(JavaVersion {
            major,
            raw: major.to_string(),
        }))
    }

    pub fn unparseable() -> Self {
        Self(None)
    }
}

#[async_trait]
impl VersionQuery for FixedVersionQuery {
    async fn query(&self, _java: &Path) -> Result<JavaVersion> {
        self.0
            .clone()
            .context("Unrecognized java version banner")
    }
}
