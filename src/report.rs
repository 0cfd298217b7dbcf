//! Stage 4: classify the run and list the artifacts it produced.

use crate::build::{BuildTarget, StepRecord};
use crate::fs::FileSystem;
use crate::normalize::NormalizedHome;
use crate::toolchain::ToolchainDescriptor;
use glob::Pattern;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    FormatFailed,
    CredentialsMissing,
    NoArtifacts,
}

/// A non-fatal condition worth telling the operator about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: String,
}

impl Advisory {
    pub fn new(kind: AdvisoryKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    PortableDirectory,
    Installer,
    PortableArchive,
    Library,
}

impl ArtifactKind {
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::PortableDirectory => "Portable app",
            ArtifactKind::Installer => "Installer",
            ArtifactKind::PortableArchive => "Portable archive",
            ArtifactKind::Library => "Library",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    pub exit_code: i32,
    pub artifacts: Vec<Artifact>,
}

/// Everything the CLI prints after a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub target: BuildTarget,
    pub toolchain: ToolchainDescriptor,
    pub java_home: NormalizedHome,
    pub steps: Vec<StepRecord>,
    pub advisories: Vec<Advisory>,
    pub result: BuildResult,
}

/// A conventional output location relative to the project directory.
struct ArtifactLocation {
    kind: ArtifactKind,
    dir: &'static str,
    /// File-name pattern inside `dir`; `None` means `dir` itself is the artifact
    pattern: Option<&'static str>,
}

const ARTIFACT_LOCATIONS: &[ArtifactLocation] = &[
    ArtifactLocation {
        kind: ArtifactKind::PortableDirectory,
        dir: "build/compose/binaries/main/app",
        pattern: None,
    },
    ArtifactLocation {
        kind: ArtifactKind::Installer,
        dir: "build/compose/binaries/main/msi",
        pattern: Some("*.msi"),
    },
    ArtifactLocation {
        kind: ArtifactKind::PortableArchive,
        dir: "build/compose/binaries/main/zip",
        pattern: Some("*.zip"),
    },
    ArtifactLocation {
        kind: ArtifactKind::PortableArchive,
        dir: "build/distributions",
        pattern: Some("*.zip"),
    },
    ArtifactLocation {
        kind: ArtifactKind::Library,
        dir: "build/libs",
        pattern: Some("*.jar"),
    },
];

pub struct ResultReporter<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> ResultReporter<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Artifacts that exist under `project_dir`, in location order.
    pub fn discover(&self, project_dir: &Path) -> Vec<Artifact> {
        let mut artifacts = Vec::new();

        for location in ARTIFACT_LOCATIONS {
            let dir = project_dir.join(location.dir);
            if !self.fs.is_dir(&dir) {
                debug!(dir = %dir.display(), "Artifact location absent");
                continue;
            }

            let Some(pattern) = location.pattern else {
                artifacts.push(Artifact {
                    kind: location.kind,
                    path: dir,
                });
                continue;
            };

            let pattern = match Pattern::new(pattern) {
                Ok(p) => p,
                Err(e) => {
                    warn!(pattern, error = %e, "Invalid artifact pattern");
                    continue;
                }
            };

            let mut found: Vec<PathBuf> = match self.fs.read_dir(&dir) {
                Ok(entries) => entries
                    .into_iter()
                    .filter(|entry| !entry.is_dir() && pattern.matches(entry.file_name()))
                    .map(|entry| entry.path)
                    .collect(),
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Could not list artifact directory");
                    continue;
                }
            };
            found.sort();

            artifacts.extend(found.into_iter().map(|path| Artifact {
                kind: location.kind,
                path,
            }));
        }

        artifacts
    }

    /// Builds the result for a successful primary step.
    ///
    /// Finding nothing is only an advisory: cross-compiling the installer from
    /// a non-Windows host routinely produces partial output.
    pub fn report(&self, project_dir: &Path, advisories: &mut Vec<Advisory>) -> BuildResult {
        let artifacts = self.discover(project_dir);

        if artifacts.is_empty() {
            let advisory = Advisory::new(
                AdvisoryKind::NoArtifacts,
                "Build succeeded but no artifacts were found in the usual locations",
            );
            warn!("{}", advisory.message);
            advisories.push(advisory);
        }

        BuildResult {
            exit_code: 0,
            artifacts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    const PROJECT: &str = "/work/app";

    fn fs() -> MockFileSystem {
        MockFileSystem::with_root(PathBuf::from("/"))
    }

    #[test]
    fn test_discovers_all_kinds() {
        let fs = fs();
        fs.add_dir("/work/app/build/compose/binaries/main/app/MyApp");
        fs.add_file("/work/app/build/compose/binaries/main/msi/MyApp-1.0.0.msi");
        fs.add_file("/work/app/build/compose/binaries/main/msi/notes.txt");
        fs.add_file("/work/app/build/distributions/MyApp-1.0.0.zip");
        fs.add_file("/work/app/build/libs/app-1.0.0.jar");
        fs.add_file("/work/app/build/libs/app-1.0.0-sources.jar");

        let artifacts = ResultReporter::new(&fs).discover(Path::new(PROJECT));
        let kinds: Vec<ArtifactKind> = artifacts.iter().map(|a| a.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ArtifactKind::PortableDirectory,
                ArtifactKind::Installer,
                ArtifactKind::PortableArchive,
                ArtifactKind::Library,
                ArtifactKind::Library,
            ]
        );
        assert_eq!(
            artifacts[1].path,
            PathBuf::from("/work/app/build/compose/binaries/main/msi/MyApp-1.0.0.msi")
        );
        assert_eq!(
            artifacts[3].path,
            PathBuf::from("/work/app/build/libs/app-1.0.0-sources.jar")
        );
    }

    #[test]
    fn test_nothing_found_is_advisory() {
        let fs = fs();
        fs.add_dir("/work/app/build/libs");

        let mut advisories = Vec::new();
        let result = ResultReporter::new(&fs).report(Path::new(PROJECT), &mut advisories);

        assert_eq!(result.exit_code, 0);
        assert!(result.artifacts.is_empty());
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].kind, AdvisoryKind::NoArtifacts);
    }

    #[test]
    fn test_partial_output_has_no_advisory() {
        let fs = fs();
        fs.add_file("/work/app/build/libs/app.jar");

        let mut advisories = Vec::new();
        let result = ResultReporter::new(&fs).report(Path::new(PROJECT), &mut advisories);

        assert_eq!(result.artifacts.len(), 1);
        assert!(advisories.is_empty());
    }

    #[test]
    fn test_directories_matching_pattern_are_skipped() {
        let fs = fs();
        fs.add_dir("/work/app/build/libs/weird.jar");

        let artifacts = ResultReporter::new(&fs).discover(Path::new(PROJECT));
        assert!(artifacts.is_empty());
    }
}
