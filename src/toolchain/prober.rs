use super::locator::ToolchainLocator;
use super::version::VersionQuery;
use super::ToolchainDescriptor;
use crate::config::WinpackConfig;
use crate::error::{BuildError, MIN_JAVA_VERSION};
use crate::fs::FileSystem;
use tracing::{debug, info, warn};

/// Stage 1: find a runtime and compiler and check the version floor.
pub struct EnvironmentProber<'a> {
    fs: &'a dyn FileSystem,
    locator: &'a dyn ToolchainLocator,
    version_query: &'a dyn VersionQuery,
}

impl<'a> EnvironmentProber<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        locator: &'a dyn ToolchainLocator,
        version_query: &'a dyn VersionQuery,
    ) -> Self {
        Self {
            fs,
            locator,
            version_query,
        }
    }

    pub async fn probe(&self, config: &WinpackConfig) -> Result<ToolchainDescriptor, BuildError> {
        debug!(locator = self.locator.name(), "Probing for Java toolchain");

        let located = self
            .locator
            .locate(self.fs, config)
            .ok_or(BuildError::ToolchainMissing)?;

        // the compiler lives next to the runtime; a JRE has only the latter
        let javac = located
            .java
            .with_file_name(config.platform.executable("javac"));
        if !self.fs.is_file(&javac) {
            return Err(BuildError::CompilerMissing {
                java_home: located.java_home,
            });
        }

        let version = match self.version_query.query(&located.java).await {
            Ok(version) => version,
            Err(e) => {
                warn!(error = %e, "Could not determine Java version");
                return Err(BuildError::VersionTooLow {
                    found: 0,
                    required: MIN_JAVA_VERSION,
                    java_home: located.java_home,
                });
            }
        };

        if version.major < MIN_JAVA_VERSION {
            return Err(BuildError::VersionTooLow {
                found: version.major,
                required: MIN_JAVA_VERSION,
                java_home: located.java_home,
            });
        }

        info!(
            version = %version.raw,
            java_home = %located.java_home.display(),
            "Using Java {}", version.major
        );

        Ok(ToolchainDescriptor {
            java_home: located.java_home,
            java: located.java,
            javac,
            version,
            search_path: located.search_path,
            source: located.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvSnapshot, HostPlatform};
    use crate::fs::MockFileSystem;
    use crate::toolchain::locator::{LocationSource, PosixLocator, WindowsLocator};
    use crate::toolchain::version::FixedVersionQuery;
    use std::path::PathBuf;
    use yare::parameterized;

    fn posix_config(java_home: &str) -> WinpackConfig {
        let env = EnvSnapshot::default().with("JAVA_HOME", java_home);
        WinpackConfig::from_env(HostPlatform::Posix, &env).unwrap()
    }

    fn jdk_fs(home: &str) -> MockFileSystem {
        let fs = MockFileSystem::with_root(PathBuf::from("/"));
        fs.add_file(format!("{}/bin/java", home));
        fs.add_file(format!("{}/bin/javac", home));
        fs
    }

    #[parameterized(
        floor = { 17 },
        lts_21 = { 21 },
        future = { 25 },
    )]
    fn test_supported_versions_succeed(major: u32) {
        let fs = jdk_fs("/opt/jdk");
        let query = FixedVersionQuery::major(major);
        let prober = EnvironmentProber::new(&fs, &PosixLocator, &query);

        let descriptor = block_on(prober.probe(&posix_config("/opt/jdk"))).unwrap();
        assert_eq!(descriptor.version.major, major);
        assert_eq!(descriptor.java_home, PathBuf::from("/opt/jdk"));
        assert_eq!(descriptor.javac, PathBuf::from("/opt/jdk/bin/javac"));
        assert_eq!(descriptor.source, LocationSource::JavaHome);
    }

    #[parameterized(
        legacy_8 = { 8 },
        lts_11 = { 11 },
        just_below = { 16 },
    )]
    fn test_old_versions_fail(major: u32) {
        let fs = jdk_fs("/opt/jdk");
        let query = FixedVersionQuery::major(major);
        let prober = EnvironmentProber::new(&fs, &PosixLocator, &query);

        let err = block_on(prober.probe(&posix_config("/opt/jdk"))).unwrap_err();
        match err {
            BuildError::VersionTooLow {
                found, required, ..
            } => {
                assert_eq!(found, major);
                assert_eq!(required, 17);
            }
            other => panic!("Expected VersionTooLow, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparseable_banner_is_version_too_low() {
        let fs = jdk_fs("/opt/jdk");
        let query = FixedVersionQuery::unparseable();
        let prober = EnvironmentProber::new(&fs, &PosixLocator, &query);

        let err = prober.probe(&posix_config("/opt/jdk")).await.unwrap_err();
        assert!(matches!(err, BuildError::VersionTooLow { found: 0, .. }));
    }

    #[tokio::test]
    async fn test_jre_only_is_compiler_missing() {
        let fs = MockFileSystem::with_root(PathBuf::from("/"));
        fs.add_file("/opt/jre/bin/java");
        let query = FixedVersionQuery::major(21);
        let prober = EnvironmentProber::new(&fs, &PosixLocator, &query);

        let err = prober.probe(&posix_config("/opt/jre")).await.unwrap_err();
        assert!(matches!(err, BuildError::CompilerMissing { .. }));
    }

    #[tokio::test]
    async fn test_old_jre_only_is_still_compiler_missing() {
        let fs = MockFileSystem::with_root(PathBuf::from("/"));
        fs.add_file("/opt/jre/bin/java");
        let query = FixedVersionQuery::major(8);
        let prober = EnvironmentProber::new(&fs, &PosixLocator, &query);

        let err = prober.probe(&posix_config("/opt/jre")).await.unwrap_err();
        assert!(matches!(err, BuildError::CompilerMissing { .. }));
    }

    #[tokio::test]
    async fn test_nothing_installed_is_toolchain_missing() {
        let fs = MockFileSystem::with_root(PathBuf::from("/"));
        let query = FixedVersionQuery::major(21);
        let prober = EnvironmentProber::new(&fs, &PosixLocator, &query);

        let config = WinpackConfig::from_env(
            HostPlatform::Posix,
            &EnvSnapshot::default().with("PATH", "/usr/bin"),
        )
        .unwrap();
        let err = prober.probe(&config).await.unwrap_err();
        assert!(matches!(err, BuildError::ToolchainMissing));
    }

    #[tokio::test]
    async fn test_windows_compiler_uses_exe_suffix() {
        let fs = MockFileSystem::with_root(PathBuf::from("/"));
        fs.add_file("/pf/Microsoft/jdk-21/bin/java.exe");
        fs.add_file("/pf/Microsoft/jdk-21/bin/javac.exe");
        let query = FixedVersionQuery::major(21);
        let prober = EnvironmentProber::new(&fs, &WindowsLocator, &query);

        let config = WinpackConfig::from_env(
            HostPlatform::Windows,
            &EnvSnapshot::default().with("ProgramFiles", "/pf"),
        )
        .unwrap();
        let descriptor = prober.probe(&config).await.unwrap();

        assert_eq!(
            descriptor.javac,
            PathBuf::from("/pf/Microsoft/jdk-21/bin/javac.exe")
        );
        assert_eq!(descriptor.source, LocationSource::VendorDirectory);
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }
}
