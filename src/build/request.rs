use super::runner::StdoutRoute;
use crate::config::WinpackConfig;
use crate::normalize::NormalizedHome;
use crate::toolchain::locator::prepend_path;
use crate::toolchain::ToolchainDescriptor;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;

/// Which artifact the primary step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTarget {
    /// Portable distribution (unpacked app directory)
    #[default]
    Dist,
    /// Windows installer; expects a credentials marker in the project
    Msi,
}

impl BuildTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildTarget::Dist => "dist",
            BuildTarget::Msi => "msi",
        }
    }

    /// Gradle task name for the primary step.
    pub fn task_name(&self) -> &'static str {
        match self {
            BuildTarget::Dist => "createDistributable",
            BuildTarget::Msi => "packageMsi",
        }
    }

    pub fn requires_credentials(&self) -> bool {
        matches!(self, BuildTarget::Msi)
    }
}

/// Everything the invoker needs, fixed before the first subprocess starts.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub target: BuildTarget,
    pub clean: bool,
    pub format_task: Option<String>,
    pub env_overrides: BTreeMap<String, OsString>,
    /// `-P` properties appended to every wrapper call
    pub properties: Vec<String>,
    pub extra_args: Vec<String>,
    pub stdout: StdoutRoute,
}

impl BuildRequest {
    /// Combines CLI choices with configuration and the validated toolchain.
    ///
    /// `WINPACK_FORCE_CLEAN` wins over `--clean false`.
    pub fn new(
        target: BuildTarget,
        clean: bool,
        config: &WinpackConfig,
        toolchain: &ToolchainDescriptor,
        home: &NormalizedHome,
    ) -> Self {
        let mut env_overrides = BTreeMap::new();
        env_overrides.insert(
            "JAVA_HOME".to_string(),
            home.java_home.clone().into_os_string(),
        );
        env_overrides.insert(
            "PATH".to_string(),
            prepend_path(&home.java_home.join("bin"), &toolchain.search_path),
        );

        Self {
            target,
            clean: clean || config.force_clean,
            format_task: config.format_task.clone(),
            env_overrides,
            properties: config.gradle_properties(),
            extra_args: config.gradle_args.clone(),
            stdout: StdoutRoute::Inherit,
        }
    }

    pub fn with_stdout(mut self, route: StdoutRoute) -> Self {
        self.stdout = route;
        self
    }

    /// Arguments for one wrapper call running `task`.
    pub fn args_for(&self, task: &str) -> Vec<String> {
        std::iter::once(task.to_string())
            .chain(self.properties.iter().cloned())
            .chain(self.extra_args.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvSnapshot, HostPlatform};
    use crate::toolchain::{JavaVersion, LocationSource};
    use std::path::PathBuf;

    fn toolchain() -> ToolchainDescriptor {
        ToolchainDescriptor {
            java_home: PathBuf::from("/opt/jdk-21"),
            java: PathBuf::from("/opt/jdk-21/bin/java"),
            javac: PathBuf::from("/opt/jdk-21/bin/javac"),
            version: JavaVersion {
                major: 21,
                raw: "21".to_string(),
            },
            search_path: OsString::from("/usr/bin"),
            source: LocationSource::JavaHome,
        }
    }

    fn home() -> NormalizedHome {
        NormalizedHome {
            java_home: PathBuf::from("/opt/jdk-21"),
            aliased: false,
        }
    }

    fn config(pairs: &[(&str, &str)]) -> WinpackConfig {
        let env: EnvSnapshot = pairs.iter().map(|(k, v)| (*k, *v)).collect();
        WinpackConfig::from_env(HostPlatform::Posix, &env).unwrap()
    }

    #[test]
    fn test_target_task_names() {
        assert_eq!(BuildTarget::Dist.task_name(), "createDistributable");
        assert_eq!(BuildTarget::Msi.task_name(), "packageMsi");
        assert_eq!(BuildTarget::default(), BuildTarget::Dist);
        assert!(BuildTarget::Msi.requires_credentials());
        assert!(!BuildTarget::Dist.requires_credentials());
    }

    #[test]
    fn test_env_overrides() {
        let request = BuildRequest::new(BuildTarget::Dist, true, &config(&[]), &toolchain(), &home());

        assert_eq!(
            request.env_overrides.get("JAVA_HOME"),
            Some(&OsString::from("/opt/jdk-21"))
        );
        let path: Vec<PathBuf> =
            std::env::split_paths(&request.env_overrides["PATH"]).collect();
        assert_eq!(
            path,
            vec![PathBuf::from("/opt/jdk-21/bin"), PathBuf::from("/usr/bin")]
        );
    }

    #[test]
    fn test_force_clean_overrides_flag() {
        let request = BuildRequest::new(
            BuildTarget::Dist,
            false,
            &config(&[("WINPACK_FORCE_CLEAN", "true")]),
            &toolchain(),
            &home(),
        );
        assert!(request.clean);
    }

    #[test]
    fn test_args_for_appends_properties_and_extra_args() {
        let request = BuildRequest::new(
            BuildTarget::Msi,
            true,
            &config(&[
                ("WINPACK_ARCH", "arm64"),
                ("WINPACK_GRADLE_ARGS", "--stacktrace"),
            ]),
            &toolchain(),
            &home(),
        );

        assert_eq!(
            request.args_for("packageMsi"),
            vec!["packageMsi", "-Pwinpack.arch=arm64", "--stacktrace"]
        );
    }
}
