//! Configuration management for winpack
//!
//! All settings are read from an [`EnvSnapshot`] taken once at startup. The
//! snapshot is threaded through the pipeline instead of mutating the process
//! environment.
//!
//! # Environment Variables
//!
//! - `JAVA_HOME`: Java installation override
//! - `PATH` / `PATHEXT`: executable search path
//! - `ProgramFiles`, `ProgramFiles(x86)`: vendor install roots (Windows only)
//! - `WINPACK_GRADLE_ARGS`: extra arguments appended to every wrapper call
//! - `WINPACK_FLAVOR`: `portable` | `installer`
//! - `WINPACK_ARCH`: `x86_64` | `arm64`
//! - `WINPACK_RELEASE`: release/staging mode (boolean string)
//! - `WINPACK_FORCE_CLEAN`: always run the clean step (boolean string)
//! - `WINPACK_JDK_ALIAS`: whitespace-free alias for the JDK installation
//! - `WINPACK_SHELL`: `native` | `msys`, controls how paths are rendered
//! - `WINPACK_FORMAT_TASK`: format-fix task, empty disables it - default: "spotlessApply"
//! - `WINPACK_CREDENTIALS_FILE`: installer credentials marker - default: "signing.properties"
//! - `WINPACK_LOG_LEVEL`: logging level - default: "info"

use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_FORMAT_TASK: &str = "spotlessApply";
const DEFAULT_CREDENTIALS_FILE: &str = "signing.properties";
const DEFAULT_WINDOWS_ALIAS: &str = r"C:\jdk";
const DEFAULT_POSIX_ALIAS: &str = "/opt/jdk";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: '{value}'. Valid options: {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Host operating system family, decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    Windows,
    Posix,
}

impl HostPlatform {
    pub fn current() -> Self {
        if cfg!(windows) {
            HostPlatform::Windows
        } else {
            HostPlatform::Posix
        }
    }

    /// Platform-specific file name for an executable (`java` -> `java.exe`).
    pub fn executable(&self, name: &str) -> String {
        match self {
            HostPlatform::Windows => format!("{}.exe", name),
            HostPlatform::Posix => name.to_string(),
        }
    }

    pub fn wrapper_script(&self) -> &'static str {
        match self {
            HostPlatform::Windows => "gradlew.bat",
            HostPlatform::Posix => "gradlew",
        }
    }

    pub fn default_jdk_alias(&self) -> PathBuf {
        match self {
            HostPlatform::Windows => PathBuf::from(DEFAULT_WINDOWS_ALIAS),
            HostPlatform::Posix => PathBuf::from(DEFAULT_POSIX_ALIAS),
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostPlatform::Windows => write!(f, "windows"),
            HostPlatform::Posix => write!(f, "posix"),
        }
    }
}

/// Shell convention used when rendering paths back to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellStyle {
    /// cmd/PowerShell on Windows, sh on POSIX
    Native,
    /// Git-Bash / MSYS on Windows (`C:\jdk` is written `/c/jdk`)
    Msys,
}

impl ShellStyle {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "native" => Ok(ShellStyle::Native),
            "msys" | "mingw" | "gitbash" => Ok(ShellStyle::Msys),
            _ => Err(ConfigError::InvalidValue {
                field: "WINPACK_SHELL",
                value: value.to_string(),
                expected: "native, msys",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildFlavor {
    Portable,
    Installer,
}

impl BuildFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildFlavor::Portable => "portable",
            BuildFlavor::Installer => "installer",
        }
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "portable" => Ok(BuildFlavor::Portable),
            "installer" => Ok(BuildFlavor::Installer),
            _ => Err(ConfigError::InvalidValue {
                field: "WINPACK_FLAVOR",
                value: value.to_string(),
                expected: "portable, installer",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetArch {
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "arm64")]
    Arm64,
}

impl TargetArch {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetArch::X86_64 => "x86_64",
            TargetArch::Arm64 => "arm64",
        }
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Ok(TargetArch::X86_64),
            "arm64" | "aarch64" => Ok(TargetArch::Arm64),
            _ => Err(ConfigError::InvalidValue {
                field: "WINPACK_ARCH",
                value: value.to_string(),
                expected: "x86_64, arm64",
            }),
        }
    }
}

/// Immutable copy of the environment variables winpack cares about.
///
/// Lookups are ASCII case-insensitive so `Path` and `PATH` are the same key,
/// matching how Windows treats variable names.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, OsString>,
}

impl EnvSnapshot {
    pub fn from_process() -> Self {
        env::vars_os()
            .filter_map(|(k, v)| k.into_string().ok().map(|k| (k, v)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .get(key)
            .or_else(|| {
                self.vars
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
            })
            .map(OsString::as_os_str)
    }

    /// Non-empty value as a string.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|v| v.to_string_lossy().trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn with(mut self, key: &str, value: impl Into<OsString>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<OsString>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

pub(crate) fn parse_bool(field: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field,
            value: value.to_string(),
            expected: "true, false",
        }),
    }
}

#[derive(Debug, Clone)]
pub struct WinpackConfig {
    pub platform: HostPlatform,
    pub shell: ShellStyle,
    pub java_home: Option<PathBuf>,
    pub search_path: OsString,
    /// Vendor install roots probed on Windows, in priority order
    pub vendor_roots: Vec<PathBuf>,
    pub jdk_alias: PathBuf,
    pub gradle_args: Vec<String>,
    pub flavor: Option<BuildFlavor>,
    pub arch: Option<TargetArch>,
    pub release: bool,
    pub force_clean: bool,
    pub format_task: Option<String>,
    pub credentials_file: String,
    pub log_level: String,
}

impl WinpackConfig {
    /// Loads configuration from the current process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(HostPlatform::current(), &EnvSnapshot::from_process())
    }

    pub fn from_env(platform: HostPlatform, env: &EnvSnapshot) -> Result<Self, ConfigError> {
        let shell = env
            .get_str("WINPACK_SHELL")
            .map(|v| ShellStyle::parse(&v))
            .transpose()?
            .unwrap_or(ShellStyle::Native);

        let vendor_roots = match platform {
            HostPlatform::Windows => vendor_roots(env),
            HostPlatform::Posix => Vec::new(),
        };

        let flavor = env
            .get_str("WINPACK_FLAVOR")
            .map(|v| BuildFlavor::parse(&v))
            .transpose()?;

        let arch = env
            .get_str("WINPACK_ARCH")
            .map(|v| TargetArch::parse(&v))
            .transpose()?;

        let release = env
            .get_str("WINPACK_RELEASE")
            .map(|v| parse_bool("WINPACK_RELEASE", &v))
            .transpose()?
            .unwrap_or(false);

        let force_clean = env
            .get_str("WINPACK_FORCE_CLEAN")
            .map(|v| parse_bool("WINPACK_FORCE_CLEAN", &v))
            .transpose()?
            .unwrap_or(false);

        // set-but-empty disables the step, unset means the default task
        let format_task = match env.get("WINPACK_FORMAT_TASK") {
            Some(v) => Some(v.to_string_lossy().trim().to_string()).filter(|t| !t.is_empty()),
            None => Some(DEFAULT_FORMAT_TASK.to_string()),
        };

        let config = Self {
            platform,
            shell,
            java_home: env.get_str("JAVA_HOME").map(PathBuf::from),
            search_path: env.get("PATH").map(OsStr::to_os_string).unwrap_or_default(),
            vendor_roots,
            jdk_alias: env
                .get_str("WINPACK_JDK_ALIAS")
                .map(PathBuf::from)
                .unwrap_or_else(|| platform.default_jdk_alias()),
            gradle_args: env
                .get_str("WINPACK_GRADLE_ARGS")
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            flavor,
            arch,
            release,
            force_clean,
            format_task,
            credentials_file: env
                .get_str("WINPACK_CREDENTIALS_FILE")
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string()),
            log_level: env
                .get_str("WINPACK_LOG_LEVEL")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
                .to_lowercase(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jdk_alias.to_string_lossy().contains(char::is_whitespace) {
            return Err(ConfigError::ValidationFailed(format!(
                "JDK alias path must not contain whitespace: {}",
                self.jdk_alias.display()
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Gradle `-P` properties derived from flavor, arch and release mode.
    pub fn gradle_properties(&self) -> Vec<String> {
        let mut props = Vec::new();
        if let Some(flavor) = self.flavor {
            props.push(format!("-Pwinpack.flavor={}", flavor.as_str()));
        }
        if let Some(arch) = self.arch {
            props.push(format!("-Pwinpack.arch={}", arch.as_str()));
        }
        if self.release {
            props.push("-Pwinpack.release=true".to_string());
        }
        props
    }
}

fn vendor_roots(env: &EnvSnapshot) -> Vec<PathBuf> {
    let program_files = env
        .get_str("ProgramFiles")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"));
    let program_files_x86 = env
        .get_str("ProgramFiles(x86)")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Program Files (x86)"));

    vec![
        program_files.join("Microsoft"),
        program_files.join("Eclipse Adoptium"),
        program_files.join("Java"),
        program_files_x86.join("Java"),
    ]
}

impl fmt::Display for WinpackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Winpack Configuration:")?;
        writeln!(f, "  Platform: {}", self.platform)?;
        writeln!(f, "  Shell: {:?}", self.shell)?;
        writeln!(
            f,
            "  JAVA_HOME: {}",
            self.java_home
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(not set)".to_string())
        )?;
        writeln!(f, "  JDK Alias: {}", self.jdk_alias.display())?;
        writeln!(
            f,
            "  Flavor: {}",
            self.flavor.map(|v| v.as_str()).unwrap_or("(default)")
        )?;
        writeln!(
            f,
            "  Arch: {}",
            self.arch.map(|v| v.as_str()).unwrap_or("(default)")
        )?;
        writeln!(f, "  Release: {}", self.release)?;
        writeln!(f, "  Force Clean: {}", self.force_clean)?;
        writeln!(
            f,
            "  Format Task: {}",
            self.format_task.as_deref().unwrap_or("(disabled)")
        )?;
        writeln!(f, "  Credentials File: {}", self.credentials_file)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
