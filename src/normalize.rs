//! Stage 2: make the Java installation path safe to hand to the Gradle wrapper.
//!
//! The Windows wrapper script splits `JAVA_HOME` on whitespace, so a JDK under
//! `C:\Program Files` breaks it. When that happens we look for a pre-made
//! alias (junction or symlink) and use it instead. Links are never created
//! here. If no usable alias exists, the operator gets the exact commands to
//! create one.

use crate::config::{HostPlatform, ShellStyle, WinpackConfig};
use crate::error::BuildError;
use crate::fs::FileSystem;
use crate::toolchain::ToolchainDescriptor;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The `JAVA_HOME` value the build will run with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedHome {
    pub java_home: PathBuf,
    /// True when the alias replaced the original installation path
    pub aliased: bool,
}

pub struct PathNormalizer<'a> {
    fs: &'a dyn FileSystem,
    platform: HostPlatform,
    shell: ShellStyle,
    alias: PathBuf,
}

impl<'a> PathNormalizer<'a> {
    pub fn new(fs: &'a dyn FileSystem, config: &WinpackConfig) -> Self {
        Self {
            fs,
            platform: config.platform,
            shell: config.shell,
            alias: config.jdk_alias.clone(),
        }
    }

    pub fn normalize(&self, toolchain: &ToolchainDescriptor) -> Result<NormalizedHome, BuildError> {
        let path = &toolchain.java_home;

        if !has_whitespace(path) {
            return Ok(NormalizedHome {
                java_home: path.clone(),
                aliased: false,
            });
        }

        warn!(
            java_home = %path.display(),
            "Java installation path contains whitespace, which the Gradle wrapper cannot handle"
        );

        if !self.alias_usable() {
            return Err(BuildError::UnsupportedPath {
                path: path.clone(),
                alias: self.alias.clone(),
                instructions: self.instructions(path),
            });
        }

        if let Ok(target) = self.fs.canonicalize(&self.alias) {
            let original = self.fs.canonicalize(path).unwrap_or_else(|_| path.clone());
            if target != original {
                warn!(
                    alias = %self.alias.display(),
                    target = %target.display(),
                    expected = %original.display(),
                    "Alias points at a different installation than the one that was probed"
                );
            }
        }

        info!(alias = %self.alias.display(), "Using whitespace-free JDK alias");
        Ok(NormalizedHome {
            java_home: self.alias.clone(),
            aliased: true,
        })
    }

    fn alias_usable(&self) -> bool {
        !has_whitespace(&self.alias)
            && self.fs.is_dir(&self.alias)
            && self.fs.is_file(
                &self
                    .alias
                    .join("bin")
                    .join(self.platform.executable("java")),
            )
    }

    /// Commands that create the alias and point `JAVA_HOME` at it.
    pub fn instructions(&self, path: &Path) -> Vec<String> {
        let alias = self.alias.display().to_string();
        let target = path.display().to_string();

        let mut lines = vec![format!(
            "Create a whitespace-free alias for the JDK at {}:",
            render_path(&self.alias, self.shell)
        )];

        match (self.platform, self.shell) {
            (HostPlatform::Windows, ShellStyle::Native) => {
                lines.push(format!("  cmd:        mklink /J \"{}\" \"{}\"", alias, target));
                lines.push(format!(
                    "  PowerShell: New-Item -ItemType Junction -Path \"{}\" -Target \"{}\"",
                    alias, target
                ));
                lines.push("Then set JAVA_HOME for this session:".to_string());
                lines.push(format!("  cmd:        set JAVA_HOME={}", alias));
                lines.push(format!("  PowerShell: $env:JAVA_HOME = \"{}\"", alias));
            }
            (HostPlatform::Windows, ShellStyle::Msys) => {
                lines.push(format!("  cmd //c mklink /J \"{}\" \"{}\"", alias, target));
                lines.push("Then set JAVA_HOME for this session:".to_string());
                lines.push(format!(
                    "  export JAVA_HOME=\"{}\"",
                    render_path(&self.alias, ShellStyle::Msys)
                ));
            }
            (HostPlatform::Posix, _) => {
                lines.push(format!("  ln -s \"{}\" \"{}\"", target, alias));
                lines.push("Then set JAVA_HOME for this session:".to_string());
                lines.push(format!("  export JAVA_HOME=\"{}\"", alias));
            }
        }

        lines
    }
}

pub fn has_whitespace(path: &Path) -> bool {
    path.to_string_lossy().contains(char::is_whitespace)
}

/// Renders a path the way the given shell expects to see it.
///
/// MSYS shells address drives as `/c/...`; everything else is unchanged.
pub fn render_path(path: &Path, shell: ShellStyle) -> String {
    let text = path.to_string_lossy();
    if shell == ShellStyle::Native {
        return text.into_owned();
    }

    let bytes = text.as_bytes();
    let is_drive_path = bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes.len() == 2 || bytes[2] == b'\\' || bytes[2] == b'/');

    if !is_drive_path {
        return text.replace('\\', "/");
    }

    let drive = (bytes[0] as char).to_ascii_lowercase();
    let rest = text[2..].replace('\\', "/");
    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
        format!("/{}", drive)
    } else {
        format!("/{}/{}", drive, rest)
    }
}
