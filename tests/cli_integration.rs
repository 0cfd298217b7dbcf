//! CLI integration tests
//!
//! These run the real binary. Build scenarios use a fake JDK and a fake Gradle
//! wrapper written as shell scripts, so they only run on Unix.

use std::env;
use std::path::PathBuf;
use std::process::Command;

/// Helper to get the path to the winpack binary
fn winpack_bin() -> PathBuf {
    let mut path = env::current_exe()
        .expect("Failed to get current executable path")
        .parent()
        .expect("No parent")
        .parent()
        .expect("No parent")
        .to_path_buf();

    if path.ends_with("deps") {
        path = path.parent().expect("No parent").to_path_buf();
    }

    path.join(format!("winpack{}", env::consts::EXE_SUFFIX))
}

/// Command with every variable winpack reads removed, so the host
/// environment cannot leak into assertions.
fn winpack() -> Command {
    let mut cmd = Command::new(winpack_bin());
    for key in [
        "JAVA_HOME",
        "RUST_LOG",
        "WINPACK_GRADLE_ARGS",
        "WINPACK_FLAVOR",
        "WINPACK_ARCH",
        "WINPACK_RELEASE",
        "WINPACK_FORCE_CLEAN",
        "WINPACK_JDK_ALIAS",
        "WINPACK_SHELL",
        "WINPACK_FORMAT_TASK",
        "WINPACK_LOG_LEVEL",
        "WINPACK_LOG_JSON",
        "WINPACK_CREDENTIALS_FILE",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn test_cli_help() {
    let output = winpack()
        .arg("--help")
        .output()
        .expect("Failed to execute winpack");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("winpack"));
    assert!(stdout.contains("build"));
    assert!(stdout.contains("doctor"));
}

#[test]
fn test_cli_version() {
    let output = winpack()
        .arg("--version")
        .output()
        .expect("Failed to execute winpack");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_build_type_is_usage_error() {
    let output = winpack()
        .args(["build", "--build-type", "dmg"])
        .output()
        .expect("Failed to execute winpack");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dmg"));
}

#[test]
fn test_invalid_flavor_fails_before_probing() {
    let dir = tempfile::tempdir().unwrap();
    let output = winpack()
        .args(["build", "--project-dir"])
        .arg(dir.path())
        .env("WINPACK_FLAVOR", "deluxe")
        .output()
        .expect("Failed to execute winpack");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("deluxe"));
}

#[test]
fn test_missing_project_dir() {
    let output = winpack()
        .args(["build", "--project-dir", "/definitely/not/a/project"])
        .output()
        .expect("Failed to execute winpack");

    assert_eq!(output.status.code(), Some(1));
}

#[cfg(unix)]
mod unix {
    use super::winpack;
    use serial_test::serial;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const GRADLEW: &str = r#"#!/bin/sh
here="$(cd "$(dirname "$0")" && pwd)"
echo "$1" >> "$here/tasks.log"
echo "$JAVA_HOME" >> "$here/java_home.log"
echo "> Task :$1"
if [ "$1" = "$FAKE_FAIL_TASK" ]; then
    echo "task $1 failed" >&2
    exit "${FAKE_FAIL_CODE:-1}"
fi
if [ "$1" = "createDistributable" ]; then
    mkdir -p "$here/build/compose/binaries/main/app/Demo"
fi
echo "BUILD SUCCESSFUL in 3s"
exit 0
"#;

    fn write_script(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Creates `<home>/bin/java` reporting `major` and, optionally, `javac`.
    fn fake_jdk(home: &Path, major: u32, with_javac: bool) {
        write_script(
            &home.join("bin/java"),
            &format!(
                "#!/bin/sh\necho 'openjdk version \"{major}.0.2\" 2024-01-16' >&2\necho 'OpenJDK Runtime Environment' >&2\n"
            ),
        );
        if with_javac {
            write_script(&home.join("bin/javac"), "#!/bin/sh\nexit 0\n");
        }
    }

    fn fake_project(root: &TempDir) -> PathBuf {
        let project = root.path().join("app");
        write_script(&project.join("gradlew"), GRADLEW);
        project
    }

    fn tasks(project: &Path) -> Vec<String> {
        fs::read_to_string(project.join("tasks.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn json(stdout: &[u8]) -> serde_json::Value {
        serde_json::from_slice(stdout).expect("stdout should be a JSON report")
    }

    #[test]
    #[serial]
    fn test_successful_dist_build() {
        let root = tempfile::tempdir().unwrap();
        let jdk = root.path().join("jdk-21");
        fake_jdk(&jdk, 21, true);
        let project = fake_project(&root);

        let output = winpack()
            .args(["build", "--format", "json", "--project-dir"])
            .arg(&project)
            .env("JAVA_HOME", &jdk)
            .env("FAKE_FAIL_TASK", "spotlessApply")
            .output()
            .expect("Failed to execute winpack");

        assert_eq!(
            output.status.code(),
            Some(0),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert_eq!(
            tasks(&project),
            vec!["clean", "spotlessApply", "createDistributable"]
        );

        let report = json(&output.stdout);
        assert_eq!(report["status"], "succeeded");
        assert_eq!(report["toolchain"]["version"]["major"], 21);
        assert_eq!(report["advisories"][0]["kind"], "format_failed");
        assert_eq!(
            report["result"]["artifacts"][0]["kind"],
            "portable_directory"
        );

        let java_home = fs::read_to_string(project.join("java_home.log")).unwrap();
        assert!(java_home
            .lines()
            .all(|line| Path::new(line) == jdk.as_path()));
    }

    #[test]
    #[serial]
    fn test_wrapper_stdout_stays_out_of_yaml_report() {
        let root = tempfile::tempdir().unwrap();
        let jdk = root.path().join("jdk-21");
        fake_jdk(&jdk, 21, true);
        let project = fake_project(&root);

        let output = winpack()
            .args(["build", "--no-clean", "--format", "yaml", "--project-dir"])
            .arg(&project)
            .env("JAVA_HOME", &jdk)
            .output()
            .expect("Failed to execute winpack");

        assert_eq!(output.status.code(), Some(0));
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(!stdout.contains("BUILD SUCCESSFUL"));
        assert!(stderr.contains("> Task :createDistributable"));
        assert!(stderr.contains("BUILD SUCCESSFUL"));
        let report: serde_yaml::Value =
            serde_yaml::from_str(&stdout).expect("stdout should be a YAML report");
        assert_eq!(report["status"], "succeeded");
    }

    #[test]
    #[serial]
    fn test_human_format_keeps_wrapper_stdout() {
        let root = tempfile::tempdir().unwrap();
        let jdk = root.path().join("jdk-21");
        fake_jdk(&jdk, 21, true);
        let project = fake_project(&root);

        let output = winpack()
            .args(["build", "--no-clean", "--project-dir"])
            .arg(&project)
            .env("JAVA_HOME", &jdk)
            .output()
            .expect("Failed to execute winpack");

        assert_eq!(output.status.code(), Some(0));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("> Task :createDistributable"));
    }

    #[test]
    #[serial]
    fn test_old_java_spawns_nothing() {
        let root = tempfile::tempdir().unwrap();
        let jdk = root.path().join("jdk-11");
        fake_jdk(&jdk, 11, true);
        let project = fake_project(&root);

        let output = winpack()
            .args(["build", "--format", "json", "--project-dir"])
            .arg(&project)
            .env("JAVA_HOME", &jdk)
            .output()
            .expect("Failed to execute winpack");

        assert_eq!(output.status.code(), Some(1));
        assert!(tasks(&project).is_empty());

        let report = json(&output.stdout);
        assert_eq!(report["status"], "failed");
        assert_eq!(report["kind"], "version_too_low");
    }

    #[test]
    #[serial]
    fn test_jre_only_is_compiler_missing() {
        let root = tempfile::tempdir().unwrap();
        let jre = root.path().join("jre-21");
        fake_jdk(&jre, 21, false);
        let project = fake_project(&root);

        let output = winpack()
            .args(["build", "--format", "json", "--project-dir"])
            .arg(&project)
            .env("JAVA_HOME", &jre)
            .output()
            .expect("Failed to execute winpack");

        assert_eq!(output.status.code(), Some(1));
        assert_eq!(json(&output.stdout)["kind"], "compiler_missing");
        assert!(tasks(&project).is_empty());
    }

    #[test]
    #[serial]
    fn test_whitespace_path_without_alias() {
        let root = tempfile::tempdir().unwrap();
        let jdk = root.path().join("Program Files/Java/jdk-21");
        fake_jdk(&jdk, 21, true);
        let project = fake_project(&root);

        let output = winpack()
            .args(["build", "--format", "json", "--project-dir"])
            .arg(&project)
            .env("JAVA_HOME", &jdk)
            .env("WINPACK_JDK_ALIAS", root.path().join("jdk-alias"))
            .output()
            .expect("Failed to execute winpack");

        assert_eq!(output.status.code(), Some(1));
        assert!(tasks(&project).is_empty());

        let report = json(&output.stdout);
        assert_eq!(report["kind"], "unsupported_path");
        let remediation = report["remediation"].as_array().unwrap();
        assert!(remediation
            .iter()
            .any(|line| line.as_str().unwrap_or_default().contains("ln -s")));
    }

    #[test]
    #[serial]
    fn test_whitespace_path_with_alias() {
        let root = tempfile::tempdir().unwrap();
        let jdk = root.path().join("Program Files/Java/jdk-21");
        fake_jdk(&jdk, 21, true);
        let alias = root.path().join("jdk-alias");
        std::os::unix::fs::symlink(&jdk, &alias).unwrap();
        let project = fake_project(&root);

        let output = winpack()
            .args(["build", "--clean", "false", "--format", "json", "--project-dir"])
            .arg(&project)
            .env("JAVA_HOME", &jdk)
            .env("WINPACK_JDK_ALIAS", &alias)
            .output()
            .expect("Failed to execute winpack");

        assert_eq!(output.status.code(), Some(0));
        assert_eq!(tasks(&project), vec!["spotlessApply", "createDistributable"]);

        let java_home = fs::read_to_string(project.join("java_home.log")).unwrap();
        assert!(java_home
            .lines()
            .all(|line| Path::new(line) == alias.as_path()));
    }

    #[test]
    #[serial]
    fn test_primary_failure_exits_one() {
        let root = tempfile::tempdir().unwrap();
        let jdk = root.path().join("jdk-21");
        fake_jdk(&jdk, 21, true);
        let project = fake_project(&root);

        let output = winpack()
            .args(["build", "--no-clean", "--format", "json", "--project-dir"])
            .arg(&project)
            .env("JAVA_HOME", &jdk)
            .env("FAKE_FAIL_TASK", "createDistributable")
            .env("FAKE_FAIL_CODE", "7")
            .output()
            .expect("Failed to execute winpack");

        assert_eq!(output.status.code(), Some(1));
        let report = json(&output.stdout);
        assert_eq!(report["kind"], "primary_build_failed");
        assert_eq!(report["exit_code"], 7);
    }

    #[test]
    #[serial]
    fn test_force_clean_overrides_flag() {
        let root = tempfile::tempdir().unwrap();
        let jdk = root.path().join("jdk-21");
        fake_jdk(&jdk, 21, true);
        let project = fake_project(&root);

        let output = winpack()
            .args(["build", "--clean", "false", "--project-dir"])
            .arg(&project)
            .env("JAVA_HOME", &jdk)
            .env("WINPACK_FORCE_CLEAN", "true")
            .env("WINPACK_FORMAT_TASK", "")
            .output()
            .expect("Failed to execute winpack");

        assert_eq!(output.status.code(), Some(0));
        assert_eq!(tasks(&project), vec!["clean", "createDistributable"]);
    }

    #[test]
    #[serial]
    fn test_doctor_runs_no_wrapper_task() {
        let root = tempfile::tempdir().unwrap();
        let jdk = root.path().join("jdk-21");
        fake_jdk(&jdk, 21, true);
        let project = fake_project(&root);

        let output = winpack()
            .args(["doctor", "--format", "json", "--project-dir"])
            .arg(&project)
            .env("JAVA_HOME", &jdk)
            .output()
            .expect("Failed to execute winpack");

        assert_eq!(output.status.code(), Some(0));
        assert!(tasks(&project).is_empty());

        let report = json(&output.stdout);
        assert_eq!(report["status"], "succeeded");
        assert_eq!(report["toolchain"]["version"]["major"], 21);
        assert_eq!(report["java_home"]["aliased"], false);
    }
}
