//! Desktop app launch.
//!
//! The desktop build lives under a root directory laid out like this:
//!
//! ```text
//! <root>/
//!   out/<App>-<platform>-<arch>/...    packaged binary (after a build)
//!   node_modules/.bin/electron-forge   development runner
//! ```
//!
//! A packaged binary is preferred over the development runner unless
//! development mode is forced. Production launches are fire-and-forget;
//! development launches stay attached and forward the runner's exit code.

use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{LaunchError, Result};

/// Product name of the desktop app, as used in packaged output paths.
pub const APP_NAME: &str = "Concilium";

/// Where the desktop build's launchable artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPaths {
    pub root: PathBuf,
    pub packaged_binary: PathBuf,
    pub dev_runner: PathBuf,
}

/// How the desktop app will be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    /// Run the packaged binary, detached
    Production(PathBuf),
    /// Run through the development runner, attached
    Development(PathBuf),
    /// Nothing launchable was found
    Missing(PathBuf),
}

impl LaunchPaths {
    /// Paths for the platform this binary was built for.
    pub fn resolve(root: &Path) -> Self {
        Self::for_platform(root, std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Paths for an explicit target, given as Rust `OS`/`ARCH` constants.
    pub fn for_platform(root: &Path, os: &str, arch: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            packaged_binary: packaged_binary_path(root, APP_NAME, os, arch),
            dev_runner: root.join("node_modules").join(".bin").join("electron-forge"),
        }
    }

    /// Pick a launch mode from what exists on disk.
    ///
    /// A packaged binary wins unless `force_dev` is set, since the
    /// development runner exists in any source checkout.
    pub fn mode(&self, force_dev: bool) -> LaunchMode {
        if self.packaged_binary.exists() && !force_dev {
            LaunchMode::Production(self.packaged_binary.clone())
        } else if self.dev_runner.exists() {
            LaunchMode::Development(self.dev_runner.clone())
        } else {
            LaunchMode::Missing(self.packaged_binary.clone())
        }
    }
}

/// Location of the packaged desktop binary under `root`.
///
/// Packager output directories use Node's platform and arch names
/// (`darwin`, `win32`, `x64`, `arm64`), so Rust names are translated first.
pub fn packaged_binary_path(root: &Path, app: &str, os: &str, arch: &str) -> PathBuf {
    let arch = node_arch(arch);
    let out = root.join("out");
    match os {
        "macos" => out
            .join(format!("{app}-darwin-{arch}"))
            .join(format!("{app}.app"))
            .join("Contents")
            .join("MacOS")
            .join(app),
        "linux" => out
            .join(format!("{app}-linux-{arch}"))
            .join(app.to_lowercase()),
        _ => out
            .join(format!("{app}-win32-{arch}"))
            .join(format!("{app}.exe")),
    }
}

fn node_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "x64",
        "x86" => "ia32",
        "aarch64" => "arm64",
        "arm" => "arm",
        other => other,
    }
}

/// Default desktop root: the directory holding this executable, or its
/// parent when the executable sits in a `bin/` directory.
pub fn default_root() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().unwrap_or(Path::new("."));
    if dir.file_name().is_some_and(|name| name == "bin") {
        Ok(dir.parent().unwrap_or(dir).to_path_buf())
    } else {
        Ok(dir.to_path_buf())
    }
}

/// Resolve the project directory against `cwd` and check it is a directory.
///
/// `.` and `..` are resolved lexically, so the desktop app never sees them.
pub fn resolve_project_dir(path: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    let dir = match path {
        Some(p) => normalize_lexically(&cwd.join(p)),
        None => normalize_lexically(cwd),
    };

    match std::fs::metadata(&dir) {
        Ok(meta) if meta.is_dir() => Ok(dir),
        Ok(_) => Err(LaunchError::NotADirectory(dir)),
        Err(_) => Err(LaunchError::NotFound(dir)),
    }
}

/// Drop `.` components and fold `..` into its parent without touching the
/// filesystem. `..` at the root stays at the root.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Launch the desktop app for `project_dir` and return the exit code to use.
pub fn launch(paths: &LaunchPaths, project_dir: &Path, force_dev: bool) -> Result<i32> {
    let cwd_arg = format!("--cwd={}", project_dir.display());

    match paths.mode(force_dev) {
        LaunchMode::Production(binary) => {
            let mut cmd = Command::new(&binary);
            cmd.arg(&cwd_arg)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
            detach(&mut cmd);

            let child = cmd.spawn().map_err(|source| LaunchError::Start {
                program: binary.clone(),
                source,
            })?;
            log::debug!("launched {} (pid {})", binary.display(), child.id());
            println!("Concilium launched for {}", project_dir.display());
            Ok(0)
        }
        LaunchMode::Development(runner) => {
            log::debug!("starting development runner {}", runner.display());
            let status = Command::new(&runner)
                .args(["start", "--", &cwd_arg])
                .current_dir(&paths.root)
                .status()
                .map_err(|source| LaunchError::Start {
                    program: runner.clone(),
                    source,
                })?;
            Ok(status.code().unwrap_or(0))
        }
        LaunchMode::Missing(binary) => Err(LaunchError::MissingBinary(binary)),
    }
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn detach(_cmd: &mut Command) {}
