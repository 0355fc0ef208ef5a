//! Package resolver
//!
//! [`PackageResolver`] is the seam between target emission and the package
//! manager. [`VcpkgResolver`] drives a local vcpkg installation; tests use
//! in-memory implementations.

use crate::fragment::ResolvedFragment;
use crate::manifest::{read_baseline, VcpkgManifest};
use crate::{PackageError, Result};
use kiln_config::{Tool, Toolchains};
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, info};

/// One external dependency of one target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRequest {
    /// vcpkg port name
    pub package: String,
    /// Consuming target (replaces the `main` placeholder)
    pub target: String,
    /// vcpkg triplet
    pub triplet: String,
    /// Exact version to pin, if any
    pub version: Option<String>,
}

impl PackageRequest {
    pub fn new(
        package: impl Into<String>,
        target: impl Into<String>,
        triplet: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            target: target.into(),
            triplet: triplet.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: Option<impl Into<String>>) -> Self {
        self.version = version.map(Into::into);
        self
    }
}

/// Materializes a package and reports the build directives to consume it
///
/// Calls are made sequentially: a shared package-manager installation is not
/// safe for concurrent installs.
pub trait PackageResolver {
    fn resolve(&self, request: &PackageRequest) -> Result<ResolvedFragment>;
}

impl<R: PackageResolver + ?Sized> PackageResolver for &R {
    fn resolve(&self, request: &PackageRequest) -> Result<ResolvedFragment> {
        (**self).resolve(request)
    }
}

impl<R: PackageResolver + ?Sized> PackageResolver for Box<R> {
    fn resolve(&self, request: &PackageRequest) -> Result<ResolvedFragment> {
        (**self).resolve(request)
    }
}

/// Resolver backed by a vcpkg installation
pub struct VcpkgResolver {
    toolchains: Toolchains,
    /// Echo vcpkg output while it runs
    echo: bool,
}

impl VcpkgResolver {
    pub fn new(toolchains: Toolchains) -> Self {
        Self {
            toolchains,
            echo: true,
        }
    }

    /// Enable or disable echoing of vcpkg output
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    fn install(&self, request: &PackageRequest) -> Result<(ExitStatus, String)> {
        let vcpkg = self.toolchains.locate(Tool::Vcpkg)?;

        match &request.version {
            Some(version) => {
                let workdir = tempfile::TempDir::new()?;
                let baseline = read_baseline(&checkout_dir(&vcpkg, &self.toolchains.vcpkg_root));
                VcpkgManifest::pinned(&request.package, version, baseline)
                    .write_to(workdir.path())?;

                let mut command = Command::new(&vcpkg);
                command
                    .arg("install")
                    .arg(format!("--triplet={}", request.triplet))
                    .current_dir(workdir.path());
                run_merged(command, self.echo)
            }
            None => {
                let mut command = Command::new(&vcpkg);
                command
                    .arg("install")
                    .arg(format!("{}:{}", request.package, request.triplet));
                if let Some(dir) = vcpkg.parent().filter(|d| !d.as_os_str().is_empty()) {
                    command.current_dir(dir);
                }
                run_merged(command, self.echo)
            }
        }
    }
}

impl PackageResolver for VcpkgResolver {
    fn resolve(&self, request: &PackageRequest) -> Result<ResolvedFragment> {
        info!(
            package = %request.package,
            consumer = %request.target,
            version = request.version.as_deref().unwrap_or("latest"),
            "installing package"
        );

        let (status, output) = self.install(request)?;
        if !status.success() {
            return Err(PackageError::InstallFailed {
                package: request.package.clone(),
                triplet: request.triplet.clone(),
                status: status.to_string(),
            });
        }

        let fragment = ResolvedFragment::extract(&output, &request.target);
        debug!(
            package = %request.package,
            directives = fragment.lines().len(),
            "package resolved"
        );
        Ok(fragment)
    }
}

/// Run `command`, merging stdout and stderr line by line
///
/// Each line is echoed (when enabled) and buffered in the same pass.
pub fn run_merged(mut command: Command, echo: bool) -> Result<(ExitStatus, String)> {
    debug!(command = ?command, "spawning");
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let (tx, rx) = mpsc::channel::<String>();
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_line_reader(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_line_reader(stderr, tx.clone()));
    }
    drop(tx);

    let mut output = String::new();
    for line in rx {
        if echo {
            eprintln!("{}", line);
        }
        output.push_str(&line);
        output.push('\n');
    }

    let joined = join_readers(readers);
    let status = child.wait()?;
    joined?;
    Ok((status, output))
}

/// Directory of the vcpkg checkout that owns `executable`, following symlinks
fn checkout_dir(executable: &Path, fallback: &Path) -> PathBuf {
    fs::canonicalize(executable)
        .ok()
        .and_then(|path| path.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| fallback.to_path_buf())
}

fn join_readers(readers: Vec<thread::JoinHandle<()>>) -> Result<()> {
    let mut failed = false;
    for reader in readers {
        failed |= reader.join().is_err();
    }
    if failed {
        return Err(PackageError::IoError(io::Error::other(
            "output reader thread panicked; process output is incomplete",
        )));
    }
    Ok(())
}

fn spawn_line_reader<R: Read + Send + 'static>(
    stream: R,
    tx: mpsc::Sender<String>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            while matches!(buf.last(), Some(b'\n' | b'\r')) {
                buf.pop();
            }
            let line = String::from_utf8_lossy(&buf).into_owned();
            if tx.send(line).is_err() {
                break;
            }
        }
    })
}
