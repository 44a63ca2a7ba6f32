use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use ps5bp_common::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Handle to an external SELF-decryption tool invoked as a subprocess.
///
/// The tool itself (and whether one is even present on the machine running
/// the pipeline) is outside this crate's concern; this type only knows how
/// to shell out to it and judge the result.
#[derive(Debug, Clone)]
pub struct ExternalDecrypter {
    binary: PathBuf,
    timeout: Duration,
}

impl ExternalDecrypter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        ExternalDecrypter {
            binary: binary.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the decrypter against `input`, writing the plain ELF to `output`.
    /// Success requires exit code zero *and* a non-empty output file; either
    /// condition failing, or the process exceeding the configured timeout,
    /// is reported as [`Error::ExternalToolFailure`].
    pub fn decrypt(&self, input: &Path, output: &Path) -> Result<()> {
        let mut child = Command::new(&self.binary)
            .arg("--verbose")
            .arg("--overwrite")
            .arg("--input")
            .arg(input)
            .arg("--output")
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::ExternalToolFailure {
                tool: self.binary.display().to_string(),
                detail: format!("failed to spawn: {e}"),
            })?;

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait().map_err(|e| Error::ExternalToolFailure {
                tool: self.binary.display().to_string(),
                detail: format!("wait failed: {e}"),
            })? {
                break status;
            }
            if started.elapsed() > self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::ExternalToolFailure {
                    tool: self.binary.display().to_string(),
                    detail: format!("timed out after {:?}", self.timeout),
                });
            }
            std::thread::sleep(Duration::from_millis(50));
        };

        if !status.success() {
            return Err(Error::ExternalToolFailure {
                tool: self.binary.display().to_string(),
                detail: format!("exited with {status}"),
            });
        }

        match std::fs::metadata(output) {
            Ok(meta) if meta.len() > 0 => Ok(()),
            Ok(_) => Err(Error::ExternalToolFailure {
                tool: self.binary.display().to_string(),
                detail: "output file is empty".into(),
            }),
            Err(e) => Err(Error::ExternalToolFailure {
                tool: self.binary.display().to_string(),
                detail: format!("output file missing: {e}"),
            }),
        }
    }
}

/// Searches for a `SelfUtil`-style decrypter binary next to the running
/// toolkit, walking up to `max_parent_levels` parent directories from
/// `search_root` and checking a handful of conventional subpaths at each
/// level.
pub fn find_decrypter(search_root: &Path, max_parent_levels: usize) -> Option<PathBuf> {
    let candidates = ["SelfUtil/selfutil_patched.exe", "SelfUtil/bin/Debug/selfutil_patched.exe"];
    let mut dir = Some(search_root);
    for _ in 0..=max_parent_levels {
        let Some(d) = dir else { break };
        for candidate in &candidates {
            let path = d.join(candidate);
            if path.is_file() {
                return Some(path);
            }
        }
        dir = d.parent();
    }
    None
}
