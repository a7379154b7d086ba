// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed vendor-app fixture and a scripted
// prompt so each integration test can set up an isolated provisioning run
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use scaffolder::installer::Installer;
use scaffolder::log::OperationLog;
use scaffolder::prompt::Prompt;

/// Initialise a tracing subscriber for the test binary (idempotent).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An isolated vendor-app source tree backed by a [`tempfile::TempDir`].
///
/// Layout created under the temp root:
///
/// - `composer.json`          — maps `Vendor\App\` to `<root>/src/`
/// - `src/Exception.php`      — a single installable file
/// - `src/Lib/Helper.php`
/// - `src/Lib/deep/Deep.php`  — nested tree for directory installs
///
/// The directory is automatically deleted when dropped.
pub struct VendorFixture {
    tmp: tempfile::TempDir,
}

impl VendorFixture {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = tmp.path();

        fs::create_dir_all(root.join("src/Lib/deep")).expect("create src tree");
        fs::write(root.join("src/Exception.php"), b"<?php class Exception {}\n")
            .expect("write Exception.php");
        fs::write(root.join("src/Lib/Helper.php"), b"<?php class Helper {}\n")
            .expect("write Helper.php");
        fs::write(root.join("src/Lib/deep/Deep.php"), b"<?php class Deep {}\n")
            .expect("write Deep.php");

        let composer = serde_json::json!({
            "name": "vendor/app",
            "autoload": {
                "psr-4": {
                    "Vendor\\App\\": format!("{}/src/", root.display()),
                }
            }
        });
        fs::write(
            root.join("composer.json"),
            serde_json::to_vec_pretty(&composer).expect("serialize composer"),
        )
        .expect("write composer.json");

        Self { tmp }
    }

    /// Absolute path of the fixture root, slash form.
    pub fn root(&self) -> String {
        self.tmp.path().display().to_string()
    }

    /// Absolute path of `rel` under the fixture root.
    pub fn path(&self, rel: &str) -> String {
        format!("{}/{rel}", self.root())
    }

    /// Path of the fixture's composer manifest.
    pub fn composer(&self) -> String {
        self.path("composer.json")
    }
}

/// Scripted prompt consuming queued responses in FIFO order.
///
/// Returns an `UnexpectedEof` error when the script runs out, so a test
/// that prompts more often than expected fails loudly.
pub struct ScriptedPrompt {
    responses: VecDeque<String>,
}

impl ScriptedPrompt {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn read_line(&mut self, _prompt: &str) -> io::Result<String> {
        self.responses
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

/// Echo sink capturing everything written to it, cloneable across the
/// installer boundary.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink(Arc<Mutex<Vec<u8>>>);

impl CaptureSink {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().expect("sink lock").clone()).expect("utf-8 echo")
    }
}

impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("sink lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A quiet installer (no echo) for log-content assertions.
pub fn quiet_installer() -> Installer {
    init_tracing();
    let mut log = OperationLog::new();
    log.disable_echo();
    Installer::with_log(log)
}
