//! Provisioning orchestrator.
//!
//! [`Installer`] owns the whole run state — operation log, resolved vendor
//! manifest, critical-stop flag, collected user inputs, and the
//! interactive input collaborator — so multiple independent runs can
//! coexist in one process. Every public operation normalizes its inputs,
//! resolves vendor paths, performs a guarded filesystem primitive, and
//! narrates start and outcome through the operation log.
//!
//! # Failure protocol
//!
//! An operation's first internal error stops its remaining steps and is
//! recorded as a `failed, cause <msg> !` log line. What happens next is
//! the critical-stop decision: with the policy enabled (the default) the
//! log additionally receives a `CRITICAL STOP` block and the operation
//! returns [`Err(CriticalStop)`](CriticalStop), after which the caller
//! must not run further operations; with it disabled the operation
//! returns `Ok(())` and the run continues.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{CriticalStop, OpError};
use crate::fsops;
use crate::log::OperationLog;
use crate::manifest::VendorManifest;
use crate::path::{normalize, normalize_dir};
use crate::prompt::{Prompt, StdinPrompt};

/// Caller-supplied content transform run on file bytes before writing.
///
/// Any error it returns is surfaced through the normal failure protocol
/// with the transform's own message as the cause.
pub type Transform = dyn Fn(&[u8]) -> anyhow::Result<Vec<u8>>;

/// One-shot provisioning run.
///
/// Construct one per run, point it at a vendor manifest with
/// [`set_manifest`](Self::set_manifest), then execute operations. The
/// accumulated log is available at any time through
/// [`log_text`](Self::log_text).
pub struct Installer {
    log: OperationLog,
    manifest: Option<VendorManifest>,
    critical_stop: bool,
    user_inputs: HashMap<String, String>,
    prompt: Box<dyn Prompt>,
}

impl fmt::Debug for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installer")
            .field("critical_stop", &self.critical_stop)
            .field("manifest", &self.manifest)
            .field("user_inputs", &self.user_inputs)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl Default for Installer {
    fn default() -> Self {
        Self::new()
    }
}

impl Installer {
    /// Create an installer echoing its log to standard output, with the
    /// critical-stop policy enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::with_log(OperationLog::new())
    }

    /// Create an installer with live echo disabled from the start.
    #[must_use]
    pub fn quiet() -> Self {
        let mut log = OperationLog::new();
        log.disable_echo();
        Self::with_log(log)
    }

    /// Create an installer around a caller-supplied operation log (e.g.
    /// one with a capturing echo sink).
    #[must_use]
    pub fn with_log(log: OperationLog) -> Self {
        Self {
            log,
            manifest: None,
            critical_stop: true,
            user_inputs: HashMap::new(),
            prompt: Box::new(StdinPrompt),
        }
    }

    /// Replace the interactive input collaborator.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Box<dyn Prompt>) -> Self {
        self.prompt = prompt;
        self
    }

    // -----------------------------------------------------------------------
    // Run state
    // -----------------------------------------------------------------------

    /// Stop converting failures into run aborts; failures are still
    /// logged, execution continues.
    pub const fn disable_critical_stop(&mut self) {
        self.critical_stop = false;
    }

    /// Convert any operation failure into an immediate abort of the run
    /// (the default).
    pub const fn enable_critical_stop(&mut self) {
        self.critical_stop = true;
    }

    /// Whether a failure aborts the whole run.
    #[must_use]
    pub const fn is_critical_stop_enabled(&self) -> bool {
        self.critical_stop
    }

    /// The operation log.
    #[must_use]
    pub const fn log(&self) -> &OperationLog {
        &self.log
    }

    /// The operation log, mutably (echo toggles live here).
    pub const fn log_mut(&mut self) -> &mut OperationLog {
        &mut self.log
    }

    /// The full accumulated log text, in append order.
    #[must_use]
    pub fn log_text(&self) -> &str {
        self.log.text()
    }

    /// Last accepted answer stored under `key` by
    /// [`ask_for`](Self::ask_for), if any.
    #[must_use]
    pub fn user_input(&self, key: &str) -> Option<&str> {
        self.user_inputs.get(key).map(String::as_str)
    }

    // -----------------------------------------------------------------------
    // Manifest
    // -----------------------------------------------------------------------

    /// Load the vendor manifest source roots are resolved from.
    ///
    /// Required before [`file`](Self::file) / [`dir`](Self::dir); loading
    /// is itself a logged operation.
    ///
    /// # Errors
    ///
    /// Returns [`CriticalStop`] when loading fails and the critical-stop
    /// policy is enabled.
    pub fn set_manifest(&mut self, uri: &str) -> Result<(), CriticalStop> {
        self.log.begin(&format!(" => will use composer: {uri} ... "));
        match VendorManifest::load(uri) {
            Ok(manifest) => {
                self.manifest = Some(manifest);
                self.log.succeed();
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    fn vendor_root(&self, vendor_app: &str) -> Result<&str, OpError> {
        self.manifest
            .as_ref()
            .ok_or_else(|| {
                OpError::Configuration(
                    "composer not defined, use `set_manifest(...)`".to_string(),
                )
            })?
            .resolve(vendor_app)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Create `dir` and any missing parents.
    ///
    /// Logs `already exists` and performs no filesystem mutation when the
    /// directory is already present.
    ///
    /// # Errors
    ///
    /// Returns [`CriticalStop`] when a prefix of the chain exists as a
    /// non-directory and the critical-stop policy is enabled.
    pub fn make_dir(&mut self, dir: &str) -> Result<(), CriticalStop> {
        self.log.begin(&format!(" => will create empty dir: {dir} ... "));

        let probe = Path::new(dir);
        if probe.exists() && probe.is_dir() {
            self.log.line("already exists");
            return Ok(());
        }
        let result = fsops::make_dir_chain(dir);
        self.finish(result)
    }

    /// Install the directory `source` from `vendor_app` into
    /// `destination`, mirroring it exactly (the destination is reset
    /// first, never merged into).
    ///
    /// # Errors
    ///
    /// Returns [`CriticalStop`] under the enabled policy when `source` or
    /// `destination` is empty, the app is unknown, or the source is
    /// missing or not a directory.
    pub fn dir(
        &mut self,
        vendor_app: &str,
        source: &str,
        destination: &str,
    ) -> Result<(), CriticalStop> {
        self.log.begin(&format!(
            " => will install dir: {source} from app {vendor_app} ... "
        ));
        let result = self.install_dir(vendor_app, source, destination);
        self.finish(result)
    }

    fn install_dir(
        &self,
        vendor_app: &str,
        source: &str,
        destination: &str,
    ) -> Result<(), OpError> {
        if source.is_empty() || destination.is_empty() {
            return Err(OpError::Configuration(
                "nor source, nor destination may be empty - use `.` (dot) instead".to_string(),
            ));
        }
        let source = normalize_dir(source);
        let destination = normalize_dir(destination);
        let source = format!("{}{source}", self.vendor_root(vendor_app)?);
        fsops::copy_tree(&source, &destination)
    }

    /// Install the file `source` from `vendor_app` at `destination`,
    /// optionally passing its bytes through `transform` first.
    ///
    /// The destination's parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`CriticalStop`] under the enabled policy when `source` or
    /// `destination` is empty, the app is unknown, the source file or the
    /// destination's parent directory is missing, or the transform fails.
    pub fn file(
        &mut self,
        vendor_app: &str,
        source: &str,
        destination: &str,
        transform: Option<&Transform>,
    ) -> Result<(), CriticalStop> {
        self.log.begin(&format!(
            " => will install file: {source} from app {vendor_app} ... "
        ));
        let result = self.install_file(vendor_app, source, destination, transform);
        self.finish(result)
    }

    fn install_file(
        &self,
        vendor_app: &str,
        source: &str,
        destination: &str,
        transform: Option<&Transform>,
    ) -> Result<(), OpError> {
        if source.is_empty() || destination.is_empty() {
            return Err(OpError::Configuration(
                "nor source, nor destination may be empty".to_string(),
            ));
        }
        let source = normalize(source);
        let destination = normalize(destination);
        let source = format!("{}{source}", self.vendor_root(vendor_app)?);

        if !Path::new(&source).exists() {
            return Err(OpError::NotFound("source file not found".to_string()));
        }
        let mut contents = fs::read(&source).map_err(|err| OpError::io(&source, err))?;

        if let Some(transform) = transform {
            contents = transform(&contents).map_err(|err| OpError::Transform(err.to_string()))?;
        }

        if let Some((parent, _)) = destination.rsplit_once('/')
            && !Path::new(parent).exists()
        {
            return Err(OpError::NotFound("destination dir does not exist".to_string()));
        }
        fs::write(&destination, contents).map_err(|err| OpError::io(&destination, err))
    }

    /// Like [`file`](Self::file), but only when `destination` does not
    /// exist yet; otherwise a `will NOT install` line is logged and
    /// nothing fails.
    ///
    /// # Errors
    ///
    /// Inherits [`file`](Self::file)'s failures when it does delegate.
    pub fn file_ifne(
        &mut self,
        vendor_app: &str,
        source: &str,
        destination: &str,
        transform: Option<&Transform>,
    ) -> Result<(), CriticalStop> {
        let destination = normalize(destination);
        if !Path::new(&destination).exists() {
            return self.file(vendor_app, source, &destination, transform);
        }
        self.log.line(&format!(
            " => will NOT install file: {source} from app {vendor_app} cause file already exists"
        ));
        Ok(())
    }

    /// Overwrite `uri` with `contents`, but only when a file already
    /// exists there; when absent a `will NOT set contents` line is logged
    /// and nothing fails.
    ///
    /// # Errors
    ///
    /// Returns [`CriticalStop`] under the enabled policy when `uri`
    /// exists but is not a plain file.
    pub fn set_file_contents_ife(
        &mut self,
        uri: &str,
        contents: &[u8],
    ) -> Result<(), CriticalStop> {
        if !Path::new(uri).exists() {
            self.log.line(&format!(
                " => will NOT set contents of a file: {uri} cause file does not exist"
            ));
            return Ok(());
        }
        self.log.begin(&format!(" => will set contents of a file: {uri} ... "));
        let result = fsops::write_file_if_exists(uri, contents).map(|_| ());
        self.finish(result)
    }

    /// Create `uri` with `contents`, but only when no file exists there
    /// yet; when a file is already present a `will NOT set contents` line
    /// is logged and nothing fails.
    ///
    /// # Errors
    ///
    /// Returns [`CriticalStop`] under the enabled policy when `uri` is
    /// occupied by something other than a plain file.
    pub fn set_file_contents_ifne(
        &mut self,
        uri: &str,
        contents: &[u8],
    ) -> Result<(), CriticalStop> {
        let probe = Path::new(uri);
        if probe.exists() && probe.is_file() {
            self.log.line(&format!(
                " => will NOT set contents of a file: {uri} cause file already exists"
            ));
            return Ok(());
        }
        self.log.begin(&format!(" => will set contents of a file: {uri} ... "));
        let result = fsops::write_file_if_absent(uri, contents).map(|_| ());
        self.finish(result)
    }

    /// Delete everything under `dir`, leaving the directory itself
    /// present but empty.
    ///
    /// # Errors
    ///
    /// Returns [`CriticalStop`] under the enabled policy when `dir` does
    /// not exist.
    pub fn empty_dir_recursively(&mut self, dir: &str) -> Result<(), CriticalStop> {
        self.log
            .begin(&format!(" => will recursively empty a dir: {dir} ... "));
        let result = fsops::empty_tree(dir);
        self.finish(result)
    }

    /// Ask the operator for one line of input, re-asking until `validator`
    /// accepts it (absent validator accepts anything).
    ///
    /// The accepted answer is stored under `key` for later retrieval via
    /// [`user_input`](Self::user_input) and returned. On each rejection
    /// the optional `on_failure` hint is logged before re-asking.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the input collaborator; validation
    /// rejection is not an error.
    pub fn ask_for(
        &mut self,
        key: &str,
        prompt: &str,
        validator: Option<&dyn Fn(&str) -> bool>,
        on_failure: Option<&str>,
    ) -> io::Result<String> {
        loop {
            self.log.line("");
            let input = self.prompt.read_line(prompt)?;

            if let Some(validator) = validator
                && !validator(&input)
            {
                if let Some(hint) = on_failure {
                    self.log.begin(hint);
                }
                continue;
            }

            self.user_inputs.insert(key.to_string(), input.clone());
            return Ok(input);
        }
    }

    // -----------------------------------------------------------------------
    // Failure protocol
    // -----------------------------------------------------------------------

    fn finish(&mut self, result: Result<(), OpError>) -> Result<(), CriticalStop> {
        match result {
            Ok(()) => {
                self.log.succeed();
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: OpError) -> Result<(), CriticalStop> {
        self.log.fail(&err);
        if self.critical_stop {
            self.log.line("[NL]CRITICAL STOP[NL][NL]");
            return Err(CriticalStop::new(err));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted prompt consuming queued responses in FIFO order.
    struct ScriptedPrompt {
        responses: VecDeque<String>,
    }

    impl ScriptedPrompt {
        fn new(responses: &[&str]) -> Self {
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

    fn quiet() -> Installer {
        Installer::quiet()
    }

    #[test]
    fn critical_stop_toggle() {
        let mut ins = quiet();
        assert!(ins.is_critical_stop_enabled());
        ins.disable_critical_stop();
        assert!(!ins.is_critical_stop_enabled());
        ins.enable_critical_stop();
        assert!(ins.is_critical_stop_enabled());
    }

    #[test]
    fn echo_toggle_through_log_accessor() {
        let mut ins = Installer::new();
        assert!(ins.log().is_echo_enabled());
        ins.log_mut().disable_echo();
        assert!(!ins.log().is_echo_enabled());
        ins.log_mut().enable_echo();
        assert!(ins.log().is_echo_enabled());
    }

    #[test]
    fn quiet_installer_starts_with_echo_disabled() {
        let ins = quiet();
        assert!(!ins.log().is_echo_enabled());
    }

    #[test]
    fn user_input_is_none_before_asking() {
        let ins = quiet();
        assert_eq!(ins.user_input("anything"), None);
    }

    #[test]
    fn ask_for_accepts_without_validator() {
        let mut ins = quiet().with_prompt(Box::new(ScriptedPrompt::new(&["5"])));
        let answer = ins.ask_for("test", "Write `5`: ", None, None).unwrap();
        assert_eq!(answer, "5");
        assert_eq!(ins.user_input("test"), Some("5"));
    }

    #[test]
    fn ask_for_loops_until_validator_accepts() {
        let mut ins = quiet().with_prompt(Box::new(ScriptedPrompt::new(&["5", "10"])));
        let answer = ins
            .ask_for(
                "n",
                "Enter 10: ",
                Some(&|input: &str| input == "10"),
                Some("Not quite!"),
            )
            .unwrap();
        assert_eq!(answer, "10");
        assert_eq!(ins.user_input("n"), Some("10"));
        // Blank line before each prompt, hint after the rejected answer.
        assert_eq!(ins.log_text(), "\nNot quite!\n");
    }

    #[test]
    fn ask_for_overwrites_previous_answer() {
        let mut ins = quiet().with_prompt(Box::new(ScriptedPrompt::new(&["a", "b"])));
        ins.ask_for("k", "? ", None, None).unwrap();
        ins.ask_for("k", "? ", None, None).unwrap();
        assert_eq!(ins.user_input("k"), Some("b"));
    }

    #[test]
    fn operations_before_manifest_are_configuration_failures() {
        let mut ins = quiet();
        ins.disable_critical_stop();
        ins.file("Vendor\\App", "a", "b", None).unwrap();
        assert!(
            ins.log_text()
                .contains("failed, cause composer not defined, use `set_manifest(...)` !")
        );
    }
}
