//! Filesystem provisioning engine for one-shot project scaffolding.
//!
//! A consumer project bootstraps files and directories from a named
//! vendor-app source tree, resolved through a composer-style autoload map.
//! Every operation is idempotent where its contract says so, and every
//! attempted action is narrated through an append-only, replayable
//! operation log. A critical-stop policy (enabled by default) converts the
//! first failure into a terminal abort of the whole run.
//!
//! The public API is organised bottom-up:
//!
//! - **[`path`]** — pure slash-normalization helpers
//! - **[`walk`]** — depth-first directory tree enumeration
//! - **[`fsops`]** — idempotent filesystem primitives
//! - **[`manifest`]** — vendor-app key to source-root resolution
//! - **[`log`]** — the append-only operation log
//! - **[`prompt`]** — interactive input boundary
//! - **[`installer`]** — the orchestrator tying it all together
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod error;
pub mod fsops;
pub mod installer;
pub mod log;
pub mod manifest;
pub mod path;
pub mod prompt;
pub mod walk;
