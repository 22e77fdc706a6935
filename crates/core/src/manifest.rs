// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static description of one application: what to run and how slaves reach it.

use std::path::PathBuf;

/// Everything an engine needs to spawn and address slaves for one application.
///
/// A `Manifest` is a plain value — parsing it from a config file on disk is
/// the caller's concern, not this crate's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Name the application is registered under.
    pub app_name: String,
    /// Unix-domain socket path the engine's acceptor binds to.
    pub listen: PathBuf,
    /// Executable a slave process is spawned from.
    pub executable: PathBuf,
    /// Extra arguments passed to `executable`.
    pub args: Vec<String>,
    /// Extra environment variables set on the spawned process.
    pub env: Vec<(String, String)>,
}

impl Manifest {
    pub fn new(
        app_name: impl Into<String>,
        listen: impl Into<PathBuf>,
        executable: impl Into<PathBuf>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            listen: listen.into(),
            executable: executable.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
