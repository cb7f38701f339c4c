// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scalewerk.

use thiserror::Error;

/// Top-level error type for all driver operations.
#[derive(Debug, Error)]
pub enum DriverError {
    // -- Settings / configuration --
    /// Option parsing rejected a token. Carries the rendered usage message.
    #[error("{0}")]
    Usage(String),

    /// `--help` was requested. Carries the rendered help text.
    #[error("{0}")]
    Help(String),

    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    #[error("invalid driver configuration: {0}")]
    Config(String),

    // -- Invocation --
    #[error("no executable path configured for {0}")]
    MissingExecutable(String),

    #[error("{engine} does not accept scale {scale}")]
    UnsupportedScale { engine: String, scale: String },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DriverError>;
