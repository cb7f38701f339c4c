// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The per-engine seam: an option schema plus the mapping from an upscale
// request onto settings keys. Everything else is shared.

use std::ffi::OsString;

use scalewerk_core::error::Result;
use scalewerk_core::types::{DriverSettings, HostPlatform, UpscaleRequest};

use crate::schema::{self, OptionSpec};

/// Working-directory workaround for engines that look up their model files
/// relative to the current directory.
///
/// When `option` is omitted and the host is `platform`, the engine is started
/// inside the executable's folder. This only applies where it is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDirQuirk {
    /// Settings key that names a custom model directory.
    pub option: &'static str,
    pub platform: HostPlatform,
}

/// An external upscaling executable.
pub trait Engine {
    /// Config section name, also used as the log prefix.
    fn name(&self) -> &'static str;

    /// Options accepted from config and the command line.
    fn schema(&self) -> &'static [OptionSpec];

    /// Keys every call overwrites (input/output paths). Accepted in config
    /// without validation since they never survive to the command line.
    fn request_keys(&self) -> &'static [&'static str];

    /// Write the call's input, output, scale and extras into `settings`.
    fn apply_request(&self, settings: &mut DriverSettings, request: &UpscaleRequest) -> Result<()>;

    fn model_dir_quirk(&self) -> Option<ModelDirQuirk> {
        None
    }

    /// Parse CLI-style option tokens against this engine's schema.
    fn parse_arguments<I, T>(&self, args: I) -> Result<DriverSettings>
    where
        Self: Sized,
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        schema::parse(self.name(), self.schema(), args)
    }

    /// Check a settings section (usually from a config file) against the schema.
    fn validate(&self, settings: &DriverSettings) -> Result<()> {
        schema::validate(self.name(), self.schema(), settings, self.request_keys())
    }
}
