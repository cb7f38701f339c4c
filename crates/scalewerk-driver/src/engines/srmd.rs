// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SRMD NCNN Vulkan.

use scalewerk_core::error::{DriverError, Result};
use scalewerk_core::types::{DriverSettings, HostPlatform, UpscaleRequest};

use crate::engine::{Engine, ModelDirQuirk};
use crate::schema::OptionSpec;

const SCHEMA: &[OptionSpec] = &[
    OptionSpec::switch("v", "verbose output"),
    OptionSpec::int_range("n", -1, 10, "denoise level"),
    OptionSpec::int_range("s", 2, 4, "upscale ratio"),
    OptionSpec::int("t", "tile size (>=32)"),
    OptionSpec::text("m", "srmd model path"),
    OptionSpec::int("g", "gpu device to use"),
    OptionSpec::text("j", "thread count for load/proc/save"),
    OptionSpec::switch("x", "enable tta mode"),
];

/// `srmd-ncnn-vulkan`: single-letter flags, integer ratio only.
#[derive(Debug, Default, Clone, Copy)]
pub struct SrmdNcnnVulkan;

impl Engine for SrmdNcnnVulkan {
    fn name(&self) -> &'static str {
        "srmd_ncnn_vulkan"
    }

    fn schema(&self) -> &'static [OptionSpec] {
        SCHEMA
    }

    fn request_keys(&self) -> &'static [&'static str] {
        &["i", "o"]
    }

    fn apply_request(&self, settings: &mut DriverSettings, request: &UpscaleRequest) -> Result<()> {
        let ratio = request
            .scale
            .ratio_value()
            .ok_or_else(|| DriverError::UnsupportedScale {
                engine: self.name().to_owned(),
                scale: request.scale.to_string(),
            })?;

        settings.insert("i", request.input.as_path());
        settings.insert("o", request.output.as_path());
        settings.set("s", Some(ratio));
        Ok(())
    }

    // Without -m the engine loads models from the current directory. Only
    // Windows builds have needed this; other hosts are left alone.
    fn model_dir_quirk(&self) -> Option<ModelDirQuirk> {
        Some(ModelDirQuirk {
            option: "m",
            platform: HostPlatform::Windows,
        })
    }
}
