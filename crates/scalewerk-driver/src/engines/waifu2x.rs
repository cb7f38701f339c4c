// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// waifu2x-caffe (CUI build).

use scalewerk_core::error::Result;
use scalewerk_core::types::{DriverSettings, Scale, UpscaleRequest};

use crate::engine::Engine;
use crate::schema::OptionSpec;

const SCHEMA: &[OptionSpec] = &[
    OptionSpec::int_range("tta", 0, 1, "8x slower and slightly high quality").alias('t'),
    OptionSpec::int("gpu", "gpu device no"),
    OptionSpec::int("batch_size", "input batch size").alias('b'),
    OptionSpec::int("crop_h", "input image split size(height)"),
    OptionSpec::int("crop_w", "input image split size(width)"),
    OptionSpec::int("crop_size", "input image split size").alias('c'),
    OptionSpec::int("output_depth", "output image channel depth bit").alias('d'),
    OptionSpec::int("output_quality", "output image quality").alias('q'),
    OptionSpec::choice("process", &["cpu", "gpu", "cudnn"], "process mode").alias('p'),
    OptionSpec::text("model_dir", "path to custom model directory (no trailing /)"),
    OptionSpec::int("scale_height", "custom scale height").alias('h'),
    OptionSpec::int("scale_width", "custom scale width").alias('w'),
    OptionSpec::float("scale_ratio", "custom scale ratio").alias('s'),
    OptionSpec::int_range("noise_level", 0, 3, "noise reduction level").alias('n'),
    OptionSpec::choice("mode", &["noise", "scale", "noise_scale"], "image processing mode")
        .alias('m'),
    OptionSpec::text(
        "output_extention",
        "extension of output image files when output_path is (auto) or input_path is a folder",
    )
    .alias('e'),
    OptionSpec::text(
        "input_extention_list",
        "extensions of input image files when input_path is a folder",
    )
    .alias('l'),
];

/// `waifu2x-caffe-cui`: long flags, ratio or explicit output size.
#[derive(Debug, Default, Clone, Copy)]
pub struct Waifu2xCaffe;

impl Engine for Waifu2xCaffe {
    fn name(&self) -> &'static str {
        "waifu2x_caffe"
    }

    fn schema(&self) -> &'static [OptionSpec] {
        SCHEMA
    }

    fn request_keys(&self) -> &'static [&'static str] {
        &["input_path", "output_path"]
    }

    fn apply_request(&self, settings: &mut DriverSettings, request: &UpscaleRequest) -> Result<()> {
        settings.insert("input_path", request.input.as_path());
        settings.insert("output_path", request.output.as_path());

        // Ratio and explicit size are alternatives; drop whichever one the
        // call did not ask for so the engine never sees both.
        match request.scale {
            Scale::Ratio(_) => {
                settings.set("scale_width", None);
                settings.set("scale_height", None);
                settings.set("scale_ratio", request.scale.ratio_value());
            }
            Scale::Dimensions { width, height } => {
                settings.set("scale_ratio", None);
                settings.insert("scale_width", width);
                settings.insert("scale_height", height);
            }
        }

        if let Some(format) = &request.image_format {
            settings.insert("output_extention", format.as_str());
        }
        if let Some(depth) = request.bit_depth {
            settings.insert("output_depth", depth);
        }
        Ok(())
    }
}
