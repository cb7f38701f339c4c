// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scalewerk Driver — turns engine settings plus a per-call upscale request
// into an argument vector and starts the external engine.  Each engine only
// declares its option schema and request mapping; parsing, validation,
// rendering, logging and spawning are shared.

pub mod argv;
pub mod driver;
pub mod engine;
pub mod engines;
pub mod log;
pub mod schema;
pub mod spawn;

pub use driver::Driver;
pub use engine::{Engine, ModelDirQuirk};
pub use engines::{SrmdNcnnVulkan, Waifu2xCaffe};
pub use log::{CommandLog, TracingLog, WriterLog};
pub use schema::{OptionKind, OptionSpec};
pub use spawn::Invocation;
