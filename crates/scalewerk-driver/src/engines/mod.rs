// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Supported engines.

pub mod srmd;
pub mod waifu2x;

pub use srmd::SrmdNcnnVulkan;
pub use waifu2x::Waifu2xCaffe;
