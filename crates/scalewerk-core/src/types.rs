// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: option values, ordered driver settings, and the
// per-call upscale request.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{DriverError, Result};

/// Reserved settings key holding the engine executable path.
pub const EXECUTABLE_KEY: &str = "path";

/// A concrete value for one engine option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// `true` renders the bare flag, `false` omits the option.
    Switch(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    /// Whether this value causes the option to be dropped from the command line.
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Switch(false))
    }

    /// Whether this value renders as a flag with no trailing value token.
    pub fn is_bare_flag(&self) -> bool {
        matches!(self, Self::Switch(true))
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Switch(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Switch(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for OptionValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for OptionValue {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&Path> for OptionValue {
    fn from(p: &Path) -> Self {
        Self::Text(p.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for OptionValue {
    fn from(p: PathBuf) -> Self {
        Self::from(p.as_path())
    }
}

/// Ordered option list describing how to invoke one engine.
///
/// Order is part of the contract: entries render in list order. Overriding a
/// key removes the old entry and appends the new one at the end, so static
/// options keep their relative order and per-call overrides follow them.
/// A `None` value means "leave this option out".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct DriverSettings {
    entries: Vec<(String, Option<OptionValue>)>,
}

impl DriverSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// The value stored for `key`, or `None` when absent or explicitly omitted.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Whether `key` would render on the command line.
    pub fn is_present(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_omitted())
    }

    /// Set `key`, superseding any previous entry (see the ordering contract).
    pub fn set(&mut self, key: impl Into<String>, value: Option<OptionValue>) {
        let key = key.into();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, value));
    }

    /// Convenience for `set(key, Some(value.into()))`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.set(key, Some(value.into()));
    }

    /// Remove `key`, returning its entry if it existed.
    pub fn remove(&mut self, key: &str) -> Option<Option<OptionValue>> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Remove the reserved executable entry and return it as a string.
    pub fn take_executable(&mut self) -> Option<String> {
        match self.remove(EXECUTABLE_KEY)? {
            Some(v) if !v.is_omitted() => Some(v.to_string()),
            _ => None,
        }
    }

    /// Layer `other` over `self`: every present value in `other` supersedes
    /// the matching entry here. Omitted values in `other` are ignored.
    pub fn merge(&mut self, other: &DriverSettings) {
        for (key, value) in &other.entries {
            if value.as_ref().is_some_and(|v| !v.is_omitted()) {
                self.set(key.clone(), value.clone());
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&OptionValue>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

impl<K: Into<String>> FromIterator<(K, Option<OptionValue>)> for DriverSettings {
    fn from_iter<I: IntoIterator<Item = (K, Option<OptionValue>)>>(iter: I) -> Self {
        let mut settings = Self::new();
        for (key, value) in iter {
            settings.set(key, value);
        }
        settings
    }
}

impl TryFrom<Map<String, Value>> for DriverSettings {
    type Error = DriverError;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let value = match value {
                Value::Null => None,
                Value::Bool(b) => Some(OptionValue::Switch(b)),
                Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                    (Some(i), _) => Some(OptionValue::Int(i)),
                    (None, Some(x)) => Some(OptionValue::Float(x)),
                    (None, None) => {
                        return Err(DriverError::Config(format!(
                            "option `{key}`: number {n} out of range"
                        )));
                    }
                },
                Value::String(s) => Some(OptionValue::Text(s)),
                Value::Array(_) | Value::Object(_) => {
                    return Err(DriverError::Config(format!(
                        "option `{key}` must be a scalar, null, or boolean"
                    )));
                }
            };
            entries.push((key, value));
        }
        Ok(Self { entries })
    }
}

impl From<DriverSettings> for Map<String, Value> {
    fn from(settings: DriverSettings) -> Self {
        settings
            .entries
            .into_iter()
            .map(|(key, value)| {
                let json = match value {
                    None => Value::Null,
                    Some(OptionValue::Switch(b)) => Value::Bool(b),
                    Some(OptionValue::Int(i)) => Value::Number(i.into()),
                    Some(OptionValue::Float(x)) => {
                        Number::from_f64(x).map_or(Value::Null, Value::Number)
                    }
                    Some(OptionValue::Text(s)) => Value::String(s),
                };
                (key, json)
            })
            .collect()
    }
}

/// Requested output size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Uniform magnification factor.
    Ratio(f64),
    /// Explicit output dimensions in pixels.
    Dimensions { width: u32, height: u32 },
}

impl Scale {
    /// The ratio as an option value. Integral ratios become `Int` so they
    /// render without a fractional part.
    pub fn ratio_value(&self) -> Option<OptionValue> {
        match *self {
            Self::Ratio(r) if r.is_finite() && r.fract() == 0.0 && r.abs() < i64::MAX as f64 => {
                Some(OptionValue::Int(r as i64))
            }
            Self::Ratio(r) => Some(OptionValue::Float(r)),
            Self::Dimensions { .. } => None,
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ratio(r) => write!(f, "{r}x"),
            Self::Dimensions { width, height } => write!(f, "{width}x{height}px"),
        }
    }
}

/// Per-call parameters for one upscale invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct UpscaleRequest {
    /// Input image or directory.
    pub input: PathBuf,
    /// Output image or directory.
    pub output: PathBuf,
    pub scale: Scale,
    /// Output image extension, for engines that take one.
    pub image_format: Option<String>,
    /// Output channel bit depth, for engines that take one.
    pub bit_depth: Option<u32>,
}

impl UpscaleRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, scale: Scale) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            scale,
            image_format: None,
            bit_depth: None,
        }
    }

    pub fn with_image_format(mut self, format: impl Into<String>) -> Self {
        self.image_format = Some(format.into());
        self
    }

    pub fn with_bit_depth(mut self, depth: u32) -> Self {
        self.bit_depth = Some(depth);
        self
    }
}

/// Operating system family, used for engine workarounds that only apply
/// on one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl HostPlatform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}
