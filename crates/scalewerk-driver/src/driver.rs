// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Generic engine driver.
//
// A `Driver` owns one engine's static settings.  Every upscale call clones
// them, layers the request on top, renders the argument vector and starts
// the engine.  The stored settings are never mutated, so calls cannot leak
// into each other and one driver can be shared between threads.

use std::path::{Path, PathBuf};
use std::process::Child;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use scalewerk_core::config::DriverConfig;
use scalewerk_core::error::{DriverError, Result};
use scalewerk_core::types::{DriverSettings, EXECUTABLE_KEY, HostPlatform, UpscaleRequest};

use crate::argv;
use crate::engine::Engine;
use crate::log::{CommandLog, TracingLog};
use crate::spawn::Invocation;

/// Invocation wrapper for one external engine.
pub struct Driver<E> {
    engine: E,
    settings: DriverSettings,
    log: Arc<dyn CommandLog>,
    platform: HostPlatform,
}

impl<E: Engine> Driver<E> {
    /// Wrap `settings` as-is. Use [`Driver::from_config`] to validate them.
    pub fn new(engine: E, settings: DriverSettings) -> Self {
        Self {
            engine,
            settings,
            log: Arc::new(TracingLog),
            platform: HostPlatform::current(),
        }
    }

    /// Build a driver from the engine's section of a config file, checking
    /// every option against the engine schema.
    pub fn from_config(engine: E, config: &DriverConfig) -> Result<Self> {
        let section = config.section(engine.name()).ok_or_else(|| {
            DriverError::Config(format!("no `{}` section in driver config", engine.name()))
        })?;
        engine.validate(section)?;
        info!(engine = engine.name(), options = section.len(), "driver settings validated");
        Ok(Self::new(engine, section.clone()))
    }

    /// Route launch lines to a different sink.
    pub fn with_log(mut self, log: Arc<dyn CommandLog>) -> Self {
        self.log = log;
        self
    }

    /// Override host detection for platform-specific workarounds.
    pub fn with_platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Mutable access to the static settings, e.g. to layer extra options
    /// parsed from the command line.
    pub fn settings_mut(&mut self) -> &mut DriverSettings {
        &mut self.settings
    }

    /// Resolve the exact command for `request` without starting anything.
    pub fn prepare(&self, request: &UpscaleRequest) -> Result<Invocation> {
        let mut settings = self.settings.clone();
        self.engine.apply_request(&mut settings, request)?;

        let working_dir = self.working_dir_for(&settings);

        let program = settings
            .take_executable()
            .ok_or_else(|| DriverError::MissingExecutable(self.engine.name().to_owned()))?;

        let mut argv = vec![program];
        argv.extend(argv::render_options(&settings));

        debug!(engine = self.engine.name(), tokens = argv.len(), "argument vector built");
        Ok(Invocation { argv, working_dir })
    }

    /// Start the engine for `request` and return immediately.
    ///
    /// The engine's own exit status is the caller's to check.
    #[instrument(skip_all, fields(engine = self.engine.name(), input = %request.input.display()))]
    pub fn upscale(&self, request: &UpscaleRequest) -> Result<Child> {
        let invocation = self.prepare(request)?;
        self.log
            .record(self.engine.name(), std::process::id(), &invocation.shell_command());
        invocation.spawn()
    }

    /// Executable's parent folder when the engine's model-directory
    /// workaround applies to this platform and configuration.
    fn working_dir_for(&self, settings: &DriverSettings) -> Option<PathBuf> {
        let quirk = self.engine.model_dir_quirk()?;
        if quirk.platform != self.platform || settings.is_present(quirk.option) {
            return None;
        }

        let exe = settings.get(EXECUTABLE_KEY)?.to_string();
        let parent = Path::new(&exe).parent()?;
        if parent.as_os_str().is_empty() {
            return None;
        }
        debug!(
            engine = self.engine.name(),
            dir = %parent.display(),
            "no model directory configured, running engine from its own folder"
        );
        Some(parent.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use scalewerk_core::types::{OptionValue, Scale};

    use crate::engines::{SrmdNcnnVulkan, Waifu2xCaffe};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, u32, String)>>);

    impl CommandLog for Recorder {
        fn record(&self, engine: &str, pid: u32, command: &str) {
            self.0
                .lock()
                .unwrap()
                .push((engine.to_owned(), pid, command.to_owned()));
        }
    }

    fn srmd(settings: &[(&str, Option<OptionValue>)]) -> Driver<SrmdNcnnVulkan> {
        let settings = settings.iter().cloned().collect();
        Driver::new(SrmdNcnnVulkan, settings).with_platform(HostPlatform::Linux)
    }

    #[test]
    fn request_overrides_static_scale() {
        let driver = srmd(&[
            ("path", Some("/bin/engine".into())),
            ("s", Some(OptionValue::Int(2))),
        ]);
        let inv = driver
            .prepare(&UpscaleRequest::new("/in", "/out", Scale::Ratio(4.0)))
            .unwrap();
        assert_eq!(inv.argv, ["/bin/engine", "-i", "/in", "-o", "/out", "-s", "4"]);
        assert_eq!(inv.working_dir, None);
    }

    #[test]
    fn static_options_keep_order_and_omissions_drop_out() {
        let driver = srmd(&[
            ("path", Some("/opt/srmd/srmd-ncnn-vulkan".into())),
            ("v", Some(OptionValue::Switch(false))),
            ("n", Some(OptionValue::Int(3))),
            ("t", None),
            ("m", None),
            ("g", Some(OptionValue::Int(0))),
            ("x", Some(OptionValue::Switch(true))),
        ]);
        let inv = driver
            .prepare(&UpscaleRequest::new("/frames", "/upscaled", Scale::Ratio(2.0)))
            .unwrap();
        assert_eq!(
            inv.argv,
            [
                "/opt/srmd/srmd-ncnn-vulkan",
                "-n",
                "3",
                "-g",
                "0",
                "-x",
                "-i",
                "/frames",
                "-o",
                "/upscaled",
                "-s",
                "2",
            ]
        );
    }

    #[test]
    fn calls_do_not_leak_into_each_other() {
        let driver = srmd(&[
            ("path", Some("/bin/engine".into())),
            ("g", Some(OptionValue::Int(1))),
        ]);
        let first = driver
            .prepare(&UpscaleRequest::new("/a", "/a_out", Scale::Ratio(2.0)))
            .unwrap();
        let second = driver
            .prepare(&UpscaleRequest::new("/b", "/b_out", Scale::Ratio(3.0)))
            .unwrap();

        assert_eq!(first.argv, ["/bin/engine", "-g", "1", "-i", "/a", "-o", "/a_out", "-s", "2"]);
        assert_eq!(second.argv, ["/bin/engine", "-g", "1", "-i", "/b", "-o", "/b_out", "-s", "3"]);
        assert_eq!(driver.settings().len(), 2);
        assert!(driver.settings().contains_key(EXECUTABLE_KEY));
    }

    #[test]
    fn missing_path_is_reported() {
        let driver = srmd(&[("n", Some(OptionValue::Int(1)))]);
        let err = driver
            .prepare(&UpscaleRequest::new("/in", "/out", Scale::Ratio(2.0)))
            .unwrap_err();
        assert!(matches!(err, DriverError::MissingExecutable(name) if name == "srmd_ncnn_vulkan"));
    }

    #[test]
    fn windows_without_model_dir_runs_from_exe_folder() {
        let driver = srmd(&[
            ("path", Some("/opt/srmd/srmd-ncnn-vulkan".into())),
            ("m", None),
        ])
        .with_platform(HostPlatform::Windows);
        let inv = driver
            .prepare(&UpscaleRequest::new("/in", "/out", Scale::Ratio(2.0)))
            .unwrap();
        assert_eq!(inv.working_dir(), Some(Path::new("/opt/srmd")));
    }

    #[test]
    fn model_dir_or_other_platform_keeps_working_dir() {
        let with_model = srmd(&[
            ("path", Some("/opt/srmd/srmd-ncnn-vulkan".into())),
            ("m", Some("/opt/models/srmd".into())),
        ])
        .with_platform(HostPlatform::Windows);
        let request = UpscaleRequest::new("/in", "/out", Scale::Ratio(2.0));
        assert_eq!(with_model.prepare(&request).unwrap().working_dir, None);

        for platform in [HostPlatform::Linux, HostPlatform::MacOs, HostPlatform::Other] {
            let driver = srmd(&[("path", Some("/opt/srmd/srmd-ncnn-vulkan".into()))])
                .with_platform(platform);
            assert_eq!(driver.prepare(&request).unwrap().working_dir, None);
        }
    }

    #[test]
    fn engines_without_quirk_never_change_working_dir() {
        let mut settings = DriverSettings::new();
        settings.insert("path", "C:/waifu2x-caffe/waifu2x-caffe-cui.exe");
        settings.set("model_dir", None);
        let driver = Driver::new(Waifu2xCaffe, settings).with_platform(HostPlatform::Windows);
        let inv = driver
            .prepare(&UpscaleRequest::new("C:/in", "C:/out", Scale::Ratio(2.0)))
            .unwrap();
        assert_eq!(inv.working_dir, None);
    }

    #[test]
    fn from_config_validates_section() {
        let config: DriverConfig = serde_json::from_str(
            r#"{"srmd_ncnn_vulkan": {"path": "/opt/srmd/srmd-ncnn-vulkan", "i": null, "o": null, "n": 12}}"#,
        )
        .unwrap();
        assert!(matches!(
            Driver::from_config(SrmdNcnnVulkan, &config),
            Err(DriverError::Usage(_))
        ));

        let config: DriverConfig = serde_json::from_str(
            r#"{"srmd_ncnn_vulkan": {"path": "/opt/srmd/srmd-ncnn-vulkan", "i": null, "n": 2, "x": true}}"#,
        )
        .unwrap();
        let driver = Driver::from_config(SrmdNcnnVulkan, &config).unwrap();
        assert_eq!(driver.settings().get("n"), Some(&OptionValue::Int(2)));

        assert!(matches!(
            Driver::from_config(Waifu2xCaffe, &config),
            Err(DriverError::Config(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn upscale_logs_then_spawns() {
        let recorder = Arc::new(Recorder::default());
        let driver = srmd(&[("path", Some("true".into()))]).with_log(recorder.clone());

        let mut child = driver
            .upscale(&UpscaleRequest::new("/in dir", "/out", Scale::Ratio(2.0)))
            .unwrap();
        assert!(child.wait().unwrap().success());

        let lines = recorder.0.lock().unwrap();
        assert_eq!(lines.len(), 1);
        let (engine, pid, command) = &lines[0];
        assert_eq!(engine, "srmd_ncnn_vulkan");
        assert_eq!(*pid, std::process::id());
        assert_eq!(command, "true -i '/in dir' -o /out -s 2");
    }

    #[test]
    fn upscale_surfaces_spawn_failure() {
        let recorder = Arc::new(Recorder::default());
        let driver = srmd(&[("path", Some("/nonexistent/srmd-ncnn-vulkan".into()))])
            .with_log(recorder.clone());
        let err = driver
            .upscale(&UpscaleRequest::new("/in", "/out", Scale::Ratio(2.0)))
            .unwrap_err();
        assert!(matches!(err, DriverError::Spawn { .. }));
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }
}
