// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scalewerk — run one external upscaling engine.
//
// Entry point. Initialises logging, loads the driver config, layers any
// trailing engine options over it, starts the engine and forwards its exit
// status.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use scalewerk_core::config::DriverConfig;
use scalewerk_core::error::{DriverError, Result};
use scalewerk_core::types::{DriverSettings, EXECUTABLE_KEY, Scale, UpscaleRequest};
use scalewerk_driver::{Driver, Engine, SrmdNcnnVulkan, Waifu2xCaffe};

#[derive(Debug, Parser)]
#[command(name = "scalewerk", version, about = "Run an external image-upscaling engine")]
struct Cli {
    /// Driver config file [default: $XDG_CONFIG_HOME/scalewerk/drivers.json]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    engine: EngineCommand,
}

#[derive(Debug, Subcommand)]
enum EngineCommand {
    /// SRMD NCNN Vulkan
    Srmd(RunArgs),
    /// waifu2x-caffe
    Waifu2x(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Input image or directory
    #[arg(short, long)]
    input: PathBuf,

    /// Output image or directory
    #[arg(short, long)]
    output: PathBuf,

    /// Scale ratio
    #[arg(short, long, conflicts_with_all = ["width", "height"], required_unless_present_all = ["width", "height"])]
    ratio: Option<f64>,

    /// Output width in pixels (waifu2x only)
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Output height in pixels (waifu2x only)
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Output image extension (waifu2x only)
    #[arg(long)]
    format: Option<String>,

    /// Output bit depth (waifu2x only)
    #[arg(long)]
    depth: Option<u32>,

    /// Engine executable, overriding the config file
    #[arg(long)]
    executable: Option<PathBuf>,

    /// Print the command line instead of running it
    #[arg(long)]
    dry_run: bool,

    /// Engine options, e.g. `-- -n 3 -g 0`
    #[arg(last = true, allow_hyphen_values = true)]
    engine_args: Vec<String>,
}

impl RunArgs {
    fn request(&self) -> UpscaleRequest {
        let scale = match (self.ratio, self.width, self.height) {
            (Some(r), _, _) => Scale::Ratio(r),
            (None, Some(width), Some(height)) => Scale::Dimensions { width, height },
            // clap guarantees a ratio or both dimensions
            _ => Scale::Ratio(2.0),
        };
        UpscaleRequest {
            input: self.input.clone(),
            output: self.output.clone(),
            scale,
            image_format: self.format.clone(),
            bit_depth: self.depth,
        }
    }

    /// Flags given on the command line that SRMD has no option for.
    fn srmd_ignored_flags(&self) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if self.format.is_some() {
            ignored.push("--format");
        }
        if self.depth.is_some() {
            ignored.push("--depth");
        }
        ignored
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(DriverError::Help(text)) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(DriverError::Usage(text)) => {
            eprintln!("{text}");
            ExitCode::from(2)
        }
        Err(e) => {
            error!(error = %e, "upscale failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    match cli.engine {
        EngineCommand::Srmd(args) => {
            for flag in args.srmd_ignored_flags() {
                warn!(flag, "srmd_ncnn_vulkan has no such option, ignoring");
            }
            execute(SrmdNcnnVulkan, &config, &args)
        }
        EngineCommand::Waifu2x(args) => execute(Waifu2xCaffe, &config, &args),
    }
}

/// An explicit path must exist; the default location may be absent.
fn load_config(explicit: Option<&Path>) -> Result<DriverConfig> {
    if let Some(path) = explicit {
        return DriverConfig::load(path);
    }
    let path = DriverConfig::default_path();
    if path.exists() {
        DriverConfig::load(&path)
    } else {
        info!(path = %path.display(), "no driver config found, using command-line options only");
        Ok(DriverConfig::default())
    }
}

fn build_driver<E: Engine>(engine: E, config: &DriverConfig, args: &RunArgs) -> Result<Driver<E>> {
    let mut driver = if config.section(engine.name()).is_some() {
        Driver::from_config(engine, config)?
    } else {
        Driver::new(engine, DriverSettings::new())
    };

    let overlay = driver.engine().parse_arguments(&args.engine_args)?;
    let settings = driver.settings_mut();
    settings.merge(&overlay);
    if let Some(exe) = &args.executable {
        settings.insert(EXECUTABLE_KEY, exe.as_path());
    }
    Ok(driver)
}

fn execute<E: Engine>(engine: E, config: &DriverConfig, args: &RunArgs) -> Result<ExitCode> {
    let driver = build_driver(engine, config, args)?;
    let request = args.request();

    if args.dry_run {
        let invocation = driver.prepare(&request)?;
        if let Some(dir) = invocation.working_dir() {
            println!("cd {}", scalewerk_driver::argv::shell_quote(&dir.to_string_lossy()));
        }
        println!("{}", invocation.shell_command());
        return Ok(ExitCode::SUCCESS);
    }

    let mut child = driver.upscale(&request)?;
    let status = child.wait()?;
    if status.success() {
        info!(engine = driver.engine().name(), "engine finished");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(engine = driver.engine().name(), %status, "engine exited with failure");
        let code = status.code().and_then(|c| u8::try_from(c).ok()).unwrap_or(1);
        Ok(ExitCode::from(code.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use scalewerk_core::types::OptionValue;

    fn run_args(argv: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.engine {
            EngineCommand::Srmd(args) | EngineCommand::Waifu2x(args) => args,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ratio_and_dimensions_are_exclusive() {
        assert!(Cli::try_parse_from(["scalewerk", "waifu2x", "-i", "a", "-o", "b"]).is_err());
        assert!(
            Cli::try_parse_from([
                "scalewerk", "waifu2x", "-i", "a", "-o", "b", "-r", "2", "--width", "10",
                "--height", "10",
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from(["scalewerk", "waifu2x", "-i", "a", "-o", "b", "--width", "10"])
                .is_err()
        );
    }

    #[test]
    fn request_carries_dimensions_and_extras() {
        let args = run_args(&[
            "scalewerk", "waifu2x", "-i", "in", "-o", "out", "--width", "1920", "--height", "1080",
            "--format", "png", "--depth", "16",
        ]);
        let request = args.request();
        assert_eq!(request.scale, Scale::Dimensions { width: 1920, height: 1080 });
        assert_eq!(request.image_format.as_deref(), Some("png"));
        assert_eq!(request.bit_depth, Some(16));
    }

    #[test]
    fn srmd_reports_waifu2x_only_flags() {
        let args = run_args(&[
            "scalewerk", "srmd", "-i", "in", "-o", "out", "-r", "2", "--format", "png", "--depth",
            "16", "--executable", "/bin/srmd",
        ]);
        assert_eq!(args.srmd_ignored_flags(), ["--format", "--depth"]);
        let argv = build_driver(SrmdNcnnVulkan, &DriverConfig::default(), &args)
            .unwrap()
            .prepare(&args.request())
            .unwrap()
            .argv;
        assert_eq!(argv, ["/bin/srmd", "-i", "in", "-o", "out", "-s", "2"]);

        let plain = run_args(&["scalewerk", "srmd", "-i", "in", "-o", "out", "-r", "2"]);
        assert!(plain.srmd_ignored_flags().is_empty());
    }

    #[test]
    fn trailing_engine_args_override_config() {
        let config: DriverConfig = serde_json::from_str(
            r#"{"srmd_ncnn_vulkan": {"path": "/opt/srmd/srmd-ncnn-vulkan", "n": 3, "g": 1}}"#,
        )
        .unwrap();
        let args = run_args(&[
            "scalewerk", "srmd", "-i", "in", "-o", "out", "-r", "2", "--", "-n", "-1", "-x",
        ]);
        let driver = build_driver(SrmdNcnnVulkan, &config, &args).unwrap();
        let s = driver.settings();
        assert_eq!(s.get("n"), Some(&OptionValue::Int(-1)));
        assert_eq!(s.get("g"), Some(&OptionValue::Int(1)));
        assert_eq!(s.get("x"), Some(&OptionValue::Switch(true)));
    }

    #[test]
    fn executable_flag_works_without_config() {
        let args = run_args(&[
            "scalewerk", "srmd", "-i", "in", "-o", "out", "-r", "4", "--executable",
            "/usr/local/bin/srmd-ncnn-vulkan",
        ]);
        let driver = build_driver(SrmdNcnnVulkan, &DriverConfig::default(), &args).unwrap();
        let argv = driver.prepare(&args.request()).unwrap().argv;
        assert_eq!(argv, ["/usr/local/bin/srmd-ncnn-vulkan", "-i", "in", "-o", "out", "-s", "4"]);
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("drivers.json");
        assert!(matches!(load_config(Some(missing.as_path())), Err(DriverError::Io(_))));

        std::fs::write(&missing, r#"{"waifu2x_caffe": {"path": "waifu2x-caffe-cui"}}"#).unwrap();
        let config = load_config(Some(missing.as_path())).unwrap();
        assert!(config.section("waifu2x_caffe").is_some());
    }
}
