// Command-line binary: output goes to stdout by design.
#![allow(clippy::print_stdout)]
#![allow(missing_docs)]

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use platform::RuntimeConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ax-display")]
#[command(about = "Axent LED/LCD panel settings and test patterns", long_about = None)]
#[command(version)]
struct Cli {
    /// sysfs directory holding the FPGA slot entries
    #[arg(long, global = true, value_name = "DIR")]
    sysfs_root: Option<PathBuf>,

    /// sysfs directory of the panel driver (one entry per bound panel)
    #[arg(long, global = true, value_name = "DIR")]
    driver_dir: Option<PathBuf>,

    /// Directory holding the framebuffer device nodes
    #[arg(long, global = true, value_name = "DIR")]
    dev_dir: Option<PathBuf>,

    /// Per-display settings document
    #[arg(long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Colour calibration program
    #[arg(long, global = true, value_name = "PROGRAM")]
    fbc: Option<PathBuf>,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List bound panels and their framebuffer devices
    List,
    /// Set panel brightness (stored value if omitted)
    Brightness {
        display: String,
        value: Option<u32>,
    },
    /// Print the current panel brightness
    GetBrightness { display: String },
    /// Set grey levels per channel (stored value if omitted)
    Depth {
        display: String,
        value: Option<u32>,
    },
    /// Set the output-enable clock divisor (stored value if omitted)
    Oediv {
        display: String,
        value: Option<u32>,
    },
    /// Set rotation, 0 or 180 degrees (stored value if omitted)
    Rotation {
        display: String,
        value: Option<u32>,
    },
    /// Apply gamma and colour offsets through the calibration tool
    Cmap {
        display: String,
        /// Gamma exponent (stored value, then 1.0)
        #[arg(long)]
        gamma: Option<f64>,
        /// Red offset, 1-255
        #[arg(short = 'r', long = "red")]
        red: Option<u32>,
        /// Green offset, 1-255
        #[arg(short = 'g', long = "green")]
        green: Option<u32>,
        /// Blue offset, 1-255
        #[arg(short = 'b', long = "blue")]
        blue: Option<u32>,
        /// Print the calibration command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply every stored setting (all bound panels if none named)
    Apply { displays: Vec<String> },
    /// Show a test pattern (all bound panels if none named)
    ///
    /// Modes: 1 white, 2 black, 3/4 checkerboard, 5/6 vertical stripes,
    /// 7/8 horizontal stripes, 9 identify.
    TestMode { mode: u32, displays: Vec<String> },
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    fn runtime_config(&self) -> RuntimeConfig {
        let mut config = RuntimeConfig::from_env();
        let overrides = [
            (&self.sysfs_root, &mut config.devices_root),
            (&self.driver_dir, &mut config.driver_root),
            (&self.dev_dir, &mut config.dev_dir),
            (&self.store, &mut config.store_path),
            (&self.fbc, &mut config.fbc_program),
        ];
        for (flag, slot) in overrides {
            if let Some(path) = flag {
                slot.clone_from(path);
            }
        }
        config
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.runtime_config();
    tracing::debug!(
        app = platform::config::APP_NAME,
        version = platform::config::APP_VERSION,
        ?config,
        "runtime configuration"
    );
    let ctx = commands::Context::new(config);

    match cli.command {
        Commands::List => commands::list(&ctx),
        Commands::Brightness { display, value } => {
            commands::set(&ctx, commands::Knob::Brightness, &display, value)
        }
        Commands::GetBrightness { display } => commands::get_brightness(&ctx, &display),
        Commands::Depth { display, value } => {
            commands::set(&ctx, commands::Knob::GreyDepth, &display, value)
        }
        Commands::Oediv { display, value } => {
            commands::set(&ctx, commands::Knob::OeDivisor, &display, value)
        }
        Commands::Rotation { display, value } => {
            commands::set(&ctx, commands::Knob::Rotation, &display, value)
        }
        Commands::Cmap {
            display,
            gamma,
            red,
            green,
            blue,
            dry_run,
        } => {
            let args = panel::ColorArgs {
                gamma,
                r: red,
                g: green,
                b: blue,
            };
            commands::cmap(&ctx, &display, args, dry_run)
        }
        Commands::Apply { displays } => commands::apply(&ctx, &displays),
        Commands::TestMode { mode, displays } => commands::test_mode(&ctx, mode, &displays),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_environment_defaults() {
        let cli = Cli::try_parse_from([
            "ax-display",
            "--sysfs-root",
            "/tmp/bus/devices",
            "--store",
            "/tmp/displays.json",
            "list",
        ])
        .unwrap();
        let config = cli.runtime_config();
        assert_eq!(config.devices_root, PathBuf::from("/tmp/bus/devices"));
        assert_eq!(config.store_path, PathBuf::from("/tmp/displays.json"));
    }

    #[test]
    fn cmap_accepts_short_channel_flags() {
        let cli =
            Cli::try_parse_from(["ax-display", "cmap", "front", "-r", "50", "--gamma", "2.2"]).unwrap();
        match cli.command {
            Commands::Cmap { red, green, gamma, .. } => {
                assert_eq!(red, Some(50));
                assert_eq!(green, None);
                assert_eq!(gamma, Some(2.2));
            }
            other => panic!("parsed {other:?}"),
        }
    }

    #[test]
    fn rotation_value_is_optional() {
        let cli = Cli::try_parse_from(["ax-display", "rotation", "front"]).unwrap();
        assert!(matches!(cli.command, Commands::Rotation { value: None, .. }));
    }
}
