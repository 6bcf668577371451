//! Colour calibration
//!
//! Gamma and per-channel offsets are not driver requests; they are applied by
//! the external `fbc` tool:
//!
//! ```text
//! fbc -d /dev/fb1 2.2 -r 10 -b 4
//! ```
//!
//! Every value resolves as explicit argument, then stored setting, then
//! default (gamma `1.0`, offsets omitted). The tool runs fire-and-forget: its
//! exit status is logged, never returned.

use std::cell::RefCell;
use std::ffi::{OsStr, OsString};
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use settings::{ChannelOffset, ConfigStore, Setting};

/// Gamma used when neither an argument nor a stored value is available.
pub const DEFAULT_GAMMA: f64 = 1.0;

/// Explicit calibration values; any field may be left to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorArgs {
    /// Gamma exponent
    pub gamma: Option<f64>,
    /// Red offset; ignored unless in 1..=255
    pub r: Option<u32>,
    /// Green offset; ignored unless in 1..=255
    pub g: Option<u32>,
    /// Blue offset; ignored unless in 1..=255
    pub b: Option<u32>,
}

/// Fully resolved `fbc` command line.
#[derive(Debug, Clone, PartialEq)]
pub struct FbcInvocation {
    /// Target framebuffer
    pub device: PathBuf,
    /// Gamma exponent
    pub gamma: f64,
    /// Red offset
    pub r: Option<ChannelOffset>,
    /// Green offset
    pub g: Option<ChannelOffset>,
    /// Blue offset
    pub b: Option<ChannelOffset>,
}

impl FbcInvocation {
    /// Argument vector, program name excluded.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("-d"),
            self.device.clone().into_os_string(),
            OsString::from(format_gamma(self.gamma)),
        ];
        for (flag, offset) in [("-r", self.r), ("-g", self.g), ("-b", self.b)] {
            if let Some(offset) = offset {
                args.push(OsString::from(flag));
                args.push(OsString::from(offset.get().to_string()));
            }
        }
        args
    }
}

/// Render gamma with at least one decimal place (`1.0`, `2.2`).
pub fn format_gamma(gamma: f64) -> String {
    if gamma.is_finite() && gamma.fract() == 0.0 {
        format!("{gamma:.1}")
    } else {
        format!("{gamma}")
    }
}

// ---------------------------------------------------------------------------
// Command execution
// ---------------------------------------------------------------------------

/// Runs an external program to completion.
pub trait CommandRunner {
    /// Spawn `program` with `args` and wait for it.
    fn run(&self, program: &OsStr, args: &[OsString]) -> io::Result<ExitStatus>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &OsStr, args: &[OsString]) -> io::Result<ExitStatus> {
        (**self).run(program, args)
    }
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &OsStr, args: &[OsString]) -> io::Result<ExitStatus> {
        Command::new(program).args(args).status()
    }
}

/// Records command lines instead of running them.
///
/// Every call "exits" with the configured status. Used for `--dry-run` and in
/// tests.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<(OsString, Vec<OsString>)>>,
    exit_code: i32,
}

impl RecordingRunner {
    /// Runner whose commands all succeed
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner whose commands all exit with `code`
    pub fn with_exit_code(code: i32) -> Self {
        Self {
            calls: RefCell::default(),
            exit_code: code,
        }
    }

    /// Every recorded `(program, args)` pair, oldest first.
    pub fn calls(&self) -> Vec<(OsString, Vec<OsString>)> {
        self.calls.borrow().clone()
    }

    /// Recorded command lines joined with spaces, for display.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|(program, args)| {
                std::iter::once(program)
                    .chain(args)
                    .map(|s| s.to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &OsStr, args: &[OsString]) -> io::Result<ExitStatus> {
        self.calls
            .borrow_mut()
            .push((program.to_os_string(), args.to_vec()));
        // Wait status layout: exit code in the second byte.
        Ok(ExitStatus::from_raw(self.exit_code.wrapping_shl(8)))
    }
}

// ---------------------------------------------------------------------------
// Calibration unit
// ---------------------------------------------------------------------------

/// Resolves calibration values and invokes the calibration tool.
#[derive(Debug)]
pub struct ColorCalibration<S, R> {
    store: S,
    runner: R,
    program: PathBuf,
}

impl<S: ConfigStore, R: CommandRunner> ColorCalibration<S, R> {
    /// Calibration unit running `program` through `runner`.
    pub fn new(store: S, runner: R, program: impl Into<PathBuf>) -> Self {
        Self {
            store,
            runner,
            program: program.into(),
        }
    }

    /// The runner, for inspecting a [`RecordingRunner`].
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Resolve every value without running anything.
    pub fn invocation(&self, name: &str, device: &Path, args: ColorArgs) -> FbcInvocation {
        let stored = self.store.settings(name);
        let offset = |explicit: Option<u32>, stored: Option<ChannelOffset>| {
            explicit
                .and_then(|v| ChannelOffset::try_new(v).ok())
                .or(stored)
        };
        let gamma = args
            .gamma
            .or(stored.gamma)
            .unwrap_or(DEFAULT_GAMMA);
        if args.gamma.is_none() && stored.gamma.is_none() {
            if let Some(raw) = self.store.lookup(name, Setting::Gamma) {
                tracing::warn!(display = name, %raw, "stored gamma unparsable, using default");
            }
        }
        FbcInvocation {
            device: device.to_path_buf(),
            gamma,
            r: offset(args.r, stored.r_offset),
            g: offset(args.g, stored.g_offset),
            b: offset(args.b, stored.b_offset),
        }
    }

    /// Resolve the values and run the calibration tool.
    ///
    /// Never fails: a spawn failure or non-zero exit is logged as a warning.
    /// Returns the invocation that was attempted.
    pub fn set_color_calibration(
        &self,
        name: &str,
        device: &Path,
        args: ColorArgs,
    ) -> FbcInvocation {
        let invocation = self.invocation(name, device, args);
        let argv = invocation.args();
        match self.runner.run(self.program.as_os_str(), &argv) {
            Ok(status) if status.success() => {
                tracing::info!(
                    display = name,
                    device = %device.display(),
                    gamma = invocation.gamma,
                    "colour calibration applied"
                );
            }
            Ok(status) => {
                tracing::warn!(
                    display = name,
                    program = %self.program.display(),
                    code = status.code(),
                    "colour calibration tool reported failure"
                );
            }
            Err(err) => {
                tracing::warn!(
                    display = name,
                    program = %self.program.display(),
                    %err,
                    "could not run colour calibration tool"
                );
            }
        }
        invocation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settings::{DisplayRow, SettingsStore};

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn gamma_always_has_a_decimal_place() {
        assert_eq!(format_gamma(1.0), "1.0");
        assert_eq!(format_gamma(2.0), "2.0");
        assert_eq!(format_gamma(2.2), "2.2");
        assert_eq!(format_gamma(0.45), "0.45");
    }

    #[test]
    fn defaults_when_nothing_is_known() {
        let cal = ColorCalibration::new(SettingsStore::new(), RecordingRunner::new(), "fbc");
        let inv = cal.invocation("front", Path::new("/dev/fb0"), ColorArgs::default());
        assert_eq!(strings(&inv.args()), ["-d", "/dev/fb0", "1.0"]);
    }

    #[test]
    fn out_of_range_explicit_offset_falls_back_to_store() {
        let mut store = SettingsStore::new();
        store.insert("front", DisplayRow::new().with(Setting::GOffset, 7));
        let cal = ColorCalibration::new(store, RecordingRunner::new(), "fbc");
        let args = ColorArgs {
            g: Some(0),
            b: Some(256),
            ..ColorArgs::default()
        };
        let inv = cal.invocation("front", Path::new("/dev/fb0"), args);
        assert_eq!(strings(&inv.args()), ["-d", "/dev/fb0", "1.0", "-g", "7"]);
    }

    #[test]
    fn failing_tool_is_not_an_error() {
        let runner = RecordingRunner::with_exit_code(3);
        let cal = ColorCalibration::new(SettingsStore::new(), &runner, "/usr/bin/fbc");
        let inv = cal.set_color_calibration("front", Path::new("/dev/fb2"), ColorArgs::default());
        assert_eq!(inv.gamma, DEFAULT_GAMMA);
        assert_eq!(runner.command_lines(), ["/usr/bin/fbc -d /dev/fb2 1.0"]);
    }

    #[test]
    fn missing_program_is_not_an_error() {
        let cal = ColorCalibration::new(
            SettingsStore::new(),
            SystemRunner,
            "/nonexistent/definitely-not-fbc",
        );
        let inv = cal.set_color_calibration("front", Path::new("/dev/fb0"), ColorArgs::default());
        assert_eq!(inv.device, PathBuf::from("/dev/fb0"));
    }
}
