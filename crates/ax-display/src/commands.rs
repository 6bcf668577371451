use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use colored::Colorize;
use panel::{
    ColorArgs, ColorCalibration, CommandRunner, DisplayControl, Outcome, PatternMode,
    PatternRenderer, RecordingRunner, SystemRunner,
};
use platform::{LinuxOpener, RuntimeConfig, Topology};
use settings::SettingsStore;

/// Paths and lookups shared by every subcommand.
pub struct Context {
    config: RuntimeConfig,
    topology: Topology,
}

impl Context {
    pub fn new(config: RuntimeConfig) -> Self {
        let topology = Topology::from_config(&config);
        Self { config, topology }
    }

    fn store(&self) -> Result<SettingsStore> {
        SettingsStore::load_or_empty(&self.config.store_path).context("Failed to load display settings")
    }

    fn device(&self, display: &str) -> Result<PathBuf> {
        self.topology
            .resolve_device(display)
            .with_context(|| format!("Display '{display}' has no framebuffer"))
    }

    /// Named displays, or every bound panel when none are named.
    fn targets(&self, displays: &[String]) -> Vec<String> {
        if displays.is_empty() {
            self.topology.display_names()
        } else {
            displays.to_vec()
        }
    }

    fn calibration<'s, R: CommandRunner>(
        &self,
        store: &'s SettingsStore,
        runner: R,
    ) -> ColorCalibration<&'s SettingsStore, R> {
        ColorCalibration::new(store, runner, self.config.fbc_program.clone())
    }
}

/// Single-value display settings.
#[derive(Debug, Clone, Copy)]
pub enum Knob {
    Brightness,
    GreyDepth,
    OeDivisor,
    Rotation,
}

impl Knob {
    fn label(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::GreyDepth => "grey depth",
            Self::OeDivisor => "OE divisor",
            Self::Rotation => "rotation",
        }
    }
}

pub fn list(ctx: &Context) -> Result<()> {
    let map = ctx.topology.display_map();
    if map.is_empty() {
        println!("{}", "No panels bound".yellow());
        return Ok(());
    }
    let mut rows: Vec<_> = map.into_iter().map(|(device, name)| (name, device)).collect();
    rows.sort();
    for (name, device) in rows {
        println!("{:<16} {}", name.bold(), device.display());
    }
    Ok(())
}

pub fn set(ctx: &Context, knob: Knob, display: &str, value: Option<u32>) -> Result<()> {
    let device = ctx.device(display)?;
    let store = ctx.store()?;
    let control = DisplayControl::new(&store, LinuxOpener);

    let outcome = match knob {
        Knob::Brightness => control.set_brightness(display, &device, value),
        Knob::GreyDepth => control.set_grey_depth(display, &device, value),
        Knob::OeDivisor => control.set_oe_divisor(display, &device, value),
        Knob::Rotation => control.set_rotation(display, &device, value),
    }
    .with_context(|| format!("Failed to set {} on '{display}'", knob.label()))?;

    match outcome {
        Outcome::Applied(v) => println!("{}", format!("✓ {display}: {} = {v}", knob.label()).green()),
        Outcome::Unset => println!(
            "{}",
            format!("  {display}: no {} configured, left unchanged", knob.label()).yellow()
        ),
    }
    Ok(())
}

pub fn get_brightness(ctx: &Context, display: &str) -> Result<()> {
    let device = ctx.device(display)?;
    let control = DisplayControl::new(SettingsStore::new(), LinuxOpener);
    let value = control
        .get_brightness(&device)
        .with_context(|| format!("Failed to read brightness of '{display}'"))?;
    println!("{value}");
    Ok(())
}

pub fn cmap(ctx: &Context, display: &str, args: ColorArgs, dry_run: bool) -> Result<()> {
    let device = ctx.device(display)?;
    let store = ctx.store()?;

    if dry_run {
        let runner = RecordingRunner::new();
        ctx.calibration(&store, &runner)
            .set_color_calibration(display, &device, args);
        for line in runner.command_lines() {
            println!("{line}");
        }
    } else {
        let inv = ctx
            .calibration(&store, SystemRunner)
            .set_color_calibration(display, &device, args);
        println!("{}", format!("✓ {display}: gamma {}", panel::calibration::format_gamma(inv.gamma)).green());
    }
    Ok(())
}

pub fn apply(ctx: &Context, displays: &[String]) -> Result<()> {
    let targets = ctx.targets(displays);
    if targets.is_empty() {
        println!("{}", "No panels bound".yellow());
        return Ok(());
    }
    let store = ctx.store()?;
    let control = DisplayControl::new(&store, LinuxOpener);
    let calibration = ctx.calibration(&store, SystemRunner);

    let mut failed = 0usize;
    for name in &targets {
        let result = ctx
            .device(name)
            .and_then(|device| Ok(control.apply_stored(name, &device, &calibration)?));
        match result {
            Ok(report) => {
                let applied = [
                    report.brightness,
                    report.grey_depth,
                    report.oe_divisor,
                    report.rotation,
                ]
                .into_iter()
                .filter(|o| o.is_applied())
                .count();
                println!("{}", format!("✓ {name}: {applied} settings applied").green());
            }
            Err(err) => {
                tracing::error!(display = name.as_str(), "{err:#}");
                eprintln!("{}", format!("✗ {name}: {err:#}").red());
                failed = failed.saturating_add(1);
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} displays failed", targets.len());
    }
    Ok(())
}

pub fn test_mode(ctx: &Context, mode: u32, displays: &[String]) -> Result<()> {
    let mode = PatternMode::from(mode);
    let targets = ctx.targets(displays);
    if targets.is_empty() {
        println!("{}", "No panels bound".yellow());
        return Ok(());
    }

    let names = match mode {
        PatternMode::Identify => ctx.topology.display_map(),
        _ => Default::default(),
    };
    let renderer = PatternRenderer::new(LinuxOpener, names);
    let report = renderer.render_pattern(mode, ctx.topology.resolve_all(&targets));

    let summary = format!("Test mode {}: {} rendered, {} skipped", mode.number(), report.rendered, report.skipped);
    if report.skipped == 0 {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }
    Ok(())
}
