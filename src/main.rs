//! Read Config Bundle CLI - export and import reading-display configurations.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use console::style;
use serde::Serialize;

use rcb::bundle::{AssetOutcome, BundleEngine};
use rcb::cli::{self, Cli, ColorTarget, Commands};
use rcb::config::{ConfigStore, DisplayMode, EngineSettings};
use rcb::destination::ExportDestination;
use rcb::error::{BundleError, Result, ResultExt};
use rcb::logging::init_logging;
use rcb::source::{ByteSource, ImportSelection, read_url};
use rcb::task;

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> &'static str {
        option_env!("VERGEN_GIT_DIRTY").unwrap_or("false")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle no-color flag or non-TTY
    if cli.no_color || !io::stdout().is_terminal() {
        console::set_colors_enabled(false);
    }
    if cli.no_color || !io::stderr().is_terminal() {
        console::set_colors_enabled_stderr(false);
    }

    init_logging(cli.use_json(), cli.verbose, cli.quiet);

    if let Err(e) = run(&cli).await {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        None => print_quick_start(cli),
        Some(Commands::Export(args)) => cmd_export(cli, args).await,
        Some(Commands::Import(args)) => cmd_import(cli, args).await,
        Some(Commands::Show) => cmd_show(cli),
        Some(Commands::List) => cmd_list(cli),
        Some(Commands::Select(args)) => cmd_select(cli, args),
        Some(Commands::Rename(args)) => cmd_rename(cli, args),
        Some(Commands::Delete) => cmd_delete(cli),
        Some(Commands::SetBg(args)) => cmd_set_bg(cli, args),
        Some(Commands::SetColor(args)) => cmd_set_color(cli, args),
        Some(Commands::Version) => cmd_version(cli),
        Some(Commands::Completions(args)) => cmd_completions(cli, args),
    }
}

// === Environment ===

/// Engine settings with command-line overrides applied.
fn load_settings(cli: &Cli) -> Result<EngineSettings> {
    let mut settings = EngineSettings::load_or_default(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.cache_dir {
        settings.cache_dir = Some(dir.clone());
    }
    Ok(settings)
}

fn open_store(settings: &EngineSettings) -> Result<Arc<ConfigStore>> {
    Ok(Arc::new(ConfigStore::open(settings.store_path()?)?))
}

fn open_engine(cli: &Cli) -> Result<(EngineSettings, Arc<BundleEngine>)> {
    let settings = load_settings(cli)?;
    let store = open_store(&settings)?;
    let engine = BundleEngine::from_settings(&settings, store)?;
    Ok((settings, Arc::new(engine)))
}

// === Quick Start (Robot Mode Optimized) ===

fn print_quick_start(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        output_json(cli, &robot_quick_start())
    } else {
        print_human_quick_start();
        Ok(())
    }
}

#[derive(Serialize)]
struct RobotQuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    bundles: RobotBundles,
    store: RobotStore,
    output_modes: OutputModes,
}

#[derive(Serialize)]
struct RobotBundles {
    export: &'static str,
    import_file: &'static str,
    import_url: &'static str,
    import_prompt: &'static str,
}

#[derive(Serialize)]
struct RobotStore {
    show: &'static str,
    list: &'static str,
    select: &'static str,
    rename: &'static str,
    delete: &'static str,
    set_background: &'static str,
    set_color: &'static str,
}

#[derive(Serialize)]
struct OutputModes {
    human: &'static str,
    robot: &'static str,
    compact: &'static str,
}

const fn robot_quick_start() -> RobotQuickStart {
    RobotQuickStart {
        tool: "rcb",
        version: build_info::VERSION,
        description: "Export and import reading configurations with their fonts and backgrounds",
        bundles: RobotBundles {
            export: "rcb export [DIR] --robot",
            import_file: "rcb import <BUNDLE.zip> --robot",
            import_url: "rcb import <https://...> --robot",
            import_prompt: "echo <URL> | rcb import --net --robot",
        },
        store: RobotStore {
            show: "rcb show --robot",
            list: "rcb list --robot",
            select: "rcb select <INDEX>",
            rename: "rcb rename <NAME>",
            delete: "rcb delete",
            set_background: "rcb set-bg <IMAGE> --mode day|night|eink",
            set_color: "rcb set-color text|bg <#RRGGBB> --mode day|night|eink",
        },
        output_modes: OutputModes {
            human: "--format=text (default)",
            robot: "--robot or --format=json",
            compact: "--format=json-compact",
        },
    }
}

fn print_human_quick_start() {
    println!(
        "{} {} - Read Config Bundle\n",
        style("rcb").bold().cyan(),
        build_info::VERSION
    );

    println!("{}", style("QUICK START").bold().underlined());
    println!();
    println!("  {}  Export current config", style("rcb export ~/bundles").green());
    println!("  {}  Import a bundle", style("rcb import Sepia.zip").green());
    println!("  {}  Import from URL", style("rcb import https://host/Sepia.zip").green());
    println!("  {}  List configs", style("rcb list").green());
    println!("  {}  Switch config", style("rcb select 1").green());
    println!("  {}  Night background", style("rcb set-bg paper.jpg --mode night").green());
    println!();

    println!("{}", style("ROBOT MODE (for AI agents)").bold().underlined());
    println!();
    println!("  {}  JSON output", style("rcb --robot <command>").cyan());
    println!("  {}  Quick-start JSON", style("rcb --robot").cyan());
    println!();

    println!("Run {} for full help", style("rcb --help").yellow());
}

// === Command Implementations ===

async fn cmd_export(cli: &Cli, args: &cli::ExportArgs) -> Result<()> {
    let (_, engine) = open_engine(cli)?;
    let dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    let report = task::spawn_export(engine, ExportDestination::directory(dir))
        .await
        .with_context(|| "Export task")??;

    if cli.use_json() {
        output_json(cli, &report)?;
    } else if !cli.quiet {
        println!(
            "{} {} ({} bytes)",
            style("Exported").green().bold(),
            report.location,
            report.archive_bytes
        );
        for asset in &report.skipped {
            println!("  {} {} {}", style("skipped").yellow(), asset.kind, asset.source);
        }
    }
    Ok(())
}

async fn cmd_import(cli: &Cli, args: &cli::ImportArgs) -> Result<()> {
    let selection = match (&args.source, args.net) {
        (_, true) => ImportSelection::NetworkPrompt,
        (Some(source), false) => ImportSelection::parse(source),
        (None, false) => {
            return Err(BundleError::Other("Nothing to import: give a path, URL or --net".to_string()));
        }
    };
    let source = match selection {
        ImportSelection::Source(source) => source,
        ImportSelection::NetworkPrompt => {
            if !cli.quiet && !cli.use_json() && io::stdin().is_terminal() {
                eprint!("Bundle URL: ");
            }
            ByteSource::Remote(read_url(io::stdin().lock())?)
        }
    };

    let (settings, engine) = open_engine(cli)?;
    let report = task::spawn_import(Arc::clone(&engine), source, settings.network_timeout())
        .await
        .with_context(|| "Import task")??;
    engine.store().save()?;

    if cli.use_json() {
        output_json(cli, &report)?;
    } else if !cli.quiet {
        println!(
            "{} {} ({} installed, {} reused, {} skipped)",
            style("Imported").green().bold(),
            report.name,
            report.count(AssetOutcome::Installed),
            report.count(AssetOutcome::Reused),
            report.count(AssetOutcome::Skipped)
        );
    }
    Ok(())
}

fn cmd_show(cli: &Cli) -> Result<()> {
    let store = open_store(&load_settings(cli)?)?;
    let record = store.current();

    if cli.use_json() {
        return output_json(cli, &record);
    }
    println!("{}", style(record.display_name("(unnamed)")).bold());
    for mode in DisplayMode::ALL {
        let (ty, value) = record.background(mode);
        println!(
            "  {:<6} text {}  bg {:?} {}",
            mode.as_str(),
            record.text_color(mode),
            ty,
            value
        );
    }
    if !record.text_font.is_empty() {
        println!("  font   {}", record.text_font);
    }
    Ok(())
}

#[derive(Serialize)]
struct ListEntry {
    index: usize,
    name: String,
    current: bool,
}

fn cmd_list(cli: &Cli) -> Result<()> {
    let store = open_store(&load_settings(cli)?)?;
    let current = store.current_index();
    let entries: Vec<ListEntry> = store
        .records()
        .into_iter()
        .enumerate()
        .map(|(index, record)| ListEntry {
            index,
            current: index == current,
            name: record.name,
        })
        .collect();

    if cli.use_json() {
        return output_json(cli, &entries);
    }
    for entry in &entries {
        let marker = if entry.current { "*" } else { " " };
        let name = if entry.name.trim().is_empty() { "(unnamed)" } else { entry.name.as_str() };
        if entry.current {
            println!("{marker} {:>2}  {}", entry.index, style(name).green());
        } else {
            println!("{marker} {:>2}  {name}", entry.index);
        }
    }
    Ok(())
}

fn cmd_select(cli: &Cli, args: &cli::SelectArgs) -> Result<()> {
    let store = open_store(&load_settings(cli)?)?;
    store.select(args.index)?;
    store.save()?;
    report_current(cli, &store, "Selected")
}

fn cmd_rename(cli: &Cli, args: &cli::RenameArgs) -> Result<()> {
    let store = open_store(&load_settings(cli)?)?;
    store.rename_current(args.name.clone());
    store.save()?;
    report_current(cli, &store, "Renamed to")
}

fn cmd_delete(cli: &Cli) -> Result<()> {
    let store = open_store(&load_settings(cli)?)?;
    let removed = store.delete_current()?;
    store.save()?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "deleted": removed.name,
                "current": store.current_index(),
                "ok": true
            }),
        )
    } else {
        if !cli.quiet {
            println!("Deleted {}", removed.display_name("(unnamed)"));
        }
        Ok(())
    }
}

fn cmd_set_bg(cli: &Cli, args: &cli::SetBgArgs) -> Result<()> {
    let (_, engine) = open_engine(cli)?;
    let mode = DisplayMode::from(args.mode);
    let installed: PathBuf = engine.set_background_image(mode, &args.image)?;
    engine.store().save()?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "mode": mode.as_str(),
                "installed": installed,
                "ok": true
            }),
        )
    } else {
        if !cli.quiet {
            println!("{} background set to {}", mode.as_str(), installed.display());
        }
        Ok(())
    }
}

fn cmd_set_color(cli: &Cli, args: &cli::SetColorArgs) -> Result<()> {
    let store = open_store(&load_settings(cli)?)?;
    let mode = DisplayMode::from(args.mode);
    match args.target {
        ColorTarget::Text => store.set_text_color(mode, &args.color)?,
        ColorTarget::Bg => store.set_background_color(mode, &args.color)?,
    }
    store.save()?;
    report_current(cli, &store, "Updated")
}

fn report_current(cli: &Cli, store: &ConfigStore, verb: &str) -> Result<()> {
    let record = store.current();
    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "current": store.current_index(),
                "name": record.name,
                "ok": true
            }),
        )
    } else {
        if !cli.quiet {
            println!("{verb} {}", record.display_name("(unnamed)"));
        }
        Ok(())
    }
}

fn cmd_version(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "version": build_info::VERSION,
                "git_sha": build_info::git_sha(),
                "git_dirty": build_info::git_dirty() == "true",
                "build_timestamp": build_info::build_timestamp(),
                "rustc_version": build_info::rustc_semver(),
                "target": build_info::target(),
            }),
        )?;
    } else {
        println!("rcb {}", build_info::VERSION);
        println!(
            "git: {}{}",
            build_info::git_sha(),
            if build_info::git_dirty() == "true" {
                " (dirty)"
            } else {
                ""
            }
        );
        println!("built: {}", build_info::build_timestamp());
        println!("rustc: {}", build_info::rustc_semver());
        println!("target: {}", build_info::target());
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(_cli: &Cli, args: &cli::CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    clap_complete::generate(args.shell, &mut Cli::command(), "rcb", &mut io::stdout());
    Ok(())
}

// === Utility Functions ===

fn output_json<T: Serialize>(cli: &Cli, data: &T) -> Result<()> {
    let json = if cli.use_compact_json() {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    }
    .with_context(|| "Serializing output")?;
    println!("{json}");
    Ok(())
}

fn output_error(cli: &Cli, error: &BundleError) {
    if cli.use_json() {
        let json = serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        });
        eprintln!("{json:#}");
    } else {
        eprintln!("{}: {}", style("Error").red().bold(), error);
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}: {}", style("Hint").yellow(), suggestion);
        }
    }
}
