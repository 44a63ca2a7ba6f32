use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ps5bp_common::FirmwareVersion;
use ps5bp_core::PipelineConfig;
use tracing::info;

mod nid_builder;
mod summary;

#[derive(Parser, Debug)]
#[command(name = "ps5bp", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the backport pipeline against a game folder.
    Backport(BackportArgs),
    /// Walk a directory of real firmware libraries and merge their exports
    /// into the per-firmware exports database.
    NidBuild(nid_builder::NidBuildArgs),
}

#[derive(Parser, Debug)]
struct BackportArgs {
    /// Folder containing the game's .sprx/.prx/.bin files.
    #[arg(long)]
    input_dir: PathBuf,

    /// Firmware version the game was built against, e.g. "9.60".
    #[arg(long)]
    source_fw: String,

    /// Firmware version to backport to, e.g. "7.00".
    #[arg(long)]
    target_fw: String,

    #[arg(long)]
    apply_bps: bool,
    #[arg(long)]
    stub_missing: bool,
    #[arg(long)]
    resign: bool,
    /// Off by default: exploited consoles bypass firmware checks already.
    #[arg(long)]
    patch_sdk: bool,
    /// Off by default, same rationale as `patch_sdk`.
    #[arg(long)]
    patch_param: bool,

    /// Directory of `<version>.json` per-firmware exports files.
    #[arg(long)]
    exports_dir: PathBuf,
    #[arg(long)]
    patch_db_path: Option<PathBuf>,
    #[arg(long)]
    fakelib_manifest_path: Option<PathBuf>,
    #[arg(long)]
    external_decrypter_path: Option<PathBuf>,

    /// Output folder; defaults to `input_dir` (in-place) if omitted.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[arg(long)]
    output_report_path: Option<PathBuf>,

    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("ps5bp=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Backport(args) => run_backport(args),
        Command::NidBuild(args) => nid_builder::run(args),
    }
}

fn run_backport(args: BackportArgs) -> Result<()> {
    let source_fw: FirmwareVersion = args.source_fw.parse().context("invalid --source-fw")?;
    let target_fw: FirmwareVersion = args.target_fw.parse().context("invalid --target-fw")?;
    let output_dir = args.output_dir.unwrap_or_else(|| args.input_dir.clone());

    let config = PipelineConfig {
        input_dir: args.input_dir,
        output_dir,
        source_fw,
        target_fw,
        apply_bps: args.apply_bps,
        stub_missing: args.stub_missing,
        resign: args.resign,
        patch_sdk: args.patch_sdk,
        patch_param: args.patch_param,
        exports_dir: args.exports_dir,
        patch_db_path: args.patch_db_path,
        fakelib_manifest_path: args.fakelib_manifest_path,
        external_decrypter_path: args.external_decrypter_path,
        output_report_path: args.output_report_path,
    };

    info!(source = %source_fw, target = %target_fw, "starting backport pipeline");
    let report = ps5bp_core::run(&config).context("pipeline run failed")?;
    summary::print(&report, !args.no_color);
    Ok(())
}
