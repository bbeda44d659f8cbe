mod logging;

use anyhow::Result;
use chronorename_core::{
    app_paths, generate_plan, load_config, run, save_config, AppConfig, RenamePlan, RunConfig,
    RunReport, TimestampSource,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "chronorename")]
#[command(about = "撮影日時の順にファイル名を YYYYMMDD_HHMMSS 形式へ一括リネームします")]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    Init,
}

#[derive(Debug, Args)]
struct RenameArgs {
    #[arg(short, long, default_value = ".")]
    folder: PathBuf,
    #[arg(short, long)]
    pattern: Option<String>,
    #[arg(short, long, value_enum)]
    timestamp: Option<TimestampArg>,
    #[arg(short, long, default_value_t = false)]
    ignore_errors: bool,
    #[arg(long, default_value_t = false, conflicts_with = "ignore_errors")]
    strict: bool,
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TimestampArg {
    Exif,
    Atime,
    Ctime,
    Mtime,
    Birthtime,
}

impl From<TimestampArg> for TimestampSource {
    fn from(value: TimestampArg) -> Self {
        match value {
            TimestampArg::Exif => TimestampSource::Exif,
            TimestampArg::Atime => TimestampSource::Atime,
            TimestampArg::Ctime => TimestampSource::Ctime,
            TimestampArg::Mtime => TimestampSource::Mtime,
            TimestampArg::Birthtime => TimestampSource::Birthtime,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(logging::level_for(cli.verbose, cli.quiet))?;

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Init => cmd_config_init(),
        },
    }
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let config = build_run_config(&args, &load_config()?);

    if args.dry_run {
        let plan = generate_plan(&config)?;
        match args.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            OutputFormat::Table => print_plan(&plan),
        }
        eprintln!("dry-runモード: 実ファイルは変更していません。");
        return Ok(());
    }

    let report = run(&config)?;
    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

fn build_run_config(args: &RenameArgs, defaults: &AppConfig) -> RunConfig {
    let mut config = RunConfig::from_app_config(args.folder.clone(), defaults);
    if let Some(pattern) = &args.pattern {
        config.pattern = pattern.clone();
    }
    if let Some(timestamp) = args.timestamp {
        config.timestamp_source = timestamp.into();
    }
    if args.ignore_errors {
        config.ignore_errors = true;
    } else if args.strict {
        config.ignore_errors = false;
    }
    config
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("設定ファイル: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = save_config(&load_config()?)?;
    println!("設定ファイルを書き込みました: {}", path.display());
    Ok(())
}

fn print_plan(plan: &RenamePlan) {
    println!("元ファイル -> 新ファイル (撮影日時)");
    for entry in &plan.entries {
        println!(
            "{} -> {} ({})",
            entry.original.display(),
            entry.target.display(),
            entry.timestamp
        );
    }
    for skipped in &plan.skipped {
        println!("スキップ: {} ({})", skipped.name.display(), skipped.reason);
    }

    println!(
        "\n集計: selected={} resolved={} skipped={} unchanged={}",
        plan.stats.selected, plan.stats.resolved, plan.stats.skipped, plan.stats.unchanged
    );
}

fn print_report(report: &RunReport) {
    for skipped in &report.skipped {
        println!("スキップ: {} ({})", skipped.name.display(), skipped.reason);
    }
    println!(
        "適用完了: {}件 (失敗 {}件 / 変更なし {}件 / スキップ {}件)",
        report.applied.renamed,
        report.applied.failed,
        report.applied.unchanged,
        report.stats.skipped
    );
}

#[cfg(test)]
mod tests {
    use super::{build_run_config, Cli, Commands};
    use chronorename_core::{AppConfig, TimestampSource};
    use clap::Parser;
    use std::path::PathBuf;

    fn rename_args(argv: &[&str]) -> super::RenameArgs {
        let cli = Cli::try_parse_from(argv).expect("parse args");
        match cli.command {
            Commands::Rename(args) => args,
            Commands::Config(_) => panic!("expected rename"),
        }
    }

    #[test]
    fn flags_override_file_defaults() {
        let args = rename_args(&[
            "chronorename",
            "rename",
            "-f",
            "/photos",
            "-p",
            "IMG_*.jpg",
            "-t",
            "mtime",
            "-i",
        ]);
        let config = build_run_config(&args, &AppConfig::default());
        assert_eq!(config.root, PathBuf::from("/photos"));
        assert_eq!(config.pattern, "IMG_*.jpg");
        assert_eq!(config.timestamp_source, TimestampSource::Mtime);
        assert!(config.ignore_errors);
    }

    #[test]
    fn file_defaults_apply_when_flags_are_absent() {
        let args = rename_args(&["chronorename", "rename"]);
        let defaults = AppConfig {
            pattern: "*.jpeg".to_string(),
            timestamp_source: TimestampSource::Birthtime,
            ignore_errors: true,
            ..AppConfig::default()
        };
        let config = build_run_config(&args, &defaults);
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.pattern, "*.jpeg");
        assert_eq!(config.timestamp_source, TimestampSource::Birthtime);
        assert!(config.ignore_errors);
    }

    #[test]
    fn strict_flag_overrides_tolerant_file_default() {
        let defaults = AppConfig {
            ignore_errors: true,
            ..AppConfig::default()
        };

        let args = rename_args(&["chronorename", "rename", "--strict"]);
        assert!(!build_run_config(&args, &defaults).ignore_errors);

        let args = rename_args(&["chronorename", "rename"]);
        assert!(build_run_config(&args, &defaults).ignore_errors);
    }

    #[test]
    fn strict_and_ignore_errors_conflict() {
        assert!(Cli::try_parse_from(["chronorename", "rename", "-i", "--strict"]).is_err());
    }

    #[test]
    fn rejects_unknown_timestamp_source() {
        assert!(Cli::try_parse_from(["chronorename", "rename", "-t", "today"]).is_err());
    }

    #[test]
    fn verbosity_is_global() {
        let cli = Cli::try_parse_from(["chronorename", "rename", "-vv", "--dry-run"])
            .expect("parse args");
        assert_eq!(cli.verbose, 2);
    }
}
