mod logic;
mod storage;
mod story;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use phoenix_core::{
    Economy, PlayerState, Settings, UpgradeKey, estimate_ash_gain, export_save, format_amount,
    import_save, upgrade_cost,
};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{SessionStrategy, SimulationConfig, SimulationSession, SimulationSummary};
use storage::{FileEngine, create_file_engine};
use util::{default_assets_dir, now_ms, resolve_seeds, split_csv};

#[derive(Debug, Parser)]
#[command(name = "phoenix-cli", version)]
#[command(about = "Headless host for VoidPhoenix - idle sessions, story packs and save transfer")]
struct Args {
    /// Asset directory holding settings.json and story/<id>.dialogue.json
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Save file used by every command
    #[arg(long, global = true, default_value = "voidphoenix-save.json")]
    save: PathBuf,

    /// Optional path to write output instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the saved game and what the next purchases cost
    Status,
    /// Run idle sessions on a simulated clock
    Simulate {
        /// Strategies to run (comma-separated, or "all")
        #[arg(long, default_value = "cheapest")]
        strategies: String,

        /// Seeds to run (comma-separated)
        #[arg(long, default_value = "1337")]
        seeds: String,

        /// Simulated minutes per session
        #[arg(long, default_value_t = 10)]
        minutes: u32,

        /// Simulated milliseconds per frame
        #[arg(long, default_value_t = 200)]
        frame_ms: u32,

        /// Start from a fresh state instead of the save
        #[arg(long)]
        fresh: bool,

        /// Autosave the session into the save file (single session only)
        #[arg(long)]
        persist: bool,

        /// Output report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        report: ReportFormat,
    },
    /// Play a story pack, answering dialogue with scripted choices
    Story {
        /// Story pack identifier
        #[arg(long, default_value = "prologue")]
        pack: String,

        /// Choice ids in order (comma-separated)
        #[arg(long, default_value = "")]
        choices: String,
    },
    /// Print the save as a portable token
    Export,
    /// Replace the save with the state encoded in a token
    Import {
        /// Token produced by `export`
        token: String,
    },
    /// Delete the save and its milestones
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Console,
    Json,
    Markdown,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let assets = args.assets.clone().unwrap_or_else(default_assets_dir);
    let engine = create_file_engine(assets, &args.save);
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match &args.command {
        Command::Status => {
            let settings = engine.settings();
            announce_banner(&settings);
            write_status(&mut output_target, &engine, &settings)?;
        }
        Command::Simulate {
            strategies,
            seeds,
            minutes,
            frame_ms,
            fresh,
            persist,
            report,
        } => {
            let settings = engine.settings();
            if *report == ReportFormat::Console {
                announce_banner(&settings);
            }
            let plan = SimulatePlan {
                strategies: expand_strategies(strategies)?,
                seeds: resolve_seeds(seeds)?,
                duration_ms: i64::from(*minutes) * 60_000,
                frame_ms: i64::from(*frame_ms),
                fresh: *fresh,
                persist: *persist,
            };
            let start_time = Instant::now();
            let summaries = run_simulations(&engine, &settings, &plan)?;
            write_report(&mut output_target, *report, &summaries, start_time)?;
        }
        Command::Story { pack, choices } => {
            announce_banner(&engine.settings());
            let opened = engine
                .open_story(pack)
                .with_context(|| format!("failed to open story pack '{pack}'"))?;
            let transcript = story::run_script(opened, &split_csv(choices))?;
            story::write_transcript(&mut output_target, &transcript)?;
        }
        Command::Export => {
            let state = engine.load_game(now_ms());
            writeln!(output_target, "{}", export_save(&state)?)?;
        }
        Command::Import { token } => {
            let state = import_save(token, now_ms()).context("invalid import token")?;
            engine.save_game(&state)?;
            writeln!(
                output_target,
                "Imported save: {} sparks, {} ash",
                format_amount(state.sparks),
                state.phoenix_ash
            )?;
        }
        Command::Reset => {
            engine.reset_game(now_ms())?;
            writeln!(output_target, "Save cleared: {}", args.save.display())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

fn announce_banner(settings: &Settings) {
    println!("{}", format!("🔥 {}", settings.title).bright_red().bold());
    println!("{}", settings.tagline.yellow());
    println!("{}", "================================".red());
}

fn expand_strategies(raw: &str) -> Result<Vec<SessionStrategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(raw) {
        if token.eq_ignore_ascii_case("all") {
            strategies.extend(SessionStrategy::ALL);
            continue;
        }
        match SessionStrategy::from_str(&token, true) {
            Ok(strategy) => strategies.push(strategy),
            Err(_) => bail!("unknown strategy: {token}"),
        }
    }
    if strategies.is_empty() {
        bail!("no strategies selected");
    }
    Ok(strategies)
}

struct SimulatePlan {
    strategies: Vec<SessionStrategy>,
    seeds: Vec<u64>,
    duration_ms: i64,
    frame_ms: i64,
    fresh: bool,
    persist: bool,
}

fn run_simulations(
    engine: &FileEngine,
    settings: &Settings,
    plan: &SimulatePlan,
) -> Result<Vec<SimulationSummary>> {
    let session_count = plan.strategies.len() * plan.seeds.len();
    if plan.persist && session_count != 1 {
        bail!("--persist needs exactly one strategy and one seed, got {session_count} sessions");
    }

    let economy = Economy::new(settings.bonus_rates());
    let storage = engine.storage();
    let mut summaries = Vec::with_capacity(session_count);

    for &strategy in &plan.strategies {
        for &seed in &plan.seeds {
            let start_ms = now_ms();
            let state = if plan.fresh {
                PlayerState::new(start_ms)
            } else {
                engine.load_game(start_ms)
            };
            let milestones = storage.read_milestones()?;
            let config = SimulationConfig::new(strategy, seed)
                .with_duration_ms(plan.duration_ms)
                .with_frame_ms(plan.frame_ms);
            let mut session =
                SimulationSession::new(config, economy, state, start_ms).with_milestones(milestones);
            let mut policy = strategy.create_policy(seed);

            let summary = session.run(policy.as_mut(), |state| {
                if plan.persist {
                    engine.save_game(state)?;
                }
                Ok(())
            })?;
            if plan.persist {
                storage.write_milestones(session.milestones())?;
            }
            summaries.push(summary);
        }
    }

    Ok(summaries)
}

fn write_status<W: Write + ?Sized>(
    writer: &mut W,
    engine: &FileEngine,
    settings: &Settings,
) -> Result<()> {
    let economy = Economy::new(settings.bonus_rates());
    let state = engine.load_game(now_ms());
    writeln!(writer, "Sparks: {}", format_amount(state.sparks).yellow())?;
    writeln!(
        writer,
        "Income: {}/s",
        format_amount(economy.sparks_per_second(&state))
    )?;
    writeln!(
        writer,
        "Phoenix Ash: {}  Rebirths: {}",
        state.phoenix_ash, state.rebirths
    )?;
    writeln!(
        writer,
        "Rebirth now for: +{} ash",
        estimate_ash_gain(&state)
    )?;
    writeln!(writer)?;
    for key in UpgradeKey::ALL {
        let def = key.definition();
        writeln!(
            writer,
            "  {:<16} lvl {:>3}  next {:>9}  {}",
            def.name,
            state.level(key),
            format_amount(upgrade_cost(&state, key)),
            def.description
        )?;
    }
    Ok(())
}

fn write_report(
    output_target: &mut OutputTarget,
    report: ReportFormat,
    summaries: &[SimulationSummary],
    start_time: Instant,
) -> Result<()> {
    match report {
        ReportFormat::Json => logic::reports::generate_json_report(output_target, summaries)?,
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(output_target, summaries)?;
        }
        ReportFormat::Console => {
            logic::reports::generate_console_report(
                output_target,
                summaries,
                start_time.elapsed(),
            )?;
            writeln!(output_target)?;
            writeln!(output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "phoenix-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn args(command: Command, label: &str) -> Args {
        Args {
            assets: None,
            save: temp_path(&format!("{label}-save")),
            output: Some(temp_path(&format!("{label}-out"))),
            command,
        }
    }

    fn output_of(args: &Args) -> String {
        run(args).unwrap();
        std::fs::read_to_string(args.output.as_ref().unwrap()).unwrap()
    }

    #[test]
    fn expands_all_strategies() {
        let expanded = expand_strategies("all").unwrap();
        assert_eq!(expanded, SessionStrategy::ALL);
        let picked = expand_strategies("Tapper, idle").unwrap();
        assert_eq!(picked, [SessionStrategy::Tapper, SessionStrategy::Idle]);
        assert!(expand_strategies("hoarder").is_err());
        assert!(expand_strategies(" , ").is_err());
    }

    #[test]
    fn parses_simulate_flags() {
        let args = Args::try_parse_from([
            "phoenix-cli",
            "simulate",
            "--strategies",
            "efficient",
            "--minutes",
            "3",
            "--report",
            "markdown",
            "--save",
            "slot.json",
        ])
        .unwrap();
        assert_eq!(args.save, PathBuf::from("slot.json"));
        assert!(matches!(
            args.command,
            Command::Simulate {
                minutes: 3,
                report: ReportFormat::Markdown,
                ..
            }
        ));
    }

    #[test]
    fn persist_rejects_multiple_sessions() {
        let args = args(
            Command::Simulate {
                strategies: "idle,cheapest".to_string(),
                seeds: "1".to_string(),
                minutes: 1,
                frame_ms: 200,
                fresh: true,
                persist: true,
                report: ReportFormat::Json,
            },
            "persist-many",
        );
        assert!(run(&args).is_err());
    }

    #[test]
    fn persisted_simulation_writes_save_and_milestones() {
        let args = args(
            Command::Simulate {
                strategies: "cheapest".to_string(),
                seeds: "7".to_string(),
                minutes: 1,
                frame_ms: 200,
                fresh: true,
                persist: true,
                report: ReportFormat::Json,
            },
            "persist-one",
        );
        let json = output_of(&args);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["milestones"][0]["key"], "mvp_milestone_1");

        let saved = std::fs::read_to_string(&args.save).unwrap();
        assert!(saved.contains("\"lastTickMs\""));
        let engine = create_file_engine(default_assets_dir(), &args.save);
        assert!(engine.storage().read_milestones().unwrap().has_seen("mvp_milestone_1"));
    }

    #[test]
    fn export_import_and_reset_cycle() {
        let export = args(Command::Export, "cycle");
        let token = output_of(&export).trim().to_string();

        let import = Args {
            command: Command::Import { token },
            ..args(Command::Status, "cycle-import")
        };
        let text = output_of(&import);
        assert!(text.contains("Imported save: 0.00 sparks, 0 ash"));
        assert!(import.save.exists());

        let reset = Args {
            command: Command::Reset,
            save: import.save.clone(),
            ..args(Command::Status, "cycle-reset")
        };
        assert!(output_of(&reset).contains("Save cleared"));
        assert!(!import.save.exists());
    }

    #[test]
    fn bad_import_token_fails() {
        let args = args(
            Command::Import {
                token: "%%%".to_string(),
            },
            "bad-import",
        );
        assert!(run(&args).is_err());
        assert!(!args.save.exists());
    }

    #[test]
    fn status_lists_every_upgrade() {
        colored::control::set_override(false);
        let text = output_of(&args(Command::Status, "status"));
        assert!(text.contains("Sparks: 0.00"));
        assert!(text.contains("Spark Collector"));
        assert!(text.contains("next     10.00"));
    }

    #[test]
    fn story_with_unknown_pack_fails() {
        let args = args(
            Command::Story {
                pack: "missing".to_string(),
                choices: String::new(),
            },
            "story-missing",
        );
        assert!(run(&args).is_err());
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
