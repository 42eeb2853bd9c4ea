mod logic;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;
use wreckroad_game::{MapEngine, RandomChooser};

use logic::{
    DEFAULT_POWERS, DirectoryLoader, MapAuditor, PromptChooser, Report, STARTER_LOADOUT,
    SeedInfo, generate_maps, odds_table, power_report, resolve_seed_inputs, split_csv, walk_run,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestMode {
    /// Render every map offer for the given seeds
    Generate,
    /// Sweep seeds and check structural invariants on every offer
    Audit,
    /// Print rank odds for a list of power levels
    Odds,
    /// Score an inventory and show its rank odds
    Power,
    /// Walk the first offer of each seed
    Walk,
}

const MODES: [(&str, &str); 5] = [
    ("generate", "Render every map offer for the given seeds"),
    ("audit", "Sweep seeds and check structural invariants on every offer"),
    ("odds", "Print rank odds for a list of power levels"),
    ("power", "Score an inventory and show its rank odds"),
    ("walk", "Walk the first offer of each seed (prompts unless --auto)"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "wreckroad-tester", version = "0.1.0")]
#[command(about = "Map generation QA for Wreckroad - seed sweeps, audits, odds and walks")]
struct Args {
    /// What to run
    #[arg(long, value_enum, default_value_t = TestMode::Audit)]
    mode: TestMode,

    /// List all available modes and exit
    #[arg(long)]
    list_modes: bool,

    /// Seeds to run (comma-separated integers or share codes, or `all`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Consecutive seeds to sweep from each given seed (audit mode only)
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory of catalog/map/ranks JSON overrides
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Pick routes at random instead of prompting (walk mode only)
    #[arg(long)]
    auto: bool,

    /// Owned part ids (comma-separated) for power and walk modes
    #[arg(long)]
    parts: Option<String>,

    /// Power levels (comma-separated) for odds mode
    #[arg(long)]
    powers: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_modes(&args)? {
        return Ok(());
    }

    if args.report == ReportFormat::Console {
        announce_banner();
    }

    let start_time = Instant::now();
    let engine = MapEngine::new(DirectoryLoader::new(args.data_dir.clone()));
    let report = run_mode(&args, &engine)?;
    write_reports(&args, &report, start_time)?;

    if !report.passed() {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_modes(args: &Args) -> Result<bool> {
    if !args.list_modes {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available modes:")?;
    for (key, description) in MODES {
        writeln!(output_target.writer(), "  {key:10} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🚗 Wreckroad Map Tester".bright_cyan().bold());
    println!("{}", "=======================".cyan());
}

fn part_ids(args: &Args) -> Vec<String> {
    args.parts.as_deref().map_or_else(
        || STARTER_LOADOUT.iter().map(ToString::to_string).collect(),
        split_csv,
    )
}

fn parse_powers(raw: Option<&str>) -> Result<Vec<f64>> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_POWERS.to_vec());
    };
    split_csv(raw)
        .iter()
        .map(|token| {
            token
                .parse::<f64>()
                .with_context(|| format!("invalid power level: {token}"))
        })
        .collect()
}

fn run_mode(args: &Args, engine: &MapEngine<DirectoryLoader>) -> Result<Report> {
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let report = match args.mode {
        TestMode::Generate => Report::Generate {
            maps: generate_maps(engine, &seeds)?,
        },
        TestMode::Audit => {
            let auditor = MapAuditor::new(engine, args.verbose);
            let (records, summary) = auditor.sweep(&seeds, args.iterations)?;
            Report::Audit { summary, records }
        }
        TestMode::Odds => Report::Odds {
            rows: odds_table(engine, &parse_powers(args.powers.as_deref())?)?,
        },
        TestMode::Power => Report::Power {
            report: power_report(engine, &part_ids(args))?,
        },
        TestMode::Walk => Report::Walk {
            walks: run_walks(args, engine, &seeds)?,
        },
    };
    Ok(report)
}

fn run_walks(
    args: &Args,
    engine: &MapEngine<DirectoryLoader>,
    seeds: &[SeedInfo],
) -> Result<Vec<logic::explore::WalkRecord>> {
    let parts = part_ids(args);
    let mut walks = Vec::with_capacity(seeds.len());
    for info in seeds {
        let record = if args.auto {
            let mut rng = ChaCha8Rng::seed_from_u64(info.seed);
            let mut chooser = RandomChooser::new(&mut rng);
            walk_run(engine, info, &parts, &mut chooser)?
        } else {
            println!("🗺️  {}", info.label().bold());
            let offers = engine.offers(info.seed)?;
            if let Some(offer) = offers.first() {
                println!("{}", wreckroad_game::render_map(&offer.map));
            }
            let mut chooser = PromptChooser::new(std::io::stdin().lock(), stdout());
            walk_run(engine, info, &parts, &mut chooser)?
        };
        walks.push(record);
    }
    Ok(walks)
}

fn write_reports(args: &Args, report: &Report, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => {
            logic::reports::generate_json_report(&mut output_target, report)?;
        }
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(&mut output_target, report)?;
        }
        ReportFormat::Console => {
            logic::reports::generate_console_report(&mut output_target, report)?;
            let duration = start_time.elapsed();
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
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
