// --- offermerge: catálogo + timetable -> catálogo enriquecido ---

use clap::{Args, Parser, Subcommand};
use offermerge::config::{self, TermConfig, TermOverrides};
use offermerge::pipeline::{run_diff, run_merge, MergeJob};
use offermerge::run_server;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version)]
#[command(about = "Merge timetable offerings into a course catalog", long_about = None)]
struct Cli {
    /// trace | debug | info | warn | error
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enrich the catalog with periods, offered flag and terms_offered
    Merge(MergeArgs),
    /// Compare two timetable snapshots by CRN
    Diff(DiffArgs),
    /// Serve the merge over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct TermArgs {
    #[arg(long)]
    current_term: Option<i64>,

    #[arg(long)]
    prior_term: Option<i64>,

    #[arg(long)]
    current_label: Option<String>,

    #[arg(long)]
    prior_label: Option<String>,
}

impl TermArgs {
    fn overrides(&self) -> TermOverrides {
        TermOverrides {
            current_code: self.current_term,
            prior_code: self.prior_term,
            current_label: self.current_label.clone(),
            prior_label: self.prior_label.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct MergeArgs {
    #[arg(short, long)]
    courses: PathBuf,

    #[arg(short, long)]
    timetable: PathBuf,

    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    terms: TermArgs,

    /// 1 = sequential, 0 = one per CPU
    #[arg(long, default_value_t = 1)]
    workers: usize,

    #[arg(long)]
    report: Option<PathBuf>,

    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct DiffArgs {
    #[arg(long)]
    previous: PathBuf,

    #[arg(long)]
    next: PathBuf,

    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long)]
    bind: Option<String>,

    #[command(flatten)]
    terms: TermArgs,
}

fn setup_logging(level: &str) {
    let filter = match level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };
    env_logger::Builder::new()
        .filter_level(filter)
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let code = match cli.command {
        Command::Merge(args) => merge(args),
        Command::Diff(args) => match run_diff(&args.previous, &args.next, args.output.as_deref()) {
            Ok(result) => {
                println!("Added: {}", result.added.len());
                println!("Removed: {}", result.removed.len());
                println!("Changed: {}", result.changed.len());
                0
            }
            Err(e) => {
                log::error!("diff failed: {}", e);
                1
            }
        },
        Command::Serve(args) => serve(args).await,
    };
    std::process::exit(code);
}

fn merge(args: MergeArgs) -> i32 {
    let terms = match TermConfig::from_env(&args.terms.overrides()) {
        Ok(t) => t,
        Err(e) => {
            log::error!("{}", e);
            return 1;
        }
    };
    let job = MergeJob {
        courses: args.courses,
        timetable: args.timetable,
        output: args.output,
        terms,
        workers: args.workers,
        report: args.report,
        pretty: args.pretty,
    };
    match run_merge(&job) {
        Ok(report) => {
            for line in report.summary_lines() {
                println!("{}", line);
            }
            0
        }
        Err(e) => {
            log::error!("merge failed: {}", e);
            1
        }
    }
}

async fn serve(args: ServeArgs) -> i32 {
    let terms = match TermConfig::from_env(&args.terms.overrides()) {
        Ok(t) => t,
        Err(e) => {
            log::error!("{}", e);
            return 1;
        }
    };
    let bind = args.bind.unwrap_or_else(config::bind_address);
    match run_server(&bind, terms).await {
        Ok(()) => 0,
        Err(e) => {
            log::error!("server error on {}: {}", bind, e);
            1
        }
    }
}
