use clap::{Parser, Subcommand};
use dymerge::{encode, load_chart, run_plan, Chart, MergeError, MergePlan, OutputFormat};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dymerge")]
#[command(about = "Merge two rhythm-game charts into one continuous chart", version)]
struct Args {
    /// Log every transformation step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append LATTER after FORMER, starting once the first song has played
    Merge {
        /// First chart (XML or JSON)
        #[arg(required_unless_present = "plan")]
        former: Option<PathBuf>,

        /// Second chart (XML or JSON)
        #[arg(required_unless_present = "plan")]
        latter: Option<PathBuf>,

        /// Length of the first song in seconds
        #[arg(long, required_unless_present = "plan")]
        song_length: Option<f64>,

        /// YAML merge plan instead of positional arguments
        #[arg(long, conflicts_with_all = ["former", "latter", "song_length"])]
        plan: Option<PathBuf>,

        /// Sort notes into canonical order before export
        #[arg(long)]
        sort: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Cut a chart down to a bar range
    Clip {
        chart: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        start: f64,

        #[arg(long, allow_negative_numbers = true)]
        end: f64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Re-express a chart at a new tempo or playback speed
    Retime {
        chart: PathBuf,

        /// New tempo in bars per minute (note times follow)
        #[arg(long, conflicts_with = "speed", required_unless_present = "speed")]
        tempo: Option<f64>,

        /// Playback speed factor (tempo and offset follow, note times stay)
        #[arg(long)]
        speed: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Output file (stdout when absent)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output markup
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "dymerge=debug" } else { "dymerge=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), MergeError> {
    match command {
        Command::Merge {
            former,
            latter,
            song_length,
            plan,
            sort,
            output,
        } => {
            let mut plan = match plan {
                Some(path) => {
                    info!("Loaded merge plan from {:?}", path);
                    MergePlan::load(&path)?
                }
                None => MergePlan {
                    former: former.ok_or_else(|| missing("former chart"))?,
                    latter: latter.ok_or_else(|| missing("latter chart"))?,
                    song_length: song_length.ok_or_else(|| missing("--song-length"))?,
                    output: None,
                    format: OutputFormat::default(),
                    sort,
                },
            };
            plan.sort |= sort;
            if let Some(format) = output.format {
                plan.format = format;
            }
            let destination = output.output.or_else(|| plan.output.clone());
            let text = run_plan(&plan)?;
            write_output(destination.as_deref(), &text)
        }
        Command::Clip {
            chart,
            start,
            end,
            output,
        } => {
            let clipped = load_chart(&chart)?.clip(start, end)?;
            debug!(notes = clipped.notes.len(), "clip done");
            emit(&clipped, &output)
        }
        Command::Retime {
            chart,
            tempo,
            speed,
            output,
        } => {
            let source = load_chart(&chart)?;
            let retimed = match (tempo, speed) {
                (Some(tempo), _) => source.change_bpm(tempo)?,
                (None, Some(speed)) => source.change_speed(speed)?,
                (None, None) => {
                    return Err(MergeError::Config(
                        "one of --tempo or --speed is required".to_string(),
                    ))
                }
            };
            emit(&retimed, &output)
        }
    }
}

fn missing(what: &str) -> MergeError {
    MergeError::Config(format!("missing {}", what))
}

fn emit(chart: &Chart, output: &OutputArgs) -> Result<(), MergeError> {
    let text = encode(&chart.to_document(), output.format.unwrap_or_default())?;
    write_output(output.output.as_deref(), &text)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<(), MergeError> {
    match path {
        Some(path) => {
            fs::write(path, text).map_err(|e| MergeError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            info!("Wrote chart to {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}
