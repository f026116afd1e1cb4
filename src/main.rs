//! Rhythm Grid headless runner
//!
//! Runs one attempt of a level at a fixed host frame rate and reports the
//! outcome.
//!
//! ```text
//! rhythm-grid [LEVEL_ID | LEVEL.json] [TRACE.json]
//! rhythm-grid --list
//! rhythm-grid quick SEED [--difficulty N] [TRACE.json]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    use clap::{Parser, Subcommand};
    use rhythm_grid::levels;
    use rhythm_grid::replay::{InputTrace, ReplayOutcome, replay};
    use rhythm_grid::sim::Level;
    use rhythm_grid::{LoadError, Tuning};

    /// Give up after this much simulated time
    const MAX_MS: f64 = 5.0 * 60.0 * 1000.0;
    const DEFAULT_LEVEL: &str = "track-01";

    /// Command-line arguments for a headless attempt.
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    struct CliArgs {
        #[command(subcommand)]
        command: Option<Command>,
        /// Built-in level id or path to a level JSON file.
        #[arg(value_name = "LEVEL", default_value = DEFAULT_LEVEL)]
        level: String,
        /// Recorded input trace to replay.
        #[arg(value_name = "TRACE")]
        trace: Option<PathBuf>,
        /// Print the built-in levels and exit.
        #[arg(long)]
        list: bool,
        /// Host frames per second driving the engine.
        #[arg(
            long,
            value_name = "FPS",
            default_value_t = 60,
            value_parser = clap::value_parser!(u32).range(1..=1000),
            global = true
        )]
        fps: u32,
        /// JSON file with physics overrides.
        #[arg(long, value_name = "FILE", env = "RHYTHM_GRID_TUNING", global = true)]
        tuning: Option<PathBuf>,
    }

    #[derive(Debug, Subcommand)]
    enum Command {
        /// Run a generated quick-play level.
        Quick {
            /// Generator seed.
            #[arg(value_name = "SEED", value_parser = clap::value_parser!(u64))]
            seed: u64,
            /// Difficulty of the generated level.
            #[arg(
                short,
                long,
                value_name = "N",
                default_value_t = 5,
                value_parser = clap::value_parser!(u8).range(1..=10)
            )]
            difficulty: u8,
            /// Recorded input trace to replay.
            #[arg(value_name = "TRACE")]
            trace: Option<PathBuf>,
        },
    }

    fn read(path: &Path) -> Result<String, LoadError> {
        std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn load_level(arg: &str) -> Result<Level, LoadError> {
        if arg.ends_with(".json") {
            Level::from_json(&read(Path::new(arg))?)
        } else {
            levels::by_id(arg)
        }
    }

    fn load_trace(path: Option<&Path>) -> Result<InputTrace, LoadError> {
        match path {
            Some(path) => InputTrace::from_json(&read(path)?),
            None => Ok(InputTrace::new()),
        }
    }

    fn load_tuning(path: Option<&Path>) -> Result<Tuning, LoadError> {
        match path {
            Some(path) => {
                log::info!("Tuning overrides from {}", path.display());
                Tuning::from_json(&read(path)?)
            }
            None => Ok(Tuning::default()),
        }
    }

    fn list() {
        for level in levels::builtin() {
            println!(
                "{:<10} {:<16} difficulty {:>2}  {} objects",
                level.metadata.id,
                level.metadata.name,
                level.metadata.difficulty,
                level.objects.len()
            );
        }
    }

    fn run(args: &CliArgs) -> Result<ReplayOutcome, LoadError> {
        let (level, trace_path) = match &args.command {
            Some(Command::Quick {
                seed,
                difficulty,
                trace,
            }) => (levels::quick_play(*seed, *difficulty), trace.as_deref()),
            None => (load_level(&args.level)?, args.trace.as_deref()),
        };
        let trace = load_trace(trace_path)?;
        let tuning = load_tuning(args.tuning.as_deref())?;
        let frame_ms = 1000.0 / f64::from(args.fps);

        log::info!(
            "Running '{}' by {} ({} objects, {} input changes, {} fps)",
            level.metadata.name,
            level.metadata.author,
            level.objects.len(),
            trace.changes.len(),
            args.fps
        );
        let result = replay(level, &trace, &tuning, frame_ms, MAX_MS);

        println!(
            "{:?} at {}% (x={:.2}, {} steps, {} jumps, {:.2}s)",
            result.outcome,
            result.state.percent,
            result.state.x,
            result.state.steps,
            result.jumps(),
            result.elapsed_ms / 1000.0
        );
        Ok(result.outcome)
    }

    pub fn main() -> ExitCode {
        env_logger::init();
        let args = CliArgs::parse();

        if args.list {
            list();
            return ExitCode::SUCCESS;
        }

        match run(&args) {
            Ok(ReplayOutcome::Completed) => ExitCode::SUCCESS,
            Ok(_) => ExitCode::from(1),
            Err(e) => {
                log::error!("{}", e);
                ExitCode::from(2)
            }
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm::start, this is just to satisfy the compiler
}
