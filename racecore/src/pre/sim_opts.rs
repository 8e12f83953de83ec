use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "streetrace",
    about = "Street race simulation with matchmaking and championship seasons"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging (overridden by RUST_LOG)
    #[clap(short, long)]
    pub debug: bool,

    /// Run a full championship season instead of single races
    #[clap(short, long)]
    pub season: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the scenario file
    #[clap(short, long)]
    pub parfile_path: PathBuf,

    /// Set path to the simulation constants file (defaults are used if not set)
    #[clap(short, long)]
    pub constants_path: Option<PathBuf>,

    /// Set seed of the random number generator (overrides the seed of the scenario file)
    #[clap(long)]
    pub seed: Option<u64>,

    /// Set number of simulation runs (race mode only)
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set number of championship rounds (season mode only)
    #[clap(short, long, default_value = "8")]
    pub rounds: u32,

    /// Set path of the CSV file the results are exported to
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}
