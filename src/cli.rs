use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

/// Compile C++ solutions and check them against their `.in`/`.out` fixtures.
///
/// A `.cpp` target runs against every fixture in its directory; followed by
/// an `.in` file it runs once against that input only. Any other target is
/// treated as a directory of solutions and handed to the worker pool.
#[derive(Parser, Debug)]
#[command(name = "testrunner", version)]
pub struct Cli {
    /// Source files, inputs and directories to run, in order.
    #[arg(value_name = "TARGET", required = true)]
    pub targets: Vec<PathBuf>,

    /// Number of directory workers [env: TESTRUNNER_WORKERS, default: 8].
    #[arg(short = 'j', long = "jobs")]
    pub jobs: Option<NonZeroUsize>,

    /// Disable ANSI colors in the report.
    #[arg(long = "no-color")]
    pub no_color: bool,
}
