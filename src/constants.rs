use std::time::Duration;

pub const SOURCE_SUFFIX: &str = ".cpp";
pub const INPUT_SUFFIX: &str = ".in";
pub const EXPECTED_SUFFIX: &str = ".out";

pub const DEFAULT_COMPILER: &str = "g++";
pub const CXX_FLAGS: [&str; 3] = ["-std=c++17", "-O2", "-Wall"];

pub const COMPILE_BUDGET: Duration = Duration::from_secs(5);
pub const EXECUTE_BUDGET: Duration = Duration::from_secs(5);

pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

pub const ARTIFACT_DIR_NAME: &str = "testrunner";

pub const COMPILER_ENV: &str = "GNUCPP_PATH";
pub const WORKERS_ENV: &str = "TESTRUNNER_WORKERS";
pub const TMPDIR_ENV: &str = "TESTRUNNER_TMPDIR";
pub const NO_COLOR_ENV: &str = "NO_COLOR";
