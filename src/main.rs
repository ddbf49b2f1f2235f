//! taskdeps - Local-first tasks with cycle-safe dependencies

use std::process::ExitCode;

fn main() -> ExitCode {
    taskdeps::cli::run()
}
