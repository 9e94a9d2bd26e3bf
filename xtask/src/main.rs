// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Build automation for the Tessera workspace.
// Run with: cargo xtask <command>

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::process::Command;
use std::time::Instant;

#[derive(Parser, Debug)]
#[clap(
    name = "xtask",
    version,
    about = "Build and maintenance tasks for the Tessera workspace.",
    disable_help_subcommand = true
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build every workspace crate.
    Build,
    /// Run unit, integration and doc tests.
    Test,
    /// Type-check without producing artifacts.
    Check,
    /// Apply rustfmt to the whole workspace.
    Fmt,
    /// Run clippy with warnings promoted to errors.
    Lint,
    /// Run the full pipeline: build, test, check, fmt, lint.
    Ci,
}

struct Task {
    name: &'static str,
    args: &'static [&'static str],
}

const BUILD: Task = Task {
    name: "build",
    args: &["build", "--workspace", "--exclude", "xtask"],
};
const TEST: Task = Task {
    name: "test",
    args: &["test", "--workspace"],
};
const CHECK: Task = Task {
    name: "check",
    args: &["check", "--workspace"],
};
const FMT: Task = Task {
    name: "fmt",
    args: &["fmt", "--all"],
};
const LINT: Task = Task {
    name: "lint",
    args: &["clippy", "--workspace", "--", "-D", "warnings"],
};

fn run(task: &Task) -> Result<()> {
    println!("[xtask] cargo {}", task.args.join(" "));
    let started = Instant::now();
    let status = Command::new("cargo").args(task.args).status()?;
    let elapsed = started.elapsed().as_secs_f64();
    if !status.success() {
        bail!("{} failed after {elapsed:.1}s ({status})", task.name);
    }
    println!("[xtask] {} finished in {elapsed:.1}s", task.name);
    Ok(())
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Build => run(&BUILD),
        Commands::Test => run(&TEST),
        Commands::Check => run(&CHECK),
        Commands::Fmt => run(&FMT),
        Commands::Lint => run(&LINT),
        Commands::Ci => {
            // Fail fast: the later stages are noise once one has broken.
            for task in [&BUILD, &TEST, &CHECK, &FMT, &LINT] {
                run(task)?;
            }
            println!("[xtask] ci pipeline passed");
            Ok(())
        }
    }
}
