// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vigil - a periodic monitoring agent with out-of-process plugin checks.
//!
//! This is the binary entry point for the Vigil agent.

mod component;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vigil_agent::SchedulerMode;
use vigil_core::InvocationFlags;

/// Vigil - a periodic monitoring agent with out-of-process plugin checks.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scheduling loop.
    Run {
        /// Execute exactly one cycle, then exit.
        #[arg(long)]
        once: bool,

        /// Print the runnable component names without executing anything.
        #[arg(long)]
        list: bool,

        /// Skip lock-file acquisition inside checks; forwarded to
        /// privilege-separated re-execs.
        #[arg(long)]
        skip_lockfile: bool,
    },
    /// Execute exactly one component in-process.
    ///
    /// This is the target the dispatcher re-execs under another OS user;
    /// it is also usable by hand for debugging a single check.
    Component {
        /// Registered component name.
        name: String,

        #[arg(long)]
        skip_lockfile: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => vigil_config::load_and_validate_path(path),
        None => vigil_config::load_and_validate(),
    };
    let config = match config {
        Ok(config) => config,
        Err(errors) => {
            vigil_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    run::init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Run {
            once,
            list,
            skip_lockfile,
        }) => {
            let mode = if list {
                SchedulerMode::ListOnly
            } else if once {
                SchedulerMode::Once
            } else {
                SchedulerMode::Continuous
            };
            run::run_agent(config, mode, InvocationFlags { skip_lockfile }).await
        }
        Some(Commands::Component {
            name,
            skip_lockfile,
        }) => component::run_component(config, &name, InvocationFlags { skip_lockfile }).await,
        None => {
            println!("vigil: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "vigil exited with an error");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from(["vigil", "run", "--once", "--skip-lockfile"]).unwrap();
        match cli.command {
            Some(Commands::Run {
                once,
                list,
                skip_lockfile,
            }) => {
                assert!(once);
                assert!(!list);
                assert!(skip_lockfile);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn component_subcommand_parses_re_exec_argv() {
        // The exact shape the dispatcher's flag whitelist produces.
        let cli =
            Cli::try_parse_from(["vigil", "component", "db-check", "--skip-lockfile"]).unwrap();
        match cli.command {
            Some(Commands::Component {
                name,
                skip_lockfile,
            }) => {
                assert_eq!(name, "db-check");
                assert!(skip_lockfile);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = vigil_config::load_and_validate_str("").expect("default config is valid");
        assert_eq!(config.agent.name, "vigil");
    }
}
