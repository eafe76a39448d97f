//! notebookify CLI: convert marker-annotated scripts into Jupyter notebooks.
//!
//! Accepts a script or a folder of scripts and writes one `.ipynb` per
//! script, by default into a sibling `notebooks` folder.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
