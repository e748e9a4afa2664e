//! Man page generator for hexflash
//!
//! Writes `hexflash.1` and one `hexflash-<command>.1` page per subcommand.
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
#[allow(dead_code)]
mod cli;

fn render(cmd: clap::Command, title: &str, path: &Path) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).title(title).render(&mut buffer)?;
    fs::write(path, buffer)?;
    println!("  {}", path.display());
    Ok(())
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    println!("Generating man pages:");

    for sub in cmd.get_subcommands() {
        let name = format!("hexflash-{}", sub.get_name());
        render(sub.clone(), &name, &output_dir.join(format!("{}.1", name)))?;
    }
    render(cmd, "hexflash", &output_dir.join("hexflash.1"))?;

    println!("\nTo view: man -l {}", output_dir.join("hexflash.1").display());
    Ok(())
}
