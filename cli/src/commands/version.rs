//! `kaniko version` command.

use clap::Args;

#[derive(Args)]
pub struct VersionArgs;

pub fn execute(_args: VersionArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("kaniko version {}", kaniko::VERSION);
    Ok(())
}
