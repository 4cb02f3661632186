use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::affordance::Kind;

#[derive(Parser)]
#[command(name = "freakctl", about = "Drive the MiniFreak V by mouse, keyboard and MIDI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List available MIDI output ports
    Enumerate,
    /// List every known control with its kind, options and initial state
    List {
        /// Only show this kind (e.g. toggle, dropdown, midi-slider)
        #[arg(long)]
        kind: Option<Kind>,
    },
    /// Run a transition script
    Run(RunArgs),
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to script file (.toml)
    pub script: PathBuf,

    /// Config file (.toml) with MIDI port and window geometry
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// MIDI output port name filter (overrides config)
    #[arg(long)]
    pub midi_port: Option<String>,

    /// MIDI channel, 0-15 (overrides config)
    #[arg(long)]
    pub channel: Option<u8>,

    /// Do not open a MIDI port; MIDI steps are dropped
    #[arg(long)]
    pub no_midi: bool,
}
