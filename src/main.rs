mod affordance;
mod cli;
mod config;
mod controller;
mod enumerate;
mod error;
mod input;
mod layout;
mod midi;
mod script;
mod store;

use clap::Parser;
use cli::{Cli, Command, RunArgs};

use crate::controller::{Controller, Outcome};
use crate::input::Recorder;
use crate::midi::MidiOut;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Enumerate => enumerate::midi(),
        Command::List { kind } => {
            let registry = layout::minifreak()?;
            enumerate::affordances(&registry, kind)
        }
        Command::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => config::load(path)?,
        None => config::Config::default(),
    };
    if let Some(port) = args.midi_port {
        config.midi.port = port;
    }
    if let Some(channel) = args.channel {
        config.midi.channel = channel;
    }
    config.validate()?;

    let script = script::load(&args.script)?;
    let registry = layout::minifreak()?;
    log::info!("Registered {} affordances", registry.len());

    let mut midi_out = MidiOut::new(config.midi.channel);
    if !args.no_midi {
        midi_out.open(&config.midi.port)?;
    }
    if !midi_out.is_open() {
        log::warn!("No MIDI output open, MIDI steps will be dropped");
    }

    let window = config.window.rect();
    log::info!("Window at {window} (calibrated at {})", registry.reference());
    let mut controller = Controller::new(registry, Recorder::new(window), midi_out);

    let reports = script::run(&mut controller, &script)?;

    let mut unreachable = 0;
    for (i, report) in reports.iter().enumerate() {
        let outcome = match report.outcome {
            Outcome::Applied(n) => format!("applied ({n} action(s))"),
            Outcome::Unchanged => "unchanged".to_string(),
            Outcome::Unreachable => {
                unreachable += 1;
                "UNREACHABLE".to_string()
            }
        };
        println!(
            "{:>3}. {} {}  {}",
            i + 1,
            report.affordance,
            report.request,
            outcome
        );
        for action in &report.actions {
            println!("       {action}");
        }
    }
    if unreachable > 0 {
        log::warn!("{unreachable} step(s) were unreachable");
    }

    controller.midi_mut().close();
    Ok(())
}
