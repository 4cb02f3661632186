use crate::affordance::{Kind, Registry, precondition};
use crate::store::StateStore;

pub fn midi() -> anyhow::Result<()> {
    println!("=== MIDI Output Devices ===");
    let midi_out = midir::MidiOutput::new("freakctl-enumerate")?;
    let ports = midi_out.ports();
    if ports.is_empty() {
        println!("  (none found)");
    }
    for port in &ports {
        let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".into());
        println!("  {name}");
    }
    Ok(())
}

pub fn affordances(registry: &Registry, kind: Option<Kind>) -> anyhow::Result<()> {
    let shown: Vec<_> = registry
        .iter()
        .filter(|a| kind.is_none_or(|k| a.kind() == k))
        .collect();
    let store = StateStore::new(registry);

    println!("=== Affordances ({}) ===", shown.len());
    if shown.is_empty() {
        println!("  (none)");
    }
    for a in shown {
        println!("  [{}] {}", a.kind(), a.name());
        if !a.options().is_empty() {
            println!("          Options:  {}", a.options().join(", "));
        }
        if let Some(binding) = a.midi() {
            println!("          MIDI:     {binding:?}");
        }
        println!("          Initial:  {}", a.initial());
        if !a.precondition().is_always() {
            let now = precondition::satisfied(a.precondition(), &store)?;
            println!("          Requires: {}", a.precondition());
            let reads: Vec<&str> = a.dependencies().into_iter().collect();
            println!("          Reads:    {}", reads.join(", "));
            println!("          At start: {}", if now { "reachable" } else { "hidden" });
        }
    }
    Ok(())
}
