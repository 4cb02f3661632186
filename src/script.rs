use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::controller::{Controller, Outcome};
use crate::input::{Action, Recorder};
use crate::layout;
use crate::midi::MidiTransport;

/// A list of transitions to drive, in order.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    #[serde(default)]
    pub affordance: String,
    pub state: Option<String>,
    pub value: Option<u8>,
    pub drag: Option<f64>,
    /// Raw note number, played without touching any affordance state.
    pub note: Option<u8>,
    pub velocity: Option<u8>,
    #[serde(default)]
    pub release: bool,
    /// `true` presses the sustain pedal, `false` lets it go.
    pub sustain: Option<bool>,
}

const DEFAULT_VELOCITY: u8 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    State(String),
    Value(u8),
    Drag(f64),
    Note { key: u8, velocity: u8, release: bool },
    Sustain(bool),
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::State(s) => write!(f, "-> {s}"),
            Request::Value(v) => write!(f, "= {v}"),
            Request::Drag(d) => write!(f, "drag {d:+}"),
            Request::Note {
                key,
                velocity,
                release,
            } => {
                let what = if *release { "off" } else { "on" };
                write!(f, "{key} {what} (velocity {velocity})")
            }
            Request::Sustain(pressed) => write!(f, "-> {}", if *pressed { "on" } else { "off" }),
        }
    }
}

impl Step {
    pub fn request(&self) -> anyhow::Result<Request> {
        let given = [
            self.state.is_some(),
            self.value.is_some(),
            self.drag.is_some(),
            self.note.is_some(),
            self.sustain.is_some(),
        ];
        if given.iter().filter(|&&g| g).count() != 1 {
            anyhow::bail!("step needs exactly one of state, value, drag, note or sustain");
        }
        if self.note.is_none() && (self.velocity.is_some() || self.release) {
            anyhow::bail!("velocity and release only apply to note steps");
        }
        if (self.note.is_some() || self.sustain.is_some()) && !self.affordance.is_empty() {
            anyhow::bail!(
                "note and sustain steps take no affordance (got '{}')",
                self.affordance
            );
        }

        if let Some(key) = self.note {
            let velocity = self.velocity.unwrap_or(DEFAULT_VELOCITY);
            if key > 127 || velocity > 127 {
                anyhow::bail!("note {key} with velocity {velocity} is out of MIDI range");
            }
            return Ok(Request::Note {
                key,
                velocity,
                release: self.release,
            });
        }
        if let Some(pressed) = self.sustain {
            return Ok(Request::Sustain(pressed));
        }

        if self.affordance.is_empty() {
            anyhow::bail!("step needs an affordance");
        }
        match (&self.state, self.value, self.drag) {
            (Some(state), _, _) => Ok(Request::State(state.clone())),
            (_, Some(value), _) => Ok(Request::Value(value)),
            (_, _, Some(drag)) => Ok(Request::Drag(drag)),
            _ => anyhow::bail!("step for '{}' has nothing to do", self.affordance),
        }
    }

    /// Affordance the step acts on, for reporting.
    fn target(&self) -> &str {
        match (self.note, self.sustain) {
            (Some(_), _) => layout::NOTE,
            (_, Some(_)) => layout::SUSTAIN,
            _ => &self.affordance,
        }
    }
}

pub fn load(path: &Path) -> anyhow::Result<Script> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> anyhow::Result<Script> {
    let script: Script = toml::from_str(content)?;
    for (i, step) in script.steps.iter().enumerate() {
        step.request()
            .map_err(|e| anyhow::anyhow!("step {}: {e}", i + 1))?;
    }
    Ok(script)
}

/// What one step did.
pub struct StepReport {
    pub affordance: String,
    pub request: Request,
    pub outcome: Outcome,
    pub actions: Vec<Action>,
}

/// Execute every step. Unreachable steps are reported and skipped; any other
/// failure stops the script.
pub fn run<M: MidiTransport>(
    controller: &mut Controller<Recorder, M>,
    script: &Script,
) -> anyhow::Result<Vec<StepReport>> {
    let mut reports = Vec::with_capacity(script.steps.len());

    for (i, step) in script.steps.iter().enumerate() {
        let name = step.target();
        let request = step.request()?;
        let outcome = match &request {
            Request::State(text) => {
                let affordance = controller
                    .registry()
                    .get(name)
                    .ok_or_else(|| anyhow::anyhow!("step {}: no affordance named '{name}'", i + 1))?;
                let target = affordance.parse_state(text).ok_or_else(|| {
                    let valid: Vec<String> =
                        affordance.valid_states().iter().map(|s| s.to_string()).collect();
                    anyhow::anyhow!(
                        "step {}: '{text}' is not a state of '{name}' (valid: {})",
                        i + 1,
                        valid.join(", ")
                    )
                })?;
                controller.perform(name, &target)
            }
            Request::Value(value) => controller.set_value(name, *value),
            Request::Drag(delta) => controller.drag(name, *delta),
            Request::Note {
                key,
                velocity,
                release,
            } => controller
                .note(*key, *velocity, *release)
                .map(|()| Outcome::Applied(1)),
            Request::Sustain(pressed) => controller.sustain(!pressed),
        }
        .map_err(|e| anyhow::anyhow!("step {}: {e}", i + 1))?;

        reports.push(StepReport {
            affordance: name.to_string(),
            request,
            outcome,
            actions: controller.input_mut().take(),
        });
    }

    Ok(reports)
}
