pub mod precondition;
pub mod registry;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

pub use precondition::{Precondition, Requirement};
pub use registry::{Declaration, Registry, RegistryBuilder};

/// How a control is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// One click target per option.
    SingleSelect,
    Toggle,
    /// Press and release are distinct gestures.
    HoldToggle,
    /// Momentary button without state.
    Refresh,
    /// Ring of options stepped one click at a time.
    Cycle,
    /// Click to open, then navigate with the keyboard.
    Dropdown,
    RelativeSlider,
    MidiDiscreteToggle,
    MidiContinuousToggle,
    MidiSlider,
}

impl Kind {
    pub const ALL: [Kind; 10] = [
        Kind::SingleSelect,
        Kind::Toggle,
        Kind::HoldToggle,
        Kind::Refresh,
        Kind::Cycle,
        Kind::Dropdown,
        Kind::RelativeSlider,
        Kind::MidiDiscreteToggle,
        Kind::MidiContinuousToggle,
        Kind::MidiSlider,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Kind::SingleSelect => "single-select",
            Kind::Toggle => "toggle",
            Kind::HoldToggle => "hold-toggle",
            Kind::Refresh => "refresh",
            Kind::Cycle => "cycle",
            Kind::Dropdown => "dropdown",
            Kind::RelativeSlider => "relative-slider",
            Kind::MidiDiscreteToggle => "midi-discrete-toggle",
            Kind::MidiContinuousToggle => "midi-continuous-toggle",
            Kind::MidiSlider => "midi-slider",
        }
    }

    /// MIDI affordances bypass the GUI and are never gated.
    pub fn is_midi(self) -> bool {
        matches!(
            self,
            Kind::MidiDiscreteToggle | Kind::MidiContinuousToggle | Kind::MidiSlider
        )
    }

    /// Kinds whose state is one of a declared list of options.
    pub fn has_options(self) -> bool {
        matches!(self, Kind::SingleSelect | Kind::Cycle | Kind::Dropdown)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|k| k.label() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Kind::ALL.iter().map(|k| k.label()).collect();
                format!("unknown kind '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Discrete state of an affordance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    Selected(String),
    On,
    Off,
    Held,
    Released,
    /// Refresh buttons and sliders carry no discrete state.
    Stateless,
}

impl State {
    pub fn selected(option: &str) -> Self {
        State::Selected(option.to_string())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Selected(option) => f.write_str(option),
            State::On => f.write_str("on"),
            State::Off => f.write_str("off"),
            State::Held => f.write_str("held"),
            State::Released => f.write_str("released"),
            State::Stateless => f.write_str("-"),
        }
    }
}

/// Window rectangle in absolute screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Express an absolute pixel inside this rectangle as fractions of its size.
    pub fn normalize(&self, x: i32, y: i32) -> Anchor {
        Anchor {
            x: (x - self.left) as f64 / self.width() as f64,
            y: (y - self.top) as f64 / self.height() as f64,
        }
    }

    /// Inverse of [`Rect::normalize`], rounded to the nearest pixel.
    pub fn locate(&self, anchor: Anchor) -> ScreenPoint {
        ScreenPoint {
            x: self.left + (anchor.x * self.width() as f64).round() as i32,
            y: self.top + (anchor.y * self.height() as f64).round() as i32,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(L{}, T{}, R{}, B{})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Position relative to the window, both axes in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for ScreenPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// What a MIDI affordance transmits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiBinding {
    Note { key: u8, velocity: u8 },
    Controller(u8),
}

/// One registered control. Built by [`RegistryBuilder`], immutable afterwards.
#[derive(Debug, Clone)]
pub struct Affordance {
    name: String,
    kind: Kind,
    options: Vec<String>,
    anchors: Vec<Anchor>,
    precondition: Precondition,
    option_preconditions: HashMap<usize, Precondition>,
    midi: Option<MidiBinding>,
    initial: State,
}

impl Affordance {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn midi(&self) -> Option<MidiBinding> {
        self.midi
    }

    pub fn initial(&self) -> &State {
        &self.initial
    }

    pub fn precondition(&self) -> &Precondition {
        &self.precondition
    }

    pub fn option_index(&self, option: &str) -> Option<usize> {
        self.options.iter().position(|o| o == option)
    }

    fn state_index(&self, state: &State) -> Option<usize> {
        match state {
            State::Selected(option) => self.option_index(option),
            _ => None,
        }
    }

    pub fn valid_states(&self) -> Vec<State> {
        match self.kind {
            Kind::SingleSelect | Kind::Cycle | Kind::Dropdown => {
                self.options.iter().map(|o| State::selected(o)).collect()
            }
            Kind::Toggle | Kind::MidiDiscreteToggle | Kind::MidiContinuousToggle => {
                vec![State::Off, State::On]
            }
            Kind::HoldToggle => vec![State::Released, State::Held],
            Kind::Refresh | Kind::RelativeSlider | Kind::MidiSlider => vec![State::Stateless],
        }
    }

    pub fn is_valid(&self, state: &State) -> bool {
        match (self.kind, state) {
            (Kind::SingleSelect | Kind::Cycle | Kind::Dropdown, State::Selected(option)) => {
                self.options.contains(option)
            }
            (Kind::Toggle | Kind::MidiDiscreteToggle | Kind::MidiContinuousToggle, s) => {
                matches!(s, State::On | State::Off)
            }
            (Kind::HoldToggle, s) => matches!(s, State::Held | State::Released),
            (Kind::Refresh | Kind::RelativeSlider | Kind::MidiSlider, s) => {
                *s == State::Stateless
            }
            _ => false,
        }
    }

    /// Precondition gating a move to `target`. Options of a single-select may
    /// override the shared one.
    pub fn precondition_for(&self, target: &State) -> &Precondition {
        self.state_index(target)
            .and_then(|i| self.option_preconditions.get(&i))
            .unwrap_or(&self.precondition)
    }

    /// Click target for `target`: its own anchor for single-selects, the shared
    /// one otherwise.
    pub fn anchor_for(&self, target: &State) -> Option<Anchor> {
        match self.kind {
            Kind::SingleSelect => self.state_index(target).map(|i| self.anchors[i]),
            _ => self.anchors.first().copied(),
        }
    }

    /// Parse a user-supplied state name, accepting the option spelling for
    /// option kinds and on/off, held/released or trigger for the rest.
    pub fn parse_state(&self, text: &str) -> Option<State> {
        let state = match self.kind {
            Kind::SingleSelect | Kind::Cycle | Kind::Dropdown => self
                .options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(text))
                .map(|o| State::selected(o))?,
            Kind::Toggle | Kind::MidiDiscreteToggle | Kind::MidiContinuousToggle => {
                match text.to_ascii_lowercase().as_str() {
                    "on" | "true" => State::On,
                    "off" | "false" => State::Off,
                    _ => return None,
                }
            }
            Kind::HoldToggle => match text.to_ascii_lowercase().as_str() {
                "held" | "hold" | "press" => State::Held,
                "released" | "release" => State::Released,
                _ => return None,
            },
            Kind::Refresh | Kind::RelativeSlider | Kind::MidiSlider => {
                match text.to_ascii_lowercase().as_str() {
                    "trigger" | "-" | "" => State::Stateless,
                    _ => return None,
                }
            }
        };
        Some(state)
    }

    /// Names of every affordance this one's preconditions read.
    pub fn dependencies(&self) -> BTreeSet<&str> {
        std::iter::once(&self.precondition)
            .chain(self.option_preconditions.values())
            .flat_map(|p| p.requirements())
            .map(|r| r.dependency.as_str())
            .collect()
    }
}
