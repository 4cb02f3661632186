use std::collections::{HashMap, HashSet};

use super::{Affordance, Kind, MidiBinding, Precondition, Rect, Requirement, State};
use crate::error::RegistryError;

/// Declarative description of one affordance, in reference-window pixels.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: Kind,
    pub name: String,
    pub options: Vec<String>,
    pub anchors: Vec<(i32, i32)>,
    pub precondition: Precondition,
    /// Per-option overrides of `precondition` (single-select only).
    pub option_preconditions: Vec<(String, Precondition)>,
    pub midi: Option<MidiBinding>,
}

impl Declaration {
    pub fn new(kind: Kind, name: &str) -> Self {
        Declaration {
            kind,
            name: name.to_string(),
            options: Vec::new(),
            anchors: Vec::new(),
            precondition: Precondition::always(),
            option_preconditions: Vec::new(),
            midi: None,
        }
    }

    pub fn select(name: &str, options: &[&str], anchors: &[(i32, i32)]) -> Self {
        Self::new(Kind::SingleSelect, name)
            .options(options)
            .anchors(anchors)
    }

    pub fn toggle(name: &str, anchor: (i32, i32)) -> Self {
        Self::new(Kind::Toggle, name).anchors(&[anchor])
    }

    pub fn hold_toggle(name: &str, anchor: (i32, i32)) -> Self {
        Self::new(Kind::HoldToggle, name).anchors(&[anchor])
    }

    pub fn refresh(name: &str, anchor: (i32, i32)) -> Self {
        Self::new(Kind::Refresh, name).anchors(&[anchor])
    }

    pub fn cycle(name: &str, options: &[&str], anchor: (i32, i32)) -> Self {
        Self::new(Kind::Cycle, name).options(options).anchors(&[anchor])
    }

    pub fn dropdown(name: &str, options: &[&str], anchor: (i32, i32)) -> Self {
        Self::new(Kind::Dropdown, name)
            .options(options)
            .anchors(&[anchor])
    }

    pub fn slider(name: &str, anchor: (i32, i32)) -> Self {
        Self::new(Kind::RelativeSlider, name).anchors(&[anchor])
    }

    pub fn midi_slider(name: &str, controller: u8) -> Self {
        Self::new(Kind::MidiSlider, name).midi(MidiBinding::Controller(controller))
    }

    pub fn midi_toggle(name: &str, controller: u8) -> Self {
        Self::new(Kind::MidiContinuousToggle, name).midi(MidiBinding::Controller(controller))
    }

    pub fn midi_note(name: &str, key: u8, velocity: u8) -> Self {
        Self::new(Kind::MidiDiscreteToggle, name).midi(MidiBinding::Note { key, velocity })
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn anchors(mut self, anchors: &[(i32, i32)]) -> Self {
        self.anchors = anchors.to_vec();
        self
    }

    pub fn requires(mut self, precondition: Precondition) -> Self {
        self.precondition = precondition;
        self
    }

    pub fn option_requires(mut self, option: &str, precondition: Precondition) -> Self {
        self.option_preconditions
            .push((option.to_string(), precondition));
        self
    }

    pub fn midi(mut self, binding: MidiBinding) -> Self {
        self.midi = Some(binding);
        self
    }
}

/// Collects declarations leaf-first, then [`finalize`](RegistryBuilder::finalize)s
/// them into an immutable [`Registry`].
pub struct RegistryBuilder {
    reference: Rect,
    entries: Vec<Affordance>,
    index: HashMap<String, usize>,
}

impl RegistryBuilder {
    /// `reference` is the window rectangle the declared pixel anchors were
    /// captured against.
    pub fn new(reference: Rect) -> Self {
        RegistryBuilder {
            reference,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn register(&mut self, decl: Declaration) -> Result<(), RegistryError> {
        if self.index.contains_key(&decl.name) {
            return Err(RegistryError::DuplicateName(decl.name));
        }
        self.check_shape(&decl)?;

        let mut option_preconditions = HashMap::new();
        for (option, pre) in &decl.option_preconditions {
            let i = decl
                .options
                .iter()
                .position(|o| o == option)
                .ok_or_else(|| {
                    RegistryError::malformed(
                        &decl.name,
                        format!("precondition given for unknown option '{option}'"),
                    )
                })?;
            if option_preconditions.insert(i, pre.clone()).is_some() {
                return Err(RegistryError::malformed(
                    &decl.name,
                    format!("option '{option}' has two preconditions"),
                ));
            }
        }

        for requirement in std::iter::once(&decl.precondition)
            .chain(decl.option_preconditions.iter().map(|(_, p)| p))
            .flat_map(|p| p.requirements())
        {
            if !self.index.contains_key(&requirement.dependency) {
                return Err(RegistryError::malformed(
                    &decl.name,
                    format!(
                        "depends on '{}', which must be registered first",
                        requirement.dependency
                    ),
                ));
            }
        }

        let anchors = decl
            .anchors
            .iter()
            .map(|&(x, y)| self.reference.normalize(x, y))
            .collect();

        log::trace!("Registered {} '{}'", decl.kind, decl.name);
        self.index.insert(decl.name.clone(), self.entries.len());
        self.entries.push(Affordance {
            name: decl.name,
            kind: decl.kind,
            options: decl.options,
            anchors,
            precondition: decl.precondition,
            option_preconditions,
            midi: decl.midi,
            // Assigned in finalize().
            initial: State::Stateless,
        });
        Ok(())
    }

    /// Expand one declaration into one affordance per `branches` value of
    /// `branch_on`. Each copy is named `<name>_<branch>` (lowercased) and
    /// additionally requires `branch_on` to hold that branch.
    pub fn register_branches(
        &mut self,
        decl: Declaration,
        branch_on: &str,
        branches: &[&str],
    ) -> Result<(), RegistryError> {
        if branches.is_empty() {
            return Err(RegistryError::malformed(&decl.name, "no branches to expand"));
        }
        for branch in branches {
            let requirement = Requirement::selected(branch_on, &[*branch]);
            let mut concrete = decl.clone();
            concrete.name = format!("{}_{}", decl.name, branch.to_lowercase());
            concrete.precondition = concrete.precondition.and(requirement.clone());
            for (_, pre) in &mut concrete.option_preconditions {
                *pre = std::mem::take(pre).and(requirement.clone());
            }
            self.register(concrete)?;
        }
        Ok(())
    }

    fn check_shape(&self, decl: &Declaration) -> Result<(), RegistryError> {
        let name = decl.name.as_str();
        let kind = decl.kind;

        let mut seen = HashSet::new();
        if let Some(dup) = decl.options.iter().find(|o| !seen.insert(o.as_str())) {
            return Err(RegistryError::malformed(name, format!("option '{dup}' declared twice")));
        }

        if kind.has_options() && decl.options.is_empty() {
            return Err(RegistryError::malformed(name, format!("{kind} needs at least one option")));
        }
        if !kind.has_options() && !decl.options.is_empty() {
            return Err(RegistryError::malformed(name, format!("{kind} takes no options")));
        }
        if kind != Kind::SingleSelect && !decl.option_preconditions.is_empty() {
            return Err(RegistryError::malformed(
                name,
                "per-option preconditions are only meaningful on single-select",
            ));
        }

        if kind.is_midi() {
            if !decl.anchors.is_empty() {
                return Err(RegistryError::malformed(name, "MIDI affordances have no anchors"));
            }
            if !decl.precondition.is_always() {
                return Err(RegistryError::malformed(name, "MIDI affordances cannot be gated"));
            }
            match (kind, decl.midi) {
                (Kind::MidiDiscreteToggle, Some(MidiBinding::Note { key, velocity }))
                    if key <= 127 && velocity <= 127 => {}
                (
                    Kind::MidiContinuousToggle | Kind::MidiSlider,
                    Some(MidiBinding::Controller(cc)),
                ) if cc <= 127 => {}
                _ => {
                    return Err(RegistryError::malformed(
                        name,
                        format!("{kind} needs a matching MIDI binding in 0..=127"),
                    ));
                }
            }
            return Ok(());
        }

        if decl.midi.is_some() {
            return Err(RegistryError::malformed(name, format!("{kind} cannot carry a MIDI binding")));
        }
        let expected = if kind == Kind::SingleSelect {
            decl.options.len()
        } else {
            1
        };
        if decl.anchors.len() != expected {
            return Err(RegistryError::malformed(
                name,
                format!(
                    "{} option(s) but {} anchor(s)",
                    decl.options.len(),
                    decl.anchors.len()
                ),
            ));
        }
        Ok(())
    }

    /// Assign initial states and check that every precondition refers to a
    /// registered affordance and to states it can actually hold.
    pub fn finalize(mut self) -> Result<Registry, RegistryError> {
        for entry in &mut self.entries {
            entry.initial = match entry.kind {
                Kind::SingleSelect | Kind::Cycle | Kind::Dropdown => {
                    State::Selected(entry.options[0].clone())
                }
                Kind::Toggle | Kind::MidiDiscreteToggle | Kind::MidiContinuousToggle => State::Off,
                Kind::HoldToggle => State::Released,
                Kind::Refresh | Kind::RelativeSlider | Kind::MidiSlider => State::Stateless,
            };
        }

        for entry in &self.entries {
            let preconditions = std::iter::once(&entry.precondition)
                .chain(entry.option_preconditions.values());
            for requirement in preconditions.flat_map(|p| p.requirements()) {
                let Some(&dep) = self.index.get(&requirement.dependency) else {
                    return Err(RegistryError::UnresolvedDependency {
                        name: entry.name.clone(),
                        dependency: requirement.dependency.clone(),
                        state: None,
                    });
                };
                let dependency = &self.entries[dep];
                if let Some(bad) = requirement.accepted.iter().find(|s| !dependency.is_valid(s)) {
                    return Err(RegistryError::UnresolvedDependency {
                        name: entry.name.clone(),
                        dependency: requirement.dependency.clone(),
                        state: Some(bad.to_string()),
                    });
                }
            }
        }

        log::debug!("Finalized {} affordances", self.entries.len());
        Ok(Registry {
            reference: self.reference,
            entries: self.entries,
            index: self.index,
        })
    }
}

/// The finished affordance table, in registration order.
#[derive(Debug)]
pub struct Registry {
    reference: Rect,
    entries: Vec<Affordance>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn get(&self, name: &str) -> Option<&Affordance> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Affordance> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn reference(&self) -> Rect {
        self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: Rect = Rect::new(4, 23, 1946, 1318);

    fn advanced() -> Precondition {
        Precondition::all([Requirement::selected("primary_tabs", &["Advanced"])])
    }

    fn builder() -> RegistryBuilder {
        let mut b = RegistryBuilder::new(REFERENCE);
        b.register(Declaration::select(
            "primary_tabs",
            &["Advanced", "Sequencer"],
            &[(1586, 102), (1716, 103)],
        ))
        .unwrap();
        b
    }

    #[test]
    fn initial_states_are_valid() {
        let mut b = builder();
        b.register(Declaration::toggle("fx1", (1556, 199)).requires(advanced()))
            .unwrap();
        b.register(Declaration::hold_toggle("repeat", (1257, 260))).unwrap();
        b.register(Declaration::refresh("roll_dice", (1695, 260))).unwrap();
        b.register(Declaration::cycle("rate", &["Free", "All"], (771, 710)))
            .unwrap();
        b.register(Declaration::slider("timbre", (1524, 1285))).unwrap();
        b.register(Declaration::midi_slider("cutoff", 74)).unwrap();
        b.register(Declaration::midi_toggle("hold_pedal", 64)).unwrap();
        b.register(Declaration::midi_note("note", 60, 100)).unwrap();
        let registry = b.finalize().unwrap();

        for a in registry.iter() {
            assert!(a.is_valid(a.initial()), "{} starts in {:?}", a.name(), a.initial());
        }
        assert_eq!(
            registry.get("primary_tabs").unwrap().initial(),
            &State::selected("Advanced")
        );
        assert_eq!(registry.get("fx1").unwrap().initial(), &State::Off);
        assert_eq!(registry.get("repeat").unwrap().initial(), &State::Released);
        assert_eq!(registry.get("roll_dice").unwrap().initial(), &State::Stateless);
        assert_eq!(registry.get("note").unwrap().initial(), &State::Off);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut b = builder();
        let err = b
            .register(Declaration::toggle("primary_tabs", (1, 1)))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("primary_tabs".into()));
    }

    #[test]
    fn option_anchor_mismatch_rejected() {
        let mut b = builder();
        let err = b
            .register(Declaration::select("fx_tabs", &["FX_1", "FX_2", "FX_3"], &[(1, 1), (2, 2)]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::MalformedSpec { ref name, .. } if name == "fx_tabs"));
    }

    #[test]
    fn dependency_must_be_registered_first() {
        let mut b = RegistryBuilder::new(REFERENCE);
        let err = b
            .register(Declaration::toggle("fx1", (1556, 199)).requires(advanced()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::MalformedSpec { .. }));
    }

    #[test]
    fn unknown_dependency_state_fails_finalize() {
        let mut b = builder();
        b.register(Declaration::toggle("fx1", (1556, 199)).requires(Precondition::all([
            Requirement::selected("primary_tabs", &["Mixer"]),
        ])))
        .unwrap();
        let err = b.finalize().unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnresolvedDependency {
                name: "fx1".into(),
                dependency: "primary_tabs".into(),
                state: Some("Mixer".into()),
            }
        );
    }

    #[test]
    fn toggle_with_two_anchors_rejected() {
        let mut b = builder();
        let mut decl = Declaration::toggle("fx1", (1, 1));
        decl.anchors.push((2, 2));
        assert!(b.register(decl).is_err());
    }

    #[test]
    fn midi_affordance_cannot_be_gated() {
        let mut b = builder();
        let err = b
            .register(Declaration::midi_slider("cutoff", 74).requires(advanced()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::MalformedSpec { .. }));
    }

    #[test]
    fn midi_controller_out_of_range_rejected() {
        let mut b = builder();
        assert!(b.register(Declaration::midi_slider("cutoff", 128)).is_err());
    }

    #[test]
    fn option_precondition_for_unknown_option_rejected() {
        let mut b = builder();
        let decl = Declaration::select("n_bars", &["1", "2"], &[(1, 1), (2, 2)])
            .option_requires("3", advanced());
        assert!(b.register(decl).is_err());
    }

    #[test]
    fn option_precondition_overrides_shared() {
        let mut b = builder();
        let sequencer = Precondition::all([Requirement::selected("primary_tabs", &["Sequencer"])]);
        b.register(
            Declaration::select("slot", &["Macro_1_1", "mod_src_1"], &[(422, 1032), (141, 1042)])
                .requires(advanced())
                .option_requires("mod_src_1", sequencer.clone()),
        )
        .unwrap();
        let registry = b.finalize().unwrap();
        let slot = registry.get("slot").unwrap();
        assert_eq!(slot.precondition_for(&State::selected("Macro_1_1")), &advanced());
        assert_eq!(slot.precondition_for(&State::selected("mod_src_1")), &sequencer);
    }

    #[test]
    fn branches_expand_with_augmented_precondition() {
        let mut b = builder();
        b.register(
            Declaration::select("fx_tabs", &["FX_1", "FX_2", "FX_3"], &[(1598, 200), (1718, 197), (1840, 198)])
                .requires(advanced()),
        )
        .unwrap();
        b.register_branches(
            Declaration::dropdown("type_fx", &["Chorus", "Phaser"], (1524, 241)).requires(advanced()),
            "fx_tabs",
            &["FX_1", "FX_2", "FX_3"],
        )
        .unwrap();
        let registry = b.finalize().unwrap();

        for (name, tab) in [("type_fx_fx_1", "FX_1"), ("type_fx_fx_2", "FX_2"), ("type_fx_fx_3", "FX_3")] {
            let a = registry.get(name).unwrap();
            assert_eq!(a.kind(), Kind::Dropdown);
            assert_eq!(a.options(), ["Chorus", "Phaser"]);
            assert_eq!(
                a.precondition(),
                &advanced().and(Requirement::selected("fx_tabs", &[tab]))
            );
        }
        assert!(registry.get("type_fx").is_none());
    }

    #[test]
    fn anchors_are_normalized() {
        let mut b = builder();
        b.register(Declaration::toggle("corner", (1946, 1318))).unwrap();
        let registry = b.finalize().unwrap();
        let anchor = registry.get("corner").unwrap().anchor_for(&State::On).unwrap();
        assert_eq!((anchor.x, anchor.y), (1.0, 1.0));
    }
}
