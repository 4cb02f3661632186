use crate::affordance::{Affordance, Kind, MidiBinding, Registry, State, precondition};
use crate::error::DispatchError;
use crate::input::{InputBackend, Key, MouseButton};
use crate::midi::{MidiEvent, MidiTransport};
use crate::store::StateStore;

/// Result of a transition request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The given number of primitive actions or MIDI messages were issued.
    Applied(usize),
    /// Already in the requested state; nothing was issued.
    Unchanged,
    /// The precondition does not hold right now; nothing was issued.
    Unreachable,
}

/// Owns the affordance table and live state, and turns requested states into
/// clicks, key presses and MIDI messages.
pub struct Controller<B, M> {
    registry: Registry,
    store: StateStore,
    input: B,
    midi: M,
}

impl<B: InputBackend, M: MidiTransport> Controller<B, M> {
    pub fn new(registry: Registry, input: B, midi: M) -> Self {
        let store = StateStore::new(&registry);
        Controller {
            registry,
            store,
            input,
            midi,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.store.get(name)
    }

    pub fn input_mut(&mut self) -> &mut B {
        &mut self.input
    }

    pub fn midi_mut(&mut self) -> &mut M {
        &mut self.midi
    }

    fn lookup(&self, name: &str) -> Result<&Affordance, DispatchError> {
        self.registry
            .get(name)
            .ok_or_else(|| DispatchError::UnknownAffordance(name.to_string()))
    }

    /// Whether moving `name` to `target` would pass its precondition now.
    pub fn interactable(&self, name: &str, target: &State) -> Result<bool, DispatchError> {
        let affordance = self.lookup(name)?;
        if !affordance.is_valid(target) {
            return Err(invalid(name, target));
        }
        precondition::satisfied(affordance.precondition_for(target), &self.store).map_err(|e| {
            DispatchError::Uninitialized {
                name: name.to_string(),
                dependency: e.0,
            }
        })
    }

    /// Drive `name` into `target`, updating tracked state once the actions
    /// have been issued.
    pub fn perform(&mut self, name: &str, target: &State) -> Result<Outcome, DispatchError> {
        let affordance = self.lookup(name)?.clone();
        if !affordance.is_valid(target) {
            return Err(invalid(name, target));
        }
        let kind = affordance.kind();

        // Sliders carry no discrete state; values go through set_value() and drag().
        if matches!(kind, Kind::RelativeSlider | Kind::MidiSlider) {
            return Ok(Outcome::Unchanged);
        }

        let current = self
            .store
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::Uninitialized {
                name: name.to_string(),
                dependency: name.to_string(),
            })?;
        if kind != Kind::Refresh && current == *target {
            log::debug!("{name} already {target}");
            return Ok(Outcome::Unchanged);
        }

        if kind.is_midi() {
            let event = match affordance.midi() {
                Some(MidiBinding::Note { key, velocity }) => {
                    MidiEvent::toggle(name, *target == State::On, key, velocity)
                }
                Some(MidiBinding::Controller(controller)) => MidiEvent::ControlChange {
                    controller,
                    value: if *target == State::On { 127 } else { 0 },
                },
                None => return Err(wrong_kind(&affordance)),
            };
            self.midi.send(&event).map_err(DispatchError::Midi)?;
            self.store.set(name, target.clone());
            log::info!("{name}: {current} -> {target}");
            return Ok(Outcome::Applied(1));
        }

        if !self.interactable(name, target)? {
            log::warn!(
                "{name} -> {target} unreachable (needs {})",
                affordance.precondition_for(target)
            );
            return Ok(Outcome::Unreachable);
        }

        let Some(anchor) = affordance.anchor_for(target) else {
            return Err(invalid(name, target));
        };
        let at = self.input.window_rect().locate(anchor);

        let issued = match kind {
            Kind::SingleSelect | Kind::Toggle | Kind::Refresh => {
                self.input
                    .click(at, MouseButton::Left)
                    .map_err(DispatchError::Backend)?;
                1
            }
            Kind::HoldToggle => {
                let gesture = if *target == State::Held {
                    self.input.hold(at)
                } else {
                    self.input.release(at)
                };
                gesture.map_err(DispatchError::Backend)?;
                1
            }
            Kind::Cycle => {
                let (steps, button) = cycle_path(&affordance, &current, target);
                let options = affordance.options();
                let n = options.len();
                let mut position = option_position(&affordance, &current);
                // Each click moves the control one position.
                for _ in 0..steps {
                    self.input.click(at, button).map_err(DispatchError::Backend)?;
                    position = match button {
                        MouseButton::Left => (position + 1) % n,
                        MouseButton::Right => (position + n - 1) % n,
                    };
                    self.store.set(name, State::selected(&options[position]));
                }
                steps
            }
            Kind::Dropdown => {
                let index = affordance
                    .options()
                    .iter()
                    .position(|o| matches!(target, State::Selected(t) if t == o))
                    .ok_or_else(|| invalid(name, target))?;
                self.input
                    .click(at, MouseButton::Left)
                    .map_err(DispatchError::Backend)?;
                for _ in 0..=index {
                    self.input.press_key(Key::Down).map_err(DispatchError::Backend)?;
                }
                self.input.press_key(Key::Enter).map_err(DispatchError::Backend)?;
                index + 3
            }
            Kind::RelativeSlider
            | Kind::MidiDiscreteToggle
            | Kind::MidiContinuousToggle
            | Kind::MidiSlider => unreachable!("handled above"),
        };

        if kind == Kind::Refresh {
            log::info!("{name}: triggered");
        } else {
            self.store.set(name, target.clone());
            log::info!("{name}: {current} -> {target}");
        }
        Ok(Outcome::Applied(issued))
    }

    /// Send `value` on a MIDI slider's controller.
    pub fn set_value(&mut self, name: &str, value: u8) -> Result<Outcome, DispatchError> {
        let affordance = self.lookup(name)?;
        let Some(MidiBinding::Controller(controller)) = affordance.midi() else {
            return Err(wrong_kind(affordance));
        };
        if affordance.kind() != Kind::MidiSlider {
            return Err(wrong_kind(affordance));
        }
        if value > 127 {
            return Err(DispatchError::InvalidState {
                name: name.to_string(),
                state: value.to_string(),
            });
        }
        self.midi
            .send(&MidiEvent::ControlChange { controller, value })
            .map_err(DispatchError::Midi)?;
        Ok(Outcome::Applied(1))
    }

    /// Drag a relative slider by `delta` of the window height; positive is up.
    /// `delta` must lie in -1.0..=1.0.
    pub fn drag(&mut self, name: &str, delta: f64) -> Result<Outcome, DispatchError> {
        let affordance = self.lookup(name)?.clone();
        if affordance.kind() != Kind::RelativeSlider {
            return Err(wrong_kind(&affordance));
        }
        if !(-1.0..=1.0).contains(&delta) {
            return Err(DispatchError::InvalidState {
                name: name.to_string(),
                state: delta.to_string(),
            });
        }
        if !self.interactable(name, &State::Stateless)? {
            log::warn!(
                "{name} drag unreachable (needs {})",
                affordance.precondition()
            );
            return Ok(Outcome::Unreachable);
        }
        let Some(anchor) = affordance.anchor_for(&State::Stateless) else {
            return Err(wrong_kind(&affordance));
        };
        let window = self.input.window_rect();
        let from = window.locate(anchor);
        let mut to = from;
        to.y = to.y.saturating_sub((delta * window.height() as f64).round() as i32);

        self.input.hold(from).map_err(DispatchError::Backend)?;
        self.input.release(to).map_err(DispatchError::Backend)?;
        log::info!("{name}: dragged {delta:+.3}");
        Ok(Outcome::Applied(2))
    }

    /// Play or release an arbitrary note, bypassing the affordance table.
    pub fn note(&mut self, key: u8, velocity: u8, release: bool) -> Result<(), DispatchError> {
        let event = if release {
            MidiEvent::NoteOff { key, velocity }
        } else {
            MidiEvent::NoteOn { key, velocity }
        };
        self.midi.send(&event).map_err(DispatchError::Midi)
    }

    /// Press or release the sustain pedal.
    pub fn sustain(&mut self, release: bool) -> Result<Outcome, DispatchError> {
        let target = if release { State::Off } else { State::On };
        self.perform(crate::layout::SUSTAIN, &target)
    }
}

fn option_position(affordance: &Affordance, state: &State) -> usize {
    match state {
        State::Selected(o) => affordance.option_index(o).unwrap_or(0),
        _ => 0,
    }
}

/// Number of clicks and direction to go from `current` to `target` around a
/// cycle. Ties go forward.
fn cycle_path(affordance: &Affordance, current: &State, target: &State) -> (usize, MouseButton) {
    let n = affordance.options().len();
    let (c, t) = (
        option_position(affordance, current),
        option_position(affordance, target),
    );
    let forward = (t + n - c) % n;
    let backward = (c + n - t) % n;
    if forward <= backward {
        (forward, MouseButton::Left)
    } else {
        (backward, MouseButton::Right)
    }
}

fn invalid(name: &str, state: &State) -> DispatchError {
    DispatchError::InvalidState {
        name: name.to_string(),
        state: state.to_string(),
    }
}

fn wrong_kind(affordance: &Affordance) -> DispatchError {
    DispatchError::WrongKind {
        name: affordance.name().to_string(),
        kind: affordance.kind().label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affordance::{Declaration, Precondition, Rect, RegistryBuilder, Requirement, ScreenPoint};
    use crate::input::{Action, Recorder};

    const REFERENCE: Rect = Rect::new(4, 23, 1946, 1318);

    #[derive(Default)]
    struct SentEvents(Vec<MidiEvent>);

    impl MidiTransport for SentEvents {
        fn send(&mut self, event: &MidiEvent) -> anyhow::Result<()> {
            self.0.push(event.clone());
            Ok(())
        }
    }

    struct BrokenInput;

    impl InputBackend for BrokenInput {
        fn click(&mut self, _: ScreenPoint, _: MouseButton) -> anyhow::Result<()> {
            anyhow::bail!("window gone")
        }
        fn press_key(&mut self, _: Key) -> anyhow::Result<()> {
            anyhow::bail!("window gone")
        }
        fn hold(&mut self, _: ScreenPoint) -> anyhow::Result<()> {
            anyhow::bail!("window gone")
        }
        fn release(&mut self, _: ScreenPoint) -> anyhow::Result<()> {
            anyhow::bail!("window gone")
        }
        fn window_rect(&self) -> Rect {
            REFERENCE
        }
    }

    /// Accepts `clicks_left` clicks, then fails every gesture.
    struct FailsAfter {
        clicks_left: usize,
    }

    impl InputBackend for FailsAfter {
        fn click(&mut self, _: ScreenPoint, _: MouseButton) -> anyhow::Result<()> {
            if self.clicks_left == 0 {
                anyhow::bail!("window gone");
            }
            self.clicks_left -= 1;
            Ok(())
        }
        fn press_key(&mut self, _: Key) -> anyhow::Result<()> {
            anyhow::bail!("window gone")
        }
        fn hold(&mut self, _: ScreenPoint) -> anyhow::Result<()> {
            anyhow::bail!("window gone")
        }
        fn release(&mut self, _: ScreenPoint) -> anyhow::Result<()> {
            anyhow::bail!("window gone")
        }
        fn window_rect(&self) -> Rect {
            REFERENCE
        }
    }

    fn advanced() -> Precondition {
        Precondition::all([Requirement::selected("primary_tabs", &["Advanced"])])
    }

    fn registry() -> Registry {
        let mut b = RegistryBuilder::new(REFERENCE);
        b.register(Declaration::select(
            "primary_tabs",
            &["Advanced", "Sequencer"],
            &[(1586, 102), (1716, 103)],
        ))
        .unwrap();
        b.register(Declaration::toggle("fx1", (1556, 199)).requires(advanced()))
            .unwrap();
        b.register(
            Declaration::cycle(
                "rate_type_lfo1",
                &["Free", "All", "Straight", "Triplet", "Dotted"],
                (771, 710),
            )
            .requires(advanced()),
        )
        .unwrap();
        b.register(
            Declaration::dropdown(
                "type_osc_1",
                &["Basic_Waves", "SuperWave", "Harmo", "KarplusStr", "Wavetable"],
                (476, 200),
            )
            .requires(advanced()),
        )
        .unwrap();
        b.register(
            Declaration::hold_toggle("repeat_arp_seq", (1257, 260)).requires(Precondition::all([
                Requirement::selected("primary_tabs", &["Sequencer"]),
            ])),
        )
        .unwrap();
        b.register(
            Declaration::refresh("roll_dice_seq", (1695, 260)).requires(Precondition::all([
                Requirement::selected("primary_tabs", &["Sequencer"]),
            ])),
        )
        .unwrap();
        b.register(
            Declaration::select("routing_slot", &["Macro_1_1", "mod_src_1"], &[(422, 1032), (141, 1042)])
                .requires(advanced())
                .option_requires(
                    "mod_src_1",
                    Precondition::all([Requirement::selected("primary_tabs", &["Sequencer"])]),
                ),
        )
        .unwrap();
        b.register(Declaration::slider("timbre", (1524, 1285)).requires(advanced()))
            .unwrap();
        b.register(Declaration::midi_slider("cutoff", 74)).unwrap();
        b.register(Declaration::midi_toggle(crate::layout::SUSTAIN, 64))
            .unwrap();
        b.register(Declaration::midi_note("note", 60, 100)).unwrap();
        b.finalize().unwrap()
    }

    fn controller() -> Controller<Recorder, SentEvents> {
        Controller::new(registry(), Recorder::new(REFERENCE), SentEvents::default())
    }

    fn clicks(actions: &[Action], wanted: MouseButton) -> usize {
        actions
            .iter()
            .filter(|a| matches!(a, Action::Click { button, .. } if *button == wanted))
            .count()
    }

    #[test]
    fn single_select_clicks_target_anchor() {
        let mut c = controller();
        let out = c.perform("primary_tabs", &State::selected("Sequencer")).unwrap();
        assert_eq!(out, Outcome::Applied(1));
        assert_eq!(
            c.input_mut().take(),
            vec![Action::Click {
                at: ScreenPoint { x: 1716, y: 103 },
                button: MouseButton::Left
            }]
        );
        assert_eq!(c.state("primary_tabs"), Some(&State::selected("Sequencer")));
    }

    #[test]
    fn current_state_is_a_no_op_for_every_kind() {
        let mut c = controller();
        let names: Vec<String> = c
            .registry()
            .iter()
            .filter(|a| a.kind() != Kind::Refresh)
            .map(|a| a.name().to_string())
            .collect();
        for name in names {
            let current = c.state(&name).unwrap().clone();
            assert_eq!(c.perform(&name, &current).unwrap(), Outcome::Unchanged, "{name}");
            assert_eq!(c.state(&name), Some(&current));
        }
        assert!(c.input_mut().take().is_empty());
        assert!(c.midi_mut().0.is_empty());
    }

    #[test]
    fn cycle_takes_shorter_backward_path() {
        let mut c = controller();
        let out = c.perform("rate_type_lfo1", &State::selected("Triplet")).unwrap();
        assert_eq!(out, Outcome::Applied(2));
        let actions = c.input_mut().take();
        assert_eq!(clicks(&actions, MouseButton::Right), 2);
        assert_eq!(actions.len(), 2);
        assert_eq!(c.state("rate_type_lfo1"), Some(&State::selected("Triplet")));
    }

    #[test]
    fn cycle_takes_shorter_forward_path() {
        let mut c = controller();
        c.perform("rate_type_lfo1", &State::selected("All")).unwrap();
        assert_eq!(clicks(&c.input_mut().take(), MouseButton::Left), 1);
    }

    #[test]
    fn cycle_click_counts_match_ring_distance() {
        let options = ["Free", "All", "Straight", "Triplet", "Dotted"];
        let n = options.len();
        for from in 0..n {
            for to in 0..n {
                let mut c = controller();
                if from != 0 {
                    c.perform("rate_type_lfo1", &State::selected(options[from])).unwrap();
                    c.input_mut().take();
                }
                c.perform("rate_type_lfo1", &State::selected(options[to])).unwrap();
                let actions = c.input_mut().take();
                let forward = (to + n - from) % n;
                let backward = (from + n - to) % n;
                assert_eq!(actions.len(), forward.min(backward), "{from} -> {to}");
                let expected = if forward <= backward {
                    MouseButton::Left
                } else {
                    MouseButton::Right
                };
                assert_eq!(clicks(&actions, expected), actions.len(), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn cycle_tie_goes_forward() {
        let mut b = RegistryBuilder::new(REFERENCE);
        b.register(Declaration::cycle("ring", &["a", "b", "c", "d"], (10, 10)))
            .unwrap();
        let mut c = Controller::new(b.finalize().unwrap(), Recorder::new(REFERENCE), SentEvents::default());
        assert_eq!(c.perform("ring", &State::selected("c")).unwrap(), Outcome::Applied(2));
        assert_eq!(clicks(&c.input_mut().take(), MouseButton::Left), 2);
    }

    #[test]
    fn dropdown_opens_navigates_and_confirms() {
        let mut c = controller();
        let out = c.perform("type_osc_1", &State::selected("Harmo")).unwrap();
        assert_eq!(out, Outcome::Applied(5));
        let actions = c.input_mut().take();
        assert_eq!(
            actions,
            vec![
                Action::Click {
                    at: ScreenPoint { x: 476, y: 200 },
                    button: MouseButton::Left
                },
                Action::Press(Key::Down),
                Action::Press(Key::Down),
                Action::Press(Key::Down),
                Action::Press(Key::Enter),
            ]
        );
        assert_eq!(c.state("type_osc_1"), Some(&State::selected("Harmo")));
    }

    #[test]
    fn dropdown_first_option_still_moves_down_once() {
        let mut c = controller();
        c.perform("type_osc_1", &State::selected("SuperWave")).unwrap();
        c.input_mut().take();
        c.perform("type_osc_1", &State::selected("Basic_Waves")).unwrap();
        let downs = c
            .input_mut()
            .take()
            .into_iter()
            .filter(|a| *a == Action::Press(Key::Down))
            .count();
        assert_eq!(downs, 1);
    }

    #[test]
    fn failed_precondition_is_unreachable() {
        let mut c = controller();
        c.perform("primary_tabs", &State::selected("Sequencer")).unwrap();
        c.input_mut().take();

        assert_eq!(c.perform("fx1", &State::On).unwrap(), Outcome::Unreachable);
        assert_eq!(c.state("fx1"), Some(&State::Off));
        assert!(c.input_mut().take().is_empty());

        c.perform("primary_tabs", &State::selected("Advanced")).unwrap();
        assert_eq!(c.perform("fx1", &State::On).unwrap(), Outcome::Applied(1));
        assert_eq!(c.state("fx1"), Some(&State::On));
    }

    #[test]
    fn per_option_precondition_is_checked() {
        let mut c = controller();
        assert!(c.interactable("routing_slot", &State::selected("Macro_1_1")).unwrap());
        assert_eq!(
            c.perform("routing_slot", &State::selected("mod_src_1")).unwrap(),
            Outcome::Unreachable
        );
        c.perform("primary_tabs", &State::selected("Sequencer")).unwrap();
        assert_eq!(
            c.perform("routing_slot", &State::selected("mod_src_1")).unwrap(),
            Outcome::Applied(1)
        );
    }

    #[test]
    fn invalid_state_is_rejected_without_effect() {
        let mut c = controller();
        let err = c.perform("rate_type_lfo1", &State::selected("Sixteenth")).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidState { .. }));
        let err = c.perform("fx1", &State::Held).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidState { .. }));
        assert_eq!(c.state("rate_type_lfo1"), Some(&State::selected("Free")));
        assert!(c.input_mut().take().is_empty());
    }

    #[test]
    fn unknown_affordance() {
        let mut c = controller();
        assert!(matches!(
            c.perform("fx9", &State::On),
            Err(DispatchError::UnknownAffordance(_))
        ));
    }

    #[test]
    fn hold_toggle_uses_distinct_gestures() {
        let mut c = controller();
        c.perform("primary_tabs", &State::selected("Sequencer")).unwrap();
        c.input_mut().take();
        c.perform("repeat_arp_seq", &State::Held).unwrap();
        c.perform("repeat_arp_seq", &State::Released).unwrap();
        let at = ScreenPoint { x: 1257, y: 260 };
        assert_eq!(c.input_mut().take(), vec![Action::Hold(at), Action::Release(at)]);
    }

    #[test]
    fn refresh_clicks_every_time() {
        let mut c = controller();
        assert_eq!(c.perform("roll_dice_seq", &State::Stateless).unwrap(), Outcome::Unreachable);
        c.perform("primary_tabs", &State::selected("Sequencer")).unwrap();
        c.input_mut().take();
        for _ in 0..3 {
            assert_eq!(c.perform("roll_dice_seq", &State::Stateless).unwrap(), Outcome::Applied(1));
        }
        assert_eq!(c.input_mut().take().len(), 3);
    }

    #[test]
    fn anchors_follow_the_live_window() {
        let moved = Rect::new(104, 123, 2046, 1418);
        let mut c = Controller::new(registry(), Recorder::new(moved), SentEvents::default());
        c.perform("fx1", &State::On).unwrap();
        assert_eq!(
            c.input_mut().take(),
            vec![Action::Click {
                at: ScreenPoint { x: 1656, y: 299 },
                button: MouseButton::Left
            }]
        );
    }

    #[test]
    fn midi_continuous_toggle_sends_full_scale() {
        let mut c = controller();
        assert_eq!(c.sustain(false).unwrap(), Outcome::Applied(1));
        assert_eq!(c.sustain(true).unwrap(), Outcome::Applied(1));
        assert_eq!(
            c.midi_mut().0,
            vec![
                MidiEvent::ControlChange {
                    controller: 64,
                    value: 127
                },
                MidiEvent::ControlChange {
                    controller: 64,
                    value: 0
                },
            ]
        );
    }

    #[test]
    fn midi_discrete_toggle_sends_named_pair() {
        let mut c = controller();
        c.perform("note", &State::On).unwrap();
        c.perform("note", &State::Off).unwrap();
        assert_eq!(
            c.midi_mut().0,
            vec![
                MidiEvent::toggle("note", true, 60, 100),
                MidiEvent::toggle("note", false, 60, 100)
            ]
        );
        assert_eq!(c.state("note"), Some(&State::Off));
    }

    #[test]
    fn midi_slider_sends_value_ungated() {
        let mut c = controller();
        c.perform("primary_tabs", &State::selected("Sequencer")).unwrap();
        assert_eq!(c.set_value("cutoff", 42).unwrap(), Outcome::Applied(1));
        assert_eq!(
            c.midi_mut().0,
            vec![MidiEvent::ControlChange {
                controller: 74,
                value: 42
            }]
        );
        assert!(matches!(
            c.set_value("cutoff", 128),
            Err(DispatchError::InvalidState { .. })
        ));
        assert!(matches!(
            c.set_value("fx1", 1),
            Err(DispatchError::WrongKind { .. })
        ));
    }

    #[test]
    fn drag_holds_then_releases_offset() {
        let mut c = controller();
        assert_eq!(c.drag("timbre", 0.1).unwrap(), Outcome::Applied(2));
        let from = ScreenPoint { x: 1524, y: 1285 };
        let to = ScreenPoint { x: 1524, y: 1285 - 130 };
        assert_eq!(c.input_mut().take(), vec![Action::Hold(from), Action::Release(to)]);
        assert!(matches!(c.drag("cutoff", 0.1), Err(DispatchError::WrongKind { .. })));
    }

    #[test]
    fn drag_beyond_window_height_rejected() {
        let mut c = controller();
        for delta in [-1e10, 1.5, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(c.drag("timbre", delta), Err(DispatchError::InvalidState { .. })),
                "{delta}"
            );
        }
        assert!(c.input_mut().take().is_empty());
        assert_eq!(c.drag("timbre", -1.0).unwrap(), Outcome::Applied(2));
    }

    #[test]
    fn note_bypasses_table() {
        let mut c = controller();
        c.note(64, 90, false).unwrap();
        c.note(64, 0, true).unwrap();
        assert_eq!(
            c.midi_mut().0,
            vec![
                MidiEvent::NoteOn {
                    key: 64,
                    velocity: 90
                },
                MidiEvent::NoteOff {
                    key: 64,
                    velocity: 0
                }
            ]
        );
    }

    #[test]
    fn backend_failure_leaves_state_untouched() {
        let mut c = Controller::new(registry(), BrokenInput, SentEvents::default());
        assert!(matches!(
            c.perform("fx1", &State::On),
            Err(DispatchError::Backend(_))
        ));
        assert_eq!(c.state("fx1"), Some(&State::Off));
    }

    #[test]
    fn cycle_tracks_each_click_when_backend_fails_midway() {
        let input = FailsAfter { clicks_left: 1 };
        let mut c = Controller::new(registry(), input, SentEvents::default());
        // Free -> Straight is two clicks forward; only the first lands.
        assert!(matches!(
            c.perform("rate_type_lfo1", &State::selected("Straight")),
            Err(DispatchError::Backend(_))
        ));
        assert_eq!(c.state("rate_type_lfo1"), Some(&State::selected("All")));
    }

    #[test]
    fn cycle_backward_failure_keeps_start_state() {
        let input = FailsAfter { clicks_left: 0 };
        let mut c = Controller::new(registry(), input, SentEvents::default());
        assert!(c.perform("rate_type_lfo1", &State::selected("Dotted")).is_err());
        assert_eq!(c.state("rate_type_lfo1"), Some(&State::selected("Free")));
    }
}
