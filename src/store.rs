use std::collections::HashMap;

use crate::affordance::{Registry, State};

/// Live state of every affordance. Only the controller writes to it.
#[derive(Debug, Default)]
pub struct StateStore {
    states: HashMap<String, State>,
}

impl StateStore {
    /// Seed each affordance with its declared initial state.
    pub fn new(registry: &Registry) -> Self {
        registry
            .iter()
            .map(|a| (a.name().to_string(), a.initial().clone()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }

    pub(crate) fn set(&mut self, name: &str, state: State) {
        if let Some(slot) = self.states.get_mut(name) {
            *slot = state;
        } else {
            self.states.insert(name.to_string(), state);
        }
    }
}

impl FromIterator<(String, State)> for StateStore {
    fn from_iter<I: IntoIterator<Item = (String, State)>>(iter: I) -> Self {
        StateStore {
            states: iter.into_iter().collect(),
        }
    }
}
