use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use super::State;
use crate::store::StateStore;

/// One conjunct: `dependency` must currently be in one of `accepted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub dependency: String,
    pub accepted: BTreeSet<State>,
}

impl Requirement {
    pub fn new(dependency: &str, accepted: impl IntoIterator<Item = State>) -> Self {
        Requirement {
            dependency: dependency.to_string(),
            accepted: accepted.into_iter().collect(),
        }
    }

    /// Require `dependency` to have one of the named options selected.
    pub fn selected(dependency: &str, options: &[&str]) -> Self {
        Self::new(dependency, options.iter().map(|o| State::selected(o)))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accepted: Vec<String> = self.accepted.iter().map(|s| s.to_string()).collect();
        write!(f, "{} in {{{}}}", self.dependency, accepted.join(", "))
    }
}

/// Visibility gate as OR of AND-groups. No groups means always interactable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Precondition {
    groups: Vec<Vec<Requirement>>,
}

impl Precondition {
    pub fn always() -> Self {
        Precondition::default()
    }

    /// A single requirement group.
    pub fn all(requirements: impl IntoIterator<Item = Requirement>) -> Self {
        Precondition {
            groups: vec![requirements.into_iter().collect()],
        }
    }

    /// Add an alternative requirement group.
    pub fn or(mut self, requirements: impl IntoIterator<Item = Requirement>) -> Self {
        self.groups.push(requirements.into_iter().collect());
        self
    }

    /// Append `requirement` to every group, creating one if there are none.
    pub fn and(mut self, requirement: Requirement) -> Self {
        if self.groups.is_empty() {
            self.groups.push(Vec::new());
        }
        for group in &mut self.groups {
            group.push(requirement.clone());
        }
        self
    }

    pub fn is_always(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[Vec<Requirement>] {
        &self.groups
    }

    pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.groups.iter().flatten()
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.groups.is_empty() {
            return f.write_str("always");
        }
        let groups: Vec<String> = self
            .groups
            .iter()
            .map(|group| {
                let terms: Vec<String> = group.iter().map(|r| r.to_string()).collect();
                format!("({})", terms.join(" & "))
            })
            .collect();
        f.write_str(&groups.join(" | "))
    }
}

/// A precondition read an affordance the store knows nothing about.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no state recorded for '{0}'")]
pub struct Uninitialized(pub String);

/// Whether any requirement group is fully met by `store`.
///
/// Every dependency is looked up before any group is evaluated, so a missing
/// state is reported even when an earlier group would already have matched.
pub fn satisfied(precondition: &Precondition, store: &StateStore) -> Result<bool, Uninitialized> {
    if let Some(missing) = precondition
        .requirements()
        .find(|r| store.get(&r.dependency).is_none())
    {
        return Err(Uninitialized(missing.dependency.clone()));
    }

    Ok(precondition.is_always()
        || precondition.groups().iter().any(|group| {
            group.iter().all(|r| {
                store
                    .get(&r.dependency)
                    .is_some_and(|state| r.accepted.contains(state))
            })
        }))
}
