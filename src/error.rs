use thiserror::Error;

/// Problems in the static control table. Any of these aborts startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("affordance '{0}' is already registered")]
    DuplicateName(String),
    #[error("malformed declaration for '{name}': {reason}")]
    MalformedSpec { name: String, reason: String },
    #[error("'{name}' depends on '{dependency}'{}, which does not resolve", state_suffix(.state))]
    UnresolvedDependency {
        name: String,
        dependency: String,
        state: Option<String>,
    },
}

fn state_suffix(state: &Option<String>) -> String {
    match state {
        Some(s) => format!(" being '{s}'"),
        None => String::new(),
    }
}

impl RegistryError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        RegistryError::MalformedSpec {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures of a single transition request. None of these mutate tracked state.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no affordance named '{0}'")]
    UnknownAffordance(String),
    #[error("'{state}' is not a valid state for '{name}'")]
    InvalidState { name: String, state: String },
    #[error("'{name}' cannot be driven this way ({kind} affordance)")]
    WrongKind { name: String, kind: &'static str },
    #[error("precondition of '{name}' reads '{dependency}', which has no state")]
    Uninitialized { name: String, dependency: String },
    #[error("input backend failed: {0:#}")]
    Backend(anyhow::Error),
    #[error("MIDI transport failed: {0:#}")]
    Midi(anyhow::Error),
}
