//! Pairing of payload steps with persisted steps during a workflow update.
//!
//! A persisted step is identified by its `step_uuid` (the id of its message
//! template), assigned when the step is first created. A payload step that
//! carries a `step_uuid` pairs only with that persisted step. Payload steps
//! without one, or with a uuid that matches nothing, fall back to pairing by
//! name. Every pairing is one-to-one.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::DbId;

/// Anything that can be paired as a step.
pub trait StepIdentity {
    fn step_uuid(&self) -> Option<DbId>;
    fn step_name(&self) -> Option<&str>;
}

/// What to do with a persisted step that has no payload counterpart when
/// control values are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedStepPolicy {
    /// Leave any stored control values untouched.
    #[default]
    Skip,
    /// Delete the step's stored control values.
    Delete,
}

impl UnmatchedStepPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            UnmatchedStepPolicy::Skip => "skip",
            UnmatchedStepPolicy::Delete => "delete",
        }
    }
}

impl FromStr for UnmatchedStepPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(UnmatchedStepPolicy::Skip),
            "delete" => Ok(UnmatchedStepPolicy::Delete),
            other => Err(CoreError::Validation(format!(
                "Unknown unmatched step policy '{other}'. Must be one of: skip, delete"
            ))),
        }
    }
}

impl fmt::Display for UnmatchedStepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// For each persisted step, the index of its payload counterpart.
pub fn pair_steps<P, S>(persisted: &[P], payload: &[S]) -> Vec<Option<usize>>
where
    P: StepIdentity,
    S: StepIdentity,
{
    let mut claimed = vec![false; payload.len()];
    let mut pairs: Vec<Option<usize>> = vec![None; persisted.len()];

    // Pass 1: explicit identifiers.
    for (slot, step) in pairs.iter_mut().zip(persisted) {
        let Some(uuid) = step.step_uuid() else {
            continue;
        };
        if let Some(idx) = (0..payload.len())
            .find(|&i| !claimed[i] && payload[i].step_uuid() == Some(uuid))
        {
            claimed[idx] = true;
            *slot = Some(idx);
        }
    }

    // Pass 2: names, for payload steps whose uuid did not pair above.
    let known: HashSet<DbId> = persisted.iter().filter_map(|s| s.step_uuid()).collect();
    for (slot, step) in pairs.iter_mut().zip(persisted) {
        if slot.is_some() {
            continue;
        }
        let Some(name) = step.step_name() else {
            continue;
        };
        if let Some(idx) = (0..payload.len()).find(|&i| {
            !claimed[i]
                && payload[i].step_uuid().map_or(true, |uuid| !known.contains(&uuid))
                && payload[i].step_name() == Some(name)
        }) {
            claimed[idx] = true;
            *slot = Some(idx);
        }
    }

    pairs
}

/// Invert [`pair_steps`]: for each payload step, the index of the persisted
/// step it updates, or `None` when it is new.
pub fn existing_for_payload(pairs: &[Option<usize>], payload_len: usize) -> Vec<Option<usize>> {
    let mut inverse = vec![None; payload_len];
    for (persisted_idx, payload_idx) in pairs.iter().enumerate() {
        if let Some(p) = payload_idx {
            inverse[*p] = Some(persisted_idx);
        }
    }
    inverse
}
