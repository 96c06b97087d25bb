//! Partial-update reconciliation.

use super::UniqueKey;
use std::str::FromStr;

/// Which fields of an update request were present and copied onto the entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    fields: Vec<&'static str>,
}

impl MergeOutcome {
    pub fn record(&mut self, field: &'static str, present: bool) {
        if present {
            self.fields.push(field);
        }
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn present(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Copies every present field of an update request onto a loaded entity.
///
/// Implementations only touch business fields: identity, audit pair and deletion flag are out of
/// reach. No validation happens here.
pub trait Merge<E> {
    fn merge_into(self, target: &mut E) -> MergeOutcome;

    /// Globally unique values this request would write, to be re-checked before the merge.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }
}

/// What an update with zero present fields does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyPatchPolicy {
    /// Write anyway; the only visible change is a fresh `updateTime`.
    #[default]
    Touch,
    /// Return the stored entity untouched and skip the write.
    Skip,
}

impl FromStr for EmptyPatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "touch" => Ok(EmptyPatchPolicy::Touch),
            "skip" => Ok(EmptyPatchPolicy::Skip),
            other => Err(format!("expected touch or skip, got {}", other)),
        }
    }
}
