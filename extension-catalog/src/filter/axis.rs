//! Tri-state filter axis state.

use std::collections::BTreeSet;

/// How multiple included keys on a multi-valued axis combine.
///
/// Excluded keys always behave as "any excluded key present rejects",
/// independent of this mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CombineMode {
    /// At least one included key must match (OR).
    #[default]
    Any,

    /// Every included key must match (AND).
    All,
}

impl CombineMode {
    /// The wire form used in the URL (`"or"` / `"and"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "or",
            Self::All => "and",
        }
    }

    /// Parses the wire form; anything else is `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "or" => Some(Self::Any),
            "and" => Some(Self::All),
            _ => None,
        }
    }

    /// The other mode.
    #[must_use]
    pub fn flipped(&self) -> Self {
        match self {
            Self::Any => Self::All,
            Self::All => Self::Any,
        }
    }
}

/// One filter axis: disjoint sets of included and excluded keys.
///
/// The invariant `included ∩ excluded = ∅` holds after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisSelection {
    included: BTreeSet<String>,
    excluded: BTreeSet<String>,
}

impl AxisSelection {
    /// Cycles one key through neutral → included → excluded → neutral.
    pub fn toggle(&mut self, key: &str) {
        if self.included.remove(key) {
            self.excluded.insert(key.to_string());
        } else if !self.excluded.remove(key) {
            self.included.insert(key.to_string());
        }
    }

    /// Replaces the included set. Conflicting excluded keys are dropped.
    pub fn set_included<I: IntoIterator<Item = String>>(&mut self, keys: I) {
        self.included = keys.into_iter().collect();
        self.resolve_conflicts();
    }

    /// Adds excluded keys, skipping any that are already included.
    pub fn add_excluded<I: IntoIterator<Item = String>>(&mut self, keys: I) {
        for key in keys {
            if !self.included.contains(&key) {
                self.excluded.insert(key);
            }
        }
    }

    /// Strips every key present on both sides, in favor of inclusion.
    pub fn resolve_conflicts(&mut self) {
        for key in &self.included {
            self.excluded.remove(key);
        }
    }

    /// The included key set.
    #[must_use]
    pub fn included(&self) -> &BTreeSet<String> {
        &self.included
    }

    /// The excluded key set.
    #[must_use]
    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    /// True when neither side holds any key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.excluded.is_empty()
    }

    /// Total selected keys across both sides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.included.len() + self.excluded.len()
    }

    /// Drops all keys from both sides.
    pub fn clear(&mut self) {
        self.included.clear();
        self.excluded.clear();
    }

    /// Single-valued match: passes when the included set is empty or
    /// contains the value, and the excluded set does not contain it.
    ///
    /// A record with no value passes only an empty included set.
    #[must_use]
    pub fn allows(&self, value: Option<&str>) -> bool {
        let included_ok = self.included.is_empty()
            || value.is_some_and(|v| self.included.contains(v));
        let excluded_ok = !value.is_some_and(|v| self.excluded.contains(v));
        included_ok && excluded_ok
    }

    /// Multi-valued match over a record's value set.
    ///
    /// Included keys combine per `mode`; any excluded key present rejects.
    #[must_use]
    pub fn allows_set<'a, I>(&self, values: I, mode: CombineMode) -> bool
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        let included_ok = self.included.is_empty()
            || match mode {
                CombineMode::Any => values
                    .clone()
                    .into_iter()
                    .any(|v| self.included.contains(v)),
                CombineMode::All => self
                    .included
                    .iter()
                    .all(|key| values.clone().into_iter().any(|v| v == key)),
            };

        let excluded_ok = !values.into_iter().any(|v| self.excluded.contains(v));
        included_ok && excluded_ok
    }
}
