//! Recommendation tagging.
//!
//! A [`TagRule`] is a named filter. Tagging evaluates every rule against every
//! record and produces a side table of booleans; records are never modified.

use crate::error::{Error, Result};
use crate::query::{FilterSpec, Predicate};
use crate::store::{RecordId, RecordStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A named, reusable filter producing one boolean per record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRule {
    pub name: String,
    pub filter: FilterSpec,
}

impl TagRule {
    pub fn new(name: impl Into<String>, filter: FilterSpec) -> Self {
        Self {
            name: name.into(),
            filter,
        }
    }
}

/// Record identity -> rule name -> tag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagTable {
    rules: Vec<String>,
    tags: BTreeMap<RecordId, BTreeMap<String, bool>>,
}

impl TagTable {
    /// Rule names, in the order they were applied.
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Number of tagged records.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tag of one record for one rule, `None` if either is unknown.
    pub fn get(&self, record: RecordId, rule: &str) -> Option<bool> {
        self.tags.get(&record)?.get(rule).copied()
    }

    /// All tags of one record.
    pub fn record(&self, record: RecordId) -> Option<&BTreeMap<String, bool>> {
        self.tags.get(&record)
    }

    /// Records tagged `true` by `rule`, in store order.
    pub fn matching(&self, rule: &str) -> Vec<RecordId> {
        self.tags
            .iter()
            .filter(|(_, tags)| tags.get(rule).copied().unwrap_or(false))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of records tagged `true` by `rule`.
    pub fn count(&self, rule: &str) -> usize {
        self.tags
            .values()
            .filter(|tags| tags.get(rule).copied().unwrap_or(false))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &BTreeMap<String, bool>)> {
        self.tags.iter().map(|(id, tags)| (*id, tags))
    }
}

/// Apply `rules` to every record of `store`.
///
/// Every rule is compiled before the store is touched, so an invalid rule
/// fails the whole call without partial output.
pub fn tag(store: &RecordStore, rules: &[TagRule]) -> Result<TagTable> {
    let mut seen = HashSet::new();
    let mut compiled = Vec::with_capacity(rules.len());
    for rule in rules {
        if rule.name.trim().is_empty() {
            return Err(Error::config("tag rule name cannot be empty"));
        }
        if !seen.insert(rule.name.as_str()) {
            return Err(Error::config(format!(
                "duplicate tag rule '{}'",
                rule.name
            )));
        }
        let predicate = Predicate::build(&rule.filter).map_err(|e| match e {
            Error::Configuration(msg) => {
                Error::Configuration(format!("tag rule '{}': {}", rule.name, msg))
            }
            other => other,
        })?;
        compiled.push((rule.name.as_str(), predicate));
    }

    let tags = store
        .iter()
        .map(|(id, record)| {
            let flags = compiled
                .iter()
                .map(|(name, predicate)| (name.to_string(), predicate.matches(record)))
                .collect();
            (id, flags)
        })
        .collect();

    tracing::debug!(
        records = store.len(),
        rules = compiled.len(),
        "Tagged records"
    );

    Ok(TagTable {
        rules: rules.iter().map(|r| r.name.clone()).collect(),
        tags,
    })
}

/// Ordered set of tag rules, unique by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleRegistry {
    rules: Vec<TagRule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule after checking that it compiles.
    ///
    /// A rule with the same name is replaced in place and returned.
    pub fn register(&mut self, rule: TagRule) -> Result<Option<TagRule>> {
        if rule.name.trim().is_empty() {
            return Err(Error::config("tag rule name cannot be empty"));
        }
        Predicate::build(&rule.filter)?;

        if let Some(slot) = self.rules.iter_mut().find(|r| r.name == rule.name) {
            tracing::warn!(rule = %rule.name, "Replacing tag rule");
            return Ok(Some(std::mem::replace(slot, rule)));
        }
        tracing::info!(rule = %rule.name, filter = %rule.filter, "Registered tag rule");
        self.rules.push(rule);
        Ok(None)
    }

    /// Remove a rule by name. Returns whether a rule was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.name != name);
        before != self.rules.len()
    }

    pub fn get(&self, name: &str) -> Option<&TagRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Copy of the currently registered rules.
    pub fn snapshot(&self) -> Vec<TagRule> {
        self.rules.clone()
    }

    /// Tag `store` with the currently registered rules.
    pub fn tag(&self, store: &RecordStore) -> Result<TagTable> {
        tag(store, &self.rules)
    }
}
