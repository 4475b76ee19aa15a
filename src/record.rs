//! # The Field Table Engine
//!
//! A [`Record`] is an explicit field table for one instance: one raw slot
//! and one cache slot per attribute declared in its [`Schema`]. The three
//! accessor operations (`get`, `set`, `delete`) are implemented once here
//! and dispatched by attribute name, instead of duplicating accessor logic
//! per field.
//!
//! ## Cache discipline
//!
//! Each derived attribute's cache has exactly two states:
//!
//! ```text
//! Stale ──get()──▶ Fresh ──set/delete on any dependency──▶ Stale
//! ```
//!
//! The invariant: a `Fresh` entry always equals what the derivation would
//! produce from the current stored values. Two things keep it sound:
//!
//! 1. Every successful `set` or `delete` of a stored attribute marks the
//!    caches of all its dependents `Stale` before returning, using the
//!    reverse dependency table resolved at schema build time.
//! 2. A derivation can only read through its [`Sources`] view, which
//!    refuses any attribute outside the declared dependency list. A
//!    derivation cannot depend on something the schema does not know
//!    about, so invalidation never misses.
//!
//! Recomputation happens at most once per invalidation: a `Fresh` cache
//! is served without calling the derivation at all.
//!
//! ## Write atomicity
//!
//! `set` is set-or-reject: the validation rule runs on the raw input
//! first, and the slot is only touched (and dependents only invalidated)
//! after the rule accepts. A rejected write leaves the record exactly as
//! it was.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::rules::RuleViolation;
use crate::spec::{Role, Schema};
use crate::value::AttrValue;

#[derive(Debug, Clone, PartialEq)]
enum Cache {
    Stale,
    Fresh(AttrValue),
}

/// Read-only window a derivation gets over its declared dependencies.
pub struct Sources<'a> {
    schema: &'a Schema,
    slots: &'a [Option<AttrValue>],
    owner: &'static str,
    declared: &'static [&'static str],
}

impl Sources<'_> {
    fn slot(&self, name: &str) -> Result<(usize, &AttrValue)> {
        if !self.declared.contains(&name) {
            return Err(Error::UndeclaredDependency {
                attribute: self.owner,
                dependency: name.to_string(),
            });
        }
        // Declared deps are resolved at schema build, so the lookup
        // cannot fail for a well-formed schema.
        let index = self.schema.index_of(name).ok_or_else(|| Error::Unknown {
            attribute: name.to_string(),
        })?;
        let value = self.slots[index].as_ref().ok_or(Error::Missing {
            attribute: self.schema.name_at(index),
        })?;
        Ok((index, value))
    }

    /// Current value of a declared dependency.
    pub fn value(&self, name: &str) -> Result<&AttrValue> {
        self.slot(name).map(|(_, value)| value)
    }

    /// Current value of a declared dependency as f64.
    ///
    /// Convenience for numeric derivations; a non-numeric slot reports a
    /// validation error against the source attribute.
    pub fn float(&self, name: &str) -> Result<f64> {
        let (index, value) = self.slot(name)?;
        value.as_float().ok_or_else(|| Error::Validation {
            attribute: self.schema.name_at(index),
            value: value.clone(),
            reason: RuleViolation::NotANumber(value.to_string()),
        })
    }
}

/// An instance's attribute storage: raw slots plus derived-value caches,
/// laid out by schema index.
#[derive(Debug, Clone)]
pub struct Record<'s> {
    schema: &'s Schema,
    slots: Vec<Option<AttrValue>>,
    cache: Vec<Cache>,
}

impl<'s> Record<'s> {
    /// Create an empty record: no slots set, all caches stale.
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            slots: vec![None; schema.len()],
            cache: vec![Cache::Stale; schema.len()],
        }
    }

    /// The schema this record was created against.
    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Whether a stored attribute currently holds a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.schema
            .index_of(name)
            .map(|index| self.slots[index].is_some())
            .unwrap_or(false)
    }

    /// Read an attribute.
    ///
    /// Stored attributes return their slot value. Derived attributes are
    /// served from cache when fresh; otherwise the derivation runs over
    /// the current stored values and the result is cached before being
    /// returned. A derivation failure leaves the cache stale.
    pub fn get(&mut self, name: &str) -> Result<AttrValue> {
        let schema = self.schema;
        let index = self.index(name)?;
        match schema.spec_at(index).role {
            Role::Stored { .. } => self.slots[index].clone().ok_or(Error::Missing {
                attribute: schema.name_at(index),
            }),
            Role::Derived { derive, depends_on } => {
                if let Cache::Fresh(value) = &self.cache[index] {
                    return Ok(value.clone());
                }
                let sources = Sources {
                    schema,
                    slots: &self.slots,
                    owner: schema.name_at(index),
                    declared: depends_on,
                };
                let value = derive(&sources)?;
                self.cache[index] = Cache::Fresh(value.clone());
                Ok(value)
            }
        }
    }

    /// Write a stored attribute.
    ///
    /// Applies the spec's validation rule if one is configured; the rule's
    /// output is what gets stored. On success, every derived attribute
    /// depending on this one is invalidated. On rejection, nothing
    /// changes. Derived attributes cannot be written.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) -> Result<()> {
        let schema = self.schema;
        let index = self.index(name)?;
        let rule = match schema.spec_at(index).role {
            Role::Derived { .. } => {
                return Err(Error::ReadOnly {
                    attribute: schema.name_at(index),
                })
            }
            Role::Stored { rule } => rule,
        };

        let raw = value.into();
        let stored = match rule {
            Some(rule) => match rule(&raw) {
                Ok(coerced) => coerced,
                Err(reason) => {
                    return Err(Error::Validation {
                        attribute: schema.name_at(index),
                        value: raw,
                        reason,
                    })
                }
            },
            None => raw,
        };

        self.slots[index] = Some(stored);
        self.invalidate_dependents(index);
        Ok(())
    }

    /// Delete an attribute.
    ///
    /// Stored attributes have their slot cleared (an error if already
    /// unset) and their dependents invalidated, same as a write. Deleting
    /// a derived attribute just resets its cache, so the next read
    /// recomputes.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let schema = self.schema;
        let index = self.index(name)?;
        match schema.spec_at(index).role {
            Role::Derived { .. } => {
                self.cache[index] = Cache::Stale;
                Ok(())
            }
            Role::Stored { .. } => {
                self.slots[index].take().ok_or(Error::Missing {
                    attribute: schema.name_at(index),
                })?;
                self.invalidate_dependents(index);
                Ok(())
            }
        }
    }

    /// The currently-set stored attributes, by name.
    ///
    /// Caches are excluded; they are rebuilt lazily after a restore.
    pub fn snapshot(&self) -> BTreeMap<String, AttrValue> {
        self.schema
            .names()
            .enumerate()
            .filter_map(|(index, name)| {
                if self.schema.spec_at(index).is_derived() {
                    return None;
                }
                self.slots[index]
                    .as_ref()
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect()
    }

    /// Rebuild a record from a snapshot.
    ///
    /// Values are replayed through [`Record::set`], so validation rules
    /// apply on the way back in and a snapshot that no longer satisfies
    /// the schema is rejected.
    pub fn restore(schema: &'s Schema, snapshot: BTreeMap<String, AttrValue>) -> Result<Self> {
        let mut record = Record::new(schema);
        for (name, value) in snapshot {
            record.set(&name, value)?;
        }
        Ok(record)
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.schema.index_of(name).ok_or_else(|| Error::Unknown {
            attribute: name.to_string(),
        })
    }

    fn invalidate_dependents(&mut self, index: usize) {
        for &dependent in self.schema.dependents_of(index) {
            self.cache[dependent] = Cache::Stale;
        }
    }
}
