//! Attribute specifications and the per-owner schema.
//!
//! An [`AttrSpec`] declares one attribute: either **stored** (written by
//! callers, optionally through a validation rule) or **derived** (computed
//! from declared stored dependencies and cached). A [`Schema`] is the fixed
//! set of specs for one owner shape; it is built once and shared immutably
//! by every [`crate::record::Record`] of that shape.
//!
//! Schema construction is where declaration mistakes surface: duplicate
//! names, dependencies on names that do not exist, and dependencies on
//! other derived attributes are all rejected up front, so the runtime
//! engine never has to re-check them.

use thiserror::Error;

use crate::error::Result;
use crate::record::Sources;
use crate::rules::ValidationRule;
use crate::value::AttrValue;

/// A pure derivation over the current values of the declared dependencies.
///
/// Receives a [`Sources`] view restricted to the dependency list named in
/// [`AttrSpec::derived`]; reading any other attribute is an error. Must
/// not have side effects, otherwise cache validity is unsound.
pub type DeriveFn = fn(&Sources<'_>) -> Result<AttrValue>;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Role {
    Stored { rule: Option<ValidationRule> },
    Derived {
        derive: DeriveFn,
        depends_on: &'static [&'static str],
    },
}

/// Specification for a single attribute.
#[derive(Debug, Clone, Copy)]
pub struct AttrSpec {
    /// The attribute name used in the API (e.g., "radius", "diameter")
    pub name: &'static str,

    pub(crate) role: Role,
}

impl AttrSpec {
    /// Declare a stored attribute with no validation.
    pub const fn stored(name: &'static str) -> Self {
        Self {
            name,
            role: Role::Stored { rule: None },
        }
    }

    /// Attach a validation rule to a stored attribute.
    ///
    /// The rule runs on every write; its output is what gets stored.
    pub const fn validated(self, rule: ValidationRule) -> Self {
        match self.role {
            Role::Stored { .. } => Self {
                name: self.name,
                role: Role::Stored { rule: Some(rule) },
            },
            Role::Derived { .. } => panic!("validated() applies to stored attributes"),
        }
    }

    /// Declare a derived attribute.
    ///
    /// `depends_on` names the stored attributes the derivation reads.
    /// Writing or deleting any of them invalidates this attribute's cache.
    pub const fn derived(
        name: &'static str,
        derive: DeriveFn,
        depends_on: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            role: Role::Derived { derive, depends_on },
        }
    }

    /// Whether this attribute is computed rather than stored.
    pub fn is_derived(&self) -> bool {
        matches!(self.role, Role::Derived { .. })
    }

    /// The declared dependencies (empty for stored attributes).
    pub fn depends_on(&self) -> &'static [&'static str] {
        match self.role {
            Role::Stored { .. } => &[],
            Role::Derived { depends_on, .. } => depends_on,
        }
    }
}

/// Error type for schema declaration failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate attribute name \"{0}\"")]
    DuplicateName(&'static str),

    #[error("\"{attribute}\" depends on unknown attribute \"{dependency}\"")]
    UnknownDependency {
        attribute: &'static str,
        dependency: &'static str,
    },

    #[error("\"{attribute}\" depends on \"{dependency}\", which is itself derived")]
    DerivedDependency {
        attribute: &'static str,
        dependency: &'static str,
    },
}

/// The fixed attribute set for one owner shape.
///
/// Holds the specs in declaration order plus the reverse dependency
/// table used for invalidation: for each stored attribute, the indices
/// of the derived attributes that read it.
#[derive(Debug, Clone)]
pub struct Schema {
    attrs: Vec<AttrSpec>,
    dependents: Vec<Vec<usize>>,
}

impl Schema {
    /// Build a schema from a list of specs.
    ///
    /// Dependency names are resolved here so the runtime engine can work
    /// with plain indices.
    pub fn new(attrs: Vec<AttrSpec>) -> std::result::Result<Self, SchemaError> {
        for (i, spec) in attrs.iter().enumerate() {
            if attrs[..i].iter().any(|prior| prior.name == spec.name) {
                return Err(SchemaError::DuplicateName(spec.name));
            }
        }

        let mut dependents = vec![Vec::new(); attrs.len()];
        for (i, spec) in attrs.iter().enumerate() {
            for &dep in spec.depends_on() {
                let Some(source) = attrs.iter().position(|s| s.name == dep) else {
                    return Err(SchemaError::UnknownDependency {
                        attribute: spec.name,
                        dependency: dep,
                    });
                };
                if attrs[source].is_derived() {
                    return Err(SchemaError::DerivedDependency {
                        attribute: spec.name,
                        dependency: dep,
                    });
                }
                dependents[source].push(i);
            }
        }

        Ok(Self { attrs, dependents })
    }

    /// Look up a spec by name.
    pub fn spec(&self, name: &str) -> Option<&AttrSpec> {
        self.attrs.iter().find(|spec| spec.name == name)
    }

    /// Iterate over all declared attribute names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attrs.iter().map(|spec| spec.name)
    }

    /// Number of declared attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.attrs.iter().position(|spec| spec.name == name)
    }

    pub(crate) fn spec_at(&self, index: usize) -> &AttrSpec {
        &self.attrs[index]
    }

    pub(crate) fn name_at(&self, index: usize) -> &'static str {
        self.attrs[index].name
    }

    pub(crate) fn dependents_of(&self, index: usize) -> &[usize] {
        &self.dependents[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules;

    fn double_first(sources: &Sources<'_>) -> Result<AttrValue> {
        Ok(AttrValue::Float(sources.float("a")? * 2.0))
    }

    #[test]
    fn schema_resolves_dependents() {
        let schema = Schema::new(vec![
            AttrSpec::stored("a"),
            AttrSpec::stored("b"),
            AttrSpec::derived("twice_a", double_first, &["a"]),
        ])
        .unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.dependents_of(0), &[2]);
        assert!(schema.dependents_of(1).is_empty());
    }

    #[test]
    fn spec_lookup_by_name() {
        let schema = Schema::new(vec![
            AttrSpec::stored("a").validated(rules::numeric),
            AttrSpec::derived("twice_a", double_first, &["a"]),
        ])
        .unwrap();

        assert!(!schema.spec("a").unwrap().is_derived());
        assert!(schema.spec("twice_a").unwrap().is_derived());
        assert_eq!(schema.spec("twice_a").unwrap().depends_on(), &["a"]);
        assert!(schema.spec("nonexistent").is_none());
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = Schema::new(vec![AttrSpec::stored("a"), AttrSpec::stored("a")]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateName("a"));
    }

    #[test]
    fn unknown_dependency_rejected() {
        let err = Schema::new(vec![
            AttrSpec::stored("a"),
            AttrSpec::derived("twice_a", double_first, &["missing"]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownDependency {
                attribute: "twice_a",
                dependency: "missing",
            }
        );
    }

    #[test]
    fn derived_dependency_rejected() {
        let err = Schema::new(vec![
            AttrSpec::stored("a"),
            AttrSpec::derived("twice_a", double_first, &["a"]),
            AttrSpec::derived("chained", double_first, &["twice_a"]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DerivedDependency {
                attribute: "chained",
                dependency: "twice_a",
            }
        );
    }

    #[test]
    fn names_iterates_declaration_order() {
        let schema = Schema::new(vec![
            AttrSpec::stored("b"),
            AttrSpec::stored("a"),
        ])
        .unwrap();
        let names: Vec<_> = schema.names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            SchemaError::DuplicateName("a").to_string(),
            "duplicate attribute name \"a\""
        );
        assert_eq!(
            SchemaError::UnknownDependency {
                attribute: "d",
                dependency: "x",
            }
            .to_string(),
            "\"d\" depends on unknown attribute \"x\""
        );
    }
}
