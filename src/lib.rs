//! # Slotted
//!
//! Slotted is a small library for **managed attributes**: named value
//! slots whose read/write/delete operations go through custom logic
//! instead of plain storage. It packages the three behaviors that keep
//! getting reimplemented ad-hoc around computed properties:
//!
//! - **Validated writes**: a pure rule coerces or rejects each raw
//!   input; a rejected write changes nothing.
//! - **Lazy derived values**: an attribute computed from declared
//!   sources, evaluated on first read and cached.
//! - **Invalidation**: any write or delete of a source marks dependent
//!   caches stale, so a fresh cache never diverges from a recompute.
//!
//! ## The Two-Layer Design
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  Schema (spec.rs)                                      │
//! │  - Declares attributes once per owner shape            │
//! │  - Resolves dependency names to indices at build time  │
//! │  - Rejects malformed declarations up front             │
//! └────────────────────────────────────────────────────────┘
//!                            │ shared immutably
//!                            ▼
//! ┌────────────────────────────────────────────────────────┐
//! │  Record (record.rs)                                    │
//! │  - One raw slot + one cache slot per attribute         │
//! │  - get / set / delete implemented once, name-dispatched│
//! │  - Exclusively owned per instance (&mut for mutation)  │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Accessor logic lives in one place and is attached per field name by
//! the schema, rather than being duplicated per field. Each record owns
//! a fixed, declared set of slots; there is no open-ended attribute map.
//!
//! ## Example
//!
//! ```
//! use slotted::{rules, AttrSpec, AttrValue, Record, Result, Schema, Sources};
//!
//! fn diameter(sources: &Sources<'_>) -> Result<AttrValue> {
//!     Ok(AttrValue::Float(sources.float("radius")? * 2.0))
//! }
//!
//! fn main() -> Result<()> {
//!     let schema = Schema::new(vec![
//!         AttrSpec::stored("radius").validated(rules::non_negative_number),
//!         AttrSpec::derived("diameter", diameter, &["radius"]),
//!     ])
//!     .expect("well-formed schema");
//!
//!     let mut circle = Record::new(&schema);
//!     circle.set("radius", 3.0)?;
//!     assert_eq!(circle.get("diameter")?, AttrValue::Float(6.0));
//!
//!     // Writing a source invalidates the cached diameter.
//!     circle.set("radius", 5.0)?;
//!     assert_eq!(circle.get("diameter")?, AttrValue::Float(10.0));
//!
//!     // Rejected writes change nothing.
//!     assert!(circle.set("radius", "abc").is_err());
//!     assert_eq!(circle.get("radius")?, AttrValue::Float(5.0));
//!     Ok(())
//! }
//! ```
//!
//! ## No I/O, No Observability
//!
//! The engine never prints, logs, or blocks. Errors carry the attribute
//! name and rejected value; reporting is the caller's concern.

pub mod error;
pub mod record;
pub mod rules;
pub mod spec;
pub mod value;

pub use error::{Error, Result};
pub use record::{Record, Sources};
pub use rules::{RuleViolation, ValidationRule};
pub use spec::{AttrSpec, DeriveFn, Schema, SchemaError};
pub use value::AttrValue;
