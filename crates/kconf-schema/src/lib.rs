//! Option graph model for tristate feature configuration.
//!
//! A schema declares named options (bool, tristate, string, int, hex) with
//! prompts, dependency expressions and ordered conditional defaults, plus
//! choice groups whose members are mutually exclusive. This crate holds the
//! in-memory form of such a schema: an immutable, validated [`OptionGraph`]
//! that resolution runs read from and may share across threads.
//!
//! Turning declaration source text into records is the job of an external
//! loader; this crate accepts those records already structured, either
//! programmatically ([`builder::OptionGraphBuilder`]) or as TOML/JSON
//! documents ([`load`]).

pub mod builder;
pub mod choice;
pub mod error;
pub mod expr;
pub mod graph;
pub mod load;
pub mod option;
pub mod tristate;
pub mod value;

pub use builder::OptionGraphBuilder;
pub use choice::{ChoiceDefault, ChoiceGroup, ChoiceMode};
pub use error::{Result, SchemaError};
pub use expr::{CompareOp, Expr, Literal};
pub use graph::{GroupId, OptionGraph, OptionId, SchemaDocument};
pub use option::{ConfigOption, DefaultRule};
pub use tristate::Tristate;
pub use value::{IntRange, SymbolType, Value};
