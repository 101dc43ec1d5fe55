//! Query parsing and the modifier pipeline.
//!
//! A raw query string is tokenized into keywords and `name:value`
//! modifier tokens ([`parser`]), the tokens are resolved against the
//! [`registry`] into [`Modifier`]s, and the [`executor`] runs them in
//! order over one [`ResultSet`].

pub mod context;
pub mod executor;
pub mod filters;
pub mod modifier;
pub mod ordering;
pub mod parser;
pub mod planner;
pub mod registry;
pub mod result_set;

pub use context::SearchContext;
pub use executor::{SearchError, SearchExecutor};
pub use filters::{fails_every, FilterKind};
pub use modifier::{Modifier, ModifierKind};
pub use ordering::{GroupOrder, ItemOrder, NameFormat, OrderKey};
pub use parser::{parse_query, ParsedModifier, Query};
pub use planner::SearchPlan;
pub use registry::{ModifierEntry, ModifierRegistry};
pub use result_set::{DisplayFormat, Group, ResultSet, DEFAULT_GROUP};
