//! # Taxa - Declarative Species Search
//!
//! Taxa answers free-text queries over a catalog of species. A query is a
//! list of keywords plus `name:value` modifiers that filter, group, order
//! and format the matches:
//!
//! ```text
//! reef status:extant groupby:zone orderby:newest limit:10
//! ```
//!
//! ## Architecture
//!
//! - [`store`] - Species records and the async store/creator interfaces
//! - [`query`] - Tokenizer, modifier registry, result set and executor
//! - [`output`] - Terminal and JSON rendering of result sets
//! - [`utils`] - Config, durations, sizes and natural ordering
//!
//! ## Quick Start
//!
//! ```ignore
//! use taxa::query::{ModifierRegistry, SearchExecutor};
//! use taxa::store::MemoryStore;
//!
//! let store = MemoryStore::open("catalog.json".as_ref()).await?;
//! let registry = ModifierRegistry::with_builtins();
//! let executor = SearchExecutor::new(&store, &store, &registry);
//!
//! let results = executor.execute("reef -status:extinct").await?;
//! for name in results.get_string_results() {
//!     println!("{}", name);
//! }
//! ```

pub mod output;
pub mod query;
pub mod store;
pub mod utils;
