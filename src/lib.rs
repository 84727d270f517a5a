//! # pathdex - Hierarchical Path Index
//!
//! pathdex stores many delimiter-separated paths (`"textures/doors/metal1"`)
//! as a tree of shared, interned fragments, and looks them up by exact path,
//! partial path, or wildcard pattern. Registries of any kind (materials,
//! fonts, console variables, archive lumps) can build their namespace on one
//! [`PathIndex`](index::PathIndex) and hang their own records off its nodes.
//!
//! ## Architecture
//!
//! - [`index`] - The path index: fragment mapper, intern pool, node arena,
//!   matcher, path composer, plus catalog building and statistics
//! - [`output`] - Result formatting (colored text or JSON lines)
//! - [`utils`] - Configuration and progress reporting
//!
//! ## Quick Start
//!
//! ```
//! use pathdex::index::{MatchFlags, PathIndex};
//!
//! let mut index = PathIndex::new();
//! let metal = index.insert("textures/doors/metal1", '/', "steel").unwrap();
//! index.insert("textures/doors/wood2", '/', "oak").unwrap();
//!
//! // Partial paths match from the leaf upwards.
//! assert_eq!(index.find(MatchFlags::new(), "doors/metal1", '/'), Some(metal));
//!
//! // The last fragment may be a glob.
//! let wood = index.find(MatchFlags::new(), "doors/wo*", '/').unwrap();
//! assert_eq!(index.payload(wood), Some(&"oak"));
//!
//! // Paths are rebuilt from the tree.
//! assert_eq!(index.compose_path(wood, '/').unwrap(), "textures/doors/wood2");
//! ```
//!
//! ## Lookup
//!
//! Each node is kept in one of two hash-bucketed tables (branches and
//! leaves), keyed by the case-insensitive hash of its own fragment. A lookup
//! maps the search path once, picks the bucket of its deepest fragment, and
//! walks each candidate's ancestor chain against the remaining fragments.

pub mod index;
pub mod output;
pub mod utils;
