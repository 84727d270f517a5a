pub mod build;
pub mod compose;
pub mod hash;
pub mod mapper;
pub mod matcher;
pub mod node;
pub mod pool;
pub mod stats;
pub mod tree;
pub mod types;

pub use hash::hash_path;
pub use mapper::{Fragment, PathMap};
pub use matcher::{glob_match, match_directory};
pub use node::Node;
pub use tree::PathIndex;
pub use types::*;
