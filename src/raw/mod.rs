mod arena;
mod node;
mod raw_ttree;

pub(crate) use arena::{Arena, Handle};
pub(crate) use node::Node;
pub(crate) use raw_ttree::RawTTree;
