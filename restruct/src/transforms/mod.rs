//! Structural transform engines over the document store
//!
//! Every engine is a pure function from the current store to a freshly
//! built store plus an outcome summary; the session layer is responsible
//! for snapshotting history and swapping the store in atomically.

pub mod merge;
pub mod normalize;
pub mod replace;
pub mod split;
