//! Foundation types shared by every stage of the `tau`-to-C pipeline: a
//! typed index vector used to store interned types and scope entries.
//!
//! Each compilation processes a single source file on a single thread, so
//! this crate favors plain owned data over the synchronization primitives
//! a multi-file, multi-threaded front end would need.

pub mod index_vec;

pub use index_vec::{Idx, IndexVec};
