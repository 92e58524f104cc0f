//! Request boundary: CSV input/output and the mapping from error kinds to
//! the categories reported back to the caller.

pub mod csv;
pub mod request;
