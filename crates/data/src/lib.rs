//! Config loading and search payload mapping.

pub mod load;
pub mod schema;

pub use load::*;
pub use schema::*;
