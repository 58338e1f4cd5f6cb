//! Deck assembly logic. Keep this crate free of IO and network concerns.

pub mod allocate;
pub mod assemble;
pub mod cards;
pub mod config;
pub mod deck;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod reply;
pub mod request;
pub mod response;
pub mod scoring;
pub mod style;
pub mod synergy;
pub mod terms;

pub use allocate::*;
pub use assemble::*;
pub use cards::*;
pub use config::*;
pub use deck::*;
pub use error::*;
pub use identity::*;
pub use normalize::*;
pub use reply::*;
pub use request::*;
pub use response::*;
pub use scoring::*;
pub use style::*;
pub use synergy::*;
pub use terms::*;
