pub mod client;
pub mod discovery;
pub mod error;
pub mod labels;
mod parse;
mod rate_limit;

pub use client::{PortalClient, Session};
pub use discovery::list_for_entity;
pub use error::{ListingRowError, PortalError};
