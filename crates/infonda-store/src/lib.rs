//! Infonda Store Module
//!
//! The local persistent store, exposed as just another transport behind
//! the service capability traits.

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::LocalStore;
