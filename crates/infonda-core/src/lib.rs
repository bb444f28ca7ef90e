//! Infonda Core Module
//!
//! This module defines the data model for the information-centric node:
//! NDO identity URIs, content digests, the immutable NDO value, and the
//! JSON wire record exchanged between nodes.

pub mod error;
pub mod hash;
pub mod ndo;
pub mod record;
pub mod uri;

pub use error::{CoreError, Result};
pub use hash::{digest, new_id, ID_LENGTH};
pub use ndo::{Locator, Metadata, Ndo, NdoBuilder, NDO_SCHEME};
