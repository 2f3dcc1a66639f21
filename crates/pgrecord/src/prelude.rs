//! Convenient imports for common usage.
//!
//! ```ignore
//! use pgrecord::prelude::*;
//! ```

pub use crate::client::GenericClient;
pub use crate::entity::Entity;
pub use crate::error::{ErrorKind, OrmError, OrmResult};
pub use crate::model::Model;
pub use crate::param::Param;
pub use crate::trace::{TraceConfig, TracingClient};

#[cfg(feature = "pool")]
pub use crate::pool::{PoolConfig, create_pool};

#[cfg(feature = "derive")]
pub use pgrecord_derive::Entity;
