//! # pgrecord
//!
//! Active-record style persistence for plain Rust structs on PostgreSQL.
//!
//! ## Features
//!
//! - **Compile-time mapping**: `#[derive(Entity)]` describes the persisted
//!   attributes; nothing is discovered at runtime
//! - **Convention over configuration**: `Person` is stored in `persons`, the
//!   primary key is `id`
//! - **Parameterized SQL only**: every value, the primary key included, is bound
//! - **Generated keys**: `create` reads the new integer key back into the struct
//! - **Explicit errors**: every operation returns [`OrmResult`]
//! - **Client injection**: pass a connection, a pooled connection or a
//!   transaction anywhere a [`GenericClient`] is expected
//!
//! ## Example
//!
//! ```ignore
//! use pgrecord::{Entity, Model};
//!
//! #[derive(Debug, Entity)]
//! struct Person {
//!     id: Option<i32>,
//!     name: String,
//!     age: i32,
//! }
//!
//! let pool = pgrecord::create_pool(&std::env::var("DATABASE_URL")?)?;
//! let client = pool.get().await?;
//!
//! let mut person = Person { id: None, name: "alice".into(), age: 30 };
//! person.create(&client).await?;   // INSERT INTO persons (name, age) VALUES ($1, $2) RETURNING id
//! assert!(person.id.is_some());
//!
//! person.age = 31;
//! person.save(&client).await?;     // UPDATE persons SET name = $1, age = $2 WHERE id = $3
//! person.delete(&client).await?;   // DELETE FROM persons WHERE id = $1
//! ```

pub mod attribute;
pub mod client;
pub mod entity;
pub mod error;
pub mod extract;
pub mod ident;
pub mod model;
pub mod param;
pub mod prelude;
pub mod statement;
pub mod table;
pub mod trace;

pub use attribute::Attribute;
pub use client::GenericClient;
pub use entity::Entity;
pub use error::{ErrorKind, OrmError, OrmResult};
pub use extract::{Extraction, extract};
pub use model::Model;
pub use param::{Param, ParamList};
pub use statement::{PlaceholderStyle, Statement, StatementKind};
pub use table::{table_name, table_of};
pub use trace::{TraceConfig, TracingClient};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{PoolConfig, create_pool, create_pool_from_config, create_pool_with_config};

// The derive macro shares its name with the trait; both are exported as `Entity`.
#[cfg(feature = "derive")]
pub use pgrecord_derive::Entity;

// Callers bind values with the same driver version.
pub use tokio_postgres;
