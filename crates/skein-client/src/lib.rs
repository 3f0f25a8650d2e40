//! # skein-client
//!
//! Session layer for skein.
//!
//! A [`Session`] unifies three execution modes over one driver connection —
//! synchronous single statements, synchronous multi-statement batches, and
//! non-blocking submission with polled completion — plus a parameterized
//! prepared-statement path. Every completed operation deposits its result
//! into a named, addressable history ([`Collection`]) retrievable by
//! position, by exact name, or by fuzzy name.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use skein_client::Session;
//! use skein_driver::{DriverConfig, MemoryDriver, MemoryServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = MemoryServer::new();
//!     let driver = MemoryDriver::connect(&DriverConfig::default(), &server)?;
//!     let mut session = Session::new(driver);
//!
//!     session.query("CREATE TABLE users (id, name)").await?;
//!     session.data(Some("create")).await?;
//!
//!     // INSERT auto-routes to the async path; data() drains it.
//!     session.query("INSERT INTO users VALUES (1, 'Alice')").await?;
//!     let inserted = session.data(Some("alice")).await?;
//!     assert_eq!(inserted.insert_id(), Some(1));
//!
//!     session.bind("SELECT * FROM users WHERE id = ?", vec![1.into()]).await?;
//!     let rows = session.data(None).await?;
//!     assert_eq!(rows.row_count(), 1);
//!
//!     // Any past result stays addressable.
//!     assert!(session.history("alice").is_some());
//!     assert!(session.history_like("alise").is_some());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Named, ordered result containers.
pub mod collection;

/// The asynchronous execution engine.
pub mod engine;

/// Error types.
pub mod error;

/// Session result shapes and history keys.
pub mod result;

/// The session façade.
pub mod session;

/// Prepared statements.
pub mod statement;

// Re-exports
pub use collection::{Collection, Item};
pub use engine::{AsyncEngine, Drained, EngineState};
pub use error::{ClientError, ClientResult};
pub use result::{HistoryKey, ResultSet};
pub use session::{Session, SessionConfig, SessionStats};
pub use statement::Statement;
