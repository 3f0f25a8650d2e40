//! # skein-driver
//!
//! Driver seam for the skein session layer.
//!
//! This crate defines everything the session layer needs from the database
//! side of the wire without committing to a wire protocol:
//!
//! - **Values**: the client-side scalar model (`Value`, `Record`, `FromValue`)
//! - **Outcomes**: the tagged result of executing one statement (`ExecOutcome`)
//! - **The `Driver` trait**: blocking execute, non-blocking submit,
//!   completion polling, and result reaping over a single connection
//! - **`MemoryDriver`**: an in-process reference implementation backed by a
//!   shared [`MemoryServer`], so the session layer can be exercised end to
//!   end without a network
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use skein_driver::{DriverConfig, MemoryDriver, MemoryServer, Driver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = MemoryServer::new();
//!     let mut driver = MemoryDriver::connect(&DriverConfig::default(), &server)?;
//!
//!     driver.execute("CREATE TABLE users (id, name)").await?;
//!     driver.execute("INSERT INTO users VALUES (1, 'Alice')").await?;
//!
//!     let handle = driver.submit("SELECT * FROM users").await?;
//!     let ready = driver.poll(&[handle], std::time::Duration::from_millis(50)).await?;
//!     assert_eq!(ready, vec![handle]);
//!     let outcome = driver.reap(handle).await?;
//!     assert_eq!(outcome.rows().map(|r| r.len()), Some(1));
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Driver configuration.
pub mod config;

/// The driver trait and opaque operation handles.
pub mod driver;

/// Error types.
pub mod error;

/// In-memory reference driver.
pub mod memory;

/// Statement execution outcomes.
pub mod outcome;

/// Client-side values and row records.
pub mod value;

// Re-exports
pub use config::DriverConfig;
pub use driver::{AsyncHandle, Driver, StatementId};
pub use error::{DriverError, DriverResult};
pub use memory::{MemoryDriver, MemoryServer};
pub use outcome::ExecOutcome;
pub use value::{FromValue, Record, Value};
