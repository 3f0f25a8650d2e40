//! Test fixtures and helpers.

use std::sync::Once;

use skein_client::Session;
use skein_driver::{DriverConfig, MemoryDriver, MemoryServer};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initializes test logging once per process. Opt in with `RUST_LOG`.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Connects a fresh session to the given server.
pub fn connect(server: &MemoryServer) -> Session<MemoryDriver> {
    init_logging();
    let driver = MemoryDriver::connect(&DriverConfig::for_testing(), server)
        .expect("memory driver connects");
    Session::new(driver)
}

/// Builds a server with a seeded `users` table and a session connected to
/// it.
pub async fn seeded() -> (MemoryServer, Session<MemoryDriver>) {
    let server = MemoryServer::new();
    let mut session = connect(&server);
    session
        .query("CREATE TABLE users (id, name)")
        .await
        .expect("create table");
    session
        .query("INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob'), (3, 'Carol')")
        .await
        .expect("seed rows");
    session.data(Some("seed")).await.expect("drain seed insert");
    (server, session)
}
