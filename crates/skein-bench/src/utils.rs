//! Benchmark helpers.

use skein_client::Session;
use skein_driver::{DriverConfig, MemoryDriver, MemoryServer};

/// Builds a session against a fresh server with a seeded `users` table of
/// `rows` rows.
pub async fn seeded_session(rows: usize) -> Session<MemoryDriver> {
    let server = MemoryServer::new();
    let driver = MemoryDriver::connect(&DriverConfig::for_testing(), &server)
        .expect("memory driver connects");
    let mut session = Session::new(driver);

    session
        .query("CREATE TABLE users (id, name)")
        .await
        .expect("create table");
    let tuples: Vec<String> = (0..rows)
        .map(|i| format!("({}, 'user_{}')", i, i))
        .collect();
    session
        .query(&format!("INSERT INTO users VALUES {}", tuples.join(", ")))
        .await
        .expect("seed rows");
    session.data(Some("seed")).await.expect("drain seed wave");
    session
}
