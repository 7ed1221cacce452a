//! The Producer interface consumed by the connector supervisor (§6), and
//! its two implementations: a subprocess-backed runner and an in-memory
//! fake for tests.

pub mod fake;
pub mod process;

pub use fake::FakeProducer;
pub use process::ProcessProducer;

use async_trait::async_trait;
use common::err::CdcError;

/// Host-controlled producer contract. Implementations own the lifetime of
/// whatever upstream connection or process backs them; the supervisor
/// never reaches past this trait into implementation detail.
#[async_trait]
pub trait Producer: Send {
    /// Blocking init; must complete before `fetch_events` is called.
    async fn start(&mut self) -> Result<(), CdcError>;

    /// Non-blocking pull of 0..N JSON event strings already buffered by
    /// the implementation. Never blocks on upstream I/O.
    async fn fetch_events(&mut self) -> Result<Vec<String>, CdcError>;

    /// Opaque offset descriptor for `db`, persisted verbatim by the
    /// supervisor after a successful apply.
    async fn get_offset(&self, db: &str) -> Result<String, CdcError>;

    async fn set_offset(&mut self, db: &str, offset: &str, file: &str) -> Result<(), CdcError>;

    /// Idempotent shutdown.
    async fn stop(&mut self) -> Result<(), CdcError>;
}
