//! In-memory test doubles for the catalog resolver and the destination
//! applier, plus the end-to-end scenarios of §8 that need a live
//! `supervisor::run_connector` loop to exercise. Kept as a library (rather
//! than inline in each integration test file) so both `tests/` files and
//! any future ones can share one `FakeCatalog`/`FakeDestination`.

pub mod fakes;

pub use fakes::catalog::FakeCatalog;
pub use fakes::destination::{FakeDestination, Recorded};
