//! # ez Firmware Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/   # Bus behaviour end to end, through a real Lua state
//! │   ├── harness.rs     # Runtime fixture
//! │   ├── delivery.rs    # Ordering, capacity, membership, isolation, echo
//! │   ├── ownership.rs   # Handle release, teardown, payload builders
//! │   └── concurrency.rs # Producers on other threads
//! └── benches/           # Post and drain throughput
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ez-tests
//! cargo test -p ez-tests integration::ownership::
//! cargo bench -p ez-tests
//! ```

pub mod integration;
