//! In-memory [`ScriptHost`] for tests.
//!
//! Every handle the host hands out is counted in a shared table until it is
//! dropped, so a test can assert that nothing leaked and nothing was
//! released twice.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::host::ScriptHost;
use crate::payload::PayloadRef;

/// Test callback: receives the topic and a copy of the payload.
pub type TestFn = Arc<dyn Fn(&str, Observed) -> Result<(), String> + Send + Sync>;

/// Owned slot in the test host's value table.
pub struct TestHandle {
    value: TestValue,
    live: Arc<AtomicUsize>,
}

enum TestValue {
    Table(serde_json::Value),
    Function(TestFn),
}

impl Drop for TestHandle {
    fn drop(&mut self) {
        let previous = self.live.fetch_sub(1, Ordering::SeqCst);
        assert!(previous > 0, "test handle released twice");
    }
}

/// A payload as seen by a test callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Text(Vec<u8>),
    Table(serde_json::Value),
    Function,
}

impl Observed {
    /// Text payload holding `text`'s bytes.
    pub fn text(text: &str) -> Self {
        Self::Text(text.as_bytes().to_vec())
    }

    pub fn from_view(view: PayloadRef<'_, TestHandle>) -> Self {
        match view {
            PayloadRef::Text(text) => Self::Text(text.to_vec()),
            PayloadRef::Value(handle) => match &handle.value {
                TestValue::Table(record) => Self::Table(record.clone()),
                TestValue::Function(_) => Self::Function,
            },
        }
    }
}

/// Host whose handle table is a counter.
#[derive(Default)]
pub struct TestHost {
    live: Arc<AtomicUsize>,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles currently allocated and not yet released.
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Allocate a table value.
    pub fn table(&self, record: serde_json::Value) -> TestHandle {
        self.allocate(TestValue::Table(record))
    }

    /// Allocate a callable value.
    pub fn function<F>(&self, f: F) -> TestHandle
    where
        F: Fn(&str, Observed) -> Result<(), String> + Send + Sync + 'static,
    {
        self.allocate(TestValue::Function(Arc::new(f)))
    }

    fn allocate(&self, value: TestValue) -> TestHandle {
        self.live.fetch_add(1, Ordering::SeqCst);
        TestHandle {
            value,
            live: Arc::clone(&self.live),
        }
    }
}

impl ScriptHost for TestHost {
    type Handle = TestHandle;
    type Error = String;

    fn import(&self, record: &serde_json::Value) -> Result<TestHandle, String> {
        Ok(self.table(record.clone()))
    }

    fn invoke(
        &self,
        callback: &TestHandle,
        topic: &str,
        payload: PayloadRef<'_, TestHandle>,
    ) -> Result<(), String> {
        match &callback.value {
            TestValue::Function(f) => f(topic, Observed::from_view(payload)),
            TestValue::Table(_) => Err("attempt to call a table value".to_string()),
        }
    }
}
