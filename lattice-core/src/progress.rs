//! Progress collaborator.
//!
//! The kernel has no I/O of its own; the only way it talks to the outside
//! world mid-operation is through a [`ProgressSink`]. Implementations must
//! be non-blocking and must never let an error escape into kernel code —
//! the kernel calls them from inside hot loops (lattice construction, cost
//! matrix population) and cannot afford to propagate a callback failure.

/// Which long-running kernel operation a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessType {
    Precomputation,
    Optimization,
}

impl ProcessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Precomputation => "precomputation",
            ProcessType::Optimization => "optimization",
        }
    }
}

/// A sink for kernel progress updates.
///
/// `update` is called synchronously from the worker thread running the
/// operation. Implementations must not block or panic; the kernel does not
/// guard against either, callers are trusted to honor the contract.
pub trait ProgressSink {
    fn update(&self, process: ProcessType, percent: u8, message: &str, error: Option<&str>);
}

/// A sink that discards every update. The default when a caller doesn't
/// care to observe progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn update(&self, _process: ProcessType, _percent: u8, _message: &str, _error: Option<&str>) {}
}

impl<T: ProgressSink + ?Sized> ProgressSink for &T {
    fn update(&self, process: ProcessType, percent: u8, message: &str, error: Option<&str>) {
        (**self).update(process, percent, message, error)
    }
}
