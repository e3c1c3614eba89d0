//! Audit trail of write operations.
//!
//! Lines are JSON objects sent to the `docdigest::audit` log target. A
//! thread-local sink can capture them so tests can assert on audit output
//! without touching the global logger.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};

pub const AUDIT_TARGET: &str = "docdigest::audit";

static AUDIT_ENABLED: AtomicBool = AtomicBool::new(true);

thread_local! {
    static TL_SINK: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Guard that disables the thread-local sink on drop.
pub struct AuditSinkGuard;

impl Drop for AuditSinkGuard {
    fn drop(&mut self) {
        TL_SINK.with(|s| *s.borrow_mut() = None);
    }
}

/// Capture audit lines emitted on the current thread until the guard drops.
pub fn enable_thread_sink() -> AuditSinkGuard {
    TL_SINK.with(|s| *s.borrow_mut() = Some(Vec::new()));
    AuditSinkGuard
}

/// Drain captured lines for the current thread.
pub fn take_lines() -> Vec<String> {
    TL_SINK.with(|s| s.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
}

pub fn set_audit_enabled(enabled: bool) {
    AUDIT_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn audit_enabled() -> bool {
    AUDIT_ENABLED.load(Ordering::Relaxed)
}

pub fn log_audit(op: &str, collection: &str, doc_id: &str, digested: usize) {
    if !audit_enabled() {
        return;
    }
    let line = serde_json::json!({
        "ts": chrono::Utc::now().to_rfc3339(),
        "op": op, "collection": collection, "doc_id": doc_id, "digested": digested
    })
    .to_string();
    log::info!(target: AUDIT_TARGET, "{line}");
    TL_SINK.with(|s| {
        if let Some(buf) = s.borrow_mut().as_mut() {
            buf.push(line);
        }
    });
}
