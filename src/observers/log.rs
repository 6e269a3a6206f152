//! # Stdout logging observer for debugging and demos.
//!
//! [`LogWriter`] prints events in a compact human-readable form:
//!
//! ```text
//! [connecting] endpoint=jasta.dyndns.org:5545
//! [established] endpoint=jasta.dyndns.org:5545
//! [link-down] endpoint=jasta.dyndns.org:5545 reason="peer closed the connection"
//! [retry-scheduled] delay=5000ms
//! [warn] start ignored: link already active
//! ```
//!
//! Not intended for production use; implement [`Observer`] for structured
//! logging or metrics.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::observers::Observer;

/// Simple stdout logging observer.
pub struct LogWriter;

#[async_trait]
impl Observer for LogWriter {
    async fn handle(&self, e: &Event) {
        match e.kind {
            EventKind::Connecting => {
                println!("[connecting] endpoint={}", opt(&e.endpoint));
            }
            EventKind::Established => {
                println!("[established] endpoint={}", opt(&e.endpoint));
            }
            EventKind::LinkDown => {
                println!(
                    "[link-down] endpoint={} reason={:?}",
                    opt(&e.endpoint),
                    opt(&e.reason)
                );
            }
            EventKind::LinkClosed => {
                println!("[link-closed] endpoint={}", opt(&e.endpoint));
            }
            EventKind::ProbeSent => {
                println!("[probe-sent]");
            }
            EventKind::ProbeFailed => {
                println!("[probe-failed] reason={:?}", opt(&e.reason));
            }
            EventKind::ProbeSkipped => {
                println!("[probe-skipped] no active link");
            }
            EventKind::RetryScheduled => {
                println!("[retry-scheduled] delay={}ms", e.delay_ms.unwrap_or(0));
            }
            EventKind::StartIgnored => {
                println!("[warn] start ignored: link already active");
            }
            EventKind::StopIgnored => {
                println!("[warn] stop ignored: no active link");
            }
        }
    }
}

fn opt(v: &Option<std::sync::Arc<str>>) -> &str {
    v.as_deref().unwrap_or("-")
}
