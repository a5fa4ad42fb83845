//! Invariant oracles and the crash signal.
//!
//! A violated invariant is reported by emitting a `Crash` event, never by
//! aborting: the transaction still completes, and trace or fuzz tooling
//! reading the event log decides what to do with the finding. See
//! [`crate::findings`] for the consumer side.

use tracing::{error, warn};

use sui_oracle_types::{Crash, EventKind, LogMessage};

use crate::context_store::ContextStore;
use crate::errors::ScenarioResult;
use crate::events::EventSink;
use crate::runtime::{InMemoryRuntime, LedgerRuntime};
use crate::scenario::Scenario;

/// Key of the single entry written by [`crash_with_reason`].
pub const REASON_KEY: &str = "reason";

/// Emit a crash signal carrying `details`.
pub fn emit_crash<S: EventSink + ?Sized>(sink: &mut S, details: LogMessage) {
    let crash = Crash { reason: details };
    match bcs::to_bytes(&crash) {
        Ok(data) => {
            warn!(reason = ?crash.reason.msg, "invariant violated");
            sink.emit_event(EventKind::Crash.type_tag(), data);
        }
        Err(e) => error!("failed to encode crash: {}", e),
    }
}

/// Emit a crash whose details are the single entry `("reason", reason)`.
pub fn crash_with_reason<S: EventSink + ?Sized>(sink: &mut S, reason: impl Into<String>) {
    emit_crash(sink, LogMessage::new().with_entry(REASON_KEY, reason));
}

/// Emit a crash with `reason` unless `holds`. Returns `holds`.
pub fn assert_invariant<S: EventSink + ?Sized>(
    sink: &mut S,
    holds: bool,
    reason: impl Into<String>,
) -> bool {
    if !holds {
        crash_with_reason(sink, reason);
    }
    holds
}

/// A pre-call/post-call invariant pair.
///
/// `before_call` typically stashes a snapshot in the context store, and
/// `after_call` reads it back under the same key and emits a crash when the
/// relation between the two states does not hold. Errors from either half
/// are harness errors (missing snapshot, inventory misuse), not violations.
pub trait InvariantOracle<R: LedgerRuntime = InMemoryRuntime> {
    fn name(&self) -> &str;

    fn before_call(
        &mut self,
        _scenario: &mut Scenario<R>,
        _store: &ContextStore,
    ) -> ScenarioResult<()> {
        Ok(())
    }

    fn after_call(
        &mut self,
        _scenario: &mut Scenario<R>,
        _store: &ContextStore,
    ) -> ScenarioResult<()> {
        Ok(())
    }
}

/// Run `call` between the halves of every oracle. Post-call halves run in
/// reverse order.
pub fn guarded_call<R, T, F>(
    scenario: &mut Scenario<R>,
    store: &ContextStore,
    oracles: &mut [&mut dyn InvariantOracle<R>],
    call: F,
) -> ScenarioResult<T>
where
    R: LedgerRuntime,
    F: FnOnce(&mut Scenario<R>) -> ScenarioResult<T>,
{
    for oracle in oracles.iter_mut() {
        oracle.before_call(scenario, store)?;
    }
    let result = call(scenario)?;
    for oracle in oracles.iter_mut().rev() {
        oracle.after_call(scenario, store)?;
    }
    Ok(result)
}
