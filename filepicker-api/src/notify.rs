#![doc = "Completion hooks."]
use crate::error::{Error, Result};

/// Optional completion hook, invoked with a view of the operation's outcome.
///
/// The returned future is the primary result channel; a hook is a secondary
/// sink for callers porting from the callback-style Filepicker clients. It is
/// passed in its own argument slot, never inferred from the query argument.
pub type OnDone<T> = Box<dyn FnOnce(core::result::Result<&T, &Error>) + Send + 'static>;

/// Delivers `outcome` to the hook (when present) and returns it unchanged.
///
/// Every operation funnels through here exactly once, including validation
/// short-circuits that never reach the transport.
pub(crate) fn settle<T>(hook: Option<OnDone<T>>, outcome: Result<T>) -> Result<T> {
    if let Some(hook) = hook {
        hook(outcome.as_ref());
    }
    outcome
}
