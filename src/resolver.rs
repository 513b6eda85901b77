use crate::errors::ErrorIdentity;
use crate::registry::{FixFn, Registry};
use log::{debug, trace};
use serde::Serialize;
/// How a resolution call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The slot held no error; nothing was done.
    Idle,
    /// A fix followed by a retry left no error.
    Cleared,
    /// The error was replaced by a different one (single-attempt only).
    Replaced,
    /// No handler produced a different result; the slot is untouched.
    Unchanged,
    /// An error seen earlier in the same call came back; the loop gave up.
    Recurred,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub outcome: Outcome,
    pub passes: u32,
    pub handlers_invoked: u32,
    pub retries: u32,
    pub replacements: u32,
}
impl Resolution {
    fn new() -> Self {
        Self {
            outcome: Outcome::Idle,
            passes: 0,
            handlers_invoked: 0,
            retries: 0,
            replacements: 0,
        }
    }
    pub fn is_cleared(&self) -> bool {
        matches!(self.outcome, Outcome::Cleared)
    }
}
impl<E: ErrorIdentity + Clone> Registry<E> {
    /// Runs at most one round of fix and retry.
    ///
    /// `slot` is overwritten with the retry result the first time a fix reports
    /// success and the retry returns nothing or a different error; the call
    /// returns right after that single replacement.
    pub fn try_fix_once<R>(&self, slot: &mut Option<E>, mut retry: R) -> Resolution
    where
        R: FnMut(&E) -> Option<E>,
    {
        let mut report = Resolution::new();
        let Some(current) = slot.clone() else {
            return report;
        };
        report.passes = 1;
        let lookups: [fn(&Self, &E) -> Vec<FixFn<E>>; 2] = [
            Self::exact_handlers,
            Self::equivalent_handlers,
        ];
        for lookup in lookups {
            let handlers = lookup(self, &current);
            if let Some(next) = run_handlers(&handlers, &current, &mut retry, &mut report) {
                report.replacements = 1;
                report.outcome = if next.is_some() {
                    Outcome::Replaced
                } else {
                    Outcome::Cleared
                };
                *slot = next;
                return report;
            }
        }
        report.outcome = Outcome::Unchanged;
        report
    }
    /// Repeats fix and retry rounds until the slot is empty or an error shows
    /// up a second time.
    ///
    /// Each round runs the exact handlers, then the equivalence handlers, both
    /// looked up from the error as it stood when the round began. A round that
    /// changes nothing ends the loop on the next iteration, since the same error
    /// is then already in the history.
    pub fn try_fix<R>(&self, slot: &mut Option<E>, mut retry: R) -> Resolution
    where
        R: FnMut(&E) -> Option<E>,
    {
        let mut report = Resolution::new();
        let mut tried: Vec<E> = Vec::new();
        while let Some(current) = slot.clone() {
            if tried.iter().any(|seen| current.same(seen)) {
                debug!("error recurred after {} passes, giving up", report.passes);
                report.outcome = Outcome::Recurred;
                return report;
            }
            tried.push(current.clone());
            bump(&mut report.passes);
            let equivalent = self.equivalent_handlers(&current);
            let exact = self.exact_handlers(&current);
            trace!(
                "pass {}: {} exact, {} equivalent handlers", report.passes, exact.len(),
                equivalent.len()
            );
            for handlers in [&exact, &equivalent] {
                if let Some(next) = run_handlers(handlers, &current, &mut retry, &mut report)
                {
                    bump(&mut report.replacements);
                    *slot = next;
                }
            }
        }
        if report.passes > 0 {
            report.outcome = Outcome::Cleared;
        }
        report
    }
}
/// Counters saturate; a run of never-repeating errors may loop indefinitely.
fn bump(counter: &mut u32) {
    *counter = counter.saturating_add(1);
}
/// Invokes `handlers` in order against `current`. Returns the retry result of
/// the first successful fix whose retry is empty or differs from `current`.
fn run_handlers<E, R>(
    handlers: &[FixFn<E>],
    current: &E,
    retry: &mut R,
    report: &mut Resolution,
) -> Option<Option<E>>
where
    E: ErrorIdentity,
    R: FnMut(&E) -> Option<E>,
{
    for handler in handlers {
        bump(&mut report.handlers_invoked);
        if !handler(current) {
            continue;
        }
        bump(&mut report.retries);
        let next = retry(current);
        match &next {
            None => return Some(next),
            Some(err) if !err.same(current) => return Some(next),
            Some(_) => trace!("retry reproduced the same error"),
        }
    }
    None
}
