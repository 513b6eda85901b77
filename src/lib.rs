//! Hook fixes onto errors, then let a retry loop drive them until the error
//! clears, turns into something nothing can fix, or keeps coming back.
//!
//! A [`Registry`] maps error keys to fix callbacks. [`Registry::try_fix`] loops
//! fix and retry rounds with a recursion guard; [`Registry::try_fix_once`] runs a
//! single round. The free functions below work on the process-wide [`global`]
//! registry over [`SharedError`] values.
pub mod errors;
pub mod registry;
pub mod resolver;
pub mod scenario;
pub use errors::{ErrorIdentity, FixError, SharedError};
pub use registry::{global, FixFn, FixRecord, MatchMode, Registry};
pub use resolver::{Outcome, Resolution};
/// Hook a fix onto `err` in the global registry. Fires only on that exact error.
pub fn hook<F>(err: SharedError, callback: F)
where
    F: Fn(&SharedError) -> bool + Send + Sync + 'static,
{
    global().hook(err, callback);
}
/// Like [`hook`], but also fires for any error whose cause chain contains `err`.
pub fn hook_any<F>(err: SharedError, callback: F)
where
    F: Fn(&SharedError) -> bool + Send + Sync + 'static,
{
    global().hook_any(err, callback);
}
/// Loop fixes from the global registry over `err`. See [`Registry::try_fix`].
pub fn try_fix<R>(err: &mut Option<SharedError>, retry: R) -> Resolution
where
    R: FnMut(&SharedError) -> Option<SharedError>,
{
    global().try_fix(err, retry)
}
/// Single fix round from the global registry. See [`Registry::try_fix_once`].
pub fn try_fix_once<R>(err: &mut Option<SharedError>, retry: R) -> Resolution
where
    R: FnMut(&SharedError) -> Option<SharedError>,
{
    global().try_fix_once(err, retry)
}
