//! Runtime diagnostics.
//!
//! Two situations warrant a warning instead of an error: releasing a boxed
//! pointer whose ownership is indeterminate, and member lookups that fall
//! through to the host runtime's default mechanism. The fallback is a
//! compatibility shim, not error suppression; routing every hit through
//! [`fallback_hit`] keeps the policy in one place and lets embedders (and
//! tests) observe it.

use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// Observer invoked with `(class name, member name)` on each fallback hit.
pub type FallbackHook = Box<dyn Fn(&str, &str) + Send>;

static FALLBACK_HOOK: Lazy<Mutex<Option<FallbackHook>>> = Lazy::new(|| Mutex::new(None));

/// Install or clear the fallback observer. With a hook installed, fallback
/// hits are reported to it instead of being printed.
pub fn set_fallback_hook(hook: Option<FallbackHook>) {
    *FALLBACK_HOOK.lock() = hook;
}

/// Record that a member lookup fell through to default lookup.
pub(crate) fn fallback_hit(class: &str, member: &str) {
    let hook = FALLBACK_HOOK.lock();
    match &*hook {
        Some(hook) => hook(class, member),
        None => eprintln!("Warning: {class}.{member}: falling back to default member lookup"),
    }
}

/// Emit a one-line warning.
pub(crate) fn warn(message: &str) {
    eprintln!("Warning: {message}");
}
