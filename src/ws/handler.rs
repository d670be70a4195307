//! Ordered registry of inbound message handlers.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

/// A host-supplied callback receiving one parsed inbound message.
///
/// Handlers are compared by pointer identity, so keep a clone of the [`Arc`] to remove
/// it later. A handler that replies should capture a
/// [`WeakConnectionManager`](super::WeakConnectionManager); a strong clone keeps the
/// connection from ever shutting down on drop.
pub type MessageHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Wrap a closure as a [`MessageHandler`].
pub fn handler<F>(f: F) -> MessageHandler
where
    F: Fn(&Value) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Handlers in registration order. Duplicates are allowed and each registration is
/// invoked separately.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    handlers: RwLock<Vec<MessageHandler>>,
}

impl HandlerRegistry {
    pub(crate) fn push(&self, handler: MessageHandler) {
        // A Vec of Arcs has no inconsistent intermediate state, so a poisoned lock is recoverable.
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    /// Remove the first registration of `handler`. Returns whether one was found.
    pub(crate) fn remove(&self, handler: &MessageHandler) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match handlers.iter().position(|h| Arc::ptr_eq(h, handler)) {
            Some(index) => {
                handlers.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Invoke every handler in order with `message`.
    ///
    /// Runs over a snapshot, so handlers may add or remove registrations (including
    /// themselves) without deadlocking; such changes apply from the next message on.
    pub(crate) fn dispatch(&self, message: &Value) {
        let snapshot: Vec<MessageHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for (index, handler) in snapshot.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| handler(message))).is_err() {
                #[cfg(feature = "tracing")]
                tracing::error!(index, "Message handler panicked");
                #[cfg(not(feature = "tracing"))]
                let _: usize = index;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> MessageHandler {
        let log = Arc::clone(log);
        handler(move |value| {
            log.lock().unwrap().push(format!("{name}({value})"));
        })
    }

    #[test]
    fn dispatches_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HandlerRegistry::default();
        registry.push(recorder(&log, "h1"));
        registry.push(recorder(&log, "h2"));
        registry.push(recorder(&log, "h3"));

        registry.dispatch(&json!(1));
        registry.dispatch(&json!(2));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["h1(1)", "h2(1)", "h3(1)", "h1(2)", "h2(2)", "h3(2)"]
        );
    }

    #[test]
    fn duplicate_registration_runs_twice_and_removes_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HandlerRegistry::default();
        let h = recorder(&log, "h");
        registry.push(Arc::clone(&h));
        registry.push(Arc::clone(&h));

        registry.dispatch(&json!("a"));
        assert!(registry.remove(&h), "first registration should be removed");
        registry.dispatch(&json!("b"));

        assert_eq!(
            *log.lock().unwrap(),
            vec![r#"h("a")"#, r#"h("a")"#, r#"h("b")"#]
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removing_unknown_handler_is_noop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HandlerRegistry::default();
        registry.push(recorder(&log, "h1"));

        let stranger = recorder(&log, "h1");
        assert!(!registry.remove(&stranger), "identity differs from registered handler");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn panicking_handler_does_not_stop_later_handlers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HandlerRegistry::default();
        registry.push(handler(|_| panic!("boom")));
        registry.push(recorder(&log, "after"));

        registry.dispatch(&json!(null));

        assert_eq!(*log.lock().unwrap(), vec!["after(null)"]);
    }
}
