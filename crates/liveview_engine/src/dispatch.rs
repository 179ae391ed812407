use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use liveview_core::{Subject, Trigger, ViewUpdate};
use liveview_logging::{live_debug, live_info, live_warn};
use tokio::runtime::Handle;

use crate::gate::RefreshGate;
use crate::{FetchError, SubjectHandler};

/// Receives the outcome of every refresh while the page is alive.
pub trait RefreshSink: Send + Sync {
    fn deliver(&self, update: ViewUpdate);

    fn report(&self, subject: Subject, error: FetchError);
}

/// Cleared on page teardown. Refreshes still in flight check it before
/// writing anything back.
#[derive(Debug, Clone)]
pub struct PageLifetime {
    alive: Arc<AtomicBool>,
}

impl PageLifetime {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn end(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl Default for PageLifetime {
    fn default() -> Self {
        Self::new()
    }
}

struct Registration {
    handler: Arc<dyn SubjectHandler>,
    gate: Arc<RefreshGate>,
}

type Registry = Arc<Mutex<HashMap<Subject, Registration>>>;

/// Maps trigger subjects to their handlers and runs refreshes without ever
/// blocking the caller.
pub struct DispatchTable {
    runtime: Handle,
    sink: Arc<dyn RefreshSink>,
    lifetime: PageLifetime,
    registry: Registry,
}

impl DispatchTable {
    pub fn new(runtime: Handle, sink: Arc<dyn RefreshSink>, lifetime: PageLifetime) -> Self {
        Self {
            runtime,
            sink,
            lifetime,
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Binds `subject` to `handler`. A later registration for the same
    /// subject replaces the handler but keeps its refresh gate, so a refresh
    /// already running still excludes new ones.
    pub fn register(&self, subject: Subject, handler: Arc<dyn SubjectHandler>) {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        match registry.get_mut(&subject) {
            Some(registration) => {
                live_debug!("Replacing handler for subject `{}`", subject);
                registration.handler = handler;
            }
            None => {
                registry.insert(
                    subject,
                    Registration {
                        handler,
                        gate: Arc::new(RefreshGate::default()),
                    },
                );
            }
        }
    }

    pub fn registered_subjects(&self) -> Vec<Subject> {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let mut subjects: Vec<Subject> = registry.keys().cloned().collect();
        subjects.sort();
        subjects
    }

    pub fn is_refreshing(&self, subject: &Subject) -> bool {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry
            .get(subject)
            .is_some_and(|registration| registration.gate.is_busy())
    }

    /// Routes a channel trigger. Returns whether a handler was registered.
    pub fn dispatch(&self, trigger: &Trigger) -> bool {
        self.refresh(&trigger.subject)
    }

    /// Starts (or coalesces) a refresh for `subject`. Also used for the
    /// unconditional fetch at mount.
    pub fn refresh(&self, subject: &Subject) -> bool {
        if !self.lifetime.is_alive() {
            live_debug!("Page torn down; ignoring refresh of `{}`", subject);
            return false;
        }

        let gate = {
            let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            match registry.get(subject) {
                Some(registration) => registration.gate.clone(),
                None => {
                    live_debug!("No handler for subject `{}`; ignoring", subject);
                    return false;
                }
            }
        };

        if !gate.request() {
            live_debug!("Refresh of `{}` in flight; coalescing", subject);
            return true;
        }

        self.runtime.spawn(run_refresh(
            subject.clone(),
            gate,
            self.registry.clone(),
            self.sink.clone(),
            self.lifetime.clone(),
        ));
        true
    }
}

/// Runs refreshes for one subject until no follow-up is pending. The handler
/// is looked up per round so a re-registration takes effect on the next one.
async fn run_refresh(
    subject: Subject,
    gate: Arc<RefreshGate>,
    registry: Registry,
    sink: Arc<dyn RefreshSink>,
    lifetime: PageLifetime,
) {
    loop {
        let handler = {
            let registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry
                .get(&subject)
                .map(|registration| registration.handler.clone())
        };

        if let Some(handler) = handler {
            let result = handler.refresh().await;
            if !lifetime.is_alive() {
                live_debug!("Page torn down; dropping `{}` refresh result", subject);
            } else {
                match result {
                    Ok(update) => {
                        live_info!("Refreshed `{}`", subject);
                        sink.deliver(update);
                    }
                    Err(err) => {
                        live_warn!("Refresh of `{}` failed: {}", subject, err);
                        sink.report(subject.clone(), err);
                    }
                }
            }
        }

        if !gate.finish() {
            break;
        }
    }
}
