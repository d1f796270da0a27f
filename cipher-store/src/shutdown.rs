use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

type Hook = Box<dyn FnOnce() + Send>;

/// One-shot, process-wide shutdown coordination.
///
/// The flag flips exactly once; later `begin` calls lose the race and do
/// nothing. Pre-shutdown hooks run before the pool drains, completion hooks
/// after every connection has come home.
#[derive(Default)]
pub struct ShutdownCoordinator {
    shutting_down: AtomicBool,
    hooks: Mutex<Hooks>,
}

#[derive(Default)]
struct Hooks {
    pre: Vec<Hook>,
    completion: Vec<Hook>,
}

impl std::fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("shutting_down", &self.is_shutting_down())
            .finish()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` after the shutdown flag flips but before the pool drains.
    pub fn register_shutdown_hook(&self, hook: impl FnOnce() + Send + 'static) {
        self.hooks.lock().pre.push(Box::new(hook));
    }

    /// Run `hook` once every outstanding connection has returned.
    pub fn register_completion_hook(&self, hook: impl FnOnce() + Send + 'static) {
        self.hooks.lock().completion.push(Box::new(hook));
    }

    /// Acquire-ordered so balance and pool state written before the flag
    /// flip is visible to readers that observe it.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Flip the flag; returns whether this call won the one-shot race.
    pub fn begin(&self) -> bool {
        let won = self
            .shutting_down
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            debug!("shutdown initiated");
        }
        won
    }

    pub fn run_pre_hooks(&self) {
        let hooks = std::mem::take(&mut self.hooks.lock().pre);
        for hook in hooks {
            hook();
        }
    }

    pub fn run_completion_hooks(&self) {
        let hooks = std::mem::take(&mut self.hooks.lock().completion);
        for hook in hooks {
            hook();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn begin_is_one_shot() {
        let coordinator = ShutdownCoordinator::new();
        assert!(!coordinator.is_shutting_down());
        assert!(coordinator.begin());
        assert!(coordinator.is_shutting_down());
        assert!(!coordinator.begin());
    }

    #[test]
    fn hooks_run_once_in_registration_order() {
        let coordinator = ShutdownCoordinator::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for expected in 0..3 {
            let counter = Arc::clone(&counter);
            coordinator.register_shutdown_hook(move || {
                assert_eq!(counter.fetch_add(1, Ordering::SeqCst), expected);
            });
        }
        coordinator.run_pre_hooks();
        assert_eq!(counter.load(Ordering::SeqCst), 3);

        // Draining means a second run is a no-op.
        coordinator.run_pre_hooks();
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
