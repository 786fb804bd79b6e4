//! Single-flight lifecycle manager for the scoring oracle.
//!
//! States: `Empty → Loading → Ready`, with `Loading → Empty` on failure.
//! The first caller in `Empty` runs the loader; callers arriving during
//! `Loading` sleep on a condition variable and wake to either the
//! published handle or the load error. Once `Ready`, callers read the
//! published `Arc` without touching the load gate.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use mealgraph_core::{Error, Result};

use crate::handle::{load_oracle, OracleHandle};

type Loader = dyn Fn() -> Result<OracleHandle> + Send + Sync;

/// Lifecycle phase of the managed oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    Empty,
    Loading,
    Ready,
}

struct LoadState {
    phase: LoadPhase,
    /// Loader invocations so far. Waiters use it to tell attempts apart.
    loads: u64,
    last_error: Option<String>,
}

/// Snapshot for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct OracleStatus {
    pub phase: LoadPhase,
    pub loads: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Owns the oracle for the lifetime of the process.
pub struct OracleManager {
    loader: Box<Loader>,
    state: Mutex<LoadState>,
    changed: Condvar,
    published: RwLock<Option<Arc<OracleHandle>>>,
    /// Serializes administrative actions (reload, release).
    admin: Mutex<()>,
}

impl OracleManager {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<OracleHandle> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            state: Mutex::new(LoadState {
                phase: LoadPhase::Empty,
                loads: 0,
                last_error: None,
            }),
            changed: Condvar::new(),
            published: RwLock::new(None),
            admin: Mutex::new(()),
        }
    }

    /// Manager whose loader reads the triples export and embedding table.
    pub fn from_paths(triples: impl Into<PathBuf>, embeddings: impl Into<PathBuf>) -> Self {
        let triples = triples.into();
        let embeddings = embeddings.into();
        Self::new(move || load_oracle(&triples, &embeddings))
    }

    /// The published handle, if any, without loading.
    pub fn current(&self) -> Option<Arc<OracleHandle>> {
        self.published.read().clone()
    }

    /// Get the oracle, loading it on first demand. Blocks while another
    /// caller is loading.
    pub fn get(&self) -> Result<Arc<OracleHandle>> {
        if let Some(handle) = self.current() {
            return Ok(handle);
        }

        let mut state = self.state.lock();
        loop {
            let phase = state.phase;
            match phase {
                LoadPhase::Ready => {
                    if let Some(handle) = self.current() {
                        return Ok(handle);
                    }
                    state.phase = LoadPhase::Empty;
                }
                LoadPhase::Loading => {
                    let attempt = state.loads;
                    debug!("Oracle is being loaded by another caller, waiting");
                    while state.phase == LoadPhase::Loading && state.loads == attempt {
                        self.changed.wait(&mut state);
                    }
                    if state.phase == LoadPhase::Empty {
                        if let Some(reason) = &state.last_error {
                            return Err(Error::OracleLoad(reason.clone()));
                        }
                    }
                }
                LoadPhase::Empty => return self.load_locked(&mut state),
            }
        }
    }

    /// Run the loader with the gate released, then publish or reset.
    fn load_locked(&self, state: &mut MutexGuard<'_, LoadState>) -> Result<Arc<OracleHandle>> {
        state.phase = LoadPhase::Loading;
        state.loads += 1;
        info!("Loading scoring oracle (load #{})", state.loads);

        let started = Instant::now();
        let outcome = MutexGuard::unlocked(state, || self.run_loader());

        let result = match outcome {
            Ok(handle) => {
                let handle = Arc::new(handle);
                *self.published.write() = Some(handle.clone());
                state.phase = LoadPhase::Ready;
                state.last_error = None;
                info!(
                    "Scoring oracle ready: backend={}, entities={}, took {:?}",
                    handle.backend(),
                    handle.vocabulary().num_entities(),
                    started.elapsed()
                );
                Ok(handle)
            }
            Err(reason) => {
                error!("Scoring oracle load failed: {}", reason);
                state.phase = LoadPhase::Empty;
                state.last_error = Some(reason.clone());
                Err(Error::OracleLoad(reason))
            }
        };
        self.changed.notify_all();
        result
    }

    /// Invoke the loader, turning errors and panics into a reason string.
    fn run_loader(&self) -> std::result::Result<OracleHandle, String> {
        match catch_unwind(AssertUnwindSafe(|| (self.loader)())) {
            Ok(Ok(handle)) => Ok(handle),
            Ok(Err(Error::OracleLoad(reason))) => Err(reason),
            Ok(Err(e)) => Err(e.to_string()),
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(format!("loader panicked: {}", msg))
            }
        }
    }

    /// Administrative reload. Builds a fresh handle while readers keep the
    /// current one, then swaps it in. The phase stays `Ready`; a failed
    /// reload keeps the current handle.
    pub fn reload(&self) -> Result<Arc<OracleHandle>> {
        let _admin = self.admin.lock();
        if self.current().is_none() {
            return self.get();
        }

        info!("Reloading scoring oracle");
        self.state.lock().loads += 1;
        match self.run_loader() {
            Ok(handle) => {
                let handle = Arc::new(handle);
                let mut state = self.state.lock();
                *self.published.write() = Some(handle.clone());
                state.phase = LoadPhase::Ready;
                state.last_error = None;
                info!("Scoring oracle reloaded: backend={}", handle.backend());
                Ok(handle)
            }
            Err(reason) => {
                warn!("Oracle reload failed, keeping current handle: {}", reason);
                self.state.lock().last_error = Some(reason.clone());
                Err(Error::OracleLoad(reason))
            }
        }
    }

    /// Drop the published handle at shutdown. Returns whether one was held.
    /// Callers that already cloned the `Arc` keep it alive until they finish.
    pub fn release(&self) -> bool {
        let _admin = self.admin.lock();
        let mut state = self.state.lock();
        if state.phase != LoadPhase::Ready {
            return false;
        }
        let released = self.published.write().take();
        state.phase = LoadPhase::Empty;
        info!("Scoring oracle released");
        released.is_some()
    }

    pub fn phase(&self) -> LoadPhase {
        self.state.lock().phase
    }

    pub fn status(&self) -> OracleStatus {
        let state = self.state.lock();
        let handle = self.current();
        OracleStatus {
            phase: state.phase,
            loads: state.loads,
            last_error: state.last_error.clone(),
            backend: handle.as_ref().map(|h| h.backend()),
            entities: handle.as_ref().map(|h| h.vocabulary().num_entities()),
            relations: handle.as_ref().map(|h| h.vocabulary().num_relations()),
            loaded_at: handle.as_ref().map(|h| h.loaded_at()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observed::ObservedEdgeOracle;
    use crate::vocabulary::Vocabulary;
    use mealgraph_graph::Triple;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Barrier};
    use std::thread;
    use std::time::Duration;

    fn tiny_handle() -> OracleHandle {
        let triples = vec![Triple::new("recipe_1", "hasDietType", "diet_type_Vegan")];
        let vocab = Arc::new(Vocabulary::from_triples(&triples));
        OracleHandle::new(Box::new(ObservedEdgeOracle::new(vocab.clone(), &triples)), vocab)
    }

    #[test]
    fn test_concurrent_first_callers_load_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let manager = Arc::new(OracleManager::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            Ok(tiny_handle())
        }));

        let n = 16;
        let barrier = Arc::new(Barrier::new(n));
        let workers: Vec<_> = (0..n)
            .map(|_| {
                let manager = manager.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    manager.get().unwrap()
                })
            })
            .collect();

        let handles: Vec<Arc<OracleHandle>> =
            workers.into_iter().map(|w| w.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
        assert_eq!(manager.phase(), LoadPhase::Ready);
    }

    #[test]
    fn test_ready_never_reloads_on_reads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let manager = OracleManager::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(tiny_handle())
        });

        let first = manager.get().unwrap();
        for _ in 0..10 {
            assert!(Arc::ptr_eq(&first, &manager.get().unwrap()));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.status().loads, 1);
    }

    #[test]
    fn test_failure_reaches_waiters_and_resets() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (go_tx, go_rx) = mpsc::channel::<()>();
        let go_rx = Mutex::new(go_rx);
        let counter = calls.clone();
        let manager = Arc::new(OracleManager::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                let _ = go_rx.lock().recv();
                Err(Error::OracleLoad("model file missing".into()))
            } else {
                Ok(tiny_handle())
            }
        }));

        let trigger = {
            let manager = manager.clone();
            thread::spawn(move || manager.get().map(|_| ()))
        };
        while manager.phase() != LoadPhase::Loading {
            thread::sleep(Duration::from_millis(1));
        }
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let manager = manager.clone();
                thread::spawn(move || manager.get().map(|_| ()))
            })
            .collect();
        thread::sleep(Duration::from_millis(200));
        go_tx.send(()).unwrap();

        let trigger_result = trigger.join().unwrap();
        assert!(matches!(trigger_result, Err(Error::OracleLoad(ref r)) if r == "model file missing"));
        for w in waiters {
            assert!(matches!(w.join().unwrap(), Err(Error::OracleLoad(_))));
        }
        assert_eq!(manager.phase(), LoadPhase::Empty);
        assert_eq!(
            manager.status().last_error.as_deref(),
            Some("model file missing")
        );

        // Retry succeeds
        assert!(manager.get().is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(manager.phase(), LoadPhase::Ready);
        assert!(manager.status().last_error.is_none());
    }

    #[test]
    fn test_panicking_loader_is_load_failure() {
        let manager = OracleManager::new(|| panic!("corrupt weights"));
        let err = manager.get().err().unwrap();
        match err {
            Error::OracleLoad(reason) => assert!(reason.contains("corrupt weights")),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(manager.phase(), LoadPhase::Empty);
    }

    #[test]
    fn test_reload_swaps_handle() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let manager = OracleManager::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n == 2 {
                Err(Error::OracleLoad("disk full".into()))
            } else {
                Ok(tiny_handle())
            }
        });

        let first = manager.get().unwrap();
        let second = manager.reload().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &manager.get().unwrap()));
        // The old handle stays usable for whoever still holds it
        assert!(first.vocabulary().num_entities() > 0);

        // Failed reload keeps serving the current handle
        assert!(manager.reload().is_err());
        assert!(Arc::ptr_eq(&second, &manager.get().unwrap()));
        assert_eq!(manager.phase(), LoadPhase::Ready);
        assert_eq!(manager.status().loads, 3);
    }

    #[test]
    fn test_reload_from_empty_loads() {
        let manager = OracleManager::new(|| Ok(tiny_handle()));
        assert!(manager.current().is_none());
        manager.reload().unwrap();
        assert_eq!(manager.phase(), LoadPhase::Ready);
    }

    #[test]
    fn test_release_then_reload_on_demand() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let manager = OracleManager::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(tiny_handle())
        });

        assert!(!manager.release());
        manager.get().unwrap();
        assert!(manager.release());
        assert_eq!(manager.phase(), LoadPhase::Empty);
        assert!(manager.current().is_none());

        manager.get().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_status_reports_vocabulary() {
        let manager = OracleManager::new(|| Ok(tiny_handle()));
        let before = manager.status();
        assert_eq!(before.phase, LoadPhase::Empty);
        assert!(before.backend.is_none());

        manager.get().unwrap();
        let after = manager.status();
        assert_eq!(after.phase, LoadPhase::Ready);
        assert_eq!(after.backend, Some("observed-edge"));
        assert_eq!(after.entities, Some(2));
        assert_eq!(after.relations, Some(1));
        assert!(after.loaded_at.is_some());

        let json = serde_json::to_value(&after).unwrap();
        assert_eq!(json["phase"], "ready");
    }
}
