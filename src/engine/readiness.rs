use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info};

use crate::engine::strategy::ScoringStrategy;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Polls the oracle until it reports ready, then fires `on_ready` and stops.
///
/// The poll runs on its own thread, once right away and then every
/// `interval`. Failed polls are left for the next tick. The loop ends exactly
/// once: on readiness, on [`cancel`](Self::cancel), or when the gate is
/// dropped.
pub struct ReadinessGate {
    cancel_tx: Option<Sender<()>>,
    confirmed: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ReadinessGate {
    pub fn start<F>(strategy: Arc<dyn ScoringStrategy>, interval: Duration, on_ready: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let confirmed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&confirmed);

        let worker = thread::spawn(move || loop {
            match strategy.poll_ready() {
                Ok(true) => {
                    flag.store(true, Ordering::SeqCst);
                    info!("oracle reports ready");
                    on_ready();
                    return;
                }
                Ok(false) => debug!("oracle still warming up"),
                Err(err) => debug!("status poll failed, retrying: {err:#}"),
            }

            match cancel_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug!("readiness polling cancelled");
                    return;
                }
            }
        });

        Self {
            cancel_tx: Some(cancel_tx),
            confirmed,
            worker: Some(worker),
        }
    }

    /// Stops polling. Returns `false` if it was already cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.cancel_tx.take() {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for ReadinessGate {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    use anyhow::{bail, Result};

    use super::*;
    use crate::engine::strategy::{StrategyKind, Verdict};

    /// Ready after `ready_after` polls; never ready when `None`.
    struct WarmingOracle {
        polls: AtomicUsize,
        ready_after: Option<usize>,
    }

    impl ScoringStrategy for WarmingOracle {
        fn kind(&self) -> StrategyKind {
            StrategyKind::RemoteOracle
        }

        fn classify(&self, _question: &str) -> Result<Verdict> {
            bail!("not used")
        }

        fn poll_ready(&self) -> Result<bool> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.ready_after {
                Some(after) if n >= after => Ok(true),
                Some(_) if n == 1 => bail!("503 Service Unavailable"),
                _ => Ok(false),
            }
        }
    }

    fn wait_until(mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn fires_once_ready_after_retrying_failures() {
        let oracle = Arc::new(WarmingOracle {
            polls: AtomicUsize::new(0),
            ready_after: Some(3),
        });
        let (tx, rx) = mpsc::channel();
        let gate = ReadinessGate::start(oracle.clone(), Duration::from_millis(5), move || {
            let _ = tx.send(());
        });

        assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
        assert!(gate.is_confirmed());
        assert!(wait_until(|| gate.is_finished()));
        assert_eq!(oracle.polls.load(Ordering::SeqCst), 3);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn cancel_stops_polling_exactly_once() {
        let oracle = Arc::new(WarmingOracle {
            polls: AtomicUsize::new(0),
            ready_after: None,
        });
        let mut gate = ReadinessGate::start(oracle.clone(), Duration::from_millis(5), || {});
        assert!(wait_until(|| oracle.polls.load(Ordering::SeqCst) >= 2));

        assert!(gate.cancel());
        assert!(!gate.cancel());
        assert!(wait_until(|| gate.is_finished()));

        let polls = oracle.polls.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(oracle.polls.load(Ordering::SeqCst), polls);
        assert!(!gate.is_confirmed());
    }
}
