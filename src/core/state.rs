use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::core::repository::MedicationRepository;
use crate::db::Database;
use crate::models::medication::Medication;
use crate::models::schedule::Schedule;

const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(5);

/// Derived counts the state holder exposes as shared live values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    ActiveMedications,
    TotalTaken,
    TotalMissed,
}

type StatRegistry = Arc<Mutex<HashMap<Stat, Arc<SharedStat>>>>;

/// Owns the repository and bridges it to consumers: compound writes, shared
/// keep-alive count subscriptions, and transient UI state (the pending
/// captured-image path).
///
/// A stat's underlying live query is created on first attach and shared by
/// every subsequent watcher. When the last watcher detaches the query is kept
/// warm for a grace period, then torn down; the next attach rebuilds it.
pub struct AppState {
    repo: MedicationRepository,
    keep_alive: Duration,
    stats: StatRegistry,
    captured_image_path: Mutex<Option<String>>,
}

struct SharedStat {
    stat: Stat,
    value: Mutex<Option<i64>>,
    subscribers: Mutex<Vec<crossbeam_channel::Sender<i64>>>,
    watchers: AtomicUsize,
    idle_since: Mutex<Option<Instant>>,
    stopped: AtomicBool,
}

impl SharedStat {
    fn new(stat: Stat) -> Self {
        Self {
            stat,
            value: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
            watchers: AtomicUsize::new(0),
            idle_since: Mutex::new(Some(Instant::now())),
            stopped: AtomicBool::new(false),
        }
    }
}

/// Handle onto a shared stat. Receives the current value on attach (once the
/// query has produced one) and every subsequent emission. Detaches on drop.
pub struct StatWatch {
    rx: Receiver<i64>,
    shared: Arc<SharedStat>,
}

impl StatWatch {
    /// Block for the next emission. `None` means the stream has ended.
    pub fn recv(&self) -> Option<i64> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<i64> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain queued emissions and return the newest one.
    pub fn latest(&self) -> Option<i64> {
        let mut last = None;
        while let Ok(v) = self.rx.try_recv() {
            last = Some(v);
        }
        last
    }

    /// Last value the underlying query produced, if any yet.
    pub fn current(&self) -> Option<i64> {
        *self.shared.value.lock().unwrap()
    }
}

impl Drop for StatWatch {
    fn drop(&mut self) {
        if self.shared.watchers.fetch_sub(1, Ordering::SeqCst) == 1 {
            *self.shared.idle_since.lock().unwrap() = Some(Instant::now());
        }
    }
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self::with_keep_alive(db, DEFAULT_KEEP_ALIVE)
    }

    /// Like [`AppState::new`] with an explicit grace period for shared stat
    /// teardown.
    pub fn with_keep_alive(db: Database, keep_alive: Duration) -> Self {
        Self {
            repo: MedicationRepository::new(db),
            keep_alive,
            stats: Arc::new(Mutex::new(HashMap::new())),
            captured_image_path: Mutex::new(None),
        }
    }

    pub fn repository(&self) -> &MedicationRepository {
        &self.repo
    }

    /// Insert a medication together with its schedules. The store assigns the
    /// medication id and every schedule is persisted under it; the whole
    /// operation is one transaction.
    pub fn add_medication_with_schedules(
        &self,
        med: &Medication,
        schedules: &[Schedule],
    ) -> Result<i64> {
        self.repo.insert_medication_with_schedules(med, schedules)
    }

    // -- shared stats --------------------------------------------------------

    pub fn active_medication_count(&self) -> StatWatch {
        self.stat_watch(Stat::ActiveMedications)
    }

    pub fn total_taken_count(&self) -> StatWatch {
        self.stat_watch(Stat::TotalTaken)
    }

    pub fn total_missed_count(&self) -> StatWatch {
        self.stat_watch(Stat::TotalMissed)
    }

    pub fn stat_watch(&self, stat: Stat) -> StatWatch {
        let mut map = self.stats.lock().unwrap();
        let existing = map
            .get(&stat)
            .filter(|s| !s.stopped.load(Ordering::SeqCst))
            .cloned();
        let shared = match existing {
            Some(s) => s,
            None => {
                let shared = Arc::new(SharedStat::new(stat));
                map.insert(stat, shared.clone());
                spawn_stat_worker(
                    self.repo.clone(),
                    shared.clone(),
                    self.stats.clone(),
                    self.keep_alive,
                );
                shared
            }
        };
        drop(map);

        shared.watchers.fetch_add(1, Ordering::SeqCst);
        *shared.idle_since.lock().unwrap() = None;

        let (tx, rx) = unbounded();
        {
            let mut subs = shared.subscribers.lock().unwrap();
            if let Some(v) = *shared.value.lock().unwrap() {
                let _ = tx.send(v);
            }
            subs.push(tx);
        }
        StatWatch { rx, shared }
    }

    // -- transient UI state --------------------------------------------------

    /// Record the path of a freshly captured prescription image. Overwrites
    /// any previous value; no history is kept.
    pub fn set_captured_image_path(&self, path: Option<String>) {
        *self.captured_image_path.lock().unwrap() = path;
    }

    pub fn captured_image_path(&self) -> Option<String> {
        self.captured_image_path.lock().unwrap().clone()
    }

    /// Consume the pending captured-image path.
    pub fn take_captured_image_path(&self) -> Option<String> {
        self.captured_image_path.lock().unwrap().take()
    }
}

fn spawn_stat_worker(
    repo: MedicationRepository,
    shared: Arc<SharedStat>,
    registry: StatRegistry,
    keep_alive: Duration,
) {
    // Tick often enough to observe short grace periods in tests.
    let tick = (keep_alive / 4).clamp(Duration::from_millis(10), Duration::from_millis(250));

    thread::spawn(move || {
        let live = match shared.stat {
            Stat::ActiveMedications => repo.active_medication_count_live(),
            Stat::TotalTaken => repo.total_taken_count_live(),
            Stat::TotalMissed => repo.total_missed_count_live(),
        };

        loop {
            match live.receiver().recv_timeout(tick) {
                Ok(v) => {
                    let mut subs = shared.subscribers.lock().unwrap();
                    *shared.value.lock().unwrap() = Some(v);
                    subs.retain(|tx| tx.send(v).is_ok());
                }
                Err(RecvTimeoutError::Timeout) => {
                    if shared.watchers.load(Ordering::SeqCst) == 0 {
                        let idle = *shared.idle_since.lock().unwrap();
                        if let Some(since) = idle
                            && since.elapsed() >= keep_alive
                        {
                            break;
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        shared.stopped.store(true, Ordering::SeqCst);
        let mut map = registry.lock().unwrap();
        let ours = map
            .get(&shared.stat)
            .is_some_and(|entry| Arc::ptr_eq(entry, &shared));
        if ours {
            map.remove(&shared.stat);
        }
        drop(map);
        // Disconnect any remaining watchers so they observe the end of stream.
        shared.subscribers.lock().unwrap().clear();
        log::debug!("stat worker stopped: {:?}", shared.stat);
    });
}
