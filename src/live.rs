//! Change notification and live queries.
//!
//! Writes post a [`Table`] change event to the [`ChangeBus`]; [`watch`] spawns
//! a worker that re-runs a read closure whenever a relevant table changes and
//! pushes the full result snapshot into a [`Live`] handle. Consumers receive
//! an initial snapshot immediately after subscribing, then one snapshot per
//! change. Dropping the handle tears the worker down.

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Medications,
    Schedules,
    DoseHistory,
}

// ---------------------------------------------------------------------------
// ChangeBus
// ---------------------------------------------------------------------------

/// Fan-out of table-change events to any number of listeners.
#[derive(Clone, Default)]
pub struct ChangeBus {
    subscribers: Arc<Mutex<Vec<BusEntry>>>,
}

struct BusEntry {
    id: Uuid,
    tx: Sender<Table>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce that rows in `table` changed. Dead listeners are dropped.
    pub fn notify(&self, table: Table) {
        let mut subs = self.subscribers.lock().unwrap();
        subs.retain(|entry| entry.tx.send(table).is_ok());
    }

    /// Subscribe to change events. The listener unsubscribes on drop.
    pub fn listen(&self) -> ChangeListener {
        let (tx, rx) = unbounded();
        let id = Uuid::new_v4();
        self.subscribers.lock().unwrap().push(BusEntry { id, tx });
        ChangeListener {
            id,
            rx,
            bus: self.clone(),
        }
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    fn unsubscribe(&self, id: Uuid) {
        self.subscribers.lock().unwrap().retain(|e| e.id != id);
    }
}

pub struct ChangeListener {
    id: Uuid,
    rx: Receiver<Table>,
    bus: ChangeBus,
}

impl ChangeListener {
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Table> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for ChangeListener {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

// ---------------------------------------------------------------------------
// Live
// ---------------------------------------------------------------------------

/// Consumer end of a live query. Receives full snapshots; the stream ends
/// when the worker stops (bus gone or read failure) or the handle is dropped.
pub struct Live<T> {
    rx: Receiver<T>,
    // Dropping this disconnects the worker's shutdown probe.
    _alive: Sender<()>,
}

impl<T> Live<T> {
    /// Block for the next snapshot. `None` means the stream has ended.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain queued snapshots and return the newest one.
    pub fn latest(&self) -> Option<T> {
        let mut last = None;
        while let Ok(v) = self.rx.try_recv() {
            last = Some(v);
        }
        last
    }

    /// Raw channel access, for callers that need to distinguish a timeout
    /// from the end of the stream.
    pub fn receiver(&self) -> &Receiver<T> {
        &self.rx
    }
}

/// Spawn a live query over `query`, refreshed on changes to `tables`.
///
/// The worker coalesces bursts of change events into a single re-read. On a
/// read failure the error is logged and the stream ends; there is no retry.
pub fn watch<T, F>(bus: &ChangeBus, tables: &[Table], query: F) -> Live<T>
where
    T: Send + 'static,
    F: Fn() -> anyhow::Result<T> + Send + 'static,
{
    let listener = bus.listen();
    let tables = tables.to_vec();
    let (out_tx, out_rx) = unbounded();
    let (alive_tx, alive_rx) = unbounded::<()>();

    thread::spawn(move || {
        match query() {
            Ok(snapshot) => {
                if out_tx.send(snapshot).is_err() {
                    return;
                }
            }
            Err(e) => {
                log::error!("live query failed on initial read: {e:#}");
                return;
            }
        }

        loop {
            crossbeam_channel::select! {
                recv(listener.rx) -> msg => match msg {
                    Ok(table) if tables.contains(&table) => {
                        // coalesce pending events into one re-read
                        while listener.rx.try_recv().is_ok() {}
                        match query() {
                            Ok(snapshot) => {
                                if out_tx.send(snapshot).is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                log::error!("live query failed, ending stream: {e:#}");
                                break;
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(_) => break, // bus dropped
                },
                recv(alive_rx) -> _ => break, // consumer dropped the handle
            }
        }
        log::debug!("live query worker stopped");
    });

    Live {
        rx: out_rx,
        _alive: alive_tx,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
