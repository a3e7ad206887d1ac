use std::{
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender, TryRecvError},
    },
    thread,
};

use log::{debug, error};

use crate::{
    LapDashError,
    provider::SessionProvider,
    session::{DriverId, Session, SessionKey},
};

/// What a fetched session is going to be rendered into
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchPurpose {
    Drivers,
    LapTable(DriverId),
    LapChart(DriverId),
}

impl FetchPurpose {
    fn slot(&self) -> FetchSlot {
        match self {
            FetchPurpose::Drivers => FetchSlot::Drivers,
            FetchPurpose::LapTable(_) => FetchSlot::Table,
            FetchPurpose::LapChart(_) => FetchSlot::Chart,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum FetchSlot {
    Drivers,
    Table,
    Chart,
}

pub struct FetchOutcome {
    pub ticket: u64,
    pub key: SessionKey,
    pub purpose: FetchPurpose,
    pub result: Result<Arc<Session>, LapDashError>,
}

/// Loads sessions on worker threads so the UI thread never blocks on the provider.
///
/// Every request gets a ticket. Only the outcome of the latest request of each view
/// (drivers, table, chart) is handed back by `poll`, older ones are dropped.
pub struct SessionFetcher {
    outcome_tx: Sender<FetchOutcome>,
    outcome_rx: Receiver<FetchOutcome>,
    next_ticket: u64,
    latest: HashMap<FetchSlot, u64>,
}

impl Default for SessionFetcher {
    fn default() -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            outcome_tx,
            outcome_rx,
            next_ticket: 0,
            latest: HashMap::new(),
        }
    }
}

impl SessionFetcher {
    pub fn request(
        &mut self,
        provider: Arc<dyn SessionProvider>,
        key: SessionKey,
        purpose: FetchPurpose,
    ) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.latest.insert(purpose.slot(), ticket);

        let outcome_tx = self.outcome_tx.clone();
        debug!("Fetch {} for {:?} of {}", ticket, purpose, key);
        thread::spawn(move || {
            // a panicking provider still completes its slot
            let result = panic::catch_unwind(AssertUnwindSafe(|| provider.load_session(&key)))
                .unwrap_or_else(|_| {
                    Err(LapDashError::FetchWorkerPanicked {
                        key: key.to_string(),
                    })
                })
                .map(Arc::new);
            if outcome_tx
                .send(FetchOutcome {
                    ticket,
                    key,
                    purpose,
                    result,
                })
                .is_err()
            {
                error!("Fetcher dropped before fetch {} completed", ticket);
            }
        });
        ticket
    }

    /// Forget every pending request. Their outcomes are dropped when they arrive.
    pub fn retire_all(&mut self) {
        if !self.latest.is_empty() {
            debug!("Retiring {} pending fetches", self.latest.len());
        }
        self.latest.clear();
    }

    /// Whether any view still waits for its latest fetch
    pub fn is_loading(&self) -> bool {
        !self.latest.is_empty()
    }

    /// Returns completed fetches that are still the latest for their view, in completion order
    pub fn poll(&mut self) -> Vec<FetchOutcome> {
        let mut ready = Vec::new();
        loop {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => {
                    let slot = outcome.purpose.slot();
                    if self.latest.get(&slot) == Some(&outcome.ticket) {
                        self.latest.remove(&slot);
                        ready.push(outcome);
                    } else {
                        debug!("Dropping stale fetch {} for {:?}", outcome.ticket, outcome.purpose);
                    }
                }
                Err(TryRecvError::Empty) => break,
                // unreachable while self holds a sender
                Err(TryRecvError::Disconnected) => break,
            }
        }
        ready
    }

    /// Blocks until the latest request of every view has completed
    pub fn wait_all(&mut self) -> Result<Vec<FetchOutcome>, LapDashError> {
        let mut ready = self.poll();
        while self.is_loading() {
            let outcome = self
                .outcome_rx
                .recv()
                .map_err(|_| LapDashError::FetchWorkerDisconnected)?;
            let slot = outcome.purpose.slot();
            if self.latest.get(&slot) == Some(&outcome.ticket) {
                self.latest.remove(&slot);
                ready.push(outcome);
            } else {
                debug!("Dropping stale fetch {} for {:?}", outcome.ticket, outcome.purpose);
            }
        }
        Ok(ready)
    }
}
