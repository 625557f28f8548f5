//! Auto-persist reaction.
//!
//! # Responsibility
//! - Watch an `AppRecord` snapshot and save every distinct value.
//! - Report save outcomes to an observer without blocking edits.
//!
//! # Invariants
//! - One save per distinct snapshot; setting a field to its current value
//!   never issues a save.
//! - The snapshot present when attaching is the baseline and is not saved.
//! - Saves are fire-and-forget. They are neither coalesced nor serialized,
//!   so the remote side keeps whichever write lands last; sequence numbers
//!   expose the issue order to observers.

use crate::model::app::{AppData, AppId};
use crate::model::record::AppRecord;
use crate::reactive::{Reaction, ReactionOptions};
use crate::service::app_service::{AppService, TransportError};
use log::{debug, error, warn};
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use tokio::sync::{mpsc, watch};

/// Why one save did not persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// Service resolved with a negative acknowledgement.
    Rejected,
    Transport(TransportError),
    /// The save worker was gone, so the save was never sent.
    Abandoned,
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected => write!(f, "save was not acknowledged"),
            Self::Transport(err) => write!(f, "{err}"),
            Self::Abandoned => write!(f, "save worker stopped before sending"),
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected | Self::Abandoned => None,
            Self::Transport(err) => Some(err),
        }
    }
}

impl From<TransportError> for SaveError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

/// Outcome of one issued save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Issue order, starting at 1.
    pub seq: u64,
    pub id: AppId,
    pub outcome: Result<(), SaveError>,
}

/// Observability hook for the save pipeline.
pub trait SaveObserver {
    /// Called synchronously when a snapshot change issues a save.
    fn on_save_issued(&self, _seq: u64, _app: &AppData) {}

    /// Called when a save resolves, in arrival order.
    fn on_save_settled(&self, _report: &SaveReport) {}
}

/// Observer that writes save activity to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSaveObserver;

impl SaveObserver for LogSaveObserver {
    fn on_save_issued(&self, seq: u64, app: &AppData) {
        debug!("event=save_issued module=persist status=ok seq={} id={}", seq, app.id);
    }

    fn on_save_settled(&self, report: &SaveReport) {
        let (seq, id) = (report.seq, report.id);
        match &report.outcome {
            Ok(()) => debug!("event=save_settled module=persist status=ok seq={seq} id={id}"),
            Err(SaveError::Rejected) => {
                warn!("event=save_settled module=persist status=rejected seq={seq} id={id}")
            }
            Err(SaveError::Abandoned) => {
                warn!("event=save_settled module=persist status=abandoned seq={seq} id={id}")
            }
            Err(SaveError::Transport(err)) => error!(
                "event=save_settled module=persist status=error seq={seq} id={id} error={err}"
            ),
        }
    }
}

/// Observer that records every issued snapshot and settled report.
#[derive(Debug, Default)]
pub struct SaveLedger {
    issued: RefCell<Vec<(u64, AppData)>>,
    reports: RefCell<Vec<SaveReport>>,
}

impl SaveLedger {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Issued snapshots in issue order.
    pub fn issued(&self) -> Vec<AppData> {
        self.issued
            .borrow()
            .iter()
            .map(|(_, app)| app.clone())
            .collect()
    }

    /// Settled reports in arrival order.
    pub fn reports(&self) -> Vec<SaveReport> {
        self.reports.borrow().clone()
    }

    pub fn failures(&self) -> Vec<SaveReport> {
        self.reports
            .borrow()
            .iter()
            .filter(|report| report.outcome.is_err())
            .cloned()
            .collect()
    }

    /// Number of acknowledgements that arrived after a later-issued one.
    pub fn out_of_order_acks(&self) -> usize {
        let mut highest = 0;
        let mut late = 0;
        for report in self.reports.borrow().iter() {
            if report.seq < highest {
                late += 1;
            }
            highest = highest.max(report.seq);
        }
        late
    }
}

impl SaveObserver for SaveLedger {
    fn on_save_issued(&self, seq: u64, app: &AppData) {
        self.issued.borrow_mut().push((seq, app.clone()));
    }

    fn on_save_settled(&self, report: &SaveReport) {
        self.reports.borrow_mut().push(report.clone());
    }
}

/// Reaction that saves each distinct snapshot of a record.
///
/// Dropping it stops new saves; saves already queued or in flight still
/// settle.
pub struct AutoSave {
    _reaction: Reaction<AppData>,
    issued: Rc<Cell<u64>>,
    in_flight: Rc<watch::Sender<usize>>,
}

impl AutoSave {
    /// Attaches the reaction to every field of `record`.
    ///
    /// The reaction only queues snapshots, so edits may happen anywhere on
    /// the owning thread. Saves are sent by a worker spawned here with
    /// `tokio::task::spawn_local`, so `attach` itself must run inside a
    /// tokio `LocalSet`, and saves progress while that `LocalSet` runs.
    pub fn attach(
        record: Rc<AppRecord>,
        service: Rc<dyn AppService>,
        observer: Rc<dyn SaveObserver>,
    ) -> Self {
        let issued = Rc::new(Cell::new(0_u64));
        let in_flight = Rc::new(watch::Sender::new(0_usize));
        let (queue_tx, queue_rx) = mpsc::unbounded_channel::<(u64, AppData)>();

        tokio::task::spawn_local(run_save_worker(
            queue_rx,
            service,
            Rc::clone(&observer),
            Rc::clone(&in_flight),
        ));

        let source = Rc::clone(&record);
        let counter = Rc::clone(&issued);
        let pending = Rc::clone(&in_flight);
        let reaction = Reaction::new(
            move || source.snapshot(),
            move |snapshot: AppData| {
                let seq = counter.get() + 1;
                counter.set(seq);
                observer.on_save_issued(seq, &snapshot);
                pending.send_modify(|count| *count += 1);
                if let Err(mpsc::error::SendError((seq, snapshot))) =
                    queue_tx.send((seq, snapshot))
                {
                    error!(
                        "event=save_queue module=persist status=closed seq={} id={}",
                        seq, snapshot.id
                    );
                    observer.on_save_settled(&SaveReport {
                        seq,
                        id: snapshot.id,
                        outcome: Err(SaveError::Abandoned),
                    });
                    pending.send_modify(|count| *count -= 1);
                }
            },
            ReactionOptions::default(),
        );

        let trigger = reaction.trigger();
        reaction.bind(record.watch_all(move |_| trigger()));

        Self {
            _reaction: reaction,
            issued,
            in_flight,
        }
    }

    /// Number of saves issued so far.
    pub fn issued_count(&self) -> u64 {
        self.issued.get()
    }

    /// Number of saves that have not settled yet.
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Waits until every issued save has settled.
    pub async fn flush(&self) {
        let mut receiver = self.in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = receiver.wait_for(|count| *count == 0).await;
    }
}

// Ends once the reaction, and with it the queue sender, is dropped.
async fn run_save_worker(
    mut queue: mpsc::UnboundedReceiver<(u64, AppData)>,
    service: Rc<dyn AppService>,
    observer: Rc<dyn SaveObserver>,
    in_flight: Rc<watch::Sender<usize>>,
) {
    while let Some((seq, snapshot)) = queue.recv().await {
        let service = Rc::clone(&service);
        let observer = Rc::clone(&observer);
        let in_flight = Rc::clone(&in_flight);
        tokio::task::spawn_local(async move {
            let id = snapshot.id;
            let outcome = match service.save(snapshot).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(SaveError::Rejected),
                Err(err) => Err(SaveError::from(err)),
            };
            observer.on_save_settled(&SaveReport { seq, id, outcome });
            in_flight.send_modify(|count| *count -= 1);
        });
    }
}
