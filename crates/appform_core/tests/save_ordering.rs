use appform_core::{AppData, AppId, AppService, AppStore, SaveLedger, TransportError};
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;

/// Serves one record instantly and saves with a scripted delay per call.
struct ScriptedService {
    record: AppData,
    save_delays: RefCell<VecDeque<Duration>>,
    last_written: RefCell<Option<AppData>>,
}

impl ScriptedService {
    fn new(record: AppData, save_delays_ms: &[u64]) -> Self {
        Self {
            record,
            save_delays: RefCell::new(
                save_delays_ms
                    .iter()
                    .map(|ms| Duration::from_millis(*ms))
                    .collect(),
            ),
            last_written: RefCell::new(None),
        }
    }
}

#[async_trait(?Send)]
impl AppService for ScriptedService {
    async fn fetch_by_id(&self, _id: AppId) -> Result<Option<AppData>, TransportError> {
        Ok(Some(self.record.clone()))
    }

    async fn save(&self, app: AppData) -> Result<bool, TransportError> {
        let delay = self.save_delays.borrow_mut().pop_front().unwrap_or_default();
        tokio::time::sleep(delay).await;
        *self.last_written.borrow_mut() = Some(app);
        Ok(true)
    }
}

#[tokio::test(start_paused = true)]
async fn overlapping_saves_are_not_serialized() {
    LocalSet::new()
        .run_until(async {
            let service = Rc::new(ScriptedService::new(
                AppData::new(0, "App 1", "this is app 1", false),
                &[10, 300, 100],
            ));
            let ledger = SaveLedger::new();
            let store = AppStore::new(service.clone(), 0, ledger.clone());
            store.wait_loaded().await.unwrap();
            store.flush_saves().await;

            store.record().set_title("first");
            store.record().set_title("second");
            store.flush_saves().await;

            let settled: Vec<u64> = ledger.reports().iter().map(|report| report.seq).collect();
            assert_eq!(settled, vec![1, 3, 2]);
            assert_eq!(ledger.out_of_order_acks(), 1);

            // The slower, older write lands last and wins at the remote side.
            let written = service.last_written.borrow().clone().unwrap();
            assert_eq!(written.title, "first");
            assert_eq!(store.record().title(), "second");
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn record_with_unexpected_id_is_still_applied() {
    LocalSet::new()
        .run_until(async {
            let served = AppData::new(9, "Other", "served for a different id", true);
            let service = Rc::new(ScriptedService::new(served.clone(), &[]));
            let store = AppStore::with_defaults(service.clone(), 0);

            store.wait_loaded().await.unwrap();

            assert_eq!(store.snapshot(), served);
            assert_eq!(store.requested_id(), 0);
        })
        .await;
}
