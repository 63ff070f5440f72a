use contracts::domain::a001_inventory_item::TaggedItem;
use contracts::enums::StockStatus;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::{a001_inventory_item, a006_notification};
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;

/// Статусы, о которых сообщаем Admin и Manager
pub fn is_alertable(status: StockStatus) -> bool {
    matches!(
        status,
        StockStatus::LowStock | StockStatus::OutOfStock | StockStatus::Expired
    )
}

/// Какие записи уже получили оповещение и с каким статусом.
/// Общий для фонового воркера и синхронных оповещений при записи.
#[derive(Default)]
pub struct AlertLedger {
    alerted: Mutex<HashMap<String, StockStatus>>,
}

impl AlertLedger {
    fn key(tagged: &TaggedItem) -> String {
        format!("{}/{}", tagged.item.category.code(), tagged.item.id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StockStatus>> {
        self.alerted.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Отметить успешно отправленное оповещение
    pub fn record(&self, tagged: &TaggedItem) {
        if is_alertable(tagged.status) {
            self.lock().insert(Self::key(tagged), tagged.status);
        }
    }

    /// Записи, по которым нужно оповещение. Сам скан ничего не отмечает:
    /// запись попадает в набор через `record` после успешной отправки,
    /// так что неудачная отправка повторится на следующем скане.
    ///
    /// Запись выпадает из набора, когда ее статус меняется или она
    /// исчезает, поэтому повторный вход в тот же статус снова оповещает.
    pub fn scan(&self, items: &[TaggedItem]) -> Vec<TaggedItem> {
        let mut alerted = self.lock();
        let current: HashMap<String, StockStatus> = items
            .iter()
            .filter(|t| is_alertable(t.status))
            .map(|t| (Self::key(t), t.status))
            .collect();
        alerted.retain(|key, status| current.get(key) == Some(status));

        items
            .iter()
            .filter(|t| is_alertable(t.status))
            .filter(|t| alerted.get(&Self::key(t)) != Some(&t.status))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Фоновый воркер складских оповещений
pub struct StockAlertWorker {
    state: AppState,
    interval_seconds: u64,
}

impl StockAlertWorker {
    pub fn new(state: AppState, interval_seconds: u64) -> Self {
        Self {
            state,
            interval_seconds: interval_seconds.max(1),
        }
    }

    pub async fn run_loop(&self) {
        info!("Stock alert worker started with interval {} seconds", self.interval_seconds);
        let mut interval = time::interval(time::Duration::from_secs(self.interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            match self.process_once().await {
                Ok(0) => debug!("Stock alert scan: nothing new"),
                Ok(sent) => info!("Stock alert scan: {} new alert(s)", sent),
                Err(AppError::Loading(e)) => debug!("Stock alert scan skipped: {}", e),
                Err(e) => warn!("Stock alert scan failed: {}", e),
            }
        }
    }

    /// Один проход: возвращает число записей, по которым оповещения
    /// действительно ушли
    pub async fn process_once(&self) -> Result<usize, AppError> {
        let items = self.state.tagged_items(self.state.today()).await?;
        let fresh = self.state.alerts.scan(&items);
        let mut sent = 0;
        for tagged in &fresh {
            let Some((kind, title, message)) = a001_inventory_item::service::stock_alert(tagged)
            else {
                continue;
            };
            match a006_notification::service::notify_roles(
                self.state.store.as_ref(),
                &a001_inventory_item::service::ALERT_ROLES,
                kind,
                &title,
                &message,
            )
            .await
            {
                Ok(_) => {
                    self.state.alerts.record(tagged);
                    sent += 1;
                }
                Err(e) => warn!(
                    "Stock alert for '{}' was not sent, will retry: {}",
                    tagged.item.name, e
                ),
            }
        }
        Ok(sent)
    }
}
