use chrono::{NaiveDate, Utc};
use contracts::domain::a001_inventory_item::{LowStockThresholds, TaggedItem};
use std::sync::Arc;
use std::time::Duration;

use crate::shared::config::Config;
use crate::shared::data::DocumentStore;
use crate::shared::error::AppError;
use crate::shared::feed::InventoryFeed;
use crate::shared::llm::{DisabledProvider, LlmProvider, OpenAiProvider};
use crate::shared::mail::MailChain;
use crate::system::tasks::stock_alert_worker::AlertLedger;

/// Everything a handler needs, shared behind `Arc`s
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    pub feed: Arc<InventoryFeed>,
    pub thresholds: Arc<LowStockThresholds>,
    pub llm: Arc<dyn LlmProvider>,
    pub mail: Arc<MailChain>,
    pub alerts: Arc<AlertLedger>,
}

impl AppState {
    /// Build state from config. Starts the inventory feed, so it must run
    /// inside a tokio runtime.
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let llm: Arc<dyn LlmProvider> = match OpenAiProvider::from_config(&config.llm) {
            Some(provider) => Arc::new(provider),
            None => {
                tracing::warn!("No LLM API key configured, recommendations are disabled");
                Arc::new(DisabledProvider)
            }
        };
        let mail = Arc::new(MailChain::from_config(&config.mail));
        let thresholds = Arc::new(config.inventory.low_stock_thresholds());
        let feed = Arc::new(InventoryFeed::start(store.clone()));
        Self {
            config: Arc::new(config),
            store,
            feed,
            thresholds,
            llm,
            mail,
            alerts: Arc::new(AlertLedger::default()),
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.llm = llm;
        self
    }

    pub fn with_mail(mut self, mail: MailChain) -> Self {
        self.mail = Arc::new(mail);
        self
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    pub fn ready_timeout(&self) -> Duration {
        self.config.inventory.ready_timeout()
    }

    /// Wait for the loading gate and tag every item with its status
    pub async fn tagged_items(&self, today: NaiveDate) -> Result<Vec<TaggedItem>, AppError> {
        let state = self.feed.wait_ready(self.ready_timeout()).await?;
        Ok(TaggedItem::tag_all(
            state.items.iter().cloned(),
            today,
            &self.thresholds,
        ))
    }
}
