use crate::model::{Account, Pass, RawOffer, ScraperError};
use std::time::Duration;

/// Browser-like session against the card portal. One card and one tab are
/// active at a time; the traversal drives it strictly sequentially.
#[async_trait::async_trait]
pub trait PortalSession: Send {
    async fn login(&mut self) -> Result<(), ScraperError>;
    /// Accounts in switcher order, canceled ones included.
    async fn list_accounts(&mut self) -> Result<Vec<Account>, ScraperError>;
    async fn open_card_stack(&mut self) -> Result<(), ScraperError>;
    async fn select_card(&mut self, index: usize) -> Result<(), ScraperError>;
    /// Fails with `ScraperError::Timeout` if the offer list is not ready in time.
    async fn wait_offers_loaded(&mut self, timeout: Duration) -> Result<(), ScraperError>;
    async fn switch_pass(&mut self, pass: Pass) -> Result<(), ScraperError>;
    async fn scan_offers(&mut self, pass: Pass) -> Result<Vec<RawOffer>, ScraperError>;
}
