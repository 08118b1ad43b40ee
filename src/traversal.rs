// Card traversal: drives the session card by card and feeds the registry.
use crate::model::{
    Account, EnrollmentStatus, Offer, OfferKey, Pass, RawOffer, ScraperError, TraversalError,
};
use crate::normalizer::normalize_expiration;
use crate::scraper::PortalSession;
use crate::storage::OfferRegistry;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{info, warn};

/// Offers whose text and merchant both lack this marker are ads, not
/// spend-threshold offers.
pub const QUALIFYING_MARKER: &str = "Spend";

#[derive(Debug, Clone)]
pub struct TraversalOptions {
    pub today: NaiveDate,
    pub wait_timeout: Duration,
    pub notification_threshold: usize,
}

/// Outcome of a full run, ready for export.
#[derive(Debug)]
pub struct TraversalReport {
    /// Names of every account, canceled ones included, in column order.
    pub card_names: Vec<String>,
    pub offers: Vec<Offer>,
    pub canceled_cards: Vec<usize>,
    pub failed_cards: Vec<usize>,
}

/// Per-card scan steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardState {
    SelectCard,
    WaitOffersLoaded,
    ScanAvailablePass,
    SwitchToEnrolledTab,
    ScanEnrolledPass,
    SwitchToAvailableTab,
    Done,
}

pub struct Traversal<S: PortalSession> {
    session: S,
    options: TraversalOptions,
}

impl<S: PortalSession> Traversal<S> {
    pub fn new(session: S, options: TraversalOptions) -> Self {
        Self { session, options }
    }

    pub fn into_session(self) -> S {
        self.session
    }

    /// Logs in, scans every non-canceled card and returns the finalized offers.
    ///
    /// Card failures are logged and skipped; only login, the account list,
    /// or a change in the number of accounts abort the run.
    pub async fn run(&mut self) -> Result<TraversalReport, TraversalError> {
        self.session.login().await.map_err(TraversalError::Login)?;
        self.session
            .open_card_stack()
            .await
            .map_err(TraversalError::Accounts)?;

        let accounts = self
            .session
            .list_accounts()
            .await
            .map_err(TraversalError::Accounts)?;
        let card_count = accounts.len();
        info!("Found {} cards", card_count);

        let mut registry = OfferRegistry::new(card_count);
        let mut canceled_cards = Vec::new();
        let mut failed_cards = Vec::new();

        for account in &accounts {
            if account.is_canceled() {
                info!("Skipping canceled card: {}", account.name);
                canceled_cards.push(account.index);
                continue;
            }

            // The account list is refreshed before each card; its width must not move.
            let current = self
                .session
                .list_accounts()
                .await
                .map_err(TraversalError::Accounts)?;
            if current.len() != card_count {
                return Err(TraversalError::AccountCountChanged {
                    expected: card_count,
                    found: current.len(),
                });
            }

            info!("Processing offers for card: {}", account.name);
            match self.process_card(account, &mut registry).await {
                CardState::Done => info!("Finished processing offers for card: {}", account.name),
                aborted => {
                    warn!("Card {} aborted at {:?}", account.name, aborted);
                    failed_cards.push(account.index);
                }
            }

            if let Err(e) = self.session.open_card_stack().await {
                warn!("Could not reopen the card stack: {}", e);
            }
        }

        if registry.is_empty() {
            warn!("No qualifying offers found on any card");
        }
        info!("Finished processing all offers");
        Ok(TraversalReport {
            card_names: accounts.into_iter().map(|a| a.name).collect(),
            offers: registry.finalize(),
            canceled_cards,
            failed_cards,
        })
    }

    /// Runs the card's state machine; returns `Done` or the state that failed.
    async fn process_card(&mut self, account: &Account, registry: &mut OfferRegistry) -> CardState {
        let mut state = CardState::SelectCard;

        while state != CardState::Done {
            let step = match state {
                CardState::SelectCard => self
                    .session
                    .select_card(account.index)
                    .await
                    .map(|_| CardState::WaitOffersLoaded),
                CardState::WaitOffersLoaded => self
                    .session
                    .wait_offers_loaded(self.options.wait_timeout)
                    .await
                    .map(|_| CardState::ScanAvailablePass),
                CardState::ScanAvailablePass => self
                    .scan_pass(account.index, Pass::Available, registry)
                    .await
                    .map(|_| CardState::SwitchToEnrolledTab),
                CardState::SwitchToEnrolledTab => self
                    .session
                    .switch_pass(Pass::Enrolled)
                    .await
                    .map(|_| CardState::ScanEnrolledPass),
                CardState::ScanEnrolledPass => self
                    .scan_pass(account.index, Pass::Enrolled, registry)
                    .await
                    .map(|_| CardState::SwitchToAvailableTab),
                CardState::SwitchToAvailableTab => self
                    .session
                    .switch_pass(Pass::Available)
                    .await
                    .map(|_| CardState::Done),
                CardState::Done => Ok(CardState::Done),
            };

            match step {
                Ok(next) => state = next,
                Err(e) => {
                    warn!("Error on card {} during {:?}: {}", account.name, state, e);
                    return state;
                }
            }
        }

        state
    }

    async fn scan_pass(
        &mut self,
        card_index: usize,
        pass: Pass,
        registry: &mut OfferRegistry,
    ) -> Result<(), ScraperError> {
        let raw_offers = self.session.scan_offers(pass).await?;
        let accepted = record_offers(
            registry,
            raw_offers,
            card_index,
            pass.status(),
            self.options.today,
            self.options.notification_threshold,
        );
        info!("Recorded {} {} offers", accepted, pass);
        Ok(())
    }
}

/// Filters, normalizes and upserts one pass worth of raw offers.
/// Returns how many were accepted.
pub fn record_offers(
    registry: &mut OfferRegistry,
    raw_offers: Vec<RawOffer>,
    card_index: usize,
    status: EnrollmentStatus,
    today: NaiveDate,
    notification_threshold: usize,
) -> usize {
    let mut accepted = 0;
    for raw in raw_offers {
        if !raw.text.contains(QUALIFYING_MARKER) && !raw.merchant.contains(QUALIFYING_MARKER) {
            continue;
        }

        let expiration = normalize_expiration(raw.expiration.as_deref().unwrap_or(""), today);
        registry.upsert(OfferKey::new(raw.text, raw.merchant, expiration), card_index, status);

        accepted += 1;
        if notification_threshold > 0 && accepted % notification_threshold == 0 {
            info!("Processed {} {:?} offers", accepted, status);
        }
    }
    accepted
}
