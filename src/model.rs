// Core structs: Offer, EnrollmentMatrix, Account, RawOffer
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Enrollment state of one card for one offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnrollmentStatus {
    #[default]
    NotApplicable,
    Available,
    Enrolled,
}

/// One of the two offer tabs scanned per card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Available,
    Enrolled,
}

impl Pass {
    pub fn status(self) -> EnrollmentStatus {
        match self {
            Pass::Available => EnrollmentStatus::Available,
            Pass::Enrolled => EnrollmentStatus::Enrolled,
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Available => write!(f, "Available"),
            Pass::Enrolled => write!(f, "Enrolled"),
        }
    }
}

/// Deduplication key of an offer. Expiration is already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OfferKey {
    pub text: String,
    pub merchant: String,
    pub expiration: String,
}

impl OfferKey {
    pub fn new(
        text: impl Into<String>,
        merchant: impl Into<String>,
        expiration: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            merchant: merchant.into(),
            expiration: expiration.into(),
        }
    }
}

/// Fixed-width per-card status array, sized when the offer is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentMatrix {
    slots: Box<[EnrollmentStatus]>,
}

impl EnrollmentMatrix {
    pub fn new(card_count: usize) -> Self {
        Self {
            slots: vec![EnrollmentStatus::NotApplicable; card_count].into_boxed_slice(),
        }
    }

    /// Panics when `card_index` is outside the width fixed at creation.
    pub fn set(&mut self, card_index: usize, status: EnrollmentStatus) {
        let width = self.slots.len();
        assert!(
            card_index < width,
            "card index {card_index} out of range for enrollment matrix of width {width}"
        );
        self.slots[card_index] = status;
    }

    /// Panics when `card_index` is outside the width fixed at creation.
    pub fn get(&self, card_index: usize) -> EnrollmentStatus {
        let width = self.slots.len();
        assert!(
            card_index < width,
            "card index {card_index} out of range for enrollment matrix of width {width}"
        );
        self.slots[card_index]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = EnrollmentStatus> + '_ {
        self.slots.iter().copied()
    }
}

/// A distinct promotional offer plus its accumulated enrollment state.
///
/// Equality and hashing only look at the key; the matrix is mutable state
/// attached to the identity, not part of it.
#[derive(Debug, Clone)]
pub struct Offer {
    pub key: OfferKey,
    pub enrollment: EnrollmentMatrix,
}

impl Offer {
    pub fn new(key: OfferKey, card_count: usize) -> Self {
        Self {
            key,
            enrollment: EnrollmentMatrix::new(card_count),
        }
    }

    pub fn text(&self) -> &str {
        &self.key.text
    }

    pub fn merchant(&self) -> &str {
        &self.key.merchant
    }

    pub fn expiration(&self) -> &str {
        &self.key.expiration
    }
}

impl PartialEq for Offer {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Offer {}

impl Hash for Offer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {} expiring on {}",
            self.key.text, self.key.merchant, self.key.expiration
        )
    }
}

/// Marker the portal embeds in the display name of a closed account.
pub const CANCELED_MARKER: &str = "Canceled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub index: usize,
    pub name: String,
}

impl Account {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.name.contains(CANCELED_MARKER)
    }
}

/// Offer tuple as extracted from a page, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOffer {
    pub text: String,
    pub merchant: String,
    pub expiration: Option<String>,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("login failed: {0}")]
    LoginFailed(String),
    #[error("no card selected")]
    NoCardSelected,
    #[error(transparent)]
    Parse(#[from] ParserError),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
    #[error("missing field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum TraversalError {
    #[error("login failed: {0}")]
    Login(#[source] ScraperError),
    #[error("could not list accounts: {0}")]
    Accounts(#[source] ScraperError),
    #[error("account count changed from {expected} to {found} during the run")]
    AccountCountChanged { expected: usize, found: usize },
}
