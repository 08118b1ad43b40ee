use crate::model::{EnrollmentStatus, Offer, OfferKey};
use std::collections::HashMap;
use tracing::debug;

/// In-memory, deduplicated offer store for a single run.
///
/// Offers keep their first-insertion position so that `finalize` can break
/// merchant ties deterministically.
pub struct OfferRegistry {
    card_count: usize,
    index: HashMap<OfferKey, usize>,
    offers: Vec<Offer>,
}

impl OfferRegistry {
    /// `card_count` fixes the matrix width of every offer created by this registry.
    pub fn new(card_count: usize) -> Self {
        Self {
            card_count,
            index: HashMap::new(),
            offers: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn get(&self, key: &OfferKey) -> Option<&Offer> {
        self.index.get(key).map(|&pos| &self.offers[pos])
    }

    /// Records `status` for `card_index` on the offer identified by `key`,
    /// creating it with an all-`NotApplicable` matrix on first sight.
    ///
    /// Panics when `card_index >= card_count`.
    pub fn upsert(&mut self, key: OfferKey, card_index: usize, status: EnrollmentStatus) -> &Offer {
        let pos = match self.index.get(&key) {
            Some(&pos) => pos,
            None => {
                debug!("New offer: {} at {}", key.text, key.merchant);
                let pos = self.offers.len();
                self.offers.push(Offer::new(key.clone(), self.card_count));
                self.index.insert(key, pos);
                pos
            }
        };

        let offer = &mut self.offers[pos];
        offer.enrollment.set(card_index, status);
        offer
    }

    /// Consumes the registry, returning offers ordered by merchant.
    ///
    /// Only the merchant is compared; offers sharing a merchant keep their
    /// insertion order because the sort is stable.
    pub fn finalize(self) -> Vec<Offer> {
        let mut offers = self.offers;
        offers.sort_by(|a, b| a.key.merchant.cmp(&b.key.merchant));
        offers
    }
}
