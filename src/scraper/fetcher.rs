use crate::model::{Account, Pass, RawOffer, ScraperError};
use crate::parser::{has_offer_list, parse_accounts, parse_offers};
use crate::scraper::traits::PortalSession;

use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// Portal session over plain HTTP: a cookie-holding client plus the
/// currently selected card and tab.
pub struct HttpPortalSession {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    selected: Option<usize>,
    pass: Pass,
}

impl HttpPortalSession {
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) CardOffers/0.1")
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            selected: None,
            pass: Pass::Available,
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn offers_url(&self, pass: Pass, card: usize) -> String {
        let tab = match pass {
            Pass::Available => "eligible",
            Pass::Enrolled => "enrolled",
        };
        self.build_url(&format!("offers/{}?account={}", tab, card))
    }

    fn selected_card(&self) -> Result<usize, ScraperError> {
        self.selected.ok_or(ScraperError::NoCardSelected)
    }

    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ScraperError::InvalidResponse(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl PortalSession for HttpPortalSession {
    async fn login(&mut self) -> Result<(), ScraperError> {
        info!("Logging in");
        let url = self.build_url("login");
        let form = [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        let response = self.client.post(&url).form(&form).send().await?;

        if !response.status().is_success() {
            return Err(ScraperError::LoginFailed(format!(
                "portal responded {}",
                response.status()
            )));
        }
        info!("Finished logging in");
        Ok(())
    }

    async fn list_accounts(&mut self) -> Result<Vec<Account>, ScraperError> {
        let html = self.fetch(&self.build_url("offers/eligible")).await?;
        Ok(parse_accounts(&html)?)
    }

    async fn open_card_stack(&mut self) -> Result<(), ScraperError> {
        self.selected = None;
        self.pass = Pass::Available;
        Ok(())
    }

    async fn select_card(&mut self, index: usize) -> Result<(), ScraperError> {
        self.selected = Some(index);
        self.pass = Pass::Available;
        Ok(())
    }

    async fn wait_offers_loaded(&mut self, wait: Duration) -> Result<(), ScraperError> {
        let card = self.selected_card()?;
        let url = self.offers_url(self.pass, card);

        let html = match timeout(wait, self.fetch(&url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ScraperError::Timeout(format!(
                    "offers of card {} not loaded within {:?}",
                    card, wait
                )));
            }
        };

        if has_offer_list(&html)? {
            Ok(())
        } else {
            Err(ScraperError::Timeout(format!(
                "offers section missing for card {}",
                card
            )))
        }
    }

    async fn switch_pass(&mut self, pass: Pass) -> Result<(), ScraperError> {
        self.selected_card()?;
        self.pass = pass;
        Ok(())
    }

    async fn scan_offers(&mut self, pass: Pass) -> Result<Vec<RawOffer>, ScraperError> {
        let card = self.selected_card()?;
        let html = self.fetch(&self.offers_url(pass, card)).await?;
        Ok(parse_offers(&html)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_tab_and_card() {
        let session = HttpPortalSession::new("https://portal.example/", "u", "p").unwrap();
        assert_eq!(session.build_url("login"), "https://portal.example/login");
        assert_eq!(
            session.offers_url(Pass::Enrolled, 2),
            "https://portal.example/offers/enrolled?account=2"
        );
        assert_eq!(
            session.offers_url(Pass::Available, 0),
            "https://portal.example/offers/eligible?account=0"
        );
    }

    #[tokio::test]
    async fn scanning_requires_a_selected_card() {
        let mut session = HttpPortalSession::new("https://portal.example", "u", "p").unwrap();
        assert!(matches!(
            session.scan_offers(Pass::Available).await,
            Err(ScraperError::NoCardSelected)
        ));
        assert!(matches!(
            session.switch_pass(Pass::Enrolled).await,
            Err(ScraperError::NoCardSelected)
        ));
    }
}
