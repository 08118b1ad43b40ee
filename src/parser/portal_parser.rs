// Card-portal HTML parsing
use crate::model::{Account, ParserError, RawOffer};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const ACCOUNT_SELECTOR: &str = "#accounts > section";
const ACCOUNT_NAME_SELECTOR: &str = "header p";
const OFFER_LIST_SELECTOR: &str = "#offers section.offer-list";
const OFFER_BODY_SELECTOR: &str = "#offers section.offer-list > div";
const OFFER_INFO_SELECTOR: &str = ".offer-info";
const OFFER_INFO_LINE_SELECTOR: &str = "p";
const OFFER_EXPIRES_SELECTOR: &str = ".offer-expires span span";

fn selector(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|_| ParserError::InvalidSelector(css.to_string()))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads the account switcher in page order.
pub fn parse_accounts(html: &str) -> Result<Vec<Account>, ParserError> {
    let document = Html::parse_document(html);
    let account_selector = selector(ACCOUNT_SELECTOR)?;
    let name_selector = selector(ACCOUNT_NAME_SELECTOR)?;

    document
        .select(&account_selector)
        .enumerate()
        .map(|(index, section)| {
            let name = section
                .select(&name_selector)
                .next()
                .map(element_text)
                .ok_or_else(|| ParserError::MissingField(format!("name of account {index}")))?;
            Ok(Account::new(index, name))
        })
        .collect()
}

/// True once the page carries the offer list container.
pub fn has_offer_list(html: &str) -> Result<bool, ParserError> {
    let document = Html::parse_document(html);
    Ok(document.select(&selector(OFFER_LIST_SELECTOR)?).next().is_some())
}

/// Extracts the offer tuples of the current tab.
///
/// A body without offer info means the tab is empty, so scanning stops there.
/// Bodies lacking a text or merchant line (banners) are skipped.
pub fn parse_offers(html: &str) -> Result<Vec<RawOffer>, ParserError> {
    let document = Html::parse_document(html);
    let body_selector = selector(OFFER_BODY_SELECTOR)?;
    let info_selector = selector(OFFER_INFO_SELECTOR)?;
    let line_selector = selector(OFFER_INFO_LINE_SELECTOR)?;
    let expires_selector = selector(OFFER_EXPIRES_SELECTOR)?;

    let mut offers = Vec::new();
    for body in document.select(&body_selector) {
        let Some(info) = body.select(&info_selector).next() else {
            break;
        };

        let mut lines = info.select(&line_selector).map(element_text);
        let (Some(text), Some(merchant)) = (lines.next(), lines.next()) else {
            debug!("Skipping offer body without text and merchant: {:?}", element_text(info));
            continue;
        };
        let expiration = body.select(&expires_selector).next().map(element_text);

        offers.push(RawOffer {
            text,
            merchant,
            expiration,
        });
    }

    Ok(offers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNTS: &str = r#"
        <div id="accounts">
          <section><header><section><div><div><p>Gold Card -1001</p></div></div></section></header></section>
          <section><header><section><div><div><p>Green Card
              (Canceled)</p></div></div></section></header></section>
        </div>"#;

    const OFFERS: &str = r#"
        <div id="offers"><div>
          <section class="offer-list">
            <div>
              <div class="offer-info"><p>Spend $50 or more, get $10 back</p><p>StoreX</p></div>
              <div class="offer-expires"><span><span>Expires in 5 days</span></span></div>
            </div>
            <div>
              <div class="offer-info"><p>Earn 3X points</p><p>Airline</p></div>
            </div>
          </section>
        </div></div>"#;

    #[test]
    fn accounts_are_indexed_in_page_order() {
        let accounts = parse_accounts(ACCOUNTS).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0], Account::new(0, "Gold Card -1001"));
        assert_eq!(accounts[1].name, "Green Card (Canceled)");
        assert!(accounts[1].is_canceled());
    }

    #[test]
    fn offers_are_extracted_with_optional_expiration() {
        let offers = parse_offers(OFFERS).unwrap();
        assert_eq!(
            offers,
            vec![
                RawOffer {
                    text: "Spend $50 or more, get $10 back".into(),
                    merchant: "StoreX".into(),
                    expiration: Some("Expires in 5 days".into()),
                },
                RawOffer {
                    text: "Earn 3X points".into(),
                    merchant: "Airline".into(),
                    expiration: None,
                },
            ]
        );
    }

    #[test]
    fn empty_tab_stops_at_first_body_without_info() {
        let html = r#"<div id="offers"><section class="offer-list">
            <div><p>No offers right now</p></div>
            <div><div class="offer-info"><p>Spend $1</p><p>Late</p></div></div>
        </section></div>"#;
        assert!(parse_offers(html).unwrap().is_empty());
        assert!(has_offer_list(html).unwrap());
    }

    #[test]
    fn page_without_list_is_not_loaded() {
        assert!(!has_offer_list("<html><body>Loading...</body></html>").unwrap());
    }

    #[test]
    fn banner_without_merchant_line_is_skipped() {
        let html = r#"<div id="offers"><section class="offer-list">
            <div><div class="offer-info"><p>Spend $10, get $2 back</p><p>StoreX</p></div></div>
            <div><div class="offer-info"><p>Get the app today!</p></div></div>
            <div><div class="offer-info"><p>Spend $30, get $5 back</p><p>StoreY</p></div></div>
        </section></div>"#;

        let offers = parse_offers(html).unwrap();
        let merchants: Vec<_> = offers.iter().map(|o| o.merchant.as_str()).collect();
        assert_eq!(merchants, vec!["StoreX", "StoreY"]);
    }
}
