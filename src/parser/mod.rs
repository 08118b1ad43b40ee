pub mod portal_parser;

pub use portal_parser::{parse_accounts, parse_offers, has_offer_list};
