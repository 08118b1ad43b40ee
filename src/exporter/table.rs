use crate::config::StatusLabels;
use crate::model::Offer;

pub const FIXED_COLUMNS: [&str; 3] = ["Offer", "Merchant", "Expiration"];

/// Header plus data rows, every row exactly as wide as the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn width(&self) -> usize {
        self.header.len()
    }
}

/// Builds the export table from offers already in output order.
///
/// `card_names` must include canceled cards so columns line up with the
/// enrollment matrix. Panics if any row width differs from the header.
pub fn serialize(offers: &[Offer], card_names: &[String], labels: &StatusLabels) -> ExportTable {
    let header: Vec<String> = FIXED_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(card_names.iter().cloned())
        .collect();

    let rows = offers
        .iter()
        .map(|offer| {
            let row: Vec<String> = [offer.text(), offer.merchant(), offer.expiration()]
                .into_iter()
                .map(str::to_string)
                .chain(offer.enrollment.iter().map(|s| labels.label(s).to_string()))
                .collect();
            assert_eq!(
                row.len(),
                header.len(),
                "export row for `{}` has {} columns, header has {}",
                offer,
                row.len(),
                header.len()
            );
            row
        })
        .collect();

    ExportTable { header, rows }
}
