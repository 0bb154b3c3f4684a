//! Branch availability scraped from a catalog detail page.
//!
//! Koha detail pages list holdings in a single table, one row per copy:
//! branch name in the first column and status ("Available", "Checked out",
//! "In transit", ...) in the sixth.  The column positions are a fixed
//! contract with the catalog's current layout; nothing checks the headers.

use scraper::{ElementRef, Html};
use thiserror::Error;

use crate::html::selector;

const BRANCH_COLUMN: usize = 0;
const STATUS_COLUMN: usize = 5;
const AVAILABLE: &str = "Available";

/// One row of the holdings table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRow {
    pub branch: String,
    pub status: String,
}

impl AvailabilityRow {
    pub fn new(branch: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            status: status.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.status.contains(AVAILABLE)
    }
}

/// The detail page does not have the holdings table we read by position.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("page has no holdings table")]
    MissingTable,
    #[error("holdings row {row} has {cells} cells, expected at least 6")]
    ShortRow { row: usize, cells: usize },
}

/// Anything that can report its holdings rows.
///
/// Implemented for parsed catalog pages; tests implement it for plain
/// row lists.
pub trait HoldingsTable {
    fn holdings(&self) -> Result<Vec<AvailabilityRow>, LayoutError>;
}

impl HoldingsTable for Html {
    fn holdings(&self) -> Result<Vec<AvailabilityRow>, LayoutError> {
        extract_rows(self)
    }
}

impl HoldingsTable for Vec<AvailabilityRow> {
    fn holdings(&self) -> Result<Vec<AvailabilityRow>, LayoutError> {
        Ok(self.clone())
    }
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Read `(branch, status)` from every body row of the first table.
pub fn extract_rows(doc: &Html) -> Result<Vec<AvailabilityRow>, LayoutError> {
    let table = doc
        .select(&selector("table"))
        .next()
        .ok_or(LayoutError::MissingTable)?;

    let row_sel = selector("tbody tr");
    let cell_sel = selector("td");

    table
        .select(&row_sel)
        .enumerate()
        .map(|(i, row)| {
            let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
            if cells.len() <= STATUS_COLUMN {
                return Err(LayoutError::ShortRow {
                    row: i,
                    cells: cells.len(),
                });
            }
            Ok(AvailabilityRow {
                branch: cell_text(&cells[BRANCH_COLUMN]),
                status: cell_text(&cells[STATUS_COLUMN]),
            })
        })
        .collect()
}

/// Branch names whose status mentions "Available", in table order.
pub fn filter_available(rows: &[AvailabilityRow]) -> Vec<String> {
    rows.iter()
        .filter(|r| r.is_available())
        .map(|r| r.branch.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holdings_page(rows: &[(&str, &str)]) -> Html {
        let body: String = rows
            .iter()
            .map(|(branch, status)| {
                format!(
                    "<tr><td class=\"location\"> {branch} </td><td>Adult Fiction</td><td>FIC GAL</td>\
                     <td></td><td>31234</td><td class=\"status\">\n  {status}\n</td><td></td></tr>"
                )
            })
            .collect();
        Html::parse_document(&format!(
            "<html><body><h1>Detail</h1><table id=\"holdingst\">\
             <thead><tr><th>Library</th><th>Collection</th><th>Call number</th>\
             <th>Notes</th><th>Barcode</th><th>Status</th><th>Due</th></tr></thead>\
             <tbody>{body}</tbody></table></body></html>"
        ))
    }

    #[test]
    fn extracts_branch_and_status_columns() {
        let doc = holdings_page(&[("Central Library", "Available"), ("Pinney", "Checked out")]);

        let rows = extract_rows(&doc).unwrap();

        assert_eq!(
            rows,
            vec![
                AvailabilityRow::new("Central Library", "Available"),
                AvailabilityRow::new("Pinney", "Checked out"),
            ]
        );
    }

    #[test]
    fn header_row_is_not_a_holding() {
        let doc = holdings_page(&[]);
        assert!(extract_rows(&doc).unwrap().is_empty());
    }

    #[test]
    fn only_first_table_is_read() {
        let doc = Html::parse_document(
            "<table><tbody><tr><td>Main</td><td></td><td></td><td></td><td></td><td>Available</td></tr></tbody></table>\
             <table><tbody><tr><td>Other</td><td></td><td></td><td></td><td></td><td>Available</td></tr></tbody></table>",
        );
        let rows = extract_rows(&doc).unwrap();
        assert_eq!(rows, vec![AvailabilityRow::new("Main", "Available")]);
    }

    #[test]
    fn missing_table_is_a_layout_error() {
        let doc = Html::parse_document("<html><body><p>No holdings</p></body></html>");
        assert_eq!(extract_rows(&doc), Err(LayoutError::MissingTable));
    }

    #[test]
    fn short_row_is_a_layout_error() {
        let doc = Html::parse_document(
            "<table><tbody><tr><td>Main</td><td>Available</td></tr></tbody></table>",
        );
        assert_eq!(
            extract_rows(&doc),
            Err(LayoutError::ShortRow { row: 0, cells: 2 })
        );
    }

    #[test]
    fn filter_keeps_available_in_order() {
        let rows = vec![
            AvailabilityRow::new("East", "Checked out"),
            AvailabilityRow::new("Main", "Available"),
            AvailabilityRow::new("West", "In transit"),
            AvailabilityRow::new("North", "Available (Reference)"),
            AvailabilityRow::new("South", "available"),
        ];

        assert_eq!(filter_available(&rows), ["Main", "North"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let rows = vec![
            AvailabilityRow::new("Main", "Available"),
            AvailabilityRow::new("North", "Available"),
        ];

        let once = filter_available(&rows);
        let kept: Vec<AvailabilityRow> = rows
            .iter()
            .filter(|r| once.contains(&r.branch))
            .cloned()
            .collect();

        assert_eq!(kept, rows);
        assert_eq!(filter_available(&kept), once);
    }

    #[test]
    fn html_page_is_a_holdings_table() {
        let doc = holdings_page(&[("Main", "Available")]);
        let rows = HoldingsTable::holdings(&doc).unwrap();
        assert_eq!(filter_available(&rows), ["Main"]);
    }
}
