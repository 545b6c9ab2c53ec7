//! Expiration text for active codes.
//!
//! The active table alternates a row naming one or more codes with a detail
//! row holding the reward and expiration. Pairing works over [`RowView`]s so
//! it can be exercised without parsing any markup.

use crate::domain::model::ExpirationMap;
use crate::extract::scanner::{joined_text, scan_element};
use crate::extract::section::{locate_table, HeaderMatch, Locate};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

pub const ACTIVE_ANCHOR: &str = "All_Active_Borderlands_4_SHiFT_Codes";
pub const EVENT_CLASS: &str = "simple-event";
pub const NO_EXPIRATION: &str = "No expiration";

const ACTIVE_SECTION: &[Locate<'static>] = &[
    Locate::Anchor(ACTIVE_ANCHOR),
    Locate::HeaderCell(HeaderMatch::Contains("limited-time")),
    Locate::HeaderCell(HeaderMatch::Contains("permanent")),
];

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("tr selector is valid"));
static DATA_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("td selector is valid"));

/// Text of a cell (or of a whole row) plus its rendered event text, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellView {
    pub text: String,
    pub event: Option<String>,
}

impl CellView {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            event: None,
        }
    }

    pub fn with_event(text: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            event: Some(event.into()),
        }
    }

    pub fn from_element(element: ElementRef<'_>) -> Self {
        // The first event element decides; an empty one falls back to the cell text.
        let event = element
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().classes().any(|class| class == EVENT_CLASS))
            .map(joined_text)
            .filter(|text| !text.is_empty());

        Self {
            text: joined_text(element),
            event,
        }
    }

    /// Event text verbatim when present, otherwise the normalized cell text.
    pub fn expiration(&self) -> String {
        match &self.event {
            Some(event) if !event.is_empty() => event.clone(),
            _ => normalize_expiration(&self.text),
        }
    }
}

/// A table row reduced to what pairing needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowView {
    /// Sorted, distinct codes named anywhere in the row.
    pub codes: Vec<String>,
    /// `td` cells in order.
    pub cells: Vec<CellView>,
    /// The row taken as a single cell.
    pub whole: CellView,
}

impl RowView {
    pub fn from_element(row: ElementRef<'_>) -> Self {
        Self {
            codes: scan_element(row).into_iter().collect(),
            cells: row.select(&DATA_CELL).map(CellView::from_element).collect(),
            whole: CellView::from_element(row),
        }
    }

    /// Expiration read from this row when it is the detail row of a pair.
    pub fn detail_expiration(&self) -> String {
        match self.cells.get(1) {
            Some(second) => second.expiration(),
            None => self.whole.expiration(),
        }
    }
}

pub fn normalize_expiration(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else if text.to_lowercase().contains("no expiration") {
        NO_EXPIRATION.to_string()
    } else {
        // "Unknown Expiration" notes carry a last-checked date, keep them whole.
        text.to_string()
    }
}

/// Walks `rows` with a cursor. A row naming codes takes its expiration from
/// the next row and both are consumed; any other row is skipped alone.
pub fn pair_rows(rows: &[RowView]) -> ExpirationMap {
    let mut mapping = ExpirationMap::new();
    let mut cursor = 0;

    while cursor < rows.len() {
        let row = &rows[cursor];
        if row.codes.is_empty() {
            cursor += 1;
            continue;
        }

        let expiration = rows
            .get(cursor + 1)
            .map(RowView::detail_expiration)
            .unwrap_or_default();
        for code in &row.codes {
            mapping.insert(code.clone(), expiration.clone());
        }
        cursor += 2;
    }

    mapping
}

/// Code -> expiration for the active section. Empty when the section is absent.
pub fn active_expirations(document: &Html) -> ExpirationMap {
    let Some(table) = locate_table(document, ACTIVE_SECTION) else {
        tracing::debug!("No active codes table found on page");
        return ExpirationMap::new();
    };

    let rows: Vec<RowView> = table.select(&ROW).map(RowView::from_element).collect();
    tracing::debug!("Active table has {} row(s)", rows.len());
    pair_rows(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_row(codes: &[&str]) -> RowView {
        RowView {
            codes: codes.iter().map(|c| c.to_string()).collect(),
            cells: vec![CellView::text(codes.join(" "))],
            whole: CellView::text(codes.join(" ")),
        }
    }

    fn detail_row(cells: Vec<CellView>) -> RowView {
        let whole = cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        RowView {
            codes: vec![],
            cells,
            whole: CellView::text(whole),
        }
    }

    #[test]
    fn test_pairs_code_row_with_detail_row() {
        let rows = vec![
            code_row(&["ABCDE-12345-ABCDE-12345-ABCDE"]),
            detail_row(vec![
                CellView::text("Golden Key x3"),
                CellView::text("No Expiration"),
            ]),
        ];
        let mapping = pair_rows(&rows);
        assert_eq!(mapping.len(), 1);
        assert_eq!(
            mapping.get("ABCDE-12345-ABCDE-12345-ABCDE").map(String::as_str),
            Some("No expiration")
        );
    }

    #[test]
    fn test_event_text_is_used_verbatim() {
        let rows = vec![
            code_row(&["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"]),
            detail_row(vec![
                CellView::text("1 Golden Key"),
                CellView::with_event(
                    "Expires October 12, 2025 at 9:00 AM PDT (no expiration extension)",
                    "October 12, 2025 at 9:00 AM PDT",
                ),
            ]),
        ];
        let mapping = pair_rows(&rows);
        assert_eq!(
            mapping["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"],
            "October 12, 2025 at 9:00 AM PDT"
        );
    }

    #[test]
    fn test_unknown_expiration_is_passed_through() {
        let rows = vec![
            code_row(&["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"]),
            detail_row(vec![
                CellView::text("Cosmetic"),
                CellView::text("Unknown Expiration (last checked October 1, 2025)"),
            ]),
        ];
        assert_eq!(
            pair_rows(&rows)["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"],
            "Unknown Expiration (last checked October 1, 2025)"
        );
    }

    #[test]
    fn test_single_cell_detail_uses_whole_row() {
        let rows = vec![
            code_row(&["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"]),
            detail_row(vec![CellView::text("Expires: Dec 31, 2025")]),
        ];
        assert_eq!(
            pair_rows(&rows)["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"],
            "Expires: Dec 31, 2025"
        );
    }

    #[test]
    fn test_all_codes_in_a_row_share_expiration() {
        let rows = vec![
            code_row(&[
                "AAAAA-AAAAA-AAAAA-AAAAA-AAAAA",
                "BBBBB-BBBBB-BBBBB-BBBBB-BBBBB",
            ]),
            detail_row(vec![CellView::text("Reward"), CellView::text("no expiration")]),
        ];
        let mapping = pair_rows(&rows);
        assert_eq!(mapping["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"], NO_EXPIRATION);
        assert_eq!(mapping["BBBBB-BBBBB-BBBBB-BBBBB-BBBBB"], NO_EXPIRATION);
    }

    #[test]
    fn test_last_code_row_without_detail_gets_empty_text() {
        let rows = vec![
            detail_row(vec![CellView::text("Limited-Time Codes")]),
            code_row(&["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"]),
        ];
        assert_eq!(pair_rows(&rows)["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"], "");
    }

    #[test]
    fn test_non_code_rows_advance_by_one() {
        let rows = vec![
            detail_row(vec![CellView::text("Limited-Time Codes")]),
            detail_row(vec![CellView::text("Code"), CellView::text("Reward")]),
            code_row(&["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"]),
            detail_row(vec![CellView::text("Key"), CellView::text("Nov 1")]),
        ];
        let mapping = pair_rows(&rows);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"], "Nov 1");
    }

    #[test]
    fn test_back_to_back_code_rows_keep_fixed_cadence() {
        // The second code row is consumed as the first row's detail.
        let rows = vec![
            code_row(&["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"]),
            code_row(&["BBBBB-BBBBB-BBBBB-BBBBB-BBBBB"]),
            detail_row(vec![CellView::text("Key"), CellView::text("Nov 1")]),
        ];
        let mapping = pair_rows(&rows);
        assert_eq!(
            mapping["AAAAA-AAAAA-AAAAA-AAAAA-AAAAA"],
            "BBBBB-BBBBB-BBBBB-BBBBB-BBBBB"
        );
        assert!(!mapping.contains_key("BBBBB-BBBBB-BBBBB-BBBBB-BBBBB"));
    }

    #[test]
    fn test_normalize_expiration() {
        assert_eq!(normalize_expiration(""), "");
        assert_eq!(normalize_expiration("NO EXPIRATION DATE"), NO_EXPIRATION);
        assert_eq!(normalize_expiration("Oct 30, 2025"), "Oct 30, 2025");
    }

    #[test]
    fn test_row_view_from_markup() {
        let document = Html::parse_document(
            r#"<table>
                 <tr data-code="ccccc-ccccc-ccccc-ccccc-ccccc"><td colspan="2">PC: AAAAA-AAAAA-AAAAA-AAAAA-AAAAA</td></tr>
                 <tr><td>3 Golden Keys</td><td><div class="simple-event"><span>October 12, 2025</span> <span>9:00 AM PDT</span></div></td></tr>
               </table>"#,
        );
        let rows: Vec<RowView> = document.select(&ROW).map(RowView::from_element).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].codes,
            vec![
                "AAAAA-AAAAA-AAAAA-AAAAA-AAAAA",
                "CCCCC-CCCCC-CCCCC-CCCCC-CCCCC",
            ]
        );
        assert_eq!(rows[1].cells.len(), 2);
        assert_eq!(rows[1].detail_expiration(), "October 12, 2025 9:00 AM PDT");
    }

    #[test]
    fn test_empty_event_falls_back_to_cell_text() {
        let document = Html::parse_document(
            r#"<table><tr><td>Key</td><td><div class="simple-event"> </div>No Expiration</td></tr></table>"#,
        );
        let row = document.select(&ROW).map(RowView::from_element).next().unwrap();
        assert_eq!(row.cells[1].event, None);
        assert_eq!(row.detail_expiration(), NO_EXPIRATION);
    }

    #[test]
    fn test_active_expirations_from_document() {
        let document = Html::parse_document(
            r#"<h2><span id="All_Active_Borderlands_4_SHiFT_Codes">All Active Borderlands 4 SHiFT Codes</span></h2>
               <table>
                 <tr><th>Limited-Time Codes</th></tr>
                 <tr><td>SHIFT-CODE: ABCDE-12345-ABCDE-12345-ABCDE</td></tr>
                 <tr><td>Golden Key x3</td><td>No Expiration</td></tr>
               </table>"#,
        );
        let mapping = active_expirations(&document);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["ABCDE-12345-ABCDE-12345-ABCDE"], NO_EXPIRATION);
    }

    #[test]
    fn test_active_expirations_without_section() {
        let document = Html::parse_document("<p>ABCDE-12345-ABCDE-12345-ABCDE</p>");
        assert!(active_expirations(&document).is_empty());
    }
}
