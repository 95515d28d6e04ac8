use std::sync::Arc;

use chrono::Local;
use tokio::sync::Mutex;

use crate::{
    error::{PortalError, Result},
    sheet::Worksheet,
};

pub const SUBMITTED_BY: &str = "Submitted By";
pub const SUBMITTED_AT: &str = "Submitted At";
pub const CLOSED_AT: &str = "Closed At";

/// Administrative columns present in every ledger, regardless of what the
/// form submitted.
pub const ADMIN_COLUMNS: [&str; 3] = [SUBMITTED_BY, SUBMITTED_AT, CLOSED_AT];

/// Wall-clock timestamp in the ledger's `YYYY-MM-DD HH:MM:SS` format
pub fn timestamp_now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// One submission as an ordered mapping from field name to value.
///
/// Insertion order is preserved; inserting an existing name overwrites its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Row located and stamped by [`TicketLedger::close`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTicket {
    /// 1-based sheet row that was stamped.
    pub row: u32,
    /// Value of the row's "Submitted By" cell, empty if absent.
    pub submitted_by: String,
    /// Value of the row's advisor-name cell, empty if absent.
    pub advisor_name: String,
}

/// Append-only log over a worksheet whose header row grows as new field
/// names appear.
///
/// Columns are looked up by name, never by position: the header row is the
/// schema, names are appended at the end and never removed, renamed, or
/// reordered. Both operations run their read-modify-write cycle under a
/// single lock.
pub struct TicketLedger {
    sheet: Arc<dyn Worksheet>,
    write_lock: Mutex<()>,
}

impl TicketLedger {
    pub fn new(sheet: Arc<dyn Worksheet>) -> Self {
        Self {
            sheet,
            write_lock: Mutex::new(()),
        }
    }

    /// Append one record, growing the header first for any new field name.
    ///
    /// Values are ordered by the updated header; a header the record has no
    /// value for becomes an empty cell.
    pub async fn append(&self, record: &Record) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let header = self.sync_header(record).await?;
        let row: Vec<String> = header
            .iter()
            .map(|name| record.get(name).unwrap_or_default().to_string())
            .collect();
        self.sheet.append_row(&row).await
    }

    /// Stamp the first data row containing `ticket_id` in any cell.
    ///
    /// Writes `closed_at` into that row's "Closed At" column, creating the
    /// column if the sheet predates it. Duplicate identifiers are not
    /// detected; the first match wins.
    pub async fn close(&self, ticket_id: &str, closed_at: &str) -> Result<ClosedTicket> {
        let _guard = self.write_lock.lock().await;
        let rows = self.sheet.all_rows().await?;
        if rows.len() < 2 {
            return Err(PortalError::TicketNotFound {
                ticket_id: ticket_id.to_string(),
            });
        }

        let mut header = rows[0].clone();
        let Some((index, row)) = rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| row.iter().any(|cell| cell == ticket_id))
        else {
            return Err(PortalError::TicketNotFound {
                ticket_id: ticket_id.to_string(),
            });
        };

        let closed_col = match header.iter().position(|name| name == CLOSED_AT) {
            Some(position) => position,
            None => {
                header.push(CLOSED_AT.to_string());
                self.sheet.write_header(&header).await?;
                header.len() - 1
            }
        };

        let row_number = index as u32 + 1;
        self.sheet
            .write_cell(row_number, closed_col as u32 + 1, closed_at)
            .await?;

        let advisor_name = if header.iter().any(|name| name == "advisor_name") {
            cell_by_header(&header, row, "advisor_name")
        } else {
            cell_by_header(&header, row, "Advisor Name")
        };

        Ok(ClosedTicket {
            row: row_number,
            submitted_by: cell_by_header(&header, row, SUBMITTED_BY),
            advisor_name,
        })
    }

    /// Grow the header with any record key or administrative column not yet
    /// present, preserving existing order. Writes the header back only when
    /// it changed. Callers must hold `write_lock`.
    async fn sync_header(&self, record: &Record) -> Result<Vec<String>> {
        let rows = self.sheet.all_rows().await?;
        let mut header = rows.into_iter().next().unwrap_or_default();
        let mut changed = false;
        for name in record.keys().chain(ADMIN_COLUMNS.iter().copied()) {
            if !header.iter().any(|existing| existing == name) {
                header.push(name.to_string());
                changed = true;
            }
        }
        if changed {
            self.sheet.write_header(&header).await?;
        }
        Ok(header)
    }
}

fn cell_by_header(header: &[String], row: &[String], name: &str) -> String {
    header
        .iter()
        .position(|h| h == name)
        .and_then(|col| row.get(col))
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::MemSheet;

    fn record(fields: &[(&str, &str)]) -> Record {
        let mut record = Record::new();
        for (name, value) in fields {
            record.insert(*name, *value);
        }
        record
    }

    fn ledger_over(sheet: Arc<MemSheet>) -> TicketLedger {
        TicketLedger::new(sheet)
    }

    #[test]
    fn record_preserves_insertion_order_and_overwrites_in_place() {
        let mut r = Record::new();
        r.insert("b", "1");
        r.insert("a", "2");
        r.insert("b", "3");
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(r.get("b"), Some("3"));
        assert_eq!(r.len(), 2);
    }

    #[tokio::test]
    async fn first_append_creates_header_with_admin_columns() {
        let sheet = Arc::new(MemSheet::new());
        let ledger = ledger_over(sheet.clone());
        ledger
            .append(&record(&[("advisor_name", "Jane"), ("wfm_request", "Shift swap")]))
            .await
            .unwrap();

        let rows = sheet.snapshot().await;
        assert_eq!(
            rows[0],
            vec![
                "advisor_name",
                "wfm_request",
                SUBMITTED_BY,
                SUBMITTED_AT,
                CLOSED_AT
            ]
        );
        assert_eq!(rows[1], vec!["Jane", "Shift swap", "", "", ""]);
    }

    #[tokio::test]
    async fn new_field_extends_header_after_existing_columns() {
        let sheet = Arc::new(MemSheet::new());
        let ledger = ledger_over(sheet.clone());
        ledger.append(&record(&[("advisor_name", "Jane")])).await.unwrap();
        let before = sheet.snapshot().await;

        ledger
            .append(&record(&[("advisor_name", "Omar"), ("priority", "high")]))
            .await
            .unwrap();

        let rows = sheet.snapshot().await;
        // prior header columns keep their order, the new one lands last
        assert_eq!(&rows[0][..before[0].len()], &before[0][..]);
        assert_eq!(rows[0].last().map(String::as_str), Some("priority"));
        // previously written rows are untouched
        assert_eq!(rows[1], before[1]);
        assert_eq!(cell_by_header(&rows[0], &rows[2], "priority"), "high");
    }

    #[tokio::test]
    async fn missing_value_for_known_header_becomes_empty_cell() {
        let sheet = Arc::new(MemSheet::new());
        let ledger = ledger_over(sheet.clone());
        ledger
            .append(&record(&[("advisor_name", "Jane"), ("details", "Friday off")]))
            .await
            .unwrap();
        ledger.append(&record(&[("advisor_name", "Omar")])).await.unwrap();

        let rows = sheet.snapshot().await;
        let details_col = rows[0].iter().position(|h| h == "details").unwrap();
        assert_eq!(rows[2][details_col], "");
        assert_eq!(rows[0].len(), rows[2].len());
    }

    #[tokio::test]
    async fn close_stamps_only_the_matching_row() {
        let sheet = Arc::new(MemSheet::new());
        let ledger = ledger_over(sheet.clone());
        let mut first = record(&[("advisor_name", "Jane"), ("details", "TCK-100")]);
        first.insert(SUBMITTED_BY, "jane@example.com");
        ledger.append(&first).await.unwrap();
        ledger
            .append(&record(&[("advisor_name", "Omar"), ("details", "TCK-200")]))
            .await
            .unwrap();

        let closed = ledger.close("TCK-200", "2026-08-04 10:00:00").await.unwrap();
        assert_eq!(closed.row, 3);
        assert_eq!(closed.advisor_name, "Omar");

        let rows = sheet.snapshot().await;
        let closed_col = rows[0].iter().position(|h| h == CLOSED_AT).unwrap();
        assert_eq!(rows[2][closed_col], "2026-08-04 10:00:00");
        assert_eq!(rows[1][closed_col], "");
    }

    #[tokio::test]
    async fn close_reports_submitter_for_notification() {
        let sheet = Arc::new(MemSheet::new());
        let ledger = ledger_over(sheet.clone());
        let mut r = record(&[("advisor_name", "Jane"), ("details", "TCK-1")]);
        r.insert(SUBMITTED_BY, "jane@example.com");
        ledger.append(&r).await.unwrap();

        let closed = ledger.close("TCK-1", "2026-08-04 10:00:00").await.unwrap();
        assert_eq!(closed.submitted_by, "jane@example.com");
        assert_eq!(closed.advisor_name, "Jane");
    }

    #[tokio::test]
    async fn close_unknown_ticket_leaves_sheet_unmodified() {
        let sheet = Arc::new(MemSheet::new());
        let ledger = ledger_over(sheet.clone());
        ledger.append(&record(&[("advisor_name", "Jane")])).await.unwrap();
        let before = sheet.snapshot().await;

        let err = ledger.close("TCK-404", "2026-08-04 10:00:00").await.unwrap_err();
        assert!(matches!(err, PortalError::TicketNotFound { .. }));
        assert_eq!(sheet.snapshot().await, before);
    }

    #[tokio::test]
    async fn close_on_empty_sheet_is_not_found() {
        let ledger = ledger_over(Arc::new(MemSheet::new()));
        let err = ledger.close("TCK-1", "now").await.unwrap_err();
        assert!(matches!(err, PortalError::TicketNotFound { .. }));
    }

    #[tokio::test]
    async fn close_creates_closed_at_column_on_legacy_sheets() {
        // a sheet written before the portal stamped admin columns
        let sheet = Arc::new(MemSheet::with_rows(vec![
            vec!["advisor_name".to_string(), "details".to_string()],
            vec!["Jane".to_string(), "TCK-9".to_string()],
        ]));
        let ledger = ledger_over(sheet.clone());

        let closed = ledger.close("TCK-9", "2026-08-04 10:00:00").await.unwrap();
        assert_eq!(closed.row, 2);

        let rows = sheet.snapshot().await;
        assert_eq!(rows[0].last().map(String::as_str), Some(CLOSED_AT));
        assert_eq!(rows[1][2], "2026-08-04 10:00:00");
    }

    #[tokio::test]
    async fn duplicate_identifiers_close_the_first_match() {
        let sheet = Arc::new(MemSheet::new());
        let ledger = ledger_over(sheet.clone());
        ledger
            .append(&record(&[("advisor_name", "Jane"), ("details", "TCK-7")]))
            .await
            .unwrap();
        ledger
            .append(&record(&[("advisor_name", "Omar"), ("details", "TCK-7")]))
            .await
            .unwrap();

        let closed = ledger.close("TCK-7", "2026-08-04 10:00:00").await.unwrap();
        assert_eq!(closed.row, 2);
        let rows = sheet.snapshot().await;
        let closed_col = rows[0].iter().position(|h| h == CLOSED_AT).unwrap();
        assert_eq!(rows[2][closed_col], "");
    }
}
