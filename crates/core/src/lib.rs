//! WFM Portal Core Library
//!
//! Domain logic for the workforce-management ticket portal: allow-list
//! authentication, the upload sink, the header-synchronizing spreadsheet
//! ledger, and confirmation mail delivery.

pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod mailer;
pub mod sheet;
pub mod uploads;

// Re-export commonly used items at crate root
pub use auth::{AllowList, normalize_email};
pub use config::{MailConfig, PortalConfig, SheetConfig, parse_user_list};
pub use error::{PortalError, Result};
pub use ledger::{
    ADMIN_COLUMNS, CLOSED_AT, ClosedTicket, Record, SUBMITTED_AT, SUBMITTED_BY, TicketLedger,
    timestamp_now,
};
pub use mailer::{Mailer, ticket_closed_bodies, ticket_received_bodies};
pub use sheet::{MemSheet, SheetsApi, Worksheet, column_letter};
pub use uploads::{ALLOWED_EXTENSIONS, StoredUpload, UploadSink, sanitize_filename};
