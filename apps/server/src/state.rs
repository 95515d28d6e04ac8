use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::info;
use wfm_core::{AllowList, Mailer, PortalConfig, SheetsApi, TicketLedger, UploadSink};

use crate::session::{SessionStore, session_id_from_headers};

/// Everything the request handlers share.
pub struct AppState {
    pub allow_list: AllowList,
    pub uploads: UploadSink,
    pub ledger: Option<TicketLedger>,
    pub mailer: Option<Mailer>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        allow_list: AllowList,
        uploads: UploadSink,
        ledger: Option<TicketLedger>,
        mailer: Option<Mailer>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            allow_list,
            uploads,
            ledger,
            mailer,
            sessions,
        }
    }

    pub fn from_config(config: &PortalConfig) -> Self {
        let ledger = config.sheet.as_ref().map(|sheet| {
            info!("spreadsheet ledger enabled for sheet {}", sheet.spreadsheet_id);
            TicketLedger::new(Arc::new(SheetsApi::new(
                sheet.spreadsheet_id.clone(),
                sheet.token.clone(),
            )))
        });
        if ledger.is_none() {
            info!("no spreadsheet configured; submissions will not be persisted");
        }

        let mailer = config.mail.as_ref().map(|mail| {
            info!("confirmation email enabled from {}", mail.sender);
            Mailer::new(mail.api_key.clone(), mail.sender.clone())
        });
        if mailer.is_none() {
            info!("no mail provider configured; confirmation email disabled");
        }

        Self::new(
            AllowList::new(config.allowed_users.iter().map(String::as_str)),
            UploadSink::new(config.upload_dir.clone()),
            ledger,
            mailer,
            SessionStore::new(config.session_ttl),
        )
    }

    /// Email of the authenticated caller, if the request carries a live
    /// session.
    pub fn current_user(&self, headers: &HeaderMap) -> Option<String> {
        let id = session_id_from_headers(headers)?;
        self.sessions.email_for(id)
    }
}
