use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Sheet {op} failed: {detail}")]
    SheetApi { op: &'static str, detail: String },

    #[error("Spreadsheet is not configured")]
    SheetNotConfigured,

    #[error("Ticket not found: {ticket_id}")]
    TicketNotFound { ticket_id: String },

    #[error("Mail send failed with status {status}: {detail}")]
    MailApi { status: u16, detail: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Missing configuration: {env_var} environment variable is not set")]
    MissingConfig { env_var: &'static str },
}

pub type Result<T> = std::result::Result<T, PortalError>;
