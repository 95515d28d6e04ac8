use std::{env, path::PathBuf, time::Duration};

use tracing::warn;

use crate::{
    auth::normalize_email,
    error::{PortalError, Result},
};

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;

/// Spreadsheet access settings; absence disables the ledger.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    pub token: String,
}

/// Mail provider settings; absence disables confirmation email.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_key: String,
    pub sender: String,
}

/// Portal configuration, sourced entirely from the environment.
///
/// | Variable | Required | Description |
/// |----------|----------|-------------|
/// | `WFM_ALLOWED_USERS` | Yes | Comma-separated login allow-list |
/// | `WFM_BIND` | No | Listen address (default `127.0.0.1:8080`) |
/// | `WFM_UPLOAD_DIR` | No | Upload directory (default `uploads`) |
/// | `WFM_SESSION_TTL_SECS` | No | Session lifetime (default 8h) |
/// | `WFM_SHEET_ID` | No | Spreadsheet identifier |
/// | `WFM_SHEETS_TOKEN` | No | OAuth bearer token for the sheet |
/// | `WFM_SHEETS_TOKEN_FILE` | No | File holding the token instead |
/// | `SENDGRID_API_KEY` | No | Mail provider API key |
/// | `WFM_MAIL_FROM` | No | Confirmation sender address |
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub bind: String,
    pub allowed_users: Vec<String>,
    pub upload_dir: PathBuf,
    pub session_ttl: Duration,
    pub sheet: Option<SheetConfig>,
    pub mail: Option<MailConfig>,
}

impl PortalConfig {
    pub fn from_env() -> Result<Self> {
        let raw_users = env::var("WFM_ALLOWED_USERS").map_err(|_| PortalError::MissingConfig {
            env_var: "WFM_ALLOWED_USERS",
        })?;
        let allowed_users = parse_user_list(&raw_users);
        if allowed_users.is_empty() {
            return Err(PortalError::MissingConfig {
                env_var: "WFM_ALLOWED_USERS",
            });
        }

        Ok(Self {
            bind: env::var("WFM_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string()),
            allowed_users,
            upload_dir: PathBuf::from(
                env::var("WFM_UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string()),
            ),
            session_ttl: Duration::from_secs(parse_session_ttl_from_env()),
            sheet: sheet_from_env(),
            mail: mail_from_env(),
        })
    }
}

/// Split a comma-separated allow-list, normalizing each entry.
pub fn parse_user_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_email)
        .filter(|email| !email.is_empty())
        .collect()
}

fn parse_session_ttl_from_env() -> u64 {
    env::var("WFM_SESSION_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| (60..=60 * 60 * 24 * 7).contains(v))
        .unwrap_or(DEFAULT_SESSION_TTL_SECS)
}

fn sheet_from_env() -> Option<SheetConfig> {
    let spreadsheet_id = env::var("WFM_SHEET_ID").ok()?;
    let token = match env::var("WFM_SHEETS_TOKEN") {
        Ok(token) => token,
        Err(_) => {
            let path = env::var("WFM_SHEETS_TOKEN_FILE").ok()?;
            match std::fs::read_to_string(&path) {
                Ok(raw) => raw.trim().to_string(),
                Err(err) => {
                    warn!("failed to read sheets token file {path}: {err}");
                    return None;
                }
            }
        }
    };
    if token.is_empty() {
        warn!("sheets token is empty; spreadsheet logging disabled");
        return None;
    }
    Some(SheetConfig {
        spreadsheet_id,
        token,
    })
}

fn mail_from_env() -> Option<MailConfig> {
    let api_key = env::var("SENDGRID_API_KEY").ok().filter(|k| !k.is_empty())?;
    let sender = env::var("WFM_MAIL_FROM").ok().filter(|s| !s.is_empty())?;
    Some(MailConfig { api_key, sender })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_list_is_split_and_normalized() {
        let users = parse_user_list(" MBergeron@Example.com, jsauve@example.com ,,\n");
        assert_eq!(users, vec!["mbergeron@example.com", "jsauve@example.com"]);
    }

    #[test]
    fn empty_user_list_parses_to_nothing() {
        assert!(parse_user_list("").is_empty());
        assert!(parse_user_list(" , ,").is_empty());
    }
}
