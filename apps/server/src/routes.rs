use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{error, info, warn};
use wfm_core::{
    CLOSED_AT, PortalError, Record, SUBMITTED_AT, SUBMITTED_BY, normalize_email,
    ticket_closed_bodies, ticket_received_bodies, timestamp_now,
};

use crate::{pages, session, state::AppState};

/// Catch-all request failure: log the chain, answer 500 with the message.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(form_page))
        .route("/login", get(login_page).post(login))
        .route("/submit", post(submit))
        .route("/close_ticket", post(close_ticket))
        .route("/logout", get(logout))
        .with_state(state)
}

async fn login_page() -> Html<&'static str> {
    Html(pages::LOGIN)
}

#[derive(Deserialize)]
struct LoginForm {
    #[serde(default)]
    email: String,
}

async fn login(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    let email = normalize_email(&form.email);
    if !state.allow_list.contains(&email) {
        warn!("login rejected for {email:?}");
        return (
            StatusCode::FORBIDDEN,
            "Access denied. You are not authorized to use this portal.",
        )
            .into_response();
    }

    let id = state.sessions.create(&email);
    info!("login accepted for {email}");
    (
        AppendHeaders([(header::SET_COOKIE, session::session_cookie(id))]),
        Redirect::to("/"),
    )
        .into_response()
}

async fn form_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if state.current_user(&headers).is_none() {
        return Redirect::to("/login").into_response();
    }
    Html(pages::FORM).into_response()
}

async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(user_email) = state.current_user(&headers) else {
        return Ok(Redirect::to("/login").into_response());
    };

    // Collect text parts in arrival order; each file part lands in the
    // upload sink and contributes its stored path + original name.
    let mut record = Record::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(file_name) if !file_name.is_empty() => {
                let data = field.bytes().await?;
                let stored = state.uploads.store(&file_name, &data).await;
                record.insert(format!("{name}_saved_path"), stored.stored_path);
                record.insert(format!("{name}_orig_name"), stored.original_name);
            }
            _ => record.insert(name, field.text().await?),
        }
    }

    let advisor_missing = record.get("advisor_name").unwrap_or_default().trim().is_empty();
    let request_missing = record.get("wfm_request").unwrap_or_default().trim().is_empty();
    if advisor_missing || request_missing {
        return Ok((
            StatusCode::BAD_REQUEST,
            "Advisor name and Request Type are required.",
        )
            .into_response());
    }

    record.insert(SUBMITTED_BY, user_email.clone());
    record.insert(SUBMITTED_AT, timestamp_now());
    record.insert(CLOSED_AT, "");

    // Persistence is best-effort: a sheet failure is logged and the
    // submitter still gets the confirmation page.
    match &state.ledger {
        Some(ledger) => {
            if let Err(err) = ledger.append(&record).await {
                error!("failed to append submission to the sheet: {err}");
            }
        }
        None => warn!("spreadsheet not configured; submission not persisted"),
    }

    if let Some(mailer) = &state.mailer {
        let (plain, html) = ticket_received_bodies(&record);
        if let Err(err) = mailer
            .send(&user_email, "WFM Ticket Received", &plain, &html)
            .await
        {
            error!("confirmation email failed: {err}");
        }
    }

    Ok(Html(pages::CONFIRMATION).into_response())
}

#[derive(Deserialize)]
struct CloseForm {
    #[serde(default)]
    ticket_id: String,
}

async fn close_ticket(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<CloseForm>,
) -> Result<Response, AppError> {
    if state.current_user(&headers).is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let ticket_id = form.ticket_id.trim();
    if ticket_id.is_empty() {
        return Ok((StatusCode::BAD_REQUEST, "Missing ticket ID").into_response());
    }

    let Some(ledger) = &state.ledger else {
        return Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            PortalError::SheetNotConfigured.to_string(),
        )
            .into_response());
    };

    match ledger.close(ticket_id, &timestamp_now()).await {
        Ok(closed) => {
            info!("ticket {ticket_id} closed at row {}", closed.row);
            if let Some(mailer) = &state.mailer {
                if !closed.submitted_by.is_empty() {
                    let (plain, html) = ticket_closed_bodies(&closed.advisor_name, ticket_id);
                    if let Err(err) = mailer
                        .send(&closed.submitted_by, "WFM Ticket Closed", &plain, &html)
                        .await
                    {
                        error!("closure email failed: {err}");
                    }
                }
            }
            Ok((StatusCode::OK, "Ticket closed.").into_response())
        }
        Err(PortalError::TicketNotFound { .. }) => {
            Ok((StatusCode::NOT_FOUND, "Ticket not found.").into_response())
        }
        Err(err) => Err(err.into()),
    }
}

async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(id) = session::session_id_from_headers(&headers) {
        state.sessions.remove(id);
    }
    (
        AppendHeaders([(header::SET_COOKIE, session::clear_session_cookie())]),
        Redirect::to("/login"),
    )
        .into_response()
}
