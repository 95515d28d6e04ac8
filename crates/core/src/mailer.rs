use crate::{
    error::{PortalError, Result},
    ledger::Record,
};

const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

/// Transactional mail over the SendGrid v3 API.
///
/// Construction requires both the API key and the sender address; the
/// portal treats an absent `Mailer` as "email disabled" and every send as
/// best-effort.
pub struct Mailer {
    http: reqwest::Client,
    api_key: String,
    sender: String,
}

impl Mailer {
    pub fn new(api_key: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            sender: sender.into(),
        }
    }

    pub async fn send(&self, to: &str, subject: &str, plain: &str, html: &str) -> Result<()> {
        let response = self
            .http
            .post(SENDGRID_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "personalizations": [{ "to": [{ "email": to }] }],
                "from": { "email": self.sender },
                "subject": subject,
                "content": [
                    { "type": "text/plain", "value": plain },
                    { "type": "text/html", "value": html },
                ],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(PortalError::MailApi { status, detail });
        }
        Ok(())
    }
}

fn display_advisor(record: &Record) -> &str {
    record
        .get("advisor_name")
        .filter(|name| !name.is_empty())
        .or_else(|| record.get("Advisor Name").filter(|name| !name.is_empty()))
        .unwrap_or("Advisor")
}

/// Render the "ticket received" confirmation as (plain, html).
///
/// Fields are listed in sorted-key order so the body is deterministic
/// regardless of form layout.
pub fn ticket_received_bodies(record: &Record) -> (String, String) {
    let advisor = display_advisor(record);
    let mut fields: Vec<(&str, &str)> = record.iter().collect();
    fields.sort();

    let mut plain = format!("Hi {advisor},\n\nYour WFM ticket has been received.\n\n");
    let mut html = format!(
        "<html><body><p>Hi {advisor},</p><p>Your WFM ticket has been received:</p><ul>"
    );
    for (name, value) in fields {
        plain.push_str(&format!("{name}: {value}\n"));
        html.push_str(&format!("<li><strong>{name}:</strong> {value}</li>"));
    }
    plain.push_str("\nWe'll notify you once it's resolved.\n\nThanks,\nWorkforce Management");
    html.push_str(
        "</ul><p>We'll notify you once it's resolved.</p>\
         <p>Thanks,<br>Workforce Management</p></body></html>",
    );
    (plain, html)
}

/// Render the "ticket closed" notification as (plain, html).
pub fn ticket_closed_bodies(advisor_name: &str, ticket_id: &str) -> (String, String) {
    let plain = format!(
        "Hi {advisor_name},\n\nYour WFM ticket {ticket_id} has been marked as complete.\n\n\
         If you have any questions, feel free to reach out.\n\nThanks,\nWorkforce Management"
    );
    let html = format!(
        "<html><body><p>Hi {advisor_name},</p>\
         <p>Your WFM ticket <strong>{ticket_id}</strong> has been marked as complete.</p>\
         <p>If you have any questions, feel free to reach out.</p>\
         <p>Thanks,<br>Workforce Management</p></body></html>"
    );
    (plain, html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn received_body_lists_fields_sorted() {
        let mut record = Record::new();
        record.insert("wfm_request", "Shift swap");
        record.insert("advisor_name", "Jane");
        let (plain, html) = ticket_received_bodies(&record);

        assert!(plain.starts_with("Hi Jane,"));
        let advisor_at = plain.find("advisor_name: Jane").unwrap();
        let request_at = plain.find("wfm_request: Shift swap").unwrap();
        assert!(advisor_at < request_at);
        assert!(html.contains("<li><strong>advisor_name:</strong> Jane</li>"));
    }

    #[test]
    fn received_body_falls_back_to_generic_greeting() {
        let mut record = Record::new();
        record.insert("advisor_name", "");
        record.insert("wfm_request", "Coverage");
        let (plain, _) = ticket_received_bodies(&record);
        assert!(plain.starts_with("Hi Advisor,"));
    }

    #[test]
    fn closed_body_names_the_ticket() {
        let (plain, html) = ticket_closed_bodies("Jane", "TCK-42");
        assert!(plain.contains("ticket TCK-42 has been marked as complete"));
        assert!(html.contains("<strong>TCK-42</strong>"));
    }
}
