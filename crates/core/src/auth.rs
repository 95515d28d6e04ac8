/// Normalize a submitted email address for allow-list membership checks
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Static set of email addresses permitted to authenticate.
///
/// Entries are normalized on construction, so membership is an exact match
/// on the trimmed, lowercased address.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    emails: Vec<String>,
}

impl AllowList {
    pub fn new<I>(emails: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|email| normalize_email(email.as_ref()))
            .filter(|email| !email.is_empty())
            .collect();
        Self { emails }
    }

    pub fn contains(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.emails.iter().any(|allowed| *allowed == email)
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_case_and_whitespace_insensitive() {
        let list = AllowList::new(["mbergeron@example.com", "jsauve@example.com"]);
        assert!(list.contains("mbergeron@example.com"));
        assert!(list.contains("  MBergeron@Example.COM "));
        assert!(list.contains("jsauve@example.com"));
    }

    #[test]
    fn unlisted_email_is_rejected() {
        let list = AllowList::new(["mbergeron@example.com"]);
        assert!(!list.contains("notallowed@x.com"));
        assert!(!list.contains(""));
    }

    #[test]
    fn entries_are_normalized_on_construction() {
        let list = AllowList::new(["  DDevenny@Example.com\n"]);
        assert!(list.contains("ddevenny@example.com"));
    }
}
