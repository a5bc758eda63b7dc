//! Messages sent when someone joins the mailing list.

use crate::mailer::OutboundEmail;

pub const WELCOME_SUBJECT: &str = "Welcome to the OERC Newsletter!";

pub fn welcome_email(from: &str, subscriber: &str) -> OutboundEmail {
    OutboundEmail {
        from: from.to_string(),
        to: vec![subscriber.to_string()],
        subject: WELCOME_SUBJECT.to_string(),
        html: concat!(
            "<h1>Welcome!</h1>",
            "<p>Thanks for subscribing to the OERC newsletter. You will receive ",
            "updates on research findings, curated resources, and upcoming ",
            "conferences and workshops.</p>"
        )
        .to_string(),
    }
}

/// Tell the site admin that `subscriber` joined.
pub fn admin_notification(from: &str, admin: &str, subscriber: &str) -> OutboundEmail {
    let escaped = escape_html(subscriber);
    OutboundEmail {
        from: from.to_string(),
        to: vec![admin.to_string()],
        subject: format!("New newsletter subscriber: {subscriber}"),
        html: format!("<p>A new subscriber joined the mailing list: <strong>{escaped}</strong></p>"),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_goes_to_subscriber_only() {
        let m = welcome_email("OERC <info@oerc.ca>", "new@x.ca");
        assert_eq!(m.to, vec!["new@x.ca"]);
        assert_eq!(m.subject, WELCOME_SUBJECT);
    }

    #[test]
    fn admin_notification_escapes_address() {
        let m = admin_notification("OERC <info@oerc.ca>", "admin@oerc.ca", "<b>@x.ca");
        assert_eq!(m.to, vec!["admin@oerc.ca"]);
        assert!(m.html.contains("&lt;b&gt;@x.ca"));
        assert!(!m.html.contains("<b>@"));
    }
}
