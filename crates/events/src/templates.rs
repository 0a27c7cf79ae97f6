//! Transactional email templates.
//!
//! Every template returns a complete [`EmailMessage`] with matching plain
//! text and HTML bodies. User-supplied text is HTML-escaped.

use crate::delivery::EmailMessage;

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn link(app_url: &str, path: &str, token: &str) -> String {
    format!("{}{path}?token={token}", app_url.trim_end_matches('/'))
}

fn layout(heading: &str, body_html: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body style=\"font-family:sans-serif;color:#222\">\
         <h2>{heading}</h2>{body_html}\
         <p style=\"color:#888;font-size:12px\">Fitback</p></body></html>"
    )
}

/// Sent after signup and on resend requests.
pub fn verification_email(to: &str, name: &str, app_url: &str, token: &str) -> EmailMessage {
    let url = link(app_url, "/auth/verify-email", token);
    EmailMessage {
        to: to.to_string(),
        subject: "Verify your Fitback email".to_string(),
        text_body: format!(
            "Hi {name},\n\nConfirm your email address by opening this link:\n{url}\n\n\
             The link expires in 24 hours."
        ),
        html_body: layout(
            "Verify your email",
            &format!(
                "<p>Hi {},</p><p>Confirm your email address to start earning cashback.</p>\
                 <p><a href=\"{url}\">Verify email</a></p>\
                 <p>The link expires in 24 hours.</p>",
                escape_html(name)
            ),
        ),
    }
}

/// Sent once the address is verified.
pub fn welcome_email(to: &str, name: &str, app_url: &str) -> EmailMessage {
    let app_url = app_url.trim_end_matches('/');
    EmailMessage {
        to: to.to_string(),
        subject: "Welcome to Fitback".to_string(),
        text_body: format!(
            "Hi {name},\n\nYour email is verified. Record a try-on video of your next \
             purchase to earn cashback:\n{app_url}"
        ),
        html_body: layout(
            "Welcome to Fitback",
            &format!(
                "<p>Hi {},</p><p>Your email is verified. Record a try-on video of your next \
                 purchase to earn cashback.</p><p><a href=\"{app_url}\">Open Fitback</a></p>",
                escape_html(name)
            ),
        ),
    }
}

/// Sent on a forgot-password request for an existing account.
pub fn password_reset_email(to: &str, name: &str, app_url: &str, token: &str) -> EmailMessage {
    let url = link(app_url, "/auth/reset-password", token);
    EmailMessage {
        to: to.to_string(),
        subject: "Reset your Fitback password".to_string(),
        text_body: format!(
            "Hi {name},\n\nReset your password with this link:\n{url}\n\n\
             The link expires in 1 hour. If you did not ask for this, ignore this email."
        ),
        html_body: layout(
            "Reset your password",
            &format!(
                "<p>Hi {},</p><p><a href=\"{url}\">Choose a new password</a></p>\
                 <p>The link expires in 1 hour. If you did not ask for this, ignore this email.</p>",
                escape_html(name)
            ),
        ),
    }
}

/// Sent to the owner when a submission is approved.
pub fn feedback_approved_email(to: &str, name: &str, brand: &str, amount: i64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Your Fitback feedback was approved".to_string(),
        text_body: format!(
            "Hi {name},\n\nYour feedback for {brand} was approved and {amount} points \
             were added to your wallet."
        ),
        html_body: layout(
            "Feedback approved",
            &format!(
                "<p>Hi {},</p><p>Your feedback for <strong>{}</strong> was approved and \
                 <strong>{amount}</strong> points were added to your wallet.</p>",
                escape_html(name),
                escape_html(brand)
            ),
        ),
    }
}

/// Sent to the owner when a submission is rejected, including the reason.
pub fn feedback_rejected_email(to: &str, name: &str, brand: &str, notes: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Your Fitback feedback needs attention".to_string(),
        text_body: format!(
            "Hi {name},\n\nYour feedback for {brand} was not approved.\n\nReason: {notes}"
        ),
        html_body: layout(
            "Feedback not approved",
            &format!(
                "<p>Hi {},</p><p>Your feedback for <strong>{}</strong> was not approved.</p>\
                 <p>Reason: {}</p>",
                escape_html(name),
                escape_html(brand),
                escape_html(notes)
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_link_carries_token() {
        let msg = verification_email("a@example.com", "Alice", "https://fitback.app/", "tok123");
        assert!(msg
            .text_body
            .contains("https://fitback.app/auth/verify-email?token=tok123"));
        assert!(msg
            .html_body
            .contains("href=\"https://fitback.app/auth/verify-email?token=tok123\""));
        assert_eq!(msg.to, "a@example.com");
    }

    #[test]
    fn reset_link_carries_token() {
        let msg = password_reset_email("a@example.com", "Alice", "http://localhost:3000", "r1");
        assert!(msg
            .text_body
            .contains("http://localhost:3000/auth/reset-password?token=r1"));
    }

    #[test]
    fn user_text_is_escaped_in_html() {
        let msg = feedback_rejected_email(
            "a@example.com",
            "<b>Eve</b>",
            "Nike",
            "video shows <script>",
        );
        assert!(msg.html_body.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(msg.html_body.contains("video shows &lt;script&gt;"));
        assert!(msg.text_body.contains("Reason: video shows <script>"));
    }

    #[test]
    fn approval_mentions_amount() {
        let msg = feedback_approved_email("a@example.com", "Alice", "Nike", 50);
        assert!(msg.text_body.contains("50 points"));
        assert!(msg.html_body.contains("Nike"));
    }
}
