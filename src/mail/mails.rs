use crate::mail::sendmail::send_email;
use crate::models::ContactMessage;

/// Notify the agency inbox that a new contact message arrived.
///
/// Field values are HTML-escaped; the message body comes straight from the
/// public form.
pub async fn send_contact_notification_email(
    to_email: &str,
    message: &ContactMessage,
) -> Result<(), Box<dyn std::error::Error>> {
    let subject = format!("Yeni iletişim mesajı: {}", message.name);

    let html_body = format!(
        "<h2>Yeni iletişim mesajı</h2>\
         <p><strong>Ad:</strong> {name}</p>\
         <p><strong>E-posta:</strong> {email}</p>\
         <p><strong>Telefon:</strong> {phone}</p>\
         <p><strong>Konu:</strong> {subject}</p>\
         <p><strong>Mesaj:</strong></p>\
         <p>{body}</p>",
        name = escape(&message.name),
        email = escape(&message.email),
        phone = escape(message.phone.as_deref().unwrap_or("-")),
        subject = escape(message.subject.as_deref().unwrap_or("-")),
        body = escape(&message.message),
    );

    send_email(to_email, &subject, html_body).await
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::escape;

    #[test]
    fn escapes_html_in_form_fields() {
        assert_eq!(escape("<script>alert(1)</script>"), "&lt;script&gt;alert(1)&lt;/script&gt;");
        assert_eq!(escape("A & B"), "A &amp; B");
    }
}
