use crate::{Contact, Reminder};

const DOSAGE_FALLBACK: &str = "As prescribed";

/// A composed notification ready to be handed to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationMessage {
    /// Deliverable address of the recipient
    pub to: String,
    pub recipient_name: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl NotificationMessage {
    pub fn medication_reminder(reminder: &Reminder, contact: &Contact, sender_name: &str) -> Self {
        let dosage = reminder
            .dosage
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(DOSAGE_FALLBACK);
        let time = reminder.time.to_string();

        let subject = format!("💊 Medicine Reminder: {}", reminder.medicine_name);

        let html_body = format!(
            r#"<div style="font-family: sans-serif; max-width: 600px; margin: auto; padding: 20px; border: 1px solid #eee; border-radius: 10px;">
  <h2 style="color: #4f46e5;">Medicine Reminder</h2>
  <p>Hi <strong>{name}</strong>,</p>
  <p>It is almost time to take your medication.</p>
  <div style="background: #f9fafb; padding: 15px; border-radius: 8px; margin: 20px 0;">
    <p style="margin: 5px 0;"><strong>Medicine:</strong> {medicine}</p>
    <p style="margin: 5px 0;"><strong>Dosage:</strong> {dosage}</p>
    <p style="margin: 5px 0;"><strong>Time:</strong> {time}</p>
  </div>
  <p>Staying on schedule gives your treatment the best chance to work.</p>
  <hr style="border: 0; border-top: 1px solid #eee; margin: 20px 0;">
  <p style="font-size: 12px; color: #6b7280;">{sender} • Automated Notification</p>
</div>"#,
            name = escape_html(&contact.display_name),
            medicine = escape_html(&reminder.medicine_name),
            dosage = escape_html(dosage),
            time = time,
            sender = escape_html(sender_name),
        );

        let text_body = format!(
            "Hi {},\n\nIt is almost time to take your medication.\n\nMedicine: {}\nDosage: {}\nTime: {}\n\n{} - Automated Notification\n",
            contact.display_name, reminder.medicine_name, dosage, time, sender_name
        );

        Self {
            to: contact.address.clone(),
            recipient_name: contact.display_name.clone(),
            subject,
            html_body,
            text_body,
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
