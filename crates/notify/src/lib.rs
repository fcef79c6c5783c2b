//! `almox-notify` — requisition hand-off to the messaging channel.
//!
//! The channel is fire-and-forget: we build the message text and a pre-filled
//! deep link for the client to open; no delivery confirmation is ever
//! observed. Message literals are Portuguese because that is what the
//! stockroom staff reads.

use std::sync::Mutex;

use url::Url;

use almox_requisition::Requisition;

/// Render the human-readable requisition summary (requester, protocol,
/// itemized lines).
pub fn format_summary(requisition: &Requisition) -> String {
    let mut text = format!(
        "*📋 NOVA REQUISIÇÃO ATIVA*\n👤 *SOLICITANTE:* {}\n🆔 *PROTOCOLO:* #{}\n----------------------------\n\n",
        requisition.user_name, requisition.id
    );

    let lines: Vec<String> = requisition
        .items
        .iter()
        .map(|i| format!("🔹 {}: *{} {}*", i.product_name, i.quantity, i.unit))
        .collect();
    text.push_str(&lines.join("\n"));
    text.push_str("\n\n_Enviado via Almox_");
    text
}

/// Hand-off seam for the external messaging channel.
pub trait NotificationChannel: Send + Sync {
    /// Produce the deep link that carries `text` to the channel.
    fn notify(&self, text: &str) -> Url;
}

/// WhatsApp deep link channel (`https://wa.me/<phone>?text=...`).
#[derive(Debug, Clone)]
pub struct WhatsAppChannel {
    phone: String,
}

impl WhatsAppChannel {
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
        }
    }
}

impl NotificationChannel for WhatsAppChannel {
    fn notify(&self, text: &str) -> Url {
        let mut link = Url::parse("https://wa.me/")
            .expect("static base url")
            .join(&self.phone)
            .expect("phone is a valid path segment");
        link.query_pairs_mut().append_pair("text", text);
        link
    }
}

/// Test double that records every message it is handed.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    messages: Mutex<Vec<String>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl NotificationChannel for RecordingChannel {
    fn notify(&self, text: &str) -> Url {
        self.messages.lock().unwrap().push(text.to_string());
        Url::parse("https://wa.me/0?text=recorded").expect("static url")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use almox_catalog::ProductUnit;
    use almox_core::{ProductId, RequisitionId, UserId};
    use almox_requisition::RequisitionItem;
    use chrono::Utc;

    fn requisition() -> Requisition {
        Requisition {
            id: RequisitionId::new(),
            user_id: UserId::new(),
            user_name: "Maria Souza".to_string(),
            items: vec![
                RequisitionItem {
                    product_id: ProductId::new(),
                    product_name: "Tinta Branca".to_string(),
                    quantity: 2,
                    unit: ProductUnit::Lt,
                },
                RequisitionItem {
                    product_id: ProductId::new(),
                    product_name: "Areia".to_string(),
                    quantity: 3,
                    unit: ProductUnit::Un,
                },
            ],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn summary_names_requester_protocol_and_lines() {
        let req = requisition();
        let text = format_summary(&req);
        assert!(text.contains("Maria Souza"));
        assert!(text.contains(&format!("#{}", req.id)));
        assert!(text.contains("🔹 Tinta Branca: *2 LT*"));
        assert!(text.contains("🔹 Areia: *3 UN*"));
    }

    #[test]
    fn whatsapp_link_targets_the_configured_phone() {
        let channel = WhatsAppChannel::new("5500000000000");
        let link = channel.notify("olá mundo & etc");
        assert_eq!(link.host_str(), Some("wa.me"));
        assert_eq!(link.path(), "/5500000000000");
        // The text must round-trip through the query encoding.
        let (_, text) = link
            .query_pairs()
            .find(|(k, _)| k == "text")
            .expect("text param present");
        assert_eq!(text, "olá mundo & etc");
    }

    #[test]
    fn recording_channel_captures_messages() {
        let channel = RecordingChannel::new();
        channel.notify("primeira");
        channel.notify("segunda");
        assert_eq!(channel.messages(), ["primeira", "segunda"]);
    }
}
