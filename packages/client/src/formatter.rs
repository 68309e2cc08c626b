//! Message formatting utilities for client display.

use fumi_server::infrastructure::dto::websocket::MessageDto;
use fumi_shared::time::timestamp_to_rfc3339;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the presence snapshot received right after connecting.
    pub fn format_presence_initial(online_names: &[String]) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str("Online now:\n");

        if online_names.is_empty() {
            output.push_str("(Nobody else is online)\n");
        } else {
            for name in online_names {
                output.push_str(&format!("{}\n", name));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format a peer-came-online notification
    pub fn format_presence_online(name: &str) -> String {
        format!("\n+ {} is now online\n", name)
    }

    /// Format a peer-went-offline notification
    pub fn format_presence_offline(name: &str) -> String {
        format!("\n- {} went offline\n", name)
    }

    /// Format an incoming direct message
    pub fn format_incoming_message(from: &str, content: &str, sent_at: i64) -> String {
        let timestamp_str = timestamp_to_rfc3339(sent_at);
        format!(
            "\n\n------------------------------------------------------------\n\
             @{}: {}\n\
             sent at {}\n\
             ------------------------------------------------------------\n",
            from, content, timestamp_str
        )
    }

    /// Format the confirmation that a sent message was persisted
    pub fn format_ack(sent_at: i64) -> String {
        let timestamp_str = timestamp_to_rfc3339(sent_at);
        format!("sent at {}\n", timestamp_str)
    }

    /// Format a send failure reported by the server
    pub fn format_message_error(reason: &str) -> String {
        format!("\n! message not sent: {}\n", reason)
    }

    /// Format a typing indicator
    pub fn format_typing_started(name: &str) -> String {
        format!("\n… {} is typing\n", name)
    }

    /// Format the end of a typing indicator
    pub fn format_typing_stopped(name: &str) -> String {
        format!("\n… {} stopped typing\n", name)
    }

    /// Format a conversation history page
    ///
    /// # Arguments
    ///
    /// * `peer_name` - display name of the conversation partner
    /// * `messages` - page in ascending time order
    /// * `local_id` - the local user's id, to label own messages as "me"
    pub fn format_history(peer_name: &str, messages: &[MessageDto], local_id: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\n\n============================================================\n\
             Conversation with {}:\n",
            peer_name
        ));

        if messages.is_empty() {
            output.push_str("(No messages yet)\n");
        } else {
            for message in messages {
                let who = if message.sender_id == local_id {
                    "me"
                } else {
                    peer_name
                };
                output.push_str(&format!(
                    "[{}] {}: {}\n",
                    timestamp_to_rfc3339(message.created_at),
                    who,
                    message.content
                ));
            }
        }

        output.push_str("============================================================\n");
        output
    }
}
