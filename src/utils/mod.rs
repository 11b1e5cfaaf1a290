use crate::models::Message;

/// How many non-system messages survive trimming.
pub const KEEP_RECENT: usize = 8;

/// Drops old conversation history before forwarding. Every system
/// instruction is kept; of everything else only the most recent
/// [`KEEP_RECENT`] messages survive, in their original order. System
/// messages end up in front of the retained tail even if they were
/// interleaved with the conversation.
pub fn trim_history(messages: &[Message]) -> Vec<Message> {
    let (system_messages, other_messages): (Vec<Message>, Vec<Message>) =
        messages.iter().cloned().partition(Message::is_system);

    let tail_start = other_messages.len().saturating_sub(KEEP_RECENT);
    let mut trimmed = system_messages;
    trimmed.extend_from_slice(&other_messages[tail_start..]);
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    fn message(role: &str, content: &str) -> Message {
        let mut rest = Map::new();
        rest.insert("content".to_string(), Value::String(content.to_string()));
        Message {
            role: Some(role.to_string()),
            rest,
        }
    }

    fn content(message: &Message) -> &str {
        message
            .rest
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    #[test]
    fn test_short_history_is_untouched() {
        let messages = vec![
            message("system", "instructions"),
            message("user", "one"),
            message("assistant", "two"),
            message("user", "three"),
        ];
        let trimmed = trim_history(&messages);
        assert_eq!(trimmed, messages);
    }

    #[test]
    fn test_long_history_keeps_last_eight() {
        let mut messages = vec![message("system", "instructions")];
        for i in 0..12 {
            messages.push(message("user", &format!("turn {}", i)));
        }

        let trimmed = trim_history(&messages);

        assert_eq!(trimmed.len(), 1 + KEEP_RECENT);
        assert_eq!(content(&trimmed[0]), "instructions");
        assert_eq!(content(&trimmed[1]), "turn 4");
        assert_eq!(content(&trimmed[KEEP_RECENT]), "turn 11");
    }

    #[test]
    fn test_interleaved_system_messages_move_to_front() {
        let messages = vec![
            message("user", "one"),
            message("system", "first instruction"),
            message("assistant", "two"),
            message("system", "second instruction"),
        ];

        let trimmed = trim_history(&messages);

        assert_eq!(content(&trimmed[0]), "first instruction");
        assert_eq!(content(&trimmed[1]), "second instruction");
        assert_eq!(content(&trimmed[2]), "one");
        assert_eq!(content(&trimmed[3]), "two");
    }

    #[test]
    fn test_trimming_is_idempotent() {
        let mut messages = vec![message("system", "instructions")];
        for i in 0..20 {
            messages.push(message("user", &format!("turn {}", i)));
            messages.push(message("assistant", &format!("reply {}", i)));
        }
        messages.push(message("system", "late instruction"));

        let once = trim_history(&messages);
        let twice = trim_history(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_history_stays_empty() {
        assert!(trim_history(&[]).is_empty());
    }
}
