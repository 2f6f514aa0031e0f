//! Decoded unit of the event stream.

/// Name given to records that carry no `event:` line.
pub const DEFAULT_EVENT_NAME: &str = "message";

/// One decoded record: an event name plus its `data:` lines in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Event name, `"message"` when the record had no name line.
    pub name: String,
    /// Payload lines, already stripped of the data marker.
    pub payload_lines: Vec<String>,
}

impl EventRecord {
    /// Creates a record with the given name and payload lines.
    pub fn new(name: impl Into<String>, payload_lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            payload_lines,
        }
    }

    /// Creates a record with a single payload line.
    pub fn with_data(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self::new(name, vec![data.into()])
    }

    /// Returns the payload lines joined with `\n`.
    pub fn data(&self) -> String {
        self.payload_lines.join("\n")
    }
}

impl Default for EventRecord {
    fn default() -> Self {
        Self {
            name: DEFAULT_EVENT_NAME.to_string(),
            payload_lines: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_named_message() {
        let record = EventRecord::default();
        assert_eq!(record.name, "message");
        assert!(record.payload_lines.is_empty());
    }

    #[test]
    fn data_joins_lines_with_newline() {
        let record = EventRecord::new("x", vec!["a".into(), "b".into(), "".into()]);
        assert_eq!(record.data(), "a\nb\n");
    }
}
