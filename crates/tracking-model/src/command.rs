//! Records of commands delivered to an output sink.
//!
//! Used by the in-memory recording sink and by the append-only JSONL
//! command log.

use serde::{Deserialize, Serialize};

use crate::sample::TimestampNs;

/// A single command sent to an output sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkCommand {
    /// Session time the command was issued.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    #[serde(flatten)]
    pub kind: CommandKind,
}

/// Discriminated union of sink commands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandKind {
    /// Pointer moved to output coordinates.
    Move { x: f64, y: f64 },
    /// Click at the current pointer position.
    Click,
}

impl SinkCommand {
    pub fn move_to(timestamp_ns: TimestampNs, x: f64, y: f64) -> Self {
        Self {
            timestamp_ns,
            kind: CommandKind::Move { x, y },
        }
    }

    pub fn click(timestamp_ns: TimestampNs) -> Self {
        Self {
            timestamp_ns,
            kind: CommandKind::Click,
        }
    }

    pub fn is_click(&self) -> bool {
        matches!(self.kind, CommandKind::Click)
    }
}

/// Header written as the first (comment) line of a command log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandLogHeader {
    pub schema_version: String,

    /// Wall-clock time at session start (RFC 3339).
    pub epoch_wall: String,

    /// Output surface size the coordinates refer to.
    pub output_width: u32,
    pub output_height: u32,
}

/// Parse commands from JSONL content, skipping `#` header lines.
pub fn parse_commands(jsonl: &str) -> Result<Vec<SinkCommand>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_format() {
        let json = serde_json::to_string(&SinkCommand::move_to(5, 18.48, 0.0)).unwrap();
        assert!(json.contains("\"t\":5"));
        assert!(json.contains("\"type\":\"move\""));
        assert!(json.contains("\"x\":18.48"));

        let click = serde_json::to_string(&SinkCommand::click(9)).unwrap();
        assert_eq!(click, r#"{"t":9,"type":"click"}"#);
    }

    #[test]
    fn test_parse_commands_skips_header() {
        let jsonl = "# {\"schema_version\":\"1.0\"}\n{\"t\":0,\"type\":\"move\",\"x\":1.0,\"y\":2.0}\n{\"t\":1,\"type\":\"click\"}\n";
        let commands = parse_commands(jsonl).unwrap();
        assert_eq!(commands.len(), 2);
        assert!(!commands[0].is_click());
        assert!(commands[1].is_click());
    }
}
