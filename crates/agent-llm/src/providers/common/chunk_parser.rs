//! Incremental parser for `data: ...` framed completion streams.
//!
//! Transport chunks do not respect line boundaries, so bytes are buffered until a
//! newline arrives. Each complete line is inspected on its own:
//! - `data: [DONE]` ends the stream;
//! - `data: {json}` yields `choices[0].delta.content` when present;
//! - malformed JSON, comments and other SSE fields are skipped.

use serde_json::Value;

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Delta(String),
    Done,
}

#[derive(Debug, Default)]
pub struct IncrementalChunkParser {
    pending: Vec<u8>,
    done: bool,
}

impl IncrementalChunkParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a `[DONE]` line has been seen. Everything after it is ignored.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one transport chunk and return every complete line it finished.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ParsedLine> {
        if self.done {
            return Vec::new();
        }

        self.pending.extend_from_slice(chunk);

        let mut parsed = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            if let Some(item) = self.parse_line(&line) {
                parsed.push(item);
                if self.done {
                    self.pending.clear();
                    break;
                }
            }
        }

        parsed
    }

    /// Flush a trailing line that was never newline-terminated.
    pub fn finish(&mut self) -> Vec<ParsedLine> {
        if self.done || self.pending.is_empty() {
            return Vec::new();
        }

        let line = std::mem::take(&mut self.pending);
        self.parse_line(&line).into_iter().collect()
    }

    fn parse_line(&mut self, raw: &[u8]) -> Option<ParsedLine> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let payload = if let Some(data) = line.strip_prefix("data:") {
            data.trim()
        } else if line.starts_with('{') {
            line
        } else {
            return None;
        };

        if payload == DONE_SENTINEL {
            self.done = true;
            return Some(ParsedLine::Done);
        }

        let value: Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(error) => {
                log::trace!("Skipping malformed stream line ({}): {}", error, payload);
                return None;
            }
        };

        value["choices"][0]["delta"]["content"]
            .as_str()
            .filter(|content| !content.is_empty())
            .map(|content| ParsedLine::Delta(content.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_line(content: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    #[test]
    fn parses_deltas_and_done() {
        let mut parser = IncrementalChunkParser::new();
        let chunk = format!("{}\n{}\ndata: [DONE]\n\n", delta_line("Hel"), delta_line("lo"));

        let parsed = parser.feed(chunk.as_bytes());

        assert_eq!(
            parsed,
            vec![
                ParsedLine::Delta("Hel".to_string()),
                ParsedLine::Delta("lo".to_string()),
                ParsedLine::Done,
            ]
        );
        assert!(parser.is_done());
    }

    #[test]
    fn reassembles_lines_split_across_chunks() {
        let mut parser = IncrementalChunkParser::new();
        let line = delta_line("Portland");
        let (head, tail) = line.as_bytes().split_at(17);

        assert!(parser.feed(head).is_empty());
        assert_eq!(
            parser.feed(tail),
            vec![ParsedLine::Delta("Portland".to_string())]
        );
    }

    #[test]
    fn reassembles_multibyte_characters_split_across_chunks() {
        let mut parser = IncrementalChunkParser::new();
        let line = delta_line("café");
        let bytes = line.as_bytes();
        let split = line.find('é').unwrap() + 1;

        assert!(parser.feed(&bytes[..split]).is_empty());
        assert_eq!(
            parser.feed(&bytes[split..]),
            vec![ParsedLine::Delta("café".to_string())]
        );
    }

    #[test]
    fn skips_malformed_json_lines() {
        let mut parser = IncrementalChunkParser::new();
        let chunk = format!("data: {{not json\n{}", delta_line("ok"));

        assert_eq!(
            parser.feed(chunk.as_bytes()),
            vec![ParsedLine::Delta("ok".to_string())]
        );
    }

    #[test]
    fn skips_comments_role_only_and_empty_deltas() {
        let mut parser = IncrementalChunkParser::new();
        let chunk = concat!(
            ": keep-alive\n",
            "event: message\n",
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}\n",
            "data: {\"choices\":[]}\n",
        );

        assert!(parser.feed(chunk.as_bytes()).is_empty());
    }

    #[test]
    fn ignores_everything_after_done() {
        let mut parser = IncrementalChunkParser::new();
        let chunk = format!("data: [DONE]\n{}", delta_line("late"));

        assert_eq!(parser.feed(chunk.as_bytes()), vec![ParsedLine::Done]);
        assert!(parser.feed(delta_line("later").as_bytes()).is_empty());
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut parser = IncrementalChunkParser::new();
        let line = delta_line("tail");
        let unterminated = line.trim_end();

        assert!(parser.feed(unterminated.as_bytes()).is_empty());
        assert_eq!(
            parser.finish(),
            vec![ParsedLine::Delta("tail".to_string())]
        );
    }

    #[test]
    fn handles_crlf_line_endings() {
        let mut parser = IncrementalChunkParser::new();
        let chunk = "data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\r\ndata: [DONE]\r\n";

        assert_eq!(
            parser.feed(chunk.as_bytes()),
            vec![ParsedLine::Delta("hi".to_string()), ParsedLine::Done]
        );
    }
}
