//! Frame Decoder - turns a raw byte stream into discrete event records.
//!
//! Records are separated by a blank line. Both `\n` and `\r\n` line endings
//! are accepted, so `\n\n`, `\r\n\r\n` and the mixed `\n\r\n` all end a
//! record. Splitting happens on the raw bytes before any text decoding, so a
//! chunk boundary that falls inside a multi-byte character never corrupts a
//! record: the partial bytes simply stay buffered until the rest arrives.
//!
//! Inside a record each line is classified by prefix:
//!
//! ```text
//! event: frame.updated        <- sets the name (last one wins)
//! data: {"id":"f1"}           <- payload line, marker + one space stripped
//! id: 42                      <- unrecognized, ignored
//! ```

use bytes::BytesMut;

use super::event_record::{EventRecord, DEFAULT_EVENT_NAME};

/// Longest terminator (`\n\r\n`) minus its leading line feed.
const TERMINATOR_LOOKAHEAD: usize = 2;

const EVENT_MARKER: &str = "event:";
const DATA_MARKER: &str = "data:";

/// Buffer-owning decoder used by a stream session.
///
/// Bytes are appended with [`FrameDecoder::push`]; every complete record is
/// returned in FIFO order and removed from the buffer, leaving at most one
/// partial trailing record behind. The decoder remembers how far the partial
/// record has been searched, so each byte is scanned a bounded number of
/// times no matter how small the chunks are.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
    scan_from: usize,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and extracts every record it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<EventRecord> {
        self.buffer.extend_from_slice(chunk);
        extract_from(&mut self.buffer, &mut self.scan_from)
    }

    /// Number of buffered bytes not yet forming a complete record.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drops any partially buffered record.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scan_from = 0;
    }
}

/// Extracts all complete records from `buffer`, leaving the remainder in place.
///
/// Blocks made only of blank lines (keep-alive padding) produce no record.
pub fn extract(buffer: &mut BytesMut) -> Vec<EventRecord> {
    extract_from(buffer, &mut 0)
}

fn extract_from(buffer: &mut BytesMut, scan_from: &mut usize) -> Vec<EventRecord> {
    let mut records = Vec::new();

    loop {
        match find_terminator(buffer, *scan_from) {
            Some((end, len)) => {
                let block = buffer.split_to(end + len);
                *scan_from = 0;
                let body = &block[..end];
                if body.iter().all(|b| *b == b'\r' || *b == b'\n') {
                    continue;
                }
                records.push(decode_record(body));
            }
            None => {
                // Line feeds too close to the end may still start a terminator.
                *scan_from = buffer.len().saturating_sub(TERMINATOR_LOOKAHEAD);
                return records;
            }
        }
    }
}

/// Finds the first blank-line terminator at or after `from`.
///
/// Returns the record length and the terminator length. A terminator is a
/// line feed followed by an empty line (`\n` or `\r\n`).
fn find_terminator(buffer: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while let Some(offset) = buffer.get(i..)?.iter().position(|b| *b == b'\n') {
        let at = i + offset;
        match (buffer.get(at + 1), buffer.get(at + 2)) {
            (Some(b'\n'), _) => return Some((at, 2)),
            (Some(b'\r'), Some(b'\n')) => return Some((at, 3)),
            _ => i = at + 1,
        }
    }
    None
}

/// Decodes one separator-less record body.
///
/// Invalid UTF-8 yields an empty default record rather than an error.
fn decode_record(body: &[u8]) -> EventRecord {
    let text = match std::str::from_utf8(body) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "Dropping undecodable event record");
            return EventRecord::default();
        }
    };

    let mut name: Option<String> = None;
    let mut payload_lines = Vec::new();

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(value) = line.strip_prefix(EVENT_MARKER) {
            let value = value.trim();
            name = (!value.is_empty()).then(|| value.to_string());
        } else if let Some(value) = line.strip_prefix(DATA_MARKER) {
            let value = value.strip_prefix(' ').unwrap_or(value);
            payload_lines.push(value.to_string());
        }
    }

    EventRecord {
        name: name.unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string()),
        payload_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode_all(input: &[u8]) -> (Vec<EventRecord>, usize) {
        let mut decoder = FrameDecoder::new();
        let records = decoder.push(input);
        (records, decoder.pending_len())
    }

    #[test]
    fn record_without_event_line_is_named_message() {
        let (records, _) = decode_all(b"data: hello\n\n");
        assert_eq!(records, vec![EventRecord::with_data("message", "hello")]);
    }

    #[test]
    fn multiple_data_lines_join_in_order() {
        let (records, _) = decode_all(b"event: x\ndata: one\ndata: two\ndata:three\n\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "x");
        assert_eq!(records[0].data(), "one\ntwo\nthree");
    }

    #[test]
    fn only_a_single_leading_space_is_stripped() {
        let (records, _) = decode_all(b"data:   indented\n\n");
        assert_eq!(records[0].payload_lines, vec!["  indented".to_string()]);
    }

    #[test]
    fn last_event_line_wins() {
        let (records, _) = decode_all(b"event: first\nevent: second\ndata: {}\n\n");
        assert_eq!(records[0].name, "second");
    }

    #[test]
    fn unrecognized_lines_are_ignored() {
        let (records, _) = decode_all(b": keep-alive\nid: 7\nretry: 100\nevent: y\ndata: z\n\n");
        assert_eq!(records, vec![EventRecord::with_data("y", "z")]);
    }

    #[test]
    fn partial_record_stays_buffered() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"event: a\ndata: 1\n").is_empty());
        assert_eq!(decoder.pending_len(), 17);

        let records = decoder.push(b"\nevent: b\n");
        assert_eq!(records, vec![EventRecord::with_data("a", "1")]);
        assert_eq!(decoder.pending_len(), "event: b\n".len());
    }

    #[test]
    fn records_come_out_in_fifo_order() {
        let (records, pending) =
            decode_all(b"event: a\n\nevent: b\n\nevent: c\n\nevent: d");
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(pending, "event: d".len());
    }

    #[test]
    fn carriage_returns_are_stripped_from_lines() {
        let (records, _) = decode_all(b"event: crlf\r\ndata: v\r\n\n");
        assert_eq!(records, vec![EventRecord::with_data("crlf", "v")]);
    }

    #[test]
    fn invalid_utf8_yields_empty_record() {
        let (records, pending) = decode_all(b"event: \xff\xfe\ndata: x\n\nevent: ok\n\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], EventRecord::default());
        assert_eq!(records[1].name, "ok");
        assert_eq!(pending, 0);
    }

    #[test]
    fn blank_padding_produces_no_records() {
        let (records, pending) = decode_all(b"\n\n\n\n");
        assert!(records.is_empty());
        assert_eq!(pending, 0);
    }

    #[test]
    fn multibyte_character_split_across_chunks_survives() {
        let input = "event: note\ndata: caf\u{e9} \u{1f3ac}\n\n".as_bytes();
        let split = input.len() - 4;

        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(&input[..split]).is_empty());
        let records = decoder.push(&input[split..]);

        assert_eq!(records[0].data(), "caf\u{e9} \u{1f3ac}");
    }

    #[test]
    fn clear_discards_partial_record() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"event: half");
        decoder.clear();
        assert_eq!(decoder.pending_len(), 0);
        let records = decoder.push(b"event: whole\n\n");
        assert_eq!(records[0].name, "whole");
    }

    #[test]
    fn crlf_blank_line_ends_a_record() {
        let (records, pending) =
            decode_all(b"event: connected\r\n\r\nevent: frame.updated\r\ndata: {}\r\n\r\n");
        assert_eq!(
            records,
            vec![
                EventRecord::new("connected", vec![]),
                EventRecord::with_data("frame.updated", "{}"),
            ]
        );
        assert_eq!(pending, 0);
    }

    #[test]
    fn mixed_line_endings_end_a_record() {
        let (records, pending) = decode_all(b"event: a\n\r\nevent: b\r\n\ndata: x");
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(pending, "data: x".len());
    }

    #[test]
    fn crlf_terminator_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"event: a\r\n").is_empty());
        assert!(decoder.push(b"\r").is_empty());
        let records = decoder.push(b"\nevent: b");
        assert_eq!(records, vec![EventRecord::new("a", vec![])]);
        assert_eq!(decoder.pending_len(), "event: b".len());
    }

    #[test]
    fn search_resumes_where_previous_push_stopped() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"data: ");
        for _ in 0..100 {
            decoder.push(&[b'x'; 64]);
        }
        assert_eq!(decoder.scan_from, decoder.pending_len() - TERMINATOR_LOOKAHEAD);

        let records = decoder.push(b"\n\n");
        assert_eq!(records.len(), 1);
        assert_eq!(decoder.scan_from, 0);
    }

    #[test]
    fn large_record_in_small_chunks_decodes_in_linear_time() {
        let chunk = [b'x'; 1024];
        let mut decoder = FrameDecoder::new();
        let started = std::time::Instant::now();

        decoder.push(b"data: ");
        for _ in 0..(8 * 1024) {
            assert!(decoder.push(&chunk).is_empty());
        }
        let records = decoder.push(b"\n\n");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].payload_lines[0].len(), 8 * 1024 * 1024);
        // Rescanning from the start on every push takes minutes here.
        assert!(
            started.elapsed() < std::time::Duration::from_secs(10),
            "decoding took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn extract_leaves_partial_record_in_buffer() {
        let mut buffer = BytesMut::from(&b"event: a\r\n\r\nevent: b\r\n"[..]);
        let records = extract(&mut buffer);
        assert_eq!(records, vec![EventRecord::new("a", vec![])]);
        assert_eq!(&buffer[..], b"event: b\r\n");
    }

    #[test]
    fn clear_resets_search_position() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"data: partial record");
        decoder.clear();
        assert_eq!(decoder.scan_from, 0);
        assert_eq!(decoder.push(b"event: z\n\n")[0].name, "z");
    }

    fn record_text() -> impl Strategy<Value = String> {
        (
            proptest::option::of("[a-z][a-z._]{0,12}"),
            proptest::collection::vec("[^\r\n]{0,16}", 0..4),
        )
            .prop_map(|(name, data)| {
                let mut text = String::new();
                if let Some(name) = name {
                    text.push_str(&format!("event: {}\n", name));
                }
                for line in data {
                    text.push_str(&format!("data: {}\n", line));
                }
                text.push('\n');
                text
            })
    }

    proptest! {
        #[test]
        fn chunk_boundaries_do_not_change_output(
            records in proptest::collection::vec(record_text(), 0..6),
            trailing in "[^\r\n]{0,10}",
            cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..10),
        ) {
            let input = format!("{}{}", records.concat(), trailing).into_bytes();
            let (expected, expected_pending) = decode_all(&input);

            let mut positions: Vec<usize> = cuts.iter().map(|i| i.index(input.len() + 1)).collect();
            positions.sort_unstable();

            let mut decoder = FrameDecoder::new();
            let mut incremental = Vec::new();
            let mut start = 0;
            for pos in positions {
                incremental.extend(decoder.push(&input[start..pos]));
                start = pos;
            }
            incremental.extend(decoder.push(&input[start..]));

            prop_assert_eq!(incremental, expected);
            prop_assert_eq!(decoder.pending_len(), expected_pending);
        }

        #[test]
        fn crlf_stream_decodes_like_lf_stream(
            records in proptest::collection::vec(record_text(), 0..6),
            cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..10),
        ) {
            let lf = records.concat().into_bytes();
            let crlf = records.concat().replace('\n', "\r\n").into_bytes();
            let (expected, _) = decode_all(&lf);
            let (_, expected_pending) = decode_all(&crlf);

            let mut positions: Vec<usize> = cuts.iter().map(|i| i.index(crlf.len() + 1)).collect();
            positions.sort_unstable();

            let mut decoder = FrameDecoder::new();
            let mut incremental = Vec::new();
            let mut start = 0;
            for pos in positions {
                incremental.extend(decoder.push(&crlf[start..pos]));
                start = pos;
            }
            incremental.extend(decoder.push(&crlf[start..]));

            prop_assert_eq!(incremental, expected);
            prop_assert_eq!(decoder.pending_len(), expected_pending);
        }
    }
}
