//! Request parsing for the portal.
//!
//! The portal reads one tiny request from one client at a time, and assumes
//! the peer may be slow, silent, or hostile. Every read is bounded three
//! ways: a per-line byte limit, an iteration cap, and a wall-clock deadline.
//! Input that does not parse within the bounds is simply not answered.

use std::io::{self, Read};
use std::time::Instant;

/// Upper bound on one request or header line.
pub const MAX_LINE_BYTES: usize = 512;

/// Hard stop on read passes for one connection.
pub const MAX_READ_ITERATIONS: u32 = 5000;

/// Method and path from the request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub path: String,
}

impl RequestHead {
    /// Parse `"METHOD PATH ..."`. Returns `None` unless both tokens are
    /// present.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let method = parts.next()?.to_string();
        let path = parts.next()?.to_string();
        Some(Self { method, path })
    }
}

/// Positional split of the submitted form body: the first value sits between
/// the first `=` and the first `&`, the second value follows the `=` after
/// that `&`. Field names are ignored and nothing is URL-decoded.
pub fn parse_form_pair(body: &str) -> Option<(String, String)> {
    let (first, rest) = body.split_once('&')?;
    let (_, first_value) = first.split_once('=')?;
    let (_, second_value) = rest.split_once('=')?;
    Some((first_value.to_string(), second_value.to_string()))
}

/// Line reader over a stream with a short OS read timeout.
///
/// Yields newline-terminated lines with the terminator stripped (one
/// trailing CR included). Once the peer half-closes, the deadline passes,
/// or the iteration cap trips, an unterminated tail is yielded as a final
/// line; after that, `None`. A line longer than [`MAX_LINE_BYTES`] kills
/// the read without yielding anything.
pub struct LineReader<R> {
    stream: R,
    deadline: Instant,
    iterations: u32,
    pending: Vec<u8>,
    done: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(stream: R, deadline: Instant) -> Self {
        Self {
            stream,
            deadline,
            iterations: 0,
            pending: Vec::new(),
            done: false,
        }
    }

    /// Next line, or `None` once the stream is exhausted.
    pub fn read_line(&mut self) -> Option<String> {
        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Some(String::from_utf8_lossy(&line).into_owned());
            }

            if self.done {
                return self.take_tail();
            }

            if self.pending.len() > MAX_LINE_BYTES {
                // Oversized line: drop the connection's input outright
                self.pending.clear();
                self.done = true;
                return None;
            }

            self.iterations += 1;
            if self.iterations > MAX_READ_ITERATIONS || Instant::now() >= self.deadline {
                self.done = true;
                return self.take_tail();
            }

            let mut chunk = [0u8; 128];
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    self.done = true;
                    return self.take_tail();
                }
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => {
                    self.done = true;
                    return self.take_tail();
                }
            }
        }
    }

    fn take_tail(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(tail)
    }

    /// Give the stream back for writing the response.
    pub fn into_inner(self) -> R {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    // ==================== RequestHead Tests ====================

    #[test]
    fn test_parse_request_line() {
        let head = RequestHead::parse("GET / HTTP/1.1").unwrap();
        assert_eq!(head.method, "GET");
        assert_eq!(head.path, "/");

        let head = RequestHead::parse("POST /save.html HTTP/1.1").unwrap();
        assert_eq!(head.method, "POST");
        assert_eq!(head.path, "/save.html");
    }

    #[test]
    fn test_parse_tolerates_extra_whitespace() {
        let head = RequestHead::parse("GET   /   HTTP/1.1").unwrap();
        assert_eq!(head.method, "GET");
        assert_eq!(head.path, "/");
    }

    #[test]
    fn test_parse_missing_tokens() {
        assert!(RequestHead::parse("").is_none());
        assert!(RequestHead::parse("GET").is_none());
        assert!(RequestHead::parse("   ").is_none());
    }

    // ==================== Form Parsing Tests ====================

    #[test]
    fn test_form_pair() {
        assert_eq!(
            parse_form_pair("ssid=home&pass=hunter2"),
            Some(("home".to_string(), "hunter2".to_string()))
        );
    }

    #[test]
    fn test_form_pair_is_positional() {
        // Field names are not inspected
        assert_eq!(
            parse_form_pair("a=1&b=2"),
            Some(("1".to_string(), "2".to_string()))
        );
        // Everything after the second `=` is the second value
        assert_eq!(
            parse_form_pair("a=1&b=2&c=3"),
            Some(("1".to_string(), "2&c=3".to_string()))
        );
    }

    #[test]
    fn test_form_pair_empty_values() {
        assert_eq!(
            parse_form_pair("ssid=&pass=p"),
            Some(("".to_string(), "p".to_string()))
        );
    }

    #[test]
    fn test_form_pair_not_decoded() {
        // No URL decoding: encoded bytes pass through untouched
        assert_eq!(
            parse_form_pair("ssid=my%20net&pass=a+b"),
            Some(("my%20net".to_string(), "a+b".to_string()))
        );
    }

    #[test]
    fn test_form_pair_malformed() {
        assert!(parse_form_pair("").is_none());
        assert!(parse_form_pair("garbage").is_none());
        assert!(parse_form_pair("ssid=home").is_none());
        assert!(parse_form_pair("ssid&pass=p").is_none());
        assert!(parse_form_pair("ssid=home&pass").is_none());
    }

    // ==================== LineReader Tests ====================

    #[test]
    fn test_reads_crlf_lines() {
        let data = Cursor::new(b"GET / HTTP/1.1\r\nHost: portal\r\n\r\n".to_vec());
        let mut reader = LineReader::new(data, far_deadline());

        assert_eq!(reader.read_line().unwrap(), "GET / HTTP/1.1");
        assert_eq!(reader.read_line().unwrap(), "Host: portal");
        assert_eq!(reader.read_line().unwrap(), "");
        assert!(reader.read_line().is_none());
    }

    #[test]
    fn test_reads_bare_lf_lines() {
        let data = Cursor::new(b"first\nsecond\n".to_vec());
        let mut reader = LineReader::new(data, far_deadline());

        assert_eq!(reader.read_line().unwrap(), "first");
        assert_eq!(reader.read_line().unwrap(), "second");
        assert!(reader.read_line().is_none());
    }

    #[test]
    fn test_unterminated_tail_flushed_on_eof() {
        // Browsers do not newline-terminate POST bodies
        let data = Cursor::new(b"header\r\n\r\nssid=home&pass=p".to_vec());
        let mut reader = LineReader::new(data, far_deadline());

        assert_eq!(reader.read_line().unwrap(), "header");
        assert_eq!(reader.read_line().unwrap(), "");
        assert_eq!(reader.read_line().unwrap(), "ssid=home&pass=p");
        assert!(reader.read_line().is_none());
    }

    /// Stream that yields a fixed chunk once, then blocks forever.
    struct StallingStream {
        data: Option<Vec<u8>>,
        reads: u32,
    }

    impl StallingStream {
        fn new(data: &[u8]) -> Self {
            Self {
                data: Some(data.to_vec()),
                reads: 0,
            }
        }
    }

    impl Read for StallingStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            match self.data.take() {
                Some(data) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                None => Err(io::Error::new(io::ErrorKind::WouldBlock, "stalled")),
            }
        }
    }

    #[test]
    fn test_unterminated_tail_flushed_on_stall() {
        let stream = StallingStream::new(b"ssid=home&pass=p");
        let mut reader = LineReader::new(stream, Instant::now() + Duration::from_millis(20));

        assert_eq!(reader.read_line().unwrap(), "ssid=home&pass=p");
        assert!(reader.read_line().is_none());
    }

    #[test]
    fn test_silent_stream_yields_nothing() {
        let stream = StallingStream::new(b"");
        let mut reader = LineReader::new(stream, Instant::now() + Duration::from_millis(20));

        assert!(reader.read_line().is_none());
    }

    #[test]
    fn test_iteration_cap_stops_a_spinning_stream() {
        let stream = StallingStream {
            data: None,
            reads: 0,
        };
        let mut reader = LineReader::new(stream, far_deadline());

        assert!(reader.read_line().is_none());
        assert_eq!(reader.into_inner().reads, MAX_READ_ITERATIONS);
    }

    #[test]
    fn test_oversized_line_is_dropped() {
        let mut data = vec![b'a'; MAX_LINE_BYTES * 2];
        data.extend_from_slice(b"\r\n");
        let mut reader = LineReader::new(Cursor::new(data), far_deadline());

        assert!(reader.read_line().is_none());
        assert!(reader.read_line().is_none());
    }

    #[test]
    fn test_line_at_bound_survives() {
        let mut data = vec![b'a'; MAX_LINE_BYTES];
        data.extend_from_slice(b"\r\n");
        let mut reader = LineReader::new(Cursor::new(data), far_deadline());

        assert_eq!(reader.read_line().unwrap().len(), MAX_LINE_BYTES);
    }
}
