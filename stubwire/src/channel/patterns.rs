//! Marker patterns for locating payloads and debug segments in responses.

use std::borrow::Cow;

use regex::bytes::Regex;

/// Suffix appended to both markers around a debug segment.
pub const DEBUG_TAG: &str = "DEBUG";

/// Compiled response and debug matchers for one pair of markers.
#[derive(Debug, Clone)]
pub struct MarkerPatterns {
    /// Greedy `header(.*)trailer`, spanning newlines.
    response: Regex,

    /// Non-greedy `headerDEBUG(.*?)trailerDEBUG`, spanning newlines.
    debug: Regex,
}

impl MarkerPatterns {
    /// Compile matchers for the given markers.
    ///
    /// Markers are matched literally and byte-wise, so responses need not
    /// be valid UTF-8.
    pub fn new(header: &[u8], trailer: &[u8]) -> Result<Self, regex::Error> {
        let header = regex::escape(&String::from_utf8_lossy(header));
        let trailer = regex::escape(&String::from_utf8_lossy(trailer));

        Ok(Self {
            response: Regex::new(&format!("(?s-u){header}(.*){trailer}"))?,
            debug: Regex::new(&format!(
                "(?s-u){header}{DEBUG_TAG}(.*?){trailer}{DEBUG_TAG}"
            ))?,
        })
    }

    /// Return the encoded payload between the markers, if any.
    ///
    /// Debug segments are removed first so they never bleed into the payload.
    /// An empty capture counts as no payload.
    pub fn find_payload<'a>(&self, response: &'a [u8]) -> Option<Cow<'a, [u8]>> {
        let stripped = self.debug.replace_all(response, &b""[..]);
        let captured = match stripped {
            Cow::Borrowed(data) => self
                .response
                .captures(data)
                .and_then(|c| c.get(1))
                .map(|m| Cow::Borrowed(m.as_bytes())),
            Cow::Owned(data) => self
                .response
                .captures(&data)
                .and_then(|c| c.get(1))
                .map(|m| Cow::Owned(m.as_bytes().to_vec())),
        };
        captured.filter(|payload| !payload.is_empty())
    }

    /// Return the contents of every debug segment, in order.
    pub fn find_debug(&self, response: &[u8]) -> Vec<String> {
        self.debug
            .captures_iter(response)
            .filter_map(|c| c.get(1))
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .collect()
    }

    /// Get a reference to the payload regex.
    pub fn response_regex(&self) -> &Regex {
        &self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> MarkerPatterns {
        MarkerPatterns::new(b"c7dbe3439de7", b"4d0c9b0b1767").unwrap()
    }

    #[test]
    fn test_find_payload_spans_newlines() {
        let response = b"<html>\nc7dbe3439de7abc\ndef4d0c9b0b1767\n</html>";
        let payload = patterns().find_payload(response).unwrap();
        assert_eq!(payload.as_ref(), b"abc\ndef");
    }

    #[test]
    fn test_find_payload_missing_markers() {
        assert!(patterns().find_payload(b"Warning: something broke").is_none());
        assert!(patterns().find_payload(b"c7dbe3439de7 but no trailer").is_none());
    }

    #[test]
    fn test_find_payload_empty_capture() {
        assert!(patterns().find_payload(b"c7dbe3439de74d0c9b0b1767").is_none());
    }

    #[test]
    fn test_find_payload_ignores_debug_segments() {
        let response = b"c7dbe3439de7DEBUGnotice4d0c9b0b1767DEBUG\
c7dbe3439de7QUJD4d0c9b0b1767";
        let payload = patterns().find_payload(response).unwrap();
        assert_eq!(payload.as_ref(), b"QUJD");
    }

    #[test]
    fn test_find_debug_counts() {
        let p = patterns();
        assert!(p.find_debug(b"nothing here").is_empty());

        let one = b"c7dbe3439de7DEBUGfirst4d0c9b0b1767DEBUG";
        assert_eq!(p.find_debug(one), vec!["first"]);

        let three = b"c7dbe3439de7DEBUGa4d0c9b0b1767DEBUG xx \
c7dbe3439de7DEBUGb\nc4d0c9b0b1767DEBUG\
c7dbe3439de7DEBUG4d0c9b0b1767DEBUG";
        assert_eq!(p.find_debug(three), vec!["a", "b\nc", ""]);
    }

    #[test]
    fn test_non_utf8_response() {
        let mut response = vec![0xff, 0xfe];
        response.extend_from_slice(b"c7dbe3439de7QUJD4d0c9b0b1767");
        response.push(0x80);
        assert_eq!(patterns().find_payload(&response).unwrap().as_ref(), b"QUJD");
    }
}
