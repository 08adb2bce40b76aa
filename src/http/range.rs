//! HTTP Range request parsing module
//!
//! Single `bytes=<start>-[<end>]` ranges only. Anything else that is present but not a
//! satisfiable range of that form is rejected with 416 rather than silently served whole.

/// Inclusive byte range within a resource, `start <= end < size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    pub start: u64,
    pub end: u64,
}

impl RangeRequest {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn chunk_size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a resource of `size` bytes
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No Range header, serve the whole resource with 200
    Full,
    /// Satisfiable single range, serve with 206
    Partial(RangeRequest),
    /// Unparsable or unsatisfiable, answer 416
    Malformed,
}

/// Parse an HTTP Range header against a resource of `size` bytes
///
/// # Examples
/// ```ignore
/// let outcome = parse_range_header(Some("bytes=900-"), 1000);
/// assert_eq!(outcome, RangeOutcome::Partial(RangeRequest { start: 900, end: 999 }));
/// ```
pub fn parse_range_header(range_header: Option<&str>, size: u64) -> RangeOutcome {
    let Some(header) = range_header else {
        return RangeOutcome::Full;
    };

    parse_byte_range(header.trim(), size).map_or(RangeOutcome::Malformed, RangeOutcome::Partial)
}

fn parse_byte_range(header: &str, size: u64) -> Option<RangeRequest> {
    let spec = header.strip_prefix("bytes=")?;

    // Multi-range is not supported, and the split below would reject it anyway
    let (start_str, end_str) = spec.split_once('-')?;
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    // Suffix ranges ("-500") carry no start and are not accepted
    let start = parse_offset(start_str)?;
    let end = if end_str.is_empty() {
        size.checked_sub(1)?
    } else {
        parse_offset(end_str)?
    };

    if start > end || end >= size {
        return None;
    }

    Some(RangeRequest { start, end })
}

/// Digits only; `str::parse` alone would accept a leading `+`
fn parse_offset(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(start: u64, end: u64) -> RangeOutcome {
        RangeOutcome::Partial(RangeRequest { start, end })
    }

    #[test]
    fn test_no_range() {
        assert_eq!(parse_range_header(None, 100), RangeOutcome::Full);
    }

    #[test]
    fn test_standard_range() {
        let outcome = parse_range_header(Some("bytes=200-499"), 1000);
        assert_eq!(outcome, partial(200, 499));

        let RangeOutcome::Partial(r) = outcome else {
            panic!("Expected Partial");
        };
        assert_eq!(r.chunk_size(), 300);
        assert_eq!(r.content_range(1000), "bytes 200-499/1000");
    }

    #[test]
    fn test_open_range() {
        let outcome = parse_range_header(Some("bytes=900-"), 1000);
        assert_eq!(outcome, partial(900, 999));
        if let RangeOutcome::Partial(r) = outcome {
            assert_eq!(r.chunk_size(), 100);
            assert_eq!(r.content_range(1000), "bytes 900-999/1000");
        }
    }

    #[test]
    fn test_single_byte_ranges() {
        assert_eq!(parse_range_header(Some("bytes=0-0"), 1000), partial(0, 0));
        assert_eq!(parse_range_header(Some("bytes=999-999"), 1000), partial(999, 999));
        assert_eq!(parse_range_header(Some("bytes=999-"), 1000), partial(999, 999));
    }

    #[test]
    fn test_whitespace_tolerated() {
        assert_eq!(parse_range_header(Some(" bytes= 10 - 19 "), 100), partial(10, 19));
    }

    #[test]
    fn test_not_satisfiable() {
        // start beyond the resource
        assert_eq!(parse_range_header(Some("bytes=1000-"), 1000), RangeOutcome::Malformed);
        assert_eq!(parse_range_header(Some("bytes=1500-1600"), 1000), RangeOutcome::Malformed);
        // start after end
        assert_eq!(parse_range_header(Some("bytes=500-400"), 1000), RangeOutcome::Malformed);
        // end beyond the resource is rejected, not clamped
        assert_eq!(parse_range_header(Some("bytes=0-1000"), 1000), RangeOutcome::Malformed);
    }

    #[test]
    fn test_empty_resource() {
        assert_eq!(parse_range_header(Some("bytes=0-"), 0), RangeOutcome::Malformed);
        assert_eq!(parse_range_header(Some("bytes=0-0"), 0), RangeOutcome::Malformed);
        assert_eq!(parse_range_header(None, 0), RangeOutcome::Full);
    }

    #[test]
    fn test_invalid_format() {
        for header in [
            "bytes=a-b",
            "bytes=abc-",
            "bytes=10-x",
            "bytes=+5-9",
            "bytes=-20",
            "bytes=-",
            "bytes=",
            "bytes=0-9,20-29",
            "items=0-9",
            "0-9",
            "bytes=5",
        ] {
            assert_eq!(
                parse_range_header(Some(header), 100),
                RangeOutcome::Malformed,
                "header {header:?}"
            );
        }
    }

    #[test]
    fn test_large_offsets() {
        let size = u64::from(u32::MAX) * 4;
        assert_eq!(
            parse_range_header(Some("bytes=8589934592-"), size),
            partial(8_589_934_592, size - 1)
        );
        assert_eq!(
            parse_range_header(Some("bytes=99999999999999999999999-"), size),
            RangeOutcome::Malformed
        );
    }
}
