//! Response shape planning: descriptors, boundaries, exact lengths.

use rand::distributions::Alphanumeric;
use rand::Rng;

use dagway_range::ClampedRange;

/// Payload content type for whole files and multipart parts.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Boundary length. Payloads are not escaped, so the token must be long
/// enough that a collision with payload bytes is negligible.
const BOUNDARY_LEN: usize = 32;

/// Generate a random multipart boundary token.
///
/// The random source is caller-supplied and request-scoped; nothing here
/// depends on process-global seeding.
pub fn generate_boundary(rng: &mut impl Rng) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(BOUNDARY_LEN)
        .map(char::from)
        .collect()
}

/// A fully planned range response.
///
/// Built after validation, before emission: every part is in-bounds and
/// non-empty, parts are in caller order, and the exact body length is
/// known. `total_size` is always the stream's declared total, however
/// small the parts are.
#[derive(Clone, Debug)]
pub struct RangePlan {
    pub total_size: u64,
    /// Validated parts, in the exact order the client requested them.
    pub parts: Vec<ClampedRange>,
    /// Boundary token; present exactly when the response is multipart.
    pub boundary: Option<String>,
}

impl RangePlan {
    /// Plan a response for validated parts. Two or more parts get a
    /// multipart body with a boundary drawn from `rng`.
    pub fn new(total_size: u64, parts: Vec<ClampedRange>, rng: &mut impl Rng) -> Self {
        let boundary = (parts.len() > 1).then(|| generate_boundary(rng));
        Self {
            total_size,
            parts,
            boundary,
        }
    }

    /// Plan a full-content response (the whole stream as one part; an
    /// empty stream has no parts).
    pub fn full(total_size: u64) -> Self {
        let parts = if total_size == 0 {
            Vec::new()
        } else {
            vec![ClampedRange {
                start: 0,
                end: total_size,
            }]
        };
        Self {
            total_size,
            parts,
            boundary: None,
        }
    }

    pub fn is_multipart(&self) -> bool {
        self.boundary.is_some()
    }

    /// Value for the response `Content-Type` header.
    pub fn content_type(&self) -> String {
        match &self.boundary {
            Some(b) => format!("multipart/byteranges; boundary={b}"),
            None => OCTET_STREAM.to_string(),
        }
    }

    /// `Content-Range` descriptor for a single-range response, `None` for
    /// multipart (descriptors then live in the part headers).
    pub fn content_range(&self) -> Option<String> {
        if self.is_multipart() {
            return None;
        }
        self.parts.first().map(|p| self.descriptor(p))
    }

    /// The `bytes start-last/total` descriptor for one part, with the
    /// wire's inclusive end.
    fn descriptor(&self, part: &ClampedRange) -> String {
        format!("bytes {}-{}/{}", part.start, part.last_byte(), self.total_size)
    }

    /// Header block opening part `index` of a multipart body. Includes the
    /// boundary line; the leading CRLF separates it from the previous
    /// part's payload.
    pub fn part_header(&self, index: usize) -> String {
        let boundary = self.boundary.as_deref().unwrap_or_default();
        let lead = if index == 0 { "" } else { "\r\n" };
        format!(
            "{lead}--{boundary}\r\nContent-Type: {OCTET_STREAM}\r\nContent-Range: {}\r\n\r\n",
            self.descriptor(&self.parts[index]),
        )
    }

    /// Closing delimiter of a multipart body. A truncated stream never
    /// emits this, which is how consumers see the body end abnormally.
    pub fn epilogue(&self) -> String {
        let boundary = self.boundary.as_deref().unwrap_or_default();
        format!("\r\n--{boundary}--\r\n")
    }

    /// Exact body length in bytes: payload only for single-range
    /// responses, framing plus payload for multipart.
    pub fn content_length(&self) -> u64 {
        if !self.is_multipart() {
            return self.parts.iter().map(|p| p.len()).sum();
        }
        let framing: u64 = (0..self.parts.len())
            .map(|i| self.part_header(i).len() as u64)
            .sum();
        let payload: u64 = self.parts.iter().map(|p| p.len()).sum();
        framing + payload + self.epilogue().len() as u64
    }
}
