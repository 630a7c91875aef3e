use dagway_range::RangeError;

/// Fault recorded after response emission has begun.
///
/// By then the status and headers are committed, so this error is never
/// serialized into the response — it exists for logs and for callers that
/// inspect a finished body. The on-the-wire manifestation is only the
/// stream ending short of its announced length.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("stream truncated after {sent} of {expected} body bytes: {source}")]
    StreamTruncated {
        sent: u64,
        expected: u64,
        #[source]
        source: RangeError,
    },
}
