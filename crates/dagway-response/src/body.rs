//! The planned body as a pull-based chunk stream.

use std::collections::VecDeque;

use bytes::Bytes;
use tracing::warn;

use dagway_range::{ClampedRange, RangeError, RangeResult, SegmentStream};
use dagway_types::BlockId;
use dagway_walk::Walker;

use crate::encoder::RangePlan;
use crate::error::BodyError;

enum State {
    /// About to open part `0..parts.len()`; past the last part this
    /// transitions to the epilogue or the end.
    PartStart(usize),
    /// Emitting payload for one part.
    Streaming { part: usize, cursor: u64 },
    Epilogue,
    Done,
}

enum Step {
    /// One chunk; `payload` distinguishes fetched bytes from framing.
    Chunk { bytes: Bytes, payload: bool },
    End,
}

/// Streams a [`RangePlan`]'s body and enforces the fault contract.
///
/// Call [`prime`] before committing status/headers: it resolves through
/// the first payload chunk, so a request whose very first block is missing
/// fails cleanly instead of truncating. After priming, [`next_chunk`]
/// yields the body; a fetch failure mid-body ends the stream immediately,
/// with no epilogue and no error chunk, and is recorded as a
/// [`BodyError::StreamTruncated`] for inspection and logs.
///
/// [`prime`]: RangeBody::prime
/// [`next_chunk`]: RangeBody::next_chunk
pub struct RangeBody {
    walker: Walker,
    root: BlockId,
    plan: RangePlan,
    state: State,
    pending: VecDeque<Bytes>,
    sent: u64,
    fault: Option<BodyError>,
}

impl RangeBody {
    pub fn new(walker: Walker, root: BlockId, plan: RangePlan) -> Self {
        Self {
            walker,
            root,
            plan,
            state: State::PartStart(0),
            pending: VecDeque::new(),
            sent: 0,
            fault: None,
        }
    }

    pub fn plan(&self) -> &RangePlan {
        &self.plan
    }

    /// Bytes handed out so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// The truncation fault, if emission ended early.
    pub fn fault(&self) -> Option<&BodyError> {
        self.fault.as_ref()
    }

    /// Resolve up to and including the first payload chunk, buffering the
    /// chunks instead of emitting them.
    ///
    /// An error here happened before anything was emitted, so the caller
    /// can still produce a clean structured failure.
    pub async fn prime(&mut self) -> RangeResult<()> {
        loop {
            match self.step().await? {
                Step::Chunk { bytes, payload } => {
                    self.pending.push_back(bytes);
                    if payload {
                        return Ok(());
                    }
                }
                Step::End => return Ok(()),
            }
        }
    }

    /// The next body chunk, or `None` when the stream ends — either
    /// cleanly or, if [`fault`] is set, truncated.
    ///
    /// [`fault`]: RangeBody::fault
    pub async fn next_chunk(&mut self) -> Option<Bytes> {
        if let Some(bytes) = self.pending.pop_front() {
            self.sent += bytes.len() as u64;
            return Some(bytes);
        }
        if self.fault.is_some() {
            return None;
        }
        match self.step().await {
            Ok(Step::Chunk { bytes, .. }) => {
                self.sent += bytes.len() as u64;
                Some(bytes)
            }
            Ok(Step::End) => None,
            Err(source) => {
                let fault = BodyError::StreamTruncated {
                    sent: self.sent,
                    expected: self.plan.content_length(),
                    source,
                };
                warn!(%fault, "terminating response body early");
                self.fault = Some(fault);
                None
            }
        }
    }

    /// Advance the state machine by at most one chunk.
    async fn step(&mut self) -> RangeResult<Step> {
        loop {
            match self.state {
                State::Done => return Ok(Step::End),
                State::Epilogue => {
                    self.state = State::Done;
                    return Ok(Step::Chunk {
                        bytes: Bytes::from(self.plan.epilogue()),
                        payload: false,
                    });
                }
                State::PartStart(index) => {
                    if index >= self.plan.parts.len() {
                        if self.plan.is_multipart() {
                            self.state = State::Epilogue;
                        } else {
                            self.state = State::Done;
                        }
                        continue;
                    }
                    let cursor = self.plan.parts[index].start;
                    self.state = State::Streaming {
                        part: index,
                        cursor,
                    };
                    if self.plan.is_multipart() {
                        return Ok(Step::Chunk {
                            bytes: Bytes::from(self.plan.part_header(index)),
                            payload: false,
                        });
                    }
                }
                State::Streaming { part, cursor } => {
                    let end = self.plan.parts[part].end;
                    if cursor >= end {
                        self.state = State::PartStart(part + 1);
                        continue;
                    }
                    let remaining = ClampedRange { start: cursor, end };
                    let mut segments =
                        SegmentStream::new(&mut self.walker, self.root, remaining);
                    match segments.next().await {
                        Some(Ok(segment)) => {
                            self.state = State::Streaming {
                                part,
                                cursor: cursor + segment.resolved.length,
                            };
                            return Ok(Step::Chunk {
                                bytes: segment.data,
                                payload: true,
                            });
                        }
                        Some(Err(e)) => return Err(e),
                        // A clamped range is non-empty, so the first pull
                        // cannot come back empty; move on if it somehow does.
                        None => {
                            self.state = State::PartStart(part + 1);
                        }
                    }
                }
            }
        }
    }
}
