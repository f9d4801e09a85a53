use tracing::debug;

use crate::bits::BitReader;
use crate::frame::{decode_frame, Frame};
use crate::Result;

/// Iterates over the frames of an Allcast broadcast in transmission order.
///
/// Each frame starts where the previous one ended, so decoding is strictly sequential.
/// The first error ends iteration; no attempt is made to resynchronize.
///
/// # Example
/// ```
/// use aopcs::stream::FrameStream;
///
/// let frames: Vec<_> = FrameStream::new(&[]).collect();
/// assert!(frames.is_empty());
/// ```
pub struct FrameStream<'a> {
    bits: BitReader<'a>,
    offset: usize,
    done: bool,
}

impl<'a> FrameStream<'a> {
    #[must_use]
    pub fn new(dat: &'a [u8]) -> Self {
        FrameStream {
            bits: BitReader::new(dat),
            offset: 0,
            done: false,
        }
    }

    /// Bit offset of the next frame.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for FrameStream<'a> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.bits.len() {
            return None;
        }
        match decode_frame(&self.bits, self.offset) {
            Ok((frame, size)) => {
                self.offset += size;
                Some(Ok(frame))
            }
            Err(err) => {
                debug!(offset = self.offset, "frame decode failed: {err}");
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Decode all frames in `dat`.
///
/// # Errors
/// The first error encountered. Decoding is all-or-nothing; no frames are returned if
/// any frame fails to decode.
pub fn decode(dat: &[u8]) -> Result<Vec<Frame>> {
    let frames = FrameStream::new(dat).collect::<Result<Vec<Frame>>>()?;
    debug!(bytes = dat.len(), frames = frames.len(), "decoded allcast");
    Ok(frames)
}
