#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A bit read extends past the end of the input.
    #[error("bit range {offset}+{width} out of range for {len} bits")]
    OutOfRange {
        offset: usize,
        width: usize,
        len: usize,
    },
    #[error("cannot read {0} bits into a u64")]
    BitWidth(usize),

    #[error("Unknown format reference: {0:#010X}")]
    UnknownFormat(u32),
    #[error("Unknown payload type: {0:#05b}")]
    UnknownPayloadType(u8),

    /// A frame with a known format does not fit in the remaining input.
    #[error("truncated frame at bit {offset}: needed {needed} bits, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
