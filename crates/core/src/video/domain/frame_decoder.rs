use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("empty frame message")]
    Empty,
    #[error("undecodable frame: {0}")]
    Codec(String),
}

/// Turns one encoded image message into an RGB [`Frame`].
///
/// The returned frame carries `index`, the caller's running frame counter.
pub trait FrameDecoder: Send {
    fn decode(&self, bytes: &[u8], index: usize) -> Result<Frame, DecodeError>;
}
