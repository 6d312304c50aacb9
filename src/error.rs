use crate::groups::{AsciiAsyncType, WireGroups};

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Not enough bytes")]
    NotEnoughData { actual: usize, minimum: usize },

    /// Frame-level damage: bad start byte, undefined group bits, missing
    /// checksum delimiter.
    #[error("Malformed frame: {0}")]
    Framing(String),

    /// Record-level damage in an ascii message: bad field count or an
    /// unparseable numeric field.
    #[error("Malformed ascii record: {0}")]
    Ascii(String),

    #[error("Checksum or CRC failed")]
    Checksum,

    /// The packet's declared binary groups differ from the negotiated output
    /// configuration. Extracting from such a packet would desynchronize every
    /// subsequent field read, so it must be dropped whole.
    #[error("Binary group flags {got:?} do not match negotiated output {want:?}")]
    GroupMismatch { want: WireGroups, got: WireGroups },

    #[error("Wrong ascii message type: {0:?}")]
    WrongAsciiType(AsciiAsyncType),
}

pub type Result<T> = std::result::Result<T, Error>;
