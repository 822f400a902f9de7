// Copyright 2026 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt;
use std::io;

/// Result type for pcz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for compression/decompression
#[derive(Debug)]
pub enum Error {
    /// An underlying I/O operation failed
    Io(io::Error),

    /// The input path does not name a regular file
    NotRegularFile,

    /// The container does not start with the PCZ2 magic
    BadMagic,

    /// The filename does not fit the 16-bit length field
    FilenameTooLong,

    /// The size table length disagrees with the block count
    BlockCountMismatch,

    /// A literal token ended before its byte
    TruncatedLiteral,

    /// A match token ended before its offset/length bytes
    TruncatedMatch,

    /// A match offset reaches before the start of the output
    InvalidMatchOffset { offset: usize, out_len: usize },

    /// An unrecognized token flag byte
    InvalidTokenFlag(u8),

    /// Decoded length disagrees with the expected block length
    SizeMismatch { got: usize, expected: usize },

    /// An encoded block with no mode tag byte
    EmptyBlock,

    /// A raw block whose payload length disagrees with the block length
    RawSizeMismatch { got: usize, expected: usize },

    /// An unrecognized block mode tag
    UnknownMode(u8),

    /// A block failed to decode
    Block { index: u64, source: Box<Error> },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "pcz: i/o error: {}", err),
            Error::NotRegularFile => write!(f, "pcz: input is not a regular file"),
            Error::BadMagic => write!(f, "pcz: invalid magic"),
            Error::FilenameTooLong => write!(f, "pcz: filename too long"),
            Error::BlockCountMismatch => write!(f, "pcz: block count mismatch"),
            Error::TruncatedLiteral => write!(f, "pcz: truncated literal"),
            Error::TruncatedMatch => write!(f, "pcz: truncated match"),
            Error::InvalidMatchOffset { offset, out_len } => {
                write!(f, "pcz: invalid match offset {} (out len {})", offset, out_len)
            }
            Error::InvalidTokenFlag(flag) => {
                write!(f, "pcz: invalid token flag 0x{:02x}", flag)
            }
            Error::SizeMismatch { got, expected } => {
                write!(f, "pcz: size mismatch: got {}, expected {}", got, expected)
            }
            Error::EmptyBlock => write!(f, "pcz: empty compressed block"),
            Error::RawSizeMismatch { got, expected } => {
                write!(f, "pcz: raw block size mismatch: got {}, expected {}", got, expected)
            }
            Error::UnknownMode(mode) => write!(f, "pcz: unknown block mode 0x{:02x}", mode),
            Error::Block { index, source } => write!(f, "block {}: {}", index, source),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Block { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl Error {
    /// Attach the index of the block the error occurred in.
    pub(crate) fn in_block(self, index: u64) -> Error {
        Error::Block {
            index,
            source: Box::new(self),
        }
    }
}
