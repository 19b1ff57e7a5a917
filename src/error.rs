//! Error types for the DHCP codec and validation engine.
//!
//! All fallible operations in this crate return [`Result<T>`], which uses
//! the [`Error`] enum for error variants. Errors are plain values: a
//! malformed packet is rejected with a decode error, a non-conformant
//! reply is rejected with a validation error, and nothing here panics or
//! retries.

/// Errors that can occur while decoding, validating, or encoding DHCP
/// packets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File system I/O error (CLI packet dumps).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Hex input could not be parsed (CLI `--hex` mode).
    #[error("Invalid hex input: {0}")]
    InvalidHex(String),

    /// The input is shorter than the fixed DHCP header plus magic cookie.
    ///
    /// The fixed header is 236 bytes followed by the 4-byte magic cookie;
    /// anything shorter cannot be a DHCP message and is rejected rather
    /// than guessed at.
    #[error("Packet truncated: {actual} bytes (minimum {required})")]
    Truncated { actual: usize, required: usize },

    /// The magic cookie at offset 236 is not `63 82 53 63`.
    #[error("Invalid magic cookie: {0:02x?}")]
    BadCookie([u8; 4]),

    /// An option's declared length overruns the remaining input.
    ///
    /// This covers both a missing length byte and a value that extends
    /// past the end of the packet.
    #[error("Option {code} overruns packet: {declared} bytes declared, {remaining} remaining")]
    OptionOverrun {
        code: u8,
        declared: usize,
        remaining: usize,
    },

    /// An option value exceeds the 255-byte limit of a single TLV entry.
    ///
    /// RFC 3396 long-option concatenation is unsupported; oversized
    /// values fail encoding explicitly.
    #[error("Option {code} value is {length} bytes, exceeding the 255-byte TLV limit")]
    OptionTooLong { code: u8, length: usize },

    /// A reply is missing an option the RFC marks MUST for its type.
    #[error("Missing required option {0}")]
    MissingRequiredOption(u8),

    /// A reply carries an option the RFC marks MUST NOT for its type.
    #[error("Forbidden option {0} is present")]
    ForbiddenOption(u8),

    /// A reply carries an option outside its allowed set.
    ///
    /// Produced by deny-by-default validation (e.g. DHCPNAK, where all
    /// options not explicitly called out are MUST NOT).
    #[error("Option {0} is not allowed for this message type")]
    DisallowedOption(u8),

    /// No serialization fits the client's declared maximum message size.
    ///
    /// Even with every droppable option removed, the fixed header, magic
    /// cookie, message type option, and end marker exceed the budget.
    #[error("Encoded message cannot fit in {max} bytes (minimum {required})")]
    MessageTooLarge { max: usize, required: usize },
}

/// A specialized Result type for DHCP operations.
pub type Result<T> = std::result::Result<T, Error>;
