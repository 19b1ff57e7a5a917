//! # dhcpwire
//!
//! A DHCP message codec and conformance engine implementing RFC 2131
//! (DHCP) and RFC 2132 (DHCP Options).
//!
//! ## Features
//!
//! - Bit-exact packet decoding and encoding, including the TLV option
//!   table and the 300-byte BOOTP minimum
//! - RFC 2131 table 3 validation of server replies (OFFER, ACK, NAK),
//!   context-sensitive for ACK depending on the originating request
//! - Reply truncation against the client's maximum message size
//!   (option 57)
//! - Type-level dispatch legality: DISCOVER→OFFER, REQUEST→ACK/NAK,
//!   INFORM→ACK
//! - Deterministic option serialization and log formatting
//!
//! ## Quick Start
//!
//! ```
//! use dhcpwire::{Ack, Message, OptionCode, Reply, Result};
//!
//! fn acknowledge(request: &dyn Message) -> Result<Vec<u8>> {
//!     let mut ack = Ack::new(request);
//!     ack.packet.set_option(OptionCode::ServerId as u8, vec![192, 168, 1, 1]);
//!     ack.packet.set_option(OptionCode::AddressTime as u8, 86400u32.to_be_bytes().to_vec());
//!     ack.validate()?;
//!     ack.to_bytes()
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`Packet`] - DHCP packet model with decode/encode
//! - [`OptionMap`] - the option table embedded in every packet
//! - [`Rule`] - option-presence validation primitives
//! - [`Offer`], [`Ack`], [`Nak`] - server reply variants
//! - [`Discover`], [`Request`], [`Inform`] - client request wrappers
//! - [`FormatRegistry`] - human-readable packet rendering

pub mod error;
pub mod format;
pub mod message;
pub mod options;
pub mod packet;
pub mod reply;
pub mod validate;

pub use error::{Error, Result};
pub use format::{FormatRegistry, OptionFormatter};
pub use message::{
    Discover, DiscoverReply, Inform, InformReply, Message, ReplyWriter, Request, RequestReply,
};
pub use options::{MessageType, OptionCode, OptionMap};
pub use packet::{EncodeOptions, Packet, BOOTREPLY, BOOTREQUEST};
pub use reply::{Ack, Nak, Offer, Reply};
pub use validate::{validate, Rule};
