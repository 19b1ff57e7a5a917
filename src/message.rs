//! Client-to-server request wrappers and reply dispatch.
//!
//! [`Discover`], [`Request`], and [`Inform`] pair a received [`Packet`]
//! with the interface it arrived on and a borrowed [`ReplyWriter`] — the
//! external collaborator that actually puts a reply on the wire. The
//! wrappers contain no protocol logic of their own; their value is that
//! each one only accepts the reply variants RFC 2131 permits for it:
//!
//! - DISCOVER is answered by OFFER;
//! - REQUEST is answered by ACK or NAK;
//! - INFORM is answered by ACK.
//!
//! That legality mapping is enforced at the type level through the
//! [`DiscoverReply`], [`RequestReply`], and [`InformReply`] marker
//! traits rather than checked at runtime.

use crate::error::Result;
use crate::options::MessageType;
use crate::packet::Packet;
use crate::reply::{Ack, Nak, Offer, Reply};

/// A received client message: its packet plus where it came from.
pub trait Message {
    /// The decoded request packet.
    fn packet(&self) -> &Packet;

    /// Index of the network interface the request arrived on.
    fn interface_index(&self) -> u32;

    /// The request's DHCP message type (option 53), if present.
    fn message_type(&self) -> Option<MessageType> {
        self.packet().message_type()
    }

    /// The raw value of an option on the request, if present.
    fn option(&self, code: u8) -> Option<&[u8]> {
        self.packet().option(code)
    }
}

/// Writes a reply to the network to its intended receiver, be it via
/// broadcast or unicast. Implemented by the transport layer; this crate
/// never opens sockets or chooses addresses.
pub trait ReplyWriter {
    /// Transmits a validated reply.
    fn write_reply(&self, reply: &dyn Reply) -> Result<()>;
}

/// Replies a DISCOVER may be answered with.
pub trait DiscoverReply: Reply {}
impl DiscoverReply for Offer<'_> {}

/// Replies a REQUEST may be answered with.
pub trait RequestReply: Reply {}
impl RequestReply for Ack<'_> {}
impl RequestReply for Nak<'_> {}

/// Replies an INFORM may be answered with.
pub trait InformReply: Reply {}
impl InformReply for Ack<'_> {}

/// A client broadcast to locate available servers.
pub struct Discover<'a> {
    /// The received request.
    pub packet: Packet,

    interface_index: u32,
    writer: &'a dyn ReplyWriter,
}

impl<'a> Discover<'a> {
    /// Wraps a decoded DISCOVER with its origin and reply path.
    pub fn new(packet: Packet, interface_index: u32, writer: &'a dyn ReplyWriter) -> Self {
        Self {
            packet,
            interface_index,
            writer,
        }
    }

    /// Hands an OFFER to the transport layer.
    pub fn write_reply<R: DiscoverReply>(&self, reply: &R) -> Result<()> {
        self.writer.write_reply(reply)
    }
}

impl Message for Discover<'_> {
    fn packet(&self) -> &Packet {
        &self.packet
    }

    fn interface_index(&self) -> u32 {
        self.interface_index
    }
}

/// A client message to servers either (a) requesting offered parameters
/// from one server and implicitly declining offers from all others,
/// (b) confirming correctness of a previously allocated address after,
/// e.g., a system reboot, or (c) extending the lease on a particular
/// network address.
pub struct Request<'a> {
    /// The received request.
    pub packet: Packet,

    interface_index: u32,
    writer: &'a dyn ReplyWriter,
}

impl<'a> Request<'a> {
    /// Wraps a decoded REQUEST with its origin and reply path.
    pub fn new(packet: Packet, interface_index: u32, writer: &'a dyn ReplyWriter) -> Self {
        Self {
            packet,
            interface_index,
            writer,
        }
    }

    /// Hands an ACK or NAK to the transport layer.
    pub fn write_reply<R: RequestReply>(&self, reply: &R) -> Result<()> {
        self.writer.write_reply(reply)
    }
}

impl Message for Request<'_> {
    fn packet(&self) -> &Packet {
        &self.packet
    }

    fn interface_index(&self) -> u32 {
        self.interface_index
    }
}

/// A client message asking only for local configuration parameters; the
/// client already has an externally configured network address.
pub struct Inform<'a> {
    /// The received request.
    pub packet: Packet,

    interface_index: u32,
    writer: &'a dyn ReplyWriter,
}

impl<'a> Inform<'a> {
    /// Wraps a decoded INFORM with its origin and reply path.
    pub fn new(packet: Packet, interface_index: u32, writer: &'a dyn ReplyWriter) -> Self {
        Self {
            packet,
            interface_index,
            writer,
        }
    }

    /// Hands an ACK to the transport layer.
    pub fn write_reply<R: InformReply>(&self, reply: &R) -> Result<()> {
        self.writer.write_reply(reply)
    }
}

impl Message for Inform<'_> {
    fn packet(&self) -> &Packet {
        &self.packet
    }

    fn interface_index(&self) -> u32 {
        self.interface_index
    }
}
