//! DHCP packet model, decoding, and encoding per RFC 2131.
//!
//! A DHCP packet consists of a fixed 236-byte header followed by a 4-byte
//! magic cookie and variable-length options. This module handles decoding
//! inbound packets, constructing reply packets, and serializing them back
//! to the wire, including truncation against a client-advertised maximum
//! message size (option 57).
//!
//! # Packet Structure
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     op (1)    |   htype (1)   |   hlen (1)    |   hops (1)    |
//! +---------------+---------------+---------------+---------------+
//! |                            xid (4)                            |
//! +-------------------------------+-------------------------------+
//! |           secs (2)            |           flags (2)           |
//! +-------------------------------+-------------------------------+
//! |                          ciaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          yiaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          siaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          giaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          chaddr (16)                          |
//! +---------------------------------------------------------------+
//! |                          sname (64)                           |
//! +---------------------------------------------------------------+
//! |                          file (128)                           |
//! +---------------------------------------------------------------+
//! |                    magic cookie (4) = 99.130.83.99            |
//! +---------------------------------------------------------------+
//! |                          options (variable)                   |
//! +---------------------------------------------------------------+
//! ```
//!
//! # References
//!
//! - RFC 2131: Dynamic Host Configuration Protocol

use std::net::Ipv4Addr;

use crate::error::{Error, Result};
use crate::options::{MessageType, OptionCode, OptionMap};

/// DHCP magic cookie that identifies DHCP packets (vs BOOTP).
pub const DHCP_MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

const DHCP_CHADDR_SIZE: usize = 16;
const DHCP_SNAME_SIZE: usize = 64;
const DHCP_FILE_SIZE: usize = 128;

const DHCP_SNAME_OFFSET: usize = 44;
const DHCP_FILE_OFFSET: usize = DHCP_SNAME_OFFSET + DHCP_SNAME_SIZE;
const DHCP_MAGIC_COOKIE_OFFSET: usize = DHCP_FILE_OFFSET + DHCP_FILE_SIZE;

/// Size of the fixed header portion including magic cookie.
pub const DHCP_FIXED_HEADER_SIZE: usize = DHCP_MAGIC_COOKIE_OFFSET + DHCP_MAGIC_COOKIE.len();

/// Minimum DHCP packet size per RFC 2131 §2.
///
/// DHCP pads messages to at least 300 bytes for compatibility with
/// BOOTP relay agents.
const DHCP_MIN_PACKET_SIZE: usize = 300;

/// Initial capacity for the encoding buffer.
///
/// 576 bytes is the minimum MTU that all hosts must accept per RFC 791.
const DHCP_ENCODE_CAPACITY: usize = 576;

/// Largest value a single TLV entry can carry.
const MAX_OPTION_VALUE_SIZE: usize = 255;

/// BOOTP/DHCP operation code for client requests.
pub const BOOTREQUEST: u8 = 1;

/// BOOTP/DHCP operation code for server replies.
pub const BOOTREPLY: u8 = 2;

/// Hardware type for Ethernet (most common).
pub const HTYPE_ETHERNET: u8 = 1;

/// Hardware address length for Ethernet (6 bytes).
pub const HLEN_ETHERNET: u8 = 6;

/// Serialization controls for [`Packet::encode`].
///
/// Reply variants build these from their originating request: the
/// client's maximum message size (option 57) becomes `max_length`, and
/// DHCPNAK sets both `skip_*` flags because it must not carry `sname`
/// or `file` content.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Upper bound on the encoded size. Options other than the message
    /// type are dropped to fit; if no serialization fits, encoding fails
    /// with [`Error::MessageTooLarge`].
    pub max_length: Option<u16>,

    /// Emit the `file` field as zeros regardless of packet content.
    pub skip_file: bool,

    /// Emit the `sname` field as zeros regardless of packet content.
    pub skip_sname: bool,
}

/// A DHCP message: the fixed header fields plus the option table.
///
/// A packet is created either by [`decode`](Self::decode)-ing inbound
/// bytes or by [`reply_to`](Self::reply_to)-seeding a reply from a
/// request. It is mutated only while a reply is being constructed;
/// validation and encoding treat it as immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Operation code: [`BOOTREQUEST`] (1) or [`BOOTREPLY`] (2).
    pub op: u8,

    /// Hardware address type. [`HTYPE_ETHERNET`] (1) for Ethernet.
    pub htype: u8,

    /// Hardware address length. [`HLEN_ETHERNET`] (6) for Ethernet.
    pub hlen: u8,

    /// Hop count, incremented by relay agents.
    pub hops: u8,

    /// Transaction ID chosen by the client, echoed verbatim in replies.
    pub xid: u32,

    /// Seconds elapsed since the client began address acquisition.
    pub secs: u16,

    /// Flags. Bit 0x8000 = broadcast flag.
    pub flags: u16,

    /// Client IP address (set by clients in RENEWING/REBINDING states).
    pub ciaddr: Ipv4Addr,

    /// "Your" IP address - the address being assigned to the client.
    pub yiaddr: Ipv4Addr,

    /// Server IP address (next server to use in bootstrap).
    pub siaddr: Ipv4Addr,

    /// Gateway IP address - set by relay agents.
    pub giaddr: Ipv4Addr,

    /// Client hardware address; only the first `hlen` bytes are
    /// meaningful.
    pub chaddr: [u8; 16],

    /// Server host name, NUL-terminated.
    pub sname: [u8; 64],

    /// Boot file name, NUL-terminated.
    pub file: [u8; 128],

    /// DHCP options carried after the magic cookie.
    pub options: OptionMap,
}

impl Packet {
    /// Creates an empty packet with the given operation code.
    pub fn new(op: u8) -> Self {
        Self {
            op,
            htype: HTYPE_ETHERNET,
            hlen: HLEN_ETHERNET,
            hops: 0,
            xid: 0,
            secs: 0,
            flags: 0,
            ciaddr: Ipv4Addr::UNSPECIFIED,
            yiaddr: Ipv4Addr::UNSPECIFIED,
            siaddr: Ipv4Addr::UNSPECIFIED,
            giaddr: Ipv4Addr::UNSPECIFIED,
            chaddr: [0u8; DHCP_CHADDR_SIZE],
            sname: [0u8; DHCP_SNAME_SIZE],
            file: [0u8; DHCP_FILE_SIZE],
            options: OptionMap::new(),
        }
    }

    /// Decodes a DHCP packet from raw bytes.
    ///
    /// # Errors
    ///
    /// - [`Error::Truncated`] if the input is shorter than the fixed
    ///   header plus magic cookie (240 bytes).
    /// - [`Error::BadCookie`] if the magic cookie is not 99.130.83.99.
    /// - [`Error::OptionOverrun`] if an option's declared length runs
    ///   past the end of the input.
    ///
    /// Duplicate option codes are resolved by letting the last
    /// occurrence win, matching [`OptionMap::set`] semantics.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < DHCP_FIXED_HEADER_SIZE {
            return Err(Error::Truncated {
                actual: data.len(),
                required: DHCP_FIXED_HEADER_SIZE,
            });
        }

        let cookie_end = DHCP_MAGIC_COOKIE_OFFSET + DHCP_MAGIC_COOKIE.len();
        let cookie = &data[DHCP_MAGIC_COOKIE_OFFSET..cookie_end];
        if cookie != DHCP_MAGIC_COOKIE {
            let mut found = [0u8; 4];
            found.copy_from_slice(cookie);
            return Err(Error::BadCookie(found));
        }

        let op = data[0];
        let htype = data[1];
        let hlen = data[2];
        let hops = data[3];

        let xid = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        let secs = u16::from_be_bytes([data[8], data[9]]);
        let flags = u16::from_be_bytes([data[10], data[11]]);

        let ciaddr = Ipv4Addr::new(data[12], data[13], data[14], data[15]);
        let yiaddr = Ipv4Addr::new(data[16], data[17], data[18], data[19]);
        let siaddr = Ipv4Addr::new(data[20], data[21], data[22], data[23]);
        let giaddr = Ipv4Addr::new(data[24], data[25], data[26], data[27]);

        let mut chaddr = [0u8; DHCP_CHADDR_SIZE];
        chaddr.copy_from_slice(&data[28..44]);

        let mut sname = [0u8; DHCP_SNAME_SIZE];
        sname.copy_from_slice(&data[DHCP_SNAME_OFFSET..DHCP_SNAME_OFFSET + DHCP_SNAME_SIZE]);

        let mut file = [0u8; DHCP_FILE_SIZE];
        file.copy_from_slice(&data[DHCP_FILE_OFFSET..DHCP_FILE_OFFSET + DHCP_FILE_SIZE]);

        let options = Self::decode_options(&data[DHCP_FIXED_HEADER_SIZE..])?;

        Ok(Self {
            op,
            htype,
            hlen,
            hops,
            xid,
            secs,
            flags,
            ciaddr,
            yiaddr,
            siaddr,
            giaddr,
            chaddr,
            sname,
            file,
            options,
        })
    }

    fn decode_options(data: &[u8]) -> Result<OptionMap> {
        let mut options = OptionMap::new();
        let mut index = 0;

        while index < data.len() {
            let code = data[index];

            if code == OptionCode::Pad as u8 {
                index += 1;
                continue;
            }

            if code == OptionCode::End as u8 {
                break;
            }

            if index + 1 >= data.len() {
                return Err(Error::OptionOverrun {
                    code,
                    declared: 1,
                    remaining: 0,
                });
            }

            let length = data[index + 1] as usize;
            let remaining = data.len() - index - 2;
            if length > remaining {
                return Err(Error::OptionOverrun {
                    code,
                    declared: length,
                    remaining,
                });
            }

            options.set(code, data[index + 2..index + 2 + length].to_vec());
            index += 2 + length;
        }

        Ok(options)
    }

    /// Encodes the packet to bytes for transmission.
    ///
    /// The result is padded to at least 300 bytes per RFC 2131 (clamped
    /// to `max_length` when one is set). Options are emitted in
    /// ascending numeric code order followed by an end marker, so the
    /// same logical packet always produces identical bytes.
    ///
    /// When `max_length` is set, the message type option (53) is always
    /// retained; every other option is included only while it still
    /// fits within the budget.
    ///
    /// # Errors
    ///
    /// - [`Error::OptionTooLong`] if an option value exceeds 255 bytes.
    /// - [`Error::MessageTooLarge`] if the fixed header, cookie, message
    ///   type option, and end marker alone exceed `max_length`.
    pub fn encode(&self, opts: &EncodeOptions) -> Result<Vec<u8>> {
        let msg_type_code = OptionCode::MessageType as u8;

        for (code, value) in self.options.iter() {
            if value.len() > MAX_OPTION_VALUE_SIZE {
                return Err(Error::OptionTooLong {
                    code,
                    length: value.len(),
                });
            }
        }

        let msg_type_tlv_size = self.options.get(msg_type_code).map(|value| 2 + value.len());

        let max = opts.max_length.map(|len| len as usize);
        if let Some(max) = max {
            let required = DHCP_FIXED_HEADER_SIZE + 1 + msg_type_tlv_size.unwrap_or(0);
            if required > max {
                return Err(Error::MessageTooLarge { max, required });
            }
        }

        let mut packet = Vec::with_capacity(DHCP_ENCODE_CAPACITY);

        packet.push(self.op);
        packet.push(self.htype);
        packet.push(self.hlen);
        packet.push(self.hops);

        packet.extend_from_slice(&self.xid.to_be_bytes());
        packet.extend_from_slice(&self.secs.to_be_bytes());
        packet.extend_from_slice(&self.flags.to_be_bytes());

        packet.extend_from_slice(&self.ciaddr.octets());
        packet.extend_from_slice(&self.yiaddr.octets());
        packet.extend_from_slice(&self.siaddr.octets());
        packet.extend_from_slice(&self.giaddr.octets());

        packet.extend_from_slice(&self.chaddr);

        if opts.skip_sname {
            packet.extend_from_slice(&[0u8; DHCP_SNAME_SIZE]);
        } else {
            packet.extend_from_slice(&self.sname);
        }

        if opts.skip_file {
            packet.extend_from_slice(&[0u8; DHCP_FILE_SIZE]);
        } else {
            packet.extend_from_slice(&self.file);
        }

        packet.extend_from_slice(&DHCP_MAGIC_COOKIE);

        // Account for the end marker and message type up front so other
        // options cannot squeeze them out of the budget.
        let mut reserved = 1;
        if max.is_some() {
            reserved += msg_type_tlv_size.unwrap_or(0);
        }

        for (code, value) in self.options.iter() {
            let tlv_size = 2 + value.len();
            if let Some(max) = max {
                if code == msg_type_code {
                    reserved -= tlv_size;
                } else if packet.len() + reserved + tlv_size > max {
                    continue;
                }
            }
            packet.push(code);
            packet.push(value.len() as u8);
            packet.extend_from_slice(value);
        }

        packet.push(OptionCode::End as u8);

        let padded_size = match max {
            Some(max) => DHCP_MIN_PACKET_SIZE.min(max),
            None => DHCP_MIN_PACKET_SIZE,
        };
        while packet.len() < padded_size {
            packet.push(0);
        }

        Ok(packet)
    }

    /// Seeds a reply packet from a client request per RFC 2131 §4.3.1.
    ///
    /// The following fields are carried over from the request: `xid`,
    /// `flags` (broadcast bit), `giaddr` (relay agent address),
    /// `chaddr`, `htype`, and `hlen`. The operation code is set to
    /// [`BOOTREPLY`]; everything else starts zeroed for the caller to
    /// fill in.
    pub fn reply_to(request: &Packet) -> Self {
        let mut reply = Self::new(BOOTREPLY);
        reply.htype = request.htype;
        reply.hlen = request.hlen;
        reply.xid = request.xid;
        reply.flags = request.flags;
        reply.giaddr = request.giaddr;
        reply.chaddr = request.chaddr;
        reply
    }

    /// Returns the DHCP message type (option 53) if present.
    ///
    /// Returns `None` for BOOTP packets, which don't carry this option.
    pub fn message_type(&self) -> Option<MessageType> {
        self.options.message_type()
    }

    /// Sets the DHCP message type (option 53).
    pub fn set_message_type(&mut self, message_type: MessageType) {
        self.options.set_message_type(message_type);
    }

    /// Returns the raw value of an option, if present.
    pub fn option(&self, code: u8) -> Option<&[u8]> {
        self.options.get(code)
    }

    /// Sets an option to a raw value.
    pub fn set_option(&mut self, code: u8, value: impl Into<Vec<u8>>) {
        self.options.set(code, value);
    }

    /// Returns the maximum DHCP message size the sender can accept
    /// (option 57), if present and well-formed.
    pub fn max_message_size(&self) -> Option<u16> {
        let value = self.option(OptionCode::MaxMessageSize as u8)?;
        if value.len() != 2 {
            return None;
        }
        Some(u16::from_be_bytes([value[0], value[1]]))
    }

    /// Returns the client hardware address bytes (respecting `hlen`).
    pub fn chaddr_bytes(&self) -> &[u8] {
        let len = (self.hlen as usize).min(self.chaddr.len());
        &self.chaddr[..len]
    }

    /// Formats the client hardware address as a colon-separated string,
    /// e.g. "aa:bb:cc:dd:ee:ff" for Ethernet.
    pub fn format_chaddr(&self) -> String {
        use std::fmt::Write;
        let bytes = self.chaddr_bytes();
        let mut result = String::with_capacity(bytes.len() * 3);
        for (index, byte) in bytes.iter().enumerate() {
            if index > 0 {
                result.push(':');
            }
            let _ = write!(result, "{:02x}", byte);
        }
        result
    }

    /// Returns true if the broadcast flag (bit 15) is set.
    ///
    /// When set, servers must broadcast replies instead of unicasting.
    pub fn is_broadcast(&self) -> bool {
        (self.flags & 0x8000) != 0
    }
}
