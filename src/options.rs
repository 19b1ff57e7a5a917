//! DHCP option codes and the option table.
//!
//! DHCP uses options to convey configuration parameters between servers
//! and clients. Each option is encoded as a code (1 byte), length
//! (1 byte), and variable-length data. This module defines the option
//! codes referenced by validation and logging, the message type values
//! carried in option 53, and [`OptionMap`] — the table of raw option
//! values embedded in every [`Packet`](crate::Packet).
//!
//! # References
//!
//! - RFC 2132: DHCP Options and BOOTP Vendor Extensions

use std::collections::BTreeMap;

/// DHCP option codes as defined in RFC 2132.
///
/// Only codes used by validation, reply construction, or the formatter
/// registry are named; [`OptionMap`] stores any code as a raw `u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OptionCode {
    /// Padding (no operation). Structural, never stored.
    Pad = 0,
    /// Subnet mask (RFC 2132 §3.3).
    SubnetMask = 1,
    /// Router/gateway addresses (RFC 2132 §3.5).
    Router = 3,
    /// DNS server addresses (RFC 2132 §3.8).
    DomainServer = 6,
    /// Syslog server addresses (RFC 2132 §3.10).
    LogServer = 7,
    /// Client hostname (RFC 2132 §3.14).
    Hostname = 12,
    /// Vendor-specific information (RFC 2132 §8.4).
    VendorSpecific = 43,
    /// Requested IP address (RFC 2132 §9.1).
    AddressRequest = 50,
    /// IP address lease time in seconds (RFC 2132 §9.2).
    AddressTime = 51,
    /// DHCP message type (RFC 2132 §9.6).
    MessageType = 53,
    /// Server identifier (RFC 2132 §9.7).
    ServerId = 54,
    /// Parameter request list (RFC 2132 §9.8).
    ParameterList = 55,
    /// Error/informational message text (RFC 2132 §9.9).
    Message = 56,
    /// Maximum DHCP message size the sender can accept (RFC 2132 §9.10).
    MaxMessageSize = 57,
    /// Vendor class identifier (RFC 2132 §9.13).
    ClassId = 60,
    /// Client identifier (RFC 2132 §9.14).
    ClientId = 61,
    /// User class information (RFC 3004).
    UserClass = 77,
    /// Client system architecture (RFC 4578).
    ClientSystem = 93,
    /// Client network device interface (RFC 4578).
    ClientNdi = 94,
    /// Client machine identifier / UUID (RFC 4578).
    UuidGuid = 97,
    /// End of options marker. Structural, never stored.
    End = 255,
}

/// DHCP message types (option 53) as defined in RFC 2132 §9.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Client broadcast to locate servers.
    Discover = 1,
    /// Server response to DISCOVER with an offer of parameters.
    Offer = 2,
    /// Client request for offered parameters.
    Request = 3,
    /// Client indicates the address is already in use.
    Decline = 4,
    /// Server acknowledgement with configuration.
    Ack = 5,
    /// Server negative acknowledgement.
    Nak = 6,
    /// Client releases its address.
    Release = 7,
    /// Client asks for local configuration only; it already has an
    /// externally configured address.
    Inform = 8,
}

impl TryFrom<u8> for MessageType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Discover),
            2 => Ok(Self::Offer),
            3 => Ok(Self::Request),
            4 => Ok(Self::Decline),
            5 => Ok(Self::Ack),
            6 => Ok(Self::Nak),
            7 => Ok(Self::Release),
            8 => Ok(Self::Inform),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discover => write!(f, "DISCOVER"),
            Self::Offer => write!(f, "OFFER"),
            Self::Request => write!(f, "REQUEST"),
            Self::Decline => write!(f, "DECLINE"),
            Self::Ack => write!(f, "ACK"),
            Self::Nak => write!(f, "NAK"),
            Self::Release => write!(f, "RELEASE"),
            Self::Inform => write!(f, "INFORM"),
        }
    }
}

/// The table of options carried by one DHCP packet.
///
/// Maps option code to the raw value bytes. Keys are unique: setting a
/// code that is already present replaces its value, which also gives
/// the decoder its documented duplicate-handling behavior (last
/// occurrence wins). Iteration is always in ascending numeric code
/// order, so encoding and logging are deterministic regardless of the
/// order options were inserted.
///
/// Codes 0 (pad) and 255 (end) are structural wire markers and are
/// never stored; [`set`](Self::set) ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: BTreeMap<u8, Vec<u8>>,
}

impl OptionMap {
    /// Creates an empty option table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value for `code`, if present.
    pub fn get(&self, code: u8) -> Option<&[u8]> {
        self.entries.get(&code).map(Vec::as_slice)
    }

    /// Returns true if `code` is present.
    pub fn contains(&self, code: u8) -> bool {
        self.entries.contains_key(&code)
    }

    /// Sets `code` to `value`, replacing any existing value.
    ///
    /// Pad (0) and end (255) are structural markers, not options, and
    /// are silently ignored.
    pub fn set(&mut self, code: u8, value: impl Into<Vec<u8>>) {
        if code == OptionCode::Pad as u8 || code == OptionCode::End as u8 {
            return;
        }
        self.entries.insert(code, value.into());
    }

    /// Removes `code` from the table, returning its value if present.
    pub fn remove(&mut self, code: u8) -> Option<Vec<u8>> {
        self.entries.remove(&code)
    }

    /// Number of options present.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no options are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(code, value)` pairs in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[u8])> {
        self.entries
            .iter()
            .map(|(code, value)| (*code, value.as_slice()))
    }

    /// The codes present, in ascending numeric order.
    pub fn sorted_codes(&self) -> Vec<u8> {
        self.entries.keys().copied().collect()
    }

    /// The message type (option 53), if present and recognized.
    pub fn message_type(&self) -> Option<MessageType> {
        let value = self.get(OptionCode::MessageType as u8)?;
        if value.len() != 1 {
            return None;
        }
        MessageType::try_from(value[0]).ok()
    }

    /// Sets the message type (option 53).
    pub fn set_message_type(&mut self, message_type: MessageType) {
        self.set(OptionCode::MessageType as u8, vec![message_type as u8]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_conversions() {
        for value in 1..=8u8 {
            let msg_type = MessageType::try_from(value).unwrap();
            assert_eq!(msg_type as u8, value);
        }
        assert!(MessageType::try_from(0).is_err());
        assert!(MessageType::try_from(9).is_err());
    }

    #[test]
    fn test_message_type_display() {
        assert_eq!(format!("{}", MessageType::Discover), "DISCOVER");
        assert_eq!(format!("{}", MessageType::Offer), "OFFER");
        assert_eq!(format!("{}", MessageType::Nak), "NAK");
        assert_eq!(format!("{}", MessageType::Inform), "INFORM");
    }

    #[test]
    fn test_set_replaces_existing_value() {
        let mut options = OptionMap::new();
        options.set(OptionCode::Hostname as u8, b"first".to_vec());
        options.set(OptionCode::Hostname as u8, b"second".to_vec());
        assert_eq!(options.get(OptionCode::Hostname as u8), Some(&b"second"[..]));
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_pad_and_end_never_stored() {
        let mut options = OptionMap::new();
        options.set(OptionCode::Pad as u8, vec![1, 2, 3]);
        options.set(OptionCode::End as u8, vec![4, 5, 6]);
        assert!(options.is_empty());
    }

    #[test]
    fn test_sorted_codes_is_numeric_order() {
        let mut options = OptionMap::new();
        options.set(61, vec![1]);
        options.set(1, vec![255, 255, 255, 0]);
        options.set(53, vec![MessageType::Discover as u8]);
        assert_eq!(options.sorted_codes(), vec![1, 53, 61]);
    }

    #[test]
    fn test_iteration_order_independent_of_insertion() {
        let mut forward = OptionMap::new();
        forward.set(1, vec![0]);
        forward.set(51, vec![1]);
        forward.set(54, vec![2]);

        let mut backward = OptionMap::new();
        backward.set(54, vec![2]);
        backward.set(51, vec![1]);
        backward.set(1, vec![0]);

        assert_eq!(forward, backward);
        let forward_codes: Vec<u8> = forward.iter().map(|(code, _)| code).collect();
        let backward_codes: Vec<u8> = backward.iter().map(|(code, _)| code).collect();
        assert_eq!(forward_codes, backward_codes);
    }

    #[test]
    fn test_message_type_accessor() {
        let mut options = OptionMap::new();
        assert_eq!(options.message_type(), None);

        options.set_message_type(MessageType::Request);
        assert_eq!(options.message_type(), Some(MessageType::Request));

        options.set(OptionCode::MessageType as u8, vec![99]);
        assert_eq!(options.message_type(), None);
    }

    #[test]
    fn test_remove() {
        let mut options = OptionMap::new();
        options.set(54, vec![192, 168, 1, 1]);
        assert_eq!(options.remove(54), Some(vec![192, 168, 1, 1]));
        assert_eq!(options.remove(54), None);
        assert!(!options.contains(54));
    }
}
