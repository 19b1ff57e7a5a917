//! Server-to-client reply variants: Offer, Ack, and Nak.
//!
//! Each variant owns a freshly seeded reply [`Packet`] and borrows the
//! originating request [`Message`]. The request is consulted twice after
//! construction: at validation time (an Ack's rules depend on whether it
//! answers a REQUEST or an INFORM) and at serialization time (the
//! client's maximum message size, option 57, bounds the encoding).
//!
//! A reply is mutated only while the caller fills in addresses and
//! options; [`validate`](Reply::validate) and
//! [`to_bytes`](Reply::to_bytes) treat it as immutable.

use crate::error::Result;
use crate::message::Message;
use crate::options::{MessageType, OptionCode};
use crate::packet::{EncodeOptions, Packet};
use crate::validate::{
    validate, ACK_ON_INFORM_RULES, ACK_ON_REQUEST_RULES, ACK_RULES, NAK_RULES, OFFER_RULES,
};

/// Capabilities every server reply provides: RFC-conformance validation,
/// wire serialization, and access to the originating request.
pub trait Reply {
    /// Checks the reply against its RFC 2131 table 3 rule set.
    fn validate(&self) -> Result<()>;

    /// Serializes the reply, honoring the client's declared maximum
    /// message size.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// The originating request.
    fn message(&self) -> &dyn Message;
}

/// Builds the serialization options shared by every reply variant: copy
/// the client's maximum message size (option 57) into the encoding
/// budget when present.
fn reply_encode_options(msg: &dyn Message) -> EncodeOptions {
    let mut opts = EncodeOptions::default();
    if let Some(value) = msg.option(OptionCode::MaxMessageSize as u8) {
        if value.len() == 2 {
            opts.max_length = Some(u16::from_be_bytes([value[0], value[1]]));
        }
    }
    opts
}

/// A server-to-client packet in response to DHCPDISCOVER with an offer
/// of configuration parameters.
pub struct Offer<'a> {
    /// The reply under construction.
    pub packet: Packet,

    msg: &'a dyn Message,
}

impl<'a> Offer<'a> {
    /// Creates an Offer seeded from the request per RFC 2131 §4.3.1.
    pub fn new(msg: &'a dyn Message) -> Self {
        let mut packet = Packet::reply_to(msg.packet());
        packet.set_message_type(MessageType::Offer);
        Self { packet, msg }
    }
}

impl Reply for Offer<'_> {
    fn validate(&self) -> Result<()> {
        validate(&self.packet, OFFER_RULES)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let opts = reply_encode_options(self.msg);
        self.packet.encode(&opts)
    }

    fn message(&self) -> &dyn Message {
        self.msg
    }
}

/// A server-to-client packet with configuration parameters, including a
/// committed network address.
pub struct Ack<'a> {
    /// The reply under construction.
    pub packet: Packet,

    msg: &'a dyn Message,
}

impl<'a> Ack<'a> {
    /// Creates an Ack seeded from the request per RFC 2131 §4.3.1.
    pub fn new(msg: &'a dyn Message) -> Self {
        let mut packet = Packet::reply_to(msg.packet());
        packet.set_message_type(MessageType::Ack);
        Self { packet, msg }
    }
}

impl Reply for Ack<'_> {
    fn validate(&self) -> Result<()> {
        // Lease time rules are subtly different based on the type of
        // request being acknowledged.
        match self.msg.message_type() {
            Some(MessageType::Request) => validate(&self.packet, ACK_ON_REQUEST_RULES)?,
            Some(MessageType::Inform) => validate(&self.packet, ACK_ON_INFORM_RULES)?,
            _ => {}
        }

        validate(&self.packet, ACK_RULES)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let opts = reply_encode_options(self.msg);
        self.packet.encode(&opts)
    }

    fn message(&self) -> &dyn Message {
        self.msg
    }
}

/// A server-to-client packet indicating the client's notion of its
/// network address is incorrect (e.g. it moved to a new subnet) or its
/// lease has expired.
pub struct Nak<'a> {
    /// The reply under construction.
    pub packet: Packet,

    msg: &'a dyn Message,
}

impl<'a> Nak<'a> {
    /// Creates a Nak seeded from the request per RFC 2131 §4.3.1.
    pub fn new(msg: &'a dyn Message) -> Self {
        let mut packet = Packet::reply_to(msg.packet());
        packet.set_message_type(MessageType::Nak);
        Self { packet, msg }
    }
}

impl Reply for Nak<'_> {
    fn validate(&self) -> Result<()> {
        validate(&self.packet, NAK_RULES)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        // A NAK must not use the 'file'/'sname' fields.
        let mut opts = reply_encode_options(self.msg);
        opts.skip_file = true;
        opts.skip_sname = true;
        self.packet.encode(&opts)
    }

    fn message(&self) -> &dyn Message {
        self.msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::options::OptionMap;
    use crate::packet::{BOOTREQUEST, DHCP_FIXED_HEADER_SIZE};

    struct TestMessage {
        packet: Packet,
    }

    impl TestMessage {
        fn new(message_type: MessageType) -> Self {
            let mut packet = Packet::new(BOOTREQUEST);
            packet.xid = 0x1a2b3c4d;
            packet.set_message_type(message_type);
            Self { packet }
        }
    }

    impl Message for TestMessage {
        fn packet(&self) -> &Packet {
            &self.packet
        }

        fn interface_index(&self) -> u32 {
            0
        }
    }

    /// Exercises a reply's rule set the way RFC 2131 table 3 reads:
    /// with every `must` option present the reply validates; removing
    /// any single `must` option or adding any single `must_not` option
    /// makes it fail, naming exactly that option.
    fn check_rule_matrix<F>(build: F, must: &[u8], must_not: &[u8])
    where
        F: Fn(&OptionMap) -> Result<()>,
    {
        let mut base = OptionMap::new();
        for &code in must {
            base.set(code, vec![0, 0, 0, 0]);
        }

        build(&base).expect("reply with all required options must validate");

        for &code in must {
            let mut options = base.clone();
            options.remove(code);
            let err = build(&options).unwrap_err();
            assert!(
                matches!(err, Error::MissingRequiredOption(c) if c == code),
                "expected missing-option error for {code}, got {err:?}"
            );
        }

        for &code in must_not {
            let mut options = base.clone();
            options.set(code, vec![0, 0, 0, 0]);
            let err = build(&options).unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::ForbiddenOption(c) | Error::DisallowedOption(c) if c == code
                ),
                "expected forbidden/disallowed error for {code}, got {err:?}"
            );
        }
    }

    fn apply(packet: &mut Packet, options: &OptionMap) {
        for (code, value) in options.iter() {
            packet.set_option(code, value.to_vec());
        }
    }

    #[test]
    fn test_offer_validation() {
        check_rule_matrix(
            |options| {
                let msg = TestMessage::new(MessageType::Discover);
                let mut offer = Offer::new(&msg);
                apply(&mut offer.packet, options);
                offer.validate()
            },
            &[
                OptionCode::AddressTime as u8,
                OptionCode::ServerId as u8,
            ],
            &[
                OptionCode::AddressRequest as u8,
                OptionCode::ParameterList as u8,
                OptionCode::ClientId as u8,
                OptionCode::MaxMessageSize as u8,
            ],
        );
    }

    #[test]
    fn test_ack_on_request_validation() {
        check_rule_matrix(
            |options| {
                let msg = TestMessage::new(MessageType::Request);
                let mut ack = Ack::new(&msg);
                apply(&mut ack.packet, options);
                ack.validate()
            },
            &[
                OptionCode::AddressTime as u8,
                OptionCode::ServerId as u8,
            ],
            &[
                OptionCode::AddressRequest as u8,
                OptionCode::ParameterList as u8,
                OptionCode::ClientId as u8,
                OptionCode::MaxMessageSize as u8,
            ],
        );
    }

    #[test]
    fn test_ack_on_inform_validation() {
        check_rule_matrix(
            |options| {
                let msg = TestMessage::new(MessageType::Inform);
                let mut ack = Ack::new(&msg);
                apply(&mut ack.packet, options);
                ack.validate()
            },
            &[OptionCode::ServerId as u8],
            &[
                OptionCode::AddressRequest as u8,
                OptionCode::AddressTime as u8,
                OptionCode::ParameterList as u8,
                OptionCode::ClientId as u8,
                OptionCode::MaxMessageSize as u8,
            ],
        );
    }

    #[test]
    fn test_nak_validation_denies_by_default() {
        check_rule_matrix(
            |options| {
                let msg = TestMessage::new(MessageType::Request);
                let mut nak = Nak::new(&msg);
                apply(&mut nak.packet, options);
                nak.validate()
            },
            &[OptionCode::ServerId as u8],
            &[
                OptionCode::AddressRequest as u8,
                OptionCode::AddressTime as u8,
                // Random options that are not called out explicitly,
                // to exercise the deny-by-default policy.
                128,
                129,
            ],
        );
    }

    #[test]
    fn test_nak_allows_called_out_options() {
        let msg = TestMessage::new(MessageType::Request);
        let mut nak = Nak::new(&msg);
        nak.packet.set_option(OptionCode::ServerId as u8, vec![192, 168, 1, 1]);
        nak.packet.set_option(OptionCode::Message as u8, b"address not on subnet".to_vec());
        nak.packet.set_option(OptionCode::ClientId as u8, vec![1, 0xaa, 0xbb]);
        nak.packet.set_option(OptionCode::ClassId as u8, b"MSFT 5.0".to_vec());
        assert!(nak.validate().is_ok());
    }

    #[test]
    fn test_ack_context_rules_report_first() {
        // With both the lease time and the server identifier missing,
        // the origin-specific rule set reports before the common one.
        let msg = TestMessage::new(MessageType::Request);
        let ack = Ack::new(&msg);
        assert!(matches!(
            ack.validate(),
            Err(Error::MissingRequiredOption(51))
        ));

        let msg = TestMessage::new(MessageType::Inform);
        let mut ack = Ack::new(&msg);
        ack.packet.set_option(OptionCode::AddressTime as u8, vec![0, 1, 81, 128]);
        assert!(matches!(ack.validate(), Err(Error::ForbiddenOption(51))));
    }

    #[test]
    fn test_reply_seeds_header_from_request() {
        let mut msg = TestMessage::new(MessageType::Discover);
        msg.packet.flags = 0x8000;
        msg.packet.giaddr = std::net::Ipv4Addr::new(10, 0, 0, 1);
        msg.packet.chaddr[..6].copy_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);

        let offer = Offer::new(&msg);
        assert_eq!(offer.packet.op, crate::packet::BOOTREPLY);
        assert_eq!(offer.packet.xid, msg.packet.xid);
        assert_eq!(offer.packet.flags, msg.packet.flags);
        assert_eq!(offer.packet.giaddr, msg.packet.giaddr);
        assert_eq!(offer.packet.chaddr, msg.packet.chaddr);
        assert_eq!(offer.packet.message_type(), Some(MessageType::Offer));
    }

    #[test]
    fn test_to_bytes_honors_client_max_message_size() {
        let mut msg = TestMessage::new(MessageType::Request);
        msg.packet.set_option(OptionCode::MaxMessageSize as u8, 300u16.to_be_bytes().to_vec());

        let mut ack = Ack::new(&msg);
        ack.packet.set_option(OptionCode::ServerId as u8, vec![192, 168, 1, 1]);
        ack.packet.set_option(OptionCode::AddressTime as u8, 86400u32.to_be_bytes().to_vec());
        ack.packet.set_option(43, vec![0xab; 120]);
        ack.packet.set_option(60, vec![0xcd; 120]);

        // The unbounded encoding would exceed the client's budget.
        assert!(ack.packet.encode(&EncodeOptions::default()).unwrap().len() > 300);

        let bytes = ack.to_bytes().unwrap();
        assert!(bytes.len() <= 300);

        let decoded = Packet::decode(&bytes).unwrap();
        assert_eq!(decoded.message_type(), Some(MessageType::Ack));
        assert!(decoded.options.contains(OptionCode::ServerId as u8));
    }

    #[test]
    fn test_to_bytes_fails_on_impossible_budget() {
        let mut msg = TestMessage::new(MessageType::Request);
        msg.packet.set_option(OptionCode::MaxMessageSize as u8, 100u16.to_be_bytes().to_vec());

        let nak = Nak::new(&msg);
        assert!(matches!(
            nak.to_bytes(),
            Err(Error::MessageTooLarge { max: 100, .. })
        ));
    }

    #[test]
    fn test_to_bytes_ignores_malformed_max_message_size() {
        let mut msg = TestMessage::new(MessageType::Request);
        msg.packet.set_option(OptionCode::MaxMessageSize as u8, vec![1]);

        let mut ack = Ack::new(&msg);
        ack.packet.set_option(OptionCode::ServerId as u8, vec![192, 168, 1, 1]);
        assert!(ack.to_bytes().is_ok());
    }

    #[test]
    fn test_nak_zeroes_sname_and_file_on_the_wire() {
        let msg = TestMessage::new(MessageType::Request);
        let mut nak = Nak::new(&msg);
        nak.packet.sname[..6].copy_from_slice(b"server");
        nak.packet.file[..4].copy_from_slice(b"boot");
        nak.packet.set_option(OptionCode::ServerId as u8, vec![192, 168, 1, 1]);

        let bytes = nak.to_bytes().unwrap();
        assert!(bytes[44..108].iter().all(|&byte| byte == 0));
        assert!(bytes[108..236].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_offer_keeps_sname_and_file_on_the_wire() {
        let msg = TestMessage::new(MessageType::Discover);
        let mut offer = Offer::new(&msg);
        offer.packet.sname[..6].copy_from_slice(b"server");
        offer.packet.set_option(OptionCode::ServerId as u8, vec![192, 168, 1, 1]);

        let bytes = offer.to_bytes().unwrap();
        assert_eq!(&bytes[44..50], b"server");
        assert!(bytes.len() >= DHCP_FIXED_HEADER_SIZE);
    }
}
