//! End-to-end request/reply cycles: decode bytes, wrap them in a typed
//! request, build a reply, validate it, and serialize it through a
//! capturing `ReplyWriter`.

use std::cell::RefCell;
use std::net::Ipv4Addr;

use dhcpwire::{
    Ack, Discover, Inform, Message, MessageType, Nak, Offer, OptionCode, Packet, Reply,
    ReplyWriter, Request, Result, BOOTREPLY, BOOTREQUEST,
};

const SERVER_ID: [u8; 4] = [192, 168, 1, 1];

struct CapturingWriter {
    frames: RefCell<Vec<Vec<u8>>>,
}

impl CapturingWriter {
    fn new() -> Self {
        Self {
            frames: RefCell::new(Vec::new()),
        }
    }

    fn last_frame(&self) -> Vec<u8> {
        self.frames.borrow().last().cloned().expect("no reply written")
    }
}

impl ReplyWriter for CapturingWriter {
    fn write_reply(&self, reply: &dyn Reply) -> Result<()> {
        reply.validate()?;
        self.frames.borrow_mut().push(reply.to_bytes()?);
        Ok(())
    }
}

fn client_request(message_type: MessageType) -> Packet {
    let mut packet = Packet::new(BOOTREQUEST);
    packet.xid = 0x22334455;
    packet.flags = 0x8000;
    packet.chaddr[..6].copy_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    packet.set_message_type(message_type);
    packet
}

#[test]
fn discover_offer_cycle() {
    let writer = CapturingWriter::new();

    // Arrive as bytes, the way the transport hands them over.
    let wire = client_request(MessageType::Discover)
        .encode(&Default::default())
        .unwrap();
    let discover = Discover::new(Packet::decode(&wire).unwrap(), 2, &writer);

    let mut offer = Offer::new(&discover);
    offer.packet.yiaddr = Ipv4Addr::new(192, 168, 1, 100);
    offer
        .packet
        .set_option(OptionCode::AddressTime as u8, 86400u32.to_be_bytes().to_vec());
    offer
        .packet
        .set_option(OptionCode::ServerId as u8, SERVER_ID.to_vec());

    discover.write_reply(&offer).unwrap();

    let reply = Packet::decode(&writer.last_frame()).unwrap();
    assert_eq!(reply.op, BOOTREPLY);
    assert_eq!(reply.xid, 0x22334455);
    assert!(reply.is_broadcast());
    assert_eq!(reply.message_type(), Some(MessageType::Offer));
    assert_eq!(reply.yiaddr, Ipv4Addr::new(192, 168, 1, 100));
    assert_eq!(reply.option(OptionCode::ServerId as u8), Some(&SERVER_ID[..]));
}

#[test]
fn request_ack_cycle_respects_client_size_limit() {
    let writer = CapturingWriter::new();

    let mut packet = client_request(MessageType::Request);
    packet.set_option(OptionCode::MaxMessageSize as u8, 300u16.to_be_bytes().to_vec());
    let request = Request::new(packet, 2, &writer);

    let mut ack = Ack::new(&request);
    ack.packet.yiaddr = Ipv4Addr::new(192, 168, 1, 100);
    ack.packet
        .set_option(OptionCode::AddressTime as u8, 86400u32.to_be_bytes().to_vec());
    ack.packet
        .set_option(OptionCode::ServerId as u8, SERVER_ID.to_vec());
    // Bulk vendor payload that cannot fit the client's budget.
    ack.packet.set_option(OptionCode::VendorSpecific as u8, vec![0xab; 200]);

    request.write_reply(&ack).unwrap();

    let frame = writer.last_frame();
    assert!(frame.len() <= 300);

    let reply = Packet::decode(&frame).unwrap();
    assert_eq!(reply.message_type(), Some(MessageType::Ack));
    assert!(reply.options.contains(OptionCode::AddressTime as u8));
    assert!(!reply.options.contains(OptionCode::VendorSpecific as u8));
}

#[test]
fn request_nak_cycle() {
    let writer = CapturingWriter::new();
    let request = Request::new(client_request(MessageType::Request), 2, &writer);

    let mut nak = Nak::new(&request);
    nak.packet.sname[..6].copy_from_slice(b"server");
    nak.packet
        .set_option(OptionCode::ServerId as u8, SERVER_ID.to_vec());
    nak.packet
        .set_option(OptionCode::Message as u8, b"requested address not available".to_vec());

    request.write_reply(&nak).unwrap();

    let frame = writer.last_frame();
    let reply = Packet::decode(&frame).unwrap();
    assert_eq!(reply.message_type(), Some(MessageType::Nak));
    // The sname field must not survive onto the wire.
    assert!(frame[44..108].iter().all(|&byte| byte == 0));
}

#[test]
fn inform_ack_cycle_has_no_lease_time() {
    let writer = CapturingWriter::new();
    let inform = Inform::new(client_request(MessageType::Inform), 2, &writer);

    let mut ack = Ack::new(&inform);
    ack.packet
        .set_option(OptionCode::ServerId as u8, SERVER_ID.to_vec());

    inform.write_reply(&ack).unwrap();

    let reply = Packet::decode(&writer.last_frame()).unwrap();
    assert_eq!(reply.message_type(), Some(MessageType::Ack));
    assert!(!reply.options.contains(OptionCode::AddressTime as u8));
}

#[test]
fn non_conformant_reply_is_refused_by_the_writer() {
    let writer = CapturingWriter::new();
    let request = Request::new(client_request(MessageType::Request), 2, &writer);

    // Missing both the lease time and the server identifier.
    let ack = Ack::new(&request);
    assert!(request.write_reply(&ack).is_err());
    assert!(writer.frames.borrow().is_empty());
}

#[test]
fn request_origin_is_reachable_from_the_reply() {
    let writer = CapturingWriter::new();
    let request = Request::new(client_request(MessageType::Request), 9, &writer);

    let ack = Ack::new(&request);
    assert_eq!(ack.message().interface_index(), 9);
    assert_eq!(ack.message().message_type(), Some(MessageType::Request));
}
