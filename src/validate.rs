//! Option-presence validation for server replies.
//!
//! RFC 2131 table 3 mandates which options each server-to-client message
//! type MUST carry, MUST NOT carry, or MAY carry. This module expresses
//! those tables as small rule lists evaluated against a packet's option
//! table before the reply is allowed onto the wire.
//!
//! Rules are evaluated in declaration order and evaluation stops at the
//! first violation, so the order a table declares its rules determines
//! which single error is reported when multiple violations exist.

use crate::error::{Error, Result};
use crate::options::OptionCode;
use crate::packet::Packet;

/// A single option-presence rule.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// The option MUST be present.
    Must(u8),
    /// The option MUST NOT be present.
    MustNot(u8),
    /// Deny-by-default: any option not listed (and not the message type
    /// option, which is implicitly always allowed) is a violation.
    AllowedOptions(&'static [u8]),
}

impl Rule {
    fn check(&self, packet: &Packet) -> Result<()> {
        match *self {
            Rule::Must(code) => {
                if !packet.options.contains(code) {
                    return Err(Error::MissingRequiredOption(code));
                }
                Ok(())
            }
            Rule::MustNot(code) => {
                if packet.options.contains(code) {
                    return Err(Error::ForbiddenOption(code));
                }
                Ok(())
            }
            Rule::AllowedOptions(allowed) => {
                for (code, _) in packet.options.iter() {
                    if code == OptionCode::MessageType as u8 {
                        continue;
                    }
                    if !allowed.contains(&code) {
                        return Err(Error::DisallowedOption(code));
                    }
                }
                Ok(())
            }
        }
    }
}

/// Evaluates `rules` against `packet`, returning the first violation.
pub fn validate(packet: &Packet, rules: &[Rule]) -> Result<()> {
    for rule in rules {
        rule.check(packet)?;
    }
    Ok(())
}

// From RFC2131, table 3:
//   Option                    DHCPOFFER
//   ------                    ---------
//   Requested IP address      MUST NOT
//   IP address lease time     MUST
//   Use 'file'/'sname' fields MAY
//   DHCP message type         DHCPOFFER
//   Parameter request list    MUST NOT
//   Message                   SHOULD
//   Client identifier         MUST NOT
//   Vendor class identifier   MAY
//   Server identifier         MUST
//   Maximum message size      MUST NOT
//   All others                MAY
pub(crate) const OFFER_RULES: &[Rule] = &[
    Rule::MustNot(OptionCode::AddressRequest as u8),
    Rule::Must(OptionCode::AddressTime as u8),
    Rule::MustNot(OptionCode::ParameterList as u8),
    Rule::MustNot(OptionCode::ClientId as u8),
    Rule::Must(OptionCode::ServerId as u8),
    Rule::MustNot(OptionCode::MaxMessageSize as u8),
];

// From RFC2131, table 3:
//   Option                    DHCPACK
//   ------                    -------
//   Requested IP address      MUST NOT
//   IP address lease time     MUST (DHCPREQUEST)
//                             MUST NOT (DHCPINFORM)
//   Use 'file'/'sname' fields MAY
//   DHCP message type         DHCPACK
//   Parameter request list    MUST NOT
//   Message                   SHOULD
//   Client identifier         MUST NOT
//   Vendor class identifier   MAY
//   Server identifier         MUST
//   Maximum message size      MUST NOT
//   All others                MAY
pub(crate) const ACK_RULES: &[Rule] = &[
    Rule::MustNot(OptionCode::AddressRequest as u8),
    Rule::MustNot(OptionCode::ParameterList as u8),
    Rule::MustNot(OptionCode::ClientId as u8),
    Rule::Must(OptionCode::ServerId as u8),
    Rule::MustNot(OptionCode::MaxMessageSize as u8),
];

/// Lease time handling when the Ack answers a DHCPREQUEST.
pub(crate) const ACK_ON_REQUEST_RULES: &[Rule] = &[Rule::Must(OptionCode::AddressTime as u8)];

/// Lease time handling when the Ack answers a DHCPINFORM.
pub(crate) const ACK_ON_INFORM_RULES: &[Rule] = &[Rule::MustNot(OptionCode::AddressTime as u8)];

// From RFC2131, table 3:
//   Option                    DHCPNAK
//   ------                    -------
//   Requested IP address      MUST NOT
//   IP address lease time     MUST NOT
//   Use 'file'/'sname' fields MUST NOT
//   DHCP message type         DHCPNAK
//   Parameter request list    MUST NOT
//   Message                   SHOULD
//   Client identifier         MAY
//   Vendor class identifier   MAY
//   Server identifier         MUST
//   Maximum message size      MUST NOT
//   All others                MUST NOT
pub(crate) const NAK_ALLOWED_OPTIONS: &[u8] = &[
    OptionCode::MessageType as u8,
    OptionCode::Message as u8,
    OptionCode::ClientId as u8,
    OptionCode::ClassId as u8,
    OptionCode::ServerId as u8,
];

pub(crate) const NAK_RULES: &[Rule] = &[
    Rule::Must(OptionCode::ServerId as u8),
    Rule::AllowedOptions(NAK_ALLOWED_OPTIONS),
];
