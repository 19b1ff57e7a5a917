//! Human-readable rendering of packets and their option tables.
//!
//! A [`FormatRegistry`] maps option codes to formatting functions and is
//! constructed explicitly by the caller instead of living in process
//! globals, so formatting can be customized per call site and exercised
//! in isolation. [`FormatRegistry::default`] ships formatters for the
//! commonly logged options; unregistered codes render as
//! `option(code)="..."`, and a code can be suppressed entirely (useful
//! for noisy options like the parameter request list).

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::options::OptionCode;
use crate::packet::Packet;

/// Renders one option value for logging.
pub type OptionFormatter = fn(&[u8]) -> String;

/// Per-option formatting table.
///
/// Entries registered as suppressed are recognized but render nothing;
/// unknown codes fall back to a quoted byte dump.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    entries: BTreeMap<u8, Option<OptionFormatter>>,
}

impl FormatRegistry {
    /// Creates an empty registry: every option renders as a byte dump.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Creates a registry with formatters for the commonly logged
    /// options. Options 53, 55, and 57 are suppressed: the message type
    /// is rendered as part of the packet summary, and the other two are
    /// noise at the log level this is meant for.
    pub fn standard() -> Self {
        let mut registry = Self::empty();

        registry.suppress(OptionCode::MessageType as u8);
        registry.suppress(OptionCode::ParameterList as u8);
        registry.suppress(OptionCode::MaxMessageSize as u8);

        registry.register(OptionCode::SubnetMask as u8, |b| {
            format!("netmask={}", format_ip(b))
        });
        registry.register(OptionCode::Router as u8, |b| {
            format!("routers={}", format_ip(b))
        });
        registry.register(OptionCode::DomainServer as u8, |b| {
            format!("dns={}", format_ip(b))
        });
        registry.register(OptionCode::LogServer as u8, |b| {
            format!("syslog={}", format_ip(b))
        });
        registry.register(OptionCode::Hostname as u8, |b| {
            format!("hostname={}", String::from_utf8_lossy(b))
        });
        registry.register(OptionCode::VendorSpecific as u8, |b| {
            format!("vendor-specific={}", format_hex(b))
        });
        registry.register(OptionCode::AddressRequest as u8, |b| {
            format!("requested-ip={}", format_ip(b))
        });
        registry.register(OptionCode::AddressTime as u8, |b| {
            format!("lease-time={}", format_seconds(b))
        });
        registry.register(OptionCode::ServerId as u8, |b| {
            format!("dhcp-server={}", format_ip(b))
        });
        registry.register(OptionCode::Message as u8, |b| {
            format!("msg=\"{}\"", b.escape_ascii())
        });
        registry.register(OptionCode::ClassId as u8, |b| {
            format!("class-id=\"{}\"", b.escape_ascii())
        });
        registry.register(OptionCode::ClientId as u8, |b| {
            format!("client-id={}", format_hex(b))
        });
        registry.register(OptionCode::UserClass as u8, |b| {
            format!("user-class=\"{}\"", b.escape_ascii())
        });
        registry.register(OptionCode::ClientSystem as u8, |b| {
            if b.len() == 2 {
                format!("client-arch={}", u16::from_be_bytes([b[0], b[1]]))
            } else {
                format!("client-arch={}", format_hex(b))
            }
        });
        registry.register(OptionCode::ClientNdi as u8, |b| {
            format!("client-ndi={}", format_ndi(b))
        });
        registry.register(OptionCode::UuidGuid as u8, |b| {
            format!("uuid={}", format_uuid(b))
        });

        registry
    }

    /// Registers (or replaces) the formatter for an option code.
    pub fn register(&mut self, code: u8, formatter: OptionFormatter) {
        self.entries.insert(code, Some(formatter));
    }

    /// Marks an option code as recognized but never rendered.
    pub fn suppress(&mut self, code: u8) {
        self.entries.insert(code, None);
    }

    /// Renders one option, or `None` if the code is suppressed.
    pub fn format_option(&self, code: u8, value: &[u8]) -> Option<String> {
        match self.entries.get(&code) {
            Some(Some(formatter)) => Some(formatter(value)),
            Some(None) => None,
            None => Some(format!("option({})=\"{}\"", code, value.escape_ascii())),
        }
    }

    /// Renders a packet's option table as space-separated fields.
    ///
    /// Fields follow the option table's ascending code order, so the
    /// same packet always renders identically.
    pub fn format_options(&self, packet: &Packet) -> String {
        let mut fields = Vec::with_capacity(packet.options.len());
        for (code, value) in packet.options.iter() {
            if let Some(field) = self.format_option(code, value) {
                fields.push(field);
            }
        }
        fields.join(" ")
    }

    /// Renders a one-line summary of a packet: message type, client
    /// hardware address, assigned address when set, and options.
    pub fn summarize(&self, packet: &Packet) -> String {
        let mut line = String::new();

        match packet.message_type() {
            Some(message_type) => line.push_str(&message_type.to_string()),
            None => line.push_str("BOOTP"),
        }

        let _ = write!(line, " chaddr={}", packet.format_chaddr());
        let _ = write!(line, " xid={:#010x}", packet.xid);

        if !packet.yiaddr.is_unspecified() {
            let _ = write!(line, " yiaddr={}", packet.yiaddr);
        }
        if !packet.giaddr.is_unspecified() {
            let _ = write!(line, " giaddr={}", packet.giaddr);
        }

        let options = self.format_options(packet);
        if !options.is_empty() {
            line.push(' ');
            line.push_str(&options);
        }

        line
    }
}

fn format_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3 + 2);
    out.push('"');
    for (index, byte) in bytes.iter().enumerate() {
        if index > 0 {
            out.push(':');
        }
        let _ = write!(out, "{:02x}", byte);
    }
    out.push('"');
    out
}

fn format_ip(bytes: &[u8]) -> String {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return format!("\"{}\"", bytes.escape_ascii());
    }
    let quads: Vec<String> = bytes
        .chunks_exact(4)
        .map(|chunk| format!("{}.{}.{}.{}", chunk[0], chunk[1], chunk[2], chunk[3]))
        .collect();
    quads.join(",")
}

fn format_seconds(bytes: &[u8]) -> String {
    if bytes.len() != 4 {
        return format_hex(bytes);
    }
    let secs = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    format!("{}s", secs)
}

fn format_ndi(bytes: &[u8]) -> String {
    if bytes.len() != 3 {
        return format_hex(bytes);
    }
    if bytes[0] == 1 {
        format!("UNDI-{}.{}", bytes[1], bytes[2])
    } else {
        format!("{}-{}.{}", bytes[0], bytes[1], bytes[2])
    }
}

fn format_uuid(bytes: &[u8]) -> String {
    // Value is a type byte followed by the 16-byte identifier.
    if bytes.len() != 17 {
        return format_hex(bytes);
    }
    let b = &bytes[1..];
    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11], b[12], b[13],
        b[14], b[15]
    )
}
