use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dhcpwire::{Error, FormatRegistry, Packet, Result};

#[derive(Parser)]
#[command(name = "dhcpwire")]
#[command(author, version, about = "Decode and inspect DHCP packet dumps", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a packet dump and print its fields and options.
    Decode {
        /// File containing one raw DHCP packet.
        input: PathBuf,

        /// Treat the input as hex text instead of raw bytes.
        #[arg(long)]
        hex: bool,
    },
    /// Print the one-line summary used for logging.
    Summarize {
        /// File containing one raw DHCP packet.
        input: PathBuf,

        /// Treat the input as hex text instead of raw bytes.
        #[arg(long)]
        hex: bool,
    },
}

fn read_packet(input: &PathBuf, hex: bool) -> Result<Packet> {
    let data = if hex {
        let text = std::fs::read_to_string(input)?;
        parse_hex(&text)?
    } else {
        std::fs::read(input)?
    };

    debug!("read {} bytes from {:?}", data.len(), input);
    Packet::decode(&data)
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();

    if digits.len() % 2 != 0 {
        return Err(Error::InvalidHex("odd number of hex digits".to_string()));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let byte: String = pair.iter().collect();
            u8::from_str_radix(&byte, 16)
                .map_err(|_| Error::InvalidHex(format!("invalid byte {:?}", byte)))
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let registry = FormatRegistry::standard();

    match cli.command {
        Commands::Decode { input, hex } => {
            let packet = read_packet(&input, hex)?;

            println!("op:      {}", packet.op);
            println!("htype:   {}", packet.htype);
            println!("hlen:    {}", packet.hlen);
            println!("hops:    {}", packet.hops);
            println!("xid:     {:#010x}", packet.xid);
            println!("secs:    {}", packet.secs);
            println!(
                "flags:   {:#06x}{}",
                packet.flags,
                if packet.is_broadcast() {
                    " (broadcast)"
                } else {
                    ""
                }
            );
            println!("ciaddr:  {}", packet.ciaddr);
            println!("yiaddr:  {}", packet.yiaddr);
            println!("siaddr:  {}", packet.siaddr);
            println!("giaddr:  {}", packet.giaddr);
            println!("chaddr:  {}", packet.format_chaddr());

            match packet.message_type() {
                Some(message_type) => println!("type:    {}", message_type),
                None => println!("type:    (none, BOOTP?)"),
            }

            println!("options:");
            for (code, value) in packet.options.iter() {
                match registry.format_option(code, value) {
                    Some(field) => println!("  {:>3}: {}", code, field),
                    None => println!("  {:>3}: ({} bytes)", code, value.len()),
                }
            }

            Ok(())
        }
        Commands::Summarize { input, hex } => {
            let packet = read_packet(&input, hex)?;
            println!("{}", registry.summarize(&packet));
            Ok(())
        }
    }
}
