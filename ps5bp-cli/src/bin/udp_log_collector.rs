//! Standalone UDP listener for a PS5 devkit/exploited console's plaintext
//! debug log lines. Not exercised by the pipeline or its tests; this is an
//! interface-only convenience for watching a console's stdout remotely
//! while a backported title runs.

use std::net::UdpSocket;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ps5bp-udp-log-collector", about = "Receives plaintext debug log lines over UDP and prints them.")]
struct Args {
    /// Local address to bind, e.g. "0.0.0.0:9081".
    #[arg(long, default_value = "0.0.0.0:9081")]
    bind: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let socket = UdpSocket::bind(&args.bind).with_context(|| format!("binding {}", args.bind))?;
    eprintln!("listening for console log lines on {}", args.bind);

    let mut buf = [0u8; 4096];
    loop {
        let (len, from) = match socket.recv_from(&mut buf) {
            Ok(pair) => pair,
            Err(e) => {
                eprintln!("recv error: {e}");
                continue;
            }
        };
        let line = String::from_utf8_lossy(&buf[..len]);
        println!("[{from}] {}", line.trim_end());
    }
}
