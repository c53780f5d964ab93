use std::net::{AddrParseError, IpAddr, SocketAddr};

use clap::Parser;

use crate::joke;

#[derive(Parser, Debug)]
pub struct Args {
    /// Whether dadportal's clients connect to it over https.
    /// If so, the session cookie is sent as a secure cookie.
    #[arg(short, long)]
    secure: bool,

    /// The address dadportal should listen on. By default
    /// dadportal will listen just on the IPv4 loopback.
    #[arg(short, long)]
    address: Option<String>,

    /// The port dadportal listens on.
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Log at debug level, regardless of RUST_LOG.
    #[arg(short, long)]
    debug: bool,

    /// The endpoint jokes are fetched from.
    #[arg(long, default_value = joke::DEFAULT_URL)]
    joke_url: String,
}

impl Args {
    pub fn addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.address
            .as_deref()
            .unwrap_or("127.0.0.1")
            .parse()
            .map(|addr: IpAddr| (addr, self.port).into())
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn joke_url(&self) -> &str {
        &self.joke_url
    }
}
