use std::io;

pub mod client;
pub mod connection;
pub mod packets;

pub use client::Client;
pub use connection::{Session, State};
pub use packets::Frame;

/// Failures of a framed session. Everything except usage is fatal to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error{
    #[error("failed to connect to {addr}")]
    Connection { addr : String, #[source] source : io::Error },
    #[error("failed to write frame")]
    Write(#[source] io::Error),
    #[error("failed to read frame")]
    Read(#[source] io::Error),
    #[error("message of {len} bytes exceeds the {max} byte frame limit", max = packets::MAX_PAYLOAD)]
    Encoding { len : usize },
    #[error("console i/o failed")]
    Console(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/**
 * Open a session to host:port, used by client applications
 */
pub fn connect(host : &str, port : u16) -> Result<Session>{
    Session::open(host, port)
}
