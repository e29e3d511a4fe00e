use std::io::{Error as IoError, ErrorKind};
use std::net::{Shutdown, SocketAddr, TcpStream};

use tracing::{debug, info, warn};

use crate::protocol::packets::Frame;
use crate::protocol::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State{
    Open,
    Closed
}

/// A single outbound TCP connection speaking length-prefixed strings.
///
/// The session never sends a second frame before the reply to the first has
/// been read; a peer sending unsolicited frames desynchronizes it.
#[derive(Debug)]
pub struct Session{
    // host:port as given by the user
    addr : String,
    // resolved address of the other host
    peer : SocketAddr,
    // socket to other host
    stream : TcpStream,
    // Open until closed by the user, by drop, or by a failed read/write
    state : State
}

impl Session{
    /**
     * Connect to host:port. Every resolved address is tried in order, no retry afterwards.
     */
    pub fn open(host : &str, port : u16) -> Result<Session>{
        let addr = format!("{}:{}", host, port);
        let stream = TcpStream::connect((host, port))
            .map_err(|source| Error::Connection { addr : addr.clone(), source })?;
        let peer = stream.peer_addr()
            .map_err(|source| Error::Connection { addr : addr.clone(), source })?;
        info!(%addr, %peer, "connected");
        Ok(Session::from_stream(addr, peer, stream))
    }

    fn from_stream(addr : String, peer : SocketAddr, stream : TcpStream) -> Session{
        Session{addr, peer, stream, state : State::Open}
    }

    pub fn get_peer_addr(&self) -> SocketAddr{
        self.peer
    }

    /// The `host:port` the session was opened with, before resolution.
    pub fn get_addr(&self) -> &str{
        &self.addr
    }

    pub fn get_state(&self) -> State{
        self.state
    }

    pub fn is_open(&self) -> bool{
        self.state == State::Open
    }

    /**
     * Send one line as a frame, flushed immediately
     */
    pub fn send_line(&mut self, text : &str) -> Result<()>{
        if !self.is_open(){
            return Err(Error::Write(not_connected()));
        }
        // oversized text is the caller's mistake, the session stays usable
        let frame = Frame::new(text)?;
        if let Err(e) = frame.write_to(&mut self.stream){
            self.fail(&e);
            return Err(e);
        }
        debug!(peer = %self.peer, len = frame.get_size(), "sent frame");
        Ok(())
    }

    /**
     * Block until one whole frame arrives. There is no timeout.
     */
    pub fn receive_line(&mut self) -> Result<String>{
        if !self.is_open(){
            return Err(Error::Read(not_connected()));
        }
        match Frame::read_from(&mut self.stream){
            Ok(frame) => {
                debug!(peer = %self.peer, len = frame.get_size(), "received frame");
                Ok(frame.into_content())
            },
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /**
     * Close the connection, closing twice is a no-op
     */
    pub fn close(&mut self) -> Result<()>{
        if !self.is_open(){
            return Ok(());
        }
        self.state = State::Closed;
        match self.stream.shutdown(Shutdown::Both){
            // peer already gone
            Err(e) if e.kind() == ErrorKind::NotConnected => {},
            Err(e) => return Err(Error::Write(e)),
            Ok(()) => {}
        }
        info!(peer = %self.peer, "closed");
        Ok(())
    }

    // a failed read or write leaves the stream out of sync, so it is never reused
    fn fail(&mut self, err : &Error){
        warn!(peer = %self.peer, error = %err, "closing session after i/o failure");
        self.state = State::Closed;
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

impl Drop for Session{
    fn drop(&mut self){
        let _ = self.close();
    }
}

fn not_connected() -> IoError{
    IoError::new(ErrorKind::NotConnected, "session is closed")
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
