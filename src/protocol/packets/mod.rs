use std::io::{Error as IoError, ErrorKind, Read, Write};

use crate::protocol::{Error, Result};

/// Largest payload a frame can carry, bounded by the u16 length prefix.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Size of the length prefix on the wire.
pub const HEADER_SIZE: usize = 2;

/// One length-prefixed string on the wire:
/// `LENGTH (2 bytes, big-endian) || PAYLOAD (LENGTH bytes, UTF-8)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame{
    content : String
}

impl Frame{
    /**
     * Build a frame, failing if the UTF-8 encoding does not fit the prefix
     */
    pub fn new(content : impl Into<String>) -> Result<Frame>{
        let content = content.into();
        if content.len() > MAX_PAYLOAD{
            return Err(Error::Encoding { len : content.len() });
        }
        Ok(Frame{content})
    }

    pub fn get_size(&self) -> u16{
        // checked in new()
        self.content.len() as u16
    }

    pub fn get_content(&self) -> &str{
        &self.content
    }

    pub fn into_content(self) -> String{
        self.content
    }

    pub fn to_bytes(&self) -> Vec<u8>{
        let mut vec : Vec<u8> = Vec::with_capacity(HEADER_SIZE + self.content.len());
        vec.extend_from_slice(&self.get_size().to_be_bytes());
        vec.extend_from_slice(self.content.as_bytes());
        vec
    }

    /**
     * Decode a complete frame already held in memory.
     * Trailing bytes after the declared payload are an error.
     */
    pub fn from_bytes(bytes : &[u8]) -> Result<Frame>{
        let mut cursor = bytes;
        let frame = Frame::read_from(&mut cursor)?;
        if !cursor.is_empty(){
            return Err(Error::Read(IoError::new(
                ErrorKind::InvalidData,
                format!("{} trailing bytes after frame", cursor.len()),
            )));
        }
        Ok(frame)
    }

    /**
     * Write the frame as one buffer, then flush
     */
    pub fn write_to<W : Write>(&self, writer : &mut W) -> Result<()>{
        writer.write_all(&self.to_bytes()).map_err(Error::Write)?;
        writer.flush().map_err(Error::Write)?;
        Ok(())
    }

    /**
     * Block until a whole frame has been read.
     * A stream ending before the declared length is a read error, never a short string.
     */
    pub fn read_from<R : Read>(reader : &mut R) -> Result<Frame>{
        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header).map_err(Error::Read)?;
        let size = u16::from_be_bytes(header) as usize;

        let mut payload = vec![0u8; size];
        reader.read_exact(&mut payload).map_err(Error::Read)?;

        let content = String::from_utf8(payload)
            .map_err(|e| Error::Read(IoError::new(ErrorKind::InvalidData, e)))?;
        Ok(Frame{content})
    }
}

/// Encode `text` into its wire form, for framing text without a `Session`.
pub fn encode(text : &str) -> Result<Vec<u8>>{
    Ok(Frame::new(text)?.to_bytes())
}

/// Decode one whole wire frame back into its text; the inverse of [`encode`].
pub fn decode(bytes : &[u8]) -> Result<String>{
    Ok(Frame::from_bytes(bytes)?.into_content())
}

#[cfg(test)]
#[path = "packets_test.rs"]
mod tests;
