use std::io::{BufRead, Write};

use tracing::info;

use crate::protocol::connection::Session;
use crate::protocol::{Error, Result};

pub const INPUT_PROMPT: &str = "===== Please input any message you want to send to the server: ";
pub const CONTINUE_PROMPT: &str = "Do you want to continue(y/n) :";
pub const RECV_MARKER: &str = "[recv]";
pub const GOODBYE: &str = "Good bye";

/// Drives one session from a console: read a line, send it, print the reply,
/// ask whether to go on.
pub struct Client<I, O>{
    session : Session,
    input : I,
    output : O
}

impl<I : BufRead, O : Write> Client<I, O>{
    pub fn new(session : Session, input : I, output : O) -> Client<I, O>{
        Client{session, input, output}
    }

    pub fn get_session(&self) -> &Session{
        &self.session
    }

    /**
     * Request-response loop, returns once the user answers "n" or input ends.
     * The session is closed on every path out of here, errors included (by drop).
     */
    pub fn run(&mut self) -> Result<()>{
        loop {
            self.say(INPUT_PROMPT)?;
            let message = match self.read_line()?{
                Some(line) => line,
                None => {
                    info!("end of input");
                    return self.session.close();
                }
            };

            self.session.send_line(&message)?;
            let response = self.session.receive_line()?;
            self.say(&format!("{} {}", RECV_MARKER, response))?;

            self.say(CONTINUE_PROMPT)?;
            match self.read_line()?{
                Some(answer) if answer == "n" => {
                    self.say(GOODBYE)?;
                    return self.session.close();
                },
                Some(_) => continue,
                None => {
                    info!("end of input");
                    return self.session.close();
                }
            }
        }
    }

    pub fn into_output(self) -> O{
        self.output
    }

    fn say(&mut self, line : &str) -> Result<()>{
        writeln!(self.output, "{}", line).map_err(Error::Console)?;
        // prompts must be visible before we block on input or the socket
        self.output.flush().map_err(Error::Console)
    }

    // None at end of input, otherwise the line without its terminator
    fn read_line(&mut self) -> Result<Option<String>>{
        let mut line = String::new();
        let amt = self.input.read_line(&mut line).map_err(Error::Console)?;
        if amt == 0{
            return Ok(None);
        }
        if line.ends_with('\n'){
            line.pop();
            if line.ends_with('\r'){
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
