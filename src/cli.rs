use std::ffi::OsString;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use tracing::{info, Level};

use crate::protocol::{self, Client};

pub const USAGE: &str = "===== Error usage: client SERVER_IP SERVER_PORT =====";

/// Interactive client for a length-prefixed string server
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "client", version, about, long_about = None)]
pub struct Args {
    /// Host name or address of the server
    pub server_host: String,

    /// TCP port of the server
    // "-1" must reach the port parser instead of being taken for a flag
    #[arg(allow_negative_numbers = true)]
    pub server_port: u16,

    /// Log more to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Connect(Args),
    // wrong number of positional arguments, nothing should touch the network
    Usage,
}

/**
 * Parse the command line. A wrong argument count is not an error, it asks for the usage line.
 * Everything else clap rejects (a bad port, --help, --version) comes back as a clap::Error.
 */
pub fn parse_args<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) => Ok(Invocation::Connect(args)),
        Err(e) => match e.kind() {
            ErrorKind::MissingRequiredArgument | ErrorKind::UnknownArgument | ErrorKind::TooManyValues => {
                Ok(Invocation::Usage)
            }
            _ => Err(e),
        },
    }
}

/**
 * Carry out a parsed invocation against a console. The usage line is written
 * and nothing is opened; otherwise one session runs until the user leaves.
 */
pub fn run<R, W>(invocation: Invocation, input: R, output: &mut W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let args = match invocation {
        Invocation::Connect(args) => args,
        Invocation::Usage => {
            writeln!(output, "{}", USAGE).context("could not print usage")?;
            return Ok(());
        }
    };

    let session = protocol::connect(&args.server_host, args.server_port)
        .context("could not reach the server")?;
    info!(addr = session.get_addr(), "session ready");

    let mut client = Client::new(session, input, output);
    client.run().context("session ended with an error")?;
    Ok(())
}

pub fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Logs go to stderr so they never mix with the prompts on stdout.
pub fn init_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_max_level(log_level(verbose))
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
