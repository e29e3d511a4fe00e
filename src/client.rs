use std::io;

use anyhow::Result;

use strframe::cli::{self, Invocation};

fn main() -> Result<()>{
    let invocation = match cli::parse_args(std::env::args_os()){
        Ok(invocation) => invocation,
        // bad port, --help or --version: clap prints and picks the exit code
        Err(e) => e.exit()
    };

    if let Invocation::Connect(args) = &invocation{
        cli::init_logging(args.verbose);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    cli::run(invocation, stdin.lock(), &mut stdout)
}
