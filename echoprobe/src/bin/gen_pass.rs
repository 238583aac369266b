#![forbid(unsafe_code)]

//! Prompt for a password and print its bcrypt hash, e.g. for a basic-auth
//! htpasswd entry or a dashboard admin account.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use echoprobe_lib::credentials::{hash_password, read_password_line, DEFAULT_COST};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a bcrypt password hash")]
struct Cli {
    /// bcrypt work factor
    #[arg(long, default_value_t = DEFAULT_COST, value_parser = clap::value_parser!(u32).range(4..=31))]
    cost: u32,
}

/// Hidden prompt on the terminal; a piped password is read as one line
fn read_password() -> echoprobe_lib::Result<String> {
    if io::stdin().is_terminal() {
        Ok(rpassword::prompt_password("password: ")?)
    } else {
        read_password_line(io::stdin().lock())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let password = match read_password() {
        Ok(password) => password,
        Err(err) => {
            eprintln!("failed to read password: {err}");
            return ExitCode::FAILURE;
        }
    };

    // stdout carries only the hash
    match hash_password(&password, cli.cost) {
        Ok(hash) => {
            println!("{hash}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
