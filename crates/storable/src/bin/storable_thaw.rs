//! `storable-thaw` — decode a Storable frozen buffer to JSON (stdout).
//!
//! Usage:
//!   storable-thaw [--lenient] [FILE]
//!
//! Reads stdin when no file is given. `--lenient` reads unknown tags as
//! null instead of failing.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use storable::{thaw_with, ThawOptions, UnknownTagPolicy};

fn main() -> ExitCode {
    let mut options = ThawOptions::default();
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--lenient" => options.unknown_tag = UnknownTagPolicy::Null,
            _ => path = Some(arg),
        }
    }

    let mut buf = Vec::new();
    let read = match &path {
        Some(path) => std::fs::read(path).map(|bytes| buf = bytes),
        None => io::stdin().read_to_end(&mut buf).map(|_| ()),
    };
    if let Err(e) = read {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let value = match thaw_with(&buf, &options) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let json = match value.to_json() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let out = match serde_json::to_string_pretty(&json) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = writeln!(io::stdout(), "{out}") {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
