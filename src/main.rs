//! Command line driver
//!
//! Reads the given query files, compiles them against the TPC-H schema,
//! and prints the resulting SQL to stdout.

use saneql::{Schema, compile};
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    let files: Vec<String> = std::env::args().skip(1).collect();
    if files.is_empty() {
        eprintln!("usage: saneql file...");
        return ExitCode::FAILURE;
    }

    let mut query = String::new();
    for file in &files {
        match fs::read_to_string(file) {
            Ok(text) => {
                query.push_str(&text);
                query.push('\n');
            }
            Err(err) => {
                eprintln!("unable to read {}: {}", file, err);
                return ExitCode::FAILURE;
            }
        }
    }

    let schema = Schema::tpch();
    match compile(&schema, &query) {
        Ok(sql) => {
            println!("{}", sql);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
