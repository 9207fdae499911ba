//! NestDB CLI Client
//!
//! Interactive command-line client for a NestDB server.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::Parser;
use nestdb::network::Client;
use nestdb::Config;
use nestdb::protocol::{Response, EXIT};

/// NestDB CLI
#[derive(Parser, Debug)]
#[command(name = "nestdb-cli")]
#[command(about = "Interactive client for the NestDB document store")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Database to connect to (prompted for when omitted)
    #[arg(short, long)]
    database: Option<String>,

    /// Seconds to wait for each server reply (default: the configured client timeout)
    #[arg(short, long)]
    timeout_secs: Option<u64>,
}

fn main() {
    let args = Args::parse();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let database = match args.database {
        Some(name) => name,
        None => {
            prompt("Enter database name: ");
            match lines.next() {
                Some(Ok(line)) => line.trim().to_string(),
                _ => std::process::exit(-1),
            }
        }
    };

    let addr = format!("{}:{}", args.host, args.port);
    let timeout = args
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| Config::default().client_timeout());
    let mut client = match Client::connect(addr.as_str(), &database, timeout) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", addr, e);
            std::process::exit(-1);
        }
    };
    println!("{}", client.welcome());
    println!("Commands: INSERT <collection> <json> | FIND <collection> [filter] | DELETE <collection> <filter> | EXIT");

    loop {
        prompt("> ");
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Failed to read input: {}", e);
                break;
            }
            None => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == EXIT {
            match client.exit() {
                Ok(goodbye) => println!("{}", goodbye),
                Err(e) => eprintln!("Error: {}", e),
            }
            return;
        }

        match client.send_line(line) {
            Ok(response) => print_response(&response),
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }
}

fn prompt(text: &str) {
    print!("{}", text);
    let _ = io::stdout().flush();
}

fn print_response(response: &Response) {
    let status = if response.is_success() { "success" } else { "error" };
    println!("Status: {}", status);
    println!("Message: {}", response.message);

    if !response.data.is_empty() {
        println!("Data:");
        for document in &response.data {
            match serde_json::to_string_pretty(document) {
                Ok(text) => println!("{}", text),
                Err(_) => println!("{}", document),
            }
        }
    } else if response.count > 0 {
        println!("Count: {}", response.count);
    }
}
