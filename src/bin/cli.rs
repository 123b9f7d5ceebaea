//! TagKV CLI Client
//!
//! Command-line interface for interacting with TagKV.

use clap::{Parser, Subcommand};
use tagkv::{Client, Message};

/// TagKV CLI
#[derive(Parser, Debug)]
#[command(name = "tagkv-cli")]
#[command(about = "CLI for the TagKV key-value server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:31337")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Delete {
        /// The key to delete
        key: String,
    },

    /// Remove every key
    Flush,

    /// Get several keys at once
    Mget {
        /// Keys to get
        keys: Vec<String>,
    },

    /// Set several key-value pairs at once
    Mset {
        /// Alternating keys and values
        #[arg(num_args = 0..)]
        pairs: Vec<String>,
    },
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Could not connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let mut request: Vec<&[u8]> = Vec::new();
    match &args.command {
        Commands::Get { key } => request.extend([b"GET".as_slice(), key.as_bytes()]),
        Commands::Set { key, value } => {
            request.extend([b"SET".as_slice(), key.as_bytes(), value.as_bytes()])
        }
        Commands::Delete { key } => request.extend([b"DELETE".as_slice(), key.as_bytes()]),
        Commands::Flush => request.push(b"FLUSH"),
        Commands::Mget { keys } => {
            request.push(b"MGET");
            request.extend(keys.iter().map(|key| key.as_bytes()));
        }
        Commands::Mset { pairs } => {
            request.push(b"MSET");
            request.extend(pairs.iter().map(|item| item.as_bytes()));
        }
    }

    match client.execute(&request) {
        Ok(reply) => {
            let failed = matches!(reply, Message::Error(_));
            print_reply(&reply, 0);
            if failed {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print a reply the way redis-cli does
fn print_reply(reply: &Message, indent: usize) {
    let pad = " ".repeat(indent);
    match reply {
        Message::SimpleString(text) => println!("{}{}", pad, text),
        Message::Error(text) => println!("{}(error) {}", pad, text),
        Message::Integer(n) => println!("{}(integer) {}", pad, n),
        Message::BulkString(None) => println!("{}(nil)", pad),
        Message::BulkString(Some(data)) => {
            println!("{}\"{}\"", pad, String::from_utf8_lossy(data))
        }
        Message::Array(items) if items.is_empty() => println!("{}(empty array)", pad),
        Message::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                print!("{}{}) ", pad, i + 1);
                print_reply(item, 0);
            }
        }
        Message::Map(pairs) => {
            for (key, value) in pairs {
                print_reply(key, indent);
                print_reply(value, indent + 2);
            }
        }
    }
}
