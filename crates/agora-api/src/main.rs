//! Agora API CLI
//!
//! Starts the HTTP server for the voting / acceptance / reputation core.

use agora_api::{config::ApiConfig, start_server, ApiServerError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ApiServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        let config_path = &args[2];
        ApiConfig::from_file(config_path)?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using default test configuration");
        eprintln!("Usage: agora-api --config <path-to-config.toml>");
        eprintln!();
        ApiConfig::default_test_config()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Agora API - Q&A voting, acceptance and reputation core");
    println!();
    println!("USAGE:");
    println!("    agora-api --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - bind_address: IP address to bind (e.g., '127.0.0.1')");
    println!("    - bind_port: Port number (e.g., 8080)");
    println!("    - database_path: SQLite database file, or ':memory:'");
    println!("    - jwt_secret: Secret key for verifying session tokens");
    println!("    - token_expiry_secs: Token expiry in seconds (default: 3600)");
    println!();
}
