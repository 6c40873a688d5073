use anyhow::Result;
use clap::Parser;
use larder_client::{ServerClient, DEFAULT_SERVER};

/// Check that you can sign in to the server
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// URL of the server to check
    #[arg(long, default_value = DEFAULT_SERVER)]
    server: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    if dotenvy::dotenv().is_err() {
        eprintln!("Warning: Failed to load .env file");
    }
    let args = Args::parse();

    if dotenvy::var("LARDER_EMAIL").is_err() || dotenvy::var("LARDER_PASSWORD").is_err() {
        eprintln!("Error: LARDER_EMAIL and LARDER_PASSWORD must be set");
        eprintln!("Please set them in your .env file or environment");
        std::process::exit(1);
    }

    println!("Testing sign-in with {}...", args.server);
    let client = ServerClient::new(&args.server)?;
    if let Err(e) = client.sign_in_from_env().await {
        eprintln!("\nSign-in failed!");
        eprintln!("{e:#}");
        if args.server.starts_with("https://localhost") || args.server.starts_with("https://127.0.0.1") {
            eprintln!("\nHint: Local dev servers typically use HTTP, not HTTPS.");
            eprintln!("Try: larder-auth-check --server http://localhost:3000");
        }
        std::process::exit(1);
    }

    let session = client.session().await?;
    println!("\nSign-in successful!");
    println!("User: {}", session.user_id);
    println!("Email: {}", session.email);
    Ok(())
}
