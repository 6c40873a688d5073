use anyhow::Result;
use clap::Parser;
use larder::SaveStatus;
use larder_client::{selection_from_flags, ServerClient, DEFAULT_SERVER};

/// Search the recipe catalog by ingredients
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Ingredients every result must use
    #[arg(short, long)]
    include: Vec<String>,
    /// Ingredients no result may use
    #[arg(short, long)]
    exclude: Vec<String>,
    /// Only show recipes using nothing but the included ingredients
    #[arg(long)]
    only: bool,
    /// Save every result as a favorite
    #[arg(long)]
    save: bool,
    /// URL of the larder server
    #[arg(long, default_value = DEFAULT_SERVER)]
    server: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let selector = selection_from_flags(&args.include, &args.exclude, args.only);
    for criterion in selector.criteria() {
        println!("{:>8} {}", criterion.mode, criterion.name);
    }

    let client = ServerClient::new(&args.server)?;
    let session = client.sign_in_from_env().await?;
    tracing::info!("Signed in as {}", session.email);

    let response = client.search(&selector).await?;
    if response.recipes.is_empty() {
        println!("No recipes found with those ingredients.");
        return Ok(());
    }
    for recipe in &response.recipes {
        println!("\n{} [{}]", recipe.name, recipe.external_id);
        for line in recipe.ingredient_lines() {
            println!("  - {line}");
        }
    }

    if args.save {
        for recipe in &response.recipes {
            let status = client.save(recipe).await?;
            match status {
                SaveStatus::Saved => println!("Saved {}", recipe.name),
                SaveStatus::AlreadySaved => println!("{} was already saved", recipe.name),
                SaveStatus::Error(reason) => eprintln!("Could not save {}: {reason}", recipe.name),
                other => tracing::warn!("Unexpected save status for {}: {:?}", recipe.name, other),
            }
        }
    }
    Ok(())
}
