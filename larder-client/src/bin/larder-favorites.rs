use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use larder_client::{FavoritesResponse, ServerClient, DEFAULT_SERVER};

/// Manage your favorite recipes
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    command: Command,
    /// URL of the larder server
    #[arg(long, default_value = DEFAULT_SERVER)]
    server: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved recipes
    List,
    /// Remove a saved recipe by its id
    Remove { recipe_id: i64 },
    /// Show the catalog details of a saved recipe
    Show { recipe_id: i64 },
}

fn print_favorites(response: &FavoritesResponse) {
    if let Some(error) = &response.error {
        eprintln!("{error}");
    }
    if response.favorites.is_empty() {
        println!("You have no favorite recipes yet.");
    }
    for favorite in &response.favorites {
        println!(
            "{:>6}  {}  {}",
            favorite.recipe_id,
            favorite.recipe_name,
            favorite.mealdb_id.as_deref().unwrap_or("-")
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let client = ServerClient::new(&args.server)?;
    client.sign_in_from_env().await?;

    match args.command {
        Command::List => print_favorites(&client.favorites().await?),
        Command::Remove { recipe_id } => print_favorites(&client.remove(recipe_id).await?),
        Command::Show { recipe_id } => {
            // The details are only known once the favorites have been listed.
            let listing = client.favorites().await?;
            if !listing.favorites.iter().any(|f| f.recipe_id == recipe_id) {
                bail!("Recipe {recipe_id} is not one of your favorites");
            }
            let entry = client.favorite_detail(recipe_id).await?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
    }
    Ok(())
}
