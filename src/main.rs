use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;

use mealfinder::{finder_from_env, RecipeFilters, RecipeQuery};

/// Browse recipes from TheMealDB and Spoonacular
#[derive(Parser, Debug)]
#[command(name = "mealfinder", version, about)]
struct Cli {
    /// Locale for translated results (e.g. fr, es)
    #[arg(short, long, global = true, env = "MEALFINDER_LOCALE")]
    locale: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a page of recipes by search text or category/area/diet
    Browse {
        /// Free-text search by recipe name
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        area: Option<String>,
        #[arg(short, long)]
        diet: Option<String>,
        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Find recipes that use the given ingredients
    Pantry {
        #[arg(required = true)]
        ingredients: Vec<String>,
    },
    /// Show one recipe by id
    Show { id: String },
    /// Pick a random recipe
    Random {
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        area: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    debug!("{:?}", cli);

    let finder = finder_from_env()?;
    let locale = cli.locale.as_deref();

    match cli.command {
        Command::Browse {
            search,
            category,
            area,
            diet,
            page,
        } => {
            let query = RecipeQuery {
                locale: cli.locale.clone(),
                search,
                category,
                area,
                diet,
                page,
            };
            print_json(&finder.fetch_recipes(&query).await)?;
        }
        Command::Pantry { ingredients } => {
            print_json(&finder.search_pantry(&ingredients, locale).await)?;
        }
        Command::Show { id } => match finder.get_recipe(&id, locale).await {
            Some(recipe) => print_json(&recipe)?,
            None => {
                eprintln!("Recipe '{}' not found", id);
                std::process::exit(1);
            }
        },
        Command::Random { category, area } => {
            let filters = RecipeFilters::new(category.as_deref(), area.as_deref(), None);
            match finder.random_recipe(&filters, locale).await {
                Some(recipe) => print_json(&recipe)?,
                None => {
                    eprintln!("No random recipe available");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
