mod camera;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use recipe_post_core::{
    create_backend, BackendKind, DiskDocumentStore, IngredientEntry, PhotoCapture,
    PhotoKeyScheme, QueuedPicker, RecipeComposer, RecipePostConfig, RecipeSubmitter,
    TakePhotoResult, RECIPES_COLLECTION,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use camera::{FileCamera, GrantedPermission};

#[derive(Parser)]
#[command(name = "recipe-post")]
#[command(about = "Compose and submit recipe posts", long_about = None)]
struct Cli {
    /// Disk backend root (overrides RECIPE_POST_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory captured photos are written to (overrides RECIPE_POST_PICTURES_DIR)
    #[arg(long, global = true)]
    pictures_dir: Option<PathBuf>,

    /// Photo key scheme: file-name or content-hash (overrides RECIPE_POST_PHOTO_KEY)
    #[arg(long, global = true, value_parser = parse_photo_key)]
    photo_key: Option<PhotoKeyScheme>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a recipe and submit it
    Submit(SubmitArgs),
    /// Print a stored recipe (disk backend only)
    Show {
        /// Recipe id as printed by `submit`
        id: String,
    },
    /// List stored recipes (disk backend only)
    List,
}

#[derive(Args)]
struct SubmitArgs {
    #[arg(long, default_value = "")]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Ingredient as NAME:KCAL, repeatable
    #[arg(long = "ingredient", value_parser = parse_ingredient)]
    ingredients: Vec<IngredientEntry>,

    /// Total kCal text; defaults to the ingredient sum
    #[arg(long)]
    kcal: Option<String>,

    /// Image file to attach as the recipe photo
    #[arg(long)]
    photo: Option<PathBuf>,

    /// Print the persisted record as JSON
    #[arg(long)]
    json: bool,
}

fn parse_ingredient(s: &str) -> Result<IngredientEntry, String> {
    let (name, kcal) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:KCAL, got {:?}", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing ingredient name in {:?}", s));
    }
    let kcal = kcal
        .trim()
        .parse()
        .map_err(|_| format!("invalid kcal in {:?}", s))?;
    Ok(IngredientEntry::new(name, kcal))
}

fn parse_photo_key(s: &str) -> Result<PhotoKeyScheme, String> {
    PhotoKeyScheme::from_name(s).ok_or_else(|| format!("unknown photo key scheme {:?}", s))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = RecipePostConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.pictures_dir {
        config.pictures_dir = dir;
    }
    if let Some(scheme) = cli.photo_key {
        config.photo_key = scheme;
    }

    match cli.command {
        Commands::Submit(args) => submit(&config, args).await?,
        Commands::Show { id } => show(&config, &id).await?,
        Commands::List => list(&config).await?,
    }

    Ok(())
}

async fn submit(config: &RecipePostConfig, args: SubmitArgs) -> Result<()> {
    let backend = create_backend(config).context("Failed to set up storage backend")?;
    let submitter = Arc::new(RecipeSubmitter::new(backend, config.photo_key));

    let photo_source = args.photo.clone().unwrap_or_default();
    let ingredient_count = args.ingredients.len();
    let mut composer = RecipeComposer::new(
        Arc::new(QueuedPicker::new(args.ingredients)),
        PhotoCapture::new(
            config.pictures_dir.clone(),
            Arc::new(FileCamera::new(photo_source)),
            Arc::new(GrantedPermission),
        ),
        submitter,
    );

    for _ in 0..ingredient_count {
        composer.add_ingredient().await;
    }

    let draft = composer.draft_mut();
    draft.title = args.title;
    draft.description = args.description;
    if let Some(kcal) = args.kcal {
        draft.total_calories = kcal;
    }

    if args.photo.is_some() {
        match composer.take_photo().await? {
            TakePhotoResult::Captured(path) => {
                tracing::info!(path = %path.display(), "Photo attached");
            }
            other => bail!("No photo captured: {:?}", other),
        }
    }

    match composer.submit().await {
        Ok(outcome) => {
            println!("{}: {}", outcome.notice(), outcome.recipe_id);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome.record)?);
            }
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "Submission failed");
            bail!("{}", e.notice())
        }
    }
}

fn disk_documents(config: &RecipePostConfig) -> Result<DiskDocumentStore> {
    if !matches!(config.backend, BackendKind::Disk) {
        bail!("Reading recipes back is only supported by the disk backend");
    }
    Ok(DiskDocumentStore::new(config.data_dir.clone()))
}

async fn show(config: &RecipePostConfig, id: &str) -> Result<()> {
    let documents = disk_documents(config)?;
    let doc = documents.get(RECIPES_COLLECTION, id).await?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

async fn list(config: &RecipePostConfig) -> Result<()> {
    let documents = disk_documents(config)?;
    for doc in documents.list(RECIPES_COLLECTION).await? {
        println!(
            "{}  {}  {} kCal  {}",
            doc.id,
            doc.created_at.format("%Y-%m-%d %H:%M"),
            doc.record.total_calories,
            doc.record.title
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ingredient() {
        let entry = parse_ingredient("brown rice: 216").unwrap();
        assert_eq!(entry.name, "brown rice");
        assert_eq!(entry.kcal, 216);

        // Only the last colon separates the kcal.
        let entry = parse_ingredient("sauce: tomato:40").unwrap();
        assert_eq!(entry.name, "sauce: tomato");
        assert_eq!(entry.kcal, 40);
    }

    #[test]
    fn test_parse_ingredient_errors() {
        assert!(parse_ingredient("rice").is_err());
        assert!(parse_ingredient(":100").is_err());
        assert!(parse_ingredient("rice:lots").is_err());
    }

    #[test]
    fn test_submit_args() {
        let cli = Cli::try_parse_from([
            "recipe-post",
            "submit",
            "--title",
            "Chili",
            "--ingredient",
            "beans:240",
            "--ingredient",
            "beef:300",
            "--photo",
            "/tmp/chili.jpg",
        ])
        .unwrap();
        let Commands::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(args.title, "Chili");
        assert_eq!(args.description, "");
        assert_eq!(args.ingredients.len(), 2);
        assert_eq!(args.photo, Some(PathBuf::from("/tmp/chili.jpg")));
    }

    #[test]
    fn test_photo_key_flag() {
        let cli = Cli::try_parse_from(["recipe-post", "list", "--photo-key", "content-hash"])
            .unwrap();
        assert_eq!(cli.photo_key, Some(PhotoKeyScheme::ContentHash));

        assert!(Cli::try_parse_from(["recipe-post", "list", "--photo-key", "md5"]).is_err());
    }
}
