//! Food lookup commands: barcode scan, name search, and photo analysis.
//!
//! Each shows per-100g values and can log a scaled portion with `--save`.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Args;
use ns_core::{Category, Per100g};
use ns_db::Database;

use super::util::{build_entry, grams};
use crate::Config;

/// Portion options shared by the lookup commands.
#[derive(Debug, Default, Args)]
pub struct PortionArgs {
    /// Portion size in grams; shows values scaled to it.
    #[arg(short, long)]
    pub grams: Option<f64>,

    /// Meal category to log the portion under.
    #[arg(long)]
    pub category: Option<Category>,

    /// Log the scaled portion as a new entry.
    #[arg(long, requires_all = ["grams", "category"])]
    pub save: bool,

    /// Name to log instead of the looked-up one.
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Product barcode (EAN/UPC digits).
    pub barcode: String,

    #[command(flatten)]
    pub portion: PortionArgs,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Food name to search for (at least 3 characters).
    pub query: String,

    /// Maximum number of results.
    #[arg(long, default_value_t = 10)]
    pub limit: u32,

    /// Result number to use with --save.
    #[arg(long, default_value_t = 1)]
    pub pick: usize,

    #[command(flatten)]
    pub portion: PortionArgs,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Photo of the food (jpeg, png, or webp).
    pub image: PathBuf,

    #[command(flatten)]
    pub portion: PortionArgs,
}

/// Runs one future to completion on a fresh current-thread runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

fn kcal(value: Option<f64>) -> String {
    value.map_or_else(|| "- kcal".to_string(), |k| format!("{k:.0} kcal"))
}

/// One-line per-100g summary.
pub fn format_per_100g(name: &str, per_100g: &Per100g) -> String {
    format!(
        "{name}: {} per 100 g (protein {}, fat {}, carbs {})",
        kcal(per_100g.calories),
        grams(per_100g.protein),
        grams(per_100g.fat),
        grams(per_100g.carbs)
    )
}

/// Prints the reference values, the scaled portion if requested, and logs it
/// with `--save`.
pub fn show_food<W: Write>(
    writer: &mut W,
    db: &mut Database,
    name: Option<&str>,
    per_100g: &Per100g,
    portion: &PortionArgs,
    image: Option<&Path>,
) -> Result<()> {
    let display_name = portion
        .name
        .as_deref()
        .or(name)
        .unwrap_or("(unnamed product)");
    writeln!(writer, "{}", format_per_100g(display_name, per_100g))?;

    let Some(quantity) = portion.grams else {
        return Ok(());
    };
    let scaled = per_100g
        .scale(quantity)
        .with_context(|| format!("quantity must be positive, got {quantity}"))?;
    writeln!(
        writer,
        "For {quantity:.0} g: {} (protein {}, fat {}, carbs {})",
        scaled
            .calories
            .map_or_else(|| "- kcal".to_string(), |c| format!("{c} kcal")),
        grams(scaled.protein),
        grams(scaled.fat),
        grams(scaled.carbs)
    )?;

    if !portion.save {
        return Ok(());
    }
    let Some(category) = portion.category else {
        bail!("--save needs --category");
    };
    let Some(name) = portion.name.as_deref().or(name) else {
        bail!("product has no name; pass --name to save it");
    };
    let entry = build_entry(
        name,
        quantity,
        category,
        scaled,
        image,
        Utc::now().timestamp_millis(),
    )?;
    let saved = db.insert_entry(&entry).context("failed to save entry")?;
    tracing::info!(id = saved.id, "entry added from lookup");
    writeln!(
        writer,
        "Added #{}: {} ({:.0} g, {}) {} kcal",
        saved.id,
        saved.name,
        saved.quantity_grams,
        saved.category.label(),
        saved.calories
    )?;
    Ok(())
}

fn foods_client(config: &Config) -> Result<ns_foods::Client> {
    ns_foods::Client::new(config.foods_base_url.as_str())
        .context("failed to create food database client")
}

pub fn scan<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    args: &ScanArgs,
) -> Result<()> {
    let client = foods_client(config)?;
    let product = block_on(client.product_by_barcode(&args.barcode))?
        .with_context(|| format!("barcode lookup failed for {}", args.barcode))?;

    let Some(product) = product else {
        writeln!(writer, "No product found for barcode {}", args.barcode.trim())?;
        return Ok(());
    };
    show_food(
        writer,
        db,
        product.name.as_deref(),
        &product.nutriments,
        &args.portion,
        None,
    )
}

pub fn search<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    args: &SearchArgs,
) -> Result<()> {
    if args.query.trim().chars().count() < ns_foods::MIN_QUERY_LEN {
        bail!(
            "search query must be at least {} characters",
            ns_foods::MIN_QUERY_LEN
        );
    }
    let client = foods_client(config)?.with_page_size(args.limit);
    let products = block_on(client.search(&args.query))?
        .with_context(|| format!("search failed for {:?}", args.query))?;

    if products.is_empty() {
        writeln!(writer, "No products found for {:?}", args.query.trim())?;
        return Ok(());
    }

    if !args.portion.save && args.portion.grams.is_none() {
        for (i, product) in products.iter().enumerate() {
            let name = product.name.as_deref().unwrap_or("(unnamed product)");
            writeln!(writer, "{:>2}. {}", i + 1, format_per_100g(name, &product.nutriments))?;
        }
        return Ok(());
    }

    let Some(product) = args.pick.checked_sub(1).and_then(|i| products.get(i)) else {
        bail!("--pick must be between 1 and {}", products.len());
    };
    show_food(
        writer,
        db,
        product.name.as_deref(),
        &product.nutriments,
        &args.portion,
        None,
    )
}

pub fn analyze<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    args: &AnalyzeArgs,
) -> Result<()> {
    let Some(mime_type) = ns_vision::mime_type_for_path(&args.image) else {
        bail!(
            "unsupported image type: {} (use jpeg, png, or webp)",
            args.image.display()
        );
    };
    let Some(api_key) = config.gemini_api_key.as_deref() else {
        bail!("gemini_api_key is not configured (set NS_GEMINI_API_KEY or add it to config.toml)");
    };
    let image = std::fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;

    let client = ns_vision::Client::new(api_key)
        .context("failed to create vision client")?
        .with_model(config.vision_model.as_str());
    let guess = block_on(client.analyze_image(&image, mime_type))?
        .context("image analysis failed")?;

    if guess.is_unknown() {
        writeln!(writer, "No food recognized in {}", args.image.display())?;
        return Ok(());
    }

    let image_path = std::fs::canonicalize(&args.image).unwrap_or_else(|_| args.image.clone());
    show_food(
        writer,
        db,
        Some(&guess.name),
        &guess.per_100g,
        &args.portion,
        Some(&image_path),
    )
}
