use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lotmap::geometry::{polygon_area_m2, to_hectares, GeoBounds};
use lotmap::report::{ranking_table, summary_table};
use lotmap::{
    format_area, AreaUnit, Config, CropCategory, EventBus, HeadlessSurface, InMemoryLotStore,
    LotMapController, LotStore, Polygon,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "lotmap")]
#[command(about = "Lot and sublot map reports from a data snapshot", long_about = None)]
#[command(version = lotmap::VERSION)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot JSON with lots, sublots, and crops
    #[arg(short, long, global = true)]
    snapshot: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lot status and coordinate coverage counts
    Summary,
    /// Lots ranked by area
    Top {
        /// Only rank lots growing this crop type
        #[arg(long)]
        crop: Option<CropCategory>,
        /// Number of lots to show (defaults to the configured top_n)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Crop types available for filtering
    Crops,
    /// Padded bounding box of every mapped lot and sublot
    Bounds,
    /// Area of a GeoJSON polygon file
    Area {
        /// GeoJSON geometry, bare ring, or ring list
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        lotmap::init_json_logging()?;
    } else {
        lotmap::init_logging()?;
    }
    tracing::debug!("lotmap {} built {}", lotmap::VERSION, lotmap::BUILD_DATE);

    let config = load_config(cli.config.as_deref())?;
    let unit = config.analytics.area_unit;

    match &cli.command {
        Commands::Area { file } => print_area(file, unit, cli.json),
        command => {
            let controller = open_controller(&cli, &config).await?;
            print_report(&controller, command, unit, cli.json)
        }
    }
}

fn print_report(
    controller: &LotMapController,
    command: &Commands,
    unit: AreaUnit,
    json: bool,
) -> Result<()> {
    match command {
        Commands::Summary => {
            let summary = controller.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", summary_table(&summary));
            }
        }
        Commands::Top { crop, limit } => {
            let ranking = match limit {
                Some(limit) => controller.snapshot().top_by_area(crop.as_ref(), *limit),
                None => controller.top_lots(crop.as_ref()),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&ranking)?);
            } else {
                print!("{}", ranking_table(&ranking, unit));
            }
        }
        Commands::Crops => {
            let options = controller.crop_filter_options();
            if json {
                println!("{}", serde_json::to_string_pretty(&options)?);
            } else {
                for option in options {
                    println!("{}", option);
                }
            }
        }
        Commands::Bounds => {
            let Some(bounds) = controller.fit_to_data() else {
                bail!("No lot or sublot has coordinates");
            };
            print_bounds(&bounds, json)?;
        }
        Commands::Area { file } => print_area(file, unit, json)?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()?,
    };
    Config::load_or_default(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

async fn open_controller(cli: &Cli, config: &Config) -> Result<LotMapController> {
    let Some(snapshot) = cli.snapshot.as_ref().or(config.data.snapshot_path.as_ref()) else {
        bail!("No snapshot given; pass --snapshot or set data.snapshot_path in the config");
    };

    let store = InMemoryLotStore::from_json_file(snapshot)
        .with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;
    let store: Arc<dyn LotStore> = Arc::new(store);

    let controller = LotMapController::new(
        store,
        Arc::new(HeadlessSurface::new()),
        Arc::new(EventBus::new()),
        config,
    );
    controller.refresh().await?;
    Ok(controller)
}

fn print_area(file: &Path, unit: AreaUnit, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    let Some(polygon) = Polygon::from_value(&value) else {
        bail!("{} does not hold a polygon", file.display());
    };

    let area_m2 = polygon_area_m2(&polygon);
    if json {
        let report = serde_json::json!({
            "area_m2": area_m2,
            "area_ha": to_hectares(area_m2),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_area(area_m2, unit));
    }
    Ok(())
}

fn print_bounds(bounds: &GeoBounds, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(bounds)?);
    } else {
        println!(
            "south {:.6}  west {:.6}  north {:.6}  east {:.6}",
            bounds.south, bounds.west, bounds.north, bounds.east
        );
    }
    Ok(())
}
