use arenagen::city::{self, city_inf_name};
use arenagen::config::GenerationTables;
use arenagen::location::LocationDefinition;
use arenagen::names::{NameChunkTable, generate_npc_name};
use arenagen::province::CityDataFile;
use arenagen::random::ArenaRandom;
use arenagen::terrain::{self, TerrainGrid};
use arenagen::travel::{TravelContext, map_distance};
use arenagen::weather::{WeatherType, generate_weather_list};
use arenagen::wild::generate_wilderness_indices;
use arenagen::{CityLayoutPlan, Point};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Детерминированная генерация мира: города, имена, путешествия
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Последовательность генератора
    Random {
        #[arg(short, long, default_value_t = 12345)]
        seed: u32,
        #[arg(short, long, default_value_t = 10)]
        count: usize,
    },

    /// План кварталов города и имена .MIF
    City {
        #[arg(short, long)]
        seed: u32,
        /// Кварталов на сторону (6, 5 или 4)
        #[arg(short, long, default_value_t = 6)]
        dim: usize,
        /// Зарезервированные ячейки через запятую
        #[arg(short, long, value_delimiter = ',')]
        reserved: Vec<u8>,
        /// Сохранить схему плана в PNG
        #[arg(long)]
        png: Option<PathBuf>,
        /// Вывести раскладку в JSON
        #[arg(long)]
        json: bool,
    },

    /// Все сиды и параметры города
    Seeds {
        #[arg(long)]
        tables: Option<PathBuf>,
        #[arg(long)]
        city_data: PathBuf,
        /// Карта местности (.IMG); без неё местность считается умеренной
        #[arg(long)]
        terrain: Option<PathBuf>,
        #[arg(short, long)]
        province: usize,
        #[arg(short, long)]
        city: usize,
        /// Показать раскладку диких земель
        #[arg(long)]
        wild: bool,
        /// Вывести определение города в JSON
        #[arg(long)]
        json: bool,
    },

    /// Длительность путешествия между точками карты мира
    Travel {
        #[arg(long)]
        tables: Option<PathBuf>,
        #[arg(long)]
        city_data: PathBuf,
        #[arg(long)]
        terrain: PathBuf,
        #[arg(long, value_parser = parse_point)]
        from: Point,
        #[arg(long, value_parser = parse_point)]
        to: Point,
        #[arg(short, long, default_value_t = 0)]
        month: usize,
        #[arg(long, default_value_t = 0)]
        season: usize,
        #[arg(short, long, default_value_t = 12345)]
        seed: u32,
    },

    /// Превью карты местности
    Terrain {
        #[arg(long)]
        terrain: PathBuf,
        #[arg(short, long, default_value = "terrain.png")]
        output: PathBuf,
    },

    /// Имена NPC
    Names {
        #[arg(long)]
        chunks: PathBuf,
        #[arg(short, long, default_value_t = 0)]
        race: usize,
        #[arg(long)]
        female: bool,
        #[arg(short, long, default_value_t = 12345)]
        seed: u32,
        #[arg(short, long, default_value_t = 5)]
        count: usize,
    },
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got {value}"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(Point::new(x, y))
}

fn load_tables(path: Option<&Path>) -> arenagen::Result<GenerationTables> {
    match path {
        Some(path) => GenerationTables::from_toml_file(path),
        None => Ok(GenerationTables::default()),
    }
}

fn print_plan(plan: &CityLayoutPlan) {
    for row in 0..plan.dim() {
        let line: Vec<String> = (0..plan.dim())
            .filter_map(|column| plan.get(column, row))
            .map(|block| format!("{block:?}"))
            .collect();
        println!("  {}", line.join(" "));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Random { seed, count } => {
            let mut random = ArenaRandom::new(seed);
            for _ in 0..count {
                println!("{}", random.next());
            }
        }

        Command::City {
            seed,
            dim,
            reserved,
            png,
            json,
        } => {
            let layout = city::generate_city(seed, dim, &reserved, Point::new(0, 0))?;
            if json {
                println!("{}", layout.to_json()?);
                return Ok(());
            }
            println!("План {dim}×{dim} (сид {seed}):");
            print_plan(&layout.plan);
            for block in &layout.blocks {
                println!(
                    "  {:<12} {:<12} ({}, {})",
                    format!("{:?}", block.block),
                    block.mif_name,
                    block.origin.x,
                    block.origin.y
                );
            }
            if let Some(path) = png {
                layout.plan.save_as_png(&path.to_string_lossy(), 32)?;
                println!("Схема сохранена в {path:?}");
            }
        }

        Command::Seeds {
            tables,
            city_data,
            terrain,
            province,
            city,
            wild,
            json,
        } => {
            let tables = load_tables(tables.as_deref())?;
            let city_data = CityDataFile::from_file(&city_data)?;
            let terrain = match terrain {
                Some(path) => TerrainGrid::from_file(path)?,
                None => TerrainGrid::filled(terrain::TEMPERATE1),
            };
            info!(province, city, "building city definition");

            let location =
                LocationDefinition::city_from_tables(city, province, &tables, &city_data, &terrain)?;
            if json {
                println!("{}", location.to_json()?);
                return Ok(());
            }
            let definition = location.city()?;
            println!("{} ({})", location.name, definition.type_display_name);
            println!("  позиция:      ({}, {})", location.x, location.y);
            println!("  широта:       {:.3}", location.latitude);
            println!("  карта:        {}", definition.map_filename);
            println!("  сид города:   {}", definition.city_seed);
            println!("  сид земель:   {}", definition.wild_seed);
            println!("  сид провинции:{}", definition.province_seed);
            println!("  сид правителя:{}", definition.ruler_seed);
            println!("  сид неба:     {}", definition.sky_seed);
            println!(
                "  правитель:    {}",
                if definition.ruler_is_male { "мужчина" } else { "женщина" }
            );
            println!(
                "  климат:       {:?} ({})",
                definition.climate,
                city_inf_name(definition.climate, WeatherType::Clear)
            );

            if wild {
                let indices = generate_wilderness_indices(definition.wild_seed, &tables.wild)?;
                for row in indices.cells().chunks(arenagen::wild::WILD_WIDTH) {
                    let line: Vec<String> = row.iter().map(|b| format!("{b:2}")).collect();
                    println!("{}", line.join(""));
                }
            }
        }

        Command::Travel {
            tables,
            city_data,
            terrain,
            from,
            to,
            month,
            season,
            seed,
        } => {
            let tables = load_tables(tables.as_deref())?;
            let city_data = CityDataFile::from_file(&city_data)?;
            let terrain = TerrainGrid::from_file(terrain)?;

            let mut random = ArenaRandom::new(seed);
            let weathers = generate_weather_list(
                &tables.quarter_climates_array()?,
                season,
                &tables.weather_table,
                &mut random,
            )?;
            let context = TravelContext {
                city_data: &city_data,
                terrain: &terrain,
                weathers: &weathers,
                speeds: &tables.speeds,
            };
            let days = context.travel_days(from, to, month, &mut random)?;
            println!(
                "({}, {}) → ({}, {}): расстояние {}, {days} дн.",
                from.x,
                from.y,
                to.x,
                to.y,
                map_distance(from, to)
            );
        }

        Command::Terrain { terrain, output } => {
            let grid = TerrainGrid::from_file(terrain)?;
            println!("Сохранение в {output:?}");
            grid.save_as_png(&output.to_string_lossy())?;
        }

        Command::Names {
            chunks,
            race,
            female,
            seed,
            count,
        } => {
            let chunks = NameChunkTable::from_file(chunks)?;
            let mut random = ArenaRandom::new(seed);
            for _ in 0..count {
                println!("{}", generate_npc_name(race, !female, &chunks, &mut random)?);
            }
        }
    }

    Ok(())
}
