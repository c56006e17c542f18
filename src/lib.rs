pub mod city;
pub mod config;
pub mod error;
pub mod geometry;
pub mod location;
pub mod names;
pub mod province;
pub mod random;
pub mod seeds;
pub mod terrain;
pub mod travel;
pub mod weather;
pub mod wild;

pub use city::{BlockType, CityLayout, CityLayoutPlan, generate_city, generate_plan, plan_city};
pub use config::GenerationTables;
pub use error::{Error, Result};
pub use geometry::{Point, Rect};
pub use location::{LocationDefinition, LocationKind, all_city_definitions, plan_all_cities};
pub use names::{NameChunkTable, compose_name, generate_npc_name};
pub use province::CityDataFile;
pub use random::ArenaRandom;
pub use terrain::TerrainGrid;
pub use travel::{SpeedTables, TravelContext, compute_travel_days};
pub use weather::{WeatherGrid, WeatherType};
pub use wild::generate_wilderness_indices;
