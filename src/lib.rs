pub mod assets;
pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod mesh;
pub mod renderer;
pub mod text;
pub mod tilemap;
pub mod world;

/// Where the binary looks for its configuration.
pub const DEFAULT_CONFIG_PATH: &str = "assets/crawler.json";
