use std::io::Write;
use std::path::{Path, PathBuf};

use crawler::config::GameConfig;
use crawler::error::ConfigError;
use crawler::world::TileRules;

#[test]
fn empty_object_gives_defaults() {
    let config = GameConfig::from_json_str("{}").unwrap();
    assert_eq!(config, GameConfig::default());
    assert_eq!(config.levels.len(), 2);
    assert_eq!(config.attack_sprites, vec![24, 25, 26, 27]);
    assert_eq!(config.tile_rules, TileRules::default());
    assert_eq!(config.texel_inset, 0.99);
}

#[test]
fn partial_rules_keep_other_defaults() {
    let config = GameConfig::from_json_str(r#"{ "tile_rules": { "exit": 3 }, "cell_width": 16 }"#).unwrap();
    assert_eq!(config.tile_rules.exit, 3);
    assert!(config.tile_rules.is_blocking(32));
    assert_eq!(config.cell_width, 16);
    assert_eq!(config.cell_height, 32);

    let settings = config.world_settings();
    assert_eq!(settings.cell_width, 16);
    assert_eq!(settings.rules.exit, 3);
    assert_eq!(settings.canvas_width, 1024.0);
}

#[test]
fn malformed_json_is_an_error() {
    let err = GameConfig::from_json_str("{ \"title\": 5 }").unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = GameConfig::load("/no/such/crawler.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn load_and_resolve_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crawler.json");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"{{
            "sprite_sheet": "sheet.png",
            "levels": [{{ "tile_map": "a.txt", "entities": "/abs/b.txt" }}]
        }}"#
    )
    .unwrap();

    let mut config = GameConfig::load(&path).unwrap();
    config.resolve_paths(dir.path());
    assert_eq!(config.sprite_sheet, dir.path().join("sheet.png"));
    assert_eq!(config.levels[0].tile_map, dir.path().join("a.txt"));
    assert_eq!(config.levels[0].entities, PathBuf::from("/abs/b.txt"));
}

#[test]
fn shipped_config_parses() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/crawler.json");
    let config = GameConfig::load(path).unwrap();
    assert_eq!(config.levels.len(), 2);
    assert_eq!(config.tile_rules, TileRules::default());
}
