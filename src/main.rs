use std::path::Path;

use glam::{IVec2, UVec2};

use crawler::DEFAULT_CONFIG_PATH;
use crawler::camera::Camera;
use crawler::config::GameConfig;
use crawler::engine::{Engine, Game, KeyCode};
use crawler::error::ConfigError;
use crawler::input::{ActionMap, Repeat};
use crawler::renderer::pipeline::MESH_SLOTS;
use crawler::world::{Facing, World};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Action {
    Move(Facing),
    Attack,
    NextLevel,
    ReportPosition,
    Quit,
}

fn default_bindings() -> ActionMap<Action> {
    let mut map = ActionMap::new();
    map.bind(Action::Move(Facing::Up), KeyCode::KeyW);
    map.bind(Action::Move(Facing::Left), KeyCode::KeyA);
    map.bind(Action::Move(Facing::Down), KeyCode::KeyS);
    map.bind(Action::Move(Facing::Right), KeyCode::KeyD);
    map.bind(Action::Move(Facing::Up), KeyCode::ArrowUp);
    map.bind(Action::Move(Facing::Left), KeyCode::ArrowLeft);
    map.bind(Action::Move(Facing::Down), KeyCode::ArrowDown);
    map.bind(Action::Move(Facing::Right), KeyCode::ArrowRight);
    map.bind(Action::Attack, KeyCode::Space);
    map.bind(Action::NextLevel, KeyCode::KeyN);
    map.bind(Action::ReportPosition, KeyCode::KeyZ);
    map.bind(Action::Quit, KeyCode::Escape);
    map
}

// ── Crawler ──────────────────────────────────────────────────────────────────

struct Crawler {
    config: GameConfig,
    world: World,
    actions: ActionMap<Action>,
    move_repeat: Repeat,
    attack_repeat: Repeat,
    level: usize,
    camera: Camera,
}

impl Crawler {
    fn new(config: GameConfig) -> Self {
        let world = World::open(
            config.world_settings(),
            config.sprite_sheet.clone(),
            config.levels[0].clone(),
        );
        Self {
            move_repeat: Repeat::new(config.move_repeat_secs),
            attack_repeat: Repeat::new(config.attack_repeat_secs),
            config,
            world,
            actions: default_bindings(),
            level: 0,
            camera: Camera::new().with_follow_speed(12.0),
        }
    }

    fn next_level(&mut self) {
        self.level = (self.level + 1) % self.config.levels.len();
        log::info!("entering level {}", self.level);
        self.world.load(self.config.levels[self.level].clone());
    }

    fn player_position(&self) -> Option<IVec2> {
        self.world.entity(self.world.camera_target()).map(|e| e.position)
    }

    /// Turn towards `facing`, then step if the destination is open.
    fn step_player(&mut self, facing: Facing) {
        let player = self.world.camera_target();
        let Some(entity) = self.world.entity_mut(player) else { return };
        entity.facing = facing;
        let from = entity.position;

        let (walkable, to) = self.world.is_walkable(from, facing);
        if !walkable {
            return;
        }
        let delta = to - from;
        self.world.move_entity_position(player, delta.x, delta.y);
        if self.world.is_exit(to) {
            self.next_level();
        }
    }

    fn attack(&mut self) {
        let Some(player) = self.world.entity(self.world.camera_target()) else { return };
        let target = player.position + player.facing.delta();
        let facing = player.facing;
        self.world
            .add_effect(self.config.attack_sprites.clone(), target, facing, self.config.attack_ttl);
    }
}

impl Game for Crawler {
    fn update(&mut self, engine: &mut Engine) {
        let input = &engine.input;
        if self.actions.is_pressed(Action::Quit, input) {
            engine.request_quit();
            return;
        }

        self.world.poll_loads();
        if !self.world.check_draw() {
            return;
        }

        let dt = engine.dt();
        let held = Facing::ALL
            .into_iter()
            .find(|f| self.actions.is_held(Action::Move(*f), input));
        if self.move_repeat.fire(held.is_some(), dt)
            && let Some(facing) = held
        {
            self.step_player(facing);
        }

        if self.attack_repeat.fire_action(&self.actions, Action::Attack, input, dt) {
            self.attack();
        }

        if self.actions.is_pressed(Action::NextLevel, input) {
            self.next_level();
        }

        if self.actions.is_pressed(Action::ReportPosition, input)
            && let Some(pos) = self.player_position()
        {
            log::info!("player at ({}, {})", pos.x, pos.y);
        }

        if let Some(pos) = self.player_position() {
            self.camera.follow(pos);
        }
        self.camera.tick(dt);
    }

    fn render(&mut self, engine: &mut Engine) {
        self.world.draw(&mut engine.renderer, MESH_SLOTS);

        let map = self.world.tile_map();
        let visible = UVec2::new(map.visible_width(), map.visible_height());
        let world = UVec2::new(map.world_width(), map.world_height());
        engine.set_view(self.camera.build_view_proj(visible, world));
    }
}

fn load_config() -> Result<GameConfig, ConfigError> {
    let path = Path::new(DEFAULT_CONFIG_PATH);
    match GameConfig::load(path) {
        Ok(mut config) => {
            if let Some(dir) = path.parent() {
                config.resolve_paths(dir);
            }
            log::info!("loaded config from {}", path.display());
            Ok(config)
        }
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("{} not found; using built-in defaults", path.display());
            Ok(GameConfig::default())
        }
        Err(e) => Err(e),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    if config.levels.is_empty() {
        log::error!("configuration lists no levels");
        std::process::exit(1);
    }

    let result = Engine::builder()
        .with_title(&config.title)
        .with_size(config.canvas_width, config.canvas_height)
        .run(Crawler::new(config));
    if let Err(e) = result {
        log::error!("event loop failed: {e}");
        std::process::exit(1);
    }
}
