use fixstep::prelude::{
    ButtonState, Color, Engine, EngineConfig, KeyEvent, MouseEvent, RaylibPlatform, Refresh, RenderQueue, Scene,
    Vector2, World, WorldConfig,
};

const KEY_SPACE: u32 = 32;

struct Particles {
    world: World,
    tick_ms: f64,
}

impl Particles {
    fn new(tick_ms: f64) -> fixstep::Result<Self> {
        let mut world = World::new(WorldConfig::default())?;
        world.create_plane(Vector2::new(20.0, 440.0), Vector2::new(600.0, 20.0))?;
        world.create_particle(Vector2::new(320.0, 80.0), Vector2::new(8.0, 8.0), Vector2::new(0.0, 40.0))?;

        Ok(Self { world, tick_ms })
    }
}

impl Scene for Particles {
    fn step(&mut self) -> fixstep::Result<()> {
        self.world.physics_step(self.tick_ms)?;
        Ok(())
    }

    fn draw(&mut self, queue: &mut RenderQueue) {
        queue.refresh_window(Refresh::Colour(Color::rgb(245, 245, 245)));

        for body in self.world.bodies() {
            let (min, max) = body.bounds();
            if body.is_static() {
                queue.fill_rect(min.x, min.y, max.x - min.x, max.y - min.y, Color::BLUE, 1.0, Color::BLACK);
            } else {
                queue.fill_ellipse(body.position.x, body.position.y, body.extents().x, body.extents().y, Color::RED, 1.0, Color::BLACK);
            }
        }
    }

    fn on_key_event(&mut self, event: &KeyEvent) {
        if event.key == KEY_SPACE && event.state == ButtonState::Pressed {
            for body in self.world.bodies_mut() {
                body.velocity.y -= 60.0;
                body.clear_contact_memory();
            }
        }
    }

    fn on_mouse_event(&mut self, event: &MouseEvent) {
        if event.state != ButtonState::Pressed {
            return;
        }

        if let Err(err) = self.world.create_particle(event.position, Vector2::new(8.0, 8.0), Vector2::new(0.0, 1.0)) {
            tracing::warn!("{err}");
        }
    }
}

fn main() -> fixstep::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = EngineConfig::default().ticks_per_second(60);
    let platform = RaylibPlatform::new(&config.display);

    let mut engine = Engine::new(config)?;
    engine.init(platform);

    let scene = Particles::new(engine.time_per_tick())?;
    engine.start(scene)
}
