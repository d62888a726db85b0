//! The engine loop: fixed ticks, input dispatch and one render pass per frame.

use tracing::{debug, error, info, warn};

use crate::error::{EngineError, Result};
use crate::input::{CallbackId, InputEvent, KeyEvent, MouseEvent, Subscribers};
use crate::platform::Platform;
use crate::render::{combine_regions, Color, Drawable, Rect, RenderQueue};
use crate::scene::Scene;
use crate::step::FixedStep;
use crate::DEFAULT_TICKS_PER_SECOND;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//----------------------------------------------------------------------------------
// Types and Structures Definition
//----------------------------------------------------------------------------------
/// Window settings read by the platform when it creates its window
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    pub title: String,
    /// Window size in pixels
    pub resolution: (u32, u32),
    pub fullscreen: bool,
    pub borderless: bool,
    pub vsync: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: String::from("fixstep"),
            resolution: (640, 480),
            fullscreen: false,
            borderless: false,
            vsync: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Fixed scene ticks per second
    pub ticks_per_second: u32,
    /// Strict mode: errors are returned to the caller instead of stopping the loop
    pub debug: bool,
    pub display: DisplayConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            debug: cfg!(feature = "debug"),
            display: DisplayConfig::default(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn ticks_per_second(mut self, ticks_per_second: u32) -> Self {
        self.ticks_per_second = ticks_per_second;
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticks_per_second == 0 {
            return Err(EngineError::InvalidTickRate(0));
        }
        let (width, height) = self.display.resolution;
        if width == 0 || height == 0 {
            return Err(EngineError::invalid_config("resolution must be positive"));
        }
        Ok(())
    }
}

/// What one loop iteration did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    /// Scene ticks run this iteration
    pub ticks: u32,
    /// Drawables handed to the platform successfully
    pub drawn: usize,
    /// Region passed to the platform for refresh
    pub region: Option<Rect>,
}

pub struct Engine<P: Platform> {
    config: EngineConfig,
    /// Attached by `init`
    platform: Option<P>,
    scene: Option<Box<dyn Scene>>,
    running: bool,
    /// Tick time step accumulator
    clock: FixedStep,
    /// Clock reading at the start of the previous iteration
    previous_time: f64,
    /// Total ticks stepped, may be moved by the client
    tick_base: i64,
    fps: u32,
    tps: u32,
    /// Frames since the last rate snapshot
    frames: u32,
    /// Ticks since the last rate snapshot
    ticks: u32,
    total_frames: u64,
    key_callbacks: Subscribers<KeyEvent>,
    mouse_callbacks: Subscribers<MouseEvent>,
    queue: RenderQueue,
    previous_region: Option<Rect>,
    events: Vec<InputEvent>,
}

//----------------------------------------------------------------------------------
// Module Functions Definition
//----------------------------------------------------------------------------------
impl<P: Platform> Engine<P> {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            clock: FixedStep::per_second(config.ticks_per_second),
            queue: RenderQueue::new(config.display.resolution),
            config,
            platform: None,
            scene: None,
            running: false,
            previous_time: 0.0,
            tick_base: 0,
            fps: 0,
            tps: 0,
            frames: 0,
            ticks: 0,
            total_frames: 0,
            key_callbacks: Subscribers::default(),
            mouse_callbacks: Subscribers::default(),
            previous_region: None,
            events: Vec::new(),
        })
    }

    /// One-time setup, attaches the platform the loop runs on
    pub fn init(&mut self, platform: P) {
        self.platform = Some(platform);
        info!("initialised engine");
    }

    pub fn is_initialized(&self) -> bool {
        self.platform.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn platform(&self) -> Option<&P> {
        self.platform.as_ref()
    }

    pub fn platform_mut(&mut self) -> Option<&mut P> {
        self.platform.as_mut()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn debug_mode(&self) -> bool {
        self.config.debug
    }

    /// Switches between strict and relaxed error handling, only before the loop runs
    pub fn set_debug_mode(&mut self, debug: bool) -> Result<()> {
        if !self.check_safe("debug mode")? {
            return Ok(());
        }
        self.config.debug = debug;
        Ok(())
    }

    pub fn tick_rate(&self) -> u32 {
        self.config.ticks_per_second
    }

    /// Sets the number of ticks per second, only before the loop runs
    pub fn set_tick_rate(&mut self, ticks_per_second: u32) -> Result<()> {
        if !self.check_safe("tick rate")? {
            return Ok(());
        }
        if ticks_per_second == 0 {
            return Err(EngineError::InvalidTickRate(ticks_per_second));
        }

        self.config.ticks_per_second = ticks_per_second;
        self.clock.set_steps_per_second(ticks_per_second);
        Ok(())
    }

    /// Duration of one tick, in milliseconds
    pub fn time_per_tick(&self) -> f64 {
        self.clock.step_time()
    }

    /// Time the given amount of ticks takes to step, in milliseconds
    pub fn ticks_to_time(&self, ticks: f64) -> f64 {
        ticks*(1e3/self.config.ticks_per_second as f64)
    }

    /// Whole ticks that fit in `time` milliseconds
    pub fn time_to_ticks(&self, time: f64) -> i64 {
        (time*(self.config.ticks_per_second as f64/1e3)).floor() as i64
    }

    pub fn tick_base(&self) -> i64 {
        self.tick_base
    }

    pub fn set_tick_base(&mut self, tick_base: i64) {
        self.tick_base = tick_base;
    }

    /// Moves the tick base by `amount`, which may be negative
    pub fn step_tick_base(&mut self, amount: i64) {
        self.tick_base += amount;
    }

    /// Frames rendered during the last second of ticks
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Ticks stepped during the last second of ticks
    pub fn tps(&self) -> u32 {
        self.tps
    }

    /// Frames rendered since the engine was created
    pub fn frame_count(&self) -> u64 {
        self.total_frames
    }

    /// Current platform time in milliseconds
    pub fn engine_time(&mut self) -> Option<f64> {
        self.platform.as_mut().map(|platform| platform.now_ms())
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.config.display.resolution
    }

    /// Sets the window size, non-positive sizes are ignored
    pub fn set_resolution(&mut self, resolution: (u32, u32)) {
        if resolution.0 == 0 || resolution.1 == 0 {
            warn!(?resolution, "ignoring invalid resolution");
            return;
        }
        self.config.display.resolution = resolution;
        self.queue.set_resolution(resolution);
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.config.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayConfig {
        &mut self.config.display
    }

    pub fn add_key_callback(&mut self, callback: impl FnMut(&KeyEvent) + 'static) -> CallbackId {
        self.key_callbacks.add(callback)
    }

    pub fn remove_key_callback(&mut self, id: CallbackId) -> bool {
        self.key_callbacks.remove(id)
    }

    pub fn add_mouse_callback(&mut self, callback: impl FnMut(&MouseEvent) + 'static) -> CallbackId {
        self.mouse_callbacks.add(callback)
    }

    pub fn remove_mouse_callback(&mut self, id: CallbackId) -> bool {
        self.mouse_callbacks.remove(id)
    }

    /// Queue drained by the next render pass
    pub fn render_queue(&mut self) -> &mut RenderQueue {
        &mut self.queue
    }

    /// Replaces the active scene, takes effect on the next tick
    pub fn set_scene(&mut self, scene: impl Scene + 'static) {
        self.scene = Some(Box::new(scene));
    }

    /// Runs the loop with `initial_scene` until a quit event is received
    pub fn start(&mut self, initial_scene: impl Scene + 'static) -> Result<()> {
        self.begin(initial_scene)?;

        while self.running {
            if let Err(err) = self.run_frame() {
                self.teardown();
                return Err(err);
            }
        }

        self.teardown();
        Ok(())
    }

    /// Marks the engine running with `initial_scene`, without entering the loop
    ///
    /// Fails if no platform was attached with [`Engine::init`].
    pub fn begin(&mut self, initial_scene: impl Scene + 'static) -> Result<()> {
        let Some(platform) = self.platform.as_mut() else {
            error!("attempting to run engine when it is uninitialised, call init first");
            return Err(EngineError::NotInitialized);
        };

        self.previous_time = platform.now_ms();
        self.clock.reset();
        self.frames = 0;
        self.ticks = 0;
        self.running = true;
        self.set_scene(initial_scene);

        info!(ticks_per_second = self.config.ticks_per_second, "starting engine");
        Ok(())
    }

    /// One loop iteration: input, as many ticks as the elapsed time covers, then one render pass
    pub fn run_frame(&mut self) -> Result<FrameStats> {
        let Some(platform) = self.platform.as_mut() else {
            return Err(EngineError::NotInitialized);
        };

        let current_time = platform.now_ms();
        self.clock.accumulate(current_time - self.previous_time);
        self.previous_time = current_time;

        self.gather_input();

        let mut stats = FrameStats::default();
        while self.clock.try_consume() {
            let result = match self.scene.as_mut() {
                Some(scene) => scene.step(),
                None => Err(EngineError::NoScene),
            };

            if let Err(err) = result {
                self.raise(err)?;
                break;
            }

            self.step_tick_base(1);
            self.ticks += 1;
            stats.ticks += 1;

            if self.tick_base.rem_euclid(self.config.ticks_per_second as i64) == 0 {
                self.fps = self.frames;
                self.tps = self.ticks;
                debug!(fps = self.fps, tps = self.tps, "engine rates");
                self.frames = 0;
                self.ticks = 0;
            }
        }

        let (drawn, region) = self.draw();
        stats.drawn = drawn;
        stats.region = region;

        self.frames += 1;
        self.total_frames += 1;

        Ok(stats)
    }

    /// Stops the loop after the current iteration
    pub fn quit(&mut self) {
        info!("exiting from the engine");
        self.running = false;
    }

    /// Reports an engine error according to the debug mode
    ///
    /// Strict mode returns the error. Relaxed mode notifies the user, stops the loop and returns `Ok`.
    fn raise(&mut self, err: EngineError) -> Result<()> {
        error!("{err}");

        if self.config.debug {
            return Err(err);
        }

        if let Some(platform) = self.platform.as_mut() {
            platform.notify_error(&format!("An engine error has occurred: {err}"));
        }
        self.running = false;
        Ok(())
    }

    /// Guards settings that cannot change while the loop runs, true if the change may proceed
    fn check_safe(&mut self, setting: &'static str) -> Result<bool> {
        if !self.running {
            return Ok(true);
        }

        self.raise(EngineError::LockedWhileRunning { setting })?;
        Ok(false)
    }

    fn gather_input(&mut self) {
        let Some(platform) = self.platform.as_mut() else {
            return;
        };

        let mut events = std::mem::take(&mut self.events);
        events.clear();
        platform.poll_events(&mut events);

        for event in &events {
            match event {
                InputEvent::Key(key) => {
                    self.key_callbacks.dispatch(key);
                    if let Some(scene) = self.scene.as_mut() {
                        scene.on_key_event(key);
                    }
                }
                InputEvent::Mouse(mouse) => {
                    self.mouse_callbacks.dispatch(mouse);
                    if let Some(scene) = self.scene.as_mut() {
                        scene.on_mouse_event(mouse);
                    }
                }
                InputEvent::Quit => {
                    self.quit();
                    break;
                }
            }
        }

        self.events = events;
    }

    /// Render pass, drains the queue into the platform and presents the dirty region
    fn draw(&mut self) -> (usize, Option<Rect>) {
        if let Some(scene) = self.scene.as_mut() {
            scene.draw(&mut self.queue);
        }

        let Some(platform) = self.platform.as_mut() else {
            return (0, None);
        };

        let mut current_region = None;
        let mut drawn = 0;

        for item in self.queue.drain() {
            match platform.draw(&item) {
                Ok(bounds) => {
                    drawn += 1;
                    if self.config.debug {
                        if let Err(err) = platform.draw(&Drawable::outline(bounds, Color::GREEN)) {
                            error!("debug outline: {err}");
                        }
                    }
                    if item.affects_region {
                        current_region = combine_regions(current_region, Some(bounds));
                    }
                }
                Err(err) => error!("{err}"),
            }
        }

        let region = combine_regions(current_region, self.previous_region);
        platform.present(region);
        self.previous_region = current_region;

        (drawn, region)
    }

    fn teardown(&mut self) {
        self.running = false;
        if let Some(platform) = self.platform.as_mut() {
            platform.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::input::{ButtonState, KeyEvent};
    use crate::render::DrawKind;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Default)]
    struct Script {
        times: VecDeque<f64>,
        events: VecDeque<Vec<InputEvent>>,
        drawn: Vec<DrawKind>,
        presented: Vec<Option<Rect>>,
        notifications: Vec<String>,
        shut_down: bool,
        reject_outlines: bool,
    }

    #[derive(Clone, Default)]
    struct ScriptedPlatform(Rc<RefCell<Script>>);

    impl ScriptedPlatform {
        fn with_times(times: &[f64]) -> Self {
            let platform = Self::default();
            platform.0.borrow_mut().times = times.iter().copied().collect();
            platform
        }
    }

    impl Platform for ScriptedPlatform {
        fn now_ms(&mut self) -> f64 {
            let mut script = self.0.borrow_mut();
            let now = script.times.pop_front().unwrap_or(0.0);
            if script.times.is_empty() {
                script.times.push_back(now);
            }
            now
        }

        fn poll_events(&mut self, events: &mut Vec<InputEvent>) {
            if let Some(batch) = self.0.borrow_mut().events.pop_front() {
                events.extend(batch);
            }
        }

        fn draw(&mut self, item: &Drawable) -> std::result::Result<Rect, RenderError> {
            if self.0.borrow().reject_outlines && !item.affects_region {
                return Err(RenderError::UnsupportedKind(item.kind));
            }
            match item.kind {
                DrawKind::Texture => Err(RenderError::UnsupportedKind(DrawKind::Texture)),
                kind => {
                    self.0.borrow_mut().drawn.push(kind);
                    Ok(item.bounds().unwrap_or_default())
                }
            }
        }

        fn present(&mut self, region: Option<Rect>) {
            self.0.borrow_mut().presented.push(region);
        }

        fn notify_error(&mut self, message: &str) {
            self.0.borrow_mut().notifications.push(message.to_owned());
        }

        fn shutdown(&mut self) {
            self.0.borrow_mut().shut_down = true;
        }
    }

    #[derive(Default)]
    struct Counter {
        steps: u32,
        draws: u32,
    }

    struct CountingScene {
        counter: Rc<RefCell<Counter>>,
        fail_on_step: Option<u32>,
    }

    impl Scene for CountingScene {
        fn step(&mut self) -> Result<()> {
            let mut counter = self.counter.borrow_mut();
            counter.steps += 1;
            if self.fail_on_step == Some(counter.steps) {
                return Err(EngineError::Scene("boom".into()));
            }
            Ok(())
        }

        fn draw(&mut self, queue: &mut RenderQueue) {
            self.counter.borrow_mut().draws += 1;
            queue.fill_rect(0.0, 0.0, 10.0, 10.0, Color::WHITE, 0.0, Color::BLACK);
        }
    }

    fn scene() -> (CountingScene, Rc<RefCell<Counter>>) {
        let counter = Rc::new(RefCell::new(Counter::default()));
        (CountingScene { counter: counter.clone(), fail_on_step: None }, counter)
    }

    fn engine(times: &[f64], debug: bool) -> (Engine<ScriptedPlatform>, ScriptedPlatform) {
        let platform = ScriptedPlatform::with_times(times);
        let mut engine = Engine::new(EngineConfig::default().ticks_per_second(10).debug(debug)).unwrap();
        engine.init(platform.clone());
        (engine, platform)
    }

    #[test]
    fn start_requires_init() {
        let mut engine: Engine<ScriptedPlatform> = Engine::new(EngineConfig::default()).unwrap();
        let (scene, counter) = scene();

        assert_eq!(engine.start(scene), Err(EngineError::NotInitialized));
        assert!(!engine.is_running());
        assert_eq!(counter.borrow().steps, 0);
    }

    #[test]
    fn one_render_pass_per_iteration() {
        // 100ms per tick: iterations see 0, 250, 10 and 0 ms elapsed
        let (mut engine, platform) = engine(&[0.0, 0.0, 250.0, 260.0, 260.0], false);
        let (scene, counter) = scene();
        engine.begin(scene).unwrap();

        let ticks: Vec<u32> = (0..4).map(|_| engine.run_frame().unwrap().ticks).collect();

        assert_eq!(ticks, [0, 2, 0, 0]);
        assert_eq!(counter.borrow().steps, 2);
        assert_eq!(counter.borrow().draws, 4);
        assert_eq!(engine.frame_count(), 4);
        assert_eq!(platform.0.borrow().presented.len(), 4);
        assert_eq!(engine.tick_base(), 2);
    }

    #[test]
    fn rates_snapshot_every_second_of_ticks() {
        let mut times = vec![0.0];
        times.extend((1..=20).map(|frame| frame as f64*50.0));
        let (mut engine, _platform) = engine(&times, false);
        let (scene, _counter) = scene();
        engine.begin(scene).unwrap();

        for _ in 0..20 {
            engine.run_frame().unwrap();
        }

        // ten ticks took twenty iterations, the snapshot fires on the iteration of the tenth tick
        assert_eq!(engine.tps(), 10);
        assert_eq!(engine.fps(), 19);
        assert_eq!(engine.tick_base(), 10);
    }

    #[test]
    fn tick_rate_locked_while_running_in_strict_mode() {
        let (mut engine, _platform) = engine(&[0.0], true);
        engine.set_tick_rate(20).unwrap();
        assert_relative_eq!(engine.time_per_tick(), 50.0);

        let (scene, _counter) = scene();
        engine.begin(scene).unwrap();

        assert_eq!(
            engine.set_tick_rate(30),
            Err(EngineError::LockedWhileRunning { setting: "tick rate" })
        );
        assert_eq!(engine.tick_rate(), 20);
        assert!(engine.is_running());
    }

    #[test]
    fn config_violation_stops_the_loop_in_relaxed_mode() {
        let (mut engine, platform) = engine(&[0.0], false);
        let (scene, _counter) = scene();
        engine.begin(scene).unwrap();

        assert_eq!(engine.set_debug_mode(true), Ok(()));

        assert!(!engine.debug_mode());
        assert!(!engine.is_running());
        assert_eq!(platform.0.borrow().notifications.len(), 1);
    }

    #[test]
    fn failing_scene_step_escalates() {
        let (mut strict, _platform) = engine(&[0.0, 500.0], true);
        let (mut failing, _counter) = scene();
        failing.fail_on_step = Some(2);
        strict.begin(failing).unwrap();
        assert_eq!(strict.run_frame(), Err(EngineError::Scene("boom".into())));

        let (mut relaxed, platform) = engine(&[0.0, 500.0], false);
        let (mut failing, counter) = scene();
        failing.fail_on_step = Some(2);
        relaxed.begin(failing).unwrap();

        let stats = relaxed.run_frame().unwrap();
        assert_eq!(stats.ticks, 1);
        assert_eq!(counter.borrow().steps, 2);
        assert!(!relaxed.is_running());
        assert_eq!(platform.0.borrow().notifications.len(), 1);
    }

    #[test]
    fn unsupported_drawables_are_skipped() {
        let (mut engine, platform) = engine(&[0.0], false);
        let (scene, _counter) = scene();
        engine.begin(scene).unwrap();

        engine.render_queue().draw_texture(0.0, 0.0, "missing", 0.0, 0.0, true);
        engine.render_queue().draw_circle(50.0, 50.0, 5.0, Color::RED, 1.0);
        let stats = engine.run_frame().unwrap();

        assert_eq!(stats.drawn, 2);
        assert_eq!(platform.0.borrow().drawn, [DrawKind::Ellipse, DrawKind::Rect]);
        assert!(engine.render_queue().is_empty());
    }

    #[test]
    fn debug_outlines_follow_each_drawn_item() {
        let (mut engine, platform) = engine(&[0.0], true);
        let (scene, _counter) = scene();
        engine.begin(scene).unwrap();

        let stats = engine.run_frame().unwrap();
        assert_eq!(stats.drawn, 1);
        assert_eq!(platform.0.borrow().drawn, [DrawKind::Rect, DrawKind::Rect]);

        // a rejected outline is reported and does not touch the item's result
        platform.0.borrow_mut().reject_outlines = true;
        let stats = engine.run_frame().unwrap();
        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.region, Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(platform.0.borrow().drawn.len(), 3);
    }

    #[test]
    fn refresh_region_includes_previous_frame() {
        let (mut engine, _platform) = engine(&[0.0], false);
        let (scene, _counter) = scene();
        engine.begin(scene).unwrap();

        engine.render_queue().fill_rect(100.0, 100.0, 10.0, 10.0, Color::RED, 0.0, Color::BLACK);
        let first = engine.run_frame().unwrap();
        let second = engine.run_frame().unwrap();

        assert_eq!(first.region, Some(Rect::new(0.0, 0.0, 110.0, 110.0)));
        assert_eq!(second.region, Some(Rect::new(0.0, 0.0, 110.0, 110.0)));
        let third = engine.run_frame().unwrap();
        assert_eq!(third.region, Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn quit_event_ends_the_loop_and_tears_down() {
        let (mut engine, platform) = engine(&[0.0, 0.0, 150.0], false);
        let key = KeyEvent { key: 32, state: ButtonState::Pressed };
        platform.0.borrow_mut().events = VecDeque::from([
            vec![InputEvent::Key(key)],
            vec![InputEvent::Quit, InputEvent::Key(key)],
        ]);

        let keys = Rc::new(RefCell::new(0));
        let seen = keys.clone();
        engine.add_key_callback(move |_| *seen.borrow_mut() += 1);

        let (scene, counter) = scene();
        engine.start(scene).unwrap();

        assert_eq!(*keys.borrow(), 1);
        assert_eq!(counter.borrow().draws, 2);
        assert_eq!(counter.borrow().steps, 1);
        assert!(platform.0.borrow().shut_down);
        assert!(!engine.is_running());
    }

    #[test]
    fn tick_conversions() {
        let (mut engine, _platform) = engine(&[0.0], false);
        assert_relative_eq!(engine.ticks_to_time(3.0), 300.0);
        assert_eq!(engine.time_to_ticks(299.0), 2);

        engine.set_tick_base(10);
        engine.step_tick_base(-4);
        assert_eq!(engine.tick_base(), 6);
    }
}
