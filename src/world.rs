//! The physics world: body registry, global parameters and the fixed sub-step loop.

use arrayvec::ArrayVec;
use tracing::{debug, warn};

use crate::body::{Body, BodyDef, BodyId};
use crate::collision::{self, Contact};
use crate::error::{PhysicsError, PhysicsResult};
use crate::integrator::integrate;
use crate::math::Vector2;
use crate::step::FixedStep;
use crate::{DEFAULT_GRAVITY, DEFAULT_MAX_BODIES, DEFAULT_RESTITUTION, DEFAULT_STABILIZATION_THRESHOLD, DEFAULT_SUB_STEPS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//----------------------------------------------------------------------------------
// Types and Structures Definition
//----------------------------------------------------------------------------------
/// Global parameters of a [`World`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldConfig {
    /// Acceleration applied to bodies created with gravity enabled
    pub gravity: Vector2,
    /// Physics sub-steps per second of elapsed time
    pub sub_steps: u32,
    /// Global restitution coefficient
    ///
    /// Contact resolution does not read it, bounces always keep [`CONTACT_DAMPING`](crate::CONTACT_DAMPING)
    /// of the incoming vertical velocity.
    pub restitution: f32,
    /// Velocity change below which a repeated contact puts the particle to rest
    pub stabilization_threshold: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            sub_steps: DEFAULT_SUB_STEPS,
            restitution: DEFAULT_RESTITUTION,
            stabilization_threshold: DEFAULT_STABILIZATION_THRESHOLD,
        }
    }
}

impl WorldConfig {
    #[must_use]
    pub fn gravity(mut self, gravity: Vector2) -> Self {
        self.gravity = gravity;
        self
    }

    #[must_use]
    pub fn zero_gravity(mut self) -> Self {
        self.gravity = Vector2::zero();
        self
    }

    #[must_use]
    pub fn sub_steps(mut self, sub_steps: u32) -> Self {
        self.sub_steps = sub_steps;
        self
    }

    #[must_use]
    pub fn stabilization_threshold(mut self, threshold: f32) -> Self {
        self.stabilization_threshold = threshold;
        self
    }

    pub fn validate(&self) -> PhysicsResult<()> {
        if self.sub_steps == 0 {
            return Err(PhysicsError::InvalidSubSteps(0));
        }
        if !(self.gravity.x.is_finite() && self.gravity.y.is_finite()) {
            return Err(PhysicsError::invalid_config("gravity must be finite"));
        }
        if !(self.stabilization_threshold >= 0.0) {
            return Err(PhysicsError::invalid_config("stabilization threshold must be non-negative"));
        }
        Ok(())
    }
}

pub struct World<const MAX_BODIES: usize = DEFAULT_MAX_BODIES> {
    /// Physics world gravity force
    gravity: Vector2,
    /// Sub-steps per second
    sub_steps: u32,
    /// Sub-step length as a fraction of a second
    step_mult: f32,
    /// Declared restitution coefficient (not used by contact resolution)
    restitution: f32,
    stabilization_threshold: f32,
    /// Physics time step accumulator
    clock: FixedStep,
    /// Set by the first physics step, cleared by reset
    running: bool,
    /// Total physics sub-steps processed
    steps_count: u64,
    /// Live physics bodies
    bodies: ArrayVec<Body, MAX_BODIES>,
    /// Contacts resolved during the last sub-step
    contacts: Vec<Contact>,
}

impl Default for World {
    fn default() -> Self {
        Self::from_valid_config(WorldConfig::default())
    }
}

//----------------------------------------------------------------------------------
// Module Functions Definition
//----------------------------------------------------------------------------------
impl<const MAX_BODIES: usize> World<MAX_BODIES> {
    pub fn new(config: WorldConfig) -> PhysicsResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: WorldConfig) -> Self {
        Self {
            gravity: config.gravity,
            sub_steps: config.sub_steps,
            step_mult: 1.0/config.sub_steps as f32,
            restitution: config.restitution,
            stabilization_threshold: config.stabilization_threshold,
            clock: FixedStep::per_second(config.sub_steps),
            running: false,
            steps_count: 0,
            bodies: ArrayVec::new(),
            contacts: Vec::new(),
        }
    }

    /// Creates a new body and returns its id
    pub fn create_body(&mut self, def: BodyDef) -> PhysicsResult<BodyId> {
        def.validate()?;

        let Some(id) = self.find_available_body_index() else {
            if cfg!(feature = "debug") {
                debug!("new physics body creation failed because there is no available id to use");
            }
            return Err(PhysicsError::WorldFull { capacity: MAX_BODIES });
        };

        let kind = def.kind;
        self.bodies.push(Body::from_def(id, def, self.gravity));

        if cfg!(feature = "debug") {
            debug!("created {:?} physics body id {}", kind, id);
        }

        Ok(id)
    }

    /// Creates a particle centered on `position` with half size `extents`
    pub fn create_particle(&mut self, position: Vector2, extents: Vector2, velocity: Vector2) -> PhysicsResult<BodyId> {
        self.create_body(BodyDef::particle(position, extents).velocity(velocity))
    }

    /// Creates a static plane with top-left corner `position` and full size `size`
    pub fn create_plane(&mut self, position: Vector2, size: Vector2) -> PhysicsResult<BodyId> {
        self.create_body(BodyDef::plane(position, size))
    }

    /// Unregisters a body and returns it
    pub fn remove_body(&mut self, id: BodyId) -> PhysicsResult<Body> {
        let index = self.bodies.iter()
            .position(|body| body.id == id)
            .ok_or(PhysicsError::UnknownBody(id))?;

        let body = self.bodies.remove(index);

        if cfg!(feature = "debug") {
            debug!("destroyed physics body id {}", id);
        }

        Ok(body)
    }

    /// Removes every body matching `predicate`, returns how many were removed
    pub fn destroy_bodies(&mut self, mut predicate: impl FnMut(&Body) -> bool) -> usize {
        let before = self.bodies.len();
        self.bodies.retain(|body| {
            let destroy = predicate(body);
            if destroy && cfg!(feature = "debug") {
                debug!("destroyed physics body id {}", body.id);
            }
            !destroy
        });
        before - self.bodies.len()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|body| body.id == id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|body| body.id == id)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        MAX_BODIES
    }

    pub fn gravity(&self) -> Vector2 {
        self.gravity
    }

    /// Sets the world gravity and refreshes the acceleration of every gravity-enabled body
    pub fn set_gravity(&mut self, gravity: Vector2) {
        self.gravity = gravity;

        for body in self.bodies.iter_mut().filter(|body| body.applies_gravity) {
            body.acceleration = gravity;
        }
    }

    pub fn sub_steps(&self) -> u32 {
        self.sub_steps
    }

    /// Changes the number of sub-steps per second
    ///
    /// Rejected once the world has started stepping, call [`World::reset`] first.
    pub fn set_sub_steps(&mut self, sub_steps: u32) -> PhysicsResult<()> {
        if self.running {
            warn!(sub_steps, "attempting to change sub-step count while the physics world is running");
            return Err(PhysicsError::LockedWhileRunning { setting: "sub-step count" });
        }
        if sub_steps == 0 {
            return Err(PhysicsError::InvalidSubSteps(sub_steps));
        }

        self.sub_steps = sub_steps;
        self.step_mult = 1.0/sub_steps as f32;
        self.clock.set_steps_per_second(sub_steps);
        Ok(())
    }

    /// Duration of one sub-step, in milliseconds
    pub fn fixed_dt(&self) -> f64 {
        self.clock.step_time()
    }

    /// Duration of one sub-step as a fraction of a second
    pub fn dt_fraction(&self) -> f32 {
        self.step_mult
    }

    /// Unconsumed elapsed time, in milliseconds
    pub fn lag(&self) -> f64 {
        self.clock.lag()
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
    }

    pub fn stabilization_threshold(&self) -> f32 {
        self.stabilization_threshold
    }

    /// Rejects negative and NaN thresholds
    pub fn set_stabilization_threshold(&mut self, threshold: f32) -> PhysicsResult<()> {
        if !(threshold >= 0.0) {
            return Err(PhysicsError::invalid_config("stabilization threshold must be non-negative"));
        }
        self.stabilization_threshold = threshold;
        Ok(())
    }

    /// True once the world has been stepped
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Drops accumulated lag and unlocks the sub-step configuration, bodies are kept
    pub fn reset(&mut self) {
        self.running = false;
        self.clock.reset();
        self.contacts.clear();
    }

    /// Total sub-steps processed
    pub fn steps_count(&self) -> u64 {
        self.steps_count
    }

    /// Contacts resolved during the last sub-step, in resolution order
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Feeds elapsed time (milliseconds) and runs as many whole sub-steps as it covers
    ///
    /// Returns whether at least one sub-step ran.
    pub fn physics_step(&mut self, elapsed: f64) -> PhysicsResult<bool> {
        self.running = true;

        // Store the time elapsed since the last report
        self.clock.accumulate(elapsed);

        // Fixed time stepping loop
        let mut stepped = false;
        while self.clock.try_consume() {
            self.sub_step()?;
            stepped = true;
        }

        Ok(stepped)
    }

    /// One physics sub-step: integrate every body, then one all-pairs collision pass
    pub fn sub_step(&mut self) -> PhysicsResult<()> {
        self.steps_count += 1;
        self.contacts.clear();

        for body in self.bodies.iter_mut() {
            integrate(body, self.step_mult);
        }

        let threshold = self.stabilization_threshold;
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let (head, tail) = self.bodies.split_at_mut(j);
                let body_a = &mut head[i];
                let body_b = &mut tail[0];

                // Two static bodies never move into each other
                if body_a.is_static() && body_b.is_static() {
                    continue;
                }

                if let Some(contact) = collision::solve(body_a, body_b, threshold)? {
                    self.contacts.push(contact);
                }
            }
        }

        Ok(())
    }

    /// Finds a valid index for a new physics body initialization
    fn find_available_body_index(&self) -> Option<BodyId> {
        (0..MAX_BODIES as u32)
            .find(|candidate| self.bodies.iter().all(|body| body.id.0 != *candidate))
            .map(BodyId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;
    use approx::assert_relative_eq;

    fn still_world() -> World {
        World::new(WorldConfig::default().zero_gravity()).unwrap()
    }

    #[test]
    fn ids_reuse_the_lowest_free_slot() {
        let mut world = still_world();
        let a = world.create_particle(Vector2::zero(), Vector2::new(1.0, 1.0), Vector2::zero()).unwrap();
        let b = world.create_particle(Vector2::zero(), Vector2::new(1.0, 1.0), Vector2::zero()).unwrap();
        let c = world.create_plane(Vector2::zero(), Vector2::new(1.0, 1.0)).unwrap();
        assert_eq!((a.index(), b.index(), c.index()), (0, 1, 2));

        world.remove_body(b).unwrap();
        let d = world.create_particle(Vector2::zero(), Vector2::new(1.0, 1.0), Vector2::zero()).unwrap();
        assert_eq!(d, b);
        assert_eq!(world.len(), 3);
    }

    #[test]
    fn full_world_rejects_new_bodies() {
        let mut world: World<2> = World::new(WorldConfig::default()).unwrap();
        world.create_plane(Vector2::zero(), Vector2::new(1.0, 1.0)).unwrap();
        world.create_plane(Vector2::zero(), Vector2::new(1.0, 1.0)).unwrap();

        assert_eq!(
            world.create_plane(Vector2::zero(), Vector2::new(1.0, 1.0)),
            Err(PhysicsError::WorldFull { capacity: 2 })
        );
    }

    #[test]
    fn removing_unknown_body_fails() {
        let mut world = still_world();
        let id = world.create_plane(Vector2::zero(), Vector2::new(1.0, 1.0)).unwrap();
        world.remove_body(id).unwrap();

        assert_eq!(world.remove_body(id), Err(PhysicsError::UnknownBody(id)));
        assert!(world.body(id).is_none());
    }

    #[test]
    fn destroy_bodies_by_predicate() {
        let mut world = still_world();
        for x in 0..5 {
            world.create_particle(Vector2::new(x as f32*10.0, 0.0), Vector2::new(1.0, 1.0), Vector2::zero()).unwrap();
        }

        let removed = world.destroy_bodies(|body| body.position.x > 25.0);

        assert_eq!(removed, 2);
        assert!(world.bodies().iter().all(|body| body.position.x <= 25.0));
    }

    #[test]
    fn set_gravity_refreshes_only_gravity_bodies() {
        let mut world: World = World::default();
        let falling = world.create_particle(Vector2::zero(), Vector2::new(1.0, 1.0), Vector2::zero()).unwrap();
        let floating = world
            .create_body(BodyDef::particle(Vector2::zero(), Vector2::new(1.0, 1.0)).gravity(false))
            .unwrap();

        world.set_gravity(Vector2::new(0.0, -10.0));

        assert_eq!(world.body(falling).unwrap().acceleration, Vector2::new(0.0, -10.0));
        assert_eq!(world.body(floating).unwrap().acceleration, Vector2::zero());
    }

    #[test]
    fn sub_steps_locked_while_running() {
        let mut world = still_world();
        world.set_sub_steps(64).unwrap();
        assert_relative_eq!(world.fixed_dt(), 15.625);
        assert_relative_eq!(world.dt_fraction(), 1.0/64.0);

        world.physics_step(1.0).unwrap();
        assert_eq!(
            world.set_sub_steps(16),
            Err(PhysicsError::LockedWhileRunning { setting: "sub-step count" })
        );
        assert_eq!(world.sub_steps(), 64);

        world.reset();
        world.set_sub_steps(16).unwrap();
        assert_eq!(world.sub_steps(), 16);
        assert_eq!(world.set_sub_steps(0), Err(PhysicsError::InvalidSubSteps(0)));
    }

    #[test]
    fn physics_step_reports_idle_frames() {
        let mut world = still_world();
        assert!(!world.physics_step(10.0).unwrap());
        assert!(world.physics_step(21.25).unwrap());
        assert_eq!(world.steps_count(), 1);
        assert_relative_eq!(world.lag(), 0.0);

        assert!(!world.physics_step(f64::NAN).unwrap());
        assert_eq!(world.steps_count(), 1);
    }

    #[test]
    fn chunking_does_not_change_step_count() {
        let k = 7;
        let mut whole = still_world();
        let mut chunked = still_world();
        let mut uneven = still_world();
        let dt = whole.fixed_dt();

        whole.physics_step(k as f64*dt).unwrap();
        for _ in 0..k {
            chunked.physics_step(dt).unwrap();
        }
        for elapsed in [5.0, 100.0, 0.0, 3.75, 110.0] {
            uneven.physics_step(elapsed).unwrap();
        }

        assert_eq!(whole.steps_count(), k);
        assert_eq!(chunked.steps_count(), k);
        assert_eq!(uneven.steps_count(), k);
    }

    #[test]
    fn stabilization_threshold_setter_validates() {
        let mut world = still_world();
        world.set_stabilization_threshold(2.5).unwrap();
        assert_relative_eq!(world.stabilization_threshold(), 2.5);

        for bad in [-1.0, f32::NAN] {
            assert!(matches!(
                world.set_stabilization_threshold(bad),
                Err(PhysicsError::InvalidConfig { .. })
            ));
        }
        assert_relative_eq!(world.stabilization_threshold(), 2.5);
    }

    #[test]
    fn later_contact_in_a_sub_step_overwrites_earlier_one() {
        let mut world = still_world();
        let upper = world.create_plane(Vector2::new(-5.0, 5.0), Vector2::new(10.0, 1.0)).unwrap();
        let lower = world.create_plane(Vector2::new(-5.0, 3.0), Vector2::new(10.0, 1.0)).unwrap();
        let particle = world.create_particle(Vector2::new(0.0, 4.5), Vector2::new(1.0, 1.0), Vector2::new(0.0, 10.0)).unwrap();

        world.sub_step().unwrap();

        // the first bounce moves the particle into the lower plane, which bounces it again
        let contacts = world.contacts();
        assert_eq!(contacts.len(), 2);
        assert_eq!((contacts[0].plane, contacts[0].particle), (upper, particle));
        assert_eq!(contacts[0].point, Vector2::new(0.0, 3.0));
        assert_eq!(contacts[0].velocity, Vector2::new(0.0, -5.0));
        assert_eq!((contacts[1].plane, contacts[1].particle), (lower, particle));
        assert_eq!(contacts[1].point, Vector2::new(0.0, 5.0));
        assert_eq!(contacts[1].velocity, Vector2::new(0.0, 2.5));

        let body = world.body(particle).unwrap();
        assert_eq!(body.position, contacts[1].point);
        assert_eq!(body.velocity, contacts[1].velocity);
        assert_eq!(body.last_resolved_velocity(), Some(Vector2::new(0.0, 2.5)));
    }

    #[test]
    fn static_pairs_are_skipped() {
        let mut world = still_world();
        world.create_plane(Vector2::zero(), Vector2::new(10.0, 10.0)).unwrap();
        world.create_plane(Vector2::new(5.0, 5.0), Vector2::new(10.0, 10.0)).unwrap();

        assert!(world.sub_step().is_ok());
        assert!(world.contacts().is_empty());
    }

    #[test]
    fn falling_particle_lands_on_plane() {
        let mut world = still_world();
        let plane = world.create_plane(Vector2::new(-5.0, 5.0), Vector2::new(10.0, 1.0)).unwrap();
        let particle = world.create_particle(Vector2::zero(), Vector2::new(1.0, 1.0), Vector2::new(0.0, 10.0)).unwrap();

        let mut contacts = Vec::new();
        for _ in 0..32 {
            world.sub_step().unwrap();
            contacts.extend_from_slice(world.contacts());
        }

        assert_eq!(contacts.len(), 1);
        let contact = contacts[0];
        assert_eq!((contact.plane, contact.particle), (plane, particle));
        assert_eq!(contact.velocity, Vector2::new(0.0, -5.0));
        assert_eq!(world.body(plane).unwrap().kind(), BodyKind::Plane);
        assert_eq!(world.body(plane).unwrap().position, Vector2::new(-5.0, 5.0));
    }
}
