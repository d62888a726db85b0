//! Narrow phase contact tests and contact resolution.
//!
//! Every pair of bodies is dispatched on its ordered kind pair. Only plane/particle contacts are
//! implemented; the test for that pair detects the contact and resolves it in a single step, moving the
//! particle back out of the plane and reflecting its velocity.

use tracing::trace;

use crate::body::{Body, BodyId, BodyKind};
use crate::error::{PhysicsError, PhysicsResult};
use crate::math::Vector2;

//----------------------------------------------------------------------------------
// Defines and Macros
//----------------------------------------------------------------------------------
/// Fraction of the vertical velocity kept (with sign flip) after a bounce
pub const CONTACT_DAMPING: f32 = 0.5;
/// Distance a particle is pulled back past its own extent after touching a plane
pub const CONTACT_CLEARANCE: f32 = 1.0;

//----------------------------------------------------------------------------------
// Types and Structures Definition
//----------------------------------------------------------------------------------
/// A resolved contact between a plane and a particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// The plane touched
    pub plane: BodyId,
    /// The particle that was moved
    pub particle: BodyId,
    /// Position the particle was moved back to
    pub point: Vector2,
    /// Velocity applied to the particle
    pub velocity: Vector2,
    /// The velocity was forced to rest by the stabilization threshold
    pub settled: bool,
}

//----------------------------------------------------------------------------------
// Module Functions Definition
//----------------------------------------------------------------------------------
/// Detects and resolves a contact between two bodies of any kind
///
/// Returns `Ok(None)` when the bodies are not in contact. Particle/particle has no test and never
/// reports a contact. Plane/plane is not a supported pair.
pub fn solve(body_a: &mut Body, body_b: &mut Body, stabilization_threshold: f32) -> PhysicsResult<Option<Contact>> {
    match (body_a.kind, body_b.kind) {
        (BodyKind::Particle, BodyKind::Particle) => Ok(solve_particle_to_particle(body_a, body_b)),
        (BodyKind::Plane, BodyKind::Particle) => Ok(solve_plane_to_particle(body_a, body_b, stabilization_threshold)),
        (BodyKind::Particle, BodyKind::Plane) => Ok(solve_particle_to_plane(body_a, body_b, stabilization_threshold)),
        (BodyKind::Plane, BodyKind::Plane) => Err(PhysicsError::UnsupportedPair(BodyKind::Plane, BodyKind::Plane)),
    }
}

/// Particle/particle contacts are not simulated
fn solve_particle_to_particle(_body_a: &Body, _body_b: &Body) -> Option<Contact> {
    None
}

fn solve_particle_to_plane(particle: &mut Body, plane: &Body, stabilization_threshold: f32) -> Option<Contact> {
    solve_plane_to_particle(plane, particle, stabilization_threshold)
}

/// Detects a plane/particle contact and resolves it on the particle
pub fn solve_plane_to_particle(plane: &Body, particle: &mut Body, stabilization_threshold: f32) -> Option<Contact> {
    let point = plane_contact_point(plane, particle)?;
    let (velocity, settled) = resolve_plane_contact(particle, point, stabilization_threshold);

    Some(Contact {
        plane: plane.id,
        particle: particle.id,
        point,
        velocity,
        settled,
    })
}

/// Returns the position a particle entering a plane must be moved back to, if they are in contact
///
/// The particle's trajectory is intersected with the plane's top edge and the particle is then pulled
/// back along its direction of travel by its horizontal extent plus [`CONTACT_CLEARANCE`].
pub fn plane_contact_point(plane: &Body, particle: &Body) -> Option<Vector2> {
    // Without relative motion nothing can be entering contact
    if (particle.velocity + plane.velocity).magnitude() == 0.0 {
        return None;
    }

    let extents = particle.extents;
    let plane_size = plane.extents;

    if particle.position.x + extents.x <= plane.position.x
        || particle.position.x - extents.x >= plane.position.x + plane_size.x
    {
        return None;
    }

    if particle.position.y + extents.y <= plane.position.y
        || particle.position.y - extents.y >= plane.position.y + plane_size.y
    {
        return None;
    }

    // A still particle (moving plane) or a horizontal trajectory never reaches the top edge
    let direction = particle.velocity.try_unit()?;
    if direction.y == 0.0 {
        return None;
    }

    let factor = (plane.position.y - particle.position.y)/direction.y;
    let point_of_collision = Vector2::new(particle.position.x + direction.x*factor, plane.position.y);

    Some(point_of_collision - direction*(extents.x + CONTACT_CLEARANCE))
}

/// Moves the particle to `point` and reflects its vertical velocity with damping
///
/// Returns the applied velocity and whether it was forced to rest.
pub fn resolve_plane_contact(particle: &mut Body, point: Vector2, stabilization_threshold: f32) -> (Vector2, bool) {
    particle.position = point;

    let mut new_velocity = Vector2::new(particle.velocity.x, -particle.velocity.y*CONTACT_DAMPING);
    let mut settled = false;

    if let Some(last_velocity) = particle.last_resolved_velocity {
        trace!(id = %particle.id, new = %new_velocity, last = %last_velocity, "resolving repeated contact");

        if (last_velocity - new_velocity).magnitude() < stabilization_threshold {
            trace!(id = %particle.id, "culling velocity");
            new_velocity = Vector2::zero();
            settled = true;
        }
    }

    particle.last_resolved_velocity = Some(new_velocity);
    particle.velocity = new_velocity;

    (new_velocity, settled)
}
