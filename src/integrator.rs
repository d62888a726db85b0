//! Semi-implicit Euler integration for one physics sub-step.

use crate::body::Body;

/// Advances a body by one sub-step
///
/// `dt_fraction` is the sub-step length as a fraction of a second (`1 / sub_steps`). Position moves
/// with the velocity from the start of the sub-step, then velocity takes the acceleration. Planes are
/// left untouched.
pub fn integrate(body: &mut Body, dt_fraction: f32) {
    if body.is_static() {
        return;
    }

    body.position += body.velocity*dt_fraction;
    body.velocity += body.acceleration*dt_fraction;
}
