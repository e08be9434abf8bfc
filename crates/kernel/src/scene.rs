use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};
use vantage_common::{Light, MeshInstance};
use vantage_render::{MAX_LIGHTS, MeshRenderer, RenderError};

/// Vertical spacing between stacked default instances.
const STACK_SPACING: f32 = 15.0;
const DEFAULT_INSTANCE_COUNT: usize = 4;

/// Four point lights animated over scene time.
///
/// Light 0 is a white key light that bobs between y = 0 and y = 15 behind the
/// scene. Lights 1 to 3 (red, green, blue) sweep along Z, a third of a cycle
/// apart.
#[derive(Debug, Clone)]
pub struct LightRig {
    lights: [Light; MAX_LIGHTS],
    time: f32,
}

impl LightRig {
    pub fn new() -> Self {
        Self {
            lights: [
                Light::point(Vec3::new(0.0, 15.0, -22.5), Vec3::ONE, 100.0, 10.0),
                Light::point(Vec3::new(-5.5, 4.0, 0.0), Vec3::X, 10.0, 10.0),
                Light::point(Vec3::new(0.0, 4.0, 0.0), Vec3::Y, 10.0, 10.0),
                Light::point(Vec3::new(5.5, 4.0, 0.0), Vec3::Z, 10.0, 10.0),
            ],
            time: 0.0,
        }
    }

    pub fn lights(&self) -> &[Light; MAX_LIGHTS] {
        &self.lights
    }

    /// Accumulated scene time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn advance(&mut self, elapsed_seconds: f32) {
        self.time += elapsed_seconds.max(0.0);
        let t = self.time;

        self.lights[0].position = Vec3::new(0.0, 7.5 + 7.5 * t.sin(), -22.5);

        let lanes = [-5.5, 0.0, 5.5];
        for (i, x) in lanes.into_iter().enumerate() {
            let phase = (i + 1) as f32 * TAU / 3.0;
            self.lights[i + 1].position = Vec3::new(x, 5.0, -25.5 + 25.5 * (t + phase).sin());
        }
    }

    /// Push every light into the renderer's slots.
    pub fn apply<R: MeshRenderer>(&self, renderer: &mut R) -> Result<(), RenderError> {
        for (index, light) in self.lights.iter().enumerate() {
            renderer.set_light(index, *light)?;
        }
        Ok(())
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::new()
    }
}

/// Four copies of the mesh stacked upward. The first is turned upright
/// (-90° about X); each following one sits 15 units along the previous
/// one's local Y.
pub fn default_instances() -> Vec<MeshInstance> {
    let mut instances = Vec::with_capacity(DEFAULT_INSTANCE_COUNT);
    let mut transform = Mat4::from_rotation_x(-FRAC_PI_2);
    for _ in 0..DEFAULT_INSTANCE_COUNT {
        instances.push(MeshInstance::at(transform));
        transform *= Mat4::from_translation(Vec3::new(0.0, STACK_SPACING, 0.0));
    }
    instances
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_render::headless::HeadlessMeshRenderer;
    use vantage_render::{Backend, DrawLog, HeadlessBackend, HeadlessOptions};

    const EPS: f32 = 1e-4;

    fn renderer() -> HeadlessMeshRenderer {
        HeadlessBackend::new(HeadlessOptions::default(), DrawLog::new())
            .create_primary()
            .unwrap()
    }

    #[test]
    fn initial_placement() {
        let rig = LightRig::new();
        let lights = rig.lights();
        assert_eq!(lights[0].position, Vec3::new(0.0, 15.0, -22.5));
        assert_eq!(lights[0].intensity, 100.0);
        assert_eq!(lights[1].color, Vec3::X);
        assert_eq!(lights[3].position, Vec3::new(5.5, 4.0, 0.0));
    }

    #[test]
    fn key_light_bobs_with_time() {
        let mut rig = LightRig::new();
        rig.advance(FRAC_PI_2);
        assert!((rig.lights()[0].position.y - 15.0).abs() < EPS);
        rig.advance(std::f32::consts::PI);
        assert!(rig.lights()[0].position.y.abs() < EPS);
    }

    #[test]
    fn sweeping_lights_stay_in_their_lanes() {
        let mut rig = LightRig::new();
        for _ in 0..50 {
            rig.advance(0.37);
            for (light, x) in rig.lights()[1..].iter().zip([-5.5, 0.0, 5.5]) {
                assert_eq!(light.position.x, x);
                assert!(light.position.z <= EPS && light.position.z >= -51.0 - EPS);
            }
        }
    }

    #[test]
    fn negative_elapsed_does_not_rewind() {
        let mut rig = LightRig::new();
        rig.advance(1.0);
        rig.advance(-5.0);
        assert_eq!(rig.time(), 1.0);
    }

    #[test]
    fn apply_fills_every_slot() {
        let mut rig = LightRig::new();
        rig.advance(0.5);
        let mut r = renderer();
        rig.apply(&mut r).unwrap();
        assert_eq!(r.lights(), rig.lights());
    }

    #[test]
    fn default_instances_stack_upward() {
        let instances = default_instances();
        assert_eq!(instances.len(), 4);
        assert_eq!(instances[0].transform, Mat4::from_rotation_x(-FRAC_PI_2));
        // Turned -90° about X, local +Y points along world -Z.
        let origin = instances[1].transform.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, -15.0)).length() < EPS);
        let top = instances[3].transform.transform_point3(Vec3::ZERO);
        assert!((top - Vec3::new(0.0, 0.0, -45.0)).length() < EPS);
    }
}
