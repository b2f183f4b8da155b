use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    assets::{TextureHandle, TextureStore},
    camera::Ray,
    config::{DiscConfig, TunnelConfig},
    lighting::Color,
};

/// Material tint of the disc. Bright while audio plays, dimmed otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscTint {
    Active,
    Inactive,
}

impl DiscTint {
    pub fn color(self) -> Color {
        match self {
            DiscTint::Active => Color::from_hex(0xFFFFFF),
            DiscTint::Inactive => Color::from_hex(0x666666),
        }
    }
}

/// Surface relief applied together with a cover texture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRelief {
    pub bump_scale: f32,
    pub normal_scale: f32,
}

impl SurfaceRelief {
    pub const COVER: SurfaceRelief = SurfaceRelief {
        bump_scale: 0.05,
        normal_scale: 0.5,
    };
}

/// The vinyl disc: a flat circle at the origin facing +Z.
///
/// The disc is the exclusive owner of its surface texture. Installing a new
/// texture or releasing the current one always disposes the previous handle
/// through the [`TextureStore`].
#[derive(Debug)]
pub struct Disc {
    radius: f32,
    segments: u32,
    rotation_step: f32,
    rotation_z: f32,
    tint: DiscTint,
    texture: Option<TextureHandle>,
    relief: Option<SurfaceRelief>,
}

impl Disc {
    pub fn new(config: &DiscConfig) -> Self {
        Self {
            radius: config.radius,
            segments: config.segments,
            rotation_step: config.rotation_step,
            rotation_z: 0.0,
            tint: DiscTint::Active,
            texture: None,
            relief: None,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn rotation_z(&self) -> f32 {
        self.rotation_z
    }

    pub fn tint(&self) -> DiscTint {
        self.tint
    }

    pub fn set_tint(&mut self, tint: DiscTint) {
        self.tint = tint;
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    pub fn relief(&self) -> Option<SurfaceRelief> {
        self.relief
    }

    /// One tick worth of spin.
    pub fn spin(&mut self) {
        self.rotation_z += self.rotation_step;
    }

    pub fn install_texture(&mut self, handle: TextureHandle, store: &mut TextureStore) {
        if let Some(previous) = self.texture.replace(handle) {
            store.dispose(previous);
        }
        self.relief = Some(SurfaceRelief::COVER);
    }

    /// Drops the current cover, if any. Returns whether one was released.
    pub fn release_texture(&mut self, store: &mut TextureStore) -> bool {
        match self.texture.take() {
            Some(handle) => {
                store.dispose(handle);
                true
            }
            None => false,
        }
    }

    /// Whether `ray` crosses the disc face. Rotation about Z leaves the face
    /// plane unchanged, so only the radius matters.
    pub fn hit(&self, ray: &Ray) -> bool {
        if ray.direction.z.abs() < f32::EPSILON {
            return false;
        }
        let t = -ray.origin.z / ray.direction.z;
        if t <= 0.0 {
            return false;
        }
        let point = ray.origin + ray.direction * t;
        point.truncate().length() <= self.radius
    }
}

/// Two displaced planes scrolled towards the camera and wrapped, giving an
/// endless floor.
#[derive(Debug, Clone)]
pub struct Tunnel {
    speed: f32,
    length: f32,
    displacement_scale: f32,
    front_z: f32,
}

impl Tunnel {
    pub fn new(config: &TunnelConfig) -> Self {
        Self {
            speed: config.speed,
            length: config.length,
            displacement_scale: config.displacement_scale,
            front_z: 0.0,
        }
    }

    /// Positions follow elapsed time directly, not accumulated deltas.
    pub fn update(&mut self, elapsed_seconds: f32) {
        self.front_z = (elapsed_seconds * self.speed).rem_euclid(self.length);
    }

    pub fn front_z(&self) -> f32 {
        self.front_z
    }

    /// The back plane trails the front by exactly one plane length.
    pub fn back_z(&self) -> f32 {
        self.front_z - self.length
    }

    pub fn displacement_scale(&self) -> f32 {
        self.displacement_scale
    }

    pub fn plane_offsets(&self) -> [Vec3; 2] {
        [
            Vec3::new(0.0, 0.0, self.front_z),
            Vec3::new(0.0, 0.0, self.back_z()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::CoverImage;

    fn image() -> CoverImage {
        CoverImage {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 255],
        }
    }

    #[test]
    fn installing_a_texture_disposes_the_previous_one() {
        let mut store = TextureStore::new();
        let mut disc = Disc::new(&DiscConfig::default());

        let first = store.create("a", &image());
        disc.install_texture(first, &mut store);
        let second = store.create("b", &image());
        disc.install_texture(second, &mut store);

        assert_eq!(store.live(), 1);
        assert_eq!(store.disposed(), 1);
        assert_eq!(disc.relief(), Some(SurfaceRelief::COVER));

        assert!(disc.release_texture(&mut store));
        assert!(!disc.release_texture(&mut store));
        assert_eq!(store.live(), 0);
    }

    #[test]
    fn spin_accumulates_rotation() {
        let mut disc = Disc::new(&DiscConfig::default());
        for _ in 0..10 {
            disc.spin();
        }
        assert!((disc.rotation_z() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn hit_test_respects_radius() {
        let disc = Disc::new(&DiscConfig::default());
        let origin = Vec3::new(0.0, 0.0, 20.0);
        let towards = |x: f32, y: f32| Ray {
            origin,
            direction: (Vec3::new(x, y, 0.0) - origin).normalize(),
        };

        assert!(disc.hit(&towards(0.0, 0.0)));
        assert!(disc.hit(&towards(1.9, 0.0)));
        assert!(!disc.hit(&towards(0.0, 2.5)));

        let away = Ray {
            origin,
            direction: Vec3::Z,
        };
        assert!(!disc.hit(&away));
    }

    #[test]
    fn tunnel_planes_wrap_within_one_length() {
        let mut tunnel = Tunnel::new(&TunnelConfig::default());
        for step in 0..200 {
            tunnel.update(step as f32 * 0.25);
            assert!((0.0..2.0).contains(&tunnel.front_z()));
            assert!((tunnel.front_z() - tunnel.back_z() - 2.0).abs() < 1e-6);
        }

        tunnel.update(10.0);
        assert!((tunnel.front_z() - 1.5).abs() < 1e-5);
    }
}
