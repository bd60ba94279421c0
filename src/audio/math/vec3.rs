use maudio_sys::ffi as sys;

/// A 3D vector used for positions, directions and velocities.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<sys::ma_vec3f> for Vec3 {
    fn from(v: sys::ma_vec3f) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Vec3> for sys::ma_vec3f {
    fn from(v: Vec3) -> Self {
        sys::ma_vec3f {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}
