use meshsync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn scale(&self, factor: f32) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn add(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Unit vector in the same direction, `None` for the zero vector
    pub fn normalize(&self) -> Option<Vec3> {
        let length = self.length();
        if length <= f32::EPSILON {
            return None;
        }
        Some(self.scale(1.0 / length))
    }
}

impl Serde for Vec3 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_atomic(|writer| {
            writer.write(&self.x)?;
            writer.write(&self.y)?;
            writer.write(&self.z)
        })
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let x = reader.read()?;
        let y = reader.read()?;
        let z = reader.read()?;
        Ok(Vec3::new(x, y, z))
    }

    fn byte_length(&self) -> usize {
        Self::const_byte_length()
    }
}

impl ConstByteLength for Vec3 {
    fn const_byte_length() -> usize {
        3 * f32::const_byte_length()
    }
}

/// Unit quaternion, `w` is the scalar part
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around the unit vector `axis`
    pub fn from_axis_angle(axis: &Vec3, angle: f32) -> Self {
        let half = angle * 0.5;
        let sin = half.sin();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, half.cos())
    }

    /// `self * rhs`: applies `rhs` first, then `self`
    pub fn mul(&self, rhs: &Quat) -> Quat {
        Quat::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }

    pub fn normalize(&self) -> Quat {
        let length = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if length <= f32::EPSILON {
            return Quat::IDENTITY;
        }
        Quat::new(
            self.x / length,
            self.y / length,
            self.z / length,
            self.w / length,
        )
    }
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}
