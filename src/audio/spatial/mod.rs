//! Spatial audio configuration and 3D positioning models.
pub mod attenuation;
pub mod positioning;
