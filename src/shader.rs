//! WGSL sources and the uniform blocks they read.
//!
//! Every shader binds the per-frame block at `@group(0)` and the per-node block
//! at `@group(1)`, so one bind group layout pair serves all three pipelines.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::gpu::camera::Camera;
use crate::scene::{Lighting, MeshNode, PhongMaterial, PointCloud, RimMaterial};

pub const GLOBE_SHADER: &str = include_str!("shaders/globe.wgsl");
pub const ATMOSPHERE_SHADER: &str = include_str!("shaders/atmosphere.wgsl");
pub const STARFIELD_SHADER: &str = include_str!("shaders/starfield.wgsl");

/// Camera and lighting, shared by every draw in a frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient_color: [f32; 4],
}

impl FrameUniforms {
    pub fn new(camera: &Camera, lights: &Lighting) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            light_direction: lights.direction_to_light().extend(0.0).to_array(),
            light_color: lights.directional_color.extend(1.0).to_array(),
            ambient_color: lights.ambient.extend(1.0).to_array(),
        }
    }
}

/// Transform and material of one drawable.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    /// rgb + opacity
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    /// rgb + shininess
    pub specular: [f32; 4],
    /// x: star quad size, y: radius to project onto (polar caps)
    pub params: [f32; 4],
}

impl ObjectUniforms {
    pub fn phong(node: &MeshNode<PhongMaterial>) -> Self {
        let m = &node.material;
        Self {
            model: node.transform.matrix().to_cols_array_2d(),
            color: m.color.extend(m.opacity).to_array(),
            emissive: m.emissive.extend(1.0).to_array(),
            specular: m.specular.extend(m.shininess).to_array(),
            params: [0.0; 4],
        }
    }

    /// Phong uniforms for the polar caps. `params.y` asks the shader to project
    /// vertices back onto a sphere of that radius.
    pub fn polar_caps(node: &MeshNode<PhongMaterial>, radius: f32) -> Self {
        Self {
            model: node.transform.footprint_matrix().to_cols_array_2d(),
            params: [0.0, radius, 0.0, 0.0],
            ..Self::phong(node)
        }
    }

    pub fn rim(node: &MeshNode<RimMaterial>) -> Self {
        Self {
            model: node.transform.matrix().to_cols_array_2d(),
            color: node.material.tint.extend(1.0).to_array(),
            emissive: [0.0; 4],
            specular: [0.0; 4],
            params: [0.0; 4],
        }
    }

    pub fn points(cloud: &PointCloud) -> Self {
        Self {
            model: cloud.transform.matrix().to_cols_array_2d(),
            color: cloud.material.color.extend(1.0).to_array(),
            emissive: [0.0; 4],
            specular: [0.0; 4],
            params: Vec4::new(cloud.material.size, 0.0, 0.0, 0.0).to_array(),
        }
    }
}

/// Flatten star positions for the instance buffer.
pub fn star_instances(points: &[Vec3]) -> Vec<[f32; 3]> {
    points.iter().map(|p| p.to_array()).collect()
}
