//! CPU-side scene graph: the globe, its atmosphere shell, the polar caps,
//! the starfield, and the lights.
//!
//! The graph is plain data owned by one scene handle. The render loop writes
//! rotations into it, the data mapper writes materials, and a render surface
//! reads it to draw a frame.

use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::mesh::{self, MeshData, SphereBuilder};
use crate::rotation::ViewMode;
use crate::starfield::StarfieldConfig;
use crate::visuals::VisualParams;

pub const GLOBE_RADIUS: f32 = 2.0;
/// Slightly larger than the globe so the rim glow surrounds it.
pub const ATMOSPHERE_RADIUS: f32 = 2.2;
pub const POLAR_CAP_RADIUS: f32 = 2.02;
/// Angular size of each polar cap, measured from its pole.
pub const POLAR_CAP_BAND: f32 = PI / 6.0;
/// Starfield yaw, radians per frame. Independent of the globe.
pub const STARFIELD_YAW_PER_FRAME: f32 = 0.0001;

const SPHERE_SEGMENTS: u32 = 64;
const CAP_HEIGHT_SEGMENTS: u32 = 16;

/// Rotation (Euler XYZ, radians) and uniform scale of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotation: Vec3,
    pub scale: f32,
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, Vec3::ZERO)
    }

    /// Rotation with the scale applied across the pole axis only.
    ///
    /// Polar caps are drawn with this matrix and then pushed back onto their
    /// sphere, so the scale shrinks their footprint instead of sinking them
    /// below the globe surface.
    pub fn footprint_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_quat(rotation) * Mat4::from_scale(Vec3::new(self.scale, 1.0, self.scale))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

/// Blinn-Phong surface parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongMaterial {
    pub color: Vec3,
    pub emissive: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
    pub opacity: f32,
}

/// Additive rim glow, `intensity = (0.9 - dot(normal, view_axis))^2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RimMaterial {
    pub tint: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointsMaterial {
    pub color: Vec3,
    /// Billboard half-size in normalized device units.
    pub size: f32,
}

/// A mesh with a material and transform.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode<M> {
    pub mesh: MeshData,
    pub material: M,
    pub transform: Transform,
    pub visible: bool,
}

impl<M> MeshNode<M> {
    fn new(mesh: MeshData, material: M) -> Self {
        Self {
            mesh,
            material,
            transform: Transform::default(),
            visible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub points: Vec<Vec3>,
    pub material: PointsMaterial,
    pub transform: Transform,
}

/// One ambient light and one directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: Vec3,
    pub directional_color: Vec3,
    /// Where the directional light shines from; it points at the origin.
    pub directional_position: Vec3,
}

impl Lighting {
    /// Unit vector from the origin toward the directional light.
    pub fn direction_to_light(&self) -> Vec3 {
        self.directional_position.normalize_or(Vec3::Y)
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.25),
            directional_color: Vec3::ONE,
            directional_position: Vec3::new(5.0, 3.0, 5.0),
        }
    }
}

/// The full scene for one mounted view.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    mode: ViewMode,
    pub globe: Option<MeshNode<PhongMaterial>>,
    pub atmosphere: Option<MeshNode<RimMaterial>>,
    /// Present in interactive mode only.
    pub polar_caps: Option<MeshNode<PhongMaterial>>,
    pub starfield: Option<PointCloud>,
    pub lights: Lighting,
}

impl SceneGraph {
    /// Build the initial scene for a mode. Visual parameters start at their reset values.
    pub fn build(mode: ViewMode, starfield: &StarfieldConfig) -> Self {
        let reset = VisualParams::reset();

        let globe = MeshNode::new(
            SphereBuilder::new(GLOBE_RADIUS)
                .segments(SPHERE_SEGMENTS, SPHERE_SEGMENTS)
                .build(),
            PhongMaterial {
                color: reset.base_color,
                emissive: reset.emissive,
                specular: Vec3::splat(0.2),
                shininess: 25.0,
                opacity: 1.0,
            },
        );

        let atmosphere = MeshNode::new(
            SphereBuilder::new(ATMOSPHERE_RADIUS)
                .segments(SPHERE_SEGMENTS, SPHERE_SEGMENTS)
                .build(),
            RimMaterial {
                tint: reset.atmosphere_tint,
            },
        );

        let polar_caps = mode.is_interactive().then(|| {
            let mut caps = MeshNode::new(
                mesh::polar_caps(POLAR_CAP_RADIUS, POLAR_CAP_BAND, SPHERE_SEGMENTS, CAP_HEIGHT_SEGMENTS),
                PhongMaterial {
                    color: Vec3::ONE,
                    emissive: Vec3::splat(0.1),
                    specular: Vec3::splat(0.5),
                    shininess: 60.0,
                    opacity: 0.8,
                },
            );
            caps.visible = reset.overlay_visible;
            caps
        });

        let starfield = PointCloud {
            points: starfield.generate(),
            material: PointsMaterial {
                color: Vec3::ONE,
                size: 0.0025,
            },
            transform: Transform::default(),
        };

        Self {
            mode,
            globe: Some(globe),
            atmosphere: Some(atmosphere),
            polar_caps,
            starfield: Some(starfield),
            lights: Lighting::default(),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Name of the first node a frame needs but the graph lacks.
    pub fn missing_node(&self) -> Option<&'static str> {
        if self.globe.is_none() {
            Some("globe")
        } else if self.atmosphere.is_none() {
            Some("atmosphere")
        } else if self.starfield.is_none() {
            Some("starfield")
        } else if self.mode.is_interactive() && self.polar_caps.is_none() {
            Some("polar caps")
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_node().is_none()
    }

    /// Set the globe's pitch/yaw and copy it to the atmosphere and polar caps.
    pub fn set_globe_rotation(&mut self, x: f32, y: f32) {
        let rotation = Vec3::new(x, y, 0.0);
        if let Some(globe) = &mut self.globe {
            globe.transform.rotation = rotation;
        }
        if let Some(atmosphere) = &mut self.atmosphere {
            atmosphere.transform.rotation = rotation;
        }
        if let Some(caps) = &mut self.polar_caps {
            caps.transform.rotation = rotation;
        }
    }

    pub fn spin_starfield(&mut self, delta_yaw: f32) {
        if let Some(stars) = &mut self.starfield {
            stars.transform.rotation.y += delta_yaw;
        }
    }

    /// Write a visual parameter set into the materials and overlay.
    ///
    /// The set replaces whatever was there before; nothing is blended with the
    /// previous state.
    pub fn apply_visuals(&mut self, params: &VisualParams) {
        if let Some(globe) = &mut self.globe {
            globe.material.color = params.base_color;
            globe.material.emissive = params.emissive;
        }
        if let Some(atmosphere) = &mut self.atmosphere {
            atmosphere.material.tint = params.atmosphere_tint;
        }
        if let Some(caps) = &mut self.polar_caps {
            caps.visible = params.overlay_visible;
            caps.transform.scale = params.overlay_scale;
        }
    }

    /// Read the visual parameters currently stored in the graph.
    pub fn visuals(&self) -> Option<VisualParams> {
        let globe = self.globe.as_ref()?;
        let atmosphere = self.atmosphere.as_ref()?;
        let (overlay_visible, overlay_scale) = self
            .polar_caps
            .as_ref()
            .map_or((false, 1.0), |caps| (caps.visible, caps.transform.scale));
        Some(VisualParams {
            base_color: globe.material.color,
            emissive: globe.material.emissive,
            atmosphere_tint: atmosphere.material.tint,
            overlay_visible,
            overlay_scale,
        })
    }

    /// Drop every node. The graph is incomplete afterwards.
    pub fn clear(&mut self) {
        self.globe = None;
        self.atmosphere = None;
        self.polar_caps = None;
        self.starfield = None;
    }
}
