use log::warn;

use crate::{
    data_structures::{camera::Camera, light::PointLight, model::ShaderFeatures},
    projection::{
        Cascade, CascadeSettings, LightFit, cascades, get_light_matrix,
        get_perspective_light_matrix, get_projection_light_matrix,
    },
    render::{DrawRecord, FrameUniforms, draw_records},
    scene::Scene,
};

/// How the shadow camera is fitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FitMethod {
    /// Orthographic fit to the bounds of the camera frustum.
    #[default]
    FrustumAabb,
    /// Orthographic fit to the frustum and the scene bounds together.
    SceneAndFrustum,
    /// Frustum fit with a light-space perspective warp.
    PerspectiveWarp,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowConfig {
    pub method: FitMethod,
    pub cascades: CascadeSettings,
    /// World-space padding around the camera frustum for [`FitMethod::SceneAndFrustum`].
    pub padding: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            method: FitMethod::default(),
            cascades: CascadeSettings::default(),
            padding: 0.0,
        }
    }
}

/// Settings the embedding renderer hands in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    /// Material channels the compiled pipelines support.
    pub features: ShaderFeatures,
    /// Number of per-frame resource copies the backend keeps.
    pub swapchain_images: usize,
    pub shadow: ShadowConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            features: ShaderFeatures::all(),
            swapchain_images: 2,
            shadow: ShadowConfig::default(),
        }
    }
}

/// A loaded scene together with the active camera, light and settings.
#[derive(Debug)]
pub struct Context {
    pub scene: Scene,
    pub config: RenderConfig,
    pub camera: Camera,
    pub light: PointLight,
}

impl Context {
    /// Uses the scene's first camera and first point light; scenes without a
    /// light get a white light at the origin.
    pub fn new(scene: Scene, config: RenderConfig) -> Self {
        let light = match scene.lights.first() {
            Some(light) => light.clone(),
            None => {
                warn!("scene has no point light, using a white light at the origin");
                PointLight::default()
            }
        };
        let camera = scene
            .cameras
            .first()
            .cloned()
            .unwrap_or_else(Camera::default_camera);
        Self {
            scene,
            config,
            camera,
            light,
        }
    }

    /// Switches to the scene camera at `index`; `false` if there is none.
    pub fn select_camera(&mut self, index: usize) -> bool {
        match self.scene.cameras.get(index) {
            Some(camera) => {
                self.camera = camera.clone();
                true
            }
            None => false,
        }
    }

    pub fn frame_uniforms(&self, aspect: Option<f32>) -> FrameUniforms {
        FrameUniforms::from_camera(&self.camera, aspect, &self.light)
    }

    pub fn draw_records(&self, frame: usize, aspect: Option<f32>) -> Vec<DrawRecord> {
        draw_records(&self.scene, &self.frame_uniforms(aspect), &self.config, frame)
    }

    pub fn shadow_records(&self, fit: &LightFit, frame: usize) -> Vec<DrawRecord> {
        let uniforms = FrameUniforms::from_light_fit(fit, &self.light);
        draw_records(&self.scene, &uniforms, &self.config, frame)
    }

    /// Single shadow camera fitted with the configured method.
    pub fn shadow_fit(&self, aspect: Option<f32>) -> LightFit {
        let camera = &self.camera;
        let projection = camera.projection_matrix(aspect);
        let shadow = &self.config.shadow;
        match shadow.method {
            FitMethod::FrustumAabb => get_light_matrix(
                &projection,
                &camera.view,
                self.light.location,
                camera.eye,
                shadow.cascades.depth_offset,
            ),
            FitMethod::SceneAndFrustum => match self.scene.bounds() {
                Some(bounds) => get_projection_light_matrix(
                    &projection,
                    &camera.view,
                    bounds.min,
                    bounds.max,
                    self.light.location,
                    shadow.padding,
                ),
                None => get_light_matrix(
                    &projection,
                    &camera.view,
                    self.light.location,
                    camera.eye,
                    shadow.cascades.depth_offset,
                ),
            },
            FitMethod::PerspectiveWarp => get_perspective_light_matrix(
                &projection,
                &camera.view,
                self.light.location,
                camera.eye,
            ),
        }
    }

    pub fn cascades(&self, aspect: Option<f32>) -> Vec<Cascade> {
        let camera = &self.camera;
        cascades(
            &camera.projection,
            aspect,
            &camera.view,
            camera.eye,
            self.light.location,
            &self.config.shadow.cascades,
        )
    }
}
