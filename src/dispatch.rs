use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::lighting::LightRegistry;
use crate::objects::Drawable;
use crate::shading::{RenderFrame, ShaderId};

/// Extracts the camera position from a view matrix.
pub fn view_position(view: &Mat4) -> Vec3 {
    view.inverse().w_axis.truncate()
}

/// Per-draw uniform upload: resolves a drawable's shader by type name,
/// writes camera, material and light state, then lets the drawable draw.
pub struct RenderDispatcher {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    shaders: HashMap<String, ShaderId>,
}

impl RenderDispatcher {
    pub fn new(view_matrix: Mat4, projection_matrix: Mat4) -> Self {
        Self {
            view_matrix,
            projection_matrix,
            shaders: HashMap::new(),
        }
    }

    pub fn update_matrices(&mut self, view_matrix: Mat4, projection_matrix: Mat4) {
        self.view_matrix = view_matrix;
        self.projection_matrix = projection_matrix;
    }

    pub fn register_shader(&mut self, type_name: impl Into<String>, shader: ShaderId) {
        self.shaders.insert(type_name.into(), shader);
    }

    pub fn shader_for(&self, type_name: &str) -> Option<ShaderId> {
        self.shaders.get(type_name).copied()
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Returns whether a draw was issued. Drawables without a registered
    /// shader are skipped without touching `frame`.
    pub fn visit<'a, F>(&self, drawable: &'a Drawable, lights: &LightRegistry, frame: &mut F) -> bool
    where
        F: RenderFrame<'a>,
    {
        let Some(shader) = self.shader_for(drawable.type_name()) else {
            log::trace!("No shader registered for {}, skipping", drawable.type_name());
            return false;
        };

        frame.use_program(shader);
        frame.set_mat4("projection", self.projection_matrix);
        frame.set_mat4("view", self.view_matrix);
        frame.set_mat4("model", drawable.model_matrix());
        frame.set_vec3("objectColor", drawable.color);
        frame.set_vec3("viewPos", view_position(&self.view_matrix));

        frame.set_int("numLights", lights.len() as i32);
        for (i, light) in lights.iter().enumerate() {
            frame.set_vec3(&format!("lights[{i}].position"), light.position);
            frame.set_vec3(&format!("lights[{i}].color"), light.color);
            frame.set_float(&format!("lights[{i}].intensity"), light.intensity);
            frame.set_float(&format!("lights[{i}].ambientStrength"), light.ambient_strength);
            frame.set_float(&format!("lights[{i}].diffuseStrength"), light.diffuse_strength);
            frame.set_float(&format!("lights[{i}].specularStrength"), light.specular_strength);
            frame.set_float(&format!("lights[{i}].shininess"), light.shininess);
        }

        drawable.draw(frame);
        true
    }
}
