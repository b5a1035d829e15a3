use glam::{Mat4, Vec2, Vec3};

pub const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 5.0);
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Right-handed look-at camera with +Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            target: Vec3::ZERO,
            fov: 45.0,
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let aspect_ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            aspect_ratio
        } else {
            1.0
        };
        Mat4::perspective_rh(self.fov.to_radians(), aspect_ratio, NEAR_PLANE, FAR_PLANE)
    }

    /// Back to (0, 0, 5) looking at the origin. Field of view is kept.
    pub fn reset(&mut self) {
        self.position = DEFAULT_POSITION;
        self.target = Vec3::ZERO;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraPreset {
    pub name: String,
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPreset {
    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.position;
        camera.target = self.target;
    }
}

/// Named camera placements saved during a session.
#[derive(Debug, Default, Clone)]
pub struct CameraPresets {
    presets: Vec<CameraPreset>,
}

impl CameraPresets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the camera's placement under `name`, replacing a preset with
    /// the same name. Returns the preset's index.
    pub fn save(&mut self, name: &str, camera: &Camera) -> usize {
        let preset = CameraPreset {
            name: name.to_string(),
            position: camera.position,
            target: camera.target,
        };

        if let Some(index) = self.presets.iter().position(|p| p.name == name) {
            self.presets[index] = preset;
            return index;
        }
        self.presets.push(preset);
        self.presets.len() - 1
    }

    /// Returns false when `index` names no preset.
    pub fn apply(&self, index: usize, camera: &mut Camera) -> bool {
        match self.presets.get(index) {
            Some(preset) => {
                preset.apply(camera);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&CameraPreset> {
        self.presets.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CameraPreset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// Mouse orbit around the camera target: left drag orbits, right or middle
/// drag pans, wheel zooms.
#[derive(Debug)]
pub struct OrbitControls {
    is_left_mouse_dragging: bool,
    is_middle_mouse_dragging: bool,
    last_mouse_position: Option<Vec2>,

    sensitivity: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            is_left_mouse_dragging: false,
            is_middle_mouse_dragging: false,
            last_mouse_position: None,
            sensitivity: 0.25,
        }
    }

    /// Returns true when `camera` moved.
    pub fn handle_event(&mut self, event: &winit::event::WindowEvent, camera: &mut Camera) -> bool {
        use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.is_left_mouse_dragging = pressed,
                    MouseButton::Middle | MouseButton::Right => {
                        self.is_middle_mouse_dragging = pressed
                    }
                    _ => {}
                }
                if pressed {
                    self.last_mouse_position = None;
                }
                false
            }
            WindowEvent::MouseWheel {
                delta: MouseScrollDelta::LineDelta(_, y),
                ..
            } => {
                zoom(camera, *y);
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                let Some(last) = self.last_mouse_position.replace(position) else {
                    return false;
                };
                let delta = (position - last) * self.sensitivity;

                if self.is_left_mouse_dragging {
                    orbit(camera, delta);
                    true
                } else if self.is_middle_mouse_dragging {
                    pan(camera, delta);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }
}

fn orbit(camera: &mut Camera, delta: Vec2) {
    let offset = camera.position - camera.target;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return;
    }

    let lat = (offset.y / distance).clamp(-1.0, 1.0).asin().to_degrees();
    let long = offset.x.atan2(offset.z).to_degrees();

    let lat = (lat + delta.y).clamp(-85.0, 85.0).to_radians();
    let long = (long - delta.x).to_radians();

    camera.position = camera.target
        + Vec3::new(lat.cos() * long.sin(), lat.sin(), lat.cos() * long.cos()) * distance;
}

fn pan(camera: &mut Camera, delta: Vec2) {
    let forward = (camera.target - camera.position).normalize_or_zero();
    let right = forward.cross(Vec3::Y).normalize_or_zero();
    let up = right.cross(forward);

    let distance = camera.position.distance(camera.target);
    let shift = (-right * delta.x + up * delta.y) * distance * 0.002;

    camera.position += shift;
    camera.target += shift;
}

fn zoom(camera: &mut Camera, lines: f32) {
    let offset = camera.position - camera.target;
    let distance = (offset.length() * (1.0 - lines * 0.1)).clamp(NEAR_PLANE * 2.0, FAR_PLANE * 0.5);
    let direction = if offset.length_squared() > 0.0 {
        offset.normalize()
    } else {
        Vec3::Z
    };
    camera.position = camera.target + direction * distance;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_replace_by_name() {
        let mut camera = Camera::default();
        let mut presets = CameraPresets::new();

        assert_eq!(presets.save("Top", &camera), 0);
        camera.position = Vec3::new(0.0, 10.0, 0.1);
        assert_eq!(presets.save("Top", &camera), 0);
        assert_eq!(presets.len(), 1);

        camera.reset();
        assert!(presets.apply(0, &mut camera));
        assert_eq!(camera.position, Vec3::new(0.0, 10.0, 0.1));
        assert!(!presets.apply(3, &mut camera));
    }

    #[test]
    fn reset_keeps_fov() {
        let mut camera = Camera {
            position: Vec3::ONE,
            target: Vec3::X,
            fov: 70.0,
        };
        camera.reset();
        assert_eq!(camera, Camera { fov: 70.0, ..Camera::default() });
    }

    #[test]
    fn orbit_keeps_distance_to_target() {
        let mut camera = Camera::default();
        orbit(&mut camera, Vec2::new(30.0, 20.0));
        assert!((camera.position.distance(camera.target) - 5.0).abs() < 1e-4);
        assert!(camera.position.y > 0.0);
    }

    #[test]
    fn degenerate_aspect_falls_back_to_square() {
        let camera = Camera::default();
        assert_eq!(camera.projection_matrix(0.0), camera.projection_matrix(1.0));
    }
}
