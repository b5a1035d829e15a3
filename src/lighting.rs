use glam::{vec3, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub ambient_strength: f32,
    pub diffuse_strength: f32,
    pub specular_strength: f32,
    /// Phong exponent.
    pub shininess: f32,
}

impl Light {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            name: "Light".to_string(),
            position: vec3(0.0, 5.0, 5.0),
            color: Vec3::ONE,
            intensity: 1.0,
            ambient_strength: 0.1,
            diffuse_strength: 0.7,
            specular_strength: 0.5,
            shininess: 32.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightPreset {
    Daylight,
    Night,
    Studio,
}

impl LightPreset {
    pub const ALL: [LightPreset; 3] = [LightPreset::Daylight, LightPreset::Night, LightPreset::Studio];

    pub fn label(&self) -> &'static str {
        match self {
            LightPreset::Daylight => "Daylight",
            LightPreset::Night => "Night",
            LightPreset::Studio => "Studio",
        }
    }

    /// Overwrites color and strengths; position and shininess are kept.
    pub fn apply(&self, light: &mut Light) {
        let (color, intensity, ambient, diffuse, specular) = match self {
            LightPreset::Daylight => (vec3(1.0, 0.95, 0.8), 1.0, 0.3, 0.7, 0.3),
            LightPreset::Night => (vec3(0.1, 0.1, 0.3), 0.5, 0.2, 0.3, 0.5),
            LightPreset::Studio => (Vec3::ONE, 1.0, 0.3, 0.9, 0.8),
        };

        light.color = color;
        light.intensity = intensity;
        light.ambient_strength = ambient;
        light.diffuse_strength = diffuse;
        light.specular_strength = specular;
    }
}

/// Ordered lights uploaded with every draw. Never empty once seeded.
#[derive(Debug, Clone, Default)]
pub struct LightRegistry {
    lights: Vec<Light>,
}

impl LightRegistry {
    pub fn new() -> Self {
        Self { lights: Vec::new() }
    }

    /// The single light a fresh renderer starts with.
    pub fn with_default_light() -> Self {
        let mut registry = Self::new();
        registry.push(Light {
            name: "Main Light".to_string(),
            position: vec3(5.0, 5.0, 5.0),
            diffuse_strength: 0.8,
            ..Default::default()
        });
        registry
    }

    pub fn push(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Appends a default light named after its 1-based slot.
    pub fn add_light(&mut self) -> &mut Light {
        let name = format!("Light {}", self.lights.len() + 1);
        self.lights.push(Light::new(name));
        let last = self.lights.len() - 1;
        &mut self.lights[last]
    }

    /// Removes the light at `index` unless it is the last one left.
    pub fn remove(&mut self, index: usize) -> Option<Light> {
        if self.lights.len() <= 1 || index >= self.lights.len() {
            return None;
        }
        Some(self.lights.remove(index))
    }

    pub fn apply_preset(&mut self, preset: LightPreset) {
        if let Some(light) = self.lights.first_mut() {
            preset.apply(light);
        }
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Light> {
        self.lights.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Light> {
        self.lights.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Light> {
        self.lights.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Light> {
        self.lights.iter_mut()
    }
}

impl<'a> IntoIterator for &'a LightRegistry {
    type Item = &'a Light;
    type IntoIter = std::slice::Iter<'a, Light>;

    fn into_iter(self) -> Self::IntoIter {
        self.lights.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_main_light() {
        let registry = LightRegistry::with_default_light();
        assert_eq!(registry.len(), 1);

        let light = registry.get(0).unwrap();
        assert_eq!(light.name, "Main Light");
        assert_eq!(light.position, vec3(5.0, 5.0, 5.0));
        assert_eq!(light.diffuse_strength, 0.8);
        assert_eq!(light.shininess, 32.0);
    }

    #[test]
    fn added_lights_are_numbered_and_last_light_stays() {
        let mut registry = LightRegistry::with_default_light();
        assert_eq!(registry.add_light().name, "Light 2");
        assert_eq!(registry.add_light().name, "Light 3");

        assert!(registry.remove(7).is_none());
        assert_eq!(registry.remove(1).unwrap().name, "Light 2");
        assert!(registry.remove(0).is_some());
        assert!(registry.remove(0).is_none(), "last light must not be removed");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn presets_only_touch_the_first_light() {
        let mut registry = LightRegistry::with_default_light();
        registry.add_light();
        registry.apply_preset(LightPreset::Night);

        let first = registry.get(0).unwrap();
        assert_eq!(first.color, vec3(0.1, 0.1, 0.3));
        assert_eq!(first.intensity, 0.5);
        assert_eq!(first.position, vec3(5.0, 5.0, 5.0));
        assert_eq!(registry.get(1).unwrap().color, Vec3::ONE);
    }
}
