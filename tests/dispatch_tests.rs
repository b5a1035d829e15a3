use glam::{Mat4, Vec3};
use orbital_viewer::cameras::Camera;
use orbital_viewer::dispatch::{view_position, RenderDispatcher};
use orbital_viewer::lighting::{Light, LightRegistry};
use orbital_viewer::mesh::MeshBuffers;
use orbital_viewer::objects::Drawable;
use orbital_viewer::shading::{DrawSink, ShaderId, Shading, UniformValue};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Use(ShaderId),
    Set(String, UniformValue),
    Draw { index_count: u32 },
}

#[derive(Default)]
struct RecordingFrame {
    calls: Vec<Call>,
}

impl RecordingFrame {
    fn uniform_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Set(name, _) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    fn value(&self, name: &str) -> Option<UniformValue> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::Set(n, value) if n == name => Some(*value),
            _ => None,
        })
    }
}

impl Shading for RecordingFrame {
    fn use_program(&mut self, shader: ShaderId) {
        self.calls.push(Call::Use(shader));
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.calls.push(Call::Set(name.to_string(), value));
    }
}

impl<'a> DrawSink<'a> for RecordingFrame {
    fn draw_indexed(&mut self, mesh: &'a MeshBuffers) {
        self.calls.push(Call::Draw {
            index_count: mesh.index_count(),
        });
    }
}

fn dispatcher() -> RenderDispatcher {
    let camera = Camera::default();
    let mut dispatcher = RenderDispatcher::new(camera.view_matrix(), camera.projection_matrix(16.0 / 9.0));
    dispatcher.register_shader("Sphere", ShaderId(0));
    dispatcher
}

#[cfg(test)]
mod dispatcher_tests {
    use super::*;

    #[test]
    fn test_unregistered_kind_is_skipped() {
        let dispatcher = dispatcher();
        let lights = LightRegistry::with_default_light();
        let drawable = Drawable::cube_sphere(1.0, 2).unwrap();
        let mut frame = RecordingFrame::default();

        assert!(!dispatcher.visit(&drawable, &lights, &mut frame));
        assert!(frame.calls.is_empty(), "skip must not touch the frame: {:?}", frame.calls);
    }

    #[test]
    fn test_single_drawable_upload_sequence() {
        let dispatcher = dispatcher();
        let lights = LightRegistry::with_default_light();
        let drawable = Drawable::sphere(1.0, 4, 2).unwrap();
        let mut frame = RecordingFrame::default();

        assert!(dispatcher.visit(&drawable, &lights, &mut frame));

        assert_eq!(frame.calls.first(), Some(&Call::Use(ShaderId(0))));
        assert_eq!(frame.calls.last(), Some(&Call::Draw { index_count: 24 }));

        let names = frame.uniform_names();
        assert_eq!(
            &names[..6],
            &["projection", "view", "model", "objectColor", "viewPos", "numLights"]
        );
        assert_eq!(names.len(), 6 + 7);
        assert_eq!(frame.value("numLights"), Some(UniformValue::Int(1)));
    }

    #[test]
    fn test_light_uploads_follow_registry_order() {
        let dispatcher = dispatcher();
        let mut lights = LightRegistry::with_default_light();
        lights.push(Light::new("Fill").with_position(Vec3::new(-4.0, 2.0, 0.0)));
        lights.add_light();

        let drawable = Drawable::sphere(1.0, 8, 4).unwrap();
        let mut frame = RecordingFrame::default();
        dispatcher.visit(&drawable, &lights, &mut frame);

        let fields = [
            "position",
            "color",
            "intensity",
            "ambientStrength",
            "diffuseStrength",
            "specularStrength",
            "shininess",
        ];
        let expected: Vec<String> = (0..3)
            .flat_map(|i| fields.iter().map(move |field| format!("lights[{}].{}", i, field)))
            .collect();

        let names = frame.uniform_names();
        assert_eq!(names[6..], expected.iter().map(String::as_str).collect::<Vec<_>>()[..]);
        assert_eq!(
            frame.value("lights[1].position"),
            Some(UniformValue::Vec3(Vec3::new(-4.0, 2.0, 0.0)))
        );
        assert_eq!(frame.value("numLights"), Some(UniformValue::Int(3)));
    }

    #[test]
    fn test_model_matrix_and_color_come_from_drawable() {
        let dispatcher = dispatcher();
        let lights = LightRegistry::with_default_light();
        let mut drawable = Drawable::sphere(1.0, 4, 2)
            .unwrap()
            .with_position(Vec3::new(-2.0, 0.0, 0.0))
            .with_color(Vec3::new(1.0, 0.5, 0.2));
        drawable.scale = Vec3::splat(2.0);

        let mut frame = RecordingFrame::default();
        dispatcher.visit(&drawable, &lights, &mut frame);

        let expected = Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
        assert_eq!(frame.value("model"), Some(UniformValue::Mat4(expected)));
        assert_eq!(frame.value("objectColor"), Some(UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.2))));
    }

    #[test]
    fn test_view_position_recovers_camera() {
        let camera = Camera {
            position: Vec3::new(3.0, 4.0, -2.0),
            target: Vec3::new(0.5, 0.0, 1.0),
            fov: 60.0,
        };
        let position = view_position(&camera.view_matrix());
        assert!((position - camera.position).length() < 1e-4, "got {:?}", position);
    }
}
