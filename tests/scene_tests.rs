use glam::Vec3;
use orbital_viewer::lighting::{LightPreset, LightRegistry};
use orbital_viewer::objects::{Drawable, DrawableKind, Shape};
use orbital_viewer::scene::Scene;

fn sphere() -> Drawable {
    Drawable::sphere(1.0, 8, 4).unwrap()
}

#[cfg(test)]
mod naming_tests {
    use super::*;

    #[test]
    fn test_duplicate_names_get_suffixes() {
        let mut scene = Scene::new();
        scene.add("Sphere", sphere());
        scene.add("Sphere", sphere());
        scene.add("Sphere", sphere());

        let names: Vec<&str> = scene.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Sphere", "Sphere 1", "Sphere 2"]);
    }

    #[test]
    fn test_freed_name_is_reused() {
        let mut scene = Scene::new();
        scene.add("Sphere", sphere());
        scene.add("Sphere", sphere());
        scene.remove_named("Sphere");

        assert_eq!(scene.len(), 1);
        scene.add("Sphere", sphere());
        assert_eq!(scene.entries()[1].name, "Sphere");
    }

    #[test]
    fn test_remove_named_removes_every_match() {
        let mut scene = Scene::new();
        scene.add("A", sphere());
        scene.add("B", sphere());
        scene.add("A", sphere());

        assert_eq!(scene.remove_named("A 1"), 1);
        assert_eq!(scene.remove_named("A"), 1);
        assert_eq!(scene.remove_named("missing"), 0);
        assert_eq!(scene.entries()[0].name, "B");
    }
}

#[cfg(test)]
mod scene_order_tests {
    use super::*;

    #[test]
    fn test_drawables_follow_entry_order() {
        let mut scene = Scene::new();
        scene.add("Left", sphere().with_position(Vec3::new(-1.0, 0.0, 0.0)));
        scene.add("Middle", Drawable::cube_sphere(1.0, 2).unwrap());
        scene.add("Right", sphere().with_position(Vec3::new(1.0, 0.0, 0.0)));
        scene.remove_at(1);

        let xs: Vec<f32> = scene.drawables().map(|d| d.position.x).collect();
        assert_eq!(xs, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_mutation_through_handle() {
        let mut scene = Scene::new();
        let handle = scene.add("Ball", sphere());

        let drawable = scene.get_mut(handle).unwrap();
        let report = drawable
            .set_shape(Shape::from_kind(DrawableKind::Sphere, 2.0, 12))
            .unwrap();

        assert_eq!(report.vertex_count, (18 + 1) * (12 + 1));
        assert_eq!(scene.get(handle).unwrap().kind(), DrawableKind::Sphere);
    }

    #[test]
    fn test_remove_out_of_range_is_none() {
        let mut scene = Scene::new();
        assert!(scene.remove_at(0).is_none());
        assert_eq!(scene.compact(), 0);
    }
}

#[cfg(test)]
mod light_registry_tests {
    use super::*;

    #[test]
    fn test_last_light_cannot_be_removed() {
        let mut lights = LightRegistry::with_default_light();
        assert!(lights.remove(0).is_none());
        assert_eq!(lights.len(), 1);

        lights.add_light();
        assert_eq!(lights.get(1).unwrap().name, "Light 2");
        assert!(lights.remove(0).is_some());
        assert_eq!(lights.len(), 1);
    }

    #[test]
    fn test_night_preset_dims_first_light() {
        let mut lights = LightRegistry::with_default_light();
        lights.add_light();
        let second_before = lights.get(1).unwrap().clone();

        lights.apply_preset(LightPreset::Night);
        let first = lights.get(0).unwrap();
        assert!(first.intensity < 1.0, "night intensity {}", first.intensity);
        assert_eq!(lights.get(1).unwrap(), &second_before);
    }
}
