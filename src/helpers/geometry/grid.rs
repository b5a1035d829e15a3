use glam::{vec3, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    pub show: bool,
    pub size: f32,
    pub divisions: u32,
    pub minor_color: Vec3,
    pub major_color: Vec3,
    /// Minor cells between two major lines.
    pub major_spacing: u32,
    pub opacity: f32,
    pub show_axis_lines: bool,
    pub x_axis_color: Vec3,
    pub z_axis_color: Vec3,
    pub fade_distance: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            show: true,
            size: 20.0,
            divisions: 20,
            minor_color: Vec3::splat(0.5),
            major_color: Vec3::splat(0.7),
            major_spacing: 5,
            opacity: 0.8,
            show_axis_lines: true,
            x_axis_color: vec3(0.8, 0.2, 0.2),
            z_axis_color: vec3(0.2, 0.2, 0.8),
            fade_distance: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPreset {
    Engineering,
    Blueprint,
    Minimal,
}

impl GridPreset {
    pub const ALL: [GridPreset; 3] = [
        GridPreset::Engineering,
        GridPreset::Blueprint,
        GridPreset::Minimal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GridPreset::Engineering => "Engineering",
            GridPreset::Blueprint => "Blueprint",
            GridPreset::Minimal => "Minimal",
        }
    }

    pub fn apply(&self, settings: &mut GridSettings) {
        match self {
            GridPreset::Engineering => {
                settings.minor_color = Vec3::splat(0.2);
                settings.major_color = Vec3::splat(0.4);
                settings.major_spacing = 5;
                settings.opacity = 0.7;
                settings.show_axis_lines = true;
            }
            GridPreset::Blueprint => {
                settings.minor_color = vec3(0.1, 0.3, 0.6);
                settings.major_color = vec3(0.2, 0.4, 0.8);
                settings.major_spacing = 4;
                settings.opacity = 0.5;
                settings.show_axis_lines = true;
            }
            GridPreset::Minimal => {
                settings.minor_color = Vec3::splat(0.15);
                settings.major_color = Vec3::splat(0.3);
                settings.major_spacing = 2;
                settings.opacity = 0.3;
                settings.show_axis_lines = false;
            }
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

pub fn grid_vertex_count(divisions: u32) -> u32 {
    (divisions + 1) * 4
}

/// Line list on the XZ plane centered at the origin.
///
/// Lines of constant X come first (they run along Z), then lines of constant
/// Z. The center line of each family is an axis when `divisions` is even.
pub fn build_grid_vertices(settings: &GridSettings) -> Vec<GridVertex> {
    let divisions = settings.divisions.max(1);
    let half_size = settings.size * 0.5;
    let step = settings.size / divisions as f32;

    let line_color = |i: u32, axis_color: Vec3| -> [f32; 3] {
        if settings.show_axis_lines && i * 2 == divisions {
            axis_color.to_array()
        } else if settings.major_spacing > 0 && i % settings.major_spacing == 0 {
            settings.major_color.to_array()
        } else {
            settings.minor_color.to_array()
        }
    };

    let mut vertices = Vec::with_capacity(grid_vertex_count(divisions) as usize);

    for i in 0..=divisions {
        let x = -half_size + i as f32 * step;
        let color = line_color(i, settings.z_axis_color);
        vertices.push(GridVertex {
            position: [x, 0.0, -half_size],
            color,
        });
        vertices.push(GridVertex {
            position: [x, 0.0, half_size],
            color,
        });
    }

    for i in 0..=divisions {
        let z = -half_size + i as f32 * step;
        let color = line_color(i, settings.x_axis_color);
        vertices.push(GridVertex {
            position: [-half_size, 0.0, z],
            color,
        });
        vertices.push(GridVertex {
            position: [half_size, 0.0, z],
            color,
        });
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_four_vertices_per_division_line() {
        let settings = GridSettings {
            divisions: 10,
            ..Default::default()
        };
        let vertices = build_grid_vertices(&settings);
        assert_eq!(vertices.len() as u32, grid_vertex_count(10));
        assert_eq!(vertices[0].position, [-10.0, 0.0, -10.0]);
        assert_eq!(vertices[1].position, [-10.0, 0.0, 10.0]);
    }

    #[test]
    fn center_lines_use_axis_colors() {
        let settings = GridSettings {
            divisions: 4,
            ..Default::default()
        };
        let vertices = build_grid_vertices(&settings);

        // (4 + 1) lines of constant X, the third one sits on x = 0
        assert_eq!(vertices[4].position[0], 0.0);
        assert_eq!(vertices[4].color, settings.z_axis_color.to_array());
        assert_eq!(vertices[14].position[2], 0.0);
        assert_eq!(vertices[14].color, settings.x_axis_color.to_array());

        let plain = GridSettings {
            show_axis_lines: false,
            ..settings
        };
        let vertices = build_grid_vertices(&plain);
        assert_ne!(vertices[4].color, plain.z_axis_color.to_array());
    }

    #[test]
    fn presets_change_colors() {
        let mut settings = GridSettings::default();
        GridPreset::Minimal.apply(&mut settings);
        assert!(!settings.show_axis_lines);
        assert_eq!(settings.major_spacing, 2);
    }
}
