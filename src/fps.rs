use std::time::Instant;

/// Frame timer reporting FPS averaged over windows of at least one second.
#[derive(Debug)]
pub struct FpsCounter {
    last_time: Instant,
    delta_time: f32,
    fps: f32,
    frame_count: u32,
    elapsed: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            last_time: Instant::now(),
            delta_time: 0.0,
            fps: 0.0,
            frame_count: 0,
            elapsed: 0.0,
        }
    }

    /// Call once per frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_time).as_secs_f32();
        self.last_time = now;
        self.tick(delta);
    }

    pub fn tick(&mut self, delta_seconds: f32) {
        self.delta_time = delta_seconds;
        self.frame_count += 1;
        self.elapsed += delta_seconds;

        if self.elapsed >= 1.0 {
            self.fps = self.frame_count as f32 / self.elapsed;
            self.frame_count = 0;
            self.elapsed = 0.0;
        }
    }

    /// Zero until the first window completes.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Seconds.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn frame_time_ms(&self) -> f32 {
        if self.fps > 0.0 {
            1000.0 / self.fps
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_over_one_second_windows() {
        let mut counter = FpsCounter::new();
        for _ in 0..59 {
            counter.tick(1.0 / 60.0);
        }
        assert_eq!(counter.fps(), 0.0);

        counter.tick(1.0 / 60.0 + 1e-4);
        assert!((counter.fps() - 60.0).abs() < 0.1, "fps was {}", counter.fps());
        assert!((counter.frame_time_ms() - 16.67).abs() < 0.1);
    }
}
