// crates/trellis-core/src/geometry.rs
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dim {
    X,
    Y,
}

impl Dim {
    pub const BOTH: [Dim; 2] = [Dim::X, Dim::Y];

    /// The orthogonal axis.
    pub fn other(self) -> Dim {
        match self {
            Dim::X => Dim::Y,
            Dim::Y => Dim::X,
        }
    }
}

impl Default for Dim {
    fn default() -> Self {
        Dim::X
    }
}

/// Per-axis access on `Vec2`, so allocation code can be written once for
/// both directions.
pub trait Vec2Ext {
    fn dim(&self, d: Dim) -> f32;
    fn set_dim(&mut self, d: Dim, value: f32);
    fn add_dim(&mut self, d: Dim, value: f32);
    /// Raise the component on `d` to at least `value`.
    fn max_dim(&mut self, d: Dim, value: f32);
    /// Clamp each component to `limit` wherever the limit is positive.
    /// Zero means "unconstrained" and negative means "stretch"; both are
    /// left alone.
    fn set_min_pos(&mut self, limit: Vec2);
}

impl Vec2Ext for Vec2 {
    fn dim(&self, d: Dim) -> f32 {
        match d {
            Dim::X => self.x,
            Dim::Y => self.y,
        }
    }

    fn set_dim(&mut self, d: Dim, value: f32) {
        match d {
            Dim::X => self.x = value,
            Dim::Y => self.y = value,
        }
    }

    fn add_dim(&mut self, d: Dim, value: f32) {
        let cur = self.dim(d);
        self.set_dim(d, cur + value);
    }

    fn max_dim(&mut self, d: Dim, value: f32) {
        let cur = self.dim(d);
        self.set_dim(d, cur.max(value));
    }

    fn set_min_pos(&mut self, limit: Vec2) {
        for d in Dim::BOTH {
            let lim = limit.dim(d);
            if lim > 0.0 {
                let cur = self.dim(d);
                self.set_dim(d, cur.min(lim));
            }
        }
    }
}

/// Build a vector from a main-axis and cross-axis value.
pub fn vec_on(main: Dim, main_value: f32, cross_value: f32) -> Vec2 {
    let mut v = Vec2::ZERO;
    v.set_dim(main, main_value);
    v.set_dim(main.other(), cross_value);
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dim_access() {
        let mut v = Vec2::new(1.0, 2.0);
        assert_eq!(v.dim(Dim::X), 1.0);
        assert_eq!(v.dim(Dim::Y), 2.0);
        v.add_dim(Dim::Y, 3.0);
        assert_eq!(v, Vec2::new(1.0, 5.0));
        v.max_dim(Dim::X, 0.5);
        assert_eq!(v.x, 1.0);
        assert_eq!(Dim::X.other(), Dim::Y);
    }

    #[test]
    fn test_min_pos_skips_unbounded_limits() {
        let mut v = Vec2::new(50.0, 50.0);
        v.set_min_pos(Vec2::new(-1.0, 20.0));
        assert_eq!(v, Vec2::new(50.0, 20.0));
        v.set_min_pos(Vec2::new(0.0, 0.0));
        assert_eq!(v, Vec2::new(50.0, 20.0));
    }

    #[test]
    fn test_vec_on() {
        assert_eq!(vec_on(Dim::Y, 3.0, 4.0), Vec2::new(4.0, 3.0));
    }
}
