/// Easing curve applied to normalized progress `t` in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// No easing.
    #[default]
    Linear,
    /// Slow start and slow finish following half a cosine period.
    CosineInOut,
}

impl Ease {
    /// Ease from a keyframe "has easing" flag.
    pub fn from_flag(easing: bool) -> Self {
        if easing { Self::CosineInOut } else { Self::Linear }
    }

    /// Map progress through the curve. Input is clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CosineInOut => 0.5 - 0.5 * (std::f64::consts::PI * t).cos(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
