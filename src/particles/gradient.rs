use glam::Vec4;

/// Value evaluated over normalized particle lifetime `t in [0, 1]`.
///
/// Closures are deliberately avoided here: a tagged variant keeps emitters
/// `Clone + Send` and the evaluation branch-predictable in the hot loop.
#[derive(Debug, Clone)]
pub enum Gradient<T> {
    Constant(T),
    Linear { from: T, to: T },
    /// Piecewise-linear keyframes, sorted by time. Values outside the first
    /// and last key clamp.
    Ramp(Vec<(f32, T)>),
}

pub trait Lerp: Copy + Default {
    fn lerp(a: Self, b: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec4 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

impl<T: Lerp> Gradient<T> {
    /// Samples the gradient at `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn sample(&self, t: f32) -> T {
        let t = t.clamp(0.0, 1.0);
        match self {
            Gradient::Constant(v) => *v,
            Gradient::Linear { from, to } => T::lerp(*from, *to, t),
            Gradient::Ramp(keys) => sample_ramp(keys, t),
        }
    }
}

fn sample_ramp<T: Lerp>(keys: &[(f32, T)], t: f32) -> T {
    match keys {
        [] => {
            log::error!("particles: sampling an empty ramp gradient");
            T::default()
        }
        [(_, only)] => *only,
        _ => {
            if t <= keys[0].0 {
                return keys[0].1;
            }
            for pair in keys.windows(2) {
                let (t0, v0) = pair[0];
                let (t1, v1) = pair[1];
                if t <= t1 {
                    let span = (t1 - t0).max(1e-6);
                    return T::lerp(v0, v1, (t - t0) / span);
                }
            }
            keys[keys.len() - 1].1
        }
    }
}
