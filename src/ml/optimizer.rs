// ============================================================
// Layer 5 — Adadelta Optimizer
// ============================================================
// Per-parameter adaptive step sizes with no hand-tuned global
// learning rate:
//
//   E[g²]  = ρ·E[g²]  + (1−ρ)·g²
//   Δx     = √(E[Δx²] + ε) / √(E[g²] + ε) · g
//   E[Δx²] = ρ·E[Δx²] + (1−ρ)·Δx²
//   x      = x − lr·Δx
//
// lr scales the final update only (1.0 reproduces the paper).
// Implemented as a burn SimpleOptimizer so OptimizerAdaptor
// handles parameter traversal, missing gradients, and state
// records.
//
// Reference: Zeiler (2012) ADADELTA: An Adaptive Learning Rate Method

use burn::{
    config::Config,
    module::AutodiffModule,
    optim::{adaptor::OptimizerAdaptor, SimpleOptimizer},
    record::Record,
    tensor::{
        backend::{AutodiffBackend, Backend},
        Tensor,
    },
};

#[derive(Config, Debug)]
pub struct AdadeltaConfig {
    /// Decay of the running averages.
    #[config(default = 0.95)]
    rho: f32,
    /// Keeps the first steps non-zero and the division finite.
    #[config(default = 1e-6)]
    epsilon: f32,
}

#[derive(Clone, Debug)]
pub struct Adadelta {
    rho:     f32,
    epsilon: f32,
}

/// Running averages for one parameter tensor.
#[derive(Record, Clone)]
pub struct AdadeltaState<B: Backend, const D: usize> {
    /// E[g²]
    pub square_avg: Tensor<B, D>,
    /// E[Δx²]
    pub delta_avg: Tensor<B, D>,
}

impl<B: Backend> SimpleOptimizer<B> for Adadelta {
    type State<const D: usize> = AdadeltaState<B, D>;

    fn step<const D: usize>(
        &self,
        lr:     f64,
        tensor: Tensor<B, D>,
        grad:   Tensor<B, D>,
        state:  Option<Self::State<D>>,
    ) -> (Tensor<B, D>, Option<Self::State<D>>) {
        let (square_avg, delta_avg) = match state {
            Some(state) => (state.square_avg, state.delta_avg),
            None        => (grad.zeros_like(), grad.zeros_like()),
        };

        let square_avg = square_avg
            .mul_scalar(self.rho)
            .add(grad.clone().powi_scalar(2).mul_scalar(1.0 - self.rho));

        let delta = delta_avg
            .clone()
            .add_scalar(self.epsilon)
            .sqrt()
            .div(square_avg.clone().add_scalar(self.epsilon).sqrt())
            .mul(grad);

        let delta_avg = delta_avg
            .mul_scalar(self.rho)
            .add(delta.clone().powi_scalar(2).mul_scalar(1.0 - self.rho));

        let state = AdadeltaState { square_avg, delta_avg };
        (tensor - delta.mul_scalar(lr), Some(state))
    }

    fn to_device<const D: usize>(mut state: Self::State<D>, device: &B::Device) -> Self::State<D> {
        state.square_avg = state.square_avg.to_device(device);
        state.delta_avg  = state.delta_avg.to_device(device);
        state
    }
}

impl AdadeltaConfig {
    pub fn init<B: AutodiffBackend, M: AutodiffModule<B>>(&self) -> OptimizerAdaptor<Adadelta, M, B> {
        OptimizerAdaptor::from(Adadelta { rho: self.rho, epsilon: self.epsilon })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{InferBackend, TrainBackend};
    use burn::{
        module::Module,
        nn::{Linear, LinearConfig},
        optim::{GradientsParams, Optimizer},
        tensor::TensorData,
    };

    fn scalar_step(
        optim: &Adadelta,
        x:     f32,
        g:     f32,
        state: Option<AdadeltaState<InferBackend, 1>>,
    ) -> (f32, AdadeltaState<InferBackend, 1>) {
        let device = Default::default();
        let x = Tensor::<InferBackend, 1>::from_data(TensorData::new(vec![x], [1]), &device);
        let g = Tensor::<InferBackend, 1>::from_data(TensorData::new(vec![g], [1]), &device);
        let (x, state) = SimpleOptimizer::<InferBackend>::step(optim, 1.0, x, g, state);
        (x.into_scalar(), state.unwrap())
    }

    #[test]
    fn test_first_step_matches_closed_form() {
        let optim = Adadelta { rho: 0.95, epsilon: 1e-6 };
        let (x, _) = scalar_step(&optim, 1.0, 0.5, None);

        // E[g²] = 0.05 · 0.25, Δx = √ε / √(E[g²] + ε) · g
        let e_g2   = 0.05f32 * 0.25;
        let expect = 1.0 - (1e-6f32).sqrt() / (e_g2 + 1e-6).sqrt() * 0.5;
        assert!((x - expect).abs() < 1e-6, "x = {x}, expected {expect}");
    }

    #[test]
    fn test_step_moves_against_gradient() {
        let optim = Adadelta { rho: 0.95, epsilon: 1e-6 };
        let (x1, state) = scalar_step(&optim, 0.0, 2.0, None);
        let (x2, _)     = scalar_step(&optim, x1, 2.0, Some(state));
        assert!(x1 < 0.0);
        assert!(x2 < x1);
    }

    #[test]
    fn test_zero_gradient_leaves_parameter() {
        let optim = Adadelta { rho: 0.95, epsilon: 1e-6 };
        let (x, _) = scalar_step(&optim, 3.0, 0.0, None);
        assert_eq!(x, 3.0);
    }

    #[test]
    fn test_adaptor_updates_module() {
        let device = Default::default();
        let linear: Linear<TrainBackend> = LinearConfig::new(4, 2).init(&device);
        let before = linear.weight.val().into_data().to_vec::<f32>().unwrap();

        let x = Tensor::<TrainBackend, 2>::ones([3, 4], &device);
        let grads = linear.forward(x).sum().backward();
        let grads = GradientsParams::from_grads(grads, &linear);

        let mut optim = AdadeltaConfig::new().init();
        let linear = optim.step(1.0, linear, grads);
        let after = linear.weight.val().into_data().to_vec::<f32>().unwrap();

        assert_ne!(before, after);
        assert_eq!(linear.num_params(), 4 * 2 + 2);
    }
}
