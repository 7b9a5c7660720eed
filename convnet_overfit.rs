// convnet_overfit.rs
// Sanity check for the three-layer convnet: train on a tiny synthetic batch
// with vanilla SGD and confirm the loss drops and training accuracy rises.
//
// Usage:
//   convnet_overfit [config.json]
//
// Without an argument the built-in small configuration is used. Set
// RUST_LOG=debug to see per-step loss breakdowns.

use std::env;
use std::error::Error;

use rust_convnet::config::{load_config, ConvNetConfig, Precision};
use rust_convnet::convnet::ThreeLayerConvNet;
use rust_convnet::optimizers::SGD;
use rust_convnet::scalar::Scalar;
use rust_convnet::tensor::Tensor;
use rust_convnet::utils::SimpleRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

const NUM_SAMPLES: usize = 20;
const ITERATIONS: usize = 200;
const LEARNING_RATE: f64 = 1e-2;
const LOG_EVERY: usize = 20;
const SEED: u64 = 42;

// Synthetic batch: uniform pixels in [-1, 1) and random labels.
fn synthetic_batch<T: Scalar>(
    config: &ConvNetConfig,
    rng: &mut SimpleRng,
) -> Result<(Tensor<T>, Vec<usize>), Box<dyn Error>> {
    let [c, h, w] = config.input_dim;
    let data = (0..NUM_SAMPLES * c * h * w)
        .map(|_| T::of_f64(rng.gen_range_f64(-1.0, 1.0)))
        .collect();
    let x = Tensor::from_vec(&[NUM_SAMPLES, c, h, w], data)?;
    let y = (0..NUM_SAMPLES)
        .map(|_| rng.gen_usize(config.num_classes))
        .collect();
    Ok((x, y))
}

fn train<T: Scalar>(config: &ConvNetConfig) -> Result<(), Box<dyn Error>> {
    let mut rng = SimpleRng::new(SEED);
    let mut model = ThreeLayerConvNet::<T>::new(config, &mut rng)?;
    let (x, y) = synthetic_batch::<T>(config, &mut rng)?;
    let mut optimizer = SGD::new(T::of_f64(LEARNING_RATE));

    let initial_acc = model.accuracy(&x, &y)?;
    info!(
        samples = NUM_SAMPLES,
        parameters = model.params.parameter_count(),
        accuracy = initial_acc,
        "starting overfit run"
    );

    let mut last_loss = f64::NAN;
    for step in 0..ITERATIONS {
        let out = model.loss(&x, &y)?;
        model.apply_gradients(&out.grads, &mut optimizer);
        last_loss = out.loss.as_f64();

        if step % LOG_EVERY == 0 {
            info!(step, loss = last_loss, "training");
        }
    }

    let final_acc = model.accuracy(&x, &y)?;
    info!(loss = last_loss, accuracy = final_acc, "finished overfit run");
    println!(
        "Final loss: {:.6}, training accuracy: {:.2}%",
        last_loss,
        final_acc * 100.0
    );
    Ok(())
}

fn small_config() -> ConvNetConfig {
    ConvNetConfig {
        input_dim: [3, 16, 16],
        num_filters: 8,
        filter_size: 3,
        hidden_dim: 32,
        num_classes: 5,
        weight_scale: 1e-2,
        reg: 1e-3,
        precision: Precision::F32,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => small_config(),
    };
    info!(?config, "loaded configuration");

    match config.precision {
        Precision::F32 => train::<f32>(&config),
        Precision::F64 => train::<f64>(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_config_is_valid() {
        assert!(small_config().validate().is_ok());
    }

    #[test]
    fn test_synthetic_batch_shapes() {
        let config = small_config();
        let mut rng = SimpleRng::new(SEED);
        let (x, y) = synthetic_batch::<f32>(&config, &mut rng).unwrap();

        assert_eq!(x.shape(), &[NUM_SAMPLES, 3, 16, 16]);
        assert_eq!(y.len(), NUM_SAMPLES);
        assert!(y.iter().all(|&label| label < config.num_classes));
        assert!(x.data().iter().all(|&v| (-1.0..1.0).contains(&v)));
    }
}
