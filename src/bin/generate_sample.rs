use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

/// (frequency Hz, amplitude, phase) per channel.
const WAVES: [(f64, f64, f64); 4] = [
    (0.5, 1.0, 0.0),
    (1.3, 0.6, 0.7),
    (2.1, 0.3, 1.9),
    (3.7, 0.15, 0.4),
];

fn generate_wave(
    times: &[f64],
    (freq, amp, phase): (f64, f64, f64),
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    times
        .iter()
        .map(|&t| {
            let signal = amp * (2.0 * std::f64::consts::PI * freq * t + phase).sin();
            signal + rng.gauss(0.0, noise_level)
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // 10 s sampled at 100 Hz
    let times: Vec<f64> = (0..1000).map(|i| i as f64 * 0.01).collect();

    let mut fields = vec![Field::new("time", DataType::Float64, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(Float64Array::from(times.clone()))];
    for (i, &wave) in WAVES.iter().enumerate() {
        fields.push(Field::new(format!("wave{}", i + 1), DataType::Float64, false));
        let values = generate_wave(&times, wave, 0.02, &mut rng);
        columns.push(Arc::new(Float64Array::from(values)));
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("Failed to create RecordBatch")?;

    let output_path = "sample_waves.csv";
    let file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create {output_path}"))?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(&batch).context("Failed to write batch")?;

    let preview = pretty_format_batches(&[batch.slice(0, 5)])?;
    println!("{preview}");
    println!(
        "Wrote {} rows ({} channels) to {output_path}",
        batch.num_rows(),
        WAVES.len()
    );
    Ok(())
}
