use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Optical-depth channel: absorption bands on a sloped baseline plus noise.
fn generate_channel(
    wavenumbers: &[f64],
    peaks: &[(f64, f64, f64)],
    slope: f64,
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    let upper = wavenumbers.first().copied().unwrap_or(0.0);
    wavenumbers
        .iter()
        .map(|&wn| {
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(wn, mu, sigma, amp))
                .sum();
            let baseline = 0.02 + slope * (upper - wn);
            signal + baseline + rng.gauss(0.0, noise_level)
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

    // Wavenumbers: 4000 → 1002, step 2 (descending, as spectrometers export)
    let wavenumbers: Vec<f64> = (0..1500).map(|i| 4000.0 - i as f64 * 2.0).collect();

    // Ice mixture bands (centre, width, depth) scaled per channel.
    let bands = [
        (3280.0, 120.0, 0.9),
        (2340.0, 12.0, 0.6),
        (2140.0, 10.0, 0.4),
        (1660.0, 60.0, 0.2),
    ];
    let scales = [0.2, 0.4, 0.6, 0.8, 1.0];

    let channels: Vec<Vec<f64>> = scales
        .iter()
        .enumerate()
        .map(|(i, &scale)| {
            let peaks: Vec<(f64, f64, f64)> = bands
                .iter()
                .map(|&(mu, sigma, depth)| (mu, sigma, depth * scale))
                .collect();
            let slope = 2e-5 * (i + 1) as f64;
            generate_channel(&wavenumbers, &peaks, slope, 0.004, &mut rng)
        })
        .collect();

    let output_path = "sample_spectra.dat";
    let file = File::create(output_path).context("creating output file")?;
    let mut out = BufWriter::new(file);
    writeln!(out, "# Synthetic optical-depth spectra, {} channels", channels.len())?;
    let names: Vec<String> = (1..=channels.len()).map(|c| format!("od_{c}")).collect();
    writeln!(out, "wavenumber\t{}", names.join("\t"))?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(out);
    for (row, &wn) in wavenumbers.iter().enumerate() {
        let mut record = Vec::with_capacity(channels.len() + 1);
        record.push(format!("{wn:.1}"));
        record.extend(channels.iter().map(|ch| format!("{:.6}", ch[row])));
        writer.write_record(&record).context("writing data row")?;
    }
    writer.flush().context("flushing output")?;

    println!(
        "Wrote {} channels ({} wavenumbers each) to {output_path}",
        channels.len(),
        wavenumbers.len()
    );
    Ok(())
}
