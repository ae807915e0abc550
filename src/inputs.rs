//! # N-Body Input Generation
//!
//! Writes the random body sets the N-body engine is benchmarked with. Each
//! file `input_{n}.txt` starts with the body count on its own line, followed
//! by one `m x y vx vy` line per body:
//!
//! | Field | Distribution | Format |
//! |-------|--------------|--------|
//! | `m` | `U(7e22, 1e27)` kg | `7.123456e+22` |
//! | `x`, `y` | `U(-1.5e12, 1.5e12)` m | six decimals |
//! | `vx`, `vy` | `U(-5e4, 5e4)` m/s | six decimals |

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const MASS_RANGE: Range<f64> = 7e22..1e27;
pub const POSITION_RANGE: Range<f64> = -1.5e12..1.5e12;
pub const VELOCITY_RANGE: Range<f64> = -5e4..5e4;

/// `input_{n}.txt`
pub fn input_file_name(n: usize) -> String {
    format!("input_{}.txt", n)
}

/// Scientific notation with six decimals and a signed, two-digit exponent
pub fn format_sci(value: f64) -> String {
    let formatted = format!("{:.6e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}

/// Write a body count line followed by `n` random bodies
pub fn write_bodies<W: Write, R: Rng>(writer: &mut W, n: usize, rng: &mut R) -> std::io::Result<()> {
    writeln!(writer, "{}", n)?;
    for _ in 0..n {
        let m = rng.gen_range(MASS_RANGE);
        let x = rng.gen_range(POSITION_RANGE);
        let y = rng.gen_range(POSITION_RANGE);
        let vx = rng.gen_range(VELOCITY_RANGE);
        let vy = rng.gen_range(VELOCITY_RANGE);
        writeln!(writer, "{} {:.6} {:.6} {:.6} {:.6}", format_sci(m), x, y, vx, vy)?;
    }
    Ok(())
}

/// Write `{dir}/input_{n}.txt` and return its path
pub fn generate_input_file<R: Rng>(dir: &Path, n: usize, rng: &mut R) -> Result<PathBuf> {
    let path = dir.join(input_file_name(n));
    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;

    let mut writer = BufWriter::new(file);
    write_bodies(&mut writer, n, rng).with_context(|| format!("Failed to write {:?}", path))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {:?}", path))?;

    debug!("Wrote {} bodies to {:?}", n, path);
    Ok(path)
}

/// Generate one input file per size, creating `dir` if needed
///
/// With a `seed` the output is reproducible; otherwise the generator is
/// seeded from system entropy.
pub fn generate_inputs(dir: &Path, sizes: &[usize], seed: Option<u64>) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut written = Vec::with_capacity(sizes.len());
    for &n in sizes {
        let path = generate_input_file(dir, n, &mut rng)?;
        info!("File {:?} created", path);
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sci_matches_printf() {
        assert_eq!(format_sci(7.123456e22), "7.123456e+22");
        assert_eq!(format_sci(1e27), "1.000000e+27");
        assert_eq!(format_sci(1.5e-3), "1.500000e-03");
        assert_eq!(format_sci(2.0), "2.000000e+00");
    }

    #[test]
    fn test_write_bodies_layout_and_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut buffer = Vec::new();
        write_bodies(&mut buffer, 50, &mut rng).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("50"));

        let bodies: Vec<&str> = lines.collect();
        assert_eq!(bodies.len(), 50);
        for line in bodies {
            let fields: Vec<f64> = line.split(' ').map(|f| f.parse().unwrap()).collect();
            assert_eq!(fields.len(), 5);
            assert!(fields[0] >= 7e22 && fields[0] <= 1e27);
            assert!(fields[1].abs() <= 1.5e12 && fields[2].abs() <= 1.5e12);
            assert!(fields[3].abs() <= 5e4 && fields[4].abs() <= 5e4);
            assert!(line.split(' ').nth(1).unwrap().split('.').nth(1).unwrap().len() == 6);
        }
    }

    #[test]
    fn test_generate_inputs_writes_one_file_per_size() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Inputs");

        let paths = generate_inputs(&target, &[4, 8], Some(1)).unwrap();

        assert_eq!(paths, vec![target.join("input_4.txt"), target.join("input_8.txt")]);
        let text = std::fs::read_to_string(&paths[1]).unwrap();
        assert_eq!(text.lines().count(), 9);
        assert!(text.starts_with("8\n"));
    }

    #[test]
    fn test_seed_makes_output_reproducible() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();

        let first = generate_inputs(a.path(), &[16], Some(7)).unwrap();
        let second = generate_inputs(b.path(), &[16], Some(7)).unwrap();

        assert_eq!(
            std::fs::read_to_string(&first[0]).unwrap(),
            std::fs::read_to_string(&second[0]).unwrap()
        );
    }
}
