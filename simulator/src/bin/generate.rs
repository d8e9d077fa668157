use std::{collections::BTreeMap, path::PathBuf};

use rand::{SeedableRng, rngs::StdRng};
use simulator::simulate_swing;
use swing_store::SwingRecord;

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// Output container file
    #[arg(
        default_value_os_t = std::env::current_dir().unwrap_or_default().join("swings.json"),
        required = false
    )]
    pub output: PathBuf,
    /// Number of swings to generate
    #[arg(short, long, default_value_t = 1, required = false)]
    pub count: usize,
    /// Samples per swing
    #[arg(short, long, default_value_t = 500, required = false)]
    pub samples: usize,
    /// Swing duration in seconds
    #[arg(short, long, default_value_t = 5.0, required = false)]
    pub duration: f64,
    /// Seed for reproducible swings
    #[arg(long)]
    pub seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Args {
        output,
        count,
        samples,
        duration,
        seed,
    } = <Args as clap::Parser>::parse();

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    for _ in 0..count {
        let swing = simulate_swing(&mut rng, samples, duration);

        let generated_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)?;
        let metadata = BTreeMap::from([
            (String::from("generated_at"), serde_json::json!(generated_at)),
            (String::from("num_samples"), serde_json::json!(samples)),
            (String::from("total_duration_s"), serde_json::json!(duration)),
            (String::from("sim_profile"), serde_json::to_value(&swing.meta)?),
        ]);

        let stored = swing_store::append(
            &output,
            &SwingRecord {
                metadata,
                samples: swing.samples,
            },
        )?;
        println!(
            "appended {:?} swing to {} ({stored} stored)",
            swing.meta.profile,
            output.display()
        );
    }

    Ok(())
}
