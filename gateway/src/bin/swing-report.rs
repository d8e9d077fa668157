use std::path::PathBuf;

use gateway::{QueryParams, SwingSelector, envelope, segment_report, swing_reports};

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// Swing container (or flat capture with --segment)
    #[arg(
        default_value_os_t = std::env::current_dir().unwrap_or_default().join("swings.json"),
        required = false
    )]
    pub input: PathBuf,
    /// Report every stored swing instead of the latest
    #[arg(short, long, default_value_t = false, required = false)]
    pub all: bool,
    /// Report the swing at this container index
    #[arg(short, long)]
    pub index: Option<usize>,
    /// Treat the input as a flat capture and report its segments
    #[arg(short, long, default_value_t = false, required = false)]
    pub segment: bool,
    /// Append each detected segment to this container
    #[arg(long)]
    pub segment_out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Args {
        input,
        all,
        index,
        segment,
        segment_out,
    } = <Args as clap::Parser>::parse();

    let params = QueryParams {
        swing: match (all, index) {
            (true, _) => SwingSelector::All,
            (false, Some(index)) => SwingSelector::Index(index),
            (false, None) => SwingSelector::Latest,
        },
        ..QueryParams::default()
    };

    let response = match (segment, segment_out) {
        (true, Some(output)) => envelope(gateway::export_segments(&input, &output, &params)),
        (true, None) => envelope(segment_report(&input, &params)),
        (false, _) => envelope(swing_reports(&input, &params)),
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
