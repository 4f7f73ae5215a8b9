use std::fs::File;

use anyhow::Context;
use bulk_mailer::{read_records, SendReport};
use clap::Parser;

#[derive(Parser, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default)]
#[command(author, version, about)]
/// Prints the rows of a send log followed by the totals per status
struct Cli {
    /// Specifies the send log to be read in
    #[arg(value_name = "PATH", default_value = "logs/send_log.csv")]
    log_filename: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let file = File::open(&cli.log_filename)
        .with_context(|| format!("Failed to open {:?}", cli.log_filename))?;
    let mut report = SendReport::default();
    for record in read_records(file)? {
        report.add(record.status);
        println!(
            "{} {:<7} {} {}",
            record.timestamp, record.status, record.email, record.error
        );
    }
    println!("{report}");
    Ok(())
}
