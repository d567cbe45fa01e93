//! Command-line interface definitions and argument parsing.

use clap::{Parser, ValueEnum};

/// Customer segmentation analytics over arbitrary CSV data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long)]
    pub input: Option<String>,

    /// Generate a synthetic sample dataset with this many customers instead
    /// of reading a file
    #[arg(short, long, value_name = "COUNT")]
    pub sample: Option<usize>,

    /// Seed for clustering initialization and sample generation; omit for an
    /// entropy-seeded run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum iterations for K-Means convergence
    #[arg(long, default_value = "100")]
    pub max_iters: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Csv(String),
    Sample(usize),
}

impl Args {
    /// Resolve the dataset source from `--input` / `--sample`.
    pub fn source(&self) -> crate::Result<DataSource> {
        match (&self.input, self.sample) {
            (Some(_), Some(_)) => {
                anyhow::bail!("--input and --sample are mutually exclusive")
            }
            (Some(path), None) => Ok(DataSource::Csv(path.clone())),
            (None, Some(count)) => {
                if count == 0 {
                    anyhow::bail!("--sample must be at least 1");
                }
                Ok(DataSource::Sample(count))
            }
            (None, None) => anyhow::bail!("either --input <FILE> or --sample <COUNT> is required"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            input: None,
            sample: None,
            seed: None,
            max_iters: 100,
            format: OutputFormat::Text,
            verbose: false,
        }
    }

    #[test]
    fn test_source_resolution() {
        let mut a = args();
        assert!(a.source().is_err());

        a.input = Some("data.csv".to_string());
        assert_eq!(a.source().unwrap(), DataSource::Csv("data.csv".to_string()));

        a.sample = Some(100);
        assert!(a.source().is_err());

        a.input = None;
        assert_eq!(a.source().unwrap(), DataSource::Sample(100));

        a.sample = Some(0);
        assert!(a.source().is_err());
    }
}
