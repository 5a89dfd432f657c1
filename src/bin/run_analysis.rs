//! Runs the party survey analysis on a CSV file and prints the resulting
//! tables.

use clap::Parser;
use log::LevelFilter;
use party_analysis::density::{DEFAULT_BANDWIDTH, DEFAULT_N_SAMPLES, DEFAULT_SEED};
use party_analysis::dimred::DEFAULT_N_COMPONENTS;
use party_analysis::preprocessing::DEFAULT_KEY_COLUMNS;
use party_analysis::{
    pipeline, AnalysisConfig, CsvLoader, Kernel, LogHandle, PreprocessConfig, ReductionMethod,
    TableLoader,
};
use std::path::PathBuf;

/// Rows printed for each table.
const PREVIEW_ROWS: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "run-analysis", version, about = "Political party survey analysis")]
struct Args {
    /// Survey CSV with a header row
    data: PathBuf,

    /// Columns dropped before analysis
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Columns moved into the row key
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_KEY_COLUMNS.map(String::from))]
    keys: Vec<String>,

    #[arg(long, default_value_t = ReductionMethod::Pca)]
    method: ReductionMethod,

    #[arg(long, default_value_t = DEFAULT_N_COMPONENTS)]
    n_components: usize,

    #[arg(long, default_value_t = Kernel::Gaussian)]
    kernel: Kernel,

    #[arg(long, default_value_t = DEFAULT_BANDWIDTH)]
    bandwidth: f64,

    #[arg(long, default_value_t = DEFAULT_N_SAMPLES)]
    n_samples: usize,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Show the reduced rows of one country
    #[arg(long, default_value = "fin")]
    country: String,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

impl Args {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig::new()
            .preprocess(
                PreprocessConfig::new()
                    .excluded_columns(self.exclude.iter().cloned())
                    .key_columns(self.keys.iter().cloned()),
            )
            .method(self.method)
            .n_components(self.n_components)
            .kernel(self.kernel)
            .bandwidth(self.bandwidth)
            .n_samples(self.n_samples)
            .seed(self.seed)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log = LogHandle::init(args.log_level);

    log.info(format_args!("Loading data from {}", args.data.display()));
    let table = CsvLoader::new(&args.data).load()?;
    let (rows, cols) = table.shape();
    log.info(format_args!("Original data has shape ({}, {})", rows, cols));

    let output = pipeline::run(&table, &args.config(), &log)?;

    println!("Reduced data:\n{}", output.reduced.head(PREVIEW_ROWS));
    println!("Samples:\n{}", output.samples.head(PREVIEW_ROWS));
    println!("Mapped samples:\n{}", output.mapped_samples.head(PREVIEW_ROWS));

    match output.filter_rows("country", args.country.as_str()) {
        Ok(subset) => println!("Parties of '{}':\n{}", args.country, subset),
        Err(e) => log.warn(format_args!("Cannot select country '{}': {}", args.country, e)),
    }

    log.info(format_args!("Analysis complete"));
    Ok(())
}
