use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::info;

use rs_spread_core::model::alphabet::{Alphabet, Sequence};
use rs_spread_core::model::config::{BinCounts, SamplerConfig};
use rs_spread_core::model::filter::DiversityFilter;
use rs_spread_core::model::sample_set::SampleSet;
use rs_spread_core::model::sampler::Sampler;
use rs_spread_core::model::symbol_map::SymbolMap;

/// Generate a uniform spread of amino sequences.
#[derive(Parser)]
#[command(name = "rs-spread", version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    sample: SampleArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Print bucket statistics of a saved run
    Report {
        /// Snapshot written next to the output of a previous run
        snapshot: PathBuf,

        /// Also list every bin with its score-space cell
        #[arg(long)]
        per_bin: bool,
    },
}

#[derive(Args)]
struct SampleArgs {
    /// The path to the table containing all possible symbols (amino acids or codons)
    #[arg(long, default_value = "./amino.txt")]
    amino: PathBuf,

    /// Scoring tables (`symbol,score` rows), one score dimension each
    #[arg(long = "table", default_values = ["./hydro.txt", "./weight.txt"])]
    tables: Vec<PathBuf>,

    /// Optional `symbol,display` table applied to the written sequences
    #[arg(long)]
    display_map: Option<PathBuf>,

    /// The path to the output file (stdout if omitted)
    #[arg(long = "o")]
    output: Option<PathBuf>,

    /// Symbols per sequence
    #[arg(long, default_value_t = 10)]
    length: usize,

    /// Number of sequences wanted; sets the per-bin target
    #[arg(long, default_value_t = 1000)]
    count: usize,

    /// Bins per dimension: one value for all, or one per table (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "10")]
    bins: Vec<usize>,

    /// Random draws in the initial pool
    #[arg(long, default_value_t = 100_000)]
    pool_size: usize,

    /// Rebalancing iteration budget
    #[arg(long, default_value_t = 1_000_000)]
    max_iterations: usize,

    /// Iterations between convergence checks
    #[arg(long, default_value_t = 1000)]
    check_interval: usize,

    /// Random seed (drawn and logged if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Drop sequences closer than this to an already kept one
    /// (distance on scores normalized by the score-space span)
    #[arg(long)]
    min_distance: Option<f64>,

    /// Separator written between symbols
    #[arg(long, default_value = "")]
    separator: String,
}

impl SampleArgs {
    fn config(&self) -> Result<SamplerConfig> {
        let bins = match self.bins.as_slice() {
            [] => bail!("--bins needs at least one value"),
            [k] => BinCounts::Uniform(*k),
            many => BinCounts::PerDimension(many.to_vec()),
        };
        Ok(SamplerConfig {
            length: self.length,
            target_count: self.count,
            pool_size: self.pool_size,
            max_iterations: self.max_iterations,
            bins,
            seed: self.seed,
            check_interval: self.check_interval,
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Report { snapshot, per_bin }) => report(&snapshot, per_bin),
        None => sample(&cli.sample),
    }
}

fn sample(args: &SampleArgs) -> Result<()> {
    let symbols = rs_spread_core::read_symbols(&args.amino)
        .with_context(|| format!("Failed to read alphabet {}", args.amino.display()))?;
    let alphabet = Alphabet::new(symbols)?;

    let mut tables = Vec::with_capacity(args.tables.len());
    for path in &args.tables {
        let table = rs_spread_core::read_table(path).with_context(|| format!("Failed to read table {}", path.display()))?;
        tables.push(table);
    }

    let display = match &args.display_map {
        Some(path) => {
            let mapping = rs_spread_core::read_mapping(path)
                .with_context(|| format!("Failed to read display map {}", path.display()))?;
            Some(SymbolMap::new(&alphabet, &mapping)?)
        }
        None => None,
    };

    let sampler = Sampler::new(&alphabet, &tables, args.config()?)?.keep_initial_pool(args.output.is_some());
    let scorer = sampler.scorer().clone();
    let run = sampler.run()?;
    info!("Final sample: {}", run.set.stats());

    let mut sequences = run.set.sequences();
    if let Some(min_distance) = args.min_distance {
        let index = run.set.bin_index();
        let spans = index.min().iter().zip(index.max()).map(|(lo, hi)| hi - lo).collect();
        let scored = sequences
            .into_iter()
            .map(|s| scorer.score(&s).map(|score| (s, score)))
            .collect::<rs_spread_core::Result<Vec<_>>>()?;
        let before = scored.len();
        sequences = DiversityFilter::new(min_distance)?
            .with_scale(spans)
            .apply(scored)
            .into_iter()
            .map(|(s, _)| s)
            .collect();
        info!("Diversity filter kept {} of {} sequences", sequences.len(), before);
    }

    let Some(output) = &args.output else {
        for line in render(&alphabet, display.as_ref(), &sequences, &args.separator)? {
            println!("{}", line);
        }
        return Ok(());
    };

    let raw: Vec<String> = sequences.iter().map(|s| alphabet.render(s, &args.separator)).collect();
    write(output, &raw)?;

    if let Some(map) = &display {
        let mapped = render(&alphabet, Some(map), &sequences, &args.separator)?;
        write(&rs_spread_core::with_suffix(output, "-amino"), &mapped)?;
    }

    if let Some(initial) = &run.initial {
        let unfiltered: Vec<String> = initial.iter().map(|s| alphabet.render(s, &args.separator)).collect();
        write(&rs_spread_core::with_suffix(output, "-unfiltered"), &unfiltered)?;
    }

    let mut snapshot = rs_spread_core::build_output_path(output, "bin")?;
    if snapshot == *output {
        snapshot = rs_spread_core::with_suffix(output, ".bin");
    }
    run.set
        .save(&snapshot)
        .with_context(|| format!("Failed to write snapshot {}", snapshot.display()))?;
    info!("Snapshot written to {}", snapshot.display());

    Ok(())
}

fn render(
    alphabet: &Alphabet,
    display: Option<&SymbolMap>,
    sequences: &[Sequence],
    separator: &str,
) -> Result<Vec<String>> {
    match display {
        Some(map) => Ok(sequences
            .iter()
            .map(|s| map.render(s, separator))
            .collect::<rs_spread_core::Result<Vec<_>>>()?),
        None => Ok(sequences.iter().map(|s| alphabet.render(s, separator)).collect()),
    }
}

fn write(path: &Path, lines: &[String]) -> Result<()> {
    rs_spread_core::write_lines(path, lines).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} sequences to {}", lines.len(), path.display());
    Ok(())
}

fn report(path: &Path, per_bin: bool) -> Result<()> {
    let set = SampleSet::load(path).with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let config = set.config();
    let outcome = set.outcome();

    println!("Dimensions: {}", set.dimensions().join(", "));
    println!("Alphabet: {} symbols, length {}", set.alphabet().len(), config.length);
    println!("Bins: {:?} ({} total)", set.bin_index().bins(), set.bin_index().total_bins());
    println!("Seed: {}", set.seed());
    println!(
        "Iterations: {} of {} (converged: {})",
        outcome.iterations, config.max_iterations, outcome.converged
    );
    println!("Buckets: {}", set.stats());

    if per_bin {
        for (id, bucket) in set.buckets().iter().enumerate() {
            let (lower, upper) = set.bin_index().cell(id);
            println!("{:>6} {:?} {:?}..{:?} {}", id, set.bin_index().coordinates(id), lower, upper, bucket.len());
        }
    }

    Ok(())
}
