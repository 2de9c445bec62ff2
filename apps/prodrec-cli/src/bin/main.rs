//! prodrec: train, query and evaluate the product recommender.
//!
//! Usage:
//!   prodrec train
//!   prodrec recommend <pid> --k 5 --output recs.csv
//!   prodrec score --report report.csv
//!   prodrec normalize "123 The Quick Brown Fox"

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use prodrec_core::config::{Config, DataSettings, Settings, StoreBackend};
use prodrec_core::traits::{Embedder, VectorStoreBuilder};
use prodrec_core::Dataset;
use prodrec_embed::build_embedder;
use prodrec_recommend::Recommender;
use prodrec_text::TextNormalizer;
use prodrec_vector::{LanceStoreBuilder, LanceVectorStore, MemoryStoreBuilder};

#[derive(Parser)]
#[command(name = "prodrec")]
#[command(about = "Content-based product recommendations", long_about = None)]
struct Cli {
    /// Config file (defaults to ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Product CSV, overriding `data.dataset`
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed the catalogue and build the vector store
    Train,
    /// Recommend products similar to a pid
    Recommend {
        pid: String,
        #[arg(long)]
        k: Option<usize>,
        /// Write recommendations to this CSV instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Mean top-level category agreement over the whole catalogue
    Score {
        #[arg(long)]
        k: Option<usize>,
        /// Write the per-product breakdown to this CSV
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the normalized form of a text
    Normalize { text: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prodrec=info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Commands::Normalize { text } = &cli.command {
        println!("{}", TextNormalizer::new()?.normalize(text));
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;

    let dataset_path = cli.dataset.clone().unwrap_or_else(|| config.resolve(&settings.data.dataset));
    let data = load_dataset(&dataset_path, &settings.data)?;
    let embedder = build_embedder(&settings.embedding, &config.resolve(&settings.embedding.model_dir))?;

    let metric = settings.store.metric;
    tracing::info!(backend = ?settings.store.backend, ?metric, dataset = %dataset_path.display(), rows = data.len(), "starting prodrec");
    match settings.store.backend {
        StoreBackend::Memory => {
            run(cli.command, data, embedder, &settings, MemoryStoreBuilder::new(metric), |_| Ok(None))
        }
        StoreBackend::Lance => {
            let db_path = config.resolve(&settings.store.lance_dir);
            let table = settings.store.table.clone();
            let builder = LanceStoreBuilder::new(db_path.clone(), &table, metric);
            run(cli.command, data, embedder, &settings, builder, move |embedder| {
                if !db_path.join(format!("{table}.lance")).exists() {
                    return Ok(None);
                }
                Ok(Some(LanceVectorStore::open(&db_path, &table, embedder, metric)?))
            })
        }
    }
}

fn load_dataset(path: &Path, settings: &DataSettings) -> Result<Dataset> {
    let mut data = Dataset::from_csv_path(path)?;
    if !settings.combine_columns.is_empty() {
        data = data.with_combined_text(&settings.combine_columns, " ")?;
    }
    data.validate()?;
    Ok(data)
}

/// `open_existing` yields a previously persisted store, if the backend has one.
fn run<B, F>(command: Commands, data: Dataset, embedder: Arc<dyn Embedder>, settings: &Settings, builder: B, open_existing: F) -> Result<()>
where
    B: VectorStoreBuilder,
    F: FnOnce(Arc<dyn Embedder>) -> Result<Option<B::Store>>,
{
    let metadatas = data.metadatas(&settings.data.metadata_columns);
    let mut rec = Recommender::new(data, metadatas, Arc::clone(&embedder), builder)?;
    rec.set_k(settings.recommender.k);

    match command {
        Commands::Train => {
            rec.train()?;
            println!("✅ Trained on {} products", rec.data().len());
        }
        Commands::Recommend { pid, k, output } => {
            attach_store(&mut rec, open_existing(embedder)?)?;
            if let Some(k) = k { rec.set_k(k); }
            let recommendations = rec.predict(rec.data(), &pid)?;
            match output {
                Some(path) => {
                    write_rows(csv::Writer::from_path(&path)?, &recommendations)?;
                    println!("Wrote {} recommendations to {}", recommendations.len(), path.display());
                }
                None => write_rows(csv::Writer::from_writer(io::stdout()), &recommendations)?,
            }
        }
        Commands::Score { k, report } => {
            attach_store(&mut rec, open_existing(embedder)?)?;
            if let Some(k) = k { rec.set_k(k); }
            let evaluation = rec.evaluate(rec.data())?;
            if let Some(path) = report {
                write_rows(csv::Writer::from_path(&path)?, &evaluation.rows)?;
                println!("Wrote per-product report to {}", path.display());
            }
            println!("score (k={}): {:.4}", rec.k(), evaluation.mean);
        }
        Commands::Normalize { text } => println!("{}", TextNormalizer::new()?.normalize(&text)),
    }
    Ok(())
}

fn attach_store<B: VectorStoreBuilder>(rec: &mut Recommender<B>, existing: Option<B::Store>) -> Result<()> {
    match existing {
        Some(store) => { rec.set_vectorstore(store); }
        None => rec.train()?,
    }
    Ok(())
}

fn write_rows<W: io::Write, T: Serialize>(mut writer: csv::Writer<W>, rows: &[T]) -> Result<()> {
    for row in rows { writer.serialize(row)?; }
    writer.flush()?;
    Ok(())
}
