use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use gowab_glosser::{NoDetection, Pipeline};
use gowab_protocol::{dictionary, Dictionary, Document, GraphError, RawLemmaRow};
use gowab_segmenter::SegmenterConfig;
use rkyv::ser::{serializers::AllocSerializer, Serializer};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "Batch interlinear glossing for Khoekhoe field recordings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compiles a JSON dictionary export to the binary artifact the glosser loads
    CompileDict {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Glosses every JSON document in a directory
    Gloss {
        #[arg(short, long, value_name = "DIR")]
        input: PathBuf,

        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        dictionary: PathBuf,

        /// Segmenter rule-table overrides (JSON); defaults are built in
        #[arg(long, value_name = "FILE")]
        segmenter_config: Option<PathBuf>,

        /// Capitalized-word list, one word per line; discoveries are appended
        #[arg(long, value_name = "FILE")]
        capitalized_words: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::CompileDict { input, output } => compile_dict(&input, &output),
        Command::Gloss {
            input,
            output,
            dictionary,
            segmenter_config,
            capitalized_words,
        } => gloss_directory(
            &input,
            &output,
            &dictionary,
            segmenter_config.as_deref(),
            capitalized_words.as_deref(),
        ),
    }
}

fn compile_dict(input: &Path, output: &Path) -> anyhow::Result<()> {
    let data = fs::read_to_string(input)?;
    let rows: Vec<RawLemmaRow> = serde_json::from_str(&data)?;
    let dict = dictionary::validate_rows(&rows)?;
    info!(lemmas = dict.lemmas.len(), "compiled glossing dictionary");

    let mut serializer = AllocSerializer::<256>::default();
    serializer
        .serialize_value(&dict)
        .expect("Failed to rkyv serialize");
    let bytes = serializer.into_serializer().into_inner();

    fs::write(output, bytes)?;
    info!(output = %output.display(), "dictionary artifact written");
    Ok(())
}

fn gloss_directory(
    input: &Path,
    output: &Path,
    dictionary_path: &Path,
    config_path: Option<&Path>,
    capitalized_path: Option<&Path>,
) -> anyhow::Result<()> {
    let bytes = fs::read(dictionary_path)?;
    let dict: Dictionary = rkyv::from_bytes(&bytes)
        .map_err(|err| anyhow::anyhow!("dictionary artifact is invalid: {err}"))?;

    let config: SegmenterConfig = match config_path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => SegmenterConfig::default(),
    };
    let known: HashSet<String> = match capitalized_path {
        Some(path) if path.exists() => fs::read_to_string(path)?
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect(),
        _ => HashSet::new(),
    };

    let mut pipeline = Pipeline::new(&dict, config, NoDetection, known);
    fs::create_dir_all(output)?;

    let mut documents: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    documents.sort();

    for path in documents {
        let mut doc: Document = match serde_json::from_str(&fs::read_to_string(&path)?) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(file = %path.display(), %err, "unreadable document, skipping");
                continue;
            }
        };
        let fresh = match pipeline.process_document(&mut doc) {
            Ok(fresh) => fresh,
            Err(err @ GraphError::TierMismatch { .. }) => {
                warn!(file = %path.display(), %err, "skipping document");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let Some(name) = path.file_name() else { continue };
        fs::write(output.join(name), serde_json::to_string_pretty(&doc)?)?;

        // the shared capitalized-word list is persisted after each document
        if let (Some(cap_path), false) = (capitalized_path, fresh.is_empty()) {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(cap_path)?;
            for word in &fresh {
                writeln!(file, "{word}")?;
            }
        }
        info!(file = %path.display(), "glossed");
    }
    Ok(())
}
