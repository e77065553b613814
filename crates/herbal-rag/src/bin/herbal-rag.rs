//! herbal-rag command line
//!
//! Run with: cargo run -p herbal-rag -- chat

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herbal_rag::providers::{EmbeddingProvider, LocalVectorIndex, OllamaEmbedder};
use herbal_rag::{AnswerEngine, RagConfig, StructuringPipeline};

#[derive(Parser, Debug)]
#[command(
    name = "herbal-rag",
    version,
    about = "Ask questions about medicinal plants, diseases, and remedies"
)]
struct Cli {
    /// TOML config file (defaults to $HERBAL_RAG_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive question loop; type `quit` or `exit` to leave
    Chat,
    /// Answer a single question and exit
    Ask {
        /// The question
        question: String,
    },
    /// Structure the corpus with the model and rebuild the vector index
    Ingest,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herbal_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = RagConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - API keys: {}", config.llm.api_keys.len());
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Vector index: {}", config.vector_db.storage_path.display());

    match cli.command {
        Command::Chat => chat(&config).await,
        Command::Ask { question } => {
            let engine = open_engine(&config).await?;
            let answer = engine.answer(&question).await;
            println!("{}", answer);
            Ok(())
        }
        Command::Ingest => ingest(&config).await,
    }
}

async fn open_engine(config: &RagConfig) -> Result<AnswerEngine> {
    AnswerEngine::from_config(config)
        .await
        .context("failed to initialize the answering engine; run `herbal-rag ingest` first")
}

async fn chat(config: &RagConfig) -> Result<()> {
    let engine = open_engine(config).await?;

    println!("Hệ thống hỏi đáp về cây thuốc, bệnh và lời khuyên sức khỏe.");
    println!("Gõ 'quit' hoặc 'exit' để thoát.\n");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all("Câu hỏi: ".as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();

        if question.eq_ignore_ascii_case("quit") || question.eq_ignore_ascii_case("exit") {
            break;
        }
        if question.is_empty() {
            println!("Vui lòng nhập câu hỏi!");
            continue;
        }

        println!("\nĐang tìm kiếm thông tin...");
        let answer = engine.answer(question).await;
        println!("\nTrả lời: {}\n", answer);
    }

    println!("Tạm biệt!");
    Ok(())
}

async fn ingest(config: &RagConfig) -> Result<()> {
    let pipeline = StructuringPipeline::from_config(config).context("failed to build the model client")?;
    let report = pipeline
        .process_corpus(&config.corpus)
        .await
        .context("corpus structuring failed")?;

    println!("\nĐã xử lý:");
    for outcome in &report.outcomes {
        println!(
            "  {} ({} tệp, {} đoạn, {} bỏ qua):",
            outcome.category.display_name(),
            outcome.processed.len(),
            outcome.chunks.len(),
            outcome.skipped.len()
        );
        for file in &outcome.processed {
            println!("    - {}", file);
        }
        for skipped in &outcome.skipped {
            println!("    ! {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    let chunks = report.into_chunks();
    if chunks.is_empty() {
        anyhow::bail!("no chunks produced; check the corpus folders under {}", config.corpus.data_dir.display());
    }

    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(OllamaEmbedder::new(&config.embeddings).context("failed to build the embedder")?);
    let index = LocalVectorIndex::build(&config.vector_db.storage_path, embedder, &chunks)
        .await
        .context("failed to build the vector index")?;

    println!(
        "\nĐã lưu {} đoạn vào {}",
        index.manifest().count,
        index.path().display()
    );
    Ok(())
}
