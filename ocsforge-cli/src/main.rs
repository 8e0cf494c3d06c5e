use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;

use ocsforge_core::config::OcsforgeConfig;
use ocsforge_core::event::IngestRecord;
use ocsforge_core::pipeline::{DecodedInput, RecordSink};
use ocsforge_transform::{
    BatchOutcome, PreprocessorRegistry, TransformEngine, group_partitions,
};

mod logging;
mod sink;

use sink::DirSink;

/// Ocsforge CLI — OCSF 변환 파이프라인 명령줄 도구
#[derive(Parser)]
#[command(name = "ocsforge", version, about)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, default_value = "ocsforge.toml")]
    config: PathBuf,

    /// 로그 레벨 오버라이드 (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// 로그 형식 오버라이드 (json, pretty)
    #[arg(long)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 입력 파일(한 줄에 레코드 하나)을 배치 변환하여 파티션별로 기록
    Transform {
        /// 입력 파일 경로
        #[arg(short, long)]
        input: PathBuf,

        /// 출력 디렉토리 (설정의 transform.output_dir 오버라이드)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 모든 줄을 이 소스로 귀속 (소스 판별 생략)
        #[arg(long, conflicts_with_all = ["bucket", "key", "stream"])]
        source: Option<String>,

        /// 스토리지 판별용 버킷 이름 (--key와 함께 사용)
        #[arg(long, requires = "key")]
        bucket: Option<String>,

        /// 스토리지 판별용 오브젝트 키
        #[arg(long, requires = "bucket")]
        key: Option<String>,

        /// 각 줄을 스트림 페이로드로 취급 (메타데이터 필드로 판별)
        #[arg(long)]
        stream: bool,
    },
    /// 레지스트리와 매핑 문서를 로드하고 검증 결과를 출력
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = OcsforgeConfig::load(&cli.config)
        .await
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    // CLI 인자가 최우선
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format = format.clone();
    }
    config.validate()?;

    logging::init_tracing(&config.general)?;
    tracing::info!(config = %cli.config.display(), "ocsforge-cli starting");

    let engine = Arc::new(
        TransformEngine::load(
            &config.transform,
            PreprocessorRegistry::with_defaults(),
            config.user_defined_values(),
        )
        .await
        .context("failed to load transform engine")?,
    );

    match cli.command {
        Commands::Transform {
            input,
            output,
            source,
            bucket,
            key,
            stream,
        } => {
            let output_dir =
                output.unwrap_or_else(|| PathBuf::from(&config.transform.output_dir));
            run_transform(engine, input, output_dir, source, bucket, key, stream).await
        }
        Commands::Validate => run_validate(&engine),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_transform(
    engine: Arc<TransformEngine>,
    input: PathBuf,
    output_dir: PathBuf,
    source: Option<String>,
    bucket: Option<String>,
    key: Option<String>,
    stream: bool,
) -> Result<()> {
    let content = tokio::fs::read_to_string(&input)
        .await
        .with_context(|| format!("failed to read input file {}", input.display()))?;
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    tracing::info!(lines = lines.len(), input = %input.display(), "read input batch");

    let outcome = if let Some(source) = source {
        // 직접 모드: 소스 판별을 생략하고 모든 줄을 지정 소스로 처리
        let mut outcome = BatchOutcome::new();
        for line in &lines {
            outcome.push(
                engine.preprocess_and_transform(&source, DecodedInput::Raw((*line).to_owned())),
            );
        }
        outcome
    } else {
        let records: Vec<IngestRecord> = match (&bucket, &key, stream) {
            (Some(bucket), Some(key), false) => lines
                .iter()
                .map(|line| {
                    IngestRecord::from_storage(
                        (*line).to_owned().into(),
                        bucket.as_str(),
                        key.as_str(),
                    )
                })
                .collect(),
            (None, None, true) => lines
                .iter()
                .map(|line| IngestRecord::from_stream((*line).to_owned().into(), "cli"))
                .collect(),
            _ => bail!("specify --source, --bucket/--key, or --stream"),
        };
        engine.process_batch(records).await
    };

    let mapped_count = outcome.mapped.len();
    let unmapped_count = outcome.unmapped.len();
    let unroutable_count = outcome.unroutable;

    let sink = DirSink::new(&output_dir);
    let partitions = group_partitions(outcome.mapped, |s| engine.is_multischema(s));
    for (partition, records) in &partitions {
        sink.write_mapped(partition, records)?;
    }
    sink.write_unmapped(&outcome.unmapped)?;

    println!(
        "{} {} mapped, {} unmapped, {} unroutable -> {}",
        "done:".green().bold(),
        mapped_count.to_string().green(),
        unmapped_count.to_string().yellow(),
        unroutable_count.to_string().red(),
        output_dir.display(),
    );

    Ok(())
}

fn run_validate(engine: &TransformEngine) -> Result<()> {
    println!("{}", "source registry".bold());
    for name in engine.source_names() {
        match engine.document(name) {
            Some(document) => {
                let multischema = if engine.is_multischema(name) {
                    "multi-schema"
                } else {
                    "single-schema"
                };
                println!(
                    "  {} {name}: {} mappings ({multischema})",
                    "ok".green(),
                    document.mappings.len(),
                );
            }
            None => {
                println!("  {} {name}: mapping document not loaded", "--".yellow());
            }
        }
    }

    println!(
        "{} {} sources, {} documents, {} storage rules, {} stream rules",
        "done:".green().bold(),
        engine.source_names().len(),
        engine.document_count(),
        engine.detector().storage_rule_count(),
        engine.detector().stream_rule_count(),
    );

    Ok(())
}
