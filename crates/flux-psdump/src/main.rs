mod dump;

use anyhow::{bail, Context};
use clap::Parser;
use dump::{DumpSummary, InfoReport, Mode};
use flux_ps::DemuxConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "FLUX PS demuxer dump tool")]
struct Args {
    /// 解封装配置文件 (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Mode::File)]
    mode: Mode,

    /// stream/packet 模式每次读取的字节数
    #[arg(long, default_value_t = 4096)]
    chunk_size: usize,

    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// 只输出编码参数，不写基本流
    #[arg(long)]
    info: bool,

    /// 打印生效的配置后退出
    #[arg(long)]
    print_config: bool,

    inputs: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Report {
    Dump(DumpSummary),
    Info(InfoReport),
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DemuxConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                info!("Config file {} not found, using defaults", path.display());
            }
            DemuxConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => Ok(DemuxConfig::default()),
    }
}

fn process_input(
    input: &Path,
    config: &DemuxConfig,
    mode: Mode,
    chunk_size: usize,
    out_dir: &Path,
    info_only: bool,
) -> anyhow::Result<Report> {
    if info_only {
        dump::probe_file(input, config).map(Report::Info)
    } else {
        dump::dump_file(input, config, mode, chunk_size, out_dir).map(Report::Dump)
    }
}

/// 每个输入一个会话，在阻塞线程池中并行处理
async fn run(args: Args, config: DemuxConfig) -> anyhow::Result<Vec<(PathBuf, anyhow::Result<Report>)>> {
    if !args.info {
        tokio::fs::create_dir_all(&args.out_dir)
            .await
            .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;
    }

    let mut tasks = Vec::with_capacity(args.inputs.len());
    for input in args.inputs {
        let config = config.clone();
        let out_dir = args.out_dir.clone();
        let (mode, chunk_size, info_only) = (args.mode, args.chunk_size, args.info);
        let path = input.clone();
        let task = tokio::task::spawn_blocking(move || {
            process_input(&path, &config, mode, chunk_size, &out_dir, info_only)
        });
        tasks.push((input, task));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for (input, task) in tasks {
        results.push((input, task.await?));
    }
    Ok(results)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志输出到 stderr，stdout 只保留 JSON 结果
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    if args.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }
    if args.inputs.is_empty() {
        bail!("No input files");
    }
    if args.chunk_size == 0 {
        bail!("--chunk-size must be greater than 0");
    }

    let total = args.inputs.len();
    let mut failed = 0;
    for (input, result) in run(args, config).await? {
        match result {
            Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            Err(e) => {
                error!("{}: {:#}", input.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} inputs failed", failed, total);
    }
    Ok(())
}
