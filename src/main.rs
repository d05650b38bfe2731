//! 命令行入口
//!
//! 两个子命令：
//! - `sync`：从信号清单同步功能块数据库并导出生成产物
//! - `pack`：把接口记录打包为外部通道并导出XML与声明

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use log::info;

use fbgen::models::structs::{InterfaceRecord, Signal};
use fbgen::utils::config::GenConfig;
use fbgen::{domain, FunctionBlockRepository, SyncService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        usage();
        bail!("缺少子命令");
    };
    let flags = parse_flags(&args[1..])?;

    match command.as_str() {
        "sync" => run_sync(&flags).await,
        "pack" => run_pack(&flags),
        other => {
            usage();
            bail!("未知子命令: {}", other);
        }
    }
}

fn usage() {
    eprintln!("用法:");
    eprintln!("  fbgen sync --config <文件> --signals <文件> --db <文件> --out <目录>");
    eprintln!("  fbgen pack --config <文件> --interfaces <文件> --out <目录>");
}

fn parse_flags(args: &[String]) -> anyhow::Result<HashMap<String, String>> {
    let mut flags = HashMap::new();
    let mut iter = args.iter();
    while let Some(key) = iter.next() {
        let Some(name) = key.strip_prefix("--") else {
            bail!("无法识别的参数: {}", key);
        };
        let value = iter
            .next()
            .with_context(|| format!("参数 --{} 缺少取值", name))?;
        flags.insert(name.to_string(), value.clone());
    }
    Ok(flags)
}

fn required<'a>(flags: &'a HashMap<String, String>, name: &str) -> anyhow::Result<&'a str> {
    flags
        .get(name)
        .map(String::as_str)
        .with_context(|| format!("缺少必需参数 --{}", name))
}

async fn run_sync(flags: &HashMap<String, String>) -> anyhow::Result<()> {
    let config = GenConfig::load_from_file(required(flags, "config")?)?;
    let signals_path = required(flags, "signals")?;
    let db_path = required(flags, "db")?;
    let out_dir = PathBuf::from(required(flags, "out")?);

    let data = fs::read_to_string(signals_path)
        .with_context(|| format!("读取信号清单 {} 失败", signals_path))?;
    let signals: Vec<Signal> =
        serde_json::from_str(&data).with_context(|| format!("解析信号清单 {} 失败", signals_path))?;
    info!("载入信号 {} 条", signals.len());

    let repo = FunctionBlockRepository::connect(db_path).await?;
    let service = SyncService::new(repo, config);

    let primary = service.sync_primary_blocks(&signals).await?;
    let full = service.run_full_sync(&signals).await?;
    info!(
        "主功能块 {} 个；功能块 {} 个，变量 {} 条，跳过 {} 条",
        primary.synced_fbs, full.synced_fbs, full.synced_variables, full.skipped_signals
    );
    for issue in primary.issues.iter().chain(full.issues.iter()) {
        eprintln!("[{}] {}", issue.tag, issue.reason);
    }

    let artifacts = service.regenerate_all().await?;
    write_artifacts(&out_dir, &artifacts)?;
    info!("产物已写入 {:?}", out_dir);
    Ok(())
}

/// 声明与调用合并为单文件（位号序），XML产物逐功能块落盘
fn write_artifacts(
    out_dir: &Path,
    artifacts: &HashMap<String, HashMap<String, String>>,
) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)?;

    for (kind, file_name) in [("declaration", "declarations.st"), ("call", "calls.st")] {
        let Some(by_tag) = artifacts.get(kind) else {
            continue;
        };
        let mut tags: Vec<&String> = by_tag.keys().collect();
        tags.sort();
        let body = tags
            .iter()
            .filter_map(|t| by_tag.get(*t).map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(out_dir.join(file_name), body)?;
    }

    for kind in ["omx", "opc"] {
        let Some(by_tag) = artifacts.get(kind) else {
            continue;
        };
        let dir = out_dir.join(kind);
        fs::create_dir_all(&dir)?;
        for (tag, content) in by_tag {
            fs::write(dir.join(format!("{}.xml", tag)), content)?;
        }
    }
    Ok(())
}

fn run_pack(flags: &HashMap<String, String>) -> anyhow::Result<()> {
    let config = GenConfig::load_from_file(required(flags, "config")?)?;
    let interfaces_path = required(flags, "interfaces")?;
    let out_dir = PathBuf::from(required(flags, "out")?);

    let data = fs::read_to_string(interfaces_path)
        .with_context(|| format!("读取接口记录 {} 失败", interfaces_path))?;
    let records: Vec<InterfaceRecord> = serde_json::from_str(&data)
        .with_context(|| format!("解析接口记录 {} 失败", interfaces_path))?;
    info!("载入接口记录 {} 条", records.len());

    let result = domain::pack(&records, config.cycle_time_ms, &config.declaration);
    for err in &result.errors {
        eprintln!("{}", err);
    }

    fs::create_dir_all(&out_dir)?;
    fs::write(
        out_dir.join("outer_channels.xml"),
        domain::channel_packer::to_xml(&result.outer_channels),
    )?;
    fs::write(
        out_dir.join("declarations.st"),
        result.declarations.join("\n"),
    )?;
    fs::write(
        out_dir.join("variables.json"),
        serde_json::to_string_pretty(&result.variables)?,
    )?;
    info!(
        "外部通道 {} 个，变量 {} 条，已写入 {:?}",
        result.outer_channels.len(),
        result.variables.len(),
        out_dir
    );
    Ok(())
}
