/// 信号同步服务
///
/// 两遍式同步：第一遍按位号分类把信号落成功能块与变量记录，
/// 第二遍对本次触达的功能块加载完整变量集并重新生成四种产物。
/// 拆成两遍是因为同一功能块的信号在输入表中可能相距很远，
/// 生成必须等该块的全部绑定就位。
///
/// 整次运行在单个事务内执行；逐条问题收集进汇总而不中止运行。
use std::collections::HashMap;

use chrono::Utc;
use log::{info, warn};
use sea_orm::DatabaseTransaction;

use crate::domain::emitters::{emit_call, emit_declaration, emit_omx, emit_opc};
use crate::domain::{classify, direction_for, resolve_address};
use crate::infrastructure::FunctionBlockRepository;
use crate::models::structs::{
    default_id, FbVariable, FunctionBlock, Signal, SyncIssue, SyncSummary,
};
use crate::utils::config::GenConfig;
use crate::utils::error::AppResult;

pub struct SyncService {
    repo: FunctionBlockRepository,
    config: GenConfig,
}

impl SyncService {
    pub fn new(repo: FunctionBlockRepository, config: GenConfig) -> Self {
        Self { repo, config }
    }

    /// 从信号表全量同步功能块
    pub async fn run_full_sync(&self, signals: &[Signal]) -> AppResult<SyncSummary> {
        let mut summary = SyncSummary {
            started_at: Some(Utc::now()),
            ..Default::default()
        };
        let txn = self.repo.begin().await?;

        // 第一遍：分类、绑定、落库
        // 缓存 功能块位号 -> 主键，兼作本次触达集合
        let mut fb_cache: HashMap<String, String> = HashMap::new();
        let mut touched: Vec<String> = Vec::new();

        for signal in signals {
            let Some(parts) = classify(&signal.tag) else {
                summary.issues.push(SyncIssue {
                    tag: signal.tag.clone(),
                    reason: "位号不符合命名约定，无法拆分".to_string(),
                });
                continue;
            };

            let Some(type_cfg) = self.config.function_blocks.get(&signal.fb_type) else {
                // 未配置的类型不是错误，静默跳过
                summary.skipped_signals += 1;
                continue;
            };
            let Some(direction) = direction_for(&parts.func_attr, type_cfg) else {
                summary.skipped_signals += 1;
                continue;
            };

            let address = self.resolve_signal_address(signal, &mut summary);

            let fb_id = match fb_cache.get(&parts.fb_tag) {
                Some(id) => id.clone(),
                None => {
                    let mut fb = FunctionBlock::new(&parts.fb_tag, &signal.fb_type);
                    fb.system = signal.system.clone();
                    fb.node_ref = signal.node_ref.clone();
                    fb.equipment = signal.equipment.clone();
                    let id = match self.repo.upsert_function_block(&txn, &fb).await {
                        Ok(id) => id,
                        Err(e) => {
                            summary.issues.push(SyncIssue {
                                tag: parts.fb_tag.clone(),
                                reason: format!("写入功能块失败: {}", e),
                            });
                            continue;
                        }
                    };
                    summary.synced_fbs += 1;
                    touched.push(parts.fb_tag.clone());
                    fb_cache.insert(parts.fb_tag.clone(), id.clone());
                    id
                }
            };

            let variable = FbVariable {
                id: default_id(),
                fb_id,
                direction,
                signal_tag: signal.tag.clone(),
                func_attr: parts.func_attr.clone(),
                cds_type: signal.category.to_string(),
                address,
            };
            match self.repo.upsert_variable(&txn, &variable).await {
                Ok(_) => summary.synced_variables += 1,
                Err(e) => summary.issues.push(SyncIssue {
                    tag: signal.tag.clone(),
                    reason: format!("写入变量失败: {}", e),
                }),
            }
        }

        // 第二遍：对触达的功能块重新生成全部产物
        for fb_tag in &touched {
            if let Err(e) = self.regenerate_one(&txn, fb_tag).await {
                summary.issues.push(SyncIssue {
                    tag: fb_tag.clone(),
                    reason: format!("生成产物失败: {}", e),
                });
            }
        }

        txn.commit().await?;
        info!(
            "同步完成: 功能块 {} 个, 变量 {} 条, 跳过 {} 条, 问题 {} 条",
            summary.synced_fbs,
            summary.synced_variables,
            summary.skipped_signals,
            summary.issues.len()
        );
        Ok(summary)
    }

    /// 同步主功能块
    ///
    /// 信号类别本身配置为功能块类型时（如模拟量通道块），
    /// 信号即是功能块：位号不拆分，直接以信号位号建主块，
    /// 注释取安装位置说明。
    pub async fn sync_primary_blocks(&self, signals: &[Signal]) -> AppResult<SyncSummary> {
        let mut summary = SyncSummary {
            started_at: Some(Utc::now()),
            ..Default::default()
        };
        let txn = self.repo.begin().await?;

        for signal in signals {
            let category = signal.category.to_string();
            if !self.config.function_blocks.contains_key(&category) {
                summary.skipped_signals += 1;
                continue;
            }

            let mut fb = FunctionBlock::new(&signal.tag, &category);
            fb.name = signal.name.clone();
            fb.system = signal.system.clone();
            fb.node_ref = signal.node_ref.clone();
            fb.equipment = signal.equipment.clone();
            fb.primary = true;
            fb.address = self.resolve_signal_address(signal, &mut summary);
            fb.comment = signal.placement_comment();

            match self.repo.upsert_function_block(&txn, &fb).await {
                Ok(_) => summary.synced_fbs += 1,
                Err(e) => {
                    summary.issues.push(SyncIssue {
                        tag: signal.tag.clone(),
                        reason: format!("写入主功能块失败: {}", e),
                    });
                    continue;
                }
            }
            if let Err(e) = self.regenerate_one(&txn, &signal.tag).await {
                summary.issues.push(SyncIssue {
                    tag: signal.tag.clone(),
                    reason: format!("生成产物失败: {}", e),
                });
            }
        }

        txn.commit().await?;
        Ok(summary)
    }

    /// 按当前配置重新生成库中全部功能块的产物
    ///
    /// 返回 产物种类 -> (位号 -> 内容)，种类键为
    /// declaration/call/omx/opc；生成失败的功能块记日志后跳过。
    pub async fn regenerate_all(&self) -> AppResult<HashMap<String, HashMap<String, String>>> {
        let mut declarations = HashMap::new();
        let mut calls = HashMap::new();
        let mut omx_files = HashMap::new();
        let mut opc_files = HashMap::new();

        for fb in self.repo.list_all_with_variables().await? {
            let artifacts = match self.generate_artifacts(&fb) {
                Ok(a) => a,
                Err(e) => {
                    warn!("功能块 {} 重新生成失败: {}", fb.tag, e);
                    continue;
                }
            };
            self.repo
                .update_artifacts(
                    self.repo.connection(),
                    &fb.tag,
                    &artifacts.declaration,
                    &artifacts.call,
                    &artifacts.omx,
                    &artifacts.opc,
                )
                .await?;

            let tag = fb.tag;
            declarations.insert(tag.clone(), artifacts.declaration);
            calls.insert(tag.clone(), artifacts.call);
            omx_files.insert(tag.clone(), artifacts.omx);
            opc_files.insert(tag, artifacts.opc);
        }

        Ok(HashMap::from([
            ("declaration".to_string(), declarations),
            ("call".to_string(), calls),
            ("omx".to_string(), omx_files),
            ("opc".to_string(), opc_files),
        ]))
    }

    /// 解析信号地址；模板缺失沿用原地址，解析失败记问题后沿用原地址
    fn resolve_signal_address(&self, signal: &Signal, summary: &mut SyncSummary) -> String {
        let category = signal.category.to_string();
        let Some(template) = self.config.address_template(&category) else {
            return signal.address.clone();
        };
        match resolve_address(signal, template) {
            Ok(addr) => addr,
            Err(e) => {
                summary.issues.push(SyncIssue {
                    tag: signal.tag.clone(),
                    reason: format!("地址解析失败: {}", e),
                });
                signal.address.clone()
            }
        }
    }

    /// 加载单个功能块并写回最新产物
    async fn regenerate_one(&self, txn: &DatabaseTransaction, tag: &str) -> AppResult<()> {
        let Some(fb) = self.repo.load_with_variables(txn, tag).await? else {
            return Ok(());
        };
        let artifacts = self.generate_artifacts(&fb)?;
        self.repo
            .update_artifacts(
                txn,
                tag,
                &artifacts.declaration,
                &artifacts.call,
                &artifacts.omx,
                &artifacts.opc,
            )
            .await
    }

    fn generate_artifacts(&self, fb: &FunctionBlock) -> AppResult<Artifacts> {
        let Some(type_cfg) = self.config.function_blocks.get(&fb.cds_type) else {
            // 类型配置被移除时保留旧产物
            return Ok(Artifacts {
                declaration: fb.declaration.clone(),
                call: fb.call.clone(),
                omx: fb.omx.clone(),
                opc: fb.opc.clone(),
            });
        };
        Ok(Artifacts {
            declaration: emit_declaration(fb, &self.config.declaration),
            call: emit_call(fb, type_cfg)?,
            omx: emit_omx(fb, &type_cfg.omx)?,
            opc: emit_opc(fb, &self.config.default_opc_item, &type_cfg.opc.items)?,
        })
    }
}

struct Artifacts {
    declaration: String,
    call: String,
    omx: String,
    opc: String,
}
