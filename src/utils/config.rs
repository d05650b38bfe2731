use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::utils::error::{AppError, AppResult};

/// 生成流水线主配置结构
///
/// 配置对象在一次同步运行中只读，由调用方显式传入各组件，
/// 不通过全局状态访问。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenConfig {
    /// 按信号类别（DI/AI/DO/AO）配置的地址模板
    #[serde(default)]
    pub address_templates: HashMap<String, String>,
    /// 按功能块类型配置的槽位映射与生成模板
    #[serde(default)]
    pub function_blocks: HashMap<String, FbTypeConfig>,
    /// OPC绑定文件的公共模板字段
    #[serde(default)]
    pub default_opc_item: OpcItemTemplate,
    /// ST变量声明的排版设置
    #[serde(default)]
    pub declaration: DeclarationStyle,
    /// 外部通道的刷新周期（毫秒）
    #[serde(default = "default_cycle_time_ms")]
    pub cycle_time_ms: u64,
}

fn default_cycle_time_ms() -> u64 {
    1000
}

/// 单个功能块类型的配置
///
/// `inputs`/`outputs` 为 功能属性 -> 模板槽位名 的映射；
/// 属性可带点号子字段（如 "POS.value"），保留属性名 "address"
/// 表示该槽位接收功能块的解析地址。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FbTypeConfig {
    /// ST调用语句模板（tera语法）
    #[serde(default)]
    pub template: String,
    /// 输入槽位映射
    #[serde(default, rename = "in")]
    pub inputs: HashMap<String, String>,
    /// 输出槽位映射
    #[serde(default, rename = "out")]
    pub outputs: HashMap<String, String>,
    /// 工程导出（OMX）配置
    #[serde(default)]
    pub omx: OmxConfig,
    /// 中间件绑定（OPC）配置
    #[serde(default)]
    pub opc: OpcConfig,
}

/// 工程导出模板配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OmxConfig {
    /// 对象基础模板，以 `</object>` 结尾
    #[serde(default)]
    pub template: String,
    /// 属性名 -> 模板变量 的映射，在闭合标签前逐条追加
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// 中间件绑定条目配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpcConfig {
    /// 路径后缀列表，每个后缀生成一个 `<item>`
    #[serde(default)]
    pub items: Vec<String>,
}

/// OPC条目的公共模板字段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpcItemTemplate {
    /// 绑定名称
    #[serde(default)]
    pub binding: String,
    /// 命名空间
    #[serde(default)]
    pub namespace: String,
    /// 节点路径基础模板（tera语法）
    #[serde(default)]
    pub base_path: String,
    /// 节点ID前缀模板（tera语法）
    #[serde(default)]
    pub node_prefix: String,
}

/// ST变量声明排版设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationStyle {
    /// 缩进空格数
    pub indent: usize,
    /// 对齐后的总列宽
    pub total_width: usize,
}

impl Default for DeclarationStyle {
    fn default() -> Self {
        Self {
            indent: 4,
            total_width: 40,
        }
    }
}

impl GenConfig {
    /// 从JSON文件加载配置
    pub fn load_from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            AppError::configuration_error(format!("读取配置文件 {:?} 失败: {}", path, e))
        })?;
        serde_json::from_str(&data).map_err(|e| {
            AppError::configuration_error(format!("解析配置文件 {:?} 失败: {}", path, e))
        })
    }

    /// 保存配置到JSON文件
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), data)?;
        Ok(())
    }

    /// 查询信号类别对应的地址模板
    pub fn address_template(&self, category: &str) -> Option<&str> {
        self.address_templates.get(category).map(String::as_str)
    }
}
