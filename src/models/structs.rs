use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::enums::{Direction, SignalCategory};

/// 生成默认UUID字符串的辅助函数
pub fn default_id() -> String {
    Uuid::new_v4().to_string()
}

/// 信号记录
///
/// 一个自动化I/O点位，由上游导入子系统按声明的列名装配为
/// 扁平结构后交给流水线处理。位号全局唯一且创建后不变，
/// 类别在创建时确定。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// 位号（全局唯一）
    pub tag: String,
    /// 信号类别
    pub category: SignalCategory,
    /// 所属系统
    #[serde(default)]
    pub system: String,
    /// 所属控制器节点
    #[serde(default)]
    pub node_ref: String,
    /// 所属工艺设备
    #[serde(default)]
    pub product_ref: String,
    /// 设备名称
    #[serde(default)]
    pub equipment: String,
    /// 信号名称
    #[serde(default)]
    pub name: String,
    /// 模块
    #[serde(default)]
    pub module: String,
    /// 通道
    #[serde(default)]
    pub channel: String,
    /// 机笼
    #[serde(default, rename = "crate")]
    pub crate_no: String,
    /// 安装位置
    #[serde(default)]
    pub place: String,
    /// 属性说明
    #[serde(default)]
    pub property: String,
    /// 已解析地址（派生字段，地址解析器负责刷新）
    #[serde(default)]
    pub address: String,
    /// Modbus地址
    #[serde(default)]
    pub modbus_addr: String,
    /// 功能块类型名
    #[serde(default)]
    pub fb_type: String,
    /// 注释
    #[serde(default)]
    pub comment: String,
    /// 当前值
    #[serde(default)]
    pub value: f64,

    // 模拟量专用字段
    /// 量程下限
    pub range_min: Option<f64>,
    /// 量程上限
    pub range_max: Option<f64>,
    /// 工程单位
    pub unit: Option<String>,
    /// 符号
    pub sign: Option<String>,
    /// 低预警限
    pub warning_low: Option<f64>,
    /// 高预警限
    pub warning_high: Option<f64>,
    /// 低报警限
    pub alarm_low: Option<f64>,
    /// 高报警限
    pub alarm_high: Option<f64>,
    /// 显示格式
    pub format: Option<String>,
    /// 滤波设置
    pub filter: Option<String>,

    // 数字量专用字段
    /// 数字量分类
    pub di_category: Option<String>,
    /// 取反标志
    pub inversion: Option<String>,
    /// 接通延时（秒）
    pub ton: Option<f64>,
    /// 断开延时（秒）
    pub tof: Option<f64>,
}

impl Signal {
    /// 创建仅填公共字段的信号，测试和导入路径使用
    pub fn new(tag: impl Into<String>, category: SignalCategory) -> Self {
        Self {
            tag: tag.into(),
            category,
            system: String::new(),
            node_ref: String::new(),
            product_ref: String::new(),
            equipment: String::new(),
            name: String::new(),
            module: String::new(),
            channel: String::new(),
            crate_no: String::new(),
            place: String::new(),
            property: String::new(),
            address: String::new(),
            modbus_addr: String::new(),
            fb_type: String::new(),
            comment: String::new(),
            value: 0.0,
            range_min: None,
            range_max: None,
            unit: None,
            sign: None,
            warning_low: None,
            warning_high: None,
            alarm_low: None,
            alarm_high: None,
            format: None,
            filter: None,
            di_category: None,
            inversion: None,
            ton: None,
            tof: None,
        }
    }

    /// 拼装安装位置注释（主功能块使用）
    pub fn placement_comment(&self) -> String {
        format!(
            "{}\n{}\nproduct: {}; crate: {}; module: {}; channel: {}",
            self.node_ref, self.name, self.product_ref, self.crate_no, self.module, self.channel
        )
    }
}

/// 协议层接口记录
///
/// 面向批量传输打包的视图，由导入子系统预先过滤到单个
/// 可寻址系统。打包前必须按（功能码，数值偏移）排序。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceRecord {
    /// 位号
    pub tag: String,
    /// 所属系统
    #[serde(default)]
    pub system: String,
    /// 寄存器偏移（导入原文为字符串）
    #[serde(default)]
    pub offset: String,
    /// 功能码（如 "03"、"06"）
    #[serde(default)]
    pub function_code: String,
    /// 位域编号，"0" 表示整字
    #[serde(default)]
    pub field: String,
    /// 数据类型
    #[serde(default)]
    pub data_type: String,
    /// 读写标志（"r" / "w"）
    #[serde(default)]
    pub read_write: String,
    /// 原始值
    #[serde(default)]
    pub value: String,
    /// 所属功能块类型名
    #[serde(default)]
    pub fb_type: String,
    /// 调用模板名
    #[serde(default)]
    pub template: String,
    /// 注释
    #[serde(default)]
    pub comment: String,
}

/// 功能块
///
/// 以命名槽位聚合若干信号的逻辑自动化单元。位号唯一；
/// 同一分类前缀只产生一个功能块记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionBlock {
    /// 数据库主键
    #[serde(default = "default_id")]
    pub id: String,
    /// 位号（唯一）
    pub tag: String,
    /// 名称
    #[serde(default)]
    pub name: String,
    /// 所属系统
    #[serde(default)]
    pub system: String,
    /// 所属控制器节点
    #[serde(default)]
    pub node_ref: String,
    /// 功能块类型（CdsType）
    #[serde(default)]
    pub cds_type: String,
    /// 解析后的地址
    #[serde(default)]
    pub address: String,
    /// 设备名称
    #[serde(default)]
    pub equipment: String,
    /// 注释
    #[serde(default)]
    pub comment: String,
    /// 主功能块标志：信号本身即为功能块
    #[serde(default)]
    pub primary: bool,

    // 生成产物
    /// ST变量声明
    #[serde(default)]
    pub declaration: String,
    /// ST调用语句
    #[serde(default)]
    pub call: String,
    /// 工程导出XML
    #[serde(default)]
    pub omx: String,
    /// 中间件绑定XML
    #[serde(default)]
    pub opc: String,

    /// 绑定的变量集合
    #[serde(default)]
    pub variables: Vec<FbVariable>,
}

impl FunctionBlock {
    /// 以位号和类型创建空功能块
    pub fn new(tag: impl Into<String>, cds_type: impl Into<String>) -> Self {
        Self {
            id: default_id(),
            tag: tag.into(),
            name: String::new(),
            system: String::new(),
            node_ref: String::new(),
            cds_type: cds_type.into(),
            address: String::new(),
            equipment: String::new(),
            comment: String::new(),
            primary: false,
            declaration: String::new(),
            call: String::new(),
            omx: String::new(),
            opc: String::new(),
            variables: Vec::new(),
        }
    }
}

/// 功能块变量
///
/// 一个信号到一个功能块槽位的绑定，(功能块, 信号位号) 唯一。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FbVariable {
    /// 数据库主键
    #[serde(default = "default_id")]
    pub id: String,
    /// 所属功能块主键
    #[serde(default)]
    pub fb_id: String,
    /// 方向
    pub direction: Direction,
    /// 绑定信号的位号
    pub signal_tag: String,
    /// 位号末段的功能属性
    pub func_attr: String,
    /// 信号的数据类型（引用表达式前缀）
    #[serde(default)]
    pub cds_type: String,
    /// 解析后的地址
    #[serde(default)]
    pub address: String,
}

/// 有序槽位对：槽位名 -> 表达式
///
/// BTreeMap 保证模板迭代按槽位名排序，重复生成字节一致。
pub type IoPair = BTreeMap<String, String>;

/// ST调用模板的参数对象
#[derive(Debug, Clone, Serialize)]
pub struct FbCallParams {
    pub tag: String,
    pub cds_type: String,
    pub address: String,
    pub comment: String,
    pub node: String,
    pub inputs: IoPair,
    pub outputs: IoPair,
}

/// 外部通道
///
/// 打包器派生出的一个连续批量读取块，每次打包从零重建，
/// 从不增量修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OuterChannel {
    /// 通道名（由起始偏移派生）
    pub name: String,
    /// 描述
    pub description: String,
    /// 起始偏移
    pub offset: String,
    /// 块长度（字数）
    pub length: String,
    /// 功能码文本
    pub function_code: String,
    /// 刷新周期（毫秒）
    pub cycle_time: String,
    /// 通道触发类型
    pub channel_type: String,
}

/// 打包产物中的单个信号变量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedVariable {
    /// 位号
    pub id: String,
    /// 数据类型
    pub cds_type: String,
    /// 所属块名
    pub block: String,
    /// 位域编号
    pub bit: String,
    /// 块内从零起算的位置
    pub pos: usize,
    /// 原始值
    pub value: String,
    /// 注释
    pub comment: String,
    /// 是否为写方向
    pub output: bool,
}

/// 同步运行中记录的单条问题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncIssue {
    /// 出问题的信号或功能块位号
    pub tag: String,
    /// 原因描述
    pub reason: String,
}

/// 一次完整同步运行的结果汇总
///
/// 运行按部分成功汇报：逐条问题收集在 `issues` 中，
/// 不因单条记录失败而中止。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSummary {
    /// 本次运行创建/更新的功能块数
    pub synced_fbs: usize,
    /// 本次运行创建/更新的变量数
    pub synced_variables: usize,
    /// 未参与绑定而跳过的信号数（属性未映射等，非错误）
    pub skipped_signals: usize,
    /// 运行开始时间
    pub started_at: Option<DateTime<Utc>>,
    /// 收集到的问题列表
    #[serde(default)]
    pub issues: Vec<SyncIssue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_id_unique() {
        assert_ne!(default_id(), default_id());
    }

    #[test]
    fn test_placement_comment() {
        let mut s = Signal::new("PT_2101_VAL", SignalCategory::AI);
        s.node_ref = "CPU01".to_string();
        s.name = "进口压力".to_string();
        s.product_ref = "P-101".to_string();
        s.crate_no = "1".to_string();
        s.module = "3".to_string();
        s.channel = "7".to_string();
        let comment = s.placement_comment();
        assert!(comment.contains("CPU01"));
        assert!(comment.contains("crate: 1; module: 3; channel: 7"));
    }

    #[test]
    fn test_signal_json_crate_alias() {
        let json = r#"{ "tag": "T1_X", "category": "DI", "crate": "2" }"#;
        let s: Signal = serde_json::from_str(json).unwrap();
        assert_eq!(s.crate_no, "2");
    }
}
