use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 信号类别枚举
///
/// 对应上游点表的四种信号页：数字量输入/输出、模拟量输入/输出。
/// 旧点表中输出类别写作 DQ/AQ，解析时作为别名接受；
/// 反序列化走 `FromStr`，JSON导入同样识别别名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalCategory {
    /// 数字量输入
    DI,
    /// 模拟量输入
    AI,
    /// 数字量输出
    DO,
    /// 模拟量输出
    AO,
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalCategory::DI => "DI",
            SignalCategory::AI => "AI",
            SignalCategory::DO => "DO",
            SignalCategory::AO => "AO",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SignalCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DI" => Ok(SignalCategory::DI),
            "AI" => Ok(SignalCategory::AI),
            "DO" | "DQ" => Ok(SignalCategory::DO),
            "AO" | "AQ" => Ok(SignalCategory::AO),
            other => Err(format!("未知的信号类别: {}", other)),
        }
    }
}

impl Serialize for SignalCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SignalCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 变量方向枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "input" => Ok(Direction::Input),
            "output" => Ok(Direction::Output),
            other => Err(format!("未知的变量方向: {}", other)),
        }
    }
}
