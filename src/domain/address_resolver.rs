/// 地址解析器
///
/// 对信号的字段集合执行文本替换模板，得到物理/网络地址。
/// 模板作者可用两个派生辅助过滤器：
/// - `decrement`：把数字字符串减一（通道0基/1基换算）
/// - `format_number(length=N)`：左侧补零到固定宽度
///
/// 地址是派生状态：信号的安装字段更新后必须重新解析。
use std::collections::HashMap;

use tera::{Context, Tera, Value};

use crate::models::structs::Signal;
use crate::utils::error::AppResult;

const ADDRESS_TEMPLATE_NAME: &str = "address";

/// 按模板解析信号地址
///
/// 模板语法错误或引用缺失字段属于逐信号的非致命错误：
/// 调用方记录后沿用原地址继续，不中止整次运行。
/// 对固定输入可重复调用，结果确定。
pub fn resolve_address(signal: &Signal, template: &str) -> AppResult<String> {
    let mut tera = Tera::default();
    tera.register_filter("decrement", decrement_filter);
    tera.register_filter("format_number", format_number_filter);
    tera.add_raw_template(ADDRESS_TEMPLATE_NAME, template)?;

    let ctx = Context::from_serialize(signal)?;
    Ok(tera.render(ADDRESS_TEMPLATE_NAME, &ctx)?)
}

/// `decrement` 过滤器：数字字符串减一
fn decrement_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = value_as_number_string(value)?;
    let num: i64 = raw
        .trim()
        .parse()
        .map_err(|_| tera::Error::msg(format!("无效的通道编号: {}", raw)))?;
    Ok(Value::String((num - 1).to_string()))
}

/// `format_number` 过滤器：左侧补零到 `length` 位
fn format_number_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = value_as_number_string(value)?;
    let length = args
        .get("length")
        .and_then(Value::as_u64)
        .ok_or_else(|| tera::Error::msg("format_number 需要 length 参数"))? as usize;

    let trimmed = raw.trim();
    if trimmed.len() >= length {
        return Ok(Value::String(trimmed.to_string()));
    }
    Ok(Value::String(format!(
        "{}{}",
        "0".repeat(length - trimmed.len()),
        trimmed
    )))
}

fn value_as_number_string(value: &Value) -> tera::Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(tera::Error::msg(format!(
            "期望字符串或数字，得到 {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::SignalCategory;

    fn signal() -> Signal {
        let mut s = Signal::new("PT_2101_VAL", SignalCategory::AI);
        s.module = "3".to_string();
        s.channel = "7".to_string();
        s.crate_no = "1".to_string();
        s
    }

    #[test]
    fn test_resolve_plain_fields() {
        let addr = resolve_address(&signal(), "{{ module }}.{{ channel }}").unwrap();
        assert_eq!(addr, "3.7");
    }

    #[test]
    fn test_resolve_decrement() {
        let addr = resolve_address(&signal(), "{{ module }}.{{ channel | decrement }}").unwrap();
        assert_eq!(addr, "3.6");
    }

    #[test]
    fn test_resolve_format_number() {
        let addr =
            resolve_address(&signal(), "{{ channel | format_number(length=3) }}").unwrap();
        assert_eq!(addr, "007");
    }

    #[test]
    fn test_resolve_deterministic() {
        let s = signal();
        let tmpl = "{{ crate }}/{{ module }}/{{ channel | decrement }}";
        let first = resolve_address(&s, tmpl).unwrap();
        let second = resolve_address(&s, tmpl).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "1/3/6");
    }

    #[test]
    fn test_resolve_bad_template_is_error() {
        assert!(resolve_address(&signal(), "{{ module").is_err());
    }

    #[test]
    fn test_decrement_non_numeric_is_error() {
        let mut s = signal();
        s.channel = "A7".to_string();
        assert!(resolve_address(&s, "{{ channel | decrement }}").is_err());
    }
}
