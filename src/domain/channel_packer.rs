/// 通道打包器
///
/// 把按（功能码，数值偏移）排序的接口记录走一遍，将物理连续、
/// 协议兼容的信号聚合成批量传输块（外部通道），同时产出块级
/// 数组声明和每个信号在块内的位/字位置。
///
/// 外部通道每次打包从零重建，从不增量修改。
use serde::{Deserialize, Serialize};

use crate::domain::emitters::declaration::format_var_declaration;
use crate::models::structs::{InterfaceRecord, OuterChannel, PackedVariable};
use crate::utils::config::DeclarationStyle;

/// 块名前缀，块名由起始偏移派生
const BLOCK_NAME_PREFIX: &str = "arwMB_";
/// 外部通道的触发类型
const CHANNEL_TYPE_TIMER: &str = "Timer";

/// 一次打包运行的产物
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackResult {
    /// 派生的外部通道列表
    pub outer_channels: Vec<OuterChannel>,
    /// 每条记录的块内位置变量
    pub variables: Vec<PackedVariable>,
    /// 块级数组声明
    pub declarations: Vec<String>,
    /// 被拒记录的错误描述（偏移非数字等）
    pub errors: Vec<String>,
}

/// 打包接口记录
///
/// 排序键为（功能码，数值偏移），排序必须稳定且偏移按数值而非
/// 字典序比较。功能码变化或偏移间隔超过1时开启新块；最后一条
/// 记录总是关闭当前块。
///
/// 偏移非数字的记录被拒绝并记入 `errors`，不参与打包，也绝不
/// 按零处理（零值兜底会悄悄错位后续所有块）。
pub fn pack(
    records: &[InterfaceRecord],
    cycle_time_ms: u64,
    style: &DeclarationStyle,
) -> PackResult {
    let mut result = PackResult::default();

    // 偏移解析与拒绝
    let mut parsed: Vec<(i64, &InterfaceRecord)> = Vec::with_capacity(records.len());
    for record in records {
        match record.offset.trim().parse::<i64>() {
            Ok(offset) => parsed.push((offset, record)),
            Err(_) => result.errors.push(format!(
                "记录 {} 的偏移 {:?} 不是数字，已拒绝",
                record.tag, record.offset
            )),
        }
    }
    if parsed.is_empty() {
        return result;
    }

    // 稳定排序：功能码优先，偏移按数值比较
    parsed.sort_by(|a, b| {
        a.1.function_code
            .cmp(&b.1.function_code)
            .then(a.0.cmp(&b.0))
    });

    let mut block_start = parsed[0].0;
    let mut block_fc = parsed[0].1.function_code.clone();
    let mut prev_offset = parsed[0].0;
    let mut pos: usize = 0;

    for (offset, record) in &parsed {
        let breaks = record.function_code != block_fc || offset - prev_offset > 1;
        if breaks {
            close_block(&mut result, block_start, prev_offset, &block_fc, cycle_time_ms, style);
            block_start = *offset;
            block_fc = record.function_code.clone();
            pos = 0;
        }

        result.variables.push(PackedVariable {
            id: record.tag.trim().to_string(),
            cds_type: record.data_type.trim().to_string(),
            block: block_name(block_start),
            bit: record.field.trim().to_string(),
            pos,
            value: record.value.trim().to_string(),
            comment: record.comment.trim().to_string(),
            output: record.read_write == "w",
        });
        pos += 1;
        prev_offset = *offset;
    }

    // 末条记录总是关闭未完的块
    close_block(&mut result, block_start, prev_offset, &block_fc, cycle_time_ms, style);

    result
}

fn block_name(start: i64) -> String {
    format!("{}{}", BLOCK_NAME_PREFIX, start)
}

fn close_block(
    result: &mut PackResult,
    start: i64,
    end: i64,
    function_code: &str,
    cycle_time_ms: u64,
    style: &DeclarationStyle,
) {
    let length = end - start + 1;
    let name = block_name(start);

    result.outer_channels.push(OuterChannel {
        name: name.clone(),
        description: String::new(),
        offset: start.to_string(),
        length: length.to_string(),
        function_code: function_code_text(function_code).to_string(),
        cycle_time: cycle_time_ms.to_string(),
        channel_type: CHANNEL_TYPE_TIMER.to_string(),
    });
    result.declarations.push(format_var_declaration(
        &name,
        &format!("ARRAY[0..{}] OF WORD", length - 1),
        style,
    ));
}

/// 功能码到批量传输操作名的映射
pub fn function_code_text(fc: &str) -> &'static str {
    match fc {
        "03" => "ReadHoldingRegisters",
        "06" => "WriteHoldingRegisters",
        _ => "Error",
    }
}

/// 渲染外部通道XML块列表
pub fn to_xml(channels: &[OuterChannel]) -> String {
    let mut buf = String::from("<outer-channels>\n");
    for ch in channels {
        buf.push_str("    <channel>\n");
        buf.push_str(&format!("        <name>{}</name>\n", ch.name));
        buf.push_str(&format!(
            "        <description>{}</description>\n",
            ch.description
        ));
        buf.push_str(&format!("        <offset>{}</offset>\n", ch.offset));
        buf.push_str(&format!("        <length>{}</length>\n", ch.length));
        buf.push_str(&format!(
            "        <function-code>{}</function-code>\n",
            ch.function_code
        ));
        buf.push_str(&format!(
            "        <cycle-time>{}</cycle-time>\n",
            ch.cycle_time
        ));
        buf.push_str(&format!(
            "        <channel-type>{}</channel-type>\n",
            ch.channel_type
        ));
        buf.push_str("    </channel>\n");
    }
    buf.push_str("</outer-channels>");
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: &str, offset: &str, fc: &str) -> InterfaceRecord {
        InterfaceRecord {
            tag: tag.to_string(),
            system: "S1".to_string(),
            offset: offset.to_string(),
            function_code: fc.to_string(),
            field: "0".to_string(),
            data_type: "WORD".to_string(),
            read_write: "r".to_string(),
            value: String::new(),
            fb_type: String::new(),
            template: String::new(),
            comment: String::new(),
        }
    }

    fn style() -> DeclarationStyle {
        DeclarationStyle::default()
    }

    #[test]
    fn test_pack_contiguity_break() {
        let records = vec![
            record("V10", "10", "03"),
            record("V11", "11", "03"),
            record("V12", "12", "03"),
            record("V20", "20", "03"),
            record("V21", "21", "03"),
        ];
        let result = pack(&records, 1000, &style());

        assert_eq!(result.outer_channels.len(), 2);
        assert_eq!(result.outer_channels[0].offset, "10");
        assert_eq!(result.outer_channels[0].length, "3");
        assert_eq!(result.outer_channels[1].offset, "20");
        assert_eq!(result.outer_channels[1].length, "2");
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_pack_positions_reset_per_block() {
        let records = vec![
            record("V10", "10", "03"),
            record("V11", "11", "03"),
            record("V20", "20", "03"),
        ];
        let result = pack(&records, 1000, &style());

        assert_eq!(result.variables[0].pos, 0);
        assert_eq!(result.variables[1].pos, 1);
        assert_eq!(result.variables[2].pos, 0);
        assert_eq!(result.variables[0].block, "arwMB_10");
        assert_eq!(result.variables[2].block, "arwMB_20");
    }

    #[test]
    fn test_pack_function_code_break() {
        let records = vec![
            record("R1", "10", "03"),
            record("R2", "11", "03"),
            record("W1", "12", "06"),
        ];
        let result = pack(&records, 1000, &style());

        assert_eq!(result.outer_channels.len(), 2);
        assert_eq!(result.outer_channels[0].function_code, "ReadHoldingRegisters");
        assert_eq!(result.outer_channels[1].function_code, "WriteHoldingRegisters");
    }

    #[test]
    fn test_pack_single_record_closes_block() {
        let records = vec![record("V5", "5", "03")];
        let result = pack(&records, 1000, &style());

        assert_eq!(result.outer_channels.len(), 1);
        assert_eq!(result.outer_channels[0].length, "1");
        assert_eq!(result.declarations.len(), 1);
        assert!(result.declarations[0].contains("ARRAY[0..0] OF WORD"));
    }

    #[test]
    fn test_pack_order_independent() {
        let ordered = vec![
            record("V10", "10", "03"),
            record("V11", "11", "03"),
            record("V12", "12", "03"),
            record("V20", "20", "03"),
            record("V21", "21", "03"),
        ];
        let mut shuffled = ordered.clone();
        shuffled.swap(0, 4);
        shuffled.swap(1, 3);

        let a = pack(&ordered, 1000, &style());
        let b = pack(&shuffled, 1000, &style());
        assert_eq!(a.outer_channels, b.outer_channels);
    }

    #[test]
    fn test_pack_numeric_not_lexicographic() {
        // 字典序会把 "9" 排在 "10" 后面，数值比较必须先 9 后 10
        let records = vec![record("V10", "10", "03"), record("V9", "9", "03")];
        let result = pack(&records, 1000, &style());

        assert_eq!(result.outer_channels.len(), 1);
        assert_eq!(result.outer_channels[0].offset, "9");
        assert_eq!(result.outer_channels[0].length, "2");
    }

    #[test]
    fn test_pack_rejects_non_numeric_offset() {
        let records = vec![
            record("V10", "10", "03"),
            record("BAD", "abc", "03"),
            record("V11", "11", "03"),
        ];
        let result = pack(&records, 1000, &style());

        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("BAD"));
        // 其余记录照常打包
        assert_eq!(result.outer_channels.len(), 1);
        assert_eq!(result.outer_channels[0].length, "2");
    }

    #[test]
    fn test_outer_channel_xml() {
        let records = vec![record("V10", "10", "03")];
        let result = pack(&records, 500, &style());
        let xml = to_xml(&result.outer_channels);

        assert!(xml.starts_with("<outer-channels>"));
        assert!(xml.contains("<name>arwMB_10</name>"));
        assert!(xml.contains("<cycle-time>500</cycle-time>"));
        assert!(xml.ends_with("</outer-channels>"));
    }
}
