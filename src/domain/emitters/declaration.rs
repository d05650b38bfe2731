/// ST变量声明生成器
use crate::models::structs::FunctionBlock;
use crate::utils::config::DeclarationStyle;

/// 排版单条ST变量声明
///
/// `名称:` 左对齐补齐到列宽，类型紧随其后，以分号结尾。
/// 对齐宽度 = 总列宽 - 缩进 - 2（冒号与分隔空格）。
pub fn format_var_declaration(tag: &str, var_type: &str, style: &DeclarationStyle) -> String {
    let width = style.total_width.saturating_sub(style.indent + 2);
    format!(
        "{}{:<width$} {};",
        " ".repeat(style.indent),
        format!("{}:", tag),
        var_type,
        width = width
    )
}

/// 生成功能块实例的声明行，类型名为 `FB_<类型>`
pub fn emit_declaration(fb: &FunctionBlock, style: &DeclarationStyle) -> String {
    format_var_declaration(&fb.tag, &format!("FB_{}", fb.cds_type), style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_alignment() {
        let style = DeclarationStyle {
            indent: 4,
            total_width: 20,
        };
        // 宽度 = 20 - 4 - 2 = 14
        let line = format_var_declaration("xRun", "BOOL", &style);
        assert_eq!(line, "    xRun:          BOOL;");
    }

    #[test]
    fn test_format_long_tag_not_truncated() {
        let style = DeclarationStyle {
            indent: 2,
            total_width: 8,
        };
        let line = format_var_declaration("VeryLongTagName", "WORD", &style);
        assert!(line.starts_with("  VeryLongTagName:"));
        assert!(line.ends_with("WORD;"));
    }

    #[test]
    fn test_emit_declaration_type_prefix() {
        let fb = FunctionBlock::new("PUMP1", "PUMP");
        let line = emit_declaration(&fb, &DeclarationStyle::default());
        assert!(line.contains("PUMP1:"));
        assert!(line.contains("FB_PUMP;"));
    }
}
