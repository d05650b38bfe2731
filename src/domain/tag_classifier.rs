/// 位号分类器
///
/// 按命名约定把信号位号拆成（功能块位号, 功能属性）。
/// 约定：最后一个下划线之前是功能块位号，之后是功能属性，
/// 例如 "PUMP1_START" -> ("PUMP1", "START")。

/// 位号拆分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagParts {
    /// 功能块位号（前缀）
    pub fb_tag: String,
    /// 功能属性（末段）
    pub func_attr: String,
}

/// 拆分信号位号
///
/// 少于两段的位号视为命名错误，返回 `None`，由调用方记录并跳过。
/// 纯函数，无副作用。
pub fn classify(tag: &str) -> Option<TagParts> {
    let (fb_tag, func_attr) = tag.rsplit_once('_')?;
    if fb_tag.is_empty() || func_attr.is_empty() {
        return None;
    }
    Some(TagParts {
        fb_tag: fb_tag.to_string(),
        func_attr: func_attr.to_string(),
    })
}
