/// 中间件绑定（OPC）导入文件生成器
///
/// 基础路径与节点前缀模板按功能块渲染一次，再对类型配置声明的
/// 每个路径后缀产出一个 `<item>` 条目。后缀以点号接在基础路径
/// 之后，条目顺序即配置顺序。
use tera::{Context, Tera};

use crate::models::structs::FunctionBlock;
use crate::utils::config::OpcItemTemplate;
use crate::utils::error::{AppError, AppResult};

const OPC_XMLNS: &str = "urn:prosoft:opc-import";
const NODE_ID_TYPE: &str = "string";

/// 渲染功能块的OPC导入XML
pub fn emit_opc(
    fb: &FunctionBlock,
    tpl: &OpcItemTemplate,
    items: &[String],
) -> AppResult<String> {
    let base_path = render_fragment(fb, "base_path", &tpl.base_path)?;
    let node_prefix = render_fragment(fb, "node_prefix", &tpl.node_prefix)?;

    let mut buf = format!("<opc-import xmlns=\"{}\">\n", OPC_XMLNS);
    for suffix in items {
        let node_path = join_suffix(&base_path, suffix);
        let node_id = join_suffix(&node_prefix, suffix);
        buf.push_str(&format!("    <item Binding=\"{}\">\n", tpl.binding));
        buf.push_str(&format!("        <node-path>{}</node-path>\n", node_path));
        buf.push_str(&format!(
            "        <namespace>{}</namespace>\n",
            tpl.namespace
        ));
        buf.push_str(&format!(
            "        <nodeIdType>{}</nodeIdType>\n",
            NODE_ID_TYPE
        ));
        buf.push_str(&format!("        <nodeId>{}</nodeId>\n", node_id));
        buf.push_str("    </item>\n");
    }
    buf.push_str("</opc-import>");
    Ok(buf)
}

fn render_fragment(fb: &FunctionBlock, name: &str, template: &str) -> AppResult<String> {
    let mut tera = Tera::default();
    tera.add_raw_template(name, template)
        .map_err(|e| AppError::generation_error(&fb.tag, format!("OPC模板 {} 无效: {}", name, e)))?;
    let ctx = Context::from_serialize(fb)
        .map_err(|e| AppError::generation_error(&fb.tag, format!("OPC上下文构建失败: {}", e)))?;
    tera.render(name, &ctx)
        .map_err(|e| AppError::generation_error(&fb.tag, format!("OPC模板 {} 渲染失败: {}", name, e)))
}

fn join_suffix(base: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        base.to_string()
    } else {
        format!("{}.{}", base, suffix)
    }
}
