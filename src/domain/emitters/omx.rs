/// 工程导出（OMX）片段生成器
///
/// 在类型基础模板的闭合标签前注入配置声明的属性条目，再整体
/// 用tera渲染。每次生成分配新的实例UUID，产物天然不可逐字节
/// 复现，比较时需排除UUID。
use std::collections::BTreeMap;

use tera::{Context, Tera};
use uuid::Uuid;

use crate::models::structs::FunctionBlock;
use crate::utils::config::OmxConfig;
use crate::utils::error::{AppError, AppResult};

const OMX_TEMPLATE_NAME: &str = "omx";
const OBJECT_CLOSE_TAG: &str = "</object>";

/// 渲染功能块的工程导出XML片段
pub fn emit_omx(fb: &FunctionBlock, cfg: &OmxConfig) -> AppResult<String> {
    // 属性条目按名称排序注入，保持模板文本稳定
    let sorted: BTreeMap<&String, &String> = cfg.attributes.iter().collect();
    let mut body = cfg.template.replacen(OBJECT_CLOSE_TAG, "", 1);
    for (name, expr) in sorted {
        body.push_str(&format!(
            "<attribute type=\"{}\" value=\"{{{{ {} }}}}\"></attribute>\n",
            name, expr
        ));
    }
    body.push_str(OBJECT_CLOSE_TAG);

    let mut tera = Tera::default();
    tera.add_raw_template(OMX_TEMPLATE_NAME, &body)
        .map_err(|e| AppError::generation_error(&fb.tag, format!("导出模板无效: {}", e)))?;

    let mut ctx = Context::from_serialize(fb)
        .map_err(|e| AppError::generation_error(&fb.tag, format!("导出上下文构建失败: {}", e)))?;
    ctx.insert("uuid", &Uuid::new_v4().to_string());

    tera.render(OMX_TEMPLATE_NAME, &ctx)
        .map_err(|e| AppError::generation_error(&fb.tag, format!("导出模板渲染失败: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fb() -> FunctionBlock {
        let mut fb = FunctionBlock::new("PUMP1", "PUMP");
        fb.address = "1.2.3".to_string();
        fb
    }

    fn cfg() -> OmxConfig {
        let mut cfg = OmxConfig::default();
        cfg.template =
            "<object name=\"{{ tag }}\" uuid=\"{{ uuid }}\"></object>".to_string();
        cfg.attributes
            .insert("Address".to_string(), "address".to_string());
        cfg.attributes
            .insert("CdsType".to_string(), "cds_type".to_string());
        cfg
    }

    #[test]
    fn test_emit_omx_injects_attributes() {
        let out = emit_omx(&fb(), &cfg()).unwrap();
        assert!(out.contains("<object name=\"PUMP1\""));
        assert!(out.contains("<attribute type=\"Address\" value=\"1.2.3\"></attribute>"));
        assert!(out.contains("<attribute type=\"CdsType\" value=\"PUMP\"></attribute>"));
        assert!(out.trim_end().ends_with("</object>"));
    }

    #[test]
    fn test_emit_omx_fresh_uuid_per_call() {
        let fb = fb();
        let cfg = cfg();
        let a = emit_omx(&fb, &cfg).unwrap();
        let b = emit_omx(&fb, &cfg).unwrap();
        assert_ne!(a, b);
        // 除UUID外的文本一致
        let strip = |s: &str| {
            s.split('"')
                .enumerate()
                .filter(|(i, _)| i % 2 == 0)
                .map(|(_, p)| p.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&a), strip(&b));
    }
}
