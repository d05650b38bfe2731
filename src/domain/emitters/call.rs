/// ST调用语句生成器
///
/// 先经槽位绑定器得到有序的输入/输出槽位对，再套用类型配置
/// 里的调用模板渲染。槽位对基于BTreeMap，模板迭代顺序稳定，
/// 同一功能块重复生成字节一致。
use tera::{Context, Tera};

use crate::domain::slot_binder;
use crate::models::structs::{FbCallParams, FunctionBlock};
use crate::utils::config::FbTypeConfig;
use crate::utils::error::{AppError, AppResult};

const CALL_TEMPLATE_NAME: &str = "call";

/// 渲染功能块的ST调用语句
pub fn emit_call(fb: &FunctionBlock, cfg: &FbTypeConfig) -> AppResult<String> {
    let (inputs, outputs) = slot_binder::bind(&cfg.inputs, &cfg.outputs, &fb.variables);

    let params = FbCallParams {
        tag: fb.tag.clone(),
        cds_type: fb.cds_type.clone(),
        address: fb.address.clone(),
        comment: fb.comment.clone(),
        node: fb.node_ref.clone(),
        inputs,
        outputs,
    };

    let mut tera = Tera::default();
    tera.add_raw_template(CALL_TEMPLATE_NAME, &cfg.template)
        .map_err(|e| AppError::generation_error(&fb.tag, format!("调用模板无效: {}", e)))?;
    let ctx = Context::from_serialize(&params)
        .map_err(|e| AppError::generation_error(&fb.tag, format!("调用上下文构建失败: {}", e)))?;
    tera.render(CALL_TEMPLATE_NAME, &ctx)
        .map_err(|e| AppError::generation_error(&fb.tag, format!("调用模板渲染失败: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Direction;
    use crate::models::structs::{default_id, FbVariable};

    fn pump_fb() -> FunctionBlock {
        let mut fb = FunctionBlock::new("PUMP1", "PUMP");
        fb.address = "1.2.3".to_string();
        fb.variables.push(FbVariable {
            id: default_id(),
            fb_id: fb.id.clone(),
            direction: Direction::Output,
            signal_tag: "PUMP1_START".to_string(),
            func_attr: "START".to_string(),
            cds_type: "DO".to_string(),
            address: String::new(),
        });
        fb
    }

    fn pump_cfg() -> FbTypeConfig {
        let mut cfg = FbTypeConfig::default();
        cfg.template =
            "{{ tag }}(run := {{ outputs.run }}); (* addr {{ address }} *)".to_string();
        cfg.outputs.insert("START".to_string(), "run".to_string());
        cfg
    }

    #[test]
    fn test_emit_call_binds_slots() {
        let call = emit_call(&pump_fb(), &pump_cfg()).unwrap();
        assert_eq!(call, "PUMP1(run := DO.PUMP1_START); (* addr 1.2.3 *)");
    }

    #[test]
    fn test_emit_call_stable() {
        let fb = pump_fb();
        let cfg = pump_cfg();
        assert_eq!(emit_call(&fb, &cfg).unwrap(), emit_call(&fb, &cfg).unwrap());
    }

    #[test]
    fn test_emit_call_bad_template() {
        let fb = pump_fb();
        let mut cfg = pump_cfg();
        cfg.template = "{{ tag".to_string();
        assert!(emit_call(&fb, &cfg).is_err());
    }
}
