/// 槽位绑定器
///
/// 按功能块类型声明的输入/输出槽位映射决定信号方向，并把
/// 已绑定变量整理成模板用的有序槽位对。映射方向为
/// 功能属性 -> 槽位名；属性可带点号子字段，保留属性名
/// "address" 把功能块地址送入对应槽位。
use std::collections::HashMap;

use crate::models::enums::Direction;
use crate::models::structs::{FbVariable, IoPair};
use crate::utils::config::FbTypeConfig;

/// 地址槽位的保留属性名
pub const ADDRESS_ATTR: &str = "address";

/// 判定功能属性的方向
///
/// 先查输入映射，再查输出映射；比较时只看属性的首个点号段。
/// 两边都未命中说明该信号不属于此类型声明的接口，返回 `None`，
/// 调用方静默跳过（常见情形，非错误）。
pub fn direction_for(func_attr: &str, cfg: &FbTypeConfig) -> Option<Direction> {
    let hits = |map: &HashMap<String, String>| {
        map.keys()
            .any(|attr| attr.split('.').next() == Some(func_attr))
    };
    if hits(&cfg.inputs) {
        Some(Direction::Input)
    } else if hits(&cfg.outputs) {
        Some(Direction::Output)
    } else {
        None
    }
}

/// 构建输入/输出槽位对
///
/// 对每个已绑定变量重新推导限定引用表达式
/// `<数据类型>.<信号位号>[.<子字段>]`，同一个物理信号可以
/// 经由不同点号子字段落到多个槽位。幂等：相同输入重复调用
/// 产出相同结果。
pub fn bind(
    inputs_map: &HashMap<String, String>,
    outputs_map: &HashMap<String, String>,
    variables: &[FbVariable],
) -> (IoPair, IoPair) {
    let mut inputs = IoPair::new();
    let mut outputs = IoPair::new();

    seed_address_slot(&mut inputs, inputs_map);
    seed_address_slot(&mut outputs, outputs_map);

    for var in variables {
        let (map, pair) = match var.direction {
            Direction::Input => (inputs_map, &mut inputs),
            Direction::Output => (outputs_map, &mut outputs),
        };
        for (attr_expr, slot) in map {
            let mut parts = attr_expr.splitn(2, '.');
            let head = parts.next().unwrap_or_default();
            let subfield = parts.next();
            if var.func_attr == head {
                let reference = match subfield {
                    Some(sub) => format!("{}.{}.{}", var.cds_type, var.signal_tag, sub),
                    None => format!("{}.{}", var.cds_type, var.signal_tag),
                };
                pair.insert(slot.clone(), reference);
            }
        }
    }

    (inputs, outputs)
}

/// 登记地址槽位：键 "address"，值为接收地址的槽位名
fn seed_address_slot(pair: &mut IoPair, map: &HashMap<String, String>) {
    if let Some(slot) = map.get(ADDRESS_ATTR) {
        pair.insert(ADDRESS_ATTR.to_string(), slot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structs::default_id;

    fn var(direction: Direction, signal_tag: &str, func_attr: &str, cds_type: &str) -> FbVariable {
        FbVariable {
            id: default_id(),
            fb_id: String::new(),
            direction,
            signal_tag: signal_tag.to_string(),
            func_attr: func_attr.to_string(),
            cds_type: cds_type.to_string(),
            address: String::new(),
        }
    }

    fn pump_cfg() -> FbTypeConfig {
        let mut cfg = FbTypeConfig::default();
        cfg.inputs
            .insert("address".to_string(), "iAddr".to_string());
        cfg.inputs.insert("FBK".to_string(), "xFeedback".to_string());
        cfg.outputs.insert("START".to_string(), "run".to_string());
        cfg.outputs
            .insert("POS.value".to_string(), "rPosition".to_string());
        cfg
    }

    #[test]
    fn test_direction_lookup() {
        let cfg = pump_cfg();
        assert_eq!(direction_for("FBK", &cfg), Some(Direction::Input));
        assert_eq!(direction_for("START", &cfg), Some(Direction::Output));
        // 点号子字段只比较首段
        assert_eq!(direction_for("POS", &cfg), Some(Direction::Output));
        assert_eq!(direction_for("UNKNOWN", &cfg), None);
    }

    #[test]
    fn test_bind_plain_attribute() {
        let cfg = pump_cfg();
        let vars = vec![var(Direction::Output, "PUMP1_START", "START", "DO")];
        let (_, outputs) = bind(&cfg.inputs, &cfg.outputs, &vars);
        assert_eq!(outputs.get("run").unwrap(), "DO.PUMP1_START");
    }

    #[test]
    fn test_bind_dotted_subfield() {
        let cfg = pump_cfg();
        let vars = vec![var(Direction::Output, "PUMP1_POS", "POS", "AO")];
        let (_, outputs) = bind(&cfg.inputs, &cfg.outputs, &vars);
        assert_eq!(outputs.get("rPosition").unwrap(), "AO.PUMP1_POS.value");
    }

    #[test]
    fn test_bind_address_slot_seeded() {
        let cfg = pump_cfg();
        let (inputs, _) = bind(&cfg.inputs, &cfg.outputs, &[]);
        assert_eq!(inputs.get("address").unwrap(), "iAddr");
    }

    #[test]
    fn test_bind_idempotent() {
        let cfg = pump_cfg();
        let vars = vec![
            var(Direction::Input, "PUMP1_FBK", "FBK", "DI"),
            var(Direction::Output, "PUMP1_START", "START", "DO"),
        ];
        let first = bind(&cfg.inputs, &cfg.outputs, &vars);
        let second = bind(&cfg.inputs, &cfg.outputs, &vars);
        assert_eq!(first, second);
    }
}
