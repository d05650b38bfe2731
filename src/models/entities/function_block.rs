// 功能块实体的SeaORM定义
// 位号唯一；生成产物（declaration/call/omx/opc）作为Text列随实体持久化

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

use crate::models::structs::{default_id, FunctionBlock};

/// 功能块实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "function_blocks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default = "default_id")]
    pub id: String,

    /// 位号，全局唯一
    #[sea_orm(unique)]
    pub tag: String,
    pub name: String,
    pub system: String,
    pub node_ref: String,
    /// 功能块类型（CdsType）
    pub cds_type: String,
    pub address: String,
    pub equipment: String,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    /// 主功能块标志
    pub is_primary: bool,

    // 生成产物
    #[sea_orm(column_type = "Text")]
    pub declaration: String,
    #[sea_orm(column_type = "Text")]
    pub call: String,
    #[sea_orm(column_type = "Text")]
    pub omx: String,
    #[sea_orm(column_type = "Text")]
    pub opc: String,

    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fb_variable::Entity")]
    FbVariable,
}

impl Related<super::fb_variable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FbVariable.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&FunctionBlock> for ActiveModel {
    fn from(fb: &FunctionBlock) -> Self {
        let now = Utc::now();
        Self {
            id: Set(fb.id.clone()),
            tag: Set(fb.tag.clone()),
            name: Set(fb.name.clone()),
            system: Set(fb.system.clone()),
            node_ref: Set(fb.node_ref.clone()),
            cds_type: Set(fb.cds_type.clone()),
            address: Set(fb.address.clone()),
            equipment: Set(fb.equipment.clone()),
            comment: Set(fb.comment.clone()),
            is_primary: Set(fb.primary),
            declaration: Set(fb.declaration.clone()),
            call: Set(fb.call.clone()),
            omx: Set(fb.omx.clone()),
            opc: Set(fb.opc.clone()),
            created_time: Set(now),
            updated_time: Set(now),
        }
    }
}

impl From<&Model> for FunctionBlock {
    fn from(model: &Model) -> Self {
        FunctionBlock {
            id: model.id.clone(),
            tag: model.tag.clone(),
            name: model.name.clone(),
            system: model.system.clone(),
            node_ref: model.node_ref.clone(),
            cds_type: model.cds_type.clone(),
            address: model.address.clone(),
            equipment: model.equipment.clone(),
            comment: model.comment.clone(),
            primary: model.is_primary,
            declaration: model.declaration.clone(),
            call: model.call.clone(),
            omx: model.omx.clone(),
            opc: model.opc.clone(),
            // 变量由仓储按需加载
            variables: Vec::new(),
        }
    }
}
