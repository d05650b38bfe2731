/// 代码生成器集合
///
/// 四种产物各占一个子模块：ST声明、ST调用、工程导出XML、
/// 中间件绑定XML。生成器均为无状态纯函数，依赖的配置由
/// 调用方传入。
pub mod call;
pub mod declaration;
pub mod omx;
pub mod opc;

pub use call::emit_call;
pub use declaration::{emit_declaration, format_var_declaration};
pub use omx::emit_omx;
pub use opc::emit_opc;
