/// 持久化实现
pub mod function_block_repository;

pub use function_block_repository::FunctionBlockRepository;
