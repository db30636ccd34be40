pub mod command_block_wrapper;

pub use command_block_wrapper::CommandBlockWrapperObserver;
