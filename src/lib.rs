pub mod colors;
pub mod config;
pub mod diagnostic;
pub mod dispatch;
pub mod helper;
pub mod matrix;
pub mod midi;
pub mod notes;
pub mod renderer;
pub mod row_map;
pub mod shutdown;
