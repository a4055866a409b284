pub mod concatenator;

pub use concatenator::{
    remove_best_effort, ConcatError, ConcatTool, Concatenator, FfmpegConcatTool,
};
