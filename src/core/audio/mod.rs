//! Audio buffering and frame extraction

mod accumulator;

pub use accumulator::FrameAccumulator;
