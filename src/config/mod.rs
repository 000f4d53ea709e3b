pub mod fusion_demo;
pub mod memory_estimate;
