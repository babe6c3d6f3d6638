pub mod blackhole;
pub mod estimator;
pub mod in_memory;
pub mod provider;
