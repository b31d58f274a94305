pub mod fdr;
pub mod ols;
pub mod scale;
pub mod stats;
