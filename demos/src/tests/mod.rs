
pub use test_runner::run;
