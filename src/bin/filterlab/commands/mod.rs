pub mod batch;
pub mod filters;
pub mod run;
pub mod validate;
