pub mod output;
pub mod source;
