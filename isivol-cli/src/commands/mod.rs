pub mod path;
pub mod serve;
