pub mod check;
pub mod decode;
pub mod list;
pub mod position;
pub mod run;
