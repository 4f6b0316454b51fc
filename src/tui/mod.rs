pub mod input;
pub mod mode;
pub mod spectrum;
pub mod view;
