pub mod ci;
pub mod ff;
pub mod generate;
pub mod morph;
