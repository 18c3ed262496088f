pub mod drawing;
pub mod keys;
