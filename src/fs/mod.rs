pub mod entry;
pub mod lister;
pub mod operations;
pub mod table;
pub mod tree;
