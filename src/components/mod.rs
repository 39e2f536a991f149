pub mod details;
pub mod dialog;
pub mod format;
pub mod status_bar;
pub mod table;
pub mod tree;
