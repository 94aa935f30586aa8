pub mod contact;
pub mod line_item;
pub mod quote;
