mod data;

pub use data::{MenuItem, MenuItemKind};
