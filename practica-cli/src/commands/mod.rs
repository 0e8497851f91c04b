pub mod stage;
pub mod template;
