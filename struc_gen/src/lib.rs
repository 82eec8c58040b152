pub mod cmds;
pub mod codegen;
pub mod layout;
