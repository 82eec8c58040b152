pub mod builder;
pub mod ir;
pub mod ir_proto;
pub mod naming;
pub mod serialization;
