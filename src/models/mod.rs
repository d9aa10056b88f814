pub mod operator;
pub mod tag;

pub use operator::Operator;
pub use tag::{NewTag, Tag, TagUpdate};
