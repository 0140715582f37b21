//! C3 — Search Condition Tree, C4 — Condition Builder.

pub mod builder;
mod node;
mod operator;

pub use builder::{ConditionBuilder, RawGroup, RawNode, SearchCondition, WhereBuilder, cond, group};
pub use node::{Condition, Group, Node, Order};
pub use operator::{Direction, LogicalOp, SearchOperator};
