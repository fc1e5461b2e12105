pub mod constraint;
pub mod monitor;
pub mod orderings;
pub mod panel;
pub mod surface;
pub mod tags;
