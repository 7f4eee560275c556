//! Open-loop motion control.

pub mod ramp;
