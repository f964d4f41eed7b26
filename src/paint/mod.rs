pub(crate) mod color;
pub(crate) mod gradient;
pub(crate) mod ramp;
