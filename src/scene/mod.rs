pub(crate) mod context;
pub(crate) mod pool;
pub(crate) mod renderer;
pub(crate) mod shape;
pub(crate) mod style;
