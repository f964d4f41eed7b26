pub(crate) mod clock;
pub(crate) mod config;
pub(crate) mod day;
pub(crate) mod face;
pub(crate) mod hud;
pub(crate) mod night;
