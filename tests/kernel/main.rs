mod config_load;
mod preflight;
mod shared;
mod support;
