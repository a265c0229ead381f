mod config;
mod param;
mod wake_cycle;
