mod common;
mod curve;
mod favorability;
mod matrix;
