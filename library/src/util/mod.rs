pub mod rational;

pub use rational::{Rational, rescale_q};
