pub mod fifo;

pub use fifo::SampleFifo;
