#![doc = "Hardware timestamp synthesis for the trace recorder."]

pub mod clock;
pub mod counter;
pub mod critical;
pub mod descriptor;
pub mod extension;
pub mod irq;
pub mod normalize;

pub use clock::*;
pub use counter::*;
pub use critical::*;
pub use descriptor::*;
pub use extension::*;
pub use irq::*;
pub use normalize::*;
