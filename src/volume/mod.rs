pub mod bounds;
pub mod buffer;
pub mod io;
pub mod traits;

pub use self::bounds::BoundingBox;
pub use self::buffer::{Mask, Volume};
pub use self::traits::{Sample, VolumeView};
