mod buffering;

pub use buffering::CircularLineBuffer;
