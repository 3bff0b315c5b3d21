pub mod circular_buffer;
pub use circular_buffer::CircularBuffer;
