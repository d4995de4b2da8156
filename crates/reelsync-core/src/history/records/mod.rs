//! History record operations, split by read and write.

mod read;
mod write;
