pub mod disk;

pub use disk::DiskStorage;
