pub mod image_fs;
pub mod json_file;

pub use image_fs::LocalImageStorage;
pub use json_file::JsonFileRepository;
