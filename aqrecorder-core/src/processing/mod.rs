pub mod buffer_pool;
pub mod caf_format;
pub mod wav_format;
