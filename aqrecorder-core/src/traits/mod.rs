pub mod audio_session;
pub mod input_queue;
pub mod packet_sink;
pub mod recorder_delegate;
