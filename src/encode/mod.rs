pub mod events;
pub mod ffmpeg;
