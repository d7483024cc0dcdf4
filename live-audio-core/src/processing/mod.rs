pub mod accumulator;
pub mod codec;
pub mod pcm;
pub mod timeline;
