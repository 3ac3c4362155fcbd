pub mod models;
pub mod selector;
pub mod traits;
pub mod twitch;

pub use models::{Chunk, Rendition, VideoInfo, NO_META_GAME};
pub use selector::{quality_rank, select_rendition, QUALITY_ORDER};
pub use traits::Extractor;
pub use twitch::TwitchExtractor;
