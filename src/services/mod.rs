pub mod challenge_client;
pub mod completion_checker;
pub mod text_extractor;

pub use challenge_client::{resolve_challenge, ChallengeClient, ChallengeSource};
pub use completion_checker::{check_completion, CompletionReport};
pub use text_extractor::{extract_code, join_pages, TextExtractor};
