pub mod api_token;
pub mod diary;
pub mod diary_input;
pub mod mood;
pub mod rpc;
pub mod token_input;

pub use api_token::{ApiToken, ApiTokenSummary, NewApiToken, TokenOwner};
pub use diary::{DiaryEntry, NewDiaryEntry};
pub use diary_input::{CreateDiaryInput, DiaryEntryResponse, DiaryListResponse, EntryInputError, SuccessResponse};
pub use mood::Mood;
pub use rpc::{RpcCall, RpcError, RpcResponse};
pub use token_input::{CreateTokenInput, TokenCreatedResponse, TokenListResponse};
