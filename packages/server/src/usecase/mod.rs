//! UseCase 層
//!
//! ハブのビジネスロジックを実装するレイヤー。
//! UI 層（WebSocket ハンドラ）から呼び出され、Domain 層を操作します。

pub mod broadcast;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod send_message;

pub use broadcast::broadcast;
pub use connect_participant::{Announcement, ConnectParticipantUseCase};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, DisconnectError, SendMessageError};
pub use send_message::{BAD_MESSAGE, SendMessageUseCase};
