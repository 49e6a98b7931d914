pub mod assistant_chat;
pub mod filter_bar;
pub mod inventory;
pub mod live_chat;
pub mod structured_table;

pub use assistant_chat::AssistantChat;
pub use filter_bar::FilterBar;
pub use inventory::InventoryPage;
pub use live_chat::LiveChat;
pub use structured_table::StructuredView;
