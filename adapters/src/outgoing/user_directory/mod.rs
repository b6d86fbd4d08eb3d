mod session_backed;

pub use session_backed::SessionBackedUserDirectoryAdapter;
