//! Hard caps protecting the buffers against hostile or broken input.

/// Maximum number of columns a line will grow to.
pub const MAX_COLUMNS: i32 = 4096;

/// Maximum number of rows a screen buffer will grow to.
pub const MAX_ROWS: i32 = 4096;
